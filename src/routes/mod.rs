pub mod approve;
pub mod bills;
pub mod cancel;
pub mod forwarding;
pub mod passbook;
pub mod reissue;
pub mod voucher;
