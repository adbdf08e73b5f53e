pub mod approval_service;
pub mod bill_service;
pub mod cancellation_service;
pub mod deposit_service;
pub mod forwarding_service;
pub mod numbering_service;
pub mod reissue_service;
