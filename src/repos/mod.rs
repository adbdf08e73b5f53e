pub mod bill_repo;
pub mod deposit_repo;
pub mod ledger_repo;
pub mod org_repo;
pub mod otp_repo;
pub mod transition_repo;
