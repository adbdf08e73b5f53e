//! Contract types for the petty-cash HTTP API
//!
//! Request/response DTOs for every endpoint. Monetary fields are i64 minor
//! units (`_minor` suffix); GST rates are i32 basis points (`_bp` suffix).

pub mod bill_batch_v1;
pub mod cancel_v1;
pub mod deposit_v1;
pub mod forwarding_v1;
pub mod voucher_v1;

pub use bill_batch_v1::*;
pub use cancel_v1::*;
pub use deposit_v1::*;
pub use forwarding_v1::*;
pub use voucher_v1::*;
