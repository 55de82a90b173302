pub mod fee;
pub mod receipt;
pub mod student;

pub use fee::FeeSchedule;
pub use receipt::{ReceiptLedger, ReceiptOutcome};
pub use student::{Removed, StudentRegistry};
