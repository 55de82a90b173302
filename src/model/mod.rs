pub mod fee_structure;
pub mod receipt;
pub mod roll;
pub mod student;
