pub mod fee;
pub mod health;
pub mod receipt;
pub mod student;
