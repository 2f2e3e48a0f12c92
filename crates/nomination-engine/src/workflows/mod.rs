pub mod costsheet;
pub mod nomination;
