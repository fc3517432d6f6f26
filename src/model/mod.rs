pub mod error;
pub(crate) mod linalg;
pub mod seasonal;
pub mod trainer;
