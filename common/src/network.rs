pub mod range;
pub mod subnet;
