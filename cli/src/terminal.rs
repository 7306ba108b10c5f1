pub mod colors;
pub mod input;
pub mod logging;
pub mod matrix;
pub mod print;
pub mod progress;
pub mod report;
