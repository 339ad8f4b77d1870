pub mod fs;
pub mod strategies;

pub use fs::{Project, create_project};
