pub mod memory;
pub mod resume;
