mod loader;
mod orchestrator;
mod parser;

pub use loader::*;
pub use orchestrator::*;
pub use parser::*;
