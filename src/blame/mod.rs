pub mod types;
pub mod parser;

pub use types::BlameLine;
pub use parser::parse_blame_output;
