pub mod ast;
pub mod frontend;
pub mod read;
