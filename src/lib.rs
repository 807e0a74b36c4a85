pub mod ast;
pub mod codegen;
pub mod diagnostics;
pub mod grammar;
pub mod lexer;
pub mod limits;
pub mod parser;
pub mod semantic;
pub mod session;

pub use session::{Compilation, Session, compile};
