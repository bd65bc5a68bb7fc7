//! Notation3 rule documents

pub mod lexer;
pub mod parser;

pub use parser::{parse_n3, N3Parser};
