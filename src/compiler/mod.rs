//! The Compiler module is in charge of taking a
//! `+`/`-` expression and producing x86-64 assembly
//! for a `main` that returns its value.
//!
//! It does this by implementing a simple tokenizer
//! and a single-lookahead parser that emits code as
//! it recognizes each token, without building a tree.

pub mod asm;
pub mod error;
pub mod lexer;
pub mod parser;

use std::io::Write;

use self::asm::Instruction;
use self::error::CompileResult;

/// Tokenize `input`, then parse it while writing assembly to `out`.
/// Returns the emitted instructions.
pub fn compile<W: Write + ?Sized>(input: &str, out: &mut W) -> CompileResult<Vec<Instruction>> {
    let tokens = lexer::tokenize(input)?;
    parser::Parser::new(input, tokens).run(out)
}
