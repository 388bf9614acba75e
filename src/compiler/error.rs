//! Errors shared by every stage of the compiler.
//!
//! Lexer and parser errors carry the original input and the byte offset of
//! the offending character so they can be printed with a caret underneath.
use snafu::Snafu;
use std::io;
use std::path::PathBuf;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CompileError {
    #[snafu(display("{}", message))]
    Usage { message: String },

    #[snafu(display("{}", render(input, *offset, message)))]
    Lex {
        input: String,
        offset: usize,
        message: String,
    },

    #[snafu(display("{}", render(input, *offset, message)))]
    Parse {
        input: String,
        offset: usize,
        message: String,
    },

    #[snafu(display("unable to write assembly: {}", source))]
    Write { source: io::Error },

    #[snafu(display("unable to write output file `{}`: {}", path.display(), source))]
    Output { path: PathBuf, source: io::Error },
}

impl CompileError {
    pub fn lex(input: &str, offset: usize, message: impl Into<String>) -> Self {
        CompileError::Lex {
            input: input.to_owned(),
            offset,
            message: message.into(),
        }
    }

    pub fn parse(input: &str, offset: usize, message: impl Into<String>) -> Self {
        CompileError::Parse {
            input: input.to_owned(),
            offset,
            message: message.into(),
        }
    }

    /// Byte offset into the input for lexer and parser errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            CompileError::Lex { offset, .. } | CompileError::Parse { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

// Message first, then the quoted input with a caret under the offending
// character. Offsets past the end point just after the closing quote.
fn render(input: &str, offset: usize, message: &str) -> String {
    let safe = offset.min(input.len());
    // +1 for the opening quote
    let column = input[..safe].chars().count() + 1;
    format!("{}\n'{}'\n{}^", message, input, " ".repeat(column))
}
