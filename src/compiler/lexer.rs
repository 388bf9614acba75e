//! This lexer tokenizes `+`/`-` expressions.
use super::error::{CompileError, CompileResult};

// Tokens are tuples of the token value and the byte offset they start at.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Token {
    Num(i64, usize),
    Op(char, usize),
    End(usize),
}

impl Token {
    /// Byte offset of the token in the input.
    pub fn offset(&self) -> usize {
        match self {
            Token::Num(_, at) | Token::Op(_, at) | Token::End(at) => *at,
        }
    }

    /// The operator character, if this is an operator token.
    pub fn op(&self) -> Option<char> {
        match self {
            Token::Op(c, _) => Some(*c),
            _ => None,
        }
    }

    /// Short human readable form used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Token::Num(val, _) => val.to_string(),
            Token::Op(c, _) => format!("'{}'", c),
            Token::End(_) => "end of input".to_owned(),
        }
    }
}

/// The expected sequence of tokens is NUM (OP NUM)* END, but only the
/// parser checks that. The lexer just classifies characters, so
/// `1++2` tokenizes fine.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
    let mut tokens: Vec<Token> = Vec::with_capacity(input.len() / 2 + 1);
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        if is_blank(c) {
            i += 1;
            continue;
        }

        if c == b'+' || c == b'-' {
            tokens.push(Token::Op(c as char, i));
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            tokens.push(Token::Num(number(input, start, i)?, start));
            continue;
        }

        // May be the first byte of a multi-byte char.
        let bad = input[i..].chars().next().unwrap_or('\0');
        return Err(CompileError::lex(input, i, format!("invalid token: '{}'", bad)));
    }

    tokens.push(Token::End(input.len()));
    debug!("Tokenized {} byte(s) into {} token(s).", input.len(), tokens.len());
    Ok(tokens)
}

// Only spaces and tabs separate tokens; newlines and the like are invalid.
fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

fn number(input: &str, start: usize, end: usize) -> CompileResult<i64> {
    input[start..end]
        .parse::<i64>()
        .map_err(|_| CompileError::lex(input, start, format!("number out of range: {}", &input[start..end])))
}
