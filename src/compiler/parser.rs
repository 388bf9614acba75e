//! The Parser module walks the token stream from the lexer and writes
//! assembly as it goes. No tree is built: each instruction is emitted the
//! moment the tokens for it have been recognized.
//!
//! ```text
//! program := NUMBER ( ('+' | '-') NUMBER )* END
//! ```
use std::io::Write;

use snafu::ResultExt;

use super::asm::{Instruction, Register};
use super::error::{CompileError, CompileResult, WriteSnafu};
use super::lexer::Token;

pub struct Parser<'a> {
    input:   &'a str,
    tokens:  Vec<Token>,
    pos:     usize,
    listing: Vec<Instruction>,
}

impl<'a> Parser<'a> {
    /// `tokens` must come from `lexer::tokenize(input)` so that it ends
    /// with `Token::End`.
    pub fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        let capacity = tokens.len() + 4;
        Parser { input, tokens, pos: 0, listing: Vec::with_capacity(capacity) }
    }

    /// Run the parser, consuming itself, writing assembly to `out` and
    /// returning the instructions it emitted.
    /// Stops at the first error; whatever was already written is garbage.
    pub fn run<W: Write + ?Sized>(mut self, out: &mut W) -> CompileResult<Vec<Instruction>> {
        for ins in Instruction::preamble().iter() {
            self.emit(out, *ins)?;
        }

        let first = self.expect_number()?;
        self.emit(out, Instruction::Mov(Register::Rax, first))?;

        while !self.at_end() {
            if self.consume_if('+') {
                let value = self.expect_number()?;
                self.emit(out, Instruction::Add(Register::Rax, value))?;
                continue;
            }

            // Anything other than '+' or '-' here is a syntax error.
            self.expect('-')?;
            let value = self.expect_number()?;
            self.emit(out, Instruction::Sub(Register::Rax, value))?;
        }

        self.emit(out, Instruction::Ret)?;
        debug!("Emitted {} instruction(s).", self.listing.len());
        Ok(self.listing)
    }

    fn emit<W: Write + ?Sized>(&mut self, out: &mut W, ins: Instruction) -> CompileResult<()> {
        trace!("emit {:?}", ins);
        writeln!(out, "{}", ins).context(WriteSnafu)?;
        self.listing.push(ins);
        Ok(())
    }

    /// True if the current token is the operator `op`. Never advances.
    fn peek_is(&self, op: char) -> bool {
        self.current().op() == Some(op)
    }

    /// Advances past the current token only if it is the operator `op`.
    fn consume_if(&mut self, op: char) -> bool {
        if self.peek_is(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, op: char) -> CompileResult<()> {
        if self.consume_if(op) {
            return Ok(());
        }
        let tok = self.current();
        Err(CompileError::parse(
            self.input,
            tok.offset(),
            format!("expected operator '{}', but got {}", op, tok.describe()),
        ))
    }

    fn expect_number(&mut self) -> CompileResult<i64> {
        let tok = self.current();
        if let Token::Num(val, _) = *tok {
            self.advance();
            return Ok(val);
        }
        Err(CompileError::parse(
            self.input,
            tok.offset(),
            format!("expected integer, but got {}", tok.describe()),
        ))
    }

    fn at_end(&self) -> bool {
        matches!(self.current(), Token::End(_))
    }

    // The cursor never moves past the end marker, so if the lexer's
    // guarantee was broken we still report end of input instead of panicking.
    fn current(&self) -> &Token {
        const END: &Token = &Token::End(usize::MAX);
        self.tokens.get(self.pos).unwrap_or(END)
    }

    #[inline]
    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::asm::evaluate;
    use super::super::lexer::tokenize;

    fn compile(input: &str) -> CompileResult<(String, Vec<Instruction>)> {
        let tokens = tokenize(input)?;
        let mut out: Vec<u8> = Vec::new();
        let listing = Parser::new(input, tokens).run(&mut out)?;
        Ok((String::from_utf8(out).unwrap(), listing))
    }

    #[test]
    fn test_peek_and_consume_if() {
        let input = "1+2";
        let mut parser = Parser::new(input, tokenize(input).unwrap());

        assert!(!parser.peek_is('+'));
        assert!(!parser.consume_if('+'));
        assert_eq!(parser.pos, 0);

        assert_eq!(parser.expect_number().unwrap(), 1);
        assert!(parser.peek_is('+'));
        assert!(!parser.peek_is('-'));
        assert_eq!(parser.pos, 1);

        assert!(!parser.consume_if('-'));
        assert!(parser.consume_if('+'));
        assert_eq!(parser.pos, 2);
        assert!(!parser.at_end());

        assert_eq!(parser.expect_number().unwrap(), 2);
        assert!(parser.at_end());
    }

    #[test]
    fn test_expect() {
        let input = "- +";
        let mut parser = Parser::new(input, tokenize(input).unwrap());

        assert!(parser.expect('-').is_ok());
        let err = parser.expect('-').unwrap_err();
        assert_eq!(err.offset(), Some(2));
        assert!(err.to_string().starts_with("expected operator '-', but got '+'"));
        // A failed expect leaves the cursor where it was.
        assert_eq!(parser.pos, 1);
    }

    #[test]
    fn test_expect_number() {
        let input = "7 -";
        let mut parser = Parser::new(input, tokenize(input).unwrap());

        assert_eq!(parser.expect_number().unwrap(), 7);
        let err = parser.expect_number().unwrap_err();
        assert!(err.to_string().starts_with("expected integer, but got '-'"));
        assert!(parser.consume_if('-'));

        let err = parser.expect_number().unwrap_err();
        assert_eq!(err.offset(), Some(3));
        assert!(err.to_string().starts_with("expected integer, but got end of input"));
    }

    #[test]
    fn test_cursor_stops_at_end() {
        let mut parser = Parser::new("", Vec::new());
        assert!(parser.at_end());
        parser.advance();
        assert_eq!(parser.pos, 0);
        assert!(parser.expect_number().is_err());
    }

    #[test]
    fn test_run_example() {
        let (asm, listing) = compile("5+20-4").unwrap();
        assert_eq!(
            asm,
            ".intel_syntax noprefix\n.globl main\nmain:\n\tmov rax, 5\n\tadd rax, 20\n\tsub rax, 4\n\tret\n"
        );
        assert_eq!(listing.len(), 7);
        assert_eq!(evaluate(&listing), 21);
    }

    #[test]
    fn test_run_single_number() {
        for n in &[0i64, 1, 42, 255, 1_000_000, i64::MAX] {
            let (asm, listing) = compile(&n.to_string()).unwrap();
            assert_eq!(
                asm,
                format!(".intel_syntax noprefix\n.globl main\nmain:\n\tmov rax, {}\n\tret\n", n)
            );
            assert_eq!(evaluate(&listing), *n);
        }
    }

    #[test]
    fn test_run_matches_left_to_right_evaluation() {
        let cases: &[(&str, i64)] = &[
            ("1+2", 3),
            ("10-3-2", 5),
            ("10-3+2", 9),
            ("0-1", -1),
            ("100 - 200 + 50 - 1", -51),
            ("1+1+1+1+1+1+1+1+1+1", 10),
        ];
        for (input, expected) in cases {
            let (_, listing) = compile(input).unwrap();
            assert_eq!(evaluate(&listing), *expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_run_whitespace_insensitive() {
        let (a, _) = compile("1+2").unwrap();
        let (b, _) = compile("1 + 2").unwrap();
        let (c, _) = compile(" 1  +  2 ").unwrap();
        let (d, _) = compile("\t1\t+\t2\t").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
    }

    #[test]
    fn test_run_parse_errors() {
        for input in &["", " ", "+", "-", "1+", "1-", "1++2", "1+-2", "+1", "1 2", "1 2 3"] {
            match compile(input) {
                Err(CompileError::Parse { .. }) => {}
                other => panic!("expected a parse error for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_run_stops_before_ret() {
        let input = "1+";
        let mut out: Vec<u8> = Vec::new();
        let err = Parser::new(input, tokenize(input).unwrap()).run(&mut out).unwrap_err();
        assert!(err.to_string().starts_with("expected integer"));

        let written = String::from_utf8(out).unwrap();
        assert!(written.ends_with("\tmov rax, 1\n"));
        assert!(!written.contains("ret"));
    }

    #[test]
    fn test_run_missing_operator() {
        let err = compile("1 2").unwrap_err();
        assert_eq!(err.offset(), Some(2));
        assert!(err.to_string().starts_with("expected operator '-', but got 2"));
    }

    #[test]
    fn test_run_write_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let input = "1";
        match Parser::new(input, tokenize(input).unwrap()).run(&mut Broken) {
            Err(CompileError::Write { .. }) => {}
            other => panic!("expected a write error, got {:?}", other),
        }
    }
}
