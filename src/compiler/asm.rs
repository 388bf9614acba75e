//! The instructions the emitter can produce.
//!
//! Output is x86-64 in Intel syntax without register prefixes. A compiled
//! program is a single `main` function that leaves its result in the
//! accumulator:
//!
//! ```nasm
//! .intel_syntax noprefix
//! .globl main
//! main:
//! 	mov rax, 5      ; rax <= 5
//! 	add rax, 20     ; rax <= rax + 20
//! 	sub rax, 4      ; rax <= rax - 4
//! 	ret             ; exit status is rax
//! ```

use std::fmt;

/// Name of the entry point symbol.
pub const ENTRY: &str = "main";

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Instruction {
    IntelSyntax,
    Global(&'static str),
    Label(&'static str),
    Mov(Register, i64),
    Add(Register, i64),
    Sub(Register, i64),
    Ret,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Instruction::*;
        match self {
            IntelSyntax      => write!(f, ".intel_syntax noprefix"),
            Global(sym)      => write!(f, ".globl {}", sym),
            Label(sym)       => write!(f, "{}:", sym),
            Mov(reg, value)  => write!(f, "\tmov {}, {}", reg, value),
            Add(reg, value)  => write!(f, "\tadd {}, {}", reg, value),
            Sub(reg, value)  => write!(f, "\tsub {}, {}", reg, value),
            Ret              => write!(f, "\tret"),
        }
    }
}

impl Instruction {
    /// The fixed lines every program starts with.
    pub fn preamble() -> [Instruction; 3] {
        [
            Instruction::IntelSyntax,
            Instruction::Global(ENTRY),
            Instruction::Label(ENTRY),
        ]
    }

    /// Runs the instruction against the accumulator and returns its new value.
    /// Arithmetic wraps at 64 bits like the hardware register does.
    pub fn apply(&self, acc: i64) -> i64 {
        use Instruction::*;
        match self {
            Mov(Register::Rax, value) => *value,
            Add(Register::Rax, value) => acc.wrapping_add(*value),
            Sub(Register::Rax, value) => acc.wrapping_sub(*value),
            IntelSyntax | Global(_) | Label(_) | Ret => acc,
        }
    }
}

/// Value left in the accumulator after running the whole listing.
pub fn evaluate(listing: &[Instruction]) -> i64 {
    listing.iter().fold(0, |acc, ins| ins.apply(acc))
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Register {
    Rax,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Register::Rax => write!(f, "rax"),
        }
    }
}
