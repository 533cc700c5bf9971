//! Textual-WebAssembly subset parser for inline text code.
//!
//! Parses the instruction subset that annotated text-code bodies and
//! compiler-generated helpers use: constants, local access, numeric
//! operators, `call`, `drop`, `return`, `nop`. Both flat sequences and
//! folded s-expressions are accepted; folded operands are flattened in
//! evaluation order (operands first, operator last).
//!
//! Function references are `$`-prefixed signature names, e.g.
//! `call $java/lang/Math.sqrt(D)D`. A reference token extends to the next
//! whitespace, so in folded form leave a space before the closing paren.

use logos::Logos;
use thiserror::Error;

use crate::function::FunctionName;
use crate::instruction::{Instruction, LocalOp, NO_LINE, NumericOp};
use crate::types::{ValueType, WasmValue};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WatError {
    #[error("unexpected character sequence {0:?}")]
    Lex(String),
    #[error("unexpected token {0:?}")]
    Unexpected(String),
    #[error("unexpected end of text code")]
    UnexpectedEnd,
    #[error("unknown instruction {0:?}")]
    UnknownInstruction(String),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("invalid function reference {0:?}")]
    InvalidName(String),
}

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip(r";;[^\n]*", allow_greedy = true))]
enum RawToken {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    /// `$`-prefixed function reference; runs to the next whitespace.
    #[regex(r"\$[^ \t\r\n]+")]
    Name,
    #[regex(r"[^ \t\r\n()$][^ \t\r\n()]*")]
    Atom,
}

struct Token<'a> {
    kind: RawToken,
    text: &'a str,
}

/// Parse a text-code body into an instruction list.
pub fn parse(source: &str) -> Result<Vec<Instruction>, WatError> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let kind = result.map_err(|()| WatError::Lex(lexer.slice().to_string()))?;
        tokens.push(Token {
            kind,
            text: lexer.slice(),
        });
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        instructions: Vec::new(),
    };
    while parser.pos < parser.tokens.len() {
        parser.item()?;
    }
    Ok(parser.instructions)
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    instructions: Vec<Instruction>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<RawToken> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn bump(&mut self) -> Result<(RawToken, &str), WatError> {
        let token = self.tokens.get(self.pos).ok_or(WatError::UnexpectedEnd)?;
        self.pos += 1;
        Ok((token.kind, token.text))
    }

    fn expect(&mut self, kind: RawToken) -> Result<&str, WatError> {
        let (found, text) = self.bump()?;
        if found != kind {
            return Err(WatError::Unexpected(text.to_string()));
        }
        Ok(text)
    }

    fn item(&mut self) -> Result<(), WatError> {
        if self.peek() == Some(RawToken::LParen) {
            self.pos += 1;
            self.folded()?;
            self.expect(RawToken::RParen)?;
            Ok(())
        } else {
            let instr = self.operation()?;
            self.instructions.push(instr);
            Ok(())
        }
    }

    /// `(op immediates operand*)`; operands emit before the operator.
    fn folded(&mut self) -> Result<(), WatError> {
        let instr = self.operation()?;
        while self.peek() == Some(RawToken::LParen) {
            self.pos += 1;
            self.folded()?;
            self.expect(RawToken::RParen)?;
        }
        self.instructions.push(instr);
        Ok(())
    }

    /// An operator word plus its immediate tokens.
    fn operation(&mut self) -> Result<Instruction, WatError> {
        let word = self.expect(RawToken::Atom)?.to_string();
        match word.as_str() {
            "nop" => Ok(Instruction::Nop),
            "drop" => Ok(Instruction::Drop { line: NO_LINE }),
            "return" => Ok(Instruction::Return { line: NO_LINE }),
            "i32.const" => Ok(Instruction::Const {
                value: WasmValue::I32(self.number()?),
                line: NO_LINE,
            }),
            "i64.const" => Ok(Instruction::Const {
                value: WasmValue::I64(self.number()?),
                line: NO_LINE,
            }),
            "f32.const" => Ok(Instruction::Const {
                value: WasmValue::F32(self.number()?),
                line: NO_LINE,
            }),
            "f64.const" => Ok(Instruction::Const {
                value: WasmValue::F64(self.number()?),
                line: NO_LINE,
            }),
            "local.get" => self.local(LocalOp::Get),
            "local.set" => self.local(LocalOp::Set),
            "local.tee" => self.local(LocalOp::Tee),
            "call" => {
                let text = self.expect(RawToken::Name)?;
                let reference = &text[1..];
                let target = FunctionName::from_signature_name(reference)
                    .ok_or_else(|| WatError::InvalidName(reference.to_string()))?;
                Ok(Instruction::Call {
                    target,
                    line: NO_LINE,
                })
            }
            _ => match numeric(&word) {
                Some((op, ty)) => Ok(Instruction::Numeric {
                    op,
                    ty,
                    line: NO_LINE,
                }),
                None => Err(WatError::UnknownInstruction(word)),
            },
        }
    }

    fn local(&mut self, op: LocalOp) -> Result<Instruction, WatError> {
        let index = self.number()?;
        Ok(Instruction::Local {
            op,
            index,
            line: NO_LINE,
        })
    }

    fn number<T: std::str::FromStr>(&mut self) -> Result<T, WatError> {
        let text = self.expect(RawToken::Atom)?;
        text.parse()
            .map_err(|_| WatError::InvalidNumber(text.to_string()))
    }
}

fn numeric(word: &str) -> Option<(NumericOp, ValueType)> {
    let (ty, op) = word.split_once('.')?;
    let ty = match ty {
        "i32" => ValueType::I32,
        "i64" => ValueType::I64,
        "f32" => ValueType::F32,
        "f64" => ValueType::F64,
        _ => return None,
    };
    let op = match op {
        "add" => NumericOp::Add,
        "sub" => NumericOp::Sub,
        "mul" => NumericOp::Mul,
        "div" | "div_s" => NumericOp::Div,
        "rem_s" => NumericOp::Rem,
        "and" => NumericOp::And,
        "or" => NumericOp::Or,
        "xor" => NumericOp::Xor,
        "shl" => NumericOp::Shl,
        "shr_s" => NumericOp::Shr,
        "eq" => NumericOp::Eq,
        "ne" => NumericOp::Ne,
        "lt" | "lt_s" => NumericOp::Lt,
        "gt" | "gt_s" => NumericOp::Gt,
        "le" | "le_s" => NumericOp::Le,
        "ge" | "ge_s" => NumericOp::Ge,
        _ => return None,
    };
    Some((op, ty))
}
