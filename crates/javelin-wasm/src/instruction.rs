//! The typed instruction representation.
//!
//! Instructions are the currency between the instruction builder, the
//! worklist scanner, the peephole optimizer, and the emitter. Every
//! variant carries the source line it came from (`NO_LINE` when there is
//! none) so emission errors and source maps can point back at it.

use crate::function::FunctionName;
use crate::types::WasmValue;

/// Sentinel source line for instructions with no line info.
pub const NO_LINE: i32 = -1;

/// Local variable access kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalOp {
    Get,
    Set,
    Tee,
}

/// Structured-control and exception block operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockOp {
    Block,
    Loop,
    If,
    Else,
    End,
    Br(u32),
    BrIf(u32),
    Try,
    Catch,
    Throw,
    Rethrow,
}

impl BlockOp {
    /// Whether this operation belongs to structured exception handling.
    pub fn is_exception(self) -> bool {
        matches!(self, Self::Try | Self::Catch | Self::Throw | Self::Rethrow)
    }
}

/// Numeric operator, parameterized by the operand type on the instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// One typed instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Nop,
    Const {
        value: WasmValue,
        line: i32,
    },
    Local {
        op: LocalOp,
        index: u32,
        line: i32,
    },
    Numeric {
        op: NumericOp,
        ty: crate::types::ValueType,
        line: i32,
    },
    /// Direct call, statically dispatched.
    Call {
        target: FunctionName,
        line: i32,
    },
    /// Virtual call dispatched through the receiver's v-table.
    CallVirtual {
        target: FunctionName,
        line: i32,
    },
    /// Interface call; currently rejected at emission.
    CallInterface {
        target: FunctionName,
        line: i32,
    },
    /// Indirect call through a table slot; produced by call lowering.
    CallIndirect {
        signature: String,
        line: i32,
    },
    Block {
        op: BlockOp,
        line: i32,
    },
    StructNew {
        type_name: String,
        line: i32,
    },
    StructNewDefault {
        type_name: String,
        line: i32,
    },
    StructGet {
        type_name: String,
        field: String,
        line: i32,
    },
    StructSet {
        type_name: String,
        field: String,
        line: i32,
    },
    /// String literal; lowered through the string manager at emission.
    StringConst {
        value: String,
        line: i32,
    },
    Drop {
        line: i32,
    },
    Return {
        line: i32,
    },
}

impl Instruction {
    pub fn i32_const(value: i32) -> Self {
        Self::Const {
            value: WasmValue::I32(value),
            line: NO_LINE,
        }
    }

    pub fn local_get(index: u32) -> Self {
        Self::Local {
            op: LocalOp::Get,
            index,
            line: NO_LINE,
        }
    }

    pub fn call(target: FunctionName) -> Self {
        Self::Call {
            target,
            line: NO_LINE,
        }
    }

    pub fn call_virtual(target: FunctionName) -> Self {
        Self::CallVirtual {
            target,
            line: NO_LINE,
        }
    }

    /// Rewrite the source line, builder style.
    pub fn at_line(mut self, new_line: i32) -> Self {
        if let Some(line) = self.line_mut() {
            *line = new_line;
        }
        self
    }

    /// Source line this instruction came from, `NO_LINE` if unknown.
    pub fn line(&self) -> i32 {
        match self {
            Self::Nop => NO_LINE,
            Self::Const { line, .. }
            | Self::Local { line, .. }
            | Self::Numeric { line, .. }
            | Self::Call { line, .. }
            | Self::CallVirtual { line, .. }
            | Self::CallInterface { line, .. }
            | Self::CallIndirect { line, .. }
            | Self::Block { line, .. }
            | Self::StructNew { line, .. }
            | Self::StructNewDefault { line, .. }
            | Self::StructGet { line, .. }
            | Self::StructSet { line, .. }
            | Self::StringConst { line, .. }
            | Self::Drop { line }
            | Self::Return { line } => *line,
        }
    }

    fn line_mut(&mut self) -> Option<&mut i32> {
        match self {
            Self::Nop => None,
            Self::Const { line, .. }
            | Self::Local { line, .. }
            | Self::Numeric { line, .. }
            | Self::Call { line, .. }
            | Self::CallVirtual { line, .. }
            | Self::CallInterface { line, .. }
            | Self::CallIndirect { line, .. }
            | Self::Block { line, .. }
            | Self::StructNew { line, .. }
            | Self::StructNewDefault { line, .. }
            | Self::StructGet { line, .. }
            | Self::StructSet { line, .. }
            | Self::StringConst { line, .. }
            | Self::Drop { line }
            | Self::Return { line } => Some(line),
        }
    }

    /// The callee of a call-shaped instruction.
    pub fn callee(&self) -> Option<&FunctionName> {
        match self {
            Self::Call { target, .. }
            | Self::CallVirtual { target, .. }
            | Self::CallInterface { target, .. } => Some(target),
            _ => None,
        }
    }
}
