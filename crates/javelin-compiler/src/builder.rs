//! The consumed contract of the external instruction builder.
//!
//! The builder converts a method's stack-machine bytecode into the typed
//! instruction list, together with the non-parameter locals it allocated
//! and whatever debug names it recovered.

use javelin_classfile::{ClassFile, MethodInfo};
use javelin_wasm::{Instruction, ValueType};

use crate::Result;

/// A non-parameter local allocated by the builder.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyLocal {
    /// Debug name, when the class was compiled with debug info.
    pub name: Option<String>,
    pub ty: ValueType,
}

/// A translated method body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MethodBody {
    pub instructions: Vec<Instruction>,
    /// Non-parameter locals in index order.
    pub locals: Vec<BodyLocal>,
    /// Debug names for the declared parameters, aligned with the
    /// descriptor (the implicit receiver is not included).
    pub param_names: Vec<Option<String>>,
}

impl MethodBody {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            locals: Vec::new(),
            param_names: Vec::new(),
        }
    }
}

/// Translates stack-machine bytecode into typed instructions.
///
/// Implemented by the external stack-to-register builder; the generator
/// only ever sees this trait.
pub trait CodeBuilder {
    fn build(&self, class: &ClassFile, method: &MethodInfo) -> Result<MethodBody>;
}
