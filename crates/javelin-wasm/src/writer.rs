//! The module writer contract and compiler options.
//!
//! The generator drives a [`ModuleWriter`] without knowing whether it
//! produces the binary or the text format; back ends live outside this
//! workspace. All writer methods are I/O-shaped and fail with
//! `std::io::Error`.

use std::io;

use crate::function::FunctionName;
use crate::instruction::Instruction;
use crate::types::{ValueType, WasmValue};

/// Feature switches that change what the generator emits.
#[derive(Clone, Copy, Debug)]
pub struct CompilerOptions {
    /// Emit structured exception handling (try/catch/throw).
    pub exception_handling: bool,
    /// Emit GC struct types and self-installing v-tables.
    pub gc: bool,
}

impl CompilerOptions {
    pub fn use_eh(&self) -> bool {
        self.exception_handling
    }

    pub fn use_gc(&self) -> bool {
        self.gc
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            exception_handling: false,
            gc: true,
        }
    }
}

/// Kind of a signature entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Param,
    Result,
    Local,
}

/// Sink for one compiled module.
///
/// The caller opens and closes the writer; the generator calls these
/// methods in a fixed order: v-tables as types finalize, then imports,
/// exports, and the data segment, then `prepare_finish`, then one
/// `write_method_start`..`write_method_finish` bracket per function.
pub trait ModuleWriter {
    /// Announce an imported function with its module/field names.
    fn prepare_import(&mut self, name: &FunctionName, module: &str, field: &str)
    -> io::Result<()>;

    fn write_export(&mut self, name: &FunctionName, export_name: &str) -> io::Result<()>;

    fn write_method_start(
        &mut self,
        name: &FunctionName,
        source_file: Option<&str>,
    ) -> io::Result<()>;

    fn write_method_param_start(&mut self, name: &FunctionName) -> io::Result<()>;

    fn write_method_param(
        &mut self,
        kind: ParamKind,
        ty: &ValueType,
        debug_name: Option<&str>,
    ) -> io::Result<()>;

    fn write_method_param_finish(&mut self, name: &FunctionName) -> io::Result<()>;

    fn write_method_finish(&mut self) -> io::Result<()>;

    fn write_instruction(&mut self, instruction: &Instruction) -> io::Result<()>;

    fn write_const(&mut self, value: WasmValue) -> io::Result<()>;

    /// Emit the zero/null default for a struct field of the given type.
    fn write_default_value(&mut self, ty: &ValueType) -> io::Result<()>;

    /// Called before each exception-handling instruction when EH is on.
    fn write_exception(&mut self) -> io::Result<()>;

    fn mark_source_line(&mut self, line: i32) -> io::Result<()>;

    /// Emit the resolved v-table of one struct type.
    fn write_vtable(
        &mut self,
        type_name: &str,
        class_index: u32,
        entries: &[FunctionName],
    ) -> io::Result<()>;

    /// Emit the string data segment.
    fn write_data_segment(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Called once after all tables and before function bodies.
    fn prepare_finish(&mut self) -> io::Result<()>;
}
