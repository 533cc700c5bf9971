//! Shared test fixtures: a recording module writer, a table-driven stub
//! instruction builder, and class-file builders.

use std::io;

use indexmap::IndexMap;

use javelin_classfile::annotations::known;
use javelin_classfile::{AccessFlags, Annotation, MethodCode, MethodInfo};
use javelin_wasm::{
    FunctionName, Instruction, LocalOp, ModuleWriter, NO_LINE, ParamKind, ValueType, WasmValue,
};

use crate::Result;
use crate::builder::{CodeBuilder, MethodBody};

/// A `ModuleWriter` that records its event stream as plain strings.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    pub events: Vec<String>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.iter().position(|e| e == event)
    }

    /// Events that open a function body.
    pub fn methods(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.starts_with("method "))
            .map(String::as_str)
            .collect()
    }

    fn record(&mut self, event: String) -> io::Result<()> {
        self.events.push(event);
        Ok(())
    }
}

fn render(instruction: &Instruction) -> String {
    match instruction {
        Instruction::Nop => "nop".to_string(),
        Instruction::Const { value, .. } => value.to_string(),
        Instruction::Local { op, index, .. } => {
            let op = match op {
                LocalOp::Get => "get",
                LocalOp::Set => "set",
                LocalOp::Tee => "tee",
            };
            format!("local.{op} {index}")
        }
        Instruction::Numeric { op, ty, .. } => {
            format!("{ty}.{}", format!("{op:?}").to_lowercase())
        }
        Instruction::Call { target, .. } => format!("call {target}"),
        Instruction::CallVirtual { target, .. } => format!("call_virtual {target}"),
        Instruction::CallInterface { target, .. } => format!("call_interface {target}"),
        Instruction::CallIndirect { signature, .. } => format!("call_indirect {signature}"),
        Instruction::Block { op, .. } => format!("block {op:?}").to_lowercase(),
        Instruction::StructNew { type_name, .. } => format!("struct.new {type_name}"),
        Instruction::StructNewDefault { type_name, .. } => {
            format!("struct.new_default {type_name}")
        }
        Instruction::StructGet {
            type_name, field, ..
        } => format!("struct.get {type_name} {field}"),
        Instruction::StructSet {
            type_name, field, ..
        } => format!("struct.set {type_name} {field}"),
        Instruction::StringConst { value, .. } => format!("string {value:?}"),
        Instruction::Drop { .. } => "drop".to_string(),
        Instruction::Return { .. } => "return".to_string(),
    }
}

impl ModuleWriter for RecordingWriter {
    fn prepare_import(
        &mut self,
        name: &FunctionName,
        module: &str,
        field: &str,
    ) -> io::Result<()> {
        self.record(format!("import {module}.{field} = {name}"))
    }

    fn write_export(&mut self, name: &FunctionName, export_name: &str) -> io::Result<()> {
        self.record(format!("export {export_name} = {name}"))
    }

    fn write_method_start(
        &mut self,
        name: &FunctionName,
        source_file: Option<&str>,
    ) -> io::Result<()> {
        match source_file {
            Some(file) => self.record(format!("method {name} ({file})")),
            None => self.record(format!("method {name}")),
        }
    }

    fn write_method_param_start(&mut self, _name: &FunctionName) -> io::Result<()> {
        Ok(())
    }

    fn write_method_param(
        &mut self,
        kind: ParamKind,
        ty: &ValueType,
        debug_name: Option<&str>,
    ) -> io::Result<()> {
        let kind = match kind {
            ParamKind::Param => "param",
            ParamKind::Result => "result",
            ParamKind::Local => "local",
        };
        match debug_name {
            Some(debug_name) => self.record(format!("{kind} {ty} {debug_name}")),
            None => self.record(format!("{kind} {ty}")),
        }
    }

    fn write_method_param_finish(&mut self, _name: &FunctionName) -> io::Result<()> {
        Ok(())
    }

    fn write_method_finish(&mut self) -> io::Result<()> {
        self.record("end".to_string())
    }

    fn write_instruction(&mut self, instruction: &Instruction) -> io::Result<()> {
        self.record(render(instruction))
    }

    fn write_const(&mut self, value: WasmValue) -> io::Result<()> {
        self.record(value.to_string())
    }

    fn write_default_value(&mut self, ty: &ValueType) -> io::Result<()> {
        self.record(format!("default {ty}"))
    }

    fn write_exception(&mut self) -> io::Result<()> {
        self.record("exception".to_string())
    }

    fn mark_source_line(&mut self, line: i32) -> io::Result<()> {
        self.record(format!("line {line}"))
    }

    fn write_vtable(
        &mut self,
        type_name: &str,
        class_index: u32,
        entries: &[FunctionName],
    ) -> io::Result<()> {
        let entries: Vec<String> = entries.iter().map(|e| e.to_string()).collect();
        self.record(format!(
            "vtable {type_name} #{class_index} [{}]",
            entries.join(", ")
        ))
    }

    fn write_data_segment(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.record(format!("data {} bytes", bytes.len()))
    }

    fn prepare_finish(&mut self) -> io::Result<()> {
        self.record("prepare finish".to_string())
    }
}

/// Table-driven stand-in for the external instruction builder, keyed by
/// the declaring class's signature name. Unknown methods get a bare
/// `return` body.
#[derive(Default)]
pub struct StubCodeBuilder {
    bodies: IndexMap<String, MethodBody>,
}

impl StubCodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        self,
        class_name: &str,
        method_name: &str,
        descriptor: &str,
        instructions: Vec<Instruction>,
    ) -> Self {
        self.with_body(
            class_name,
            method_name,
            descriptor,
            MethodBody::new(instructions),
        )
    }

    pub fn with_body(
        mut self,
        class_name: &str,
        method_name: &str,
        descriptor: &str,
        body: MethodBody,
    ) -> Self {
        self.bodies
            .insert(format!("{class_name}.{method_name}{descriptor}"), body);
        self
    }
}

impl CodeBuilder for StubCodeBuilder {
    fn build(
        &self,
        class: &javelin_classfile::ClassFile,
        method: &MethodInfo,
    ) -> Result<MethodBody> {
        let key = format!("{}.{}{}", class.name, method.name, method.descriptor);
        Ok(self.bodies.get(&key).cloned().unwrap_or_else(|| {
            MethodBody::new(vec![Instruction::Return { line: NO_LINE }])
        }))
    }
}

/// An instance method with an (empty) code attribute.
pub fn concrete(name: &str, descriptor: &str) -> MethodInfo {
    MethodInfo::new(name, descriptor).with_code(MethodCode::default())
}

/// A static method with an (empty) code attribute.
pub fn static_method(name: &str, descriptor: &str) -> MethodInfo {
    MethodInfo::new(name, descriptor)
        .with_access(AccessFlags(AccessFlags::STATIC))
        .with_code(MethodCode::default())
}

/// A static, exported method; the usual reachability root.
pub fn exported(name: &str, descriptor: &str) -> MethodInfo {
    static_method(name, descriptor).with_annotation(Annotation::new(known::EXPORT))
}
