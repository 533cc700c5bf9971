//! Finalize and emit.
//!
//! Finalization runs the scan to its fixed point (type finalization can
//! introduce override methods, which can register more types), then
//! writes imports, exports, and the data segment. Emission streams each
//! function with four in-stream fix-ups: source-line markers, exception
//! prologues, self-installing struct construction, and string-constant
//! lowering. Virtual calls lower to an indirect call through the
//! receiver's v-table slot.

use javelin_wasm::{FunctionName, Instruction, ModuleWriter, NO_LINE, WasmValue};

use crate::optimizer::CodeOptimizer;
use crate::types::VTABLE_FIELD;
use crate::{Error, Result};

use super::ModuleGenerator;
use super::signature::write_signature;

impl ModuleGenerator {
    /// Finalize the compilation and emit every needed function.
    pub fn finish(&mut self, writer: &mut dyn ModuleWriter) -> Result<()> {
        self.scan_functions()?;
        loop {
            self.types
                .prepare_finish(writer, &mut self.functions, &mut self.loader)?;
            if !self.functions.has_scan_later() {
                break;
            }
            self.scan_functions()?;
        }
        if let Some(name) = self.functions.unresolved() {
            return Err(Error::MissingFunction(name.signature_name().to_string()));
        }
        self.functions.prepare_finish();

        // The imports bloc precedes every defined body.
        for (name, annotation) in self.functions.needed_imports() {
            let module = annotation.get("module").ok_or_else(|| {
                Error::AnnotationViolation(format!("import without a module: {name}"))
            })?;
            let field = annotation
                .get("name")
                .map(String::as_str)
                .unwrap_or(name.method_name());
            writer.prepare_import(name, module, field)?;
        }
        for (name, export_name) in &self.exports {
            writer.write_export(name, export_name)?;
        }
        self.strings.prepare_finish(writer)?;
        writer.prepare_finish()?;

        while let Some(name) = self.functions.next_write_later() {
            self.write_method(&name, writer)?;
        }
        Ok(())
    }

    fn write_method(&mut self, name: &FunctionName, writer: &mut dyn ModuleWriter) -> Result<()> {
        let source_file = self
            .loader
            .get(name.class_name())
            .ok()
            .flatten()
            .and_then(|class| class.source_file.clone());
        self.write_method_inner(name, source_file.as_deref(), writer)
            .map_err(|err| err.locate(name.class_name(), source_file.as_deref(), NO_LINE))
    }

    fn write_method_inner(
        &mut self,
        name: &FunctionName,
        source_file: Option<&str>,
        writer: &mut dyn ModuleWriter,
    ) -> Result<()> {
        let mut body = self
            .bodies
            .shift_remove(name.signature_name())
            .ok_or_else(|| Error::MissingFunction(name.signature_name().to_string()))?;

        writer.write_method_start(name, source_file)?;
        self.functions.mark_as_written(name);
        write_signature(writer, name, Some(&body), &self.functions, &mut self.types)?;

        CodeOptimizer::optimize(&mut body.instructions);

        let mut last_line = NO_LINE;
        for instruction in &body.instructions {
            self.write_instruction(instruction, &mut last_line, writer)
                .map_err(|err| err.locate(name.class_name(), source_file, instruction.line()))?;
        }

        writer.write_method_finish()?;
        Ok(())
    }

    fn write_instruction(
        &mut self,
        instruction: &Instruction,
        last_line: &mut i32,
        writer: &mut dyn ModuleWriter,
    ) -> Result<()> {
        let line = instruction.line();
        if line >= 0 && line != *last_line {
            writer.mark_source_line(line)?;
            *last_line = line;
        }

        match instruction {
            Instruction::Block { op, .. } if op.is_exception() => {
                if self.options.use_eh() {
                    writer.write_exception()?;
                }
                writer.write_instruction(instruction)?;
            }

            Instruction::StructNewDefault { type_name, .. } => {
                if self.options.use_gc() {
                    let struct_type = self
                        .types
                        .get(type_name)
                        .ok_or_else(|| Error::MissingClass(type_name.clone()))?;
                    // Field initializers in declared order; the v-table
                    // slot gets the class index, everything else its
                    // type's default.
                    for field in struct_type.fields() {
                        if field.name == VTABLE_FIELD {
                            writer.write_const(WasmValue::I32(struct_type.vtable_value()))?;
                        } else {
                            writer.write_default_value(&field.ty)?;
                        }
                    }
                }
                writer.write_instruction(instruction)?;
            }

            Instruction::StringConst { value, .. } => {
                let id = self.strings.id_of(value).ok_or_else(|| {
                    Error::Unsupported(format!("string literal was not interned: {value:?}"))
                })?;
                writer.write_const(WasmValue::I32(id as i32))?;
                writer.write_instruction(&Instruction::Call {
                    target: self.strings.accessor().clone(),
                    line,
                })?;
            }

            Instruction::Call { target, .. } => {
                // Calls may be introduced late; keep the state honest.
                self.functions.mark_as_needed(target.clone());
                let resolved = self.functions.alias_target(target);
                writer.write_instruction(&Instruction::Call {
                    target: resolved,
                    line,
                })?;
            }

            Instruction::CallVirtual { target, .. } => {
                self.functions.mark_as_needed(target.clone());
                let struct_type = self
                    .types
                    .get(target.class_name())
                    .ok_or_else(|| Error::MissingClass(target.class_name().to_string()))?;
                let slot = struct_type
                    .slot_of(target.method_name(), target.signature())
                    .ok_or_else(|| {
                        Error::MissingFunction(target.signature_name().to_string())
                    })?;
                writer.write_instruction(&Instruction::StructGet {
                    type_name: target.class_name().to_string(),
                    field: VTABLE_FIELD.to_string(),
                    line,
                })?;
                writer.write_const(WasmValue::I32(slot as i32))?;
                writer.write_instruction(&Instruction::CallIndirect {
                    signature: target.signature().to_string(),
                    line,
                })?;
            }

            Instruction::CallInterface { target, .. } => {
                return Err(Error::Unsupported(format!(
                    "Interface calls are not supported: {target}"
                )));
            }

            _ => writer.write_instruction(instruction)?,
        }
        Ok(())
    }
}
