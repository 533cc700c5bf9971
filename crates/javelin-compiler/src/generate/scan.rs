//! Scan phase: worklist drain and hierarchy resolution.
//!
//! Each needed name either carries a synthetic body, resolves directly in
//! its declaring class (replacements supplanting the found body), or is
//! aliased to a superclass method or interface default. The scanner only
//! cares about call instructions; everything else flows through
//! untouched. Struct allocations, virtual-call receivers, and string
//! literals are side-registered so finalization sees every type and
//! literal before emission.

use tracing::debug;

use javelin_classfile::annotations::known;
use javelin_wasm::{FunctionName, Instruction, SyntheticBody, wat};

use crate::builder::MethodBody;
use crate::functions::MethodRef;
use crate::{Error, Result};

use super::ModuleGenerator;

impl ModuleGenerator {
    /// Drain the worklist until nothing is pending. Scanning one method
    /// may add more; the loop runs to the fixed point.
    pub fn scan_functions(&mut self) -> Result<()> {
        while let Some(name) = self.functions.next_scan_later() {
            debug!(function = %name, "scanning");
            self.scan_method(&name)
                .map_err(|err| err.locate(name.class_name(), None, -1))?;
        }
        Ok(())
    }

    fn scan_method(&mut self, name: &FunctionName) -> Result<()> {
        // Synthetic names bypass class-file lookup entirely.
        match name.synthetic() {
            Some(SyntheticBody::Import { annotation }) => {
                self.functions.mark_as_import(name.clone(), annotation.clone());
                self.functions.mark_as_scanned(name, false);
                return Ok(());
            }
            Some(SyntheticBody::Text { source, .. }) => {
                let instructions = wat::parse(source)?;
                self.scan_instructions(&instructions);
                self.bodies
                    .insert(name.signature_name().to_string(), MethodBody::new(instructions));
                self.functions.mark_as_scanned(name, false);
                return Ok(());
            }
            None => {}
        }

        if self.functions.is_import(name) {
            self.functions.mark_as_scanned(name, false);
            return Ok(());
        }

        // Direct lookup, with any recorded replacement supplanting the
        // found body. A replacement also satisfies a name whose platform
        // class was never provided.
        let direct = self.find_direct(name)?;
        match self.functions.replace(name, direct) {
            Some(found) => self.scan_body(name, found),
            None => {
                if self.resolve_through_hierarchy(name)? {
                    return Ok(());
                }
                Err(Error::MissingFunction(name.signature_name().to_string()))
            }
        }
    }

    fn find_direct(&mut self, name: &FunctionName) -> Result<Option<MethodRef>> {
        let Some(class) = self.loader.get(name.class_name())? else {
            return Ok(None);
        };
        Ok(class
            .method(name.method_name(), name.signature())
            .cloned()
            .map(|method| MethodRef {
                class: class.clone(),
                method,
            }))
    }

    fn scan_body(&mut self, name: &FunctionName, source: MethodRef) -> Result<()> {
        let method = &source.method;

        // Classes found on the classpath were never prepared, so their
        // method annotations surface here.
        if let Some(annotation) = method.annotation(known::IMPORT) {
            if !method.is_static() {
                return Err(Error::AnnotationViolation(format!(
                    "imported method must be static: {name}"
                )));
            }
            self.functions
                .mark_as_import(name.clone(), annotation.values.clone());
            self.functions.mark_as_scanned(name, false);
            return Ok(());
        }
        if let Some(annotation) = method.annotation(known::TEXT_CODE) {
            let text = annotation.get("value").ok_or_else(|| {
                Error::AnnotationViolation(format!("text code without a body on {name}"))
            })?;
            let synthetic = FunctionName::with_text_code(
                name.class_name(),
                name.method_name(),
                name.signature(),
                text,
                annotation.get("signature").map(str::to_string),
            );
            self.functions.register(&synthetic);
            let instructions = wat::parse(text)?;
            self.scan_instructions(&instructions);
            self.bodies
                .insert(name.signature_name().to_string(), MethodBody::new(instructions));
            self.functions.mark_as_scanned(name, false);
            return Ok(());
        }

        if method.code.is_none() {
            return Err(Error::Unsupported(format!(
                "abstract or native method reached: {name}"
            )));
        }

        let body = self.builder.build(&source.class, method)?;
        self.scan_instructions(&body.instructions);
        let needs_this = !method.is_static() || method.is_constructor();
        self.bodies
            .insert(name.signature_name().to_string(), body);
        self.functions.mark_as_scanned(name, needs_this);
        Ok(())
    }

    /// Mark everything a body can reach: callees of the call shapes, the
    /// receiver types of virtual calls and struct operations, and string
    /// literals.
    fn scan_instructions(&mut self, instructions: &[Instruction]) {
        for instruction in instructions {
            match instruction {
                Instruction::Call { target, .. }
                | Instruction::CallInterface { target, .. } => {
                    self.functions.mark_as_needed(target.clone());
                }
                Instruction::CallVirtual { target, .. } => {
                    self.functions.mark_as_needed(target.clone());
                    self.types.value_of(target.class_name());
                }
                Instruction::StructNew { type_name, .. }
                | Instruction::StructNewDefault { type_name, .. }
                | Instruction::StructGet { type_name, .. }
                | Instruction::StructSet { type_name, .. } => {
                    self.types.value_of(type_name);
                }
                Instruction::StringConst { value, .. } => {
                    self.strings.string_constant(value, &mut self.functions);
                }
                _ => {}
            }
        }
    }

    /// Superclass chain first, then interface defaults at each level,
    /// interfaces in declared order. A hit aliases the unresolved name.
    fn resolve_through_hierarchy(&mut self, name: &FunctionName) -> Result<bool> {
        let Some(start) = self.loader.get(name.class_name())? else {
            return Ok(false);
        };

        let mut current = start.clone();
        loop {
            let Some(super_name) = current.super_name.clone() else {
                break;
            };
            let superclass = self.loader.get_or_missing(&super_name)?;
            if superclass
                .method(name.method_name(), name.signature())
                .is_some()
            {
                self.alias_to(name, &super_name);
                return Ok(true);
            }
            current = superclass;
        }

        let mut current = Some(start);
        while let Some(class) = current {
            for interface_name in &class.interfaces {
                let interface = self.loader.get_or_missing(interface_name)?;
                if interface
                    .method(name.method_name(), name.signature())
                    .is_some_and(|m| m.code.is_some())
                {
                    self.alias_to(name, interface_name);
                    return Ok(true);
                }
            }
            current = match &class.super_name {
                Some(super_name) => Some(self.loader.get_or_missing(super_name)?),
                None => None,
            };
        }

        Ok(false)
    }

    fn alias_to(&mut self, from: &FunctionName, class_name: &str) {
        let found = FunctionName::new(class_name, from.method_name(), from.signature());
        debug!(from = %from, to = %found, "aliased through hierarchy");
        self.functions.mark_as_needed(found.clone());
        self.functions.set_alias(from, found);
    }
}
