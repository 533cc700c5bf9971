//! Prepare phase: library walk and annotation processing.
//!
//! Every provided library is scanned class by class. Class-level
//! `Replace`/`Partial` annotations register loader overlays; method-level
//! `Import`/`Export`/`Replace`/`TextCode` annotations feed the function
//! manager. Exported methods are the reachability roots everything else
//! grows from.

use std::rc::Rc;

use tracing::{debug, warn};

use javelin_classfile::annotations::known;
use javelin_classfile::{Annotation, ClassFile, ClassFileParser, Library, MethodInfo};
use javelin_wasm::FunctionName;

use crate::functions::MethodRef;
use crate::{Error, Result};

use super::ModuleGenerator;

impl ModuleGenerator {
    /// Scan every class of every library. Unparsable classes are logged
    /// and skipped; annotation misuse is fatal.
    pub fn prepare_libraries(
        &mut self,
        libraries: &[Library],
        parser: &dyn ClassFileParser,
    ) -> Result<()> {
        for library in libraries {
            debug!(library = %library.path().display(), "scanning library");
            for entry in library.classes()? {
                match parser.parse(&entry.bytes) {
                    Ok(class) => self.prepare_class(class)?,
                    Err(err) => warn!(class = %entry.name, %err, "skipping unparsable class"),
                }
            }
        }
        Ok(())
    }

    /// Register one class: loader overlays, imports, exports,
    /// replacements, text-code bodies.
    pub fn prepare_class(&mut self, class: ClassFile) -> Result<()> {
        let replace_target = annotation_value(&class.annotation(known::REPLACE).cloned())?;
        let partial_target = annotation_value(&class.annotation(known::PARTIAL).cloned())?;

        // Methods of a replacing or overlaying class belong to the target
        // name as far as callers are concerned.
        let effective = replace_target
            .as_deref()
            .or(partial_target.as_deref())
            .unwrap_or(&class.name)
            .to_string();

        for method in class.methods.clone() {
            self.prepare_method(&effective, &class, &method)
                .map_err(|err| err.locate(&class.name, class.source_file.as_deref(), -1))?;
        }

        if let Some(target) = replace_target {
            self.loader.replace(&target, class);
        } else if let Some(target) = partial_target {
            self.loader.partial(&target, class);
        } else {
            self.loader.cache(class);
        }
        Ok(())
    }

    fn prepare_method(
        &mut self,
        class_name: &str,
        class: &ClassFile,
        method: &MethodInfo,
    ) -> Result<()> {
        if let Some(annotation) = method.annotation(known::TEXT_CODE) {
            let source = annotation.get("value").ok_or_else(|| {
                Error::AnnotationViolation(format!(
                    "text code without a body on {class_name}.{}",
                    method.name
                ))
            })?;
            let name = FunctionName::with_text_code(
                class_name,
                &method.name,
                &method.descriptor,
                source,
                annotation.get("signature").map(str::to_string),
            );
            self.functions.register(&name);
        }

        if let Some(annotation) = method.annotation(known::IMPORT) {
            if !method.is_static() {
                return Err(Error::AnnotationViolation(format!(
                    "imported method must be static: {class_name}.{}",
                    method.name
                )));
            }
            let name = FunctionName::new(class_name, &method.name, &method.descriptor);
            self.functions.mark_as_import(name, annotation.values.clone());
        }

        if let Some(annotation) = method.annotation(known::EXPORT) {
            if !method.is_static() {
                return Err(Error::AnnotationViolation(format!(
                    "exported method must be static: {class_name}.{}",
                    method.name
                )));
            }
            let name = FunctionName::new(class_name, &method.name, &method.descriptor);
            // Export names default to the raw method name, verbatim.
            let export_name = annotation.get("name").unwrap_or(&method.name).to_string();
            self.functions.mark_as_needed(name.clone());
            self.exports.push((name, export_name));
        }

        if let Some(annotation) = method.annotation(known::REPLACE) {
            let value = annotation.get("value").ok_or_else(|| {
                Error::AnnotationViolation(format!(
                    "replacement without a target on {class_name}.{}",
                    method.name
                ))
            })?;
            let target = FunctionName::from_signature_name(value).ok_or_else(|| {
                Error::AnnotationViolation(format!("malformed replacement target {value:?}"))
            })?;
            self.functions.add_replacement(
                target,
                MethodRef {
                    class: Rc::new(class.clone()),
                    method: method.clone(),
                },
            );
        }

        Ok(())
    }
}

/// The `value` element of an optional annotation, required when the
/// annotation is present.
fn annotation_value(annotation: &Option<Annotation>) -> Result<Option<String>> {
    match annotation {
        None => Ok(None),
        Some(annotation) => annotation
            .get("value")
            .map(|v| Some(v.to_string()))
            .ok_or_else(|| {
                Error::AnnotationViolation(format!(
                    "{} requires a target class",
                    annotation.type_name
                ))
            }),
    }
}
