//! Structured views of parsed class files.
//!
//! These types are the output contract of the external class-file parser:
//! everything the module generator reads from a class lives here. Code
//! payloads stay opaque byte blobs; only the instruction builder
//! interprets them.

use crate::access::AccessFlags;
use crate::annotations::{self, Annotation};

/// A parsed class file.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassFile {
    /// Internal name in slash form, e.g. `java/lang/Math`.
    pub name: String,
    /// Internal name of the superclass; `None` only for hierarchy roots.
    pub super_name: Option<String>,
    /// Directly implemented interfaces in declared order.
    pub interfaces: Vec<String>,
    pub access: AccessFlags,
    /// Source file attribute, when the compiler kept it.
    pub source_file: Option<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub annotations: Vec<Annotation>,
}

impl ClassFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_name: None,
            interfaces: Vec::new(),
            access: AccessFlags::default(),
            source_file: None,
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_super(mut self, super_name: impl Into<String>) -> Self {
        self.super_name = Some(super_name.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Look up a method by name and descriptor.
    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn annotation(&self, type_name: &str) -> Option<&Annotation> {
        annotations::find(&self.annotations, type_name)
    }

    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }
}

/// A field declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    /// JVM field descriptor, e.g. `I` or `Ljava/lang/String;`.
    pub descriptor: String,
    pub access: AccessFlags,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access: AccessFlags::default(),
        }
    }

    pub fn with_access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }
}

/// A method declaration, with its code payload when present.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodInfo {
    pub name: String,
    /// JVM method descriptor, e.g. `(II)I`.
    pub descriptor: String,
    pub access: AccessFlags,
    pub annotations: Vec<Annotation>,
    /// `None` for abstract and native methods.
    pub code: Option<MethodCode>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            access: AccessFlags::default(),
            annotations: Vec::new(),
            code: None,
        }
    }

    pub fn with_access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_code(mut self, code: MethodCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn annotation(&self, type_name: &str) -> Option<&Annotation> {
        annotations::find(&self.annotations, type_name)
    }

    pub fn is_static(&self) -> bool {
        self.access.is_static()
    }

    pub fn is_abstract(&self) -> bool {
        self.access.is_abstract()
    }

    pub fn is_native(&self) -> bool {
        self.access.is_native()
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }
}

/// The code attribute of a method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodCode {
    /// Raw stack-machine bytecode; interpreted by the instruction builder.
    pub bytes: Vec<u8>,
    pub max_stack: u16,
    pub max_locals: u16,
    /// Line-number table in bytecode order.
    pub line_numbers: Vec<LineNumber>,
    /// Local-variable debug table, when compiled with debug info.
    pub local_variables: Vec<LocalVariable>,
}

/// One entry of the line-number table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineNumber {
    pub pc: u16,
    pub line: u16,
}

/// One entry of the local-variable debug table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalVariable {
    pub index: u16,
    pub name: String,
    pub descriptor: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::known;

    #[test]
    fn method_lookup_matches_name_and_descriptor() {
        let class = ClassFile::new("demo/Calc")
            .with_method(MethodInfo::new("add", "(II)I"))
            .with_method(MethodInfo::new("add", "(JJ)J"));

        assert!(class.method("add", "(JJ)J").is_some());
        assert!(class.method("add", "(DD)D").is_none());
    }

    #[test]
    fn annotation_lookup_by_type_name() {
        let method = MethodInfo::new("log", "(I)V").with_annotation(
            Annotation::new(known::IMPORT)
                .with("module", "env")
                .with("name", "log"),
        );

        let ann = method.annotation(known::IMPORT).unwrap();
        assert_eq!(ann.get("module"), Some("env"));
        assert_eq!(ann.get("missing"), None);
    }
}
