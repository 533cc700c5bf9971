//! Annotations as ordered key/value maps.
//!
//! Annotation semantics live in the module generator; this module only
//! carries the data: the annotation type's internal class name plus its
//! element values, stringified by the parser.

use indexmap::IndexMap;

/// Internal class names of the annotations the compiler recognizes.
pub mod known {
    /// Class-level full replacement, method-level body replacement.
    pub const REPLACE: &str = "javelin/annotation/Replace";
    /// Class-level partial overlay.
    pub const PARTIAL: &str = "javelin/annotation/Partial";
    /// Method is provided by the host environment.
    pub const IMPORT: &str = "javelin/annotation/Import";
    /// Method is a reachability root and exported from the module.
    pub const EXPORT: &str = "javelin/annotation/Export";
    /// Method body given as textual WebAssembly.
    pub const TEXT_CODE: &str = "javelin/annotation/TextCode";
}

/// A single annotation occurrence on a class or method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    /// Internal class name of the annotation type (slash form).
    pub type_name: String,
    /// Element values in declaration order.
    pub values: IndexMap<String, String>,
}

impl Annotation {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            values: IndexMap::new(),
        }
    }

    /// Add an element value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Find an annotation by type name in a declaration-ordered list.
pub fn find<'a>(annotations: &'a [Annotation], type_name: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.type_name == type_name)
}
