//! Javelin compiler core: the module generation pipeline.
//!
//! This crate turns parsed class files into a WebAssembly module through a
//! pluggable writer:
//! - `loader` - class-file cache with replace/partial overlays
//! - `functions` - reachability worklist and dispatch state
//! - `types` - class indices, struct layout, v-tables
//! - `strings` - string literal interning and the data segment
//! - `optimizer` - the single peephole pass
//! - `generate` - the `ModuleGenerator` driver (prepare, scan, finalize, emit)
//!
//! Method bodies are translated by an external instruction builder,
//! consumed through the [`CodeBuilder`] trait.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod functions;
pub mod generate;
pub mod loader;
pub mod optimizer;
pub mod strings;
pub mod types;

mod builder;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod types_tests;

use std::fmt;

pub use builder::{BodyLocal, CodeBuilder, MethodBody};
pub use generate::ModuleGenerator;

/// Where a failure happened, attached when an error crosses the
/// per-method boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub class_name: String,
    pub source_file: Option<String>,
    /// Source line, negative when unknown.
    pub line: i32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name)?;
        if let Some(file) = &self.source_file {
            write!(f, " ({file}")?;
            if self.line >= 0 {
                write!(f, ":{}", self.line)?;
            }
            write!(f, ")")?;
        } else if self.line >= 0 {
            write!(f, " (line {})", self.line)?;
        }
        Ok(())
    }
}

/// Errors raised by the module generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A hierarchy traversal dereferenced a class nobody can produce.
    #[error("missing class: {0}")]
    MissingClass(String),

    /// A needed function has no body through any resolution path.
    #[error("missing function: {0}")]
    MissingFunction(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("annotation misuse: {0}")]
    AnnotationViolation(String),

    #[error(transparent)]
    Classpath(#[from] javelin_classfile::ClasspathError),

    #[error(transparent)]
    Library(#[from] javelin_classfile::LibraryError),

    #[error(transparent)]
    Descriptor(#[from] javelin_classfile::DescriptorError),

    #[error(transparent)]
    TextCode(#[from] javelin_wasm::wat::WatError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A failure wrapped with the site it came from.
    #[error("in {location}: {source}")]
    Context {
        location: SourceLocation,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach a source location; an already-located error is untouched.
    pub fn locate(self, class_name: &str, source_file: Option<&str>, line: i32) -> Self {
        match self {
            Self::Context { .. } => self,
            other => Self::Context {
                location: SourceLocation {
                    class_name: class_name.to_string(),
                    source_file: source_file.map(str::to_string),
                    line,
                },
                source: Box::new(other),
            },
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
