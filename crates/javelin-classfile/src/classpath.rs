//! Classpath lookup of classes by internal name.

use indexmap::IndexMap;
use thiserror::Error;
use tracing::warn;

use crate::class::ClassFile;
use crate::library::{Library, LibraryError};
use crate::parser::{ClassFileParser, ParseError};

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Produces class files by internal name.
///
/// The class-file loader consults a classpath on cache miss; everything
/// behind this trait (file systems, archives, test fixtures) is
/// interchangeable.
pub trait Classpath {
    fn find(&mut self, internal_name: &str) -> Result<Option<ClassFile>, ClasspathError>;
}

/// In-memory classpath, keyed by class name.
#[derive(Debug, Default)]
pub struct MemoryClasspath {
    classes: IndexMap<String, ClassFile>,
}

impl MemoryClasspath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: ClassFile) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Builder-style insert for fixture setup.
    pub fn with(mut self, class: ClassFile) -> Self {
        self.insert(class);
        self
    }
}

impl Classpath for MemoryClasspath {
    fn find(&mut self, internal_name: &str) -> Result<Option<ClassFile>, ClasspathError> {
        Ok(self.classes.get(internal_name).cloned())
    }
}

/// Classpath over a list of libraries, parsing on demand.
///
/// Libraries are searched in order; the first hit wins.
pub struct LibraryClasspath {
    libraries: Vec<Library>,
    parser: Box<dyn ClassFileParser>,
}

impl LibraryClasspath {
    pub fn new(libraries: Vec<Library>, parser: Box<dyn ClassFileParser>) -> Self {
        Self { libraries, parser }
    }
}

impl Classpath for LibraryClasspath {
    fn find(&mut self, internal_name: &str) -> Result<Option<ClassFile>, ClasspathError> {
        for library in &self.libraries {
            let Some(bytes) = library.read_class(internal_name)? else {
                continue;
            };
            match self.parser.parse(&bytes) {
                Ok(class) => return Ok(Some(class)),
                Err(err) => {
                    warn!(class = internal_name, %err, "skipping unparsable class");
                    continue;
                }
            }
        }
        Ok(None)
    }
}
