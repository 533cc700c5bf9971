//! The `ModuleGenerator` driver.
//!
//! Owns one of each manager for the lifetime of a compilation and runs
//! the four phases:
//! - `prepare` - library walk, annotation processing, reachability roots
//! - `scan` - worklist drain with hierarchy resolution
//! - finalize - imports, exports, v-tables, data segment (in `emit`)
//! - emit - signatures and fixed-up instruction streams (in `emit`)

mod emit;
mod prepare;
mod scan;
mod signature;


use indexmap::IndexMap;

use javelin_classfile::Classpath;
use javelin_wasm::{CompilerOptions, FunctionName};

use crate::builder::{CodeBuilder, MethodBody};
use crate::functions::FunctionManager;
use crate::loader::ClassFileLoader;
use crate::strings::StringManager;
use crate::types::TypeManager;

/// Drives one compilation from prepared classes to an emitted module.
pub struct ModuleGenerator {
    options: CompilerOptions,
    loader: ClassFileLoader,
    functions: FunctionManager,
    types: TypeManager,
    strings: StringManager,
    builder: Box<dyn CodeBuilder>,
    /// Scanned bodies awaiting emission, keyed by signature name.
    bodies: IndexMap<String, MethodBody>,
    /// Export roots in registration order.
    exports: Vec<(FunctionName, String)>,
}

impl ModuleGenerator {
    pub fn new(
        options: CompilerOptions,
        classpath: Box<dyn Classpath>,
        builder: Box<dyn CodeBuilder>,
    ) -> Self {
        let mut functions = FunctionManager::new();
        let strings = StringManager::new();
        strings.init(&mut functions);

        Self {
            options,
            loader: ClassFileLoader::new(classpath),
            functions,
            types: TypeManager::new(),
            strings,
            builder,
            bodies: IndexMap::new(),
            exports: Vec::new(),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn functions(&self) -> &FunctionManager {
        &self.functions
    }

    pub fn types(&self) -> &TypeManager {
        &self.types
    }

    pub fn loader_mut(&mut self) -> &mut ClassFileLoader {
        &mut self.loader
    }
}
