//! String literal interning and the data segment.
//!
//! Literals are interned to dense ids in first-use order. At runtime a
//! literal is produced by the synthetic accessor, which resolves the id
//! against the data segment through a host import. The segment layout is
//! a count, an `(offset, length)` table, then the UTF-8 blob.

use indexmap::IndexMap;

use javelin_wasm::{FunctionName, ModuleWriter};

use crate::functions::FunctionManager;

const STRINGS_CLASS: &str = "javelin/internal/Strings";

pub struct StringManager {
    strings: IndexMap<String, u32>,
    accessor: FunctionName,
    resolver: FunctionName,
}

impl Default for StringManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StringManager {
    pub fn new() -> Self {
        let mut annotation = IndexMap::new();
        annotation.insert("module".to_string(), "javelin".to_string());
        annotation.insert("name".to_string(), "resolveString".to_string());
        let resolver = FunctionName::with_import(
            STRINGS_CLASS,
            "resolve",
            "(I)Ljava/lang/String;",
            annotation,
        );
        let accessor = FunctionName::with_text_code(
            STRINGS_CLASS,
            "literal",
            "(I)Ljava/lang/String;",
            "local.get 0 call $javelin/internal/Strings.resolve(I)Ljava/lang/String; return",
            None,
        );
        Self {
            strings: IndexMap::new(),
            accessor,
            resolver,
        }
    }

    /// Register the synthetic functions this manager relies on.
    pub fn init(&self, functions: &mut FunctionManager) {
        functions.register(&self.accessor);
        functions.register(&self.resolver);
    }

    /// Intern a literal; the first use of any literal pulls the accessor
    /// into the compilation.
    pub fn string_constant(&mut self, value: &str, functions: &mut FunctionManager) -> u32 {
        if let Some(&id) = self.strings.get(value) {
            return id;
        }
        functions.mark_as_needed(self.accessor.clone());
        let id = self.strings.len() as u32;
        self.strings.insert(value.to_string(), id);
        id
    }

    pub fn id_of(&self, value: &str) -> Option<u32> {
        self.strings.get(value).copied()
    }

    /// The function a lowered string constant calls.
    pub fn accessor(&self) -> &FunctionName {
        &self.accessor
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Emit the data segment, if any literal was used.
    pub fn prepare_finish(&self, writer: &mut dyn ModuleWriter) -> std::io::Result<()> {
        if self.strings.is_empty() {
            return Ok(());
        }
        writer.write_data_segment(&self.segment())
    }

    fn segment(&self) -> Vec<u8> {
        let mut table = Vec::with_capacity(4 + self.strings.len() * 8);
        let mut blob = Vec::new();
        table.extend_from_slice(&(self.strings.len() as u32).to_le_bytes());
        for value in self.strings.keys() {
            table.extend_from_slice(&(blob.len() as u32).to_le_bytes());
            table.extend_from_slice(&(value.len() as u32).to_le_bytes());
            blob.extend_from_slice(value.as_bytes());
        }
        table.extend_from_slice(&blob);
        table
    }
}
