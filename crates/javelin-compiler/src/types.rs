//! Class indices, struct layout, and v-tables.
//!
//! Every class the compilation observes gets a stable, contiguous index
//! and a struct layout: the synthetic v-table field first, then the
//! inherited fields root-down, then the class's own. The v-table itself
//! is an ordered list of function references; a method keyed by name and
//! descriptor reuses the slot its superclass assigned, so slot numbers
//! agree across a hierarchy.

use indexmap::IndexMap;

use javelin_classfile::{JavaType, descriptor};
use javelin_wasm::{FunctionName, ModuleWriter, ValueType};

use crate::Result;
use crate::functions::FunctionManager;
use crate::loader::ClassFileLoader;

/// Name of the synthetic v-table field, always at position zero. The
/// leading dot keeps it out of the Java identifier space.
pub const VTABLE_FIELD: &str = ".vtable";

/// Map a parsed Java type onto the wasm type the compiler uses for it.
pub fn value_type_of(java: &JavaType) -> ValueType {
    match java {
        JavaType::Boolean | JavaType::Byte | JavaType::Char | JavaType::Short | JavaType::Int => {
            ValueType::I32
        }
        JavaType::Long => ValueType::I64,
        JavaType::Float => ValueType::F32,
        JavaType::Double => ValueType::F64,
        JavaType::Object(name) => ValueType::Struct(name.clone()),
        JavaType::Array(_) => ValueType::ExternRef,
    }
}

/// One field of a struct layout.
#[derive(Clone, Debug, PartialEq)]
pub struct StructField {
    pub name: String,
    pub ty: ValueType,
}

/// The compiled shape of one class.
#[derive(Clone, Debug)]
pub struct StructType {
    name: String,
    class_index: u32,
    fields: Vec<StructField>,
    vtable: Vec<FunctionName>,
    /// `name + descriptor` of each virtual method to its slot.
    slots: IndexMap<String, usize>,
}

impl StructType {
    fn new(name: String, class_index: u32) -> Self {
        Self {
            name,
            class_index,
            fields: Vec::new(),
            vtable: Vec::new(),
            slots: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_index(&self) -> u32 {
        self.class_index
    }

    /// Field layout including the synthetic v-table field; populated by
    /// type finalization.
    pub fn fields(&self) -> &[StructField] {
        &self.fields
    }

    pub fn vtable(&self) -> &[FunctionName] {
        &self.vtable
    }

    /// The constant installed into the v-table field at construction.
    pub fn vtable_value(&self) -> i32 {
        self.class_index as i32
    }

    /// Slot of a virtual method, shared across the hierarchy.
    pub fn slot_of(&self, method_name: &str, descriptor: &str) -> Option<usize> {
        self.slots.get(&slot_key(method_name, descriptor)).copied()
    }
}

fn slot_key(method_name: &str, descriptor: &str) -> String {
    format!("{method_name}{descriptor}")
}

/// Assigns class indices and finalizes struct layouts.
#[derive(Default)]
pub struct TypeManager {
    types: IndexMap<String, StructType>,
    finish_cursor: usize,
}

impl TypeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent lookup; the first call per class assigns the next
    /// index.
    pub fn value_of(&mut self, class_name: &str) -> &StructType {
        let next_index = self.types.len() as u32;
        self.types
            .entry(class_name.to_string())
            .or_insert_with(|| StructType::new(class_name.to_string(), next_index))
    }

    pub fn get(&self, class_name: &str) -> Option<&StructType> {
        self.types.get(class_name)
    }

    /// Types in index order.
    pub fn used_types(&self) -> impl Iterator<Item = &StructType> {
        self.types.values()
    }

    /// Finalize every type not yet finalized: build the field layout and
    /// v-table, mark the chosen overrides as needed, and emit the v-table
    /// data. Callable repeatedly; each call picks up types registered
    /// since the last one.
    pub fn prepare_finish(
        &mut self,
        writer: &mut dyn ModuleWriter,
        functions: &mut FunctionManager,
        loader: &mut ClassFileLoader,
    ) -> Result<()> {
        while self.finish_cursor < self.types.len() {
            let name = self
                .types
                .get_index(self.finish_cursor)
                .map(|(name, _)| name.clone())
                .expect("cursor within bounds");
            self.finish_cursor += 1;
            self.finish_type(&name, writer, functions, loader)?;
        }
        Ok(())
    }

    fn finish_type(
        &mut self,
        type_name: &str,
        writer: &mut dyn ModuleWriter,
        functions: &mut FunctionManager,
        loader: &mut ClassFileLoader,
    ) -> Result<()> {
        // Hierarchy, root first. Elements pair the reference name with
        // the (possibly replaced) class file behind it.
        let mut chain = Vec::new();
        let mut current = Some(type_name.to_string());
        while let Some(name) = current {
            let class = loader.get_or_missing(&name)?;
            current = class.super_name.clone();
            chain.push((name, class));
        }
        chain.reverse();

        // Field layout: v-table slot first, then inherited fields.
        let mut fields = vec![StructField {
            name: VTABLE_FIELD.to_string(),
            ty: ValueType::I32,
        }];
        for (_, class) in &chain {
            for field in &class.fields {
                if field.access.is_static() {
                    continue;
                }
                let parsed = descriptor::parse_field_descriptor(&field.descriptor)?;
                fields.push(StructField {
                    name: field.name.clone(),
                    ty: value_type_of(&parsed),
                });
            }
        }

        // Slot assignment: declaration order root-down, superclass slots
        // reused.
        let mut slots: IndexMap<String, usize> = IndexMap::new();
        let mut declarations: Vec<(String, String)> = Vec::new();
        for (_, class) in &chain {
            for method in &class.methods {
                if method.is_static() || method.is_constructor() || method.access.is_private() {
                    continue;
                }
                let key = slot_key(&method.name, &method.descriptor);
                if !slots.contains_key(&key) {
                    slots.insert(key, declarations.len());
                    declarations.push((method.name.clone(), method.descriptor.clone()));
                }
            }
        }

        // Resolve each slot to the most-derived override with a body.
        let mut vtable = Vec::with_capacity(declarations.len());
        for (method_name, method_descriptor) in &declarations {
            let concrete = chain.iter().rev().find_map(|(name, class)| {
                class
                    .method(method_name, method_descriptor)
                    .filter(|m| m.code.is_some())
                    .map(|_| FunctionName::new(name, method_name, method_descriptor))
            });
            match concrete {
                Some(target) => {
                    functions.set_need_this_parameter(&target);
                    functions.mark_as_needed(target.clone());
                    vtable.push(target);
                }
                None => {
                    // Abstract everywhere; keep the declaration so slot
                    // numbering stays dense. Never dispatched through a
                    // concrete receiver.
                    let declared = chain
                        .iter()
                        .find(|(_, class)| class.method(method_name, method_descriptor).is_some())
                        .map(|(name, _)| name.as_str())
                        .unwrap_or(type_name);
                    vtable.push(FunctionName::new(declared, method_name, method_descriptor));
                }
            }
        }

        let entry = self
            .types
            .get_mut(type_name)
            .expect("finalizing a registered type");
        entry.fields = fields;
        entry.slots = slots;
        entry.vtable = vtable;

        let entry = &self.types[type_name];
        writer.write_vtable(&entry.name, entry.class_index, &entry.vtable)?;
        Ok(())
    }
}
