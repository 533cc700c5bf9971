//! Reachability worklist and dispatch state.
//!
//! Every callable the compilation touches gets an entry here, keyed by
//! signature name. States move Unknown → Known → Needed → Scanned →
//! Written and never backwards; an aliased name parks at Scanned and is
//! never written itself. All buckets yield items in the order they were
//! first promoted into them.

use std::collections::VecDeque;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::warn;

use javelin_classfile::{ClassFile, MethodInfo};
use javelin_wasm::FunctionName;

/// Pipeline state of one function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FunctionState {
    /// Observed, nothing requested yet.
    Known,
    /// On the worklist, body not yet scanned.
    Needed,
    /// Body scanned (or aliased/import, which never get bodies).
    Scanned,
    Written,
}

/// A method together with the class file it lives in, as handed to the
/// instruction builder.
#[derive(Clone, Debug)]
pub struct MethodRef {
    pub class: Rc<ClassFile>,
    pub method: MethodInfo,
}

#[derive(Debug)]
struct FunctionEntry {
    name: FunctionName,
    state: FunctionState,
    needs_this: bool,
    import: Option<IndexMap<String, String>>,
    /// Signature name of the function that satisfies this one.
    alias: Option<String>,
    replacement: Option<MethodRef>,
    in_write_order: bool,
}

impl FunctionEntry {
    fn new(name: FunctionName) -> Self {
        Self {
            name,
            state: FunctionState::Known,
            needs_this: false,
            import: None,
            alias: None,
            replacement: None,
            in_write_order: false,
        }
    }
}

/// The worklist and dispatch table.
#[derive(Default)]
pub struct FunctionManager {
    entries: IndexMap<String, FunctionEntry>,
    /// FIFO of names promoted to Needed, pending scan.
    scan_queue: VecDeque<String>,
    /// Imports in first-registration order.
    import_order: Vec<String>,
    /// Writable functions in first-scan order.
    write_order: Vec<String>,
    write_cursor: usize,
    frozen: bool,
}

impl std::fmt::Debug for FunctionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionManager")
            .field("entries", &self.entries.len())
            .field("pending", &self.scan_queue.len())
            .finish()
    }
}

impl FunctionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a name without requesting it. Absorbs a synthetic payload
    /// if the stored name lacks one.
    pub fn register(&mut self, name: &FunctionName) {
        self.entry_mut(name);
    }

    fn entry_mut(&mut self, name: &FunctionName) -> &mut FunctionEntry {
        let key = name.signature_name().to_string();
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| FunctionEntry::new(name.clone()));
        if entry.name.synthetic().is_none() && name.synthetic().is_some() {
            entry.name = name.clone();
        }
        entry
    }

    /// Whether this name has been observed in any state.
    pub fn is_known(&self, name: &FunctionName) -> bool {
        self.entries.contains_key(name.signature_name())
    }

    pub fn state(&self, name: &FunctionName) -> Option<FunctionState> {
        self.entries.get(name.signature_name()).map(|e| e.state)
    }

    /// Promote to Needed; idempotent for anything already at Needed or
    /// beyond. After finalization this only observes, never promotes.
    pub fn mark_as_needed(&mut self, name: FunctionName) {
        if self.frozen {
            self.register(&name);
            return;
        }
        let entry = self.entry_mut(&name);
        let promote = entry.state < FunctionState::Needed;
        if promote {
            entry.state = FunctionState::Needed;
        }
        if promote {
            self.scan_queue.push_back(name.signature_name().to_string());
        }
    }

    /// Record the name as externally provided; it is emitted as an import
    /// and never scanned for a body.
    pub fn mark_as_import(&mut self, name: FunctionName, annotation: IndexMap<String, String>) {
        let entry = self.entry_mut(&name);
        let first = entry.import.is_none();
        if first {
            entry.import = Some(annotation);
        }
        if first {
            self.import_order.push(name.signature_name().to_string());
        }
    }

    pub fn import_annotation(&self, name: &FunctionName) -> Option<&IndexMap<String, String>> {
        self.entries
            .get(name.signature_name())
            .and_then(|e| e.import.as_ref())
    }

    pub fn is_import(&self, name: &FunctionName) -> bool {
        self.import_annotation(name).is_some()
    }

    /// Record that compiling `target` uses `replacement`'s body instead.
    pub fn add_replacement(&mut self, target: FunctionName, replacement: MethodRef) {
        if !replacement.method.is_static() {
            self.set_need_this_parameter(&target);
        }
        let entry = self.entry_mut(&target);
        if entry.replacement.is_some() {
            warn!(function = %target, "duplicate replacement ignored");
            return;
        }
        entry.replacement = Some(replacement);
    }

    /// If a replacement exists for `name`, return it; otherwise hand back
    /// the input.
    pub fn replace(&self, name: &FunctionName, found: Option<MethodRef>) -> Option<MethodRef> {
        match self
            .entries
            .get(name.signature_name())
            .and_then(|e| e.replacement.clone())
        {
            Some(replacement) => Some(replacement),
            None => found,
        }
    }

    /// Sticky: once a name takes an implicit receiver it keeps it.
    pub fn set_need_this_parameter(&mut self, name: &FunctionName) {
        self.entry_mut(name).needs_this = true;
    }

    pub fn need_this_parameter(&self, name: &FunctionName) -> bool {
        self.entries
            .get(name.signature_name())
            .is_some_and(|e| e.needs_this)
    }

    /// Record that `from` is satisfied by `to`; `from` is never written.
    pub fn set_alias(&mut self, from: &FunctionName, to: FunctionName) {
        let entry = self.entry_mut(from);
        entry.alias = Some(to.signature_name().to_string());
        if entry.state < FunctionState::Scanned {
            entry.state = FunctionState::Scanned;
        }
    }

    pub fn is_alias(&self, name: &FunctionName) -> bool {
        self.entries
            .get(name.signature_name())
            .is_some_and(|e| e.alias.is_some())
    }

    /// Resolve a name through the alias table to the function that
    /// actually carries the body.
    pub fn alias_target(&self, name: &FunctionName) -> FunctionName {
        let mut key = name.signature_name();
        let mut hops = 0;
        while let Some(entry) = self.entries.get(key) {
            match &entry.alias {
                Some(next) if hops < self.entries.len() => {
                    key = next;
                    hops += 1;
                }
                _ => return entry.name.clone(),
            }
        }
        name.clone()
    }

    /// Next name in Needed-but-not-Scanned state, FIFO on promotion.
    pub fn next_scan_later(&mut self) -> Option<FunctionName> {
        while let Some(key) = self.scan_queue.pop_front() {
            if let Some(entry) = self.entries.get(&key)
                && entry.state == FunctionState::Needed
            {
                return Some(entry.name.clone());
            }
        }
        None
    }

    pub fn has_scan_later(&self) -> bool {
        self.scan_queue
            .iter()
            .any(|key| self.entries.get(key).is_some_and(|e| e.state == FunctionState::Needed))
    }

    pub fn mark_as_scanned(&mut self, name: &FunctionName, needs_this: bool) {
        let entry = self.entry_mut(name);
        if needs_this {
            entry.needs_this = true;
        }
        if entry.state < FunctionState::Scanned {
            entry.state = FunctionState::Scanned;
        }
        let writable = entry.import.is_none() && entry.alias.is_none() && !entry.in_write_order;
        if writable {
            entry.in_write_order = true;
        }
        if writable {
            self.write_order.push(name.signature_name().to_string());
        }
    }

    /// Idempotent per name.
    pub fn mark_as_written(&mut self, name: &FunctionName) {
        let entry = self.entry_mut(name);
        entry.state = FunctionState::Written;
    }

    /// Needed imports in first-registration order.
    pub fn needed_imports(
        &self,
    ) -> impl Iterator<Item = (&FunctionName, &IndexMap<String, String>)> {
        self.import_order.iter().filter_map(|key| {
            let entry = self.entries.get(key)?;
            if entry.state < FunctionState::Needed {
                return None;
            }
            Some((&entry.name, entry.import.as_ref()?))
        })
    }

    /// Every needed non-import function, aliased ones included.
    pub fn needed_functions(&self) -> impl Iterator<Item = &FunctionName> {
        self.entries.values().filter_map(|entry| {
            (entry.state >= FunctionState::Needed && entry.import.is_none())
                .then_some(&entry.name)
        })
    }

    /// First needed non-import name that never reached Scanned, if any.
    pub fn unresolved(&self) -> Option<&FunctionName> {
        self.entries.values().find_map(|entry| {
            (entry.state == FunctionState::Needed && entry.import.is_none())
                .then_some(&entry.name)
        })
    }

    /// Next function to write. Items appended while iterating are still
    /// yielded before the iteration ends.
    pub fn next_write_later(&mut self) -> Option<FunctionName> {
        let key = self.write_order.get(self.write_cursor)?;
        self.write_cursor += 1;
        self.entries.get(key).map(|e| e.name.clone())
    }

    /// Freeze every bucket except the write list, which keeps accepting
    /// overrides during emission.
    pub fn prepare_finish(&mut self) {
        self.frozen = true;
    }
}
