//! Class-file cache with replace/partial overlays.
//!
//! The loader is the single point every hierarchy walk and method lookup
//! goes through. User code can redirect a class (`replace`) or shadow
//! parts of one (`partial`) before the platform version is ever loaded;
//! anything else falls through to the classpath on first use.

use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;

use javelin_classfile::{ClassFile, Classpath};

use crate::{Error, Result};

pub struct ClassFileLoader {
    classpath: Box<dyn Classpath>,
    cache: IndexMap<String, Rc<ClassFile>>,
    /// Targets taken over by a full replacement; later `cache` calls for
    /// these names are ignored.
    replaced: HashSet<String>,
    /// Partial overlays, merged lazily on first `get`.
    partials: IndexMap<String, ClassFile>,
    merged: IndexMap<String, Rc<ClassFile>>,
}

impl ClassFileLoader {
    pub fn new(classpath: Box<dyn Classpath>) -> Self {
        Self {
            classpath,
            cache: IndexMap::new(),
            replaced: HashSet::new(),
            partials: IndexMap::new(),
            merged: IndexMap::new(),
        }
    }

    /// Record a parsed class under its internal name. First write wins;
    /// a recorded replacement always wins.
    pub fn cache(&mut self, class: ClassFile) {
        if self.replaced.contains(&class.name) {
            return;
        }
        let name = class.name.clone();
        self.cache.entry(name).or_insert_with(|| Rc::new(class));
    }

    /// Redirect `target` to `class`, regardless of what the classpath has.
    pub fn replace(&mut self, target: &str, class: ClassFile) {
        self.replaced.insert(target.to_string());
        self.cache.insert(target.to_string(), Rc::new(class));
    }

    /// Overlay `class` onto `target`: overlay methods and fields shadow
    /// the original by signature, everything else falls through.
    pub fn partial(&mut self, target: &str, class: ClassFile) {
        self.partials.insert(target.to_string(), class);
    }

    /// Look up a class, honoring overlays and consulting the classpath on
    /// miss.
    pub fn get(&mut self, name: &str) -> Result<Option<Rc<ClassFile>>> {
        if let Some(class) = self.merged.get(name) {
            return Ok(Some(class.clone()));
        }

        let base = match self.cache.get(name) {
            Some(class) => Some(class.clone()),
            None => match self.classpath.find(name)? {
                Some(class) => {
                    let class = Rc::new(class);
                    self.cache.insert(name.to_string(), class.clone());
                    Some(class)
                }
                None => None,
            },
        };

        if let Some(overlay) = self.partials.get(name) {
            let merged = Rc::new(match &base {
                Some(base) => merge(base, overlay),
                // No original anywhere; the overlay is all there is.
                None => overlay.clone(),
            });
            self.merged.insert(name.to_string(), merged.clone());
            return Ok(Some(merged));
        }

        Ok(base)
    }

    /// Like [`get`](Self::get), failing with `MissingClass` on miss. Used
    /// by hierarchy traversals.
    pub fn get_or_missing(&mut self, name: &str) -> Result<Rc<ClassFile>> {
        self.get(name)?
            .ok_or_else(|| Error::MissingClass(name.to_string()))
    }
}

/// Merge a partial overlay onto its original.
fn merge(base: &ClassFile, overlay: &ClassFile) -> ClassFile {
    let mut merged = base.clone();

    for method in &overlay.methods {
        match merged
            .methods
            .iter_mut()
            .find(|m| m.name == method.name && m.descriptor == method.descriptor)
        {
            Some(shadowed) => *shadowed = method.clone(),
            None => merged.methods.push(method.clone()),
        }
    }

    for field in &overlay.fields {
        match merged.fields.iter_mut().find(|f| f.name == field.name) {
            Some(shadowed) => *shadowed = field.clone(),
            None => merged.fields.push(field.clone()),
        }
    }

    merged
}
