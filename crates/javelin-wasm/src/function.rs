//! Function identities.
//!
//! A [`FunctionName`] names one callable: owning class, method name, and
//! JVM-style type signature. The derived `signature_name` is the canonical
//! key; two names are the same function iff their signature names match.
//! Synthetic functions (compiler-generated helpers, inline text code,
//! imports) carry their body as a payload instead of a class-file lookup.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

/// Body source of a synthetic function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntheticBody {
    /// Inline textual WebAssembly, with an optional signature override
    /// used when emitting the wasm-level signature.
    Text {
        source: String,
        signature: Option<String>,
    },
    /// Externally provided; the annotation carries at least `module` and
    /// `name`.
    Import { annotation: IndexMap<String, String> },
}

/// Identity of a callable.
#[derive(Clone, Debug)]
pub struct FunctionName {
    class_name: String,
    method_name: String,
    signature: String,
    signature_name: String,
    synthetic: Option<SyntheticBody>,
}

impl FunctionName {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        let class_name = class_name.into();
        let method_name = method_name.into();
        let signature = signature.into();
        let signature_name = format!("{class_name}.{method_name}{signature}");
        Self {
            class_name,
            method_name,
            signature,
            signature_name,
            synthetic: None,
        }
    }

    /// Synthetic function with an inline textual-WebAssembly body.
    pub fn with_text_code(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        signature: impl Into<String>,
        source: impl Into<String>,
        signature_override: Option<String>,
    ) -> Self {
        let mut name = Self::new(class_name, method_name, signature);
        name.synthetic = Some(SyntheticBody::Text {
            source: source.into(),
            signature: signature_override,
        });
        name
    }

    /// Synthetic function provided by the host environment.
    pub fn with_import(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        signature: impl Into<String>,
        annotation: IndexMap<String, String>,
    ) -> Self {
        let mut name = Self::new(class_name, method_name, signature);
        name.synthetic = Some(SyntheticBody::Import { annotation });
        name
    }

    /// Parse a signature name such as `java/lang/Math.sqrt(D)D` back into
    /// its parts. Returns `None` when the string is not of that shape.
    pub fn from_signature_name(signature_name: &str) -> Option<Self> {
        let paren = signature_name.find('(')?;
        let (qualified, signature) = signature_name.split_at(paren);
        let dot = qualified.rfind('.')?;
        let (class_name, method_name) = qualified.split_at(dot);
        if class_name.is_empty() || method_name.len() < 2 {
            return None;
        }
        Some(Self::new(class_name, &method_name[1..], signature))
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// JVM-style type signature, e.g. `(II)I`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Canonical unique key.
    pub fn signature_name(&self) -> &str {
        &self.signature_name
    }

    pub fn synthetic(&self) -> Option<&SyntheticBody> {
        self.synthetic.as_ref()
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic.is_some()
    }

    /// The signature the wasm-level function is emitted with; text-code
    /// overrides win over the JVM signature.
    pub fn emitted_signature(&self) -> &str {
        match &self.synthetic {
            Some(SyntheticBody::Text {
                signature: Some(sig),
                ..
            }) => sig,
            _ => &self.signature,
        }
    }
}

impl PartialEq for FunctionName {
    fn eq(&self, other: &Self) -> bool {
        self.signature_name == other.signature_name
    }
}

impl Eq for FunctionName {}

impl Hash for FunctionName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature_name.hash(state);
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature_name)
    }
}
