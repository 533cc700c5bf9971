//! WebAssembly-side model for the Javelin compiler.
//!
//! This crate contains:
//! - Function identities (`FunctionName`, synthetic bodies)
//! - Value types and constants
//! - The typed instruction representation
//! - The `ModuleWriter` contract and compiler options
//! - A textual-WebAssembly subset parser for inline text code

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod wat;

mod function;
mod instruction;
mod types;
mod writer;

#[cfg(test)]
mod wat_tests;

pub use function::{FunctionName, SyntheticBody};
pub use instruction::{BlockOp, Instruction, LocalOp, NO_LINE, NumericOp};
pub use types::{ValueType, WasmValue};
pub use writer::{CompilerOptions, ModuleWriter, ParamKind};
