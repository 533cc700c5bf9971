//! Signature emission for one function.
//!
//! The implicit receiver comes first when the function takes one, then
//! the declared parameters, the results, and the builder's non-parameter
//! locals. Debug names are best effort: `this` is always named, declared
//! parameters and locals only when the builder recovered names.

use javelin_classfile::descriptor::parse_method_descriptor;
use javelin_wasm::{FunctionName, ModuleWriter, ParamKind, ValueType};

use crate::Result;
use crate::builder::MethodBody;
use crate::functions::FunctionManager;
use crate::types::{TypeManager, value_type_of};

pub(super) fn write_signature(
    writer: &mut dyn ModuleWriter,
    name: &FunctionName,
    body: Option<&MethodBody>,
    functions: &FunctionManager,
    types: &mut TypeManager,
) -> Result<()> {
    writer.write_method_param_start(name)?;

    if functions.need_this_parameter(name) {
        let struct_type = types.value_of(name.class_name());
        let this_type = ValueType::Struct(struct_type.name().to_string());
        writer.write_method_param(ParamKind::Param, &this_type, Some("this"))?;
    }

    let descriptor = parse_method_descriptor(name.emitted_signature())?;
    for (index, param) in descriptor.params.iter().enumerate() {
        let debug_name = body
            .and_then(|b| b.param_names.get(index))
            .and_then(|n| n.as_deref());
        writer.write_method_param(ParamKind::Param, &value_type_of(param), debug_name)?;
    }
    if let Some(ret) = &descriptor.ret {
        writer.write_method_param(ParamKind::Result, &value_type_of(ret), None)?;
    }

    if let Some(body) = body {
        for local in &body.locals {
            writer.write_method_param(ParamKind::Local, &local.ty, local.name.as_deref())?;
        }
    }

    writer.write_method_param_finish(name)?;
    Ok(())
}
