// src/core/analysis/hooks.rs
use crate::core::diagnostics::Diagnostics;
use crate::core::symbols::{TypeDecl, TypeName};
use super::context::{AnalysisContext, Candidate};
use super::type_analysis::{OnChangedHook, OnChangedSignature};

pub fn hook_method_name(property_name: &str) -> String {
    format!("On{}Changed", property_name)
}

/// Find the `On{Property}Changed` callback declared on `decl` itself.
///
/// An old-and-new overload whose parameter type the property converts to is
/// preferred over a parameterless one. If methods with the name exist but none
/// fits, INPC013 is reported and the property goes ahead without a hook.
pub fn resolve<'a>(
    ctx: &AnalysisContext<'a>,
    decl: &'a TypeDecl,
    property_name: &str,
    property_type: &TypeName,
    diagnostics: &mut Diagnostics,
) -> Option<OnChangedHook> {
    let method_name = hook_method_name(property_name);
    let candidates = ctx.instance_methods(decl, &method_name);
    let first = candidates.first()?;

    let callable: Vec<&Candidate<'a>> = candidates
        .iter()
        .filter(|c| ctx.is_callable_from(c, &decl.name))
        .collect();

    let old_and_new = callable.iter().any(|c| match c.shape.parameters.as_slice() {
        [old, new] => {
            old.is_by_value()
                && new.is_by_value()
                && old.ty == new.ty
                && ctx.provider.has_implicit_conversion(property_type, &old.ty)
        }
        _ => false,
    });

    let signature = if old_and_new {
        OnChangedSignature::OldAndNew
    } else if callable.iter().any(|c| c.shape.parameters.is_empty()) {
        OnChangedSignature::Parameterless
    } else {
        diagnostics.report_invalid_on_changed_hook_signature(first.symbol, property_name);
        return None;
    };

    Some(OnChangedHook {
        method_name,
        signature,
    })
}
