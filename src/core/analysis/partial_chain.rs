// src/core/analysis/partial_chain.rs
use std::collections::HashSet;

use crate::core::diagnostics::Diagnostics;
use crate::core::symbols::{SymbolProvider, TypeDecl, TypeName};

/// Enclosing types of `decl`, innermost first. Stops at an unknown or repeated name.
pub fn containing_types<'a>(provider: &'a dyn SymbolProvider, decl: &'a TypeDecl) -> Vec<&'a TypeDecl> {
    let mut chain = Vec::new();
    let mut seen: HashSet<&TypeName> = HashSet::new();
    seen.insert(&decl.name);

    let mut current = decl.containing_type.as_ref();
    while let Some(name) = current {
        if !seen.insert(name) {
            break;
        }
        let Some(outer) = provider.type_decl(name) else {
            break;
        };
        chain.push(outer);
        current = outer.containing_type.as_ref();
    }
    chain
}

/// Whether `decl` and every type enclosing it are partial.
///
/// Only the first offending level is reported; the caller marks the type
/// ineligible and moves on to the next one.
pub fn check(provider: &dyn SymbolProvider, decl: &TypeDecl, diagnostics: &mut Diagnostics) -> bool {
    if !decl.is_partial {
        diagnostics.report_type_is_not_partial(decl);
        return false;
    }

    match containing_types(provider, decl).into_iter().find(|outer| !outer.is_partial) {
        Some(outer) => {
            diagnostics.report_outer_type_is_not_partial(outer, decl);
            false
        }
        None => true,
    }
}
