// src/core/analysis/raise_method.rs
//! Decides how a type raises its change event.
//!
//! 1. An existing, non-static event with the handler type anywhere in the
//!    chain, or any generating ancestor, means this type does not declare one.
//! 2. Configured raise-method names are tried in order. The first name with
//!    any instance method in the chain is final: if none of its overloads is
//!    callable the type is skipped rather than falling through to the next
//!    name, since a misspelt signature is the likelier mistake.
//! 3. With no recognised method at all, the type synthesizes one, unless the
//!    event lives on a non-generating ancestor where it cannot be raised.

use tracing::debug;

use crate::core::diagnostics::Diagnostics;
use crate::core::symbols::{MemberKind, MethodShape, TypeDecl, NOTIFICATION_EVENT_NAME};
use super::context::{AnalysisContext, Candidate, KnownTypes};
use super::type_analysis::{RaiseMethod, RaiseMethodNameType, RaiseMethodSignature, TypeAnalysis};

/// Overload shapes in the order they are preferred
const SIGNATURE_PRIORITY: [RaiseMethodSignature; 4] = [
    RaiseMethodSignature::new(RaiseMethodNameType::EventArgs, false),
    RaiseMethodSignature::new(RaiseMethodNameType::String, false),
    RaiseMethodSignature::new(RaiseMethodNameType::EventArgs, true),
    RaiseMethodSignature::new(RaiseMethodNameType::String, true),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaiseMethodResolution {
    pub requires_event: bool,
    pub requires_raise_method: bool,
    pub raise_method: RaiseMethod,
}

/// Resolve the raise method for `decl`. `None` means the type was excluded
/// and a diagnostic has been reported.
pub fn resolve<'a>(
    ctx: &AnalysisContext<'a>,
    decl: &'a TypeDecl,
    base_analyses: &[&TypeAnalysis],
    diagnostics: &mut Diagnostics,
) -> Option<RaiseMethodResolution> {
    let chain = ctx.type_and_ancestors(decl);

    let event_owner = ctx.known.event_handler.as_ref().and_then(|handler| {
        chain.iter().copied().find(|ty| {
            ctx.provider.members_of(&ty.name).iter().any(|m| {
                m.name == NOTIFICATION_EVENT_NAME
                    && m.kind == MemberKind::Event
                    && !m.is_static
                    && m.declared_type.as_ref() == Some(handler)
            })
        })
    });

    let is_generating_any_parent = base_analyses.iter().any(|a| a.can_generate);
    let requires_event = event_owner.is_none() && !is_generating_any_parent;

    for name in ctx.config.raise_method_names() {
        let candidates: Vec<Candidate<'a>> = chain
            .iter()
            .flat_map(|&ty| ctx.instance_methods(ty, name))
            .collect();
        if candidates.is_empty() {
            continue;
        }

        let callable: Vec<&Candidate<'a>> = candidates
            .iter()
            .filter(|c| ctx.is_callable_from(c, &decl.name))
            .collect();

        return match find_callable_overload(ctx.known, callable.iter().map(|c| c.shape)) {
            Some(signature) => {
                debug!("{} raises through existing {} {:?}", decl.name, name, signature);
                Some(RaiseMethodResolution {
                    requires_event,
                    requires_raise_method: false,
                    raise_method: RaiseMethod {
                        name: name.clone(),
                        signature,
                    },
                })
            }
            None => {
                diagnostics.report_no_callable_raise_method_overload(decl, name);
                None
            }
        };
    }

    if let Some(owner) = event_owner {
        if !is_generating_any_parent && owner.name != decl.name {
            diagnostics.report_raise_method_not_found(decl);
            return None;
        }
    }

    Some(RaiseMethodResolution {
        requires_event,
        requires_raise_method: !is_generating_any_parent,
        raise_method: RaiseMethod {
            name: ctx.config.default_raise_method_name().to_string(),
            signature: RaiseMethodSignature::default(),
        },
    })
}

/// Best recognised signature among `shapes`, by [`SIGNATURE_PRIORITY`]
pub fn find_callable_overload<'s>(
    known: &KnownTypes,
    shapes: impl Iterator<Item = &'s MethodShape> + Clone,
) -> Option<RaiseMethodSignature> {
    SIGNATURE_PRIORITY
        .iter()
        .copied()
        .find(|signature| shapes.clone().any(|shape| matches_signature(known, shape, signature)))
}

fn matches_signature(known: &KnownTypes, shape: &MethodShape, signature: &RaiseMethodSignature) -> bool {
    let expected_len = if signature.has_old_and_new { 3 } else { 1 };
    if shape.parameters.len() != expected_len || !shape.parameters.iter().all(|p| p.is_by_value()) {
        return false;
    }

    let first = &shape.parameters[0].ty;
    let name_matches = match signature.name_type {
        RaiseMethodNameType::EventArgs => known.is_notification_args(first),
        RaiseMethodNameType::String => known.is_string(first),
    };

    name_matches && shape.parameters[1..].iter().all(|p| known.is_object(&p.ty))
}
