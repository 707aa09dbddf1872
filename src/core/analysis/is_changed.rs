// src/core/analysis/is_changed.rs
use crate::core::diagnostics::{DiagnosticCode, Diagnostics};
use crate::core::symbols::{Annotation, MemberKind, MemberSymbol};
use super::context::KnownTypes;
use super::members::ClassifiedMember;
use super::type_analysis::TypeAnalysis;

/// Pick the dirty-flag property for a type.
///
/// The first valid local candidate wins and later ones are reported. With none
/// declared locally, the nearest generating ancestor's flag is used.
pub fn resolve(
    known: &KnownTypes,
    members: &[MemberSymbol],
    generated: &[ClassifiedMember<'_>],
    base_analyses: &[&TypeAnalysis],
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    let mut chosen: Option<String> = None;

    for member in members {
        let Some(marker) = member
            .annotations
            .iter()
            .find(|a| matches!(a, Annotation::IsChanged { .. }))
        else {
            continue;
        };

        let (name, ty, settable) = if member.notify_annotation().is_some() {
            // Dropped generated members were already reported
            let Some(property) = generated
                .iter()
                .find(|g| std::ptr::eq(g.symbol, member))
                .map(|g| &g.property)
            else {
                continue;
            };
            (property.name.as_str(), Some(&property.ty), true)
        } else {
            let settable = match member.kind {
                MemberKind::Property { has_setter, .. } => has_setter,
                MemberKind::Field { readonly } => !readonly,
                MemberKind::Method(_) | MemberKind::Event => false,
            };
            (member.name.as_str(), member.declared_type.as_ref(), settable)
        };

        let locations = member.annotation_locations(marker);
        if !ty.is_some_and(|ty| known.is_boolean(ty)) {
            diagnostics.report(DiagnosticCode::NonBooleanIsChangedProperty, locations, &[name]);
            continue;
        }
        if !settable {
            diagnostics.report(DiagnosticCode::IsChangedDoesNotHaveSetter, locations, &[name]);
            continue;
        }

        match &chosen {
            Some(existing) => diagnostics.report(
                DiagnosticCode::MultipleIsChangedProperties,
                locations,
                &[existing.as_str()],
            ),
            None => chosen = Some(name.to_string()),
        }
    }

    chosen.or_else(|| {
        base_analyses
            .iter()
            .filter(|a| a.can_generate)
            .find_map(|a| a.is_changed_property.clone())
    })
}
