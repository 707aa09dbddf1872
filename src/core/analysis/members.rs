// src/core/analysis/members.rs
//! Turns annotated backing members into generated-property descriptors.

use std::collections::HashMap;
use tracing::debug;

use crate::core::configuration::FirstLetterCapitalization;
use crate::core::diagnostics::{DiagnosticCode, Diagnostics};
use crate::core::symbols::{Accessibility, Annotation, MemberKind, MemberSymbol, TypeDecl};
use super::type_analysis::GeneratedProperty;

/// A generated property together with the member it was derived from
#[derive(Debug, Clone)]
pub struct ClassifiedMember<'a> {
    pub symbol: &'a MemberSymbol,
    pub property: GeneratedProperty,
}

/// Generated name for a backing identifier: leading underscores go, then the
/// capitalization rule is applied.
pub fn generated_name(raw: &str, rule: FirstLetterCapitalization) -> String {
    let stripped = raw.trim_start_matches('_');
    if stripped.is_empty() {
        return raw.to_string();
    }
    rule.apply(stripped)
}

/// Classify the members of `decl` that carry a notify annotation.
///
/// Members which cannot be generated are dropped with a diagnostic; the
/// survivors keep declaration order.
pub fn classify<'a>(
    decl: &'a TypeDecl,
    members: &'a [MemberSymbol],
    rule: FirstLetterCapitalization,
    diagnostics: &mut Diagnostics,
) -> Vec<ClassifiedMember<'a>> {
    let mut candidates = Vec::new();

    for member in members {
        match member.notify_annotation() {
            Some(notify) => {
                if let Some(classified) = classify_member(member, notify, rule, diagnostics) {
                    candidates.push(classified);
                }
            }
            None => report_cascades_without_notify(member, diagnostics),
        }
    }

    let candidates: Vec<_> = candidates
        .into_iter()
        .filter(|c| {
            // The backing member counts too: a property cannot share its own field's name
            let clash = members.iter().any(|m| m.name == c.property.name);
            if clash {
                diagnostics.report_member_with_name_already_exists(c.symbol, &c.property.name);
            }
            !clash
        })
        .collect();

    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, c) in candidates.iter().enumerate() {
        by_name.entry(c.property.name.as_str()).or_default().push(i);
    }

    let mut colliding = vec![false; candidates.len()];
    for (i, c) in candidates.iter().enumerate() {
        let group = &by_name[c.property.name.as_str()];
        if group.len() < 2 {
            continue;
        }
        colliding[i] = true;
        let other = group.iter().copied().find(|&j| j != i).map(|j| candidates[j].symbol);
        if let Some(other) = other {
            diagnostics.report_another_member_has_same_generated_name(
                c.symbol,
                other,
                &c.property.name,
            );
        }
    }

    debug!(
        "Classified {} generated properties on {}",
        colliding.iter().filter(|c| !**c).count(),
        decl.name
    );

    candidates
        .into_iter()
        .zip(colliding)
        .filter_map(|(c, collides)| (!collides).then_some(c))
        .collect()
}

fn classify_member<'a>(
    member: &'a MemberSymbol,
    notify: &Annotation,
    rule: FirstLetterCapitalization,
    diagnostics: &mut Diagnostics,
) -> Option<ClassifiedMember<'a>> {
    let Annotation::Notify { name, getter, setter, .. } = notify else {
        return None;
    };

    match member.kind {
        MemberKind::Field { readonly: true } => {
            diagnostics.report(
                DiagnosticCode::ReadonlyBackingField,
                member.locations(),
                &[member.name.as_str()],
            );
            return None;
        }
        MemberKind::Property { has_getter, has_setter } if !(has_getter && has_setter) => {
            diagnostics.report(
                DiagnosticCode::BackingPropertyMustHaveGetterAndSetter,
                member.locations(),
                &[member.name.as_str()],
            );
            return None;
        }
        MemberKind::Field { .. } | MemberKind::Property { .. } => {}
        MemberKind::Method(_) | MemberKind::Event => {
            debug!("Ignoring notify annotation on non-storage member {}", member.name);
            return None;
        }
    }

    let Some(ty) = member.declared_type.clone() else {
        debug!("Ignoring notify annotation on untyped member {}", member.name);
        return None;
    };

    let name = match name {
        Some(explicit) => explicit.clone(),
        None => generated_name(&member.name, rule),
    };

    Some(ClassifiedMember {
        symbol: member,
        property: GeneratedProperty {
            backing_member: member.name.clone(),
            name,
            ty,
            getter: getter.unwrap_or(Accessibility::Public),
            setter: setter.unwrap_or(Accessibility::Public),
            on_changed: None,
        },
    })
}

/// Cascade annotations only make sense next to a notify annotation
fn report_cascades_without_notify(member: &MemberSymbol, diagnostics: &mut Diagnostics) {
    for annotation in &member.annotations {
        let code = match annotation {
            Annotation::AlsoNotify { .. } => DiagnosticCode::AlsoNotifyNotValidOnMember,
            Annotation::DependsOn { .. } => DiagnosticCode::DependsOnAppliedToMemberWithoutNotify,
            _ => continue,
        };
        diagnostics.report(code, member.annotation_locations(annotation), &[member.name.as_str()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::fixtures::*;

    fn run(decl: &TypeDecl) -> (Vec<String>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let names = classify(decl, &decl.members, FirstLetterCapitalization::UpperCase, &mut diagnostics)
            .into_iter()
            .map(|c| c.property.name)
            .collect();
        (names, diagnostics)
    }

    fn codes(diagnostics: &Diagnostics) -> Vec<DiagnosticCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_generated_name_strips_underscores() {
        assert_eq!(generated_name("_foo", FirstLetterCapitalization::UpperCase), "Foo");
        assert_eq!(generated_name("__foo", FirstLetterCapitalization::None), "foo");
        assert_eq!(generated_name("_Foo", FirstLetterCapitalization::LowerCase), "foo");
        assert_eq!(generated_name("_", FirstLetterCapitalization::UpperCase), "_");
    }

    #[test]
    fn test_explicit_name_wins() {
        let decl = class("Vm").member(field("_foo", "int").annotate(Annotation::Notify {
            name: Some("Bar".to_string()),
            getter: None,
            setter: Some(Accessibility::Private),
            location: None,
        }));
        let mut diagnostics = Diagnostics::new();
        let classified = classify(&decl, &decl.members, FirstLetterCapitalization::UpperCase, &mut diagnostics);

        assert_eq!(classified.len(), 1);
        assert_eq!(classified[0].property.name, "Bar");
        assert_eq!(classified[0].property.getter, Accessibility::Public);
        assert_eq!(classified[0].property.setter, Accessibility::Private);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_underscore_collision_drops_both() {
        let decl = class("Vm")
            .member(notify_field("_foo", "int").at(3))
            .member(notify_field("foo", "int").at(4))
            .member(notify_field("_bar", "int"));
        let (names, diagnostics) = run(&decl);

        assert_eq!(names, vec!["Bar"]);
        assert_eq!(
            codes(&diagnostics),
            vec![
                DiagnosticCode::AnotherMemberHasSameGeneratedName,
                DiagnosticCode::AnotherMemberHasSameGeneratedName,
            ]
        );
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message()).collect();
        assert!(messages[0].contains("'_foo'") && messages[0].contains("'Foo'") && messages[0].contains("'foo'"));
        assert!(messages[1].starts_with("Member 'foo'"));
        assert_eq!(diagnostics.iter().next().unwrap().locations[0].line, 3);
    }

    #[test]
    fn test_existing_member_name_is_reported() {
        let decl = class("Vm")
            .member(notify_field("_foo", "int"))
            .member(property("Foo", "int"));
        let (names, diagnostics) = run(&decl);

        assert!(names.is_empty());
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::MemberWithNameAlreadyExists]);
    }

    #[test]
    fn test_generated_name_equal_to_backing_name_is_reported() {
        let decl = class("Vm")
            .member(notify_field("Foo", "int").at(3))
            .member(notify_field("_", "int").at(4))
            .member(field("_bar", "int").annotate(Annotation::Notify {
                name: Some("_bar".to_string()),
                getter: None,
                setter: None,
                location: None,
            }))
            .member(notify_field("_baz", "int"));
        let (names, diagnostics) = run(&decl);

        assert_eq!(names, vec!["Baz"]);
        assert_eq!(codes(&diagnostics), vec![DiagnosticCode::MemberWithNameAlreadyExists; 3]);
        let args: Vec<_> = diagnostics.iter().map(|d| d.args.clone()).collect();
        assert_eq!(args[0], vec!["Foo", "Foo"]);
        assert_eq!(args[1], vec!["_", "_"]);
        assert_eq!(args[2], vec!["_bar", "_bar"]);
        assert_eq!(diagnostics.iter().nth(1).unwrap().locations[0].line, 4);
    }

    #[test]
    fn test_readonly_field_and_incomplete_property() {
        let mut readonly = notify_field("_foo", "int");
        readonly.kind = MemberKind::Field { readonly: true };
        let mut getter_only = property("_Bar", "int").annotate(Annotation::Notify {
            name: None,
            getter: None,
            setter: None,
            location: None,
        });
        getter_only.kind = MemberKind::Property { has_getter: true, has_setter: false };

        let decl = class("Vm")
            .member(readonly)
            .member(getter_only)
            .member(notify_field("_baz", "int"));
        let (names, diagnostics) = run(&decl);

        assert_eq!(names, vec!["Baz"]);
        assert_eq!(
            codes(&diagnostics),
            vec![
                DiagnosticCode::ReadonlyBackingField,
                DiagnosticCode::BackingPropertyMustHaveGetterAndSetter,
            ]
        );
    }

    #[test]
    fn test_cascade_annotations_without_notify() {
        let decl = class("Vm").member(
            field("_foo", "int")
                .annotate(also_notify(&["Bar"]))
                .annotate(depends_on(&["Baz"])),
        );
        let (names, diagnostics) = run(&decl);

        assert!(names.is_empty());
        assert_eq!(
            codes(&diagnostics),
            vec![
                DiagnosticCode::AlsoNotifyNotValidOnMember,
                DiagnosticCode::DependsOnAppliedToMemberWithoutNotify,
            ]
        );
    }

    #[test]
    fn test_notify_on_method_is_ignored() {
        let decl = class("Vm").member(method("Foo", &[]).annotate(Annotation::Notify {
            name: None,
            getter: None,
            setter: None,
            location: None,
        }));
        let (names, diagnostics) = run(&decl);

        assert!(names.is_empty());
        assert!(diagnostics.is_empty());
    }
}
