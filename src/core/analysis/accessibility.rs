// src/core/analysis/accessibility.rs
use crate::core::diagnostics::{DiagnosticCode, Diagnostics};
use crate::core::symbols::{Accessibility, MemberSymbol};
use super::type_analysis::GeneratedProperty;

/// `internal` and `protected` accessors cannot share a property, since neither contains the other
pub fn are_incompatible(getter: Accessibility, setter: Accessibility) -> bool {
    matches!(
        (getter, setter),
        (Accessibility::Internal, Accessibility::Protected)
            | (Accessibility::Protected, Accessibility::Internal)
    )
}

/// Coerce incompatible accessor pairs to `protected internal`, reporting INPC005
pub fn reconcile(member: &MemberSymbol, property: &mut GeneratedProperty, diagnostics: &mut Diagnostics) {
    if !are_incompatible(property.getter, property.setter) {
        return;
    }

    let locations = member
        .notify_annotation()
        .map(|notify| member.annotation_locations(notify))
        .unwrap_or_else(|| member.locations());
    diagnostics.report(
        DiagnosticCode::IncompatiblePropertyAccessibilities,
        locations,
        &[property.name.as_str()],
    );

    property.getter = Accessibility::ProtectedInternal;
    property.setter = Accessibility::ProtectedInternal;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::fixtures::*;

    fn property(getter: Accessibility, setter: Accessibility) -> GeneratedProperty {
        GeneratedProperty {
            backing_member: "_foo".to_string(),
            name: "Foo".to_string(),
            ty: "int".into(),
            getter,
            setter,
            on_changed: None,
        }
    }

    #[test]
    fn test_internal_and_protected_coerced() {
        let member = notify_field("_foo", "int");
        for (getter, setter) in [
            (Accessibility::Internal, Accessibility::Protected),
            (Accessibility::Protected, Accessibility::Internal),
        ] {
            let mut diagnostics = Diagnostics::new();
            let mut generated = property(getter, setter);
            reconcile(&member, &mut generated, &mut diagnostics);

            assert_eq!(generated.getter, Accessibility::ProtectedInternal);
            assert_eq!(generated.setter, Accessibility::ProtectedInternal);
            assert_eq!(
                diagnostics.iter().next().unwrap().code,
                DiagnosticCode::IncompatiblePropertyAccessibilities
            );
        }
    }

    #[test]
    fn test_other_combinations_kept() {
        let member = notify_field("_foo", "int");
        for (getter, setter) in [
            (Accessibility::Public, Accessibility::Protected),
            (Accessibility::Internal, Accessibility::Private),
            (Accessibility::ProtectedInternal, Accessibility::Protected),
            (Accessibility::Protected, Accessibility::PrivateProtected),
        ] {
            let mut diagnostics = Diagnostics::new();
            let mut generated = property(getter, setter);
            reconcile(&member, &mut generated, &mut diagnostics);

            assert_eq!((generated.getter, generated.setter), (getter, setter));
            assert!(diagnostics.is_empty());
        }
    }
}
