// src/core/diagnostics.rs
//! Structured diagnostics produced while analysing types.
//!
//! Nothing in the analysis fails hard on bad declarations. Each problem
//! becomes a [`Diagnostic`] appended to a [`Diagnostics`] batch; batches are
//! collected per type and merged by the run driver in declaration order.

use std::fmt;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::symbols::{Location, MemberSymbol, TypeDecl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Stable diagnostic identifiers. The discriminant is the numeric part of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    NotificationArgsNotFound = 1,
    TypeIsNotPartial = 2,
    MemberWithNameAlreadyExists = 3,
    AnotherMemberHasSameGeneratedName = 4,
    IncompatiblePropertyAccessibilities = 5,
    NoCallableRaiseMethodOverload = 6,
    RaiseMethodNotFound = 7,
    AlsoNotifyNotValidOnMember = 8,
    AlsoNotifyPropertyDoesNotExist = 9,
    DependsOnPropertyDoesNotExist = 10,
    DependsOnAppliedToMemberWithoutNotify = 11,
    AlsoNotifyForSelf = 12,
    InvalidOnChangedHookSignature = 13,
    MultipleIsChangedProperties = 14,
    NonBooleanIsChangedProperty = 15,
    IsChangedDoesNotHaveSetter = 16,
    UnknownFirstLetterCapitalization = 17,
    ReadonlyBackingField = 18,
    BackingPropertyMustHaveGetterAndSetter = 19,
    OuterTypeIsNotPartial = 20,
    DependsOnForSelf = 21,
}

impl DiagnosticCode {
    pub fn code(&self) -> String {
        format!("INPC{:03}", *self as u16)
    }

    pub fn severity(&self) -> Severity {
        Severity::Warning
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::NotificationArgsNotFound => "Unable to find the notification args type",
            Self::TypeIsNotPartial => "Type is not partial",
            Self::MemberWithNameAlreadyExists => "Member with this name already exists",
            Self::AnotherMemberHasSameGeneratedName => {
                "Another member has the same generated name as this one"
            }
            Self::IncompatiblePropertyAccessibilities => "Incompatible property accessibilities",
            Self::NoCallableRaiseMethodOverload => "Could not find callable raise method",
            Self::RaiseMethodNotFound => "Could not find method to raise the change event",
            Self::AlsoNotifyNotValidOnMember => "AlsoNotify is not valid here",
            Self::AlsoNotifyPropertyDoesNotExist => "AlsoNotify property does not exist",
            Self::DependsOnPropertyDoesNotExist => "DependsOn property does not exist",
            Self::DependsOnAppliedToMemberWithoutNotify => "DependsOn member does not have Notify",
            Self::AlsoNotifyForSelf => "AlsoNotify applied to self",
            Self::InvalidOnChangedHookSignature => "Unable to find matching On{Property}Changed",
            Self::MultipleIsChangedProperties => "Multiple IsChanged properties",
            Self::NonBooleanIsChangedProperty => "IsChanged property is not a bool",
            Self::IsChangedDoesNotHaveSetter => "IsChanged property does not have a setter",
            Self::UnknownFirstLetterCapitalization => "Unrecognised first letter capitalization",
            Self::ReadonlyBackingField => "Backing field cannot be readonly",
            Self::BackingPropertyMustHaveGetterAndSetter => {
                "Backing property must have a getter and a setter"
            }
            Self::OuterTypeIsNotPartial => "Outer type is not partial",
            Self::DependsOnForSelf => "DependsOn applied to self",
        }
    }

    /// Message template with positional `{n}` placeholders
    pub fn message_template(&self) -> &'static str {
        match self {
            Self::NotificationArgsNotFound => {
                "Unable to find the notification args type. Ensure the assembly declaring it is referenced"
            }
            Self::TypeIsNotPartial => {
                "Type '{0}' must be partial in order for notifying properties to be generated"
            }
            Self::MemberWithNameAlreadyExists => {
                "Attempted to generate property '{0}' for member '{1}', but a member with that name already exists. Skipping this property"
            }
            Self::AnotherMemberHasSameGeneratedName => {
                "Member '{0}' will have the same generated property name '{1}' as member '{2}'. Skipping both properties"
            }
            Self::IncompatiblePropertyAccessibilities => {
                "Property '{0}' may not have an internal accessor alongside a protected one. Defaulting both to protected internal"
            }
            Self::NoCallableRaiseMethodOverload => {
                "Found one or more methods called '{0}' to raise the change event, but they had unrecognised signatures or were inaccessible. Skipping type '{1}'"
            }
            Self::RaiseMethodNotFound => {
                "Could not find any suitable method on '{0}' to raise the change event defined on a base type"
            }
            Self::AlsoNotifyNotValidOnMember => {
                "AlsoNotify on '{0}' is only valid on members which also have Notify. Skipping"
            }
            Self::AlsoNotifyPropertyDoesNotExist => {
                "Unable to find a generated property called '{0}' on this type. Skipping"
            }
            Self::DependsOnPropertyDoesNotExist => {
                "Unable to find a generated property called '{0}' on this type. Skipping"
            }
            Self::DependsOnAppliedToMemberWithoutNotify => {
                "DependsOn on '{0}' must only be applied to members which also have Notify. Skipping"
            }
            Self::AlsoNotifyForSelf => {
                "Property '{0}' cannot have an AlsoNotify which refers to that same property"
            }
            Self::InvalidOnChangedHookSignature => {
                "Found one or more methods called '{0}' for property '{1}', but none had the correct signature, or were inaccessible. Skipping"
            }
            Self::MultipleIsChangedProperties => {
                "Found multiple IsChanged properties, but only one is allowed. Ignoring this one, and using '{0}'"
            }
            Self::NonBooleanIsChangedProperty => {
                "IsChanged property '{0}' does not return a bool. Skipping"
            }
            Self::IsChangedDoesNotHaveSetter => {
                "IsChanged property '{0}' does not have a setter. Skipping"
            }
            Self::UnknownFirstLetterCapitalization => {
                "Unrecognised value '{0}' for first_letter_capitalization. Expected 'upper_case', 'lower_case' or 'none'"
            }
            Self::ReadonlyBackingField => "Backing field '{0}' cannot be readonly. Skipping",
            Self::BackingPropertyMustHaveGetterAndSetter => {
                "Backing property '{0}' must have a getter and a setter. Skipping"
            }
            Self::OuterTypeIsNotPartial => {
                "Type '{0}' must be partial in order for notifying properties to be generated for inner type '{1}'"
            }
            Self::DependsOnForSelf => {
                "Property '{0}' cannot have a DependsOn which refers to that same property"
            }
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// One reported problem. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub args: Vec<String>,
    /// Empty means "no specific location"
    pub locations: Vec<Location>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, locations: Vec<Location>, args: Vec<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            args,
            locations,
        }
    }

    /// Render the message template with this diagnostic's arguments
    pub fn message(&self) -> String {
        let mut message = self.code.message_template().to_string();
        for (i, arg) in self.args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", i), arg);
        }
        message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match self.locations.first() {
            Some(location) => write!(f, "{}: {} {}: {}", location, severity, self.code, self.message()),
            None => write!(f, "{} {}: {}", severity, self.code, self.message()),
        }
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Diagnostic", 6)?;
        state.serialize_field("code", &self.code.code())?;
        state.serialize_field("title", self.code.title())?;
        state.serialize_field("severity", &self.severity)?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("args", &self.args)?;
        state.serialize_field("locations", &self.locations)?;
        state.end()
    }
}

/// Append-only diagnostics collector.
///
/// One batch is threaded through the analysis of a single type and handed
/// back with its plan, so concurrent analyses never share a sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn report(&mut self, code: DiagnosticCode, locations: Vec<Location>, args: &[&str]) {
        self.push(Diagnostic::new(
            code,
            locations,
            args.iter().map(|a| a.to_string()).collect(),
        ));
    }

    /// Append another batch, keeping its internal order
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    pub fn report_notification_args_not_found(&mut self) {
        self.report(DiagnosticCode::NotificationArgsNotFound, Vec::new(), &[]);
    }

    pub fn report_type_is_not_partial(&mut self, decl: &TypeDecl) {
        self.report(
            DiagnosticCode::TypeIsNotPartial,
            decl.locations(),
            &[decl.name.short_name()],
        );
    }

    pub fn report_outer_type_is_not_partial(&mut self, outer: &TypeDecl, inner: &TypeDecl) {
        self.report(
            DiagnosticCode::OuterTypeIsNotPartial,
            outer.locations(),
            &[outer.name.short_name(), inner.name.short_name()],
        );
    }

    pub fn report_unknown_first_letter_capitalization(&mut self, value: &str) {
        self.report(DiagnosticCode::UnknownFirstLetterCapitalization, Vec::new(), &[value]);
    }

    pub fn report_no_callable_raise_method_overload(&mut self, decl: &TypeDecl, name: &str) {
        self.report(
            DiagnosticCode::NoCallableRaiseMethodOverload,
            decl.locations(),
            &[name, decl.name.short_name()],
        );
    }

    pub fn report_raise_method_not_found(&mut self, decl: &TypeDecl) {
        self.report(
            DiagnosticCode::RaiseMethodNotFound,
            decl.locations(),
            &[decl.name.short_name()],
        );
    }

    pub fn report_member_with_name_already_exists(&mut self, member: &MemberSymbol, name: &str) {
        self.report(
            DiagnosticCode::MemberWithNameAlreadyExists,
            member.locations(),
            &[name, member.name.as_str()],
        );
    }

    pub fn report_another_member_has_same_generated_name(
        &mut self,
        member: &MemberSymbol,
        other: &MemberSymbol,
        name: &str,
    ) {
        self.report(
            DiagnosticCode::AnotherMemberHasSameGeneratedName,
            member.locations(),
            &[member.name.as_str(), name, other.name.as_str()],
        );
    }

    pub fn report_invalid_on_changed_hook_signature(
        &mut self,
        method: &MemberSymbol,
        property_name: &str,
    ) {
        self.report(
            DiagnosticCode::InvalidOnChangedHookSignature,
            method.locations(),
            &[method.name.as_str(), property_name],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_formatting() {
        assert_eq!(DiagnosticCode::NotificationArgsNotFound.code(), "INPC001");
        assert_eq!(DiagnosticCode::OuterTypeIsNotPartial.code(), "INPC020");
        assert_eq!(DiagnosticCode::DependsOnForSelf.to_string(), "INPC021");
    }

    #[test]
    fn test_message_substitutes_positional_args() {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::OuterTypeIsNotPartial,
            Vec::new(),
            vec!["A".to_string(), "C".to_string()],
        );
        assert_eq!(
            diagnostic.message(),
            "Type 'A' must be partial in order for notifying properties to be generated for inner type 'C'"
        );
    }

    #[test]
    fn test_title_braces_are_literal() {
        assert_eq!(
            DiagnosticCode::InvalidOnChangedHookSignature.title(),
            "Unable to find matching On{Property}Changed"
        );
    }

    #[test]
    fn test_locationless_diagnostic_is_kept() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report_unknown_first_letter_capitalization("sideways");

        assert_eq!(diagnostics.len(), 1);
        let diagnostic = diagnostics.iter().next().unwrap();
        assert!(diagnostic.locations.is_empty());
        assert_eq!(
            diagnostic.to_string(),
            "warning INPC017: Unrecognised value 'sideways' for first_letter_capitalization. Expected 'upper_case', 'lower_case' or 'none'"
        );
    }

    #[test]
    fn test_extend_preserves_order() {
        let mut first = Diagnostics::new();
        first.report_notification_args_not_found();
        let mut second = Diagnostics::new();
        second.report_unknown_first_letter_capitalization("x");
        second.report(DiagnosticCode::AlsoNotifyForSelf, Vec::new(), &["Foo"]);

        first.extend(second);
        let codes: Vec<_> = first.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![
                DiagnosticCode::NotificationArgsNotFound,
                DiagnosticCode::UnknownFirstLetterCapitalization,
                DiagnosticCode::AlsoNotifyForSelf,
            ]
        );
        assert!(first.iter().all(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn test_serializes_code_and_message() {
        let diagnostic = Diagnostic::new(
            DiagnosticCode::ReadonlyBackingField,
            vec![Location::new("a.cs", 4, 9)],
            vec!["_foo".to_string()],
        );
        let value = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(value["code"], "INPC018");
        assert_eq!(value["severity"], "warning");
        assert_eq!(value["title"], "Backing field cannot be readonly");
        assert_eq!(value["message"], "Backing field '_foo' cannot be readonly. Skipping");
        assert_eq!(value["locations"][0]["line"], 4);
    }
}
