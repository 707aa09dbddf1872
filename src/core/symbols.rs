// src/core/symbols.rs
//! Declaration model and the symbol provider contract.
//!
//! The analysis never looks at source text. Everything it knows about a type
//! (members, annotations, base chain, nesting, accessibility) comes through
//! [`SymbolProvider`], so any extractor that can fill these shapes can drive it.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Name of the event the analysis looks for on a type and its ancestors.
pub const NOTIFICATION_EVENT_NAME: &str = "PropertyChanged";

/// Identity of a type, by fully-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the qualified name, used in diagnostic messages
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared accessibility of a type member or generated accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    Private,
    PrivateProtected,
    Protected,
    Internal,
    ProtectedInternal,
    Public,
}

impl Accessibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PrivateProtected => "private protected",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::ProtectedInternal => "protected internal",
            Self::Public => "public",
        }
    }

    /// Position in the containment lattice. `Protected` and `Internal`
    /// share a rank because neither contains the other.
    fn rank(&self) -> u8 {
        match self {
            Self::Private => 0,
            Self::PrivateProtected => 1,
            Self::Protected | Self::Internal => 2,
            Self::ProtectedInternal => 3,
            Self::Public => 4,
        }
    }

    /// The broader of two accessibilities
    pub fn widest(self, other: Self) -> Self {
        match (self, other) {
            (Self::Protected, Self::Internal) | (Self::Internal, Self::Protected) => {
                Self::ProtectedInternal
            }
            _ if other.rank() > self.rank() => other,
            _ => self,
        }
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A source position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.file, self.line, self.column)
    }
}

/// How an argument is passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeName,
    #[serde(default)]
    pub ref_kind: RefKind,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ref_kind: RefKind::None,
        }
    }

    pub fn is_by_value(&self) -> bool {
        self.ref_kind == RefKind::None
    }
}

/// Call shape of a method member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MethodShape {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// `None` means the method returns nothing
    #[serde(default)]
    pub return_type: Option<TypeName>,
    #[serde(default)]
    pub type_parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field {
        #[serde(default)]
        readonly: bool,
    },
    Property {
        has_getter: bool,
        has_setter: bool,
    },
    Method(MethodShape),
    Event,
}

/// Declarative markers the analysis understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "annotation", rename_all = "snake_case")]
pub enum Annotation {
    /// Generate a notifying property from this backing member
    Notify {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        getter: Option<Accessibility>,
        #[serde(default)]
        setter: Option<Accessibility>,
        #[serde(default)]
        location: Option<Location>,
    },
    /// When this property changes, also raise the named properties
    AlsoNotify {
        names: Vec<String>,
        #[serde(default)]
        location: Option<Location>,
    },
    /// Raise this property whenever one of the named properties changes
    DependsOn {
        names: Vec<String>,
        #[serde(default)]
        location: Option<Location>,
    },
    /// Boolean flag set whenever any generated property changes
    IsChanged {
        #[serde(default)]
        location: Option<Location>,
    },
}

impl Annotation {
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Notify { location, .. }
            | Self::AlsoNotify { location, .. }
            | Self::DependsOn { location, .. }
            | Self::IsChanged { location } => location.as_ref(),
        }
    }
}

/// One member of a type as seen by the symbol provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSymbol {
    pub name: String,
    pub kind: MemberKind,
    /// Field, property or event type. Methods carry theirs in the shape.
    #[serde(rename = "type", default)]
    pub declared_type: Option<TypeName>,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_override: bool,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl MemberSymbol {
    pub fn method_shape(&self) -> Option<&MethodShape> {
        match &self.kind {
            MemberKind::Method(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn notify_annotation(&self) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| matches!(a, Annotation::Notify { .. }))
    }

    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
    }

    /// Locations for a diagnostic about `annotation`, falling back to the member
    pub fn annotation_locations(&self, annotation: &Annotation) -> Vec<Location> {
        annotation
            .location()
            .or(self.location.as_ref())
            .cloned()
            .into_iter()
            .collect()
    }

    pub fn locations(&self) -> Vec<Location> {
        self.location.iter().cloned().collect()
    }
}

/// A type declaration, possibly one nested inside another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: TypeName,
    #[serde(default)]
    pub is_partial: bool,
    /// Declared in another assembly; only its metadata is visible
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub containing_type: Option<TypeName>,
    #[serde(default)]
    pub base_type: Option<TypeName>,
    #[serde(default)]
    pub members: Vec<MemberSymbol>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl TypeDecl {
    pub fn locations(&self) -> Vec<Location> {
        self.location.iter().cloned().collect()
    }

    pub fn has_annotated_members(&self) -> bool {
        self.members.iter().any(MemberSymbol::has_annotations)
    }
}

/// Types the analysis must be able to identify by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownType {
    /// Payload naming the changed property
    NotificationArgs,
    /// Delegate type of the notification event
    NotificationEventHandler,
    String,
    Object,
    Boolean,
}

/// Read-only view of declarations consumed by the analysis.
///
/// Implementations must be safe to share between worker threads; the
/// analysis never mutates through this interface.
pub trait SymbolProvider: Sync {
    /// All declared types, in declaration order, each name once
    fn declared_types(&self) -> Vec<&TypeDecl>;

    fn type_decl(&self, name: &TypeName) -> Option<&TypeDecl>;

    fn members_of(&self, name: &TypeName) -> &[MemberSymbol] {
        self.type_decl(name)
            .map(|decl| decl.members.as_slice())
            .unwrap_or(&[])
    }

    /// Ancestors of `name`, nearest first
    fn base_chain_of(&self, name: &TypeName) -> Vec<TypeName>;

    /// Whether `member`, declared on `owner`, may be used from inside `from`
    fn is_accessible(&self, member: &MemberSymbol, owner: &TypeName, from: &TypeName) -> bool;

    fn has_implicit_conversion(&self, from: &TypeName, to: &TypeName) -> bool;

    fn well_known_type(&self, ty: WellKnownType) -> Option<TypeName>;

    fn is_generic(&self, method: &MethodShape) -> bool {
        !method.type_parameters.is_empty()
    }

    fn returns_void(&self, method: &MethodShape) -> bool {
        method.return_type.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widest_accessibility() {
        use Accessibility::*;
        assert_eq!(Private.widest(Public), Public);
        assert_eq!(Protected.widest(Private), Protected);
        assert_eq!(Internal.widest(Protected), ProtectedInternal);
        assert_eq!(ProtectedInternal.widest(Internal), ProtectedInternal);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(TypeName::from("Test.Foo.SomeViewModel").short_name(), "SomeViewModel");
        assert_eq!(TypeName::from("SomeViewModel").short_name(), "SomeViewModel");
    }

    #[test]
    fn test_member_deserializes_from_json() {
        let member: MemberSymbol = serde_json::from_value(serde_json::json!({
            "name": "_foo",
            "kind": { "field": {} },
            "type": "string",
            "annotations": [
                { "annotation": "notify", "setter": "protected" },
                { "annotation": "also_notify", "names": ["Bar"] }
            ]
        }))
        .unwrap();

        assert_eq!(member.kind, MemberKind::Field { readonly: false });
        assert_eq!(member.accessibility, Accessibility::Private);
        assert!(matches!(
            member.notify_annotation(),
            Some(Annotation::Notify { setter: Some(Accessibility::Protected), .. })
        ));
        assert_eq!(member.annotations.len(), 2);
    }

    #[test]
    fn test_annotation_location_falls_back_to_member() {
        let annotation = Annotation::IsChanged { location: None };
        let member = MemberSymbol {
            name: "IsDirty".to_string(),
            kind: MemberKind::Property { has_getter: true, has_setter: true },
            declared_type: Some("bool".into()),
            accessibility: Accessibility::Public,
            is_static: false,
            is_override: false,
            annotations: vec![annotation.clone()],
            location: Some(Location::new("a.cs", 3, 5)),
        };

        assert_eq!(member.annotation_locations(&annotation), vec![Location::new("a.cs", 3, 5)]);
    }
}
