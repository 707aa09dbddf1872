// src/core/analysis/type_analysis.rs
use serde::Serialize;

use crate::core::symbols::{Accessibility, TypeName};

/// What the raise method's first argument is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RaiseMethodNameType {
    /// A notification-args instance
    EventArgs,
    /// The property name as a string
    String,
}

/// Call shape of the raise method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RaiseMethodSignature {
    pub name_type: RaiseMethodNameType,
    /// Also passes old and new values, both as object
    pub has_old_and_new: bool,
}

impl RaiseMethodSignature {
    pub const fn new(name_type: RaiseMethodNameType, has_old_and_new: bool) -> Self {
        Self {
            name_type,
            has_old_and_new,
        }
    }
}

impl Default for RaiseMethodSignature {
    fn default() -> Self {
        Self::new(RaiseMethodNameType::EventArgs, false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaiseMethod {
    pub name: String,
    pub signature: RaiseMethodSignature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnChangedSignature {
    Parameterless,
    OldAndNew,
}

/// A user-written `On{Property}Changed` callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnChangedHook {
    pub method_name: String,
    pub signature: OnChangedSignature,
}

/// "When `source` changes, also raise `target`"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
}

/// A property to generate from an annotated backing member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedProperty {
    /// Name of the field or property holding the value
    pub backing_member: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeName,
    pub getter: Accessibility,
    pub setter: Accessibility,
    pub on_changed: Option<OnChangedHook>,
}

impl GeneratedProperty {
    /// Accessibility of the property declaration itself
    pub fn accessibility(&self) -> Accessibility {
        self.getter.widest(self.setter)
    }
}

/// Generation plan for one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeAnalysis {
    pub type_name: TypeName,
    /// Enclosing types, outermost first
    pub containing_types: Vec<TypeName>,
    pub can_generate: bool,
    pub requires_event: bool,
    pub requires_raise_method: bool,
    /// Set once raise-method resolution succeeds
    pub raise_method: Option<RaiseMethod>,
    pub properties: Vec<GeneratedProperty>,
    pub cascades: Vec<DependencyEdge>,
    /// Dirty flag set by every generated setter
    pub is_changed_property: Option<String>,
}

impl TypeAnalysis {
    pub fn new(type_name: TypeName) -> Self {
        Self {
            type_name,
            containing_types: Vec::new(),
            can_generate: false,
            requires_event: false,
            requires_raise_method: false,
            raise_method: None,
            properties: Vec::new(),
            cascades: Vec::new(),
            is_changed_property: None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&GeneratedProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Properties to raise after `source` has been raised, one hop only
    pub fn cascade_targets<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.cascades
            .iter()
            .filter(move |edge| edge.source == source)
            .map(|edge| edge.target.as_str())
    }
}
