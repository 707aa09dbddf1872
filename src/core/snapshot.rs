// src/core/snapshot.rs
use std::collections::{HashMap, HashSet};
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NotifyGenError, Result};
use super::symbols::{
    Accessibility, MemberSymbol, SymbolProvider, TypeDecl, TypeName, WellKnownType,
};

fn default_notification_args() -> Option<TypeName> {
    Some(TypeName::new("System.ComponentModel.PropertyChangedEventArgs"))
}

fn default_event_handler() -> Option<TypeName> {
    Some(TypeName::new("System.ComponentModel.PropertyChangedEventHandler"))
}

fn default_string() -> TypeName {
    TypeName::new("string")
}

fn default_object() -> TypeName {
    TypeName::new("object")
}

fn default_boolean() -> TypeName {
    TypeName::new("bool")
}

/// Names under which the snapshot's extractor recorded the well-known types.
/// A `null` notification-args entry means the type could not be located.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellKnownTypes {
    #[serde(default = "default_notification_args")]
    pub notification_args: Option<TypeName>,
    #[serde(default = "default_event_handler")]
    pub event_handler: Option<TypeName>,
    #[serde(default = "default_string")]
    pub string: TypeName,
    #[serde(default = "default_object")]
    pub object: TypeName,
    #[serde(default = "default_boolean")]
    pub boolean: TypeName,
}

impl Default for WellKnownTypes {
    fn default() -> Self {
        Self {
            notification_args: default_notification_args(),
            event_handler: default_event_handler(),
            string: default_string(),
            object: default_object(),
            boolean: default_boolean(),
        }
    }
}

/// An extra implicit conversion the extractor knows about (numeric widening etc.)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub from: TypeName,
    pub to: TypeName,
}

/// In-memory symbol provider loaded from a JSON declaration snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSnapshot {
    #[serde(default)]
    pub well_known: WellKnownTypes,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub conversions: Vec<Conversion>,
    #[serde(skip)]
    index: HashMap<TypeName, usize>,
}

impl SymbolSnapshot {
    pub fn new(types: Vec<TypeDecl>) -> Self {
        Self::with_well_known(WellKnownTypes::default(), types)
    }

    pub fn with_well_known(well_known: WellKnownTypes, types: Vec<TypeDecl>) -> Self {
        let mut snapshot = Self {
            well_known,
            types,
            conversions: Vec::new(),
            index: HashMap::new(),
        };
        snapshot.merge_fragments();
        snapshot.build_index();
        snapshot
    }

    /// Parse a snapshot from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let mut snapshot: SymbolSnapshot = serde_json::from_str(content)?;
        snapshot.merge_fragments();
        snapshot.build_index();
        Ok(snapshot)
    }

    /// Load a snapshot file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&content).map_err(|e| {
            NotifyGenError::Snapshot(format!("{}: {}", path.as_ref().display(), e))
        })
    }

    /// Fold same-named declarations (partial type fragments) into the first one.
    ///
    /// Members keep fragment order. The merged type is partial only if every
    /// fragment is; base, containing type and location come from the first
    /// fragment that names them.
    fn merge_fragments(&mut self) {
        let mut merged: Vec<TypeDecl> = Vec::with_capacity(self.types.len());
        let mut position: HashMap<TypeName, usize> = HashMap::new();

        for fragment in std::mem::take(&mut self.types) {
            match position.get(&fragment.name) {
                Some(&i) => {
                    debug!("Merging fragment of {}", fragment.name);
                    let target = &mut merged[i];
                    target.is_partial &= fragment.is_partial;
                    target.external &= fragment.external;
                    target.containing_type = target.containing_type.take().or(fragment.containing_type);
                    target.base_type = target.base_type.take().or(fragment.base_type);
                    target.location = target.location.take().or(fragment.location);
                    target.members.extend(fragment.members);
                }
                None => {
                    position.insert(fragment.name.clone(), merged.len());
                    merged.push(fragment);
                }
            }
        }

        self.types = merged;
    }

    fn build_index(&mut self) {
        self.index = self
            .types
            .iter()
            .enumerate()
            .map(|(i, decl)| (decl.name.clone(), i))
            .collect();
    }

    fn is_external(&self, name: &TypeName) -> bool {
        self.type_decl(name).map_or(true, |decl| decl.external)
    }

    /// `name` itself or any type it is nested inside
    fn nesting_chain(&self, name: &TypeName) -> Vec<TypeName> {
        let mut chain = vec![name.clone()];
        let mut seen = HashSet::new();
        seen.insert(name.clone());
        let mut current = self.type_decl(name).and_then(|d| d.containing_type.clone());
        while let Some(outer) = current {
            if !seen.insert(outer.clone()) {
                break;
            }
            current = self.type_decl(&outer).and_then(|d| d.containing_type.clone());
            chain.push(outer);
        }
        chain
    }

    fn is_same_or_derived(&self, ty: &TypeName, ancestor: &TypeName) -> bool {
        ty == ancestor || self.base_chain_of(ty).contains(ancestor)
    }
}

impl SymbolProvider for SymbolSnapshot {
    fn declared_types(&self) -> Vec<&TypeDecl> {
        self.types.iter().collect()
    }

    fn type_decl(&self, name: &TypeName) -> Option<&TypeDecl> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    fn base_chain_of(&self, name: &TypeName) -> Vec<TypeName> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(name.clone());
        let mut current = self.type_decl(name).and_then(|d| d.base_type.clone());
        while let Some(base) = current {
            if !seen.insert(base.clone()) {
                break;
            }
            current = self.type_decl(&base).and_then(|d| d.base_type.clone());
            chain.push(base);
        }
        chain
    }

    fn is_accessible(&self, member: &MemberSymbol, owner: &TypeName, from: &TypeName) -> bool {
        let same_assembly = !self.is_external(owner);
        let within = self.nesting_chain(from);

        match member.accessibility {
            Accessibility::Public => true,
            Accessibility::Internal => same_assembly,
            Accessibility::Private => within.contains(owner),
            Accessibility::Protected => within.iter().any(|t| self.is_same_or_derived(t, owner)),
            Accessibility::ProtectedInternal => {
                same_assembly || within.iter().any(|t| self.is_same_or_derived(t, owner))
            }
            Accessibility::PrivateProtected => {
                same_assembly && within.iter().any(|t| self.is_same_or_derived(t, owner))
            }
        }
    }

    fn has_implicit_conversion(&self, from: &TypeName, to: &TypeName) -> bool {
        from == to
            || *to == self.well_known.object
            || self.base_chain_of(from).contains(to)
            || self.conversions.iter().any(|c| &c.from == from && &c.to == to)
    }

    fn well_known_type(&self, ty: WellKnownType) -> Option<TypeName> {
        match ty {
            WellKnownType::NotificationArgs => self.well_known.notification_args.clone(),
            WellKnownType::NotificationEventHandler => self.well_known.event_handler.clone(),
            WellKnownType::String => Some(self.well_known.string.clone()),
            WellKnownType::Object => Some(self.well_known.object.clone()),
            WellKnownType::Boolean => Some(self.well_known.boolean.clone()),
        }
    }
}
