// src/core/analysis/context.rs
use crate::core::configuration::Configuration;
use crate::core::diagnostics::Diagnostics;
use crate::core::symbols::{
    MemberSymbol, MethodShape, SymbolProvider, TypeDecl, TypeName, WellKnownType,
};

/// Well-known types, looked up once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownTypes {
    pub notification_args: TypeName,
    /// Without it no existing event can match, so every root type declares its own
    pub event_handler: Option<TypeName>,
    pub string: Option<TypeName>,
    pub object: Option<TypeName>,
    pub boolean: Option<TypeName>,
}

impl KnownTypes {
    /// `None` (with INPC001 reported) when the notification args type is missing,
    /// in which case nothing can be analysed.
    pub fn resolve(provider: &dyn SymbolProvider, diagnostics: &mut Diagnostics) -> Option<Self> {
        let Some(notification_args) = provider.well_known_type(WellKnownType::NotificationArgs) else {
            diagnostics.report_notification_args_not_found();
            return None;
        };

        Some(Self {
            notification_args,
            event_handler: provider.well_known_type(WellKnownType::NotificationEventHandler),
            string: provider.well_known_type(WellKnownType::String),
            object: provider.well_known_type(WellKnownType::Object),
            boolean: provider.well_known_type(WellKnownType::Boolean),
        })
    }

    pub fn is_notification_args(&self, ty: &TypeName) -> bool {
        *ty == self.notification_args
    }

    pub fn is_string(&self, ty: &TypeName) -> bool {
        self.string.as_ref() == Some(ty)
    }

    pub fn is_object(&self, ty: &TypeName) -> bool {
        self.object.as_ref() == Some(ty)
    }

    pub fn is_boolean(&self, ty: &TypeName) -> bool {
        self.boolean.as_ref() == Some(ty)
    }
}

/// Read-only inputs shared by every resolver during a run
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub provider: &'a dyn SymbolProvider,
    pub config: &'a Configuration,
    pub known: &'a KnownTypes,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        provider: &'a dyn SymbolProvider,
        config: &'a Configuration,
        known: &'a KnownTypes,
    ) -> Self {
        Self {
            provider,
            config,
            known,
        }
    }

    /// `decl` followed by its declared ancestors, nearest first.
    /// Ancestors the provider knows nothing about contribute no members.
    pub fn type_and_ancestors(&self, decl: &'a TypeDecl) -> Vec<&'a TypeDecl> {
        let provider = self.provider;
        std::iter::once(decl)
            .chain(
                provider
                    .base_chain_of(&decl.name)
                    .iter()
                    .filter_map(|name| provider.type_decl(name)),
            )
            .collect()
    }

    /// Methods named `name` declared on `owner`, skipping static and override members
    pub fn instance_methods(&self, owner: &'a TypeDecl, name: &str) -> Vec<Candidate<'a>> {
        self.provider
            .members_of(&owner.name)
            .iter()
            .filter(|m| m.name == name && !m.is_static && !m.is_override)
            .filter_map(|m| {
                m.method_shape().map(|shape| Candidate {
                    owner: &owner.name,
                    symbol: m,
                    shape,
                })
            })
            .collect()
    }

    /// Non-generic, void-returning and accessible from `from`
    pub fn is_callable_from(&self, candidate: &Candidate<'_>, from: &TypeName) -> bool {
        !self.provider.is_generic(candidate.shape)
            && self.provider.returns_void(candidate.shape)
            && self.provider.is_accessible(candidate.symbol, candidate.owner, from)
    }
}

/// A method found while searching for a raise method or hook
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub owner: &'a TypeName,
    pub symbol: &'a MemberSymbol,
    pub shape: &'a MethodShape,
}
