// src/core/analysis/analyser.rs
use tracing::debug;

use crate::core::diagnostics::Diagnostics;
use crate::core::symbols::TypeDecl;
use super::context::AnalysisContext;
use super::type_analysis::TypeAnalysis;
use super::{accessibility, dependencies, hooks, is_changed, members, partial_chain, raise_method};

/// A finished plan together with the diagnostics raised while building it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysedType {
    pub analysis: TypeAnalysis,
    pub diagnostics: Diagnostics,
}

/// Analyse one type.
///
/// `base_analyses` are the finished plans of the type's analysed ancestors,
/// nearest first. Types failing the partial-chain check or raise-method
/// resolution come back with `can_generate == false` and no further
/// resolvers run for them.
pub fn analyse_type<'a>(
    ctx: &AnalysisContext<'a>,
    decl: &'a TypeDecl,
    base_analyses: &[&TypeAnalysis],
) -> AnalysedType {
    debug!("Analysing {}", decl.name);

    let mut diagnostics = Diagnostics::new();
    let mut analysis = TypeAnalysis::new(decl.name.clone());
    analysis.containing_types = partial_chain::containing_types(ctx.provider, decl)
        .iter()
        .rev()
        .map(|outer| outer.name.clone())
        .collect();

    let type_members = decl.members.as_slice();
    let mut classified = members::classify(
        decl,
        type_members,
        ctx.config.first_letter_capitalization(),
        &mut diagnostics,
    );

    if !partial_chain::check(ctx.provider, decl, &mut diagnostics) {
        debug!("{} is not eligible for generation", decl.name);
        return AnalysedType { analysis, diagnostics };
    }

    let Some(resolution) = raise_method::resolve(ctx, decl, base_analyses, &mut diagnostics) else {
        debug!("{} excluded: no usable raise method", decl.name);
        return AnalysedType { analysis, diagnostics };
    };
    analysis.can_generate = true;
    analysis.requires_event = resolution.requires_event;
    analysis.requires_raise_method = resolution.requires_raise_method;
    analysis.raise_method = Some(resolution.raise_method);

    for member in &mut classified {
        accessibility::reconcile(member.symbol, &mut member.property, &mut diagnostics);
        member.property.on_changed = hooks::resolve(
            ctx,
            decl,
            &member.property.name,
            &member.property.ty,
            &mut diagnostics,
        );
    }

    analysis.cascades = dependencies::build(&classified, &mut diagnostics);
    analysis.is_changed_property = is_changed::resolve(
        ctx.known,
        type_members,
        &classified,
        base_analyses,
        &mut diagnostics,
    );
    analysis.properties = classified.into_iter().map(|c| c.property).collect();

    AnalysedType { analysis, diagnostics }
}
