// src/core/analysis/run.rs
//! Whole-compilation driver.
//!
//! Candidate types are grouped by the furthest candidate ancestor in their
//! base chain. Groups share no state and run on the rayon pool; inside a
//! group, types run ancestors-first so every derived type sees its bases'
//! finished plans.

use std::collections::{HashMap, HashSet};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::configuration::Configuration;
use crate::core::diagnostics::Diagnostics;
use crate::core::symbols::{SymbolProvider, TypeDecl, TypeName};
use super::analyser::{analyse_type, AnalysedType};
use super::context::{AnalysisContext, KnownTypes};
use super::report::AnalysisReport;
use super::type_analysis::TypeAnalysis;

/// A candidate type with its position in declaration order
struct Candidate<'a> {
    index: usize,
    decl: &'a TypeDecl,
    base_chain: Vec<TypeName>,
}

/// Analyse every candidate type the provider declares.
///
/// `config_diagnostics` carries whatever resolving the configuration already
/// reported; those come first in the merged output.
pub fn analyse_all(
    provider: &dyn SymbolProvider,
    configuration: &Configuration,
    config_diagnostics: Diagnostics,
) -> AnalysisReport {
    analyse_with(provider, configuration, config_diagnostics, true)
}

fn analyse_with(
    provider: &dyn SymbolProvider,
    configuration: &Configuration,
    config_diagnostics: Diagnostics,
    parallel: bool,
) -> AnalysisReport {
    let mut diagnostics = config_diagnostics;

    let Some(known) = KnownTypes::resolve(provider, &mut diagnostics) else {
        info!("Notification args type not found, nothing to analyse");
        return AnalysisReport {
            types: Vec::new(),
            diagnostics: diagnostics.into_vec(),
        };
    };

    let ctx = AnalysisContext::new(provider, configuration, &known);
    let groups = hierarchy_groups(provider);
    info!(
        "Analysing {} candidate type(s) in {} hierarchy group(s)",
        groups.iter().map(Vec::len).sum::<usize>(),
        groups.len()
    );

    let finished: Vec<Vec<(usize, AnalysedType)>> = if parallel {
        groups.par_iter().map(|group| analyse_group(&ctx, group)).collect()
    } else {
        groups.iter().map(|group| analyse_group(&ctx, group)).collect()
    };

    let mut finished: Vec<(usize, AnalysedType)> = finished.into_iter().flatten().collect();
    finished.sort_by_key(|(index, _)| *index);

    let mut types = Vec::with_capacity(finished.len());
    for (_, analysed) in finished {
        diagnostics.extend(analysed.diagnostics);
        types.push(analysed.analysis);
    }

    info!(
        "Analysis complete: {} generating, {} diagnostic(s)",
        types.iter().filter(|t| t.can_generate).count(),
        diagnostics.len()
    );

    AnalysisReport {
        types,
        diagnostics: diagnostics.into_vec(),
    }
}

/// Partition candidates by hierarchy root. Each group is sorted ancestors-first.
fn hierarchy_groups(provider: &dyn SymbolProvider) -> Vec<Vec<Candidate<'_>>> {
    let candidates: Vec<Candidate<'_>> = provider
        .declared_types()
        .into_iter()
        .enumerate()
        .filter(|(_, decl)| decl.has_annotated_members())
        .map(|(index, decl)| Candidate {
            index,
            decl,
            base_chain: provider.base_chain_of(&decl.name),
        })
        .collect();

    let candidate_names: HashSet<TypeName> = candidates.iter().map(|c| c.decl.name.clone()).collect();

    let mut group_of_root: HashMap<TypeName, usize> = HashMap::new();
    let mut groups: Vec<Vec<Candidate<'_>>> = Vec::new();

    for candidate in candidates {
        let root = candidate
            .base_chain
            .iter()
            .rev()
            .find(|ancestor| candidate_names.contains(*ancestor))
            .unwrap_or(&candidate.decl.name)
            .clone();

        let slot = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(candidate);
    }

    for group in &mut groups {
        // An ancestor's chain is a strict suffix of its descendants' chains
        group.sort_by_key(|c| (c.base_chain.len(), c.index));
    }
    groups
}

fn analyse_group(ctx: &AnalysisContext<'_>, group: &[Candidate<'_>]) -> Vec<(usize, AnalysedType)> {
    let mut results: Vec<(usize, AnalysedType)> = Vec::with_capacity(group.len());
    let mut by_name: HashMap<&TypeName, usize> = HashMap::new();

    for candidate in group {
        let analysed = {
            let base_analyses: Vec<&TypeAnalysis> = candidate
                .base_chain
                .iter()
                .filter_map(|ancestor| by_name.get(ancestor))
                .map(|&slot| &results[slot].1.analysis)
                .collect();
            debug!(
                "{} sees {} analysed ancestor(s)",
                candidate.decl.name,
                base_analyses.len()
            );
            analyse_type(ctx, candidate.decl, &base_analyses)
        };

        by_name.insert(&candidate.decl.name, results.len());
        results.push((candidate.index, analysed));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::DiagnosticCode;
    use crate::core::snapshot::{fixtures::*, SymbolSnapshot, WellKnownTypes};
    use crate::core::symbols::Location;

    fn run(snapshot: &SymbolSnapshot) -> AnalysisReport {
        analyse_all(snapshot, &Configuration::default(), Diagnostics::new())
    }

    fn codes(report: &AnalysisReport) -> Vec<DiagnosticCode> {
        report.diagnostics.iter().map(|d| d.code).collect()
    }

    fn names(report: &AnalysisReport) -> Vec<&str> {
        report.types.iter().map(|t| t.type_name.as_str()).collect()
    }

    #[test]
    fn test_missing_notification_args_stops_the_run() {
        let well_known = WellKnownTypes {
            notification_args: None,
            ..WellKnownTypes::default()
        };
        let snapshot = SymbolSnapshot::with_well_known(
            well_known,
            vec![class("Vm").member(notify_field("_foo", "int"))],
        );
        let report = run(&snapshot);

        assert!(report.types.is_empty());
        assert_eq!(codes(&report), vec![DiagnosticCode::NotificationArgsNotFound]);
        assert!(report.diagnostics[0].locations.is_empty());
    }

    #[test]
    fn test_only_annotated_types_are_candidates() {
        let snapshot = SymbolSnapshot::new(vec![
            class("Plain").member(field("_x", "int")),
            class("Vm").member(notify_field("_foo", "int")),
        ]);
        let report = run(&snapshot);
        assert_eq!(names(&report), vec!["Vm"]);
    }

    #[test]
    fn test_results_follow_declaration_order_across_hierarchies() {
        // Derived types declared before their bases still come out in declaration order
        let snapshot = SymbolSnapshot::new(vec![
            class("Leaf").base("Mid").member(notify_field("_c", "int")),
            class("Other").not_partial().member(notify_field("_z", "int")),
            class("Mid").base("Root").member(notify_field("_b", "int")),
            class("Root").member(notify_field("_a", "int")),
        ]);
        let report = run(&snapshot);

        assert_eq!(names(&report), vec!["Leaf", "Other", "Mid", "Root"]);
        let root = &report.types[3];
        let mid = &report.types[2];
        let leaf = &report.types[0];
        assert!(root.requires_event && root.requires_raise_method);
        assert!(mid.can_generate && !mid.requires_event && !mid.requires_raise_method);
        assert!(leaf.can_generate && !leaf.requires_event && !leaf.requires_raise_method);
        assert_eq!(codes(&report), vec![DiagnosticCode::TypeIsNotPartial]);
    }

    #[test]
    fn test_ineligible_base_does_not_own_event() {
        let snapshot = SymbolSnapshot::new(vec![
            class("Base").not_partial().member(notify_field("_a", "int")),
            class("Derived").base("Base").member(notify_field("_b", "int")),
        ]);
        let report = run(&snapshot);

        let derived = &report.types[1];
        assert!(derived.can_generate);
        assert!(derived.requires_event);
        assert!(derived.requires_raise_method);
    }

    #[test]
    fn test_unannotated_middle_type_is_skipped_over() {
        let snapshot = SymbolSnapshot::new(vec![
            class("Root").member(notify_field("_a", "int")),
            class("Middle").base("Root"),
            class("Leaf").base("Middle").member(notify_field("_c", "int")),
        ]);
        let report = run(&snapshot);

        assert_eq!(names(&report), vec!["Root", "Leaf"]);
        assert!(!report.types[1].requires_event);
        assert!(!report.types[1].requires_raise_method);
    }

    #[test]
    fn test_non_partial_middle_outer_type() {
        let snapshot = SymbolSnapshot::new(vec![
            class("A"),
            class("A.B").not_partial().nested_in("A"),
            class("A.B.C").nested_in("A.B").member(notify_field("_x", "int")),
            class("A.D").nested_in("A").member(notify_field("_y", "int")),
        ]);
        let report = run(&snapshot);

        assert_eq!(names(&report), vec!["A.B.C", "A.D"]);
        assert!(!report.types[0].can_generate);
        assert!(report.types[1].can_generate);

        let diagnostic = &report.diagnostics[0];
        assert_eq!(codes(&report), vec![DiagnosticCode::OuterTypeIsNotPartial]);
        assert_eq!(diagnostic.args, vec!["B", "C"]);
        assert_eq!(diagnostic.locations, vec![Location::new("test.cs", 1, 1)]);
    }

    #[test]
    fn test_partial_fragments_analysed_once() {
        let snapshot = SymbolSnapshot::new(vec![
            class("Vm").member(notify_field("_a", "int")),
            class("Vm").member(notify_field("_b", "int")),
        ]);
        let report = run(&snapshot);

        assert_eq!(names(&report), vec!["Vm"]);
        let properties: Vec<_> = report.types[0].properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(properties, vec!["A", "B"]);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_configuration_diagnostics_come_first() {
        let mut config_diagnostics = Diagnostics::new();
        config_diagnostics.report_unknown_first_letter_capitalization("Shouting");
        let snapshot = SymbolSnapshot::new(vec![class("Vm").not_partial().member(notify_field("_foo", "int"))]);
        let report = analyse_all(&snapshot, &Configuration::default(), config_diagnostics);

        assert_eq!(
            codes(&report),
            vec![DiagnosticCode::UnknownFirstLetterCapitalization, DiagnosticCode::TypeIsNotPartial]
        );
    }

    #[test]
    fn test_runs_are_idempotent_and_parallel_matches_sequential() {
        let mut types = Vec::new();
        for i in 0..16 {
            let root = format!("Root{}", i);
            types.push(class(&root).member(notify_field("_a", "int").annotate(also_notify(&["B"]))).member(notify_field("_b", "int")));
            types.push(class(&format!("Leaf{}", i)).base(&root).member(notify_field("_c", "int")).member(method("OnCChanged", &[])));
            types.push(class(&format!("Broken{}", i)).not_partial().member(notify_field("_d", "int")));
        }
        let snapshot = SymbolSnapshot::new(types);
        let config = Configuration::default();

        let first = analyse_all(&snapshot, &config, Diagnostics::new());
        let second = analyse_all(&snapshot, &config, Diagnostics::new());
        let sequential = analyse_with(&snapshot, &config, Diagnostics::new(), false);

        assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
        assert_eq!(first, sequential);
        assert_eq!(first.types.len(), 48);
        assert_eq!(first.diagnostics.len(), 16);
    }
}
