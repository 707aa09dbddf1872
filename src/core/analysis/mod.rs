// src/core/analysis/mod.rs
//! Change-notification analysis.
//!
//! Each candidate type goes through member classification, the partial-chain
//! check, raise-method resolution, accessor reconciliation, hook lookup, the
//! cascade graph and dirty-flag selection, in that order. The result is an
//! immutable `TypeAnalysis` plan plus the diagnostics raised on the way.

mod accessibility;
mod analyser;
mod context;
mod dependencies;
mod hooks;
mod is_changed;
mod members;
mod partial_chain;
mod raise_method;
mod report;
mod run;
mod type_analysis;

pub use report::AnalysisReport;
pub use run::analyse_all;
