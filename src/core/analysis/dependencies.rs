// src/core/analysis/dependencies.rs
//! Direct cascade edges between generated properties.
//!
//! Only single hops are recorded. A cascade chain fires at runtime one raise
//! at a time, so no closure is computed here and cycles are not rejected.

use std::collections::HashSet;

use crate::core::diagnostics::{DiagnosticCode, Diagnostics};
use crate::core::symbols::Annotation;
use super::members::ClassifiedMember;
use super::type_analysis::DependencyEdge;

pub fn build(members: &[ClassifiedMember<'_>], diagnostics: &mut Diagnostics) -> Vec<DependencyEdge> {
    let generated: HashSet<&str> = members.iter().map(|m| m.property.name.as_str()).collect();
    let mut edges = Vec::new();
    let mut seen = HashSet::new();

    for member in members {
        let this = member.property.name.as_str();

        for annotation in &member.symbol.annotations {
            let (names, is_also_notify) = match annotation {
                Annotation::AlsoNotify { names, .. } => (names, true),
                Annotation::DependsOn { names, .. } => (names, false),
                _ => continue,
            };

            for other in names {
                let other = other.as_str();
                let problem = if other == this {
                    Some(if is_also_notify {
                        DiagnosticCode::AlsoNotifyForSelf
                    } else {
                        DiagnosticCode::DependsOnForSelf
                    })
                } else if !generated.contains(other) {
                    Some(if is_also_notify {
                        DiagnosticCode::AlsoNotifyPropertyDoesNotExist
                    } else {
                        DiagnosticCode::DependsOnPropertyDoesNotExist
                    })
                } else {
                    None
                };

                if let Some(code) = problem {
                    diagnostics.report(code, member.symbol.annotation_locations(annotation), &[other]);
                    continue;
                }

                let edge = if is_also_notify {
                    DependencyEdge { source: this.to_string(), target: other.to_string() }
                } else {
                    DependencyEdge { source: other.to_string(), target: this.to_string() }
                };
                if seen.insert(edge.clone()) {
                    edges.push(edge);
                }
            }
        }
    }

    edges
}
