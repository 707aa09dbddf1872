// src/core/analysis/report.rs
use std::fmt::Write;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::diagnostics::Diagnostic;
use crate::error::Result;
use super::type_analysis::{OnChangedSignature, RaiseMethodNameType, TypeAnalysis};

/// Everything one analysis run produced, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub types: Vec<TypeAnalysis>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    pub fn generating_types(&self) -> impl Iterator<Item = &TypeAnalysis> {
        self.types.iter().filter(|t| t.can_generate)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// SHA-256 over the compact JSON form, hex encoded
    pub fn fingerprint(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&json);
        Ok(format!("{:x}", hasher.finalize()))
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for analysis in &self.types {
            render_type(&mut out, analysis);
        }

        if !self.diagnostics.is_empty() {
            if !self.types.is_empty() {
                out.push('\n');
            }
            for diagnostic in &self.diagnostics {
                let _ = writeln!(out, "{}", diagnostic);
            }
        }

        let generating = self.generating_types().count();
        let _ = writeln!(
            out,
            "{} type(s) analysed, {} generating, {} diagnostic(s)",
            self.types.len(),
            generating,
            self.diagnostics.len()
        );
        out
    }
}

fn render_type(out: &mut String, analysis: &TypeAnalysis) {
    if !analysis.can_generate {
        let _ = writeln!(out, "{}: skipped", analysis.type_name);
        return;
    }

    let mut header = format!("{}:", analysis.type_name);
    if analysis.requires_event {
        header.push_str(" declares event;");
    }
    if let Some(raise) = &analysis.raise_method {
        let argument = match raise.signature.name_type {
            RaiseMethodNameType::EventArgs => "args",
            RaiseMethodNameType::String => "name",
        };
        let extra = if raise.signature.has_old_and_new { ", old, new" } else { "" };
        let action = if analysis.requires_raise_method { "declares" } else { "calls" };
        let _ = write!(header, " {} {}({}{})", action, raise.name, argument, extra);
    }
    let _ = writeln!(out, "{}", header);

    for property in &analysis.properties {
        let _ = write!(
            out,
            "  {} {} {} <- {}",
            property.accessibility(),
            property.ty,
            property.name,
            property.backing_member
        );
        if let Some(hook) = &property.on_changed {
            let params = match hook.signature {
                OnChangedSignature::Parameterless => "",
                OnChangedSignature::OldAndNew => "old, new",
            };
            let _ = write!(out, " [{}({})]", hook.method_name, params);
        }
        out.push('\n');

        let targets: Vec<&str> = analysis.cascade_targets(&property.name).collect();
        if !targets.is_empty() {
            let _ = writeln!(out, "    also raises: {}", targets.join(", "));
        }
    }

    if let Some(flag) = &analysis.is_changed_property {
        let _ = writeln!(out, "  dirty flag: {}", flag);
    }
}
