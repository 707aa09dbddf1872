// src/core/configuration.rs
use serde::Serialize;
use tracing::warn;

use crate::config::{GenerationOptions, DEFAULT_RAISE_METHOD_NAMES};
use super::diagnostics::Diagnostics;

/// How the first letter of a generated property name is cased
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FirstLetterCapitalization {
    #[default]
    UpperCase,
    LowerCase,
    None,
}

impl FirstLetterCapitalization {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "upper_case" | "upper" => Some(Self::UpperCase),
            "lower_case" | "lower" => Some(Self::LowerCase),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn apply(&self, name: &str) -> String {
        let mut chars = name.chars();
        match (self, chars.next()) {
            (Self::UpperCase, Some(first)) => first.to_uppercase().chain(chars).collect(),
            (Self::LowerCase, Some(first)) => first.to_lowercase().chain(chars).collect(),
            _ => name.to_string(),
        }
    }
}

/// Resolved, immutable options for one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    raise_method_names: Vec<String>,
    first_letter_capitalization: FirstLetterCapitalization,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            raise_method_names: DEFAULT_RAISE_METHOD_NAMES.iter().map(|s| s.to_string()).collect(),
            first_letter_capitalization: FirstLetterCapitalization::default(),
        }
    }
}

impl Configuration {
    /// Validate raw options. Unrecognised values are reported and replaced by defaults.
    pub fn resolve(options: &GenerationOptions, diagnostics: &mut Diagnostics) -> Self {
        let defaults = Self::default();

        let raise_method_names: Vec<String> = options
            .raise_method_names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        let raise_method_names = if raise_method_names.is_empty() {
            warn!("No raise method names configured, using the defaults");
            defaults.raise_method_names
        } else {
            raise_method_names
        };

        let first_letter_capitalization =
            match FirstLetterCapitalization::parse(&options.first_letter_capitalization) {
                Some(rule) => rule,
                None => {
                    diagnostics.report_unknown_first_letter_capitalization(
                        &options.first_letter_capitalization,
                    );
                    defaults.first_letter_capitalization
                }
            };

        Self {
            raise_method_names,
            first_letter_capitalization,
        }
    }

    /// Never empty
    pub fn raise_method_names(&self) -> &[String] {
        &self.raise_method_names
    }

    /// Name used when the raise method has to be synthesized
    pub fn default_raise_method_name(&self) -> &str {
        &self.raise_method_names[0]
    }

    pub fn first_letter_capitalization(&self) -> FirstLetterCapitalization {
        self.first_letter_capitalization
    }
}
