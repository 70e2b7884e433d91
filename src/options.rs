//! # Analysis and Formatting Options
//!
//! Knobs for the analyzer (traversal budgets, value extraction) and for the
//! markdown output. All option structs can be loaded from JSON; missing
//! fields fall back to their defaults.

use crate::error::{BpgaError, Result};
use serde::{Deserialize, Serialize};

/// Options controlling graph traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Maximum number of nodes visited while walking one entry point
    pub max_steps: usize,

    /// Maximum nesting depth of blocks and data expressions
    pub max_depth: usize,

    /// Hoist computed values read by several inputs into temporaries
    pub extract_shared_values: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_depth: 64,
            extract_shared_values: true,
        }
    }
}

impl AnalysisOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(BpgaError::InvalidOptions("max_steps must be positive".into()));
        }
        if self.max_depth == 0 {
            return Err(BpgaError::InvalidOptions("max_depth must be positive".into()));
        }
        Ok(())
    }
}

/// Options controlling the rendered pseudo-code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Spaces per indentation level
    pub indent_width: usize,

    /// Annotate parameters and declarations with their pin types
    pub show_types: bool,

    /// Append the originating node name to fallback output
    pub show_source: bool,

    /// Emit the diagnostics section after the event listing
    pub show_diagnostics: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self::concise()
    }
}

impl FormatOptions {
    /// Compact output: two-space indent, no type annotations
    pub fn concise() -> Self {
        Self {
            indent_width: 2,
            show_types: false,
            show_source: false,
            show_diagnostics: false,
        }
    }

    /// Detailed output: four-space indent, types and node names shown
    pub fn verbose() -> Self {
        Self {
            indent_width: 4,
            show_types: true,
            show_source: true,
            show_diagnostics: true,
        }
    }
}

/// Combined options for the full text-to-markdown pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub analysis: AnalysisOptions,
    pub format: FormatOptions,
}

impl CompileOptions {
    pub fn verbose() -> Self {
        Self {
            analysis: AnalysisOptions::default(),
            format: FormatOptions::verbose(),
        }
    }

    /// Parse options from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.analysis.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_presets() {
        let concise = FormatOptions::concise();
        assert_eq!(concise.indent_width, 2);
        assert!(!concise.show_types);

        let verbose = FormatOptions::verbose();
        assert_eq!(verbose.indent_width, 4);
        assert!(verbose.show_types);
        assert!(verbose.show_source);
    }

    #[test]
    fn test_validate_rejects_zero_budgets() {
        let options = AnalysisOptions { max_steps: 0, ..Default::default() };
        assert!(matches!(options.validate(), Err(BpgaError::InvalidOptions(_))));

        let options = AnalysisOptions { max_depth: 0, ..Default::default() };
        assert!(options.validate().is_err());

        assert!(AnalysisOptions::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let options = CompileOptions::from_json(r#"{ "analysis": { "max_steps": 50 } }"#).unwrap();
        assert_eq!(options.analysis.max_steps, 50);
        assert_eq!(options.analysis.max_depth, 64);
        assert_eq!(options.format, FormatOptions::concise());
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            CompileOptions::from_json(r#"{ "analysis": { "max_depth": 0 } }"#),
            Err(BpgaError::InvalidOptions(_))
        ));
        assert!(matches!(CompileOptions::from_json("{ nope"), Err(BpgaError::Json(_))));
    }
}
