//! Instruction templates sent to the text-generation backend.
//!
//! Templates are versioned text resources with named `{slot}` placeholders.
//! Rendering is a single left-to-right pass, so substituted values (user
//! prompts, repository digests) are never themselves scanned for slots.
//!
//! Layout slots (`columns`, `min_dx`, `layout_rules`, ...) and the shared
//! `shape_types` block resolve automatically from `shapes::layout`; callers
//! only supply request-specific slots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::shapes::layout;

#[derive(Debug)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub version: &'static str,
    body: &'static str,
    slots: &'static [&'static str],
}

pub const LABEL: PromptTemplate = PromptTemplate {
    name: "analyze_label",
    version: "1",
    body: include_str!("templates/analyze_label.txt"),
    slots: &[],
};

pub const CLEANUP: PromptTemplate = PromptTemplate {
    name: "analyze_cleanup",
    version: "1",
    body: include_str!("templates/analyze_cleanup.txt"),
    slots: &[],
};

pub const SUGGEST: PromptTemplate = PromptTemplate {
    name: "analyze_suggest",
    version: "1",
    body: include_str!("templates/analyze_suggest.txt"),
    slots: &[],
};

pub const EXPLAIN: PromptTemplate = PromptTemplate {
    name: "analyze_explain",
    version: "1",
    body: include_str!("templates/analyze_explain.txt"),
    slots: &[],
};

pub const OPTIMIZE: PromptTemplate = PromptTemplate {
    name: "analyze_optimize",
    version: "1",
    body: include_str!("templates/analyze_optimize.txt"),
    slots: &[],
};

pub const SHAPE_TYPES: PromptTemplate = PromptTemplate {
    name: "shape_types",
    version: "1",
    body: include_str!("templates/shape_types.txt"),
    slots: &[],
};

pub const LAYOUT_RULES: PromptTemplate = PromptTemplate {
    name: "layout_rules",
    version: "2",
    body: include_str!("templates/layout_rules.txt"),
    slots: &["min_dx", "min_dy", "columns", "rows", "box_w", "box_h", "title_y"],
};

pub const GENERATE: PromptTemplate = PromptTemplate {
    name: "generate",
    version: "2",
    body: include_str!("templates/generate.txt"),
    slots: &["shape_types", "layout_rules", "user_prompt"],
};

pub const GENERATE_WITH_CONTEXT: PromptTemplate = PromptTemplate {
    name: "generate_with_context",
    version: "2",
    body: include_str!("templates/generate_with_context.txt"),
    slots: &[
        "user_prompt",
        "existing_shapes",
        "next_id",
        "min_dx",
        "min_dy",
        "columns",
        "rows",
        "overflow_columns",
        "overflow_rows",
        "shape_types",
        "layout_rules",
    ],
};

pub const TRANSFORM: PromptTemplate = PromptTemplate {
    name: "transform",
    version: "2",
    body: include_str!("templates/transform.txt"),
    slots: &["shape_types", "layout_rules"],
};

pub const REPOSITORY_ARCHITECTURE: PromptTemplate = PromptTemplate {
    name: "repository_architecture",
    version: "2",
    body: include_str!("templates/repository_architecture.txt"),
    slots: &["columns", "rows", "box_w", "box_h", "repo_context", "shape_types", "layout_rules"],
};

impl PromptTemplate {
    /// Renders the template, taking request slots from `values` and layout
    /// slots from the canonical constants.
    ///
    /// Fails when a declared slot has no value.
    pub fn render(&self, values: &[(&str, &str)]) -> Result<String> {
        let mut out = String::with_capacity(self.body.len());
        let mut rest = self.body;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let slot = after
                .find('}')
                .map(|close| &after[..close])
                .filter(|name| self.slots.contains(name));

            match slot {
                Some(name) => {
                    out.push_str(&self.value_for(name, values)?);
                    rest = &after[name.len() + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);

        Ok(out.trim_end().to_string())
    }

    fn value_for(&self, slot: &str, values: &[(&str, &str)]) -> Result<String> {
        if let Some((_, value)) = values.iter().find(|(name, _)| *name == slot) {
            return Ok((*value).to_string());
        }
        shared_value(slot)?.ok_or_else(|| {
            AppError::Internal(format!("Prompt {} v{} is missing slot {}", self.name, self.version, slot))
        })
    }
}

fn shared_value(slot: &str) -> Result<Option<String>> {
    let value = match slot {
        "shape_types" => SHAPE_TYPES.render(&[])?,
        "layout_rules" => LAYOUT_RULES.render(&[])?,
        "columns" => layout::columns_text(),
        "rows" => layout::rows_text(),
        "overflow_columns" => layout::overflow_columns_text(),
        "overflow_rows" => layout::overflow_rows_text(),
        "min_dx" => layout::MIN_HORIZONTAL_GAP.to_string(),
        "min_dy" => layout::MIN_VERTICAL_GAP.to_string(),
        "box_w" => layout::BOX_WIDTH.to_string(),
        "box_h" => layout::BOX_HEIGHT.to_string(),
        "title_y" => layout::TITLE_Y.to_string(),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

/// Image analysis modes, one template each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Label,
    Cleanup,
    Suggest,
    Explain,
    Optimize,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 5] = [
        AnalysisMode::Label,
        AnalysisMode::Cleanup,
        AnalysisMode::Suggest,
        AnalysisMode::Explain,
        AnalysisMode::Optimize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Label => "label",
            AnalysisMode::Cleanup => "cleanup",
            AnalysisMode::Suggest => "suggest",
            AnalysisMode::Explain => "explain",
            AnalysisMode::Optimize => "optimize",
        }
    }

    pub fn template(&self) -> &'static PromptTemplate {
        match self {
            AnalysisMode::Label => &LABEL,
            AnalysisMode::Cleanup => &CLEANUP,
            AnalysisMode::Suggest => &SUGGEST,
            AnalysisMode::Explain => &EXPLAIN,
            AnalysisMode::Optimize => &OPTIMIZE,
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                AppError::InvalidInput(format!("Invalid mode: {}. Must be one of {}", s, valid.join(", ")))
            })
    }
}
