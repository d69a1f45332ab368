//! Field schemas that drive the configuration editing surface.
//!
//! Purely descriptive: the editing panel renders whatever `fields_for`
//! returns, and the descriptors stay in lockstep with the registry
//! defaults (every default key has exactly one descriptor and vice
//! versa — see the lockstep test below).

use serde::Serialize;

use crate::node::NodeKind;

/// Inclusive bounds for the LLM sampling temperature.
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 1.0);

/// Slider step for the LLM sampling temperature.
pub const TEMPERATURE_STEP: f64 = 0.1;

/// The widget kind used to edit a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Masked text input.
    Password,
    /// Fixed-option dropdown.
    Select {
        /// Allowed values, in display order.
        options: &'static [&'static str],
    },
    /// Multi-line text input.
    Textarea,
    /// Bounded numeric slider. Out-of-range external input is clamped,
    /// never rejected.
    Slider {
        /// Lower bound, inclusive.
        min: f64,
        /// Upper bound, inclusive.
        max: f64,
        /// Slider step.
        step: f64,
    },
    /// Boolean toggle.
    Checkbox,
    /// Read-mostly list of attached file names.
    FileList,
}

/// Descriptor for a single configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Config key this field edits.
    pub name: &'static str,
    /// Widget kind and constraints.
    #[serde(flatten)]
    pub kind: FieldKind,
}

static USER_QUERY_FIELDS: [FieldSpec; 1] = [FieldSpec {
    name: "placeholder",
    kind: FieldKind::Text,
}];

static KNOWLEDGE_BASE_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        name: "embedding_model",
        kind: FieldKind::Select {
            options: &["openai", "gemini"],
        },
    },
    FieldSpec {
        name: "api_key",
        kind: FieldKind::Password,
    },
    FieldSpec {
        name: "files",
        kind: FieldKind::FileList,
    },
];

static LLM_ENGINE_FIELDS: [FieldSpec; 6] = [
    FieldSpec {
        name: "model",
        kind: FieldKind::Select {
            options: &["openai", "gemini"],
        },
    },
    FieldSpec {
        name: "api_key",
        kind: FieldKind::Password,
    },
    FieldSpec {
        name: "prompt",
        kind: FieldKind::Textarea,
    },
    FieldSpec {
        name: "temperature",
        kind: FieldKind::Slider {
            min: TEMPERATURE_RANGE.0,
            max: TEMPERATURE_RANGE.1,
            step: TEMPERATURE_STEP,
        },
    },
    FieldSpec {
        name: "use_web_search",
        kind: FieldKind::Checkbox,
    },
    FieldSpec {
        name: "serpapi_key",
        kind: FieldKind::Password,
    },
];

static OUTPUT_FIELDS: [FieldSpec; 1] = [FieldSpec {
    name: "format",
    kind: FieldKind::Select {
        options: &["text", "markdown", "html"],
    },
}];

/// Returns the ordered field descriptors for a node kind.
///
/// Unknown kinds carry no editable fields.
pub fn fields_for(kind: &NodeKind) -> &'static [FieldSpec] {
    match kind {
        NodeKind::UserQuery => &USER_QUERY_FIELDS,
        NodeKind::KnowledgeBase => &KNOWLEDGE_BASE_FIELDS,
        NodeKind::LlmEngine => &LLM_ENGINE_FIELDS,
        NodeKind::Output => &OUTPUT_FIELDS,
        NodeKind::Other(_) => &[],
    }
}
