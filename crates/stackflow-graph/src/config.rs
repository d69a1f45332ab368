//! Per-kind node configuration.
//!
//! Each known node kind carries its own strongly-typed configuration
//! struct; unknown kinds fall back to an open JSON map so that graphs
//! produced by newer versions still load. Every field defaults on read,
//! which means a persisted config may omit any subset of its keys.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::node::NodeKind;

/// Default query placeholder for user query nodes.
pub const DEFAULT_PLACEHOLDER: &str = "Write your query here.";

/// Default system prompt for LLM engine nodes.
pub const DEFAULT_PROMPT: &str = "You are a helpful AI assistant.";

/// Default sampling temperature for LLM engine nodes.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Configuration for a workflow node, keyed by its kind.
///
/// Known variants carry exactly the fields of their schema; a patch
/// containing keys outside the schema drops those keys rather than
/// storing them. Serialization is a flat JSON object in every case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeConfig {
    /// Configuration for a `userQuery` node.
    UserQuery(UserQueryConfig),
    /// Configuration for a `knowledgeBase` node.
    KnowledgeBase(KnowledgeBaseConfig),
    /// Configuration for an `llmEngine` node.
    LlmEngine(LlmEngineConfig),
    /// Configuration for an `output` node.
    Output(OutputConfig),
    /// Opaque configuration for an unknown node kind.
    Other(Map<String, Value>),
}

impl NodeConfig {
    /// Returns the canonical default configuration for a node kind.
    ///
    /// Total and pure: unknown kinds yield an empty map, never an error.
    pub fn default_for(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::UserQuery => Self::UserQuery(UserQueryConfig::default()),
            NodeKind::KnowledgeBase => Self::KnowledgeBase(KnowledgeBaseConfig::default()),
            NodeKind::LlmEngine => Self::LlmEngine(LlmEngineConfig::default()),
            NodeKind::Output => Self::Output(OutputConfig::default()),
            NodeKind::Other(_) => Self::Other(Map::new()),
        }
    }

    /// Builds a configuration for a node kind from a JSON object.
    ///
    /// Keys absent from the object default; keys outside the kind's
    /// schema are dropped. Fails only when a present value has a type the
    /// schema cannot coerce.
    pub fn from_map(kind: &NodeKind, map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let value = Value::Object(map);
        Ok(match kind {
            NodeKind::UserQuery => Self::UserQuery(serde_json::from_value(value)?),
            NodeKind::KnowledgeBase => Self::KnowledgeBase(serde_json::from_value(value)?),
            NodeKind::LlmEngine => Self::LlmEngine(serde_json::from_value(value)?),
            NodeKind::Output => Self::Output(serde_json::from_value(value)?),
            NodeKind::Other(_) => match value {
                Value::Object(map) => Self::Other(map),
                _ => Self::Other(Map::new()),
            },
        })
    }

    /// Returns this configuration as a JSON object.
    pub fn to_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Shallow-merges a patch into this configuration.
    ///
    /// Keys present in the patch overwrite existing values, untouched keys
    /// are retained. On failure the configuration is left unchanged.
    pub fn apply_patch(&mut self, patch: Map<String, Value>) -> Result<(), serde_json::Error> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut merged = self.to_map()?;
        for (key, value) in patch {
            merged.insert(key, value);
        }
        let kind = self.schema_kind();
        *self = Self::from_map(&kind, merged)?;
        Ok(())
    }

    /// Returns the attached file names of a knowledge base configuration.
    pub fn files(&self) -> Option<&[String]> {
        match self {
            Self::KnowledgeBase(config) => Some(&config.files),
            _ => None,
        }
    }

    /// Appends a file name to a knowledge base configuration.
    ///
    /// Preserves previously attached files and their order; duplicates are
    /// not filtered here. Returns `false` for any other variant.
    pub fn push_file(&mut self, name: impl Into<String>) -> bool {
        match self {
            Self::KnowledgeBase(config) => {
                config.files.push(name.into());
                true
            }
            _ => false,
        }
    }

    fn schema_kind(&self) -> NodeKind {
        match self {
            Self::UserQuery(_) => NodeKind::UserQuery,
            Self::KnowledgeBase(_) => NodeKind::KnowledgeBase,
            Self::LlmEngine(_) => NodeKind::LlmEngine,
            Self::Output(_) => NodeKind::Output,
            Self::Other(_) => NodeKind::Other(String::new()),
        }
    }
}

/// Configuration for a user query node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserQueryConfig {
    /// Placeholder text shown in the query input.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for UserQueryConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
        }
    }
}

/// Configuration for a knowledge base node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Embedding model provider.
    #[serde(default = "default_provider")]
    pub embedding_model: String,
    /// API key for the embedding provider.
    #[serde(default)]
    pub api_key: String,
    /// Display names of attached documents, in upload order.
    #[serde(default)]
    pub files: Vec<String>,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_provider(),
            api_key: String::new(),
            files: Vec::new(),
        }
    }
}

/// Configuration for an LLM engine node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmEngineConfig {
    /// Language model provider.
    #[serde(default = "default_provider")]
    pub model: String,
    /// API key for the model provider.
    #[serde(default)]
    pub api_key: String,
    /// System prompt for the model.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Sampling temperature, clamped into `[0.0, 1.0]` on read.
    #[serde(default = "default_temperature", deserialize_with = "clamp_unit")]
    pub temperature: f64,
    /// Whether web search augmentation is enabled.
    #[serde(default)]
    pub use_web_search: bool,
    /// SerpAPI key used when web search is enabled.
    #[serde(default)]
    pub serpapi_key: String,
}

impl Default for LlmEngineConfig {
    fn default() -> Self {
        Self {
            model: default_provider(),
            api_key: String::new(),
            prompt: default_prompt(),
            temperature: DEFAULT_TEMPERATURE,
            use_web_search: false,
            serpapi_key: String::new(),
        }
    }
}

/// Configuration for an output node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output rendering format.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_owned()
}

fn default_provider() -> String {
    "openai".to_owned()
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_owned()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_format() -> String {
    "text".to_owned()
}

/// Clamps an out-of-range numeric value into `[0.0, 1.0]` instead of
/// rejecting it.
fn clamp_unit<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.clamp(0.0, 1.0))
}
