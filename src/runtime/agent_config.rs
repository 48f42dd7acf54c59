use crate::provider::ModelProvider;
use crate::settings::SettingsRecord;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Knowledge folder always imported next to the configured one.
pub const DEFAULT_KNOWLEDGE_SUBDIR: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimits {
    pub requests: i64,
    pub input: i64,
    pub output: i64,
}

impl RateLimits {
    pub fn is_unlimited(&self) -> bool {
        self.requests == 0 && self.input == 0 && self.output == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub provider: String,
    pub name: String,
    pub temperature: f64,
    pub ctx_length: i64,
    /// Share of the context window given to history (chat) or input (utility).
    pub ctx_share: f64,
    pub limits: RateLimits,
    pub kwargs: BTreeMap<String, String>,
}

impl ModelConfig {
    fn from_settings(record: &SettingsRecord, prefix: &str, ctx_share_key: Option<&str>) -> Self {
        let key = |suffix: &str| format!("{prefix}_{suffix}");
        Self {
            provider: record.text(&key("provider")).to_string(),
            name: record.text(&key("name")).to_string(),
            temperature: record.float(&key("temperature")),
            ctx_length: record.integer(&key("ctx_length")),
            ctx_share: ctx_share_key
                .map(|suffix| record.float(&key(suffix)))
                .unwrap_or_default(),
            limits: RateLimits {
                requests: record.integer(&key("rl_requests")),
                input: record.integer(&key("rl_input")),
                output: record.integer(&key("rl_output")),
            },
            kwargs: record.map(&key("kwargs")),
        }
    }

    pub fn provider_kind(&self) -> Option<ModelProvider> {
        ModelProvider::try_from(self.provider.as_str()).ok()
    }
}

/// Configuration every worker runs with, built from one settings revision.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub revision: u64,
    pub chat_model: ModelConfig,
    pub utility_model: ModelConfig,
    pub embedding_model: ModelConfig,
    pub prompts_subdir: String,
    pub memory_subdir: String,
    pub knowledge_subdirs: Vec<String>,
    pub rfc_url: String,
    pub settings: Arc<SettingsRecord>,
}

impl AgentConfig {
    pub fn from_settings(settings: Arc<SettingsRecord>, revision: u64) -> Self {
        let record = settings.as_ref();
        let custom_knowledge = record.text("agent_knowledge_subdir");
        let mut knowledge_subdirs = vec![DEFAULT_KNOWLEDGE_SUBDIR.to_string()];
        if !custom_knowledge.is_empty() && custom_knowledge != DEFAULT_KNOWLEDGE_SUBDIR {
            knowledge_subdirs.push(custom_knowledge.to_string());
        }

        Self {
            revision,
            chat_model: ModelConfig::from_settings(record, "chat_model", Some("ctx_history")),
            utility_model: ModelConfig::from_settings(record, "util_model", Some("ctx_input")),
            embedding_model: ModelConfig::from_settings(record, "embed_model", None),
            prompts_subdir: record.text("agent_prompts_subdir").to_string(),
            memory_subdir: record.text("agent_memory_subdir").to_string(),
            knowledge_subdirs,
            rfc_url: record.text("rfc_url").to_string(),
            settings,
        }
    }
}
