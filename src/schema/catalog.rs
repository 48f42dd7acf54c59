use super::{FieldOption, FieldType, SettingsField, SettingsSection};
use crate::settings::{encode_kwargs, SettingsRecord};
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const API_KEY_FIELD_PREFIX: &str = "api_key_";

/// Providers with a credential field, in display order.
pub const CREDENTIAL_PROVIDERS: [(&str, &str); 8] = [
    ("openai", "OpenAI API Key"),
    ("anthropic", "Anthropic API Key"),
    ("groq", "Groq API Key"),
    ("google", "Google API Key"),
    ("openrouter", "OpenRouter API Key"),
    ("sambanova", "Sambanova API Key"),
    ("mistralai", "MistralAI API Key"),
    ("huggingface", "HuggingFace API Key"),
];

/// Everything the catalog shows that does not come from the record itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogOptions {
    pub providers: Vec<FieldOption>,
    pub prompts_subdirs: Vec<String>,
    pub memory_subdirs: Vec<String>,
    pub knowledge_subdirs: Vec<String>,
    /// Effective credential per provider id.
    pub credentials: BTreeMap<String, String>,
    pub auth_login: String,
    pub auth_password: String,
    pub rfc_password: String,
}

pub fn catalog(record: &SettingsRecord, options: &CatalogOptions) -> Vec<SettingsSection> {
    vec![
        agent_section(record, options),
        chat_model_section(record, options),
        util_model_section(record, options),
        embed_model_section(record, options),
        api_keys_section(options),
        auth_section(options),
        dev_section(record, options),
    ]
}

fn field(id: &str, title: &str, description: &str, field_type: FieldType, value: Value) -> SettingsField {
    SettingsField {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        field_type,
        value,
        min: None,
        max: None,
        step: None,
        options: None,
    }
}

fn text(record: &SettingsRecord, id: &str, title: &str, description: &str) -> SettingsField {
    field(id, title, description, FieldType::Text, json!(record.text(id)))
}

fn number(record: &SettingsRecord, id: &str, title: &str, description: &str) -> SettingsField {
    field(id, title, description, FieldType::Number, json!(record.integer(id)))
}

fn range(
    record: &SettingsRecord,
    id: &str,
    title: &str,
    description: &str,
    min: f64,
) -> SettingsField {
    SettingsField {
        min: Some(min),
        max: Some(1.0),
        step: Some(0.01),
        ..field(id, title, description, FieldType::Range, json!(record.float(id)))
    }
}

fn select(
    record: &SettingsRecord,
    id: &str,
    title: &str,
    description: &str,
    options: Vec<FieldOption>,
) -> SettingsField {
    SettingsField {
        options: Some(options),
        ..field(id, title, description, FieldType::Select, json!(record.text(id)))
    }
}

fn kwargs(record: &SettingsRecord, id: &str, title: &str) -> SettingsField {
    field(
        id,
        title,
        "Any other parameters supported by the model. Format is KEY=VALUE on individual lines, just like .env file.",
        FieldType::Textarea,
        json!(encode_kwargs(&record.map(id))),
    )
}

fn password(id: &str, title: &str, description: &str, value: &str) -> SettingsField {
    field(id, title, description, FieldType::Password, json!(value))
}

fn rate_limit(record: &SettingsRecord, id: &str, title: &str, what: &str, model: &str) -> SettingsField {
    number(
        record,
        id,
        title,
        &format!(
            "Limits the number of {what} per minute to the {model} model. Waits if the limit is exceeded. Set to 0 to disable rate limiting."
        ),
    )
}

fn subdir_options(names: &[String]) -> Vec<FieldOption> {
    names.iter().map(|name| FieldOption::same(name)).collect()
}

fn agent_section(record: &SettingsRecord, options: &CatalogOptions) -> SettingsSection {
    SettingsSection {
        title: "Agent Config".to_string(),
        description: "Agent parameters.".to_string(),
        fields: vec![
            select(
                record,
                "agent_prompts_subdir",
                "Prompts Subdirectory",
                "Subdirectory of /prompts folder to use for agent prompts. Used to adjust agent behaviour.",
                subdir_options(&options.prompts_subdirs),
            ),
            select(
                record,
                "agent_memory_subdir",
                "Memory Subdirectory",
                "Subdirectory of /memory folder to use for agent memory storage. Used to separate memory storage between different instances.",
                subdir_options(&options.memory_subdirs),
            ),
            select(
                record,
                "agent_knowledge_subdir",
                "Knowledge subdirectory",
                "Subdirectory of /knowledge folder to use for agent knowledge import. 'default' subfolder is always imported and contains framework knowledge.",
                subdir_options(&options.knowledge_subdirs),
            ),
        ],
    }
}

fn chat_model_section(record: &SettingsRecord, options: &CatalogOptions) -> SettingsSection {
    SettingsSection {
        title: "Chat Model".to_string(),
        description: "Selection and settings for main chat model used by the agents.".to_string(),
        fields: vec![
            select(
                record,
                "chat_model_provider",
                "Chat model provider",
                "Select provider for main chat model used by the agents",
                options.providers.clone(),
            ),
            text(
                record,
                "chat_model_name",
                "Chat model name",
                "Exact name of model from selected provider",
            ),
            range(
                record,
                "chat_model_temperature",
                "Chat model temperature",
                "Determines the randomness of generated responses. 0 is deterministic, 1 is random",
                0.0,
            ),
            number(
                record,
                "chat_model_ctx_length",
                "Chat model context length",
                "Maximum number of tokens in the context window for LLM. System prompt, chat history, RAG and response all count towards this limit.",
            ),
            range(
                record,
                "chat_model_ctx_history",
                "Context window space for chat history",
                "Portion of context window dedicated to chat history visible to the agent. The remaining space will be used for system prompt, RAG and response.",
                0.01,
            ),
            rate_limit(record, "chat_model_rl_requests", "Requests per minute limit", "requests", "chat"),
            rate_limit(record, "chat_model_rl_input", "Input tokens per minute limit", "input tokens", "chat"),
            rate_limit(record, "chat_model_rl_output", "Output tokens per minute limit", "output tokens", "chat"),
            kwargs(record, "chat_model_kwargs", "Chat model additional parameters"),
        ],
    }
}

fn util_model_section(record: &SettingsRecord, options: &CatalogOptions) -> SettingsSection {
    SettingsSection {
        title: "Utility model".to_string(),
        description: "Smaller, cheaper, faster model for handling utility tasks like organizing memory, preparing prompts, summarizing.".to_string(),
        fields: vec![
            select(
                record,
                "util_model_provider",
                "Utility model provider",
                "Select provider for utility model used by the framework",
                options.providers.clone(),
            ),
            text(
                record,
                "util_model_name",
                "Utility model name",
                "Exact name of model from selected provider",
            ),
            range(
                record,
                "util_model_temperature",
                "Utility model temperature",
                "Determines the randomness of generated responses. 0 is deterministic, 1 is random",
                0.0,
            ),
            rate_limit(record, "util_model_rl_requests", "Requests per minute limit", "requests", "utility"),
            rate_limit(record, "util_model_rl_input", "Input tokens per minute limit", "input tokens", "utility"),
            rate_limit(record, "util_model_rl_output", "Output tokens per minute limit", "output tokens", "utility"),
            kwargs(record, "util_model_kwargs", "Utility model additional parameters"),
        ],
    }
}

fn embed_model_section(record: &SettingsRecord, options: &CatalogOptions) -> SettingsSection {
    SettingsSection {
        title: "Embedding Model".to_string(),
        description: "Settings for the embedding model used by the agents.".to_string(),
        fields: vec![
            select(
                record,
                "embed_model_provider",
                "Embedding model provider",
                "Select provider for embedding model used by the framework",
                options.providers.clone(),
            ),
            text(
                record,
                "embed_model_name",
                "Embedding model name",
                "Exact name of model from selected provider",
            ),
            rate_limit(record, "embed_model_rl_requests", "Requests per minute limit", "requests", "embedding"),
            rate_limit(record, "embed_model_rl_input", "Input tokens per minute limit", "input tokens", "embedding"),
            kwargs(record, "embed_model_kwargs", "Embedding model additional parameters"),
        ],
    }
}

fn api_keys_section(options: &CatalogOptions) -> SettingsSection {
    SettingsSection {
        title: "API Keys".to_string(),
        description: "API keys for model providers and services used by the agents.".to_string(),
        fields: CREDENTIAL_PROVIDERS
            .iter()
            .map(|(provider, title)| {
                let value = options
                    .credentials
                    .get(*provider)
                    .map(String::as_str)
                    .unwrap_or_default();
                password(&format!("{API_KEY_FIELD_PREFIX}{provider}"), title, "", value)
            })
            .collect(),
    }
}

fn auth_section(options: &CatalogOptions) -> SettingsSection {
    SettingsSection {
        title: "Authentication".to_string(),
        description: "Settings for authentication to use the web UI.".to_string(),
        fields: vec![
            field("auth_login", "Login", "User name", FieldType::Text, json!(options.auth_login)),
            password("auth_password", "Password", "User password", &options.auth_password),
        ],
    }
}

fn dev_section(record: &SettingsRecord, options: &CatalogOptions) -> SettingsSection {
    SettingsSection {
        title: "Development".to_string(),
        description: "Parameters for framework development.".to_string(),
        fields: vec![
            text(
                record,
                "rfc_url",
                "RFC Destination URL",
                "URL for remote function calls. RFCs are used to call functions on another instance, so development can run natively while some functions are redirected to an instance in a container.",
            ),
            password(
                "rfc_password",
                "RFC Password",
                "Password for remote function calls. Passwords must match on both systems. RFCs can not be used with empty password.",
                &options.rfc_password,
            ),
        ],
    }
}
