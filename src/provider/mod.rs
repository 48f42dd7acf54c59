pub mod registry;

pub use registry::{BuiltinProviderRegistry, ProviderInfo, ProviderRegistry};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unknown provider `{0}`")]
    UnknownProvider(String),
}

/// Model providers the agents know how to talk to. The settings record stores
/// the upper-case [`ModelProvider::id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelProvider {
    Anthropic,
    DeepSeek,
    Google,
    Groq,
    HuggingFace,
    LmStudio,
    MistralAi,
    Ollama,
    OpenAi,
    OpenAiAzure,
    OpenRouter,
    Sambanova,
    Other,
}

impl ModelProvider {
    pub const ALL: [ModelProvider; 13] = [
        Self::Anthropic,
        Self::DeepSeek,
        Self::Google,
        Self::Groq,
        Self::HuggingFace,
        Self::LmStudio,
        Self::MistralAi,
        Self::Ollama,
        Self::OpenAi,
        Self::OpenAiAzure,
        Self::OpenRouter,
        Self::Sambanova,
        Self::Other,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC",
            Self::DeepSeek => "DEEPSEEK",
            Self::Google => "GOOGLE",
            Self::Groq => "GROQ",
            Self::HuggingFace => "HUGGINGFACE",
            Self::LmStudio => "LMSTUDIO",
            Self::MistralAi => "MISTRALAI",
            Self::Ollama => "OLLAMA",
            Self::OpenAi => "OPENAI",
            Self::OpenAiAzure => "OPENAI_AZURE",
            Self::OpenRouter => "OPENROUTER",
            Self::Sambanova => "SAMBANOVA",
            Self::Other => "OTHER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Anthropic => "Anthropic",
            Self::DeepSeek => "DeepSeek",
            Self::Google => "Google",
            Self::Groq => "Groq",
            Self::HuggingFace => "HuggingFace",
            Self::LmStudio => "LM Studio",
            Self::MistralAi => "Mistral AI",
            Self::Ollama => "Ollama",
            Self::OpenAi => "OpenAI",
            Self::OpenAiAzure => "OpenAI Azure",
            Self::OpenRouter => "OpenRouter",
            Self::Sambanova => "Sambanova",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl TryFrom<&str> for ModelProvider {
    type Error = ProviderError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let wanted = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|provider| provider.id() == wanted)
            .ok_or_else(|| ProviderError::UnknownProvider(value.to_string()))
    }
}
