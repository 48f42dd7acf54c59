pub const KEY_AUTH_LOGIN: &str = "AUTH_LOGIN";
pub const KEY_AUTH_PASSWORD: &str = "AUTH_PASSWORD";
pub const KEY_RFC_PASSWORD: &str = "RFC_PASSWORD";

const API_KEY_PREFIX: &str = "API_KEY_";

/// Vault key holding the API key of `provider`, e.g. `API_KEY_OPENAI`.
pub fn api_key_env(provider: &str) -> String {
    format!("{API_KEY_PREFIX}{}", provider.trim().to_ascii_uppercase())
}

/// Inverse of [`api_key_env`]; yields the lowercase provider id.
pub fn provider_for_api_key_env(key: &str) -> Option<String> {
    key.strip_prefix(API_KEY_PREFIX)
        .filter(|provider| !provider.is_empty())
        .map(str::to_ascii_lowercase)
}

pub(crate) fn validate_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '-')
}
