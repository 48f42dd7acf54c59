use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

fn parse_via_string<'de, D, T, F>(deserializer: D, kind: &str, parser: F) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    F: FnOnce(&str) -> Result<T, String>,
{
    let raw = String::deserialize(deserializer)?;
    parser(&raw).map_err(|err| D::Error::custom(format!("invalid {kind} `{raw}`: {err}")))
}

fn validate_identifier_value(kind: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{kind} must be non-empty"));
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Ok(());
    }
    Err(format!(
        "{kind} must use only ASCII letters, digits, '-' or '_'"
    ))
}

macro_rules! define_id_type {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, String> {
                validate_identifier_value($kind, raw)?;
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                parse_via_string(deserializer, $kind, Self::parse)
            }
        }
    };
}

define_id_type!(ContextId, "context id");
define_id_type!(WorkerId, "worker id");

impl WorkerId {
    /// Id of the agent at `depth` in a context's delegation chain:
    /// `main-agent0` is the root, `main-agent1` its first subordinate.
    pub fn for_chain(context: &ContextId, depth: usize) -> Self {
        Self(format!("{context}-agent{depth}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_ids_reject_path_like_values() {
        assert!(ContextId::parse("research_2").is_ok());
        assert_eq!(
            ContextId::parse("").expect_err("empty"),
            "context id must be non-empty"
        );
        assert!(ContextId::parse("../etc").is_err());
    }

    #[test]
    fn ids_deserialize_through_validation() {
        let id: ContextId = serde_yaml::from_str("main").expect("valid id");
        assert_eq!(WorkerId::for_chain(&id, 2).as_str(), "main-agent2");
        let err = serde_yaml::from_str::<ContextId>("bad id").expect_err("invalid id");
        assert!(err.to_string().contains("invalid context id `bad id`"));
    }
}
