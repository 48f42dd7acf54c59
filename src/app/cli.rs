#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Settings,
    Vault,
    Status,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "settings" => CliVerb::Settings,
        "vault" => CliVerb::Vault,
        "status" => CliVerb::Status,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  settings show                        List current settings (secrets masked)"
            .to_string(),
        "  settings get <key>                   Print one setting".to_string(),
        "  settings set <key> <value>           Change one setting and propagate it".to_string(),
        "  settings form                        Print the settings form as JSON".to_string(),
        "  settings apply <file>                Apply an edited settings form JSON file"
            .to_string(),
        "  vault set <KEY> <value>              Store a secret in the vault".to_string(),
        "  vault unset <KEY>                    Remove a secret from the vault".to_string(),
        "  status                               Show state paths and live workers".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
