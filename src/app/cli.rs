#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Chat,
    Send,
    History,
    Delete,
    Clear,
    Setup,
    Doctor,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "chat" => CliVerb::Chat,
        "send" => CliVerb::Send,
        "history" => CliVerb::History,
        "delete" => CliVerb::Delete,
        "clear" => CliVerb::Clear,
        "setup" => CliVerb::Setup,
        "doctor" => CliVerb::Doctor,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  chat                                 Open the interactive chat window".to_string(),
        "  send <message>                       Send one message and print the reply"
            .to_string(),
        "  history [--full]                     List saved chat messages".to_string(),
        "  delete <index>                       Delete one saved message".to_string(),
        "  clear                                Delete all saved messages".to_string(),
        "  setup                                Write a default config.yaml if missing"
            .to_string(),
        "  doctor                               Check config, credentials and chat history"
            .to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}

#[cfg(test)]
mod tests {
    use super::{help_text, parse_cli_verb, CliVerb};

    #[test]
    fn verbs_parse_and_unknown_falls_through() {
        assert_eq!(parse_cli_verb("chat"), CliVerb::Chat);
        assert_eq!(parse_cli_verb("send"), CliVerb::Send);
        assert_eq!(parse_cli_verb("--help"), CliVerb::Help);
        assert_eq!(parse_cli_verb("Chat"), CliVerb::Unknown);
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for verb in ["chat", "send", "history", "delete", "clear", "setup", "doctor"] {
            assert!(help.contains(&format!("  {verb}")), "missing {verb}");
        }
    }
}
