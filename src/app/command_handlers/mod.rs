use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod chat;
pub mod doctor;
pub mod history;
pub mod setup;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Chat => chat::cmd_chat(&args[1..]),
        CliVerb::Send => chat::cmd_send(&args[1..]),
        CliVerb::History => history::cmd_history(&args[1..]),
        CliVerb::Delete => history::cmd_delete(&args[1..]),
        CliVerb::Clear => history::cmd_clear(&args[1..]),
        CliVerb::Setup => setup::cmd_setup(),
        CliVerb::Doctor => doctor::cmd_doctor(),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
