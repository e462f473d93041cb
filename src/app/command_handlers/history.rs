use crate::app::command_support::{
    chat_context, load_settings, parse_index, state_paths, warning_lines,
};
use crate::chat::{clear_all, delete_turn, ChatContext};
use crate::transcript::Transcript;
use crate::tui::SIDEBAR_PREVIEW_CHARS;

fn open_context() -> Result<ChatContext, String> {
    let paths = state_paths()?;
    let settings = load_settings(&paths)?;
    Ok(chat_context(&paths, &settings))
}

/// Mutating commands refuse to run on an unreadable history so the file is
/// never replaced with an empty one by accident.
fn load_strict(ctx: &ChatContext) -> Result<Transcript, String> {
    ctx.store.load().map_err(|e| e.to_string())
}

pub fn cmd_history(args: &[String]) -> Result<String, String> {
    let full = match args {
        [] => false,
        [flag] if flag == "--full" => true,
        _ => return Err("usage: history [--full]".to_string()),
    };

    let ctx = open_context()?;
    let transcript = load_strict(&ctx)?;
    let mut lines = vec![
        format!("path={}", ctx.store.path().display()),
        format!("turns={}", transcript.len()),
    ];
    for (index, turn) in transcript.iter().enumerate() {
        let text = if full {
            turn.content().to_string()
        } else {
            turn.preview(SIDEBAR_PREVIEW_CHARS).replace('\n', " ")
        };
        lines.push(format!("[{index}] {}> {text}", turn.role().speaker()));
    }
    Ok(lines.join("\n"))
}

pub fn cmd_delete(args: &[String]) -> Result<String, String> {
    let [raw_index] = args else {
        return Err("usage: delete <index>".to_string());
    };
    let index = parse_index(raw_index)?;

    let ctx = open_context()?;
    let transcript = load_strict(&ctx)?;
    let outcome = delete_turn(&ctx, &transcript, index).map_err(|e| e.to_string())?;

    let mut lines = warning_lines(&outcome);
    lines.push(format!("deleted={index}"));
    lines.push(format!("turns={}", outcome.transcript.len()));
    Ok(lines.join("\n"))
}

pub fn cmd_clear(args: &[String]) -> Result<String, String> {
    if !args.is_empty() {
        return Err("usage: clear".to_string());
    }

    let ctx = open_context()?;
    let (transcript, load_error) = ctx.store.load_or_empty();
    let outcome = clear_all(&ctx, &transcript);

    let mut lines: Vec<String> = load_error
        .map(|err| format!("warning=saved chats were unreadable and are discarded: {err}"))
        .into_iter()
        .collect();
    lines.extend(warning_lines(&outcome));
    lines.push(format!("cleared={}", transcript.len()));
    lines.push(format!("turns={}", outcome.transcript.len()));
    Ok(lines.join("\n"))
}
