use crate::app::command_support::{chat_context, load_settings, state_paths, warning_lines};
use crate::chat::{start_session, submit_prompt};
use crate::inference::InferenceClient;
use crate::tui::run_chat_tui;

pub fn cmd_chat(args: &[String]) -> Result<String, String> {
    if !args.is_empty() {
        return Err("usage: chat".to_string());
    }

    let paths = state_paths()?;
    let settings = load_settings(&paths)?;
    let ctx = chat_context(&paths, &settings);
    let client = InferenceClient::new(&settings);
    let transcript = run_chat_tui(ctx, client)?;
    Ok(format!("chat ended\nturns={}", transcript.len()))
}

pub fn cmd_send(args: &[String]) -> Result<String, String> {
    let message = args.join(" ");
    if message.trim().is_empty() {
        return Err("usage: send <message>".to_string());
    }

    let paths = state_paths()?;
    let settings = load_settings(&paths)?;
    let ctx = chat_context(&paths, &settings);
    let client = InferenceClient::new(&settings);

    let session = start_session(&ctx);
    let outcome = submit_prompt(&ctx, &session.transcript, &message, |transcript| {
        client.try_complete(transcript)
    })
    .map_err(|e| e.to_string())?;

    let mut lines = warning_lines(&session);
    lines.extend(warning_lines(&outcome));
    lines.push(format!("turns={}", outcome.transcript.len()));
    let reply = outcome
        .transcript
        .last()
        .map(|turn| turn.content().to_string())
        .unwrap_or_default();
    lines.push(format!("assistant> {reply}"));
    Ok(lines.join("\n"))
}
