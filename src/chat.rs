use crate::inference::{error_reply, InferenceError};
use crate::shared::logging::ChatLog;
use crate::transcript::{Transcript, TranscriptError, TranscriptStore, Turn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatContext {
    pub store: TranscriptStore,
    pub log: ChatLog,
}

impl ChatContext {
    pub fn new(store: TranscriptStore, log: ChatLog) -> Self {
        Self { store, log }
    }
}

/// Session state after a handler ran, plus storage problems the caller should
/// show but that did not stop the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    pub transcript: Transcript,
    pub warnings: Vec<String>,
}

impl ChatOutcome {
    fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

pub fn start_session(ctx: &ChatContext) -> ChatOutcome {
    let (transcript, load_error) = ctx.store.load_or_empty();
    let mut outcome = ChatOutcome::new(transcript);
    match load_error {
        Some(err) => {
            let warning = format!("could not load saved chats, starting empty: {err}");
            ctx.log.warn("store.load_failed", &err.to_string());
            outcome.warnings.push(warning);
        }
        None => ctx.log.info(
            "session.loaded",
            &format!(
                "path={} turns={}",
                ctx.store.path().display(),
                outcome.transcript.len()
            ),
        ),
    }
    outcome
}

pub fn record_user_turn(
    ctx: &ChatContext,
    transcript: &Transcript,
    prompt: &str,
) -> Result<ChatOutcome, ChatError> {
    if prompt.trim().is_empty() {
        return Err(ChatError::EmptyPrompt);
    }
    let mut outcome = ChatOutcome::new(transcript.clone());
    outcome.transcript.push(Turn::user(prompt));
    persist(ctx, &mut outcome);
    Ok(outcome)
}

/// Appends the model reply, or the placeholder text for a failed request, as
/// an assistant turn.
pub fn record_reply(
    ctx: &ChatContext,
    transcript: &Transcript,
    reply: Result<String, InferenceError>,
) -> ChatOutcome {
    let content = match reply {
        Ok(text) => text,
        Err(err) => {
            ctx.log.error("inference.failed", &err.to_string());
            error_reply(&err)
        }
    };
    let mut outcome = ChatOutcome::new(transcript.clone());
    outcome.transcript.push(Turn::assistant(content));
    persist(ctx, &mut outcome);
    ctx.log.info(
        "turn.completed",
        &format!("turns={}", outcome.transcript.len()),
    );
    outcome
}

/// One full turn: record the prompt, ask the model, record the reply.
pub fn submit_prompt<F>(
    ctx: &ChatContext,
    transcript: &Transcript,
    prompt: &str,
    complete: F,
) -> Result<ChatOutcome, ChatError>
where
    F: FnOnce(&Transcript) -> Result<String, InferenceError>,
{
    let with_prompt = record_user_turn(ctx, transcript, prompt)?;
    let reply = complete(&with_prompt.transcript);
    let mut outcome = record_reply(ctx, &with_prompt.transcript, reply);
    let mut warnings = with_prompt.warnings;
    warnings.append(&mut outcome.warnings);
    outcome.warnings = warnings;
    Ok(outcome)
}

pub fn delete_turn(
    ctx: &ChatContext,
    transcript: &Transcript,
    index: usize,
) -> Result<ChatOutcome, ChatError> {
    let mut outcome = ChatOutcome::new(transcript.clone());
    let removed = outcome.transcript.remove(index)?;
    persist(ctx, &mut outcome);
    ctx.log.info(
        "turn.deleted",
        &format!("index={index} role={}", removed.role()),
    );
    Ok(outcome)
}

pub fn clear_all(ctx: &ChatContext, transcript: &Transcript) -> ChatOutcome {
    let mut outcome = ChatOutcome::new(transcript.clone());
    outcome.transcript.clear();
    persist(ctx, &mut outcome);
    ctx.log.info(
        "transcript.cleared",
        &format!("removed_turns={}", transcript.len()),
    );
    outcome
}

fn persist(ctx: &ChatContext, outcome: &mut ChatOutcome) {
    if let Err(err) = ctx.store.save(&outcome.transcript) {
        ctx.log.warn("store.save_failed", &err.to_string());
        outcome
            .warnings
            .push(format!("chat history was not saved: {err}"));
    }
}
