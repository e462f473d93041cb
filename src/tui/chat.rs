use crate::chat::{
    clear_all, delete_turn, record_reply, record_user_turn, start_session, ChatContext, ChatOutcome,
};
use crate::inference::{is_error_reply, InferenceClient, InferenceError};
use crate::transcript::{Role, Transcript};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

pub const CHAT_EXIT_COMMANDS: &[&str] = &["/exit", "exit", "quit"];
pub const SIDEBAR_PREVIEW_CHARS: usize = 45;
const CLEAR_COMMAND: &str = "/clear";
const DELETE_COMMAND: &str = "/delete";

const PROCESSING_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
const UI_POLL_INTERVAL: Duration = Duration::from_millis(60);
const SPINNER_TICK_INTERVAL: Duration = Duration::from_millis(120);
const CURSOR_BLINK_INTERVAL: Duration = Duration::from_millis(500);

pub fn is_chat_exit_command(message: &str) -> bool {
    CHAT_EXIT_COMMANDS
        .iter()
        .any(|command| message.eq_ignore_ascii_case(command))
}

struct PendingReply {
    started: Instant,
    result_rx: Receiver<Result<String, InferenceError>>,
}

struct TuiState {
    transcript: Transcript,
    notices: Vec<String>,
    selected: Option<usize>,
    input: String,
    pending: Option<PendingReply>,
    spinner_index: usize,
    last_spinner_tick: Instant,
    cursor_visible: bool,
    last_cursor_tick: Instant,
}

impl TuiState {
    fn new(outcome: ChatOutcome) -> Self {
        let mut state = Self {
            transcript: Transcript::new(),
            notices: Vec::new(),
            selected: None,
            input: String::new(),
            pending: None,
            spinner_index: 0,
            last_spinner_tick: Instant::now(),
            cursor_visible: true,
            last_cursor_tick: Instant::now(),
        };
        state.apply(outcome);
        state
    }

    /// Installs the state returned by a chat handler. Every mutation goes
    /// through here and the next loop iteration redraws from it.
    fn apply(&mut self, outcome: ChatOutcome) {
        self.transcript = outcome.transcript;
        self.notices.extend(outcome.warnings);
        self.selected = match (self.selected, self.transcript.len()) {
            (_, 0) => None,
            (Some(index), len) => Some(index.min(len - 1)),
            (None, _) => None,
        };
    }

    fn notice(&mut self, text: impl Into<String>) {
        self.notices.push(text.into());
    }

    fn select_previous(&mut self) {
        if self.transcript.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => 0,
            Some(index) => index - 1,
        });
    }

    fn select_next(&mut self) {
        let len = self.transcript.len();
        if len == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            None => len - 1,
            Some(index) => (index + 1).min(len - 1),
        });
    }

    fn spinner_frame(&self) -> &'static str {
        PROCESSING_FRAMES[self.spinner_index % PROCESSING_FRAMES.len()]
    }

    fn advance_spinner_if_needed(&mut self) {
        if self.pending.is_some() && self.last_spinner_tick.elapsed() >= SPINNER_TICK_INTERVAL {
            self.spinner_index = (self.spinner_index + 1) % PROCESSING_FRAMES.len();
            self.last_spinner_tick = Instant::now();
        }
    }

    fn advance_cursor_blink_if_needed(&mut self) {
        if self.last_cursor_tick.elapsed() >= CURSOR_BLINK_INTERVAL {
            self.cursor_visible = !self.cursor_visible;
            self.last_cursor_tick = Instant::now();
        }
    }

    fn cursor_suffix(&self) -> &'static str {
        if self.cursor_visible {
            "█"
        } else {
            " "
        }
    }

    fn status_line(&self) -> String {
        if let Some(pending) = &self.pending {
            return format!(
                "assistant> thinking {} ({}s)",
                self.spinner_frame(),
                pending.started.elapsed().as_secs()
            );
        }
        if let Some(notice) = self.notices.last() {
            return notice.clone();
        }
        "Enter sends; Up/Down select; Ctrl+D deletes selected; /clear clears all; /exit quits"
            .to_string()
    }

    fn sidebar_lines(&self) -> Vec<String> {
        self.transcript
            .iter()
            .enumerate()
            .map(|(index, turn)| {
                format!(
                    "{index:>3} {}> {}",
                    turn.role().speaker(),
                    turn.preview(SIDEBAR_PREVIEW_CHARS).replace('\n', " ")
                )
            })
            .collect()
    }
}

pub fn run_chat_tui(ctx: ChatContext, client: InferenceClient) -> Result<Transcript, String> {
    let mut state = TuiState::new(start_session(&ctx));
    let mut terminal = setup_terminal()?;

    let result = run_event_loop(&mut terminal, &ctx, &client, &mut state);
    if state.pending.is_some() {
        state.notice("waiting for the pending reply before exiting");
        if let Err(err) = draw_chat_ui(&mut terminal, &ctx, &client, &state) {
            state.notice(err);
        }
        finish_pending_reply(&ctx, &mut state);
    }
    teardown_terminal(&mut terminal)?;

    result.map(|_| state.transcript)
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ctx: &ChatContext,
    client: &InferenceClient,
    state: &mut TuiState,
) -> Result<(), String> {
    loop {
        state.advance_spinner_if_needed();
        state.advance_cursor_blink_if_needed();
        check_pending_reply(ctx, state);
        draw_chat_ui(terminal, ctx, client, state)?;

        if !event::poll(UI_POLL_INTERVAL).map_err(|e| format!("failed to poll events: {e}"))? {
            continue;
        }

        let Event::Key(key) = event::read().map_err(|e| format!("failed to read event: {e}"))?
        else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => break,
                KeyCode::Char('d') => {
                    if let Some(index) = state.selected {
                        delete_selected(ctx, state, index);
                    }
                    continue;
                }
                _ => continue,
            }
        }

        match key.code {
            KeyCode::Esc => break,
            KeyCode::Up => state.select_previous(),
            KeyCode::Down => state.select_next(),
            KeyCode::Enter => {
                let message = std::mem::take(&mut state.input);
                let command = message.trim();
                if command.is_empty() {
                    continue;
                }
                if is_chat_exit_command(command) {
                    break;
                }
                handle_submission(ctx, client, state, &message);
            }
            KeyCode::Backspace => {
                state.input.pop();
            }
            KeyCode::Char(c) => {
                state.input.push(c);
            }
            _ => {}
        }
    }

    Ok(())
}

fn handle_submission(
    ctx: &ChatContext,
    client: &InferenceClient,
    state: &mut TuiState,
    message: &str,
) {
    let command = message.trim();
    if command.eq_ignore_ascii_case(CLEAR_COMMAND) {
        if state.pending.is_some() {
            state.notice("wait for the current reply before clearing");
            return;
        }
        let outcome = clear_all(ctx, &state.transcript);
        state.apply(outcome);
        state.notice("all chats cleared");
        return;
    }

    if let Some(rest) = command.strip_prefix(DELETE_COMMAND) {
        match rest.trim().parse::<usize>() {
            Ok(index) => delete_selected(ctx, state, index),
            Err(_) => state.notice("usage: /delete <index>"),
        }
        return;
    }

    if state.pending.is_some() {
        state.notice("still processing previous request");
        return;
    }

    let outcome = match record_user_turn(ctx, &state.transcript, message) {
        Ok(outcome) => outcome,
        Err(err) => {
            state.notice(err.to_string());
            return;
        }
    };
    state.apply(outcome);

    let worker_client = client.clone();
    let worker_transcript = state.transcript.clone();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(worker_client.try_complete(&worker_transcript));
    });

    state.pending = Some(PendingReply {
        started: Instant::now(),
        result_rx: rx,
    });
    state.spinner_index = 0;
    state.last_spinner_tick = Instant::now();
    state.cursor_visible = true;
    state.last_cursor_tick = Instant::now();
}

fn delete_selected(ctx: &ChatContext, state: &mut TuiState, index: usize) {
    if state.pending.is_some() {
        state.notice("wait for the current reply before deleting");
        return;
    }
    match delete_turn(ctx, &state.transcript, index) {
        Ok(outcome) => {
            state.apply(outcome);
            state.notice(format!("deleted message {index}"));
        }
        Err(err) => state.notice(err.to_string()),
    }
}

fn check_pending_reply(ctx: &ChatContext, state: &mut TuiState) {
    let Some(pending) = state.pending.take() else {
        return;
    };

    let reply = match pending.result_rx.try_recv() {
        Ok(reply) => reply,
        Err(mpsc::TryRecvError::Empty) => {
            state.pending = Some(pending);
            return;
        }
        Err(mpsc::TryRecvError::Disconnected) => Err(InferenceError::WorkerStopped),
    };
    let outcome = record_reply(ctx, &state.transcript, reply);
    state.apply(outcome);
}

/// Blocks until the in-flight reply arrives and records it. The wait is
/// bounded by the client timeout.
fn finish_pending_reply(ctx: &ChatContext, state: &mut TuiState) {
    let Some(pending) = state.pending.take() else {
        return;
    };

    let reply = pending
        .result_rx
        .recv()
        .unwrap_or(Err(InferenceError::WorkerStopped));
    let outcome = record_reply(ctx, &state.transcript, reply);
    state.apply(outcome);
}

fn draw_chat_ui(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ctx: &ChatContext,
    client: &InferenceClient,
    state: &TuiState,
) -> Result<(), String> {
    terminal
        .draw(|frame| {
            let sections = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(4),
                    Constraint::Min(8),
                    Constraint::Length(3),
                    Constraint::Length(3),
                ])
                .split(frame.area());

            let header = Paragraph::new(vec![
                Line::styled(
                    "Sugar AI Assistant",
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
                Line::raw(format!("model={}", client.model_id())),
                Line::raw(format!("history={}", ctx.store.path().display())),
            ])
            .block(
                Block::default()
                    .title("Session")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
            frame.render_widget(header, sections[0]);

            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
                .split(sections[1]);

            let history_items = if state.transcript.is_empty() {
                vec![ListItem::new(Line::styled(
                    "No chats yet",
                    Style::default().fg(Color::Gray),
                ))]
            } else {
                state
                    .sidebar_lines()
                    .into_iter()
                    .enumerate()
                    .map(|(index, line)| {
                        let item = ListItem::new(Line::raw(line));
                        if state.selected == Some(index) {
                            item.style(
                                Style::default()
                                    .fg(Color::Yellow)
                                    .add_modifier(Modifier::BOLD),
                            )
                        } else {
                            item
                        }
                    })
                    .collect()
            };
            frame.render_widget(
                List::new(history_items)
                    .block(Block::default().title("Chat History").borders(Borders::ALL)),
                body[0],
            );

            let mut lines = Vec::new();
            for turn in &state.transcript {
                let style = match turn.role() {
                    Role::User => Style::default().fg(Color::Yellow),
                    Role::Assistant if is_error_reply(turn.content()) => {
                        Style::default().fg(Color::Red)
                    }
                    Role::Assistant => Style::default().fg(Color::Green),
                };
                let mut content = turn.content().lines();
                let first = content.next().unwrap_or_default();
                lines.push(Line::styled(
                    format!("{}> {first}", turn.role().speaker()),
                    style,
                ));
                for rest in content {
                    lines.push(Line::styled(rest.to_string(), style));
                }
            }
            for notice in &state.notices {
                lines.push(Line::styled(
                    format!("system> {notice}"),
                    Style::default().fg(Color::Gray),
                ));
            }
            let visible = body[1].height.saturating_sub(2) as usize;
            let scroll = lines.len().saturating_sub(visible) as u16;
            let transcript_widget = Paragraph::new(lines)
                .block(Block::default().title("Transcript").borders(Borders::ALL))
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0));
            frame.render_widget(transcript_widget, body[1]);

            let status_widget = Paragraph::new(state.status_line()).block(
                Block::default()
                    .title("Status")
                    .borders(Borders::ALL)
                    .border_style(if state.pending.is_some() {
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    }),
            );
            frame.render_widget(status_widget, sections[2]);

            let input_widget =
                Paragraph::new(format!("you> {}{}", state.input, state.cursor_suffix()))
                    .block(Block::default().title("Ask Sugar AI").borders(Borders::ALL));
            frame.render_widget(input_widget, sections[3]);
        })
        .map_err(|e| format!("failed to render chat UI: {e}"))?;

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, String> {
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)
        .map_err(|e| format!("failed to enter alternate screen: {e}"))?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| format!("failed to initialize terminal: {e}"))
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), String> {
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)
        .map_err(|e| format!("failed to leave alternate screen: {e}"))?;
    terminal
        .show_cursor()
        .map_err(|e| format!("failed to restore cursor: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        check_pending_reply, finish_pending_reply, is_chat_exit_command, PendingReply, TuiState,
        CURSOR_BLINK_INTERVAL, PROCESSING_FRAMES,
    };
    use crate::chat::{ChatContext, ChatOutcome};
    use crate::inference::{is_error_reply, InferenceError};
    use crate::shared::logging::ChatLog;
    use crate::transcript::{Role, Transcript, TranscriptStore, Turn};
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn context(dir: &std::path::Path) -> ChatContext {
        ChatContext::new(
            TranscriptStore::new(dir.join("chat_history.json")),
            ChatLog::disabled(),
        )
    }

    fn outcome(turns: Vec<Turn>) -> ChatOutcome {
        ChatOutcome {
            transcript: Transcript::from_turns(turns),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn chat_exit_commands_are_case_insensitive() {
        assert!(is_chat_exit_command("/exit"));
        assert!(is_chat_exit_command("EXIT"));
        assert!(is_chat_exit_command("Quit"));
        assert!(!is_chat_exit_command("/clear"));
    }

    #[test]
    fn spinner_frame_cycles_across_ascii_frames() {
        let mut state = TuiState::new(outcome(Vec::new()));
        for (index, frame) in PROCESSING_FRAMES.iter().enumerate() {
            state.spinner_index = index;
            assert_eq!(state.spinner_frame(), *frame);
        }
    }

    #[test]
    fn cursor_blink_toggles_visibility_after_interval() {
        let mut state = TuiState::new(outcome(Vec::new()));
        assert_eq!(state.cursor_suffix(), "█");

        state.last_cursor_tick = Instant::now() - CURSOR_BLINK_INTERVAL;
        state.advance_cursor_blink_if_needed();
        assert_eq!(state.cursor_suffix(), " ");
    }

    #[test]
    fn selection_moves_within_bounds_and_clamps_after_shrink() {
        let mut state = TuiState::new(outcome(vec![
            Turn::user("a"),
            Turn::assistant("b"),
            Turn::user("c"),
        ]));
        state.select_previous();
        assert_eq!(state.selected, Some(0));
        state.select_next();
        state.select_next();
        state.select_next();
        assert_eq!(state.selected, Some(2));

        state.apply(outcome(vec![Turn::user("a")]));
        assert_eq!(state.selected, Some(0));

        state.apply(outcome(Vec::new()));
        assert_eq!(state.selected, None);
    }

    #[test]
    fn sidebar_shows_index_speaker_and_short_preview() {
        let long = "x".repeat(80);
        let state = TuiState::new(outcome(vec![
            Turn::user("line one\nline two"),
            Turn::assistant(long.clone()),
        ]));
        let lines = state.sidebar_lines();
        assert_eq!(lines[0], "  0 you> line one line two");
        assert_eq!(lines[1], format!("  1 assistant> {}", &long[..45]));
    }

    #[test]
    fn handler_warnings_surface_in_status_line() {
        let state = TuiState::new(ChatOutcome {
            transcript: Transcript::new(),
            warnings: vec!["chat history was not saved: disk full".to_string()],
        });
        assert_eq!(state.status_line(), "chat history was not saved: disk full");
    }

    #[test]
    fn finished_worker_reply_is_recorded_and_persisted() {
        let dir = tempdir().expect("tempdir");
        let ctx = context(dir.path());
        let mut state = TuiState::new(outcome(vec![Turn::user("hi")]));
        let (tx, rx) = mpsc::channel();
        tx.send(Ok("hello".to_string())).expect("send");
        state.pending = Some(PendingReply {
            started: Instant::now(),
            result_rx: rx,
        });

        check_pending_reply(&ctx, &mut state);
        assert!(state.pending.is_none());
        assert_eq!(
            state.transcript.turns(),
            &[Turn::user("hi"), Turn::assistant("hello")]
        );
        assert_eq!(ctx.store.load().expect("load"), state.transcript);
    }

    #[test]
    fn exiting_with_reply_in_flight_waits_and_records_it() {
        let dir = tempdir().expect("tempdir");
        let ctx = context(dir.path());
        let mut state = TuiState::new(outcome(vec![Turn::user("hi")]));
        let (tx, rx) = mpsc::channel();
        state.pending = Some(PendingReply {
            started: Instant::now(),
            result_rx: rx,
        });
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            tx.send(Ok("late hello".to_string())).expect("send");
        });

        check_pending_reply(&ctx, &mut state);
        assert!(state.pending.is_some());

        finish_pending_reply(&ctx, &mut state);
        worker.join().expect("worker");
        assert!(state.pending.is_none());
        assert_eq!(
            state.transcript.turns(),
            &[Turn::user("hi"), Turn::assistant("late hello")]
        );
        assert_eq!(ctx.store.load().expect("load"), state.transcript);
    }

    #[test]
    fn stopped_worker_is_recorded_as_error_reply() {
        let dir = tempdir().expect("tempdir");
        let ctx = context(dir.path());
        let mut state = TuiState::new(outcome(vec![Turn::user("hi")]));
        let (tx, rx) = mpsc::channel::<Result<String, InferenceError>>();
        drop(tx);
        state.pending = Some(PendingReply {
            started: Instant::now(),
            result_rx: rx,
        });

        finish_pending_reply(&ctx, &mut state);
        let turns = state.transcript.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].role(), Role::Assistant);
        assert!(is_error_reply(turns[1].content()));
        assert!(turns[1].content().contains("worker stopped"));
        assert_eq!(ctx.store.load().expect("load"), state.transcript);
    }
}
