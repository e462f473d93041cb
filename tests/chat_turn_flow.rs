use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;
use sugarchat::chat::{clear_all, delete_turn, start_session, submit_prompt, ChatContext};
use sugarchat::config::Settings;
use sugarchat::inference::{is_error_reply, InferenceClient};
use sugarchat::shared::logging::ChatLog;
use sugarchat::transcript::{Role, Transcript, TranscriptStore, Turn};
use tempfile::tempdir;

fn spawn_reply_server(status_line: &str, response_body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let status_line = status_line.to_string();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read line");
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                if key.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).expect("read body");

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            response_body.len(),
            response_body
        );
        stream
            .write_all(response.as_bytes())
            .expect("write response");
    });

    format!("http://{addr}")
}

fn setup(dir: &std::path::Path, endpoint: &str, key_env: &str) -> (ChatContext, InferenceClient) {
    std::env::set_var(key_env, "test-bearer-key");
    let settings = Settings {
        endpoint: Some(endpoint.to_string()),
        api_key_env: key_env.to_string(),
        ..Settings::default()
    };
    let ctx = ChatContext::new(
        TranscriptStore::new(dir.join("chat_history.json")),
        ChatLog::new(dir.join("logs/chat.log")),
    );
    (ctx, InferenceClient::new(&settings))
}

#[test]
fn turn_against_live_endpoint_appends_user_and_assistant_and_persists() {
    let dir = tempdir().expect("tempdir");
    let url = spawn_reply_server(
        "200 OK",
        r#"{"output":{"message":{"content":[{"text":"Hi! I'm Sugar AI."}]}}}"#.to_string(),
    );
    let (ctx, client) = setup(dir.path(), &url, "SUGARCHAT_FLOW_KEY_OK");

    let session = start_session(&ctx);
    let outcome = submit_prompt(&ctx, &session.transcript, "hi", |t| client.try_complete(t))
        .expect("turn");

    assert_eq!(
        outcome.transcript.turns(),
        &[Turn::user("hi"), Turn::assistant("Hi! I'm Sugar AI.")]
    );
    let reopened = start_session(&ctx);
    assert_eq!(reopened.transcript, outcome.transcript);
}

#[test]
fn failed_inference_records_error_reply_after_existing_prompt() {
    let dir = tempdir().expect("tempdir");
    let url = spawn_reply_server("500 Internal Server Error", r#"{"message":"boom"}"#.to_string());
    let (ctx, client) = setup(dir.path(), &url, "SUGARCHAT_FLOW_KEY_FAIL");

    let outcome = submit_prompt(&ctx, &Transcript::new(), "hi", |t| client.try_complete(t))
        .expect("turn");

    let persisted = ctx.store.load().expect("load");
    assert_eq!(persisted, outcome.transcript);
    assert_eq!(persisted.len(), 2);
    assert_eq!(persisted.turns()[0], Turn::user("hi"));
    assert_eq!(persisted.turns()[1].role(), Role::Assistant);
    assert!(is_error_reply(persisted.turns()[1].content()));
    assert!(persisted.turns()[1].content().contains("500"));

    let log = fs::read_to_string(dir.path().join("logs/chat.log")).expect("read log");
    assert!(log.contains("\"event\":\"inference.failed\""));
}

#[test]
fn delete_then_clear_round_trip_through_storage() {
    let dir = tempdir().expect("tempdir");
    let ctx = ChatContext::new(
        TranscriptStore::new(dir.path().join("chat_history.json")),
        ChatLog::disabled(),
    );
    let seeded = Transcript::from_turns(vec![
        Turn::user("one"),
        Turn::assistant("two"),
        Turn::user("three"),
        Turn::assistant("four"),
    ]);
    ctx.store.save(&seeded).expect("seed");

    let session = start_session(&ctx);
    let deleted = delete_turn(&ctx, &session.transcript, 0).expect("delete");
    assert_eq!(deleted.transcript.len(), 3);
    assert_eq!(
        start_session(&ctx).transcript.turns(),
        &seeded.turns()[1..]
    );

    let cleared = clear_all(&ctx, &deleted.transcript);
    assert!(cleared.transcript.is_empty());
    assert_eq!(
        fs::read_to_string(ctx.store.path()).expect("read").trim(),
        "[]"
    );
}
