use crate::app::command_support::{load_settings, state_paths};
use crate::config::Settings;
use crate::inference::InferenceClient;
use crate::transcript::TranscriptStore;

#[derive(Debug, Clone)]
struct DoctorFinding {
    id: String,
    ok: bool,
    detail: String,
    remediation: String,
}

fn doctor_finding(
    id: impl Into<String>,
    ok: bool,
    detail: impl Into<String>,
    remediation: impl Into<String>,
) -> DoctorFinding {
    DoctorFinding {
        id: id.into(),
        ok,
        detail: detail.into(),
        remediation: remediation.into(),
    }
}

fn credential_finding(settings: &Settings) -> DoctorFinding {
    let present = std::env::var(&settings.api_key_env)
        .ok()
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);
    doctor_finding(
        format!("env.{}", settings.api_key_env),
        present,
        "bearer key for the inference endpoint",
        format!("export {} before running `sugarchat chat`", settings.api_key_env),
    )
}

pub fn cmd_doctor() -> Result<String, String> {
    let paths = state_paths()?;
    let mut findings = Vec::new();

    let config_path = paths.settings_file();
    findings.push(doctor_finding(
        "config.path",
        true,
        format!(
            "config={} exists={}",
            config_path.display(),
            config_path.exists()
        ),
        "none",
    ));

    let settings = match load_settings(&paths) {
        Ok(settings) => {
            findings.push(doctor_finding(
                "config.parse",
                true,
                "settings parsed and validated",
                "none",
            ));
            Some(settings)
        }
        Err(err) => {
            findings.push(doctor_finding(
                "config.parse",
                false,
                format!("settings load failed: {err}"),
                "fix ~/.sugarchat/config.yaml or remove it to use defaults",
            ));
            None
        }
    };

    if let Some(settings) = settings.as_ref() {
        findings.push(credential_finding(settings));
        let client = InferenceClient::new(settings);
        findings.push(doctor_finding(
            "inference.endpoint",
            true,
            format!(
                "url={} timeout_secs={}",
                client.invoke_url(),
                client.timeout().as_secs()
            ),
            "none",
        ));

        let store = TranscriptStore::new(settings.resolve_transcript_path(&paths));
        findings.push(match store.load() {
            Ok(transcript) => doctor_finding(
                "history.load",
                true,
                format!("path={} turns={}", store.path().display(), transcript.len()),
                "none",
            ),
            Err(err) => doctor_finding(
                "history.load",
                false,
                err.to_string(),
                "repair or remove the chat history file, or run `sugarchat clear`",
            ),
        });
    }

    let failed = findings.iter().filter(|f| !f.ok).count();
    let summary = if failed == 0 { "healthy" } else { "unhealthy" };
    let mut lines = vec![
        format!("summary={summary}"),
        format!("checks_total={}", findings.len()),
        format!("checks_failed={failed}"),
    ];
    for finding in findings {
        lines.push(format!(
            "check:{}={}",
            finding.id,
            if finding.ok { "ok" } else { "fail" }
        ));
        lines.push(format!("check:{}.detail={}", finding.id, finding.detail));
        if !finding.ok {
            lines.push(format!(
                "check:{}.remediation={}",
                finding.id, finding.remediation
            ));
        }
    }
    Ok(lines.join("\n"))
}
