//! Optional speech input/output through platform commands.
//!
//! Neither capability is required: detection probes PATH at startup, and a
//! missing command just disables the corresponding control. Text-to-speech
//! pipes markup-stripped reply text to a system synthesizer; speech-to-text
//! runs a transcriber command and uses its stdout as the submitted message.

use anyhow::{anyhow, Result};
use std::ffi::OsStr;

use crate::config::Config;
use crate::markup;

const TTS_CANDIDATES: &[&str] = &["say", "espeak-ng", "espeak", "spd-say"];
const STT_CANDIDATES: &[&str] = &["hear"];

fn find_in_path(program: impl AsRef<OsStr>) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(program.as_ref()).is_file())
}

/// Split a configured command string into program + arguments.
fn parse_command(command: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

fn detect(override_command: Option<&str>, candidates: &[&str]) -> Option<(String, Vec<String>)> {
    if let Some(command) = override_command {
        let (program, args) = parse_command(command)?;
        if find_in_path(&program) {
            return Some((program, args));
        }
        tracing::warn!(program, "configured speech command not found in PATH");
        return None;
    }
    candidates
        .iter()
        .find(|program| find_in_path(program))
        .map(|program| (program.to_string(), Vec::new()))
}

/// Speaks assistant replies through a system synthesizer command.
#[derive(Clone)]
pub struct Synthesizer {
    program: String,
    args: Vec<String>,
}

impl Synthesizer {
    pub fn detect(config: &Config) -> Option<Self> {
        let (program, args) = detect(config.tts_command.as_deref(), TTS_CANDIDATES)?;
        tracing::info!(program, "text-to-speech enabled");
        Some(Self { program, args })
    }

    /// Fire-and-forget: spawn the synthesizer with the stripped reply text.
    pub fn speak(&self, reply_markup: &str) {
        let text = markup::strip_markup(reply_markup);
        if text.is_empty() {
            return;
        }
        let result = std::process::Command::new(&self.program)
            .args(&self.args)
            .arg(&text)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn();
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to start speech synthesizer");
        }
    }
}

/// Captures one spoken message through a transcriber command.
#[derive(Clone)]
pub struct Recognizer {
    program: String,
    args: Vec<String>,
}

impl Recognizer {
    pub fn detect(config: &Config) -> Option<Self> {
        let (program, args) = detect(config.stt_command.as_deref(), STT_CANDIDATES)?;
        tracing::info!(program, "speech-to-text enabled");
        Some(Self { program, args })
    }

    /// Run the transcriber to completion and return the final transcript.
    pub async fn listen(&self) -> Result<String> {
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .output()
            .await?;

        if !output.status.success() {
            return Err(anyhow!("transcriber exited with {}", output.status));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn command(&self) -> (String, Vec<String>) {
        (self.program.clone(), self.args.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_splits_program_and_args() {
        let (program, args) = parse_command("whisper-cli --model base").unwrap();
        assert_eq!(program, "whisper-cli");
        assert_eq!(args, vec!["--model", "base"]);
        assert!(parse_command("   ").is_none());
    }

    #[test]
    fn find_in_path_locates_common_binaries() {
        // sh is present on every platform we run tests on
        assert!(find_in_path("sh"));
        assert!(!find_in_path("definitely-not-a-real-binary-xyz"));
    }

    #[test]
    fn detect_honors_config_override() {
        let mut config = Config::new();
        config.stt_command = Some("sh -c true".to_string());
        let recognizer = Recognizer::detect(&config).unwrap();
        let (program, args) = recognizer.command();
        assert_eq!(program, "sh");
        assert_eq!(args, vec!["-c", "true"]);
    }

    #[test]
    fn detect_rejects_missing_override() {
        let mut config = Config::new();
        config.stt_command = Some("definitely-not-a-real-binary-xyz".to_string());
        assert!(Recognizer::detect(&config).is_none());
    }

    #[tokio::test]
    async fn listen_captures_stdout_transcript() {
        let recognizer = Recognizer {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo '  hello there  '".to_string()],
        };
        assert_eq!(recognizer.listen().await.unwrap(), "hello there");
    }

    #[tokio::test]
    async fn listen_reports_failing_transcriber() {
        let recognizer = Recognizer {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 3".to_string()],
        };
        assert!(recognizer.listen().await.is_err());
    }
}
