//! Speech output and voice search through external platform commands.
//!
//! Text-to-speech runs a speech command with the text as its last argument and
//! does not wait for it. Voice search runs a recognizer command once; the
//! command receives the language code as its last argument and prints the
//! transcript on stdout.

use std::env;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Label on the voice control when no recognizer is available.
pub const RECOGNITION_UNSUPPORTED: &str = "Speech recognition not supported";

/// Speech commands tried, in order, when none is configured.
const TTS_CANDIDATES: [&str; 4] = ["espeak-ng", "espeak", "spd-say", "say"];

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("speech synthesis is not available")]
    SynthesisUnavailable,

    #[error("Speech recognition not supported")]
    RecognitionUnavailable,

    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("recognizer exited with {0}")]
    RecognizerFailed(std::process::ExitStatus),

    #[error("no speech was recognized")]
    NoSpeech,
}

/// A program plus its leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
}

impl PlatformCommand {
    /// Split a configured command line on whitespace. Blank input yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, last_arg: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(last_arg);
        cmd
    }
}

/// Platform speech capabilities, resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct VoiceBridge {
    synthesizer: Option<PlatformCommand>,
    recognizer: Option<PlatformCommand>,
}

impl VoiceBridge {
    pub fn new(synthesizer: Option<PlatformCommand>, recognizer: Option<PlatformCommand>) -> Self {
        Self {
            synthesizer,
            recognizer,
        }
    }

    /// Use configured commands, falling back to a speech program found on `PATH`.
    /// There is no default recognizer.
    #[instrument(level = "info", skip_all)]
    pub fn detect(tts_command: Option<&str>, stt_command: Option<&str>) -> Self {
        let synthesizer = tts_command.and_then(PlatformCommand::parse).or_else(|| {
            TTS_CANDIDATES
                .iter()
                .find(|name| find_on_path(name).is_some())
                .and_then(|name| PlatformCommand::parse(name))
        });
        let recognizer = stt_command.and_then(PlatformCommand::parse);

        info!(
            synthesizer = synthesizer.as_ref().map(PlatformCommand::program),
            recognizer = recognizer.as_ref().map(PlatformCommand::program),
            "Resolved speech capabilities"
        );
        Self::new(synthesizer, recognizer)
    }

    pub fn can_speak(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn can_recognize(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Label for the voice control; disabled controls explain why.
    pub fn voice_control_label(&self) -> &'static str {
        if self.can_recognize() {
            "🎤 voice"
        } else {
            RECOGNITION_UNSUPPORTED
        }
    }

    /// Read `text` aloud. Returns once the speech program is launched.
    #[instrument(level = "debug", skip_all, fields(chars = text.chars().count()))]
    pub fn speak(&self, text: &str) -> Result<(), VoiceError> {
        let synth = self
            .synthesizer
            .as_ref()
            .ok_or(VoiceError::SynthesisUnavailable)?;
        let child = synth
            .command(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| VoiceError::Spawn {
                program: synth.program.clone(),
                source,
            })?;
        debug!(pid = child.id(), "Speech started");
        Ok(())
    }

    /// Run one recognition session and return the trimmed transcript.
    #[instrument(level = "info", skip(self))]
    pub async fn listen(&self, language: &str) -> Result<String, VoiceError> {
        let recognizer = self
            .recognizer
            .as_ref()
            .ok_or(VoiceError::RecognitionUnavailable)?;
        let output = recognizer
            .command(language)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|source| VoiceError::Spawn {
                program: recognizer.program.clone(),
                source,
            })?;

        if !output.status.success() {
            warn!(status = %output.status, "Recognizer failed");
            return Err(VoiceError::RecognizerFailed(output.status));
        }
        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(VoiceError::NoSpeech);
        }
        Ok(transcript)
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
