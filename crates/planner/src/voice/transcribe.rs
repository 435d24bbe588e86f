//! Speech-to-text backends: the openai-whisper CLI, whisper.cpp and the
//! OpenAI transcription API.

use reqwest::Client;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabplanner_core::config::VoiceConfig;
use tabplanner_core::{Error, Paths, Result};
use tracing::{debug, info};

use super::capture::{ensure_wav, truncate};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const API_MODEL: &str = "whisper-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscribeBackend {
    /// whisper, then whisper.cpp, then the API.
    Auto,
    Whisper,
    WhisperCpp,
    Api,
}

impl std::str::FromStr for TranscribeBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(TranscribeBackend::Auto),
            "whisper" => Ok(TranscribeBackend::Whisper),
            "whisper_cpp" | "whisper-cpp" | "whispercpp" => Ok(TranscribeBackend::WhisperCpp),
            "api" | "openai" => Ok(TranscribeBackend::Api),
            other => Err(Error::Config(format!("Unknown voice backend: {}", other))),
        }
    }
}

/// `en-US` → `en`. Whisper takes bare ISO-639-1 codes.
pub fn language_for_locale(locale: &str) -> Option<String> {
    let lang = locale
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    (lang.len() == 2 && lang.chars().all(|c| c.is_ascii_alphabetic())).then_some(lang)
}

pub struct Transcriber {
    backend: TranscribeBackend,
    model: String,
    api_key: Option<String>,
    api_base: String,
    scratch_dir: PathBuf,
    client: Client,
}

impl Transcriber {
    pub fn new(
        backend: TranscribeBackend,
        model: &str,
        api_key: Option<String>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            backend,
            model: model.to_string(),
            api_key,
            api_base: OPENAI_API_BASE.to_string(),
            scratch_dir,
            client: Client::new(),
        }
    }

    pub fn from_config(config: &VoiceConfig, paths: &Paths) -> Self {
        let backend = config.backend.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to auto voice backend");
            TranscribeBackend::Auto
        });
        Self::new(
            backend,
            &config.model,
            config.api_key.clone().filter(|k| !k.is_empty()),
            paths.tmp_dir(),
        )
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    /// Transcript of `path`, trimmed.
    pub async fn transcribe(&self, path: &Path, locale: &str) -> Result<String> {
        let language = language_for_locale(locale);
        let language = language.as_deref();
        info!(path = %path.display(), backend = ?self.backend, "Transcribing utterance");

        let text = match self.backend {
            TranscribeBackend::Whisper => self.whisper(path, language).await?,
            TranscribeBackend::WhisperCpp => self.whisper_cpp(path, language).await?,
            TranscribeBackend::Api => self.api(path, language).await?,
            TranscribeBackend::Auto => self.auto(path, language).await?,
        };
        Ok(text.trim().to_string())
    }

    async fn auto(&self, path: &Path, language: Option<&str>) -> Result<String> {
        if which::which("whisper").is_ok() {
            match self.whisper(path, language).await {
                Ok(text) => return Ok(text),
                Err(e) => debug!(error = %e, "whisper failed, trying whisper.cpp"),
            }
        }
        if whisper_cpp_binary().is_some() {
            match self.whisper_cpp(path, language).await {
                Ok(text) => return Ok(text),
                Err(e) => debug!(error = %e, "whisper.cpp failed, trying API"),
            }
        }
        self.api(path, language).await
    }

    async fn whisper(&self, path: &Path, language: Option<&str>) -> Result<String> {
        let output_dir = self.scratch_dir.join("transcripts");
        tokio::fs::create_dir_all(&output_dir).await?;

        let mut cmd = tokio::process::Command::new("whisper");
        cmd.arg(path)
            .args(["--model", self.model.as_str()])
            .args(["--output_format", "txt"])
            .arg("--output_dir")
            .arg(&output_dir)
            .args(["--verbose", "False"]);
        if let Some(lang) = language {
            cmd.args(["--language", lang]);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| Error::Voice(format!("whisper command failed: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Voice(format!("whisper failed: {}", truncate(&stderr, 500))));
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
        let result_file = output_dir.join(format!("{}.txt", stem));
        let text = match tokio::fs::read_to_string(&result_file).await {
            Ok(text) => {
                let _ = tokio::fs::remove_file(&result_file).await;
                text
            }
            Err(_) => String::from_utf8_lossy(&output.stdout).to_string(),
        };
        info!(chars = text.len(), "Transcription complete (whisper)");
        Ok(text)
    }

    async fn whisper_cpp(&self, path: &Path, language: Option<&str>) -> Result<String> {
        let binary = whisper_cpp_binary()
            .ok_or_else(|| Error::Voice("whisper.cpp binary not found".to_string()))?;
        let wav = ensure_wav(path, &self.scratch_dir).await?;

        let mut cmd = tokio::process::Command::new(binary);
        cmd.arg("-m")
            .arg(whisper_cpp_model_path(&self.model))
            .arg("-f")
            .arg(&wav)
            .arg("--no-timestamps");
        if let Some(lang) = language {
            cmd.args(["-l", lang]);
        }

        let output = cmd.output().await;
        if wav != path {
            let _ = tokio::fs::remove_file(&wav).await;
        }
        let output = output.map_err(|e| Error::Voice(format!("whisper.cpp failed: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Voice(format!("whisper.cpp failed: {}", truncate(&stderr, 500))));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        info!(chars = text.len(), "Transcription complete (whisper.cpp)");
        Ok(text)
    }

    async fn api(&self, path: &Path, language: Option<&str>) -> Result<String> {
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
            .ok_or_else(|| {
                Error::Voice(
                    "No transcription backend available. Install whisper locally or set voice.apiKey / OPENAI_API_KEY"
                        .to_string(),
                )
            })?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Voice(format!("Failed to read audio file: {}", e)))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let mut form = reqwest::multipart::Form::new()
            .text("model", API_MODEL)
            .text("response_format", "json");
        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| Error::Voice(format!("Failed to create multipart: {}", e)))?;
        form = form.part("file", part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_base))
            .bearer_auth(api_key)
            .multipart(form)
            .timeout(Duration::from_secs(120))
            .send()
            .await
            .map_err(|e| Error::Voice(format!("Transcription request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Voice(format!("Failed to read transcription response: {}", e)))?;
        if !status.is_success() {
            return Err(Error::Voice(format!(
                "Transcription API error ({}): {}",
                status,
                truncate(&body, 500)
            )));
        }

        let json: Value = serde_json::from_str(&body)
            .map_err(|e| Error::Voice(format!("Failed to parse transcription response: {}", e)))?;
        let text = json
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        info!(chars = text.len(), "Transcription complete (API)");
        Ok(text)
    }
}

fn whisper_cpp_binary() -> Option<&'static str> {
    ["whisper-cli", "whisper-cpp"]
        .into_iter()
        .find(|b| which::which(b).is_ok())
}

/// First existing `ggml-<model>.bin` in the usual install locations, or the
/// bare file name so whisper.cpp can resolve it itself.
fn whisper_cpp_model_path(model: &str) -> PathBuf {
    let name = format!("ggml-{}.bin", model);
    let mut candidates = vec![
        PathBuf::from("/usr/local/share/whisper-cpp/models").join(&name),
        PathBuf::from("/opt/homebrew/share/whisper-cpp/models").join(&name),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.insert(1, home.join(".local/share/whisper-cpp/models").join(&name));
    }
    candidates
        .into_iter()
        .find(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from(name))
}
