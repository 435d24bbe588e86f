//! Audio acquisition via ffmpeg.

use std::path::{Path, PathBuf};
use tabplanner_core::{Error, Result};
use tracing::info;

/// Recordings longer than this are cut off.
pub const MAX_RECORD_SECONDS: u32 = 60;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    /// Record from the default input device for up to `seconds`.
    Microphone { seconds: u32 },
    /// A pre-recorded file, used as is.
    File(PathBuf),
}

impl AudioSource {
    pub fn is_recording(&self) -> bool {
        matches!(self, AudioSource::Microphone { .. })
    }
}

/// ffmpeg input arguments for the default microphone on `os`.
pub fn mic_input_args(os: &str) -> Vec<&'static str> {
    match os {
        "macos" => vec!["-f", "avfoundation", "-i", ":0"],
        "windows" => vec!["-f", "dshow", "-i", "audio=default"],
        _ => vec!["-f", "pulse", "-i", "default"],
    }
}

/// Path of an audio file ready for transcription.
pub async fn capture(source: &AudioSource, recordings_dir: &Path) -> Result<PathBuf> {
    match source {
        AudioSource::File(path) => {
            if !path.exists() {
                return Err(Error::Voice(format!("Audio file not found: {}", path.display())));
            }
            Ok(path.clone())
        }
        AudioSource::Microphone { seconds } => record(*seconds, recordings_dir).await,
    }
}

async fn record(seconds: u32, recordings_dir: &Path) -> Result<PathBuf> {
    if which::which("ffmpeg").is_err() {
        return Err(Error::Voice(
            "ffmpeg is required to record from the microphone".to_string(),
        ));
    }

    tokio::fs::create_dir_all(recordings_dir).await?;
    let out = recordings_dir.join(format!(
        "utterance_{}.wav",
        chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f")
    ));
    let seconds = seconds.clamp(1, MAX_RECORD_SECONDS).to_string();

    info!(seconds = %seconds, path = %out.display(), "Recording from microphone");

    let output = tokio::process::Command::new("ffmpeg")
        .arg("-y")
        .args(mic_input_args(std::env::consts::OS))
        .args(["-t", seconds.as_str(), "-ar", "16000", "-ac", "1"])
        .arg(&out)
        .output()
        .await
        .map_err(|e| Error::Voice(format!("ffmpeg failed: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Voice(format!("Recording failed: {}", truncate(&stderr, 300))));
    }
    Ok(out)
}

/// Convert `path` to 16 kHz mono WAV in `scratch_dir` unless it already is
/// a `.wav`.
pub async fn ensure_wav(path: &Path, scratch_dir: &Path) -> Result<PathBuf> {
    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);
    if is_wav {
        return Ok(path.to_path_buf());
    }

    if which::which("ffmpeg").is_err() {
        return Err(Error::Voice("ffmpeg is required to convert audio to WAV".to_string()));
    }

    tokio::fs::create_dir_all(scratch_dir).await?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("audio");
    let wav_path = scratch_dir.join(format!("{}_tmp.wav", stem));

    let output = tokio::process::Command::new("ffmpeg")
        .arg("-i")
        .arg(path)
        .args(["-ar", "16000", "-ac", "1", "-y"])
        .arg(&wav_path)
        .output()
        .await
        .map_err(|e| Error::Voice(format!("ffmpeg conversion failed: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Voice(format!("Audio conversion failed: {}", truncate(&stderr, 300))));
    }
    Ok(wav_path)
}

pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.trim();
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...(truncated)", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mic_input_args() {
        assert_eq!(mic_input_args("macos"), vec!["-f", "avfoundation", "-i", ":0"]);
        assert_eq!(mic_input_args("linux"), vec!["-f", "pulse", "-i", "default"]);
        assert_eq!(mic_input_args("windows")[1], "dshow");
    }

    #[tokio::test]
    async fn test_file_source_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.wav");
        std::fs::write(&file, b"RIFF").unwrap();
        let source = AudioSource::File(file.clone());
        assert!(!source.is_recording());
        assert_eq!(capture(&source, dir.path()).await.unwrap(), file);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = capture(&AudioSource::File(dir.path().join("nope.mp3")), dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Voice input error: Audio file not found"));
    }

    #[tokio::test]
    async fn test_ensure_wav_keeps_wav() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("clip.WAV");
        std::fs::write(&file, b"RIFF").unwrap();
        assert_eq!(ensure_wav(&file, dir.path()).await.unwrap(), file);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(" short \n", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...(truncated)");
    }
}
