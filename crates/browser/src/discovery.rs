//! Locating browser binaries and default profile directories.

use std::path::PathBuf;

/// Supported Chromium-family browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserEngine {
    Chrome,
    Chromium,
    Brave,
    Edge,
}

impl BrowserEngine {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "chromium" => Self::Chromium,
            "brave" => Self::Brave,
            "edge" | "msedge" => Self::Edge,
            _ => Self::Chrome,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Chromium => "chromium",
            Self::Brave => "brave",
            Self::Edge => "edge",
        }
    }

    /// User-data directory relative to the platform config root.
    fn user_data_segments(&self) -> &'static [&'static str] {
        if cfg!(target_os = "linux") {
            match self {
                Self::Chrome => &["google-chrome"],
                Self::Chromium => &["chromium"],
                Self::Brave => &["BraveSoftware", "Brave-Browser"],
                Self::Edge => &["microsoft-edge"],
            }
        } else if cfg!(target_os = "macos") {
            match self {
                Self::Chrome => &["Google", "Chrome"],
                Self::Chromium => &["Chromium"],
                Self::Brave => &["BraveSoftware", "Brave-Browser"],
                Self::Edge => &["Microsoft Edge"],
            }
        } else {
            match self {
                Self::Chrome => &["Google", "Chrome", "User Data"],
                Self::Chromium => &["Chromium", "User Data"],
                Self::Brave => &["BraveSoftware", "Brave-Browser", "User Data"],
                Self::Edge => &["Microsoft", "Edge", "User Data"],
            }
        }
    }
}

/// The `Default` profile directory for `engine`, if it exists on disk.
pub fn default_profile_dir(engine: BrowserEngine) -> Option<PathBuf> {
    let root = if cfg!(target_os = "linux") {
        dirs::config_dir()?
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()?
    } else {
        dirs::data_local_dir()?
    };

    let mut dir = root;
    for segment in engine.user_data_segments() {
        dir.push(segment);
    }
    dir.push("Default");

    if dir.is_dir() {
        Some(dir)
    } else {
        None
    }
}

/// Find a browser binary on the system for the given engine.
pub fn find_browser_binary(engine: BrowserEngine) -> Option<String> {
    let candidates: Vec<&str> = match engine {
        BrowserEngine::Chrome => {
            if cfg!(target_os = "macos") {
                vec!["/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"]
            } else if cfg!(target_os = "linux") {
                vec![
                    "google-chrome",
                    "google-chrome-stable",
                    "/usr/bin/google-chrome",
                ]
            } else {
                vec![
                    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
                ]
            }
        }
        BrowserEngine::Chromium => {
            if cfg!(target_os = "macos") {
                vec!["/Applications/Chromium.app/Contents/MacOS/Chromium"]
            } else if cfg!(target_os = "linux") {
                vec!["chromium", "chromium-browser", "/usr/bin/chromium"]
            } else {
                vec![r"C:\Program Files\Chromium\Application\chrome.exe"]
            }
        }
        BrowserEngine::Brave => {
            if cfg!(target_os = "macos") {
                vec!["/Applications/Brave Browser.app/Contents/MacOS/Brave Browser"]
            } else if cfg!(target_os = "linux") {
                vec!["brave-browser", "brave", "/usr/bin/brave-browser"]
            } else {
                vec![r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe"]
            }
        }
        BrowserEngine::Edge => {
            if cfg!(target_os = "macos") {
                vec!["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"]
            } else if cfg!(target_os = "linux") {
                vec![
                    "microsoft-edge",
                    "microsoft-edge-stable",
                    "/usr/bin/microsoft-edge",
                ]
            } else {
                vec![
                    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
                    r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
                ]
            }
        }
    };

    for candidate in candidates {
        if std::path::Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
        if !candidate.contains('/') && !candidate.contains('\\') && which::which(candidate).is_ok()
        {
            return Some(candidate.to_string());
        }
    }
    None
}
