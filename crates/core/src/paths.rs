use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".tabplanner"))
            .unwrap_or_else(|| PathBuf::from(".tabplanner"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    /// Scratch space for history database copies and voice recordings.
    pub fn tmp_dir(&self) -> PathBuf {
        self.base.join("tmp")
    }

    pub fn recordings_dir(&self) -> PathBuf {
        self.tmp_dir().join("recordings")
    }

}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
