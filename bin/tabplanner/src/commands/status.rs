use std::path::Path;
use tabplanner_browser::discovery::find_browser_binary;
use tabplanner_browser::LocalBrowser;
use tabplanner_core::{Config, Paths};
use tabplanner_planner::voice::TranscribeBackend;

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

pub async fn run(fixture: Option<&Path>) -> anyhow::Result<()> {
    let paths = Paths::new();

    println!("tabplanner status");
    println!("=================");
    println!();

    let config_path = paths.config_file();
    let config_exists = config_path.exists();
    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_exists { "✓" } else { "(defaults)" }
    );
    let config = Config::load_or_default(&paths)?;

    println!("Service:   {}/tabs", config.service_url());
    println!(
        "Defaults:  limit={} temperature={}{}",
        config.defaults.limit,
        config.defaults.temperature,
        config
            .service_model()
            .map(|m| format!(" model={}", m))
            .unwrap_or_default()
    );
    println!();

    if let Some(path) = fixture {
        println!("Browser:   fixture {} {}", path.display(), mark(path.exists()));
    } else {
        let browser = LocalBrowser::from_config(&config, &paths);
        let engine = browser.engine();
        println!("Browser:   {}", engine.name());

        match find_browser_binary(engine) {
            Some(bin) => println!("  binary     ✓ {}", bin),
            None => println!("  binary     ✗ not found"),
        }

        match browser.profile() {
            Some(profile) => {
                println!("  profile    {} {}", mark(profile.dir().exists()), profile.dir().display());
                println!("  Bookmarks  {}", mark(profile.bookmarks_file().exists()));
                println!("  History    {}", mark(profile.history_file().exists()));
            }
            None => println!("  profile    ✗ not found (set browser.profileDir)"),
        }

        match browser.devtools() {
            Some(devtools) => match devtools.version().await {
                Ok(version) => {
                    let name = version
                        .get("Browser")
                        .and_then(|v| v.as_str())
                        .unwrap_or("unknown");
                    println!("  DevTools   ✓ {} ({})", devtools.base(), name);
                }
                Err(e) => println!("  DevTools   ✗ {} ({})", devtools.base(), e),
            },
            None => println!("  DevTools   - no debugPort; open tabs are not collected"),
        }
    }
    println!();

    println!("Voice:     locale={} backend={}", config.voice.locale, config.voice.backend);
    let backend = config.voice.backend.parse().unwrap_or(TranscribeBackend::Auto);
    println!("  ffmpeg       {}", mark(on_path("ffmpeg")));
    if matches!(backend, TranscribeBackend::Auto | TranscribeBackend::Whisper) {
        println!("  whisper      {}", mark(on_path("whisper")));
    }
    if matches!(backend, TranscribeBackend::Auto | TranscribeBackend::WhisperCpp) {
        println!(
            "  whisper.cpp  {}",
            mark(on_path("whisper-cli") || on_path("whisper-cpp"))
        );
    }
    if matches!(backend, TranscribeBackend::Auto | TranscribeBackend::Api) {
        let has_key = config.voice.api_key.as_deref().is_some_and(|k| !k.is_empty())
            || std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty());
        println!("  API key      {}", mark(has_key));
    }
    println!();
    Ok(())
}

fn on_path(binary: &str) -> bool {
    which::which(binary).is_ok()
}
