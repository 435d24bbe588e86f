use std::path::{Path, PathBuf};
use tabplanner_core::{Config, Paths};
use tabplanner_planner::{AudioSource, CaptureRecognizer, ConsoleStatus, Renderer, VoiceControl};

use super::{build_planner, PlanArgs};

pub async fn run(
    audio: Option<PathBuf>,
    seconds: Option<u32>,
    args: &PlanArgs,
    fixture: Option<&Path>,
) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let planner = build_planner(fixture, &config, &paths)?;
    let params = args.params(&config);

    let source = match audio {
        Some(path) => AudioSource::File(path),
        None => AudioSource::Microphone {
            seconds: seconds.unwrap_or(config.voice.max_seconds),
        },
    };
    let recognizer = CaptureRecognizer::from_config(&config.voice, &paths, source);
    let mut control = VoiceControl::new().on_label(|label| eprintln!("{}", label));

    let status = ConsoleStatus::stderr();
    let mut renderer = Renderer::new(std::io::stdout());

    match planner
        .submit_voice(
            &mut control,
            &recognizer,
            &config.voice.locale,
            &params,
            &status,
            &mut renderer,
        )
        .await
    {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            eprintln!("No speech recognized.");
            Ok(())
        }
        Err(_) => std::process::exit(1),
    }
}
