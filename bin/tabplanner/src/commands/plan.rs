use std::path::Path;
use tabplanner_core::{Config, Paths};
use tabplanner_planner::{ConsoleStatus, Renderer};

use super::{build_planner, PlanArgs};

pub async fn run(prompt: &str, args: &PlanArgs, fixture: Option<&Path>) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let planner = build_planner(fixture, &config, &paths)?;
    let params = args.params(&config);

    let status = ConsoleStatus::stderr();
    let mut renderer = Renderer::new(std::io::stdout());

    // The status line already shows the failure.
    if planner
        .submit(prompt, &params, &status, &mut renderer)
        .await
        .is_err()
    {
        std::process::exit(1);
    }
    Ok(())
}
