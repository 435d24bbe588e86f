pub mod collect;
pub mod completions_cmd;
pub mod config_cmd;
pub mod plan;
pub mod status;
pub mod voice;

use std::path::Path;
use std::sync::Arc;
use tabplanner_browser::{BrowserApi, FixtureBrowser, LocalBrowser};
use tabplanner_core::{Config, Paths, PlanParams};
use tabplanner_planner::{plan_params, CollectorLimits, Planner, PlannerClient};
use tracing::debug;

/// Raw `--limit`/`--temperature`/`--model` input, clamped later.
pub struct PlanArgs {
    pub limit: Option<String>,
    pub temperature: Option<String>,
    pub model: Option<String>,
}

impl PlanArgs {
    pub fn params(&self, config: &Config) -> PlanParams {
        let model = self
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| config.service_model());
        plan_params(
            self.limit.as_deref(),
            self.temperature.as_deref(),
            &config.defaults,
            model,
        )
    }
}

pub fn open_browser(
    fixture: Option<&Path>,
    config: &Config,
    paths: &Paths,
) -> anyhow::Result<Arc<dyn BrowserApi>> {
    match fixture {
        Some(path) => {
            debug!(path = %path.display(), "Using browser fixture");
            Ok(Arc::new(FixtureBrowser::from_file(path)?))
        }
        None => Ok(Arc::new(LocalBrowser::from_config(config, paths))),
    }
}

pub fn build_planner(
    fixture: Option<&Path>,
    config: &Config,
    paths: &Paths,
) -> anyhow::Result<Planner> {
    let browser = open_browser(fixture, config, paths)?;
    let service = Arc::new(PlannerClient::from_config(config));
    Ok(Planner::new(browser, service).with_limits(CollectorLimits::from(&config.collectors)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_args_fall_back_to_config() {
        let mut config = Config::default();
        config.defaults.limit = 3;
        config.service.model = Some("gpt-4.1-mini".to_string());

        let args = PlanArgs {
            limit: Some("many".to_string()),
            temperature: Some("9".to_string()),
            model: None,
        };
        let params = args.params(&config);
        assert_eq!(params.limit, 3);
        assert_eq!(params.temperature, 2.0);
        assert_eq!(params.model.as_deref(), Some("gpt-4.1-mini"));
    }

    #[test]
    fn test_fixture_browser_selected() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("snapshot.json");
        std::fs::write(&fixture, r#"{"bookmarks": []}"#).unwrap();
        let paths = Paths::with_base(dir.path().join(".tabplanner"));
        assert!(open_browser(Some(&fixture), &Config::default(), &paths).is_ok());
        assert!(open_browser(Some(&dir.path().join("missing.json")), &Config::default(), &paths).is_err());
    }
}
