//! Clamping of the two numeric query parameters. Raw user input goes in,
//! values that are always within range come out.

use tabplanner_core::PlanParams;

pub const LIMIT_MIN: u32 = 1;
pub const LIMIT_MAX: u32 = 10;
pub const DEFAULT_LIMIT: u32 = 5;

pub const TEMPERATURE_MIN: f64 = 0.0;
pub const TEMPERATURE_MAX: f64 = 2.0;
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Integer part of `raw`, clamped to 1..=10. Non-numeric input gives
/// `default` (itself clamped).
pub fn parse_limit(raw: &str, default: u32) -> u32 {
    let default = default.clamp(LIMIT_MIN, LIMIT_MAX);
    let Some(value) = parse_number(raw) else {
        return default;
    };
    let value = value.trunc();
    if value <= f64::from(LIMIT_MIN) {
        LIMIT_MIN
    } else if value >= f64::from(LIMIT_MAX) {
        LIMIT_MAX
    } else {
        value as u32
    }
}

/// `raw` clamped to 0..=2. Non-numeric input gives `default` (itself
/// clamped).
pub fn parse_temperature(raw: &str, default: f64) -> f64 {
    let default = clamp_temperature(default).unwrap_or(DEFAULT_TEMPERATURE);
    parse_number(raw)
        .and_then(clamp_temperature)
        .unwrap_or(default)
}

fn clamp_temperature(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX))
    }
}

/// Finite numbers only; `inf`, `infinity` and `NaN` count as non-numeric.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Build clamped parameters from raw input, falling back to the configured
/// defaults for anything missing or unparseable.
pub fn plan_params(
    limit: Option<&str>,
    temperature: Option<&str>,
    defaults: &tabplanner_core::config::PlanDefaults,
    model: Option<String>,
) -> PlanParams {
    PlanParams {
        limit: parse_limit(limit.unwrap_or(""), defaults.limit),
        temperature: parse_temperature(temperature.unwrap_or(""), defaults.temperature),
        model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabplanner_core::config::PlanDefaults;

    #[test]
    fn test_limit_clamping() {
        assert_eq!(parse_limit("15", DEFAULT_LIMIT), 10);
        assert_eq!(parse_limit("0", DEFAULT_LIMIT), 1);
        assert_eq!(parse_limit("-3", DEFAULT_LIMIT), 1);
        assert_eq!(parse_limit("7", DEFAULT_LIMIT), 7);
        assert_eq!(parse_limit(" 3 ", DEFAULT_LIMIT), 3);
        assert_eq!(parse_limit("2.9", DEFAULT_LIMIT), 2);
    }

    #[test]
    fn test_limit_non_numeric_uses_default() {
        assert_eq!(parse_limit("abc", DEFAULT_LIMIT), 5);
        assert_eq!(parse_limit("", DEFAULT_LIMIT), 5);
        assert_eq!(parse_limit("NaN", DEFAULT_LIMIT), 5);
        assert_eq!(parse_limit("inf", DEFAULT_LIMIT), 5);
        assert_eq!(parse_limit("-Infinity", DEFAULT_LIMIT), 5);
        assert_eq!(parse_limit("abc", 40), 10);
    }

    #[test]
    fn test_temperature_clamping() {
        assert_eq!(parse_temperature("-5", DEFAULT_TEMPERATURE), 0.0);
        assert_eq!(parse_temperature("3.5", DEFAULT_TEMPERATURE), 2.0);
        assert_eq!(parse_temperature("0.7", DEFAULT_TEMPERATURE), 0.7);
    }

    #[test]
    fn test_temperature_non_numeric_uses_default() {
        assert_eq!(parse_temperature("warm", DEFAULT_TEMPERATURE), 0.2);
        assert_eq!(parse_temperature("", DEFAULT_TEMPERATURE), 0.2);
        assert_eq!(parse_temperature("-inf", DEFAULT_TEMPERATURE), 0.2);
        assert_eq!(parse_temperature("infinity", DEFAULT_TEMPERATURE), 0.2);
        assert_eq!(parse_temperature("x", 9.0), 2.0);
    }

    #[test]
    fn test_plan_params_from_defaults() {
        let params = plan_params(None, Some("1.1"), &PlanDefaults::default(), None);
        assert_eq!(params.limit, 5);
        assert_eq!(params.temperature, 1.1);
        assert!(params.model.is_none());
    }
}
