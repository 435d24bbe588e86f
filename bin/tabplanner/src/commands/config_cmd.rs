use serde_json::Value;
use tabplanner_core::{Config, Paths};

/// The config file as stored, without environment overrides, so that `set`
/// never persists them.
fn load_stored(paths: &Paths) -> anyhow::Result<Config> {
    let path = paths.config_file();
    if path.exists() {
        Ok(Config::load(&path)?)
    } else {
        Ok(Config::default())
    }
}

/// Show the effective configuration as pretty-printed JSON.
pub async fn show() -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let json = serde_json::to_value(&config)?;

    println!();
    println!("📋 Current Configuration");
    println!("  File: {}", paths.config_file().display());
    if std::env::var(tabplanner_core::config::SERVICE_URL_ENV).is_ok() {
        println!(
            "  service.baseUrl overridden by {}",
            tabplanner_core::config::SERVICE_URL_ENV
        );
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Get a config value by dot-separated key path.
pub async fn get(key: &str) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let json = serde_json::to_value(&config)?;

    match resolve_json_path(&json, key) {
        Some(Value::String(s)) => println!("{}", s),
        Some(v) => println!("{}", serde_json::to_string_pretty(&v)?),
        None => {
            eprintln!("Key '{}' not found in config.", key);
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Set a config value by dot-separated key path.
pub async fn set(key: &str, value: &str) -> anyhow::Result<()> {
    if !is_known_key(key)? {
        anyhow::bail!("Unknown config key: {}. See `tabplanner config show`.", key);
    }

    let paths = Paths::new();
    let config = load_stored(&paths)?;
    let mut json = serde_json::to_value(&config)?;

    let parsed = parse_value(value);
    set_json_path(&mut json, key, parsed.clone());

    let new_config: Config = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    new_config.save(&paths.config_file())?;

    match &parsed {
        Value::String(s) => println!("✓ Set {} = {}", key, s),
        other => println!("✓ Set {} = {}", key, serde_json::to_string(other)?),
    }
    Ok(())
}

/// Reset config to defaults.
pub async fn reset(force: bool) -> anyhow::Result<()> {
    let paths = Paths::new();

    if !force {
        print!("⚠ Reset config to defaults? Current config will be lost. [y/N] ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    Config::default().save(&paths.config_file())?;
    println!("✓ Config reset to defaults: {}", paths.config_file().display());
    Ok(())
}

/// Unknown keys would be dropped by serde on the way back in, so only paths
/// present in the default config are writable.
fn is_known_key(key: &str) -> anyhow::Result<bool> {
    let defaults = serde_json::to_value(Config::default())?;
    Ok(resolve_json_path(&defaults, key).is_some())
}

/// JSON when it parses, otherwise a plain string.
fn parse_value(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

/// Navigate a JSON value by dot-separated path.
fn resolve_json_path(json: &Value, path: &str) -> Option<Value> {
    let mut current = json;
    for part in path.split('.') {
        // "max_seconds" and "maxSeconds" both work
        let camel = to_camel_case(part);
        current = current.get(&camel).or_else(|| current.get(part))?;
    }
    Some(current.clone())
}

/// Set a value in a JSON object by dot-separated path.
fn set_json_path(json: &mut Value, path: &str, value: Value) {
    let parts: Vec<&str> = path.split('.').collect();
    let mut current = json;
    for (i, part) in parts.iter().enumerate() {
        let camel = to_camel_case(part);
        let key = if current.get(part).is_some() && current.get(&camel).is_none() {
            part.to_string()
        } else {
            camel
        };

        if i == parts.len() - 1 {
            current[&key] = value;
            return;
        }

        if !current.get(&key).map(Value::is_object).unwrap_or(false) {
            current[&key] = serde_json::json!({});
        }
        current = &mut current[&key];
    }
}

/// Convert snake_case to camelCase.
fn to_camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for ch in s.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(ch.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}
