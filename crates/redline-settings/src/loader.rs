//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`RedlineSettings::default()`]
//! 2. If `~/.redline/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `REDLINE_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::RedlineSettings;

/// Resolve the path to the settings file (`~/.redline/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".redline").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<RedlineSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<RedlineSettings> {
    let defaults = serde_json::to_value(RedlineSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: RedlineSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Integers must parse and fall within range; invalid values are silently
/// ignored (falling back to file/default).
pub fn apply_env_overrides(settings: &mut RedlineSettings) {
    if let Some(v) = read_env_string("REDLINE_MODEL") {
        settings.model.name = v;
    }
    if let Some(v) = read_env_string("REDLINE_BASE_URL") {
        settings.model.base_url = v;
    }
    if let Some(v) = read_env_string("REDLINE_API_KEY_ENV") {
        settings.model.api_key_env = v;
    }
    if let Some(v) = read_env_usize("REDLINE_MAX_CHUNK_BYTES", 1, 10_000_000) {
        settings.review.max_chunk_bytes = v;
    }
    if let Some(v) = read_env_u32("REDLINE_REQUESTS_PER_MINUTE", 1, 100_000) {
        settings.review.requests_per_minute = v;
    }
    if let Some(v) = read_env_string("REDLINE_SYSTEM_PROMPT") {
        settings.review.system_prompt = Some(v);
    }
    if let Some(v) = read_env_u32("REDLINE_MAX_RETRY_ATTEMPTS", 1, 100) {
        settings.retry.max_attempts = v;
    }
    if let Some(v) = read_env_u64("REDLINE_BASE_BACKOFF_MS", 1, 600_000) {
        settings.retry.base_delay_ms = v;
    }
    if let Some(v) = read_env_u64("REDLINE_MAX_BACKOFF_MS", 1, 3_600_000) {
        settings.retry.max_delay_ms = v;
    }
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    std::env::var(name)
        .ok()?
        .parse::<u32>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    std::env::var(name)
        .ok()?
        .parse::<u64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    std::env::var(name)
        .ok()?
        .parse::<usize>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn deep_merge_objects_recursively() {
        let target = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        let source = serde_json::json!({"a": {"y": 9}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"]["x"], 1);
        assert_eq!(merged["a"]["y"], 9);
        assert_eq!(merged["b"], 3);
    }

    #[test]
    fn deep_merge_skips_nulls() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"a": null, "b": 2});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn deep_merge_replaces_primitives() {
        let merged = deep_merge(serde_json::json!(1), serde_json::json!("two"));
        assert_eq!(merged, serde_json::json!("two"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings.review.requests_per_minute, 25);
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"review": {{"maxChunkBytes": 8000}}, "model": {{"name": "custom-model"}}}}"#
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.review.max_chunk_bytes, 8000);
        assert_eq!(settings.model.name, "custom-model");
        // Untouched sections keep their defaults
        assert_eq!(settings.retry.max_attempts, 5);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn env_override_parsing_rejects_out_of_range() {
        let mut settings = RedlineSettings::default();
        // Direct unit test of the parse helpers; env-var reads themselves are
        // covered implicitly and left alone to avoid cross-test races.
        assert_eq!(read_env_u32("REDLINE_TEST_UNSET_VAR", 1, 10), None);
        apply_env_overrides(&mut settings);
        assert!(settings.validate().is_ok());
    }
}
