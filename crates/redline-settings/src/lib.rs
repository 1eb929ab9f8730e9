//! # redline-settings
//!
//! Configuration management with layered sources for Redline.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`RedlineSettings::default()`]
//! 2. **User file** — `~/.redline/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `REDLINE_*` overrides (highest priority)
//!
//! Call [`RedlineSettings::validate`] before wiring the pipeline: invalid
//! tunables are fatal at startup, never retried.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::{ModelSettings, RedlineSettings, RetrySettings, ReviewSettings};

use std::sync::OnceLock;

/// Global settings singleton.
static SETTINGS: OnceLock<RedlineSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.redline/settings.json` with env
/// var overrides; on failure, falls back to compiled defaults. Subsequent
/// calls return the cached value.
pub fn get_settings() -> &'static RedlineSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: RedlineSettings) -> std::result::Result<(), RedlineSettings> {
    SETTINGS.set(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
