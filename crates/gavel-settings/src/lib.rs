//! # gavel-settings
//!
//! Configuration management with layered sources for the Gavel auction
//! server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`GavelSettings::default()`]
//! 2. **User file** — `~/.gavel/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `GAVEL_*` overrides (highest priority)
//!
//! After loading, out-of-range values are clamped into their valid bounds
//! rather than rejected, so a bad settings file never prevents startup.
//!
//! # Usage
//!
//! ```no_run
//! use gavel_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("listening on port {}", settings.server.port);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

/// Global settings singleton.
///
/// Initialized on first access via [`get_settings`]. The settings are loaded
/// from `~/.gavel/settings.json` with env var overrides, or fall back to
/// compiled defaults if loading fails.
static SETTINGS: OnceLock<GavelSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.gavel/settings.json` with env var
/// overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
pub fn get_settings() -> &'static GavelSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
pub fn init_settings(settings: GavelSettings) -> std::result::Result<(), GavelSettings> {
    SETTINGS.set(settings)
}
