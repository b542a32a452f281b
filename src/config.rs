//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; the user's `config.toml` in the content root is merged on
//! top; a few environment variables are applied last so deployments can switch
//! the content source without editing files.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml
//! ├── publications/
//! ├── issues/
//! └── posts/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Stackbound Press"
//! description = "Issues and articles from the Stackbound imprint."
//! base_url = ""              # Absolute origin for feed links, e.g. "https://example.com"
//!
//! [cms]
//! enabled = false            # Read from the headless CMS instead of local files
//! project_id = "abc123"      # Required when enabled
//! dataset = "production"     # Required when enabled
//! api_version = "2024-01-01"
//! use_cdn = true
//!
//! [listing]
//! latest_posts = 12          # Posts on the home page
//! latest_issues = 6          # Locked issues on the home page
//! cover_lines = 6            # Maximum cover lines per issue
//!
//! [colors.light]
//! background = "#f4efe6"
//! text = "#161412"
//! text_muted = "#6b645b"
//! rule = "#d8cfc1"
//! accent = "#c2410c"
//!
//! [colors.dark]
//! background = "#12110f"
//! text = "#f1ece4"
//! text_muted = "#a39b90"
//! rule = "#37322c"
//! accent = "#f97316"
//!
//! [processing]
//! max_processes = 4          # Max parallel render workers (omit for auto = CPU cores)
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable             | Effect                                           |
//! |----------------------|--------------------------------------------------|
//! | `SET_SANITY_ENABLED` | `1`, `true`, `yes`, `on` enable the CMS; any other value disables it |
//! | `SANITY_PROJECT_ID`  | Replaces `cms.project_id`                        |
//! | `SANITY_DATASET`     | Replaces `cms.dataset`                           |
//! | `SANITY_READ_TOKEN`  | Read token; never read from the config file      |
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const ENV_CMS_ENABLED: &str = "SET_SANITY_ENABLED";
pub const ENV_CMS_PROJECT_ID: &str = "SANITY_PROJECT_ID";
pub const ENV_CMS_DATASET: &str = "SANITY_DATASET";
pub const ENV_CMS_TOKEN: &str = "SANITY_READ_TOKEN";

/// Upper bound for `listing.cover_lines`; covers have room for six.
const MAX_COVER_LINES: usize = 6;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site name, used in page titles and the site feed.
    pub title: String,
    /// One-line description for the home page and the site feed.
    pub description: String,
    /// Absolute origin prepended to feed links. Empty means root-relative.
    pub base_url: String,
    /// Headless CMS connection.
    pub cms: CmsConfig,
    /// How many items the listing pages show.
    pub listing: ListingConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Stackbound Press".to_string(),
            description: "Issues and articles from the Stackbound imprint.".to_string(),
            base_url: String::new(),
            cms: CmsConfig::default(),
            listing: ListingConfig::default(),
            colors: ColorConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if !self.base_url.is_empty()
            && !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".into(),
            ));
        }
        if self.listing.latest_posts == 0 || self.listing.latest_issues == 0 {
            return Err(ConfigError::Validation(
                "listing.latest_posts and listing.latest_issues must be non-zero".into(),
            ));
        }
        if self.listing.cover_lines == 0 || self.listing.cover_lines > MAX_COVER_LINES {
            return Err(ConfigError::Validation(format!(
                "listing.cover_lines must be 1-{MAX_COVER_LINES}"
            )));
        }
        if self.cms.api_version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "cms.api_version must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// `base_url` without a trailing slash, ready for `format!("{}/posts/...")`.
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Apply environment overrides, reading variables through `var`.
    ///
    /// Takes a lookup function so tests don't have to touch the process
    /// environment.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = var(ENV_CMS_ENABLED) {
            self.cms.enabled = parse_flag(&raw);
        }
        if let Some(project_id) = var(ENV_CMS_PROJECT_ID).filter(|v| !v.trim().is_empty()) {
            self.cms.project_id = Some(project_id.trim().to_string());
        }
        if let Some(dataset) = var(ENV_CMS_DATASET).filter(|v| !v.trim().is_empty()) {
            self.cms.dataset = Some(dataset.trim().to_string());
        }
        self.cms.token = var(ENV_CMS_TOKEN).filter(|v| !v.trim().is_empty());
    }
}

/// `1`, `true`, `yes` and `on` (any case, surrounding whitespace ignored).
fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Headless CMS connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CmsConfig {
    /// Read content from the CMS. Also needs `project_id` and `dataset`.
    pub enabled: bool,
    pub project_id: Option<String>,
    pub dataset: Option<String>,
    /// Dated API version, without the leading `v`.
    pub api_version: String,
    /// Query the CDN edge instead of the live API.
    pub use_cdn: bool,
    /// Read token, from `SANITY_READ_TOKEN` only.
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            project_id: None,
            dataset: None,
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            token: None,
        }
    }
}

impl CmsConfig {
    /// Project and dataset, when the CMS is enabled and both are set.
    pub fn target(&self) -> Option<(&str, &str)> {
        if !self.enabled {
            return None;
        }
        let project_id = self.project_id.as_deref().filter(|s| !s.trim().is_empty())?;
        let dataset = self.dataset.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((project_id, dataset))
    }
}

/// Listing sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    pub latest_posts: usize,
    pub latest_issues: usize,
    pub cover_lines: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            latest_posts: 12,
            latest_issues: 6,
            cover_lines: MAX_COVER_LINES,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel page-rendering workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Body text.
    pub text: String,
    /// Deks, bylines, dates.
    pub text_muted: String,
    /// Hairlines between sections and around cards.
    pub rule: String,
    /// Links and highlights. Publication pages replace it with the
    /// publication's own accent.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#f4efe6".to_string(),
            text: "#161412".to_string(),
            text_muted: "#6b645b".to_string(),
            rule: "#d8cfc1".to_string(),
            accent: "#c2410c".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#12110f".to_string(),
            text: "#f1ece4".to_string(),
            text_muted: "#a39b90".to_string(),
            rule: "#37322c".to_string(),
            accent: "#f97316".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, without looking at
/// the environment.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_file_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Load config from the content root and apply environment overrides.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let mut config = load_file_config(root)?;
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Stackbound Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the content root (next to publications/, issues/ and
# posts/). Unknown keys will cause an error.

# Site name, used in page titles and the site-wide RSS feed.
title = "Stackbound Press"

# One-line description for the home page and the site-wide RSS feed.
description = "Issues and articles from the Stackbound imprint."

# Absolute origin for links in RSS feeds, e.g. "https://press.example.com".
# Leave empty for root-relative links.
base_url = ""

# ---------------------------------------------------------------------------
# Headless CMS
# ---------------------------------------------------------------------------
[cms]
# Read publications, issues and posts from the CMS instead of local files.
# Needs project_id and dataset too. SET_SANITY_ENABLED overrides this.
enabled = false

# Project and dataset. SANITY_PROJECT_ID / SANITY_DATASET override these.
# project_id = "abc123"
# dataset = "production"

# Dated API version.
api_version = "2024-01-01"

# Query the CDN edge instead of the live API.
use_cdn = true

# The read token is taken from SANITY_READ_TOKEN and never from this file.

# ---------------------------------------------------------------------------
# Listings
# ---------------------------------------------------------------------------
[listing]
# Posts on the home page.
latest_posts = 12

# Locked issues on the home page.
latest_issues = 6

# Maximum cover lines per issue (1-6).
cover_lines = 6

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#f4efe6"
text = "#161412"
text_muted = "#6b645b"    # Deks, bylines, dates
rule = "#d8cfc1"          # Hairlines and card borders
accent = "#c2410c"        # Links; publication pages use their own accent

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#12110f"
text = "#f1ece4"
text_muted = "#a39b90"
rule = "#37322c"
accent = "#f97316"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel page-rendering workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --rule: {light_rule};
    --accent: {light_accent};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --rule: {dark_rule};
        --accent: {dark_accent};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_rule = colors.light.rule,
        light_accent = colors.light.accent,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_rule = colors.dark.rule,
        dark_accent = colors.dark.accent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Stackbound Press");
        assert_eq!(config.listing.latest_posts, 12);
        assert_eq!(config.listing.latest_issues, 6);
        assert_eq!(config.listing.cover_lines, 6);
        assert_eq!(config.cms.api_version, "2024-01-01");
        assert!(config.cms.use_cdn);
        assert!(!config.cms.enabled);
        assert_eq!(config.colors.light.background, "#f4efe6");
        assert_eq!(config.colors.dark.background, "#12110f");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
title = "Ops Weekly"

[colors.light]
accent = "#0055aa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.title, "Ops Weekly");
        assert_eq!(config.colors.light.accent, "#0055aa");
        // Defaults preserved
        assert_eq!(config.colors.light.text, "#161412");
        assert_eq!(config.listing.latest_posts, 12);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[listing]\nlatest_post = 3\n");
        assert!(result.is_err());
        let result: Result<SiteConfig, _> = toml::from_str("[cms]\ntoken = \"secret\"\n");
        assert!(result.is_err(), "token must not be accepted from the file");
    }

    #[test]
    fn origin_trims_trailing_slash() {
        let config = SiteConfig {
            base_url: "https://press.example.com/".into(),
            ..SiteConfig::default()
        };
        assert_eq!(config.origin(), "https://press.example.com");
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_rejects_zero_listing() {
        let mut config = SiteConfig::default();
        config.listing.latest_posts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_too_many_cover_lines() {
        let mut config = SiteConfig::default();
        config.listing.cover_lines = 7;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_relative_base_url() {
        let mut config = SiteConfig::default();
        config.base_url = "press.example.com".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.base_url = "https://press.example.com".into();
        assert!(config.validate().is_ok());
    }

    // =========================================================================
    // Environment overrides
    // =========================================================================

    #[test]
    fn env_enables_cms() {
        for value in ["1", "true", "YES", " on "] {
            let mut config = SiteConfig::default();
            config.apply_env(env(&[(ENV_CMS_ENABLED, value)]));
            assert!(config.cms.enabled, "{value:?} should enable the CMS");
        }
    }

    #[test]
    fn env_other_values_disable_cms() {
        let mut config = SiteConfig::default();
        config.cms.enabled = true;
        config.apply_env(env(&[(ENV_CMS_ENABLED, "maybe")]));
        assert!(!config.cms.enabled);
    }

    #[test]
    fn env_unset_keeps_file_value() {
        let mut config = SiteConfig::default();
        config.cms.enabled = true;
        config.cms.project_id = Some("file".into());
        config.apply_env(env(&[]));
        assert!(config.cms.enabled);
        assert_eq!(config.cms.project_id.as_deref(), Some("file"));
        assert_eq!(config.cms.token, None);
    }

    #[test]
    fn env_sets_target_and_token() {
        let mut config = SiteConfig::default();
        config.apply_env(env(&[
            (ENV_CMS_ENABLED, "true"),
            (ENV_CMS_PROJECT_ID, "abc123"),
            (ENV_CMS_DATASET, "production"),
            (ENV_CMS_TOKEN, "sk-read"),
        ]));
        assert_eq!(config.cms.target(), Some(("abc123", "production")));
        assert_eq!(config.cms.token.as_deref(), Some("sk-read"));
    }

    #[test]
    fn cms_target_needs_project_and_dataset() {
        let mut cms = CmsConfig {
            enabled: true,
            project_id: Some("abc123".into()),
            ..CmsConfig::default()
        };
        assert_eq!(cms.target(), None);
        cms.dataset = Some("production".into());
        assert_eq!(cms.target(), Some(("abc123", "production")));
        cms.enabled = false;
        assert_eq!(cms.target(), None);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_file_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_file_config(tmp.path()).unwrap();
        assert_eq!(config.title, "Stackbound Press");
        assert_eq!(config.colors.dark.background, "#12110f");
    }

    #[test]
    fn load_file_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
base_url = "https://press.example.com"

[listing]
latest_posts = 3

[cms]
project_id = "abc123"
"##,
        )
        .unwrap();
        let config = load_file_config(tmp.path()).unwrap();
        assert_eq!(config.base_url, "https://press.example.com");
        assert_eq!(config.listing.latest_posts, 3);
        assert_eq!(config.listing.latest_issues, 6);
        assert_eq!(config.cms.project_id.as_deref(), Some("abc123"));
        assert_eq!(config.cms.api_version, "2024-01-01");
    }

    #[test]
    fn load_file_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        let result = load_file_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_file_config_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[listing]\ncover_lines = 0\n").unwrap();
        let result = load_file_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        assert_eq!(effective_threads(&config), cores);
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"latest_posts = 12"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"latest_posts = 4"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("latest_posts").unwrap().as_integer(), Some(4));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[listing]
latest_posts = 12
latest_issues = 6
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[listing]
latest_issues = 2
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let listing = merged.get("listing").unwrap();
        assert_eq!(listing.get("latest_posts").unwrap().as_integer(), Some(12));
        assert_eq!(listing.get("latest_issues").unwrap().as_integer(), Some(2));
    }

    // =========================================================================
    // stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.title, defaults.title);
        assert_eq!(config.description, defaults.description);
        assert_eq!(config.cms.api_version, defaults.cms.api_version);
        assert_eq!(config.listing.cover_lines, defaults.listing.cover_lines);
        assert_eq!(config.colors.light.accent, defaults.colors.light.accent);
        assert_eq!(config.colors.dark.rule, defaults.colors.dark.rule);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        for section in ["cms", "listing", "colors", "processing"] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.accent = "#0055aa".to_string();
        let css = generate_color_css(&colors);
        assert!(css.contains("--accent: #0055aa"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
        assert!(css.contains("--rule: #37322c"));
    }
}
