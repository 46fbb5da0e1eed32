use std::path::PathBuf;

/// Runtime configuration for the RUC query pipeline.
///
/// All knobs have defaults matching the live SRI portal; see
/// [`crate::config::load_app_config`] for the env vars that override them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Origin of the SRI portal, no trailing slash.
    pub portal_base_url: String,
    /// User-Agent presented by the browser session.
    pub user_agent: String,
    /// Timeout for the entry-page navigation, in milliseconds.
    pub nav_timeout_ms: u64,
    /// Fixed wait between challenge re-checks, in seconds.
    pub poll_interval_secs: u64,
    /// Maximum challenge re-checks before giving up with `captcha_required`.
    pub poll_max_attempts: u32,
    /// Where a human can resolve a challenge hit on the taxpayer fetch.
    pub taxpayer_resolution_url: String,
    /// Where a human can resolve a challenge hit on the establishments fetch.
    pub locations_resolution_url: String,
    /// Run the browser headless. Off by default: the recovery protocol
    /// assumes a human can see the page.
    pub headless: bool,
    /// Explicit Chromium binary; when unset, discovery runs through the
    /// usual locations.
    pub chromium_path: Option<PathBuf>,
    pub log_level: String,
}
