//! Chromium-backed session using chromiumoxide.
//!
//! One browser process per session, bound to one query. The portal attributes
//! requests to a real browser client; identical requests from a plain HTTP
//! client are rejected, so every data fetch runs as JS inside the page.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use rucq_core::AppConfig;
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;

use crate::endpoints;
use crate::error::ScraperError;
use crate::session::{FetchOutcome, RucSession, SessionProvider};

/// Locate the Chromium binary.
///
/// Order: explicit configured path, `~/.rucq/chromium/`, system `PATH`,
/// common macOS install location.
#[must_use]
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".rucq/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".rucq/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".rucq/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".rucq/chromium/chrome-linux64/chrome"),
                home.join(".rucq/chromium/chrome"),
            ]
        };
        for candidate in candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Opens one Chromium-backed session per query.
pub struct ChromiumSessionProvider {
    config: AppConfig,
}

impl ChromiumSessionProvider {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvider for ChromiumSessionProvider {
    async fn open_session(&self) -> Result<Box<dyn RucSession>, ScraperError> {
        let chrome_path =
            find_chromium(self.config.chromium_path.as_deref()).ok_or_else(|| {
                ScraperError::Browser {
                    message: "Chromium not found; set RUCQ_CHROMIUM_PATH".to_owned(),
                }
            })?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");
        // Headful unless configured otherwise: the recovery protocol assumes
        // a human can see the challenge page.
        if !self.config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(browser_err)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(browser_err)?;

        // Drain CDP events for the lifetime of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let entry_url = endpoints::entry_url(&self.config.portal_base_url);
        let session = match prepare_page(&browser, &self.config, &entry_url).await {
            Ok(page) => ChromiumSession {
                browser,
                page,
                handler: handler_task,
                entry_url,
                nav_timeout_ms: self.config.nav_timeout_ms,
            },
            Err(error) => {
                // Launch succeeded but setup failed: reap the process before
                // surfacing the error so nothing dangles.
                teardown(browser, handler_task).await;
                return Err(error);
            }
        };

        Ok(Box::new(session))
    }
}

/// Creates the page with a realistic client identity and loads the entry
/// page so the portal's JS sets its cookies and anti-bot tokens.
async fn prepare_page(
    browser: &Browser,
    config: &AppConfig,
    entry_url: &str,
) -> Result<Page, ScraperError> {
    let page = browser.new_page("about:blank").await.map_err(browser_err)?;

    page.set_user_agent(config.user_agent.as_str())
        .await
        .map_err(browser_err)?;

    let headers = Headers::new(json!({
        "Accept": "application/json, text/plain, */*",
        "Accept-Language": "es-ES,es;q=0.9,en;q=0.8",
        "Referer": format!("{}/", config.portal_base_url),
        "Origin": config.portal_base_url.clone(),
    }));
    page.execute(SetExtraHttpHeadersParams::new(headers))
        .await
        .map_err(browser_err)?;

    tracing::debug!(entry_url, "navigating to consultation entry page");
    navigate(&page, entry_url, config.nav_timeout_ms).await?;

    Ok(page)
}

/// One live Chromium page bound to one query.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    entry_url: String,
    nav_timeout_ms: u64,
}

#[async_trait]
impl RucSession for ChromiumSession {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        // JSON-encode the URL so it lands in the page as a safe JS string.
        let quoted = serde_json::to_string(url).unwrap_or_else(|_| format!("\"{url}\""));
        let script = format!(
            r#"(async () => {{
  try {{
    const res = await fetch({quoted}, {{
      method: 'GET',
      headers: {{
        'Accept': 'application/json, text/plain, */*',
        'Accept-Language': 'es-ES,es;q=0.9,en;q=0.8'
      }}
    }});
    return {{ status: res.status, text: await res.text() }};
  }} catch (error) {{
    return {{ error: String((error && error.message) || error) }};
  }}
}})()"#
        );

        let params = match EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
        {
            Ok(params) => params,
            Err(message) => return FetchOutcome::TransportError { message },
        };

        let evaluation = match self.page.evaluate(params).await {
            Ok(evaluation) => evaluation,
            Err(error) => {
                return FetchOutcome::TransportError {
                    message: error.to_string(),
                }
            }
        };

        let reply: InPageFetchReply = match evaluation.into_value() {
            Ok(reply) => reply,
            Err(error) => {
                return FetchOutcome::TransportError {
                    message: format!("in-page fetch reply was unreadable: {error}"),
                }
            }
        };

        match reply.error {
            Some(message) => FetchOutcome::TransportError { message },
            None => FetchOutcome::Success {
                status: reply.status.unwrap_or(0),
                body: reply.text.unwrap_or_default(),
            },
        }
    }

    async fn page_content(&self) -> Result<String, ScraperError> {
        let evaluation = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(browser_err)?;
        evaluation
            .into_value()
            .map_err(|error| ScraperError::Browser {
                message: format!("failed to read page content: {error}"),
            })
    }

    async fn submit_consultation_form(&self, ruc: &str) -> Result<(), ScraperError> {
        // The challenge may have replaced the entry page entirely; reload it
        // before driving the form.
        navigate(&self.page, &self.entry_url, self.nav_timeout_ms).await?;

        let input = self
            .page
            .find_element(r#"input[name="numRuc"]"#)
            .await
            .map_err(browser_err)?;
        input.click().await.map_err(browser_err)?;
        input.type_str(ruc).await.map_err(browser_err)?;

        let button = self
            .page
            .find_element(r#"button[id="btnConsulta"]"#)
            .await
            .map_err(browser_err)?;
        button.click().await.map_err(browser_err)?;

        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        let session = *self;
        if let Err(error) = session.page.close().await {
            tracing::warn!(%error, "page close failed");
        }
        teardown(session.browser, session.handler).await;
        Ok(())
    }
}

/// Closes the browser process and stops the event-drain task. Errors are
/// logged, not surfaced: teardown must never mask the query outcome.
async fn teardown(mut browser: Browser, handler: JoinHandle<()>) {
    if let Err(error) = browser.close().await {
        tracing::warn!(%error, "browser close failed");
    }
    if let Err(error) = browser.wait().await {
        tracing::warn!(%error, "browser process did not exit cleanly");
    }
    handler.abort();
}

async fn navigate(page: &Page, url: &str, timeout_ms: u64) -> Result<(), ScraperError> {
    let goto = tokio::time::timeout(Duration::from_millis(timeout_ms), page.goto(url)).await;
    match goto {
        Ok(Ok(_)) => {
            // Give the portal's JS a chance to settle; a slow frame is not an
            // error here.
            let _ = page.wait_for_navigation().await;
            Ok(())
        }
        Ok(Err(error)) => Err(browser_err(error)),
        Err(_) => Err(ScraperError::Browser {
            message: format!("navigation to {url} timed out after {timeout_ms}ms"),
        }),
    }
}

fn browser_err(error: impl std::fmt::Display) -> ScraperError {
    ScraperError::Browser {
        message: error.to_string(),
    }
}

/// Shape returned by the in-page fetch snippet.
#[derive(Debug, Deserialize)]
struct InPageFetchReply {
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
