//! Session abstraction over a browser-rendered navigation context.
//!
//! Defines the `SessionProvider` and `RucSession` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide). The query state
//! machine depends only on these traits, which keeps it testable with
//! scripted in-memory sessions.

pub mod chromium;

use async_trait::async_trait;

use crate::error::ScraperError;

pub use chromium::ChromiumSessionProvider;

/// Outcome of one in-session fetch. Never partially filled: a non-200 status
/// still arrives as `Success` with the body verbatim; classifying it is the
/// orchestrator's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success { status: u16, body: String },
    TransportError { message: String },
}

/// Opens browser-rendered sessions against the portal.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Opens one navigation context with a realistic client identity and
    /// loads the consultation entry page, letting the portal's JS establish
    /// its cookies and anti-bot tokens.
    async fn open_session(&self) -> Result<Box<dyn RucSession>, ScraperError>;
}

/// One live browser context, exclusively owned by one in-flight query.
#[async_trait]
pub trait RucSession: Send + Sync {
    /// Issues a GET from inside the page, riding the session's trust context
    /// (cookies, tokens, negotiated headers). The same request on an
    /// independent connection is provider-rejected even with identical
    /// headers.
    ///
    /// Transport and in-page failures are captured as
    /// [`FetchOutcome::TransportError`]; nothing escapes this boundary.
    async fn fetch(&self, url: &str) -> FetchOutcome;

    /// Snapshot of the current page DOM, used to re-check for a standing
    /// challenge during the poll window.
    async fn page_content(&self) -> Result<String, ScraperError>;

    /// Drives the entry page's RUC input and submit button, triggering the
    /// provider-side verification flow a human can then complete. Used only
    /// as the manual-resolution fallback after a challenge is detected.
    async fn submit_consultation_form(&self, ruc: &str) -> Result<(), ScraperError>;

    /// Unconditional teardown. Must be called exactly once per open, on
    /// every path.
    async fn close(self: Box<Self>) -> Result<(), ScraperError>;
}
