use rucq_core::FailureKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// No response was obtained from the provider (DNS failure, connection
    /// reset, in-page fetch rejection).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The provider answered with a non-200 status after a clear
    /// (non-challenged) response.
    #[error("unexpected HTTP status {status}: {body_excerpt}")]
    UnexpectedStatus { status: u16, body_excerpt: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The bot challenge persisted past the poll budget on the named
    /// endpoint. Carries the viewer URL where a human can resolve it.
    #[error("challenge unresolved for {endpoint}; resolve it at {resolution_url}")]
    ChallengeTimeout {
        endpoint: &'static str,
        resolution_url: String,
    },

    /// Browser machinery failure: launch, navigation, DOM access.
    #[error("browser error: {message}")]
    Browser { message: String },
}

impl ScraperError {
    /// Maps the internal taxonomy onto the external one reported to callers.
    ///
    /// Only a challenge timeout surfaces as `captcha_required`; every other
    /// variant wraps into `error_general`.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ScraperError::ChallengeTimeout { .. } => FailureKind::CaptchaRequired,
            _ => FailureKind::ErrorGeneral,
        }
    }

    /// Human-facing message for the failure result.
    ///
    /// `captcha_required` gets a remediation message naming the resolution
    /// viewer; the rest carry the technical message.
    #[must_use]
    pub fn failure_message(&self) -> String {
        match self {
            ScraperError::ChallengeTimeout { resolution_url, .. } => format!(
                "Se detectó un CAPTCHA. Por favor, resuélvelo manualmente en {resolution_url}"
            ),
            other => format!("Error al consultar SRI: {other}"),
        }
    }

    /// Stable variant name for structured failure records.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            ScraperError::Transport { .. } => "transport_error",
            ScraperError::UnexpectedStatus { .. } => "http_error",
            ScraperError::Deserialize { .. } => "parse_error",
            ScraperError::ChallengeTimeout { .. } => "captcha_required",
            ScraperError::Browser { .. } => "browser_error",
        }
    }
}
