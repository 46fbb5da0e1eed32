//! Classification of response bodies as bot-challenge pages.
//!
//! The portal interposes two kinds of block: a reCAPTCHA widget and an
//! explicit access-denial page ("The requested URL was rejected"). Both are
//! detected by fixed marker substrings; no parsing, no I/O.

/// Marker substrings whose presence flags a body as challenged.
const CHALLENGE_MARKERS: &[&str] = &["recaptcha", "g-recaptcha", "The requested URL was rejected"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    Clear,
    Challenged,
}

/// Classifies a response body or page snapshot.
///
/// Conservative by design: any marker match means `Challenged`, even if the
/// rest of the body looks like valid data — a partially rendered challenge
/// page cannot be trusted.
#[must_use]
pub fn classify(body: &str) -> ChallengeState {
    if CHALLENGE_MARKERS.iter().any(|marker| body.contains(marker)) {
        ChallengeState::Challenged
    } else {
        ChallengeState::Clear
    }
}
