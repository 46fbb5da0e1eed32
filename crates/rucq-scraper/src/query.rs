//! Query orchestration: one RUC in, exactly one result or failure out.
//!
//! Sequences session acquisition, the taxpayer fetch, the establishments
//! fetch, the per-endpoint challenge/poll protocol, normalization, and final
//! assembly. The two endpoints are independent challenge domains: a
//! challenge on one says nothing about the other, and each gets its own
//! poll instance and resolution viewer.
//!
//! Nothing escapes [`QueryRunner::run`] uncaught, and the session is closed
//! exactly once on every path into a terminal state.

use std::sync::Arc;

use chrono::Utc;
use rucq_core::{AppConfig, DatosContribuyente, QueryFailure, QueryStatus, RucQueryResult};

use crate::challenge::{classify, ChallengeState};
use crate::endpoints;
use crate::error::ScraperError;
use crate::normalize::{normalize_contribuyente, normalize_establecimientos};
use crate::poll::{poll_until_clear, PollError, PollPolicy};
use crate::report::{FailureRecord, FailureSink};
use crate::session::{FetchOutcome, RucSession, SessionProvider};
use crate::types::{ConsolidadoContribuyente, EstablecimientoRaw};

/// Component name used in failure records.
const COMPONENT: &str = "consulta-sri";

/// Longest raw-body excerpt carried in an HTTP error message.
const BODY_EXCERPT_MAX: usize = 200;

/// Exactly one of these per query.
#[derive(Debug)]
pub enum QueryOutcome {
    Completed(RucQueryResult),
    Failed(QueryFailure),
}

impl QueryOutcome {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, QueryOutcome::Failed(_))
    }
}

/// Drives the full query state machine against a [`SessionProvider`].
pub struct QueryRunner<P> {
    provider: P,
    poll: PollPolicy,
    base_url: String,
    taxpayer_resolution_url: String,
    locations_resolution_url: String,
    sink: Arc<dyn FailureSink>,
}

impl<P: SessionProvider> QueryRunner<P> {
    #[must_use]
    pub fn new(provider: P, config: &AppConfig, sink: Arc<dyn FailureSink>) -> Self {
        Self {
            provider,
            poll: PollPolicy {
                max_attempts: config.poll_max_attempts,
                interval: std::time::Duration::from_secs(config.poll_interval_secs),
            },
            base_url: config.portal_base_url.clone(),
            taxpayer_resolution_url: config.taxpayer_resolution_url.clone(),
            locations_resolution_url: config.locations_resolution_url.clone(),
            sink,
        }
    }

    /// Runs one query end to end.
    ///
    /// Never panics and never returns an error: every internal failure is
    /// converted into [`QueryOutcome::Failed`] at this boundary, after the
    /// session has been torn down and the failure sink notified.
    pub async fn run(&self, ruc: &str) -> QueryOutcome {
        tracing::info!(ruc, "starting RUC query");

        let session = match self.provider.open_session().await {
            Ok(session) => session,
            Err(error) => return self.fail(ruc, &error).await,
        };

        let result = self.run_in_session(session.as_ref(), ruc).await;

        // Teardown happens before the outcome is decided so no path can leak
        // the browser context; a teardown failure does not change the outcome.
        if let Err(error) = session.close().await {
            tracing::warn!(ruc, %error, "session teardown failed");
        }

        match result {
            Ok(result) => {
                tracing::info!(
                    ruc,
                    estado = ?result.estado,
                    establecimientos = result.establecimientos.len(),
                    razon_social = %result.datos_contribuyente.razon_social,
                    "RUC query completed"
                );
                QueryOutcome::Completed(result)
            }
            Err(error) => self.fail(ruc, &error).await,
        }
    }

    async fn run_in_session(
        &self,
        session: &dyn RucSession,
        ruc: &str,
    ) -> Result<RucQueryResult, ScraperError> {
        tracing::debug!(ruc, "fetching taxpayer record");
        let contribuyente_url = endpoints::contribuyente_url(&self.base_url, ruc);
        let (status, body) = self
            .fetch_past_challenge(
                session,
                ruc,
                &contribuyente_url,
                "contribuyente",
                &self.taxpayer_resolution_url,
            )
            .await?;

        if status != 200 {
            return Err(ScraperError::UnexpectedStatus {
                status,
                body_excerpt: excerpt(&body),
            });
        }

        let registros: Vec<ConsolidadoContribuyente> =
            serde_json::from_str(&body).map_err(|source| ScraperError::Deserialize {
                context: format!("taxpayer record for RUC {ruc}"),
                source,
            })?;

        let Some(contribuyente) = registros.into_iter().next() else {
            tracing::info!(ruc, "registry holds no data for RUC");
            return Ok(RucQueryResult {
                ruc: ruc.to_owned(),
                datos_contribuyente: DatosContribuyente::default(),
                establecimientos: Vec::new(),
                fecha_consulta: Utc::now(),
                estado: QueryStatus::NoData,
            });
        };

        tracing::debug!(ruc, "fetching establishments");
        let establecimientos_url = endpoints::establecimientos_url(&self.base_url, ruc);
        let (est_status, est_body) = self
            .fetch_past_challenge(
                session,
                ruc,
                &establecimientos_url,
                "establecimientos",
                &self.locations_resolution_url,
            )
            .await?;

        // For some taxpayers this endpoint answers non-200 or an empty body
        // instead of `[]`; both mean "no establishments", not an error.
        let establecimientos_raw: Vec<EstablecimientoRaw> =
            if est_status == 200 && !est_body.trim().is_empty() {
                serde_json::from_str(&est_body).map_err(|source| ScraperError::Deserialize {
                    context: format!("establishments for RUC {ruc}"),
                    source,
                })?
            } else {
                tracing::warn!(ruc, status = est_status, "no establishment data returned");
                Vec::new()
            };

        let datos_contribuyente = normalize_contribuyente(contribuyente);
        let establecimientos = normalize_establecimientos(
            establecimientos_raw,
            &datos_contribuyente.razon_social,
            &datos_contribuyente.estado,
        );

        Ok(RucQueryResult {
            ruc: ruc.to_owned(),
            datos_contribuyente,
            establecimientos,
            fecha_consulta: Utc::now(),
            estado: QueryStatus::Success,
        })
    }

    /// Fetches `url` in-session, running the challenge-detect/poll protocol
    /// if the response body is a challenge page.
    ///
    /// On a challenge, the consultation form is submitted so the portal
    /// presents its verification flow, then the page is re-checked at the
    /// poll cadence until a human clears it; `on_clear` re-issues the same
    /// fetch and its outcome stands in for the original.
    async fn fetch_past_challenge(
        &self,
        session: &dyn RucSession,
        ruc: &str,
        url: &str,
        endpoint: &'static str,
        resolution_url: &str,
    ) -> Result<(u16, String), ScraperError> {
        let outcome = session.fetch(url).await;
        let (status, body) = expect_response(outcome)?;

        if classify(&body) == ChallengeState::Clear {
            return Ok((status, body));
        }

        tracing::warn!(
            ruc,
            endpoint,
            resolution_url,
            "bot challenge detected; waiting for manual resolution"
        );
        session.submit_consultation_form(ruc).await?;

        let polled = poll_until_clear(
            &self.poll,
            || async move {
                let content = session.page_content().await?;
                Ok::<ChallengeState, ScraperError>(classify(&content))
            },
            || async move { session.fetch(url).await },
        )
        .await;

        match polled {
            Ok(outcome) => {
                tracing::info!(ruc, endpoint, "challenge cleared; fetch re-issued");
                expect_response(outcome)
            }
            Err(PollError::Timeout) => Err(ScraperError::ChallengeTimeout {
                endpoint,
                resolution_url: resolution_url.to_owned(),
            }),
            Err(PollError::Check(error)) => Err(error),
        }
    }

    /// Converts an internal error into the terminal failure, reporting it
    /// through the sink. Sink failures are swallowed with a warning; they
    /// must not change an already-decided outcome.
    async fn fail(&self, ruc: &str, error: &ScraperError) -> QueryOutcome {
        let failure = QueryFailure::new(error.failure_kind(), error.failure_message());

        let record = FailureRecord {
            component: COMPONENT,
            ruc: ruc.to_owned(),
            kind: failure.error,
            message: failure.message.clone(),
            error_type: error.kind_name(),
        };
        if let Err(sink_error) = self.sink.record_failure(record).await {
            tracing::warn!(ruc, %sink_error, "failed to persist failure record");
        }

        tracing::error!(ruc, kind = failure.error.as_str(), message = %failure.message, "RUC query failed");
        QueryOutcome::Failed(failure)
    }
}

/// Unwraps a fetch outcome, converting transport failures into the terminal
/// transport error (no blind retry: only the challenge path re-fetches).
fn expect_response(outcome: FetchOutcome) -> Result<(u16, String), ScraperError> {
    match outcome {
        FetchOutcome::Success { status, body } => Ok((status, body)),
        FetchOutcome::TransportError { message } => Err(ScraperError::Transport { message }),
    }
}

/// Truncates a raw body for inclusion in an error message.
fn excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_MAX {
        return body.to_owned();
    }
    let mut end = BODY_EXCERPT_MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_passes_short_bodies_through() {
        assert_eq!(excerpt("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let body = "x".repeat(500);
        let cut = excerpt(&body);
        assert_eq!(cut.len(), BODY_EXCERPT_MAX + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let body = "á".repeat(300);
        let cut = excerpt(&body);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= BODY_EXCERPT_MAX + 3);
    }

    #[test]
    fn expect_response_maps_transport_error() {
        let err = expect_response(FetchOutcome::TransportError {
            message: "dns failure".to_owned(),
        })
        .unwrap_err();
        assert!(matches!(err, ScraperError::Transport { .. }));
    }
}
