//! Failure-record side channel.
//!
//! Terminal query failures are handed to a [`FailureSink`] for external
//! persistence. The sink is fire-and-forget relative to the query outcome:
//! its own failure is swallowed with a warning by the orchestrator, never
//! re-raised, and never changes an already-decided outcome.

use async_trait::async_trait;
use rucq_core::FailureKind;
use serde::Serialize;

/// Structured record of one terminal failure.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    /// Reporting component, e.g. `"consulta-sri"`.
    pub component: &'static str,
    pub ruc: String,
    pub kind: FailureKind,
    pub message: String,
    /// Internal error variant name, the closest thing to a stack trace the
    /// taxonomy carries.
    pub error_type: &'static str,
}

/// Narrow persistence seam for failure records.
#[async_trait]
pub trait FailureSink: Send + Sync {
    async fn record_failure(&self, record: FailureRecord) -> anyhow::Result<()>;
}

/// Sink that emits the record as a structured tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFailureSink;

#[async_trait]
impl FailureSink for LogFailureSink {
    async fn record_failure(&self, record: FailureRecord) -> anyhow::Result<()> {
        tracing::error!(
            component = record.component,
            ruc = %record.ruc,
            kind = record.kind.as_str(),
            error_type = record.error_type,
            message = %record.message,
            "query failure recorded"
        );
        Ok(())
    }
}

/// Sink that drops records, for callers that handle reporting themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl FailureSink for NullSink {
    async fn record_failure(&self, _record: FailureRecord) -> anyhow::Result<()> {
        Ok(())
    }
}
