pub mod challenge;
pub mod endpoints;
pub mod error;
pub mod normalize;
pub mod poll;
pub mod query;
pub mod report;
pub mod session;
pub mod types;

pub use challenge::{classify, ChallengeState};
pub use error::ScraperError;
pub use query::{QueryOutcome, QueryRunner};
pub use report::{FailureRecord, FailureSink, LogFailureSink, NullSink};
pub use session::{ChromiumSessionProvider, FetchOutcome, RucSession, SessionProvider};
