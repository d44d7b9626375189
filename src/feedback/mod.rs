//! Learning from executed routes.
//!
//! Outcomes are turned into immutable [`FeedbackRecord`]s (delay, stop
//! deviation, efficiency) and appended to a log. On demand a linear delay
//! model is fitted on `(distance, estimated time)` and published as a
//! versioned [`ModelSnapshot`]. Route sequencing reads the latest snapshot
//! at the start of a solve; without one it uses plain matrix estimates.
//!
//! Retraining is explicit: call [`FeedbackLearner::retrain`] or
//! [`FeedbackLearner::retrain_in_background`].

mod learner;
mod model;
mod types;

pub use learner::{FeedbackLearner, FeedbackLog, ModelStore};
pub use model::{DelayModel, ModelSnapshot};
pub use types::{delay, deviation_count, efficiency, ExecutedRoute, FeedbackRecord, PerformanceSummary};
