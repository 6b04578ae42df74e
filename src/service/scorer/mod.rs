//! Scorer adapters.
//!
//! A scorer runs an external page-scoring engine against one URL under one
//! device profile and normalizes the output into a [`ScoreReport`].
//! The production implementation is [`LighthouseScorer`].

mod lighthouse;

pub use lighthouse::{LighthouseReport, LighthouseScorer};

use async_trait::async_trait;

use crate::domain::models::{DeviceProfile, ScoreReport};
use crate::error::Result;

/// Strategy trait for page scoring.
///
/// Implementations must release any browser they start before returning,
/// whether scoring succeeded or not.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Score a single URL under the given device profile.
    async fn score(&self, url: &str, profile: DeviceProfile) -> Result<ScoreReport>;

    /// Human-readable name for this scorer.
    fn name(&self) -> &'static str;
}
