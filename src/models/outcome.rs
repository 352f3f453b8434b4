use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProcessingError;

/// What a stage does when a record or city fails after retries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole run with the first persistent error
    Abort,
    /// Drop the failing record or city and report it
    #[default]
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::Skip),
            other => Err(ProcessingError::Config(format!(
                "Unknown failure policy '{}', expected 'abort' or 'skip'",
                other
            ))),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Geocoding,
    Weather,
}

/// One record or city a stage skipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub subject: String,
    pub message: String,
}

/// Items a stage completed plus the ones it skipped
#[derive(Debug, Clone)]
pub struct StageOutput<T> {
    pub completed: Vec<T>,
    pub failures: Vec<StageFailure>,
}

impl<T> StageOutput<T> {
    /// Split per-item outcomes according to the failure policy.
    ///
    /// Under `Abort` the first error in input order is returned.
    pub fn collect<I>(outcomes: I, stage: Stage, policy: FailurePolicy) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (String, crate::Result<T>)>,
    {
        let mut completed = Vec::new();
        let mut failures = Vec::new();

        for (subject, outcome) in outcomes {
            match outcome {
                Ok(item) => completed.push(item),
                Err(e) if policy == FailurePolicy::Abort => return Err(e),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", subject, e);
                    failures.push(StageFailure {
                        stage,
                        subject,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            completed,
            failures,
        })
    }
}
