use serde::{Deserialize, Serialize};

use crate::ids::JobKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Running,
    Success,
    Error,
    Warning,
}

impl JobStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error | Self::Warning)
    }
}

/// Progress of a long-running job as reported by its progress resource.
///
/// `numerator` never decreases for a given key until a terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub job_key: JobKey,
    pub numerator: u64,
    pub denominator: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default)]
    pub status: JobStatus,
}

fn default_multiplier() -> f64 {
    1.0
}

impl JobProgress {
    pub fn running(job_key: JobKey, numerator: u64, denominator: u64) -> Self {
        Self {
            job_key,
            numerator,
            denominator,
            multiplier: default_multiplier(),
            status: JobStatus::Running,
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    /// All work consumed. A job with no work (`0/0`) is done.
    pub fn is_done(&self) -> bool {
        self.status == JobStatus::Success || self.numerator >= self.denominator
    }

    /// Completed share in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        (self.numerator as f64 / self.denominator as f64).clamp(0.0, 1.0)
    }
}
