use serde::{Deserialize, Serialize};

/// Diff algorithm selection for the line diff engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    Myers,
    Patience,
    Lcs,
}

impl DiffAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffAlgorithm::Myers => "myers",
            DiffAlgorithm::Patience => "patience",
            DiffAlgorithm::Lcs => "lcs",
        }
    }

    pub(crate) fn to_similar(self) -> similar::Algorithm {
        match self {
            DiffAlgorithm::Myers => similar::Algorithm::Myers,
            DiffAlgorithm::Patience => similar::Algorithm::Patience,
            DiffAlgorithm::Lcs => similar::Algorithm::Lcs,
        }
    }
}

impl Default for DiffAlgorithm {
    fn default() -> Self {
        DiffAlgorithm::Myers
    }
}

/// Configuration for the line diff engine
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct DiffConfig {
    #[serde(default)]
    pub algorithm: DiffAlgorithm,
}

/// Configuration for the behavior recorder
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Gap between edit events (ms) beyond which a Wait action is recorded
    #[serde(default = "default_idle_threshold_ms")]
    pub idle_threshold_ms: u64,
    /// Minimum inserted characters for a trigger-key insertion to count as a completion
    #[serde(default = "default_completion_min_chars")]
    pub completion_min_chars: usize,
}

fn default_idle_threshold_ms() -> u64 {
    3000
}

fn default_completion_min_chars() -> usize {
    2
}

impl Default for RecorderConfig {
    fn default() -> Self {
        RecorderConfig {
            idle_threshold_ms: default_idle_threshold_ms(),
            completion_min_chars: default_completion_min_chars(),
        }
    }
}
