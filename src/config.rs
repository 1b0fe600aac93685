//! Configuration for audit behavior and scoring

use crate::error::{AuditError, Result};
use crate::types::{CheckMeta, Grade};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Default user agent sent with every request: `name/version (repository)`
pub const DEFAULT_USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_REPOSITORY"),
    ")"
);

/// Main configuration for the audit process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Network configuration
    pub network: NetworkConfig,
    /// Check ids to run (`None` runs the whole registry)
    pub checks: Option<Vec<String>>,
    /// Scoring and grading configuration
    pub scoring: ScoringConfig,
}

/// Network configuration for resource fetches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// User-Agent header value
    pub user_agent: String,
}

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Overall score at or above which a site passes
    pub pass_threshold: u8,
    /// Grade bands
    pub grades: GradeScale,
    /// Per-check weight overrides keyed by check id
    pub weight_overrides: HashMap<String, u32>,
}

/// Ordered list of grade bands, highest minimum first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeScale(Vec<Grade>);

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl NetworkConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 70,
            grades: GradeScale::default(),
            weight_overrides: HashMap::new(),
        }
    }
}

impl ScoringConfig {
    /// Apply any weight override for `meta`
    pub fn effective_meta(&self, meta: CheckMeta) -> CheckMeta {
        match self.weight_overrides.get(meta.id) {
            Some(&weight) => CheckMeta { weight, ..meta },
            None => meta,
        }
    }

    /// Whether a score counts as passing
    pub fn passes(&self, score: u8) -> bool {
        score >= self.pass_threshold
    }
}

impl Default for GradeScale {
    fn default() -> Self {
        Self(vec![
            Grade::new(90, "Excellent", "green"),
            Grade::new(70, "Good", "yellow"),
            Grade::new(50, "Fair", "orange"),
            Grade::new(0, "Poor", "red"),
        ])
    }
}

impl GradeScale {
    /// Create a scale from bands, validating ordering
    pub fn new(bands: Vec<Grade>) -> Result<Self> {
        let scale = Self(bands);
        scale.validate()?;
        Ok(scale)
    }

    /// Bands in descending order
    pub fn bands(&self) -> &[Grade] {
        &self.0
    }

    /// Ensure every score in 0..=100 resolves to exactly one band
    pub fn validate(&self) -> Result<()> {
        let last = self
            .0
            .last()
            .ok_or_else(|| AuditError::config("Grade scale must contain at least one band"))?;

        if last.min != 0 {
            return Err(AuditError::config(format!(
                "Lowest grade band \"{}\" must start at 0, got {}",
                last.label, last.min
            )));
        }

        for pair in self.0.windows(2) {
            if pair[0].min <= pair[1].min {
                return Err(AuditError::config(format!(
                    "Grade bands must be sorted descending: \"{}\" ({}) before \"{}\" ({})",
                    pair[0].label, pair[0].min, pair[1].label, pair[1].min
                )));
            }
        }

        if let Some(top) = self.0.first().filter(|g| g.min > 100) {
            return Err(AuditError::config(format!(
                "Grade band \"{}\" has minimum {} above 100",
                top.label, top.min
            )));
        }

        Ok(())
    }
}

impl AuditConfig {
    /// Create a new builder for AuditConfig
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AuditConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.network.timeout_ms == 0 {
            return Err(AuditError::config("Timeout must be greater than 0 ms"));
        }

        if self.scoring.pass_threshold > 100 {
            return Err(AuditError::config(format!(
                "Pass threshold must be within 0-100, got {}",
                self.scoring.pass_threshold
            )));
        }

        if let Some((id, _)) = self.scoring.weight_overrides.iter().find(|(_, w)| **w == 0) {
            return Err(AuditError::config(format!(
                "Weight override for \"{}\" must be positive",
                id
            )));
        }

        self.scoring.grades.validate()
    }
}

/// Builder for AuditConfig
#[derive(Default)]
pub struct AuditConfigBuilder {
    network: Option<NetworkConfig>,
    checks: Option<Vec<String>>,
    scoring: Option<ScoringConfig>,
    timeout_ms: Option<u64>,
}

impl AuditConfigBuilder {
    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn checks<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checks = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = Some(scoring);
        self
    }

    pub fn build(self) -> AuditConfig {
        let mut network = self.network.unwrap_or_default();
        if let Some(timeout_ms) = self.timeout_ms {
            network.timeout_ms = timeout_ms;
        }

        AuditConfig {
            network,
            checks: self.checks,
            scoring: self.scoring.unwrap_or_default(),
        }
    }
}
