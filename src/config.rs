//! Report configuration: project root, classification cutlines and ignored
//! path fragments.

use serde::Serialize;

use crate::classify::{classify, Classification};
use crate::error::{CovtreeError, Result};
use crate::model::Counts;

pub const DEFAULT_SAFE: f64 = 70.0;
pub const DEFAULT_WARNING: f64 = 40.0;

/// Percentage thresholds used to classify coverage health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cutlines {
    pub safe: f64,
    pub warning: f64,
}

impl Default for Cutlines {
    fn default() -> Self {
        Self {
            safe: DEFAULT_SAFE,
            warning: DEFAULT_WARNING,
        }
    }
}

impl Cutlines {
    /// Classify a node's counts. Nodes without statements stay unclassified.
    #[must_use]
    pub fn classify(&self, counts: &Counts) -> Option<Classification> {
        if counts.statements == 0 {
            return None;
        }
        Some(classify(counts.percentage(), self.safe, self.warning))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path prefix every reported file lives under. `.` accepts every path.
    pub root: String,
    pub cutlines: Cutlines,
    /// Path fragments; a file whose relative path contains one is dropped.
    pub ignores: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            cutlines: Cutlines::default(),
            ignores: Vec::new(),
        }
    }
}

impl Config {
    /// Reject configurations that would produce a misleading report.
    pub fn validate(&self) -> Result<()> {
        if self.root.trim().is_empty() {
            return Err(CovtreeError::ConfigurationInvalid(
                "root must not be empty".to_string(),
            ));
        }

        let Cutlines { safe, warning } = self.cutlines;
        for (name, value) in [("safe", safe), ("warning", warning)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(CovtreeError::ConfigurationInvalid(format!(
                    "{name} cutline {value} is outside 0-100"
                )));
            }
        }
        if warning > safe {
            return Err(CovtreeError::ConfigurationInvalid(format!(
                "warning cutline {warning} is above safe cutline {safe}"
            )));
        }
        Ok(())
    }
}

/// Parse `safe,warning` cutlines. The first value is the safe cutline and the
/// last the warning cutline, so a single value sets both.
pub fn parse_cutlines(input: &str) -> Result<Cutlines> {
    let frags: Vec<&str> = input.split(',').collect();
    let parse = |frag: &str| {
        frag.parse::<f64>().map_err(|e| {
            CovtreeError::ConfigurationInvalid(format!("cutline '{frag}': {e}"))
        })
    };

    // split always yields at least one fragment
    let safe = parse(frags[0])?;
    let warning = parse(frags[frags.len() - 1])?;
    Ok(Cutlines { safe, warning })
}

/// Parse a comma-separated list of ignored path fragments.
#[must_use]
pub fn parse_ignores(input: &str) -> Vec<String> {
    input
        .split(',')
        .filter(|frag| !frag.is_empty())
        .map(str::to_string)
        .collect()
}
