use serde::Serialize;

/// Coverage health of a node, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Danger,
    Warning,
    Safe,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Danger => "danger",
            Classification::Warning => "warning",
            Classification::Safe => "safe",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a percentage onto a health level.
///
/// Below `warning` is danger, below `safe` is warning, anything else is safe.
/// Callers are expected to pass `warning <= safe`; see `Config::validate`.
#[must_use]
pub fn classify(percentage: f64, safe: f64, warning: f64) -> Classification {
    if percentage < warning {
        Classification::Danger
    } else if percentage < safe {
        Classification::Warning
    } else {
        Classification::Safe
    }
}
