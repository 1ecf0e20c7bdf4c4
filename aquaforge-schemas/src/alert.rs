use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of conditions the alert evaluator can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowOxygen,
    HighAmmonia,
    HighMortality,
    HighFca,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowOxygen => "low_oxygen",
            AlertType::HighAmmonia => "high_ammonia",
            AlertType::HighMortality => "high_mortality",
            AlertType::HighFca => "high_fca",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertType::LowOxygen => "Oxigeno bajo",
            AlertType::HighAmmonia => "Amonio alto",
            AlertType::HighMortality => "Mortalidad alta",
            AlertType::HighFca => "FCA elevado",
        }
    }

    /// Water-quality alerts that a bioremediation treatment can address.
    pub fn is_bioremediation_opportunity(&self) -> bool {
        matches!(self, AlertType::LowOxygen | AlertType::HighAmmonia)
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    /// Display grouping only. The pond may no longer exist.
    pub pond_id: Option<String>,
    pub batch_id: Option<String>,
}
