use aquaforge_schemas::{
    alert::Alert,
    batch::Batch,
    observation::{FieldReadings, Observation},
};
use chrono::{DateTime, NaiveDate, Utc};

/// A batch together with the version token it was read at.
///
/// Every committed change to the batch (observation, mortality, closing) bumps the version,
/// so a confirmation computed against an older snapshot can be detected and retried.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAggregate {
    pub batch: Batch,
    pub version: u64,
}

impl BatchAggregate {
    pub fn new(batch: Batch) -> Self {
        Self { batch, version: 0 }
    }
}

/// A pending observation submitted for confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationRequest {
    pub batch_id: String,
    pub record_date: NaiveDate,
    pub readings: FieldReadings,
    pub notes: Option<String>,
    /// Timestamp stamped on raised alerts.
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationUpdate {
    pub population_before: u64,
    pub population_after: u64,
}

/// Everything a confirmation intends to write, computed against one batch version.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub observation: Observation,
    pub alerts: Vec<Alert>,
    pub population_update: Option<PopulationUpdate>,
    pub population_before: u64,
    pub expected_version: u64,
}

impl Confirmation {
    pub fn population_after(&self) -> u64 {
        self.population_update
            .map_or(self.population_before, |u| u.population_after)
    }
}
