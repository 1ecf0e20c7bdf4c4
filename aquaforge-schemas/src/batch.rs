use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    #[default]
    Active,
    Closed,
}

/// One production cycle of animals stocked in a pond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: String,
    pub pond_id: String,
    /// Stocked population. Never changes after creation.
    pub initial_population: u64,
    /// Living population after all confirmed mortality reports.
    pub current_population: u64,
    #[serde(default)]
    pub status: BatchStatus,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Batch {
    pub fn new(
        batch_id: impl Into<String>,
        pond_id: impl Into<String>,
        initial_population: u64,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            batch_id: batch_id.into(),
            pond_id: pond_id.into(),
            initial_population,
            current_population: initial_population,
            status: BatchStatus::Active,
            start_date,
            end_date: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == BatchStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_batch_starts_active_at_full_population() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let batch = Batch::new("B-01", "P-01", 10_000, start);
        assert_eq!(batch.current_population, 10_000);
        assert!(batch.is_active());
        assert_eq!(batch.end_date, None);
    }

    #[test]
    fn status_defaults_to_active_when_omitted() {
        let yaml = "batch_id: B-02\npond_id: P-01\ninitial_population: 500\ncurrent_population: 480\nstart_date: 2024-01-15\n";
        let batch: Batch = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(batch.status, BatchStatus::Active);
        assert_eq!(batch.current_population, 480);
    }
}
