use super::{
    engine::ProductionMetricsEngine,
    state::{BatchAggregate, Confirmation, ConfirmationRequest},
};
use crate::{
    error::{AquaforgeError, UnavailableReason},
    logger::{LogSink, ObservationLogger},
};
use aquaforge_schemas::{
    alert::Alert,
    batch::{Batch, BatchStatus},
    observation::Observation,
    pond::Pond,
    treatment::BioremediationTreatment,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{info, warn};

/// Result of a committed confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReceipt {
    pub batch_id: String,
    pub version: u64,
    pub population_after: u64,
    pub alerts_raised: usize,
}

/// In-memory farm records: the persistence adapter around `ProductionMetricsEngine`.
///
/// `commit` is the single place batches are mutated by observations. It applies the version
/// check, population write, observation insert and alert insert together, or none of them.
pub struct BatchLedger {
    pub(super) ponds: HashMap<String, Pond>,
    pub(super) batches: HashMap<String, BatchAggregate>,
    /// Per batch, ordered by record date then insertion.
    pub(super) observations: HashMap<String, Vec<Observation>>,
    pub(super) alerts: Vec<Alert>,
    pub(super) treatments: Vec<BioremediationTreatment>,
    pub(super) engine: ProductionMetricsEngine,
    pub(super) logger: Option<ObservationLogger<LogSink>>,
}

impl BatchLedger {
    pub fn new(engine: ProductionMetricsEngine) -> Self {
        Self {
            ponds: HashMap::new(),
            batches: HashMap::new(),
            observations: HashMap::new(),
            alerts: Vec::new(),
            treatments: Vec::new(),
            engine,
            logger: None,
        }
    }

    /// Every later commit is written to `logger` before any state changes.
    pub fn set_observation_logger(&mut self, logger: ObservationLogger<LogSink>) {
        self.logger = Some(logger);
    }

    pub fn add_pond(&mut self, pond: Pond) -> Option<Pond> {
        self.ponds.insert(pond.pond_id.clone(), pond)
    }

    pub fn pond(&self, pond_id: &str) -> Option<&Pond> {
        self.ponds.get(pond_id)
    }

    pub fn register_batch(&mut self, batch: Batch) -> Result<(), AquaforgeError> {
        if !self.ponds.contains_key(&batch.pond_id) {
            return Err(AquaforgeError::PondNotFound(batch.pond_id));
        }
        if self.batches.contains_key(&batch.batch_id) {
            return Err(AquaforgeError::DuplicateBatch(batch.batch_id));
        }
        if batch.initial_population == 0 {
            return Err(AquaforgeError::measurement("initial_population", 0.0));
        }
        if batch.current_population > batch.initial_population {
            return Err(AquaforgeError::measurement(
                "current_population",
                batch.current_population as f64,
            ));
        }
        self.batches
            .insert(batch.batch_id.clone(), BatchAggregate::new(batch));
        Ok(())
    }

    pub fn batch(&self, batch_id: &str) -> Option<&Batch> {
        self.batches.get(batch_id).map(|a| &a.batch)
    }

    pub fn batches(&self) -> impl Iterator<Item = &Batch> {
        self.batches.values().map(|a| &a.batch)
    }

    /// A copy of the batch and its current version, the precondition for `confirm`.
    pub fn snapshot(&self, batch_id: &str) -> Result<BatchAggregate, AquaforgeError> {
        self.batches
            .get(batch_id)
            .cloned()
            .ok_or_else(|| AquaforgeError::unavailable(batch_id, UnavailableReason::Missing))
    }

    pub fn close_batch(&mut self, batch_id: &str, end_date: NaiveDate) -> Result<(), AquaforgeError> {
        let aggregate = self
            .batches
            .get_mut(batch_id)
            .ok_or_else(|| AquaforgeError::unavailable(batch_id, UnavailableReason::Missing))?;
        if !aggregate.batch.is_active() {
            return Err(AquaforgeError::unavailable(batch_id, UnavailableReason::Closed));
        }
        aggregate.batch.status = BatchStatus::Closed;
        aggregate.batch.end_date = Some(end_date);
        aggregate.version += 1;
        info!(batch_id, %end_date, "batch closed");
        Ok(())
    }

    pub fn observations(&self, batch_id: &str) -> &[Observation] {
        self.observations
            .get(batch_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The most recent observation dated on or before `record_date`.
    pub fn previous_observation(&self, batch_id: &str, record_date: NaiveDate) -> Option<&Observation> {
        self.observations(batch_id)
            .iter()
            .rev()
            .find(|o| o.record_date <= record_date)
    }

    /// Computes a confirmation against the batch as it is now, without writing anything.
    pub fn prepare(&self, request: ConfirmationRequest) -> Result<Confirmation, AquaforgeError> {
        let snapshot = self.snapshot(&request.batch_id)?;
        let previous = self.previous_observation(&request.batch_id, request.record_date);
        self.engine.confirm(request, &snapshot, previous)
    }

    /// Applies a prepared confirmation.
    ///
    /// # Errors
    ///
    /// `VersionConflict` when the batch changed after the confirmation was prepared; the
    /// caller should prepare again from a fresh snapshot. `InvalidPopulationUpdate` when the
    /// confirmation would not start from the batch's current population or would raise it.
    /// Nothing is written on error.
    pub fn commit(&mut self, confirmation: Confirmation) -> Result<CommitReceipt, AquaforgeError> {
        let batch_id = confirmation.observation.batch_id.clone();
        let aggregate = self
            .batches
            .get_mut(&batch_id)
            .ok_or_else(|| AquaforgeError::unavailable(&batch_id, UnavailableReason::Missing))?;

        if aggregate.version != confirmation.expected_version {
            warn!(
                batch_id = %batch_id,
                expected = confirmation.expected_version,
                actual = aggregate.version,
                "stale confirmation rejected"
            );
            return Err(AquaforgeError::VersionConflict {
                batch_id,
                expected: confirmation.expected_version,
                actual: aggregate.version,
            });
        }
        if !aggregate.batch.is_active() {
            return Err(AquaforgeError::unavailable(&batch_id, UnavailableReason::Closed));
        }

        // Population may only move down, starting from the value the batch holds now.
        let current = aggregate.batch.current_population;
        let before = confirmation.population_before;
        let population_after = confirmation.population_after();
        let update_matches = confirmation
            .population_update
            .map_or(true, |u| u.population_before == before);
        if before != current || population_after > before || !update_matches {
            return Err(AquaforgeError::InvalidPopulationUpdate {
                batch_id,
                current,
                before,
                after: population_after,
            });
        }

        if let Some(logger) = self.logger.as_mut() {
            logger.log_confirmation(&confirmation)?;
        }

        // Infallible from here on.
        aggregate.batch.current_population = population_after;
        aggregate.version += 1;
        let version = aggregate.version;

        let alerts_raised = confirmation.alerts.len();
        let record_date = confirmation.observation.record_date;
        let records = self.observations.entry(batch_id.clone()).or_default();
        let position = records.partition_point(|o| o.record_date <= record_date);
        records.insert(position, confirmation.observation);
        self.alerts.extend(confirmation.alerts);

        info!(
            batch_id = %batch_id,
            %record_date,
            version,
            population_after,
            alerts_raised,
            "observation confirmed"
        );

        Ok(CommitReceipt {
            batch_id,
            version,
            population_after,
            alerts_raised,
        })
    }

    pub fn confirm(&mut self, request: ConfirmationRequest) -> Result<CommitReceipt, AquaforgeError> {
        let confirmation = self.prepare(request)?;
        self.commit(confirmation)
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn unread_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| !a.is_read)
    }

    /// Returns false when there is no alert at `index`.
    pub fn mark_alert_read(&mut self, index: usize) -> bool {
        match self.alerts.get_mut(index) {
            Some(alert) => {
                alert.is_read = true;
                true
            }
            None => false,
        }
    }

    /// Marks every unread alert as read and returns how many changed.
    pub fn mark_all_alerts_read(&mut self) -> usize {
        let mut changed = 0;
        for alert in self.alerts.iter_mut().filter(|a| !a.is_read) {
            alert.is_read = true;
            changed += 1;
        }
        changed
    }

    pub fn add_treatment(&mut self, treatment: BioremediationTreatment) -> Result<(), AquaforgeError> {
        if !self.ponds.contains_key(&treatment.pond_id) {
            return Err(AquaforgeError::PondNotFound(treatment.pond_id));
        }
        if !(treatment.dose_liters.is_finite() && treatment.dose_liters >= 0.0) {
            return Err(AquaforgeError::measurement("dose_liters", treatment.dose_liters));
        }
        for (field, value) in [
            ("ammonia_before", treatment.ammonia_before),
            ("ammonia_after", treatment.ammonia_after),
        ] {
            if let Some(value) = value {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(AquaforgeError::measurement(field, value));
                }
            }
        }
        self.treatments.push(treatment);
        Ok(())
    }

    pub fn treatments(&self) -> &[BioremediationTreatment] {
        &self.treatments
    }
}
