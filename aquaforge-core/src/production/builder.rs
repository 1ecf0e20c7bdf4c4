use super::{engine::ProductionMetricsEngine, ledger::BatchLedger};
use crate::{alerts::AlertEvaluator, error::AquaforgeError, logger::ObservationLogger};
use aquaforge_schemas::{
    batch::Batch, calibration::AlertThresholds, pond::Pond, treatment::BioremediationTreatment,
};

/// A fluent builder for constructing a `BatchLedger`.
///
/// Ponds are registered before batches and treatments, so load order in the source files
/// does not matter.
#[derive(Default)]
pub struct LedgerBuilder {
    ponds: Vec<Pond>,
    batches: Vec<Batch>,
    treatments: Vec<BioremediationTreatment>,
    alert_thresholds: Option<AlertThresholds>,
    log_path: Option<String>,
}

impl LedgerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ponds(mut self, ponds: Vec<Pond>) -> Self {
        self.ponds = ponds;
        self
    }

    pub fn with_batches(mut self, batches: Vec<Batch>) -> Self {
        self.batches = batches;
        self
    }

    pub fn with_treatments(mut self, treatments: Vec<BioremediationTreatment>) -> Self {
        self.treatments = treatments;
        self
    }

    /// Overrides the default alert thresholds.
    pub fn with_alert_thresholds(mut self, thresholds: AlertThresholds) -> Self {
        self.alert_thresholds = Some(thresholds);
        self
    }

    /// Writes every committed confirmation to the specified CSV file.
    pub fn with_observation_logging_to_file(mut self, path: &str) -> Self {
        self.log_path = Some(path.to_string());
        self
    }

    /// # Errors
    ///
    /// Fails on invalid thresholds, an unwritable log path, or any batch or treatment the
    /// ledger refuses to register.
    pub fn build(self) -> Result<BatchLedger, AquaforgeError> {
        let evaluator = match self.alert_thresholds {
            Some(thresholds) => AlertEvaluator::new(thresholds)?,
            None => AlertEvaluator::standard(),
        };
        let mut ledger = BatchLedger::new(ProductionMetricsEngine::new(evaluator));

        if let Some(path) = self.log_path {
            let logger =
                ObservationLogger::new(&path).map_err(|e| AquaforgeError::FileIO(path.clone(), e))?;
            ledger.set_observation_logger(logger);
        }

        for pond in self.ponds {
            ledger.add_pond(pond);
        }
        for batch in self.batches {
            ledger.register_batch(batch)?;
        }
        for treatment in self.treatments {
            ledger.add_treatment(treatment)?;
        }
        Ok(ledger)
    }
}
