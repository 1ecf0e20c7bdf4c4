use super::{
    metrics,
    state::{BatchAggregate, Confirmation, ConfirmationRequest, PopulationUpdate},
};
use crate::{
    alerts::{AlertContext, AlertEvaluator},
    error::{AquaforgeError, UnavailableReason},
};
use aquaforge_schemas::observation::{FieldReadings, Observation};

/// Turns a pending observation plus a batch snapshot into a confirmation.
///
/// The engine holds no mutable state: it reads the snapshot it is handed and returns what
/// should be written. Applying the result is the caller's job (see `BatchLedger::commit`).
#[derive(Debug, Clone, Default)]
pub struct ProductionMetricsEngine {
    alerts: AlertEvaluator,
}

impl ProductionMetricsEngine {
    pub fn new(alerts: AlertEvaluator) -> Self {
        Self { alerts }
    }

    pub fn alert_evaluator(&self) -> &AlertEvaluator {
        &self.alerts
    }

    /// # Errors
    ///
    /// `BatchUnavailable` when the snapshot is for another batch or the batch is closed;
    /// `InvalidMeasurement` when a reading is non-finite or physically impossible.
    pub fn confirm(
        &self,
        request: ConfirmationRequest,
        batch: &BatchAggregate,
        previous: Option<&Observation>,
    ) -> Result<Confirmation, AquaforgeError> {
        if batch.batch.batch_id != request.batch_id {
            return Err(AquaforgeError::unavailable(
                &request.batch_id,
                UnavailableReason::Missing,
            ));
        }
        if !batch.batch.is_active() {
            return Err(AquaforgeError::unavailable(
                &request.batch_id,
                UnavailableReason::Closed,
            ));
        }
        validate_readings(&request.readings)?;

        let population_before = batch.batch.current_population;
        let derived = metrics::derive(&request.readings, population_before, previous);

        let population_update = match request.readings.mortality_count {
            Some(dead) if dead > 0 => Some(PopulationUpdate {
                population_before,
                population_after: derived.population_after,
            }),
            _ => None,
        };

        let observation = Observation {
            batch_id: request.batch_id,
            record_date: request.record_date,
            readings: request.readings,
            notes: request.notes,
            calculated_fca: derived.fca,
            calculated_biomass_kg: derived.biomass_kg,
        };

        let context = AlertContext {
            pond_id: Some(batch.batch.pond_id.clone()),
            batch_id: Some(observation.batch_id.clone()),
            created_at: request.recorded_at,
        };
        let alerts = self.alerts.evaluate(&observation, &context);

        Ok(Confirmation {
            observation,
            alerts,
            population_update,
            population_before,
            expected_version: batch.version,
        })
    }
}

fn validate_readings(readings: &FieldReadings) -> Result<(), AquaforgeError> {
    let non_negative = [
        ("feed_kg", readings.feed_kg),
        ("avg_weight_g", readings.avg_weight_g),
        ("oxygen_mg_l", readings.oxygen_mg_l),
        ("ammonia_mg_l", readings.ammonia_mg_l),
        ("nitrite_mg_l", readings.nitrite_mg_l),
        ("nitrate_mg_l", readings.nitrate_mg_l),
    ];
    for (field, value) in non_negative {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(AquaforgeError::measurement(field, value));
            }
        }
    }
    if let Some(temperature) = readings.temperature_c {
        if !temperature.is_finite() {
            return Err(AquaforgeError::measurement("temperature_c", temperature));
        }
    }
    if let Some(ph) = readings.ph {
        if !(0.0..=14.0).contains(&ph) {
            return Err(AquaforgeError::measurement("ph", ph));
        }
    }
    Ok(())
}
