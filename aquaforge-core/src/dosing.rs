//! Bioremediation dosing: a stepped lookup table from pond volume to dose rate.
//!
//! The rates are an empirical agronomic table and stay a table. Larger ponds get a lower
//! per-m³ rate, but there is no formula connecting the tiers.

use crate::{error::AquaforgeError, geometry};
use aquaforge_schemas::{
    calibration::{default_dose_tiers, DoseTier},
    treatment::BioremediationCalculation,
};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct DoseTable {
    tiers: Vec<DoseTier>,
}

impl DoseTable {
    /// Validates a recalibrated table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCalibration` unless bounds are positive and strictly ascending, the
    /// last tier is unbounded, only the last tier is unbounded, and every rate is a positive
    /// finite number.
    pub fn new(tiers: Vec<DoseTier>) -> Result<Self, AquaforgeError> {
        let last = tiers
            .last()
            .ok_or_else(|| AquaforgeError::InvalidCalibration("dose table is empty".to_string()))?;
        if last.max_volume_m3.is_some() {
            return Err(AquaforgeError::InvalidCalibration(
                "last dose tier must be unbounded".to_string(),
            ));
        }

        let mut previous_bound = 0.0_f64;
        for (i, tier) in tiers.iter().enumerate() {
            if !(tier.dose_rate_l_per_m3.is_finite() && tier.dose_rate_l_per_m3 > 0.0) {
                return Err(AquaforgeError::InvalidCalibration(format!(
                    "dose tier '{}' has invalid rate {}",
                    tier.label, tier.dose_rate_l_per_m3
                )));
            }
            match tier.max_volume_m3 {
                Some(bound) if bound.is_finite() && bound > previous_bound => previous_bound = bound,
                Some(bound) => {
                    return Err(AquaforgeError::InvalidCalibration(format!(
                        "dose tier '{}' bound {} is not above {}",
                        tier.label, bound, previous_bound
                    )))
                }
                None if i + 1 < tiers.len() => {
                    return Err(AquaforgeError::InvalidCalibration(format!(
                        "dose tier '{}' is unbounded but not last",
                        tier.label
                    )))
                }
                None => {}
            }
        }

        Ok(Self { tiers })
    }

    pub fn standard() -> Self {
        Self {
            tiers: default_dose_tiers(),
        }
    }

    pub fn tiers(&self) -> &[DoseTier] {
        &self.tiers
    }

    /// First tier whose inclusive upper bound holds `volume_m3`.
    pub fn lookup(&self, volume_m3: f64) -> Result<&DoseTier, AquaforgeError> {
        let volume_m3 = geometry::positive_dimension("volume_m3", volume_m3)?;
        // A validated table always ends with an unbounded tier.
        self.tiers
            .iter()
            .find(|tier| tier.covers(volume_m3))
            .ok_or_else(|| {
                AquaforgeError::InvalidCalibration(format!("no dose tier covers {volume_m3} m3"))
            })
    }
}

impl Default for DoseTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoseRecommendation {
    pub volume_m3: f64,
    pub label: String,
    pub rate_l_per_m3: f64,
    pub total_dose_liters: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BioremediationCalculator {
    table: DoseTable,
}

impl BioremediationCalculator {
    pub fn new(table: DoseTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &DoseTable {
        &self.table
    }

    pub fn calculate(
        &self,
        length_m: f64,
        width_m: f64,
        depth_m: f64,
    ) -> Result<DoseRecommendation, AquaforgeError> {
        let volume_m3 = geometry::volume(length_m, width_m, depth_m)?;
        self.recommend_for_volume(volume_m3)
    }

    pub fn recommend_for_volume(&self, volume_m3: f64) -> Result<DoseRecommendation, AquaforgeError> {
        let tier = self.table.lookup(volume_m3)?;
        let recommendation = DoseRecommendation {
            volume_m3,
            label: tier.label.clone(),
            rate_l_per_m3: tier.dose_rate_l_per_m3,
            total_dose_liters: volume_m3 * tier.dose_rate_l_per_m3,
        };
        debug!(
            volume_m3,
            tier = %recommendation.label,
            total_dose_liters = recommendation.total_dose_liters,
            "dose computed"
        );
        Ok(recommendation)
    }

    /// Computes a dose and packages it as a saveable calculation record.
    pub fn record(
        &self,
        length_m: f64,
        width_m: f64,
        depth_m: f64,
    ) -> Result<BioremediationCalculation, AquaforgeError> {
        let recommendation = self.calculate(length_m, width_m, depth_m)?;
        Ok(BioremediationCalculation {
            pond_length_m: length_m,
            pond_width_m: width_m,
            pond_depth_m: depth_m,
            volume_m3: recommendation.volume_m3,
            tier_label: recommendation.label,
            dose_liters: recommendation.total_dose_liters,
        })
    }
}
