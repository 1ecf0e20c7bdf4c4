//! Tunable reference values: the dosing table, alert thresholds and pricing.
//!
//! Every field has a default matching the values the farm dashboard ships with, so a
//! calibration file only needs to list what a given operation recalibrates.

use serde::{Deserialize, Serialize};

/// One row of the bioremediation dosing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseTier {
    /// Inclusive upper bound of the tier. `None` means the tier is unbounded.
    pub max_volume_m3: Option<f64>,
    pub dose_rate_l_per_m3: f64,
    pub label: String,
}

impl DoseTier {
    pub fn new(max_volume_m3: Option<f64>, dose_rate_l_per_m3: f64, label: &str) -> Self {
        Self {
            max_volume_m3,
            dose_rate_l_per_m3,
            label: label.to_string(),
        }
    }

    pub fn covers(&self, volume_m3: f64) -> bool {
        self.max_volume_m3.map_or(true, |max| volume_m3 <= max)
    }
}

pub fn default_dose_tiers() -> Vec<DoseTier> {
    vec![
        DoseTier::new(Some(50.0), 0.50, "Muy pequeño"),
        DoseTier::new(Some(200.0), 0.40, "Pequeño"),
        DoseTier::new(Some(500.0), 0.35, "Mediano"),
        DoseTier::new(Some(1000.0), 0.30, "Grande"),
        DoseTier::new(None, 0.25, "Muy grande"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub oxygen_warning_below: f64,
    pub oxygen_critical_below: f64,
    pub ammonia_warning_above: f64,
    pub ammonia_critical_above: f64,
    pub mortality_warning_above: u64,
    pub mortality_critical_above: u64,
    pub fca_warning_above: f64,
    /// Target FCA quoted in alert messages.
    pub fca_target: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            oxygen_warning_below: 4.0,
            oxygen_critical_below: 2.0,
            ammonia_warning_above: 0.5,
            ammonia_critical_above: 1.5,
            mortality_warning_above: 10,
            mortality_critical_above: 50,
            fca_warning_above: 2.5,
            fca_target: 1.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Reference sale price of bioremediation product, per liter.
    pub price_per_liter: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_per_liter: 12.50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmCalibration {
    pub dose_tiers: Vec<DoseTier>,
    pub alert_thresholds: AlertThresholds,
    pub pricing: PricingConfig,
}

impl Default for FarmCalibration {
    fn default() -> Self {
        Self {
            dose_tiers: default_dose_tiers(),
            alert_thresholds: AlertThresholds::default(),
            pricing: PricingConfig::default(),
        }
    }
}
