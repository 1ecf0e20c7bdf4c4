//! Loading and validating a farm calibration file.

use crate::{
    alerts::AlertEvaluator, analysis::TreatmentAnalyzer, dosing::DoseTable, error::AquaforgeError,
};
use aquaforge_schemas::calibration::FarmCalibration;
use std::fs;
use tracing::info;

/// The calibrated components, each validated once at construction.
#[derive(Debug, Clone)]
pub struct CalibratedServices {
    pub dose_table: DoseTable,
    pub alert_evaluator: AlertEvaluator,
    pub treatment_analyzer: TreatmentAnalyzer,
}

impl CalibratedServices {
    pub fn from_calibration(calibration: &FarmCalibration) -> Result<Self, AquaforgeError> {
        Ok(Self {
            dose_table: DoseTable::new(calibration.dose_tiers.clone())?,
            alert_evaluator: AlertEvaluator::new(calibration.alert_thresholds.clone())?,
            treatment_analyzer: TreatmentAnalyzer::new(calibration.pricing.clone())?,
        })
    }
}

pub fn load_calibration(path: &str) -> Result<FarmCalibration, AquaforgeError> {
    let content = fs::read_to_string(path).map_err(|e| AquaforgeError::FileIO(path.to_string(), e))?;
    let calibration = parse_calibration(&content)
        .map_err(|e| AquaforgeError::YamlParsing(path.to_string(), e))?;
    CalibratedServices::from_calibration(&calibration)?;
    info!(path, tiers = calibration.dose_tiers.len(), "calibration loaded");
    Ok(calibration)
}

fn parse_calibration(content: &str) -> Result<FarmCalibration, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(FarmCalibration::default());
    }
    serde_yaml::from_str(content)
}
