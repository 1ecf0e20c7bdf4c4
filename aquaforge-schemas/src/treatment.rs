use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A bioremediation product application on a pond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioremediationTreatment {
    pub treatment_id: String,
    pub pond_id: String,
    pub treatment_date: NaiveDate,
    pub product_name: String,
    pub dose_liters: f64,
    #[serde(default)]
    pub ammonia_before: Option<f64>,
    #[serde(default)]
    pub ammonia_after: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A saved volume and dose computation. Not linked to any applied treatment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioremediationCalculation {
    pub pond_length_m: f64,
    pub pond_width_m: f64,
    pub pond_depth_m: f64,
    pub volume_m3: f64,
    pub tier_label: String,
    pub dose_liters: f64,
}
