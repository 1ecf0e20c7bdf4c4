//! Production records: the raw field readings taken for a batch on a given date, the
//! OCR draft they may originate from, and the confirmed observation with its derived metrics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Nullable field readings as captured by manual entry or OCR review.
///
/// `None` means "not measured" and is never interchangeable with zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldReadings {
    pub feed_kg: Option<f64>,
    pub avg_weight_g: Option<f64>,
    pub mortality_count: Option<u64>,
    pub temperature_c: Option<f64>,
    pub oxygen_mg_l: Option<f64>,
    pub ammonia_mg_l: Option<f64>,
    pub nitrite_mg_l: Option<f64>,
    pub nitrate_mg_l: Option<f64>,
    pub ph: Option<f64>,
}

/// A confirmed production record.
///
/// `calculated_fca` and `calculated_biomass_kg` are filled once at confirmation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub batch_id: String,
    pub record_date: NaiveDate,
    pub readings: FieldReadings,
    pub notes: Option<String>,
    pub calculated_fca: Option<f64>,
    pub calculated_biomass_kg: Option<f64>,
}

/// A single value guessed by the OCR collaborator together with its confidence (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGuess<T> {
    pub value: Option<T>,
    pub confidence: Option<f64>,
}

impl<T> Default for FieldGuess<T> {
    fn default() -> Self {
        Self {
            value: None,
            confidence: None,
        }
    }
}

/// Structured output of a photographed field sheet, pending human review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationDraft {
    #[serde(default)]
    pub feed_kg: FieldGuess<f64>,
    #[serde(default)]
    pub avg_weight_g: FieldGuess<f64>,
    #[serde(default)]
    pub mortality_count: FieldGuess<u64>,
    #[serde(default)]
    pub temperature_c: FieldGuess<f64>,
    #[serde(default)]
    pub oxygen_mg_l: FieldGuess<f64>,
    #[serde(default)]
    pub ammonia_mg_l: FieldGuess<f64>,
    #[serde(default)]
    pub nitrite_mg_l: FieldGuess<f64>,
    #[serde(default)]
    pub nitrate_mg_l: FieldGuess<f64>,
    #[serde(default)]
    pub ph: FieldGuess<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ObservationDraft {
    /// The guessed values alone. Confidence scores are dropped here.
    pub fn readings(&self) -> FieldReadings {
        FieldReadings {
            feed_kg: self.feed_kg.value,
            avg_weight_g: self.avg_weight_g.value,
            mortality_count: self.mortality_count.value,
            temperature_c: self.temperature_c.value,
            oxygen_mg_l: self.oxygen_mg_l.value,
            ammonia_mg_l: self.ammonia_mg_l.value,
            nitrite_mg_l: self.nitrite_mg_l.value,
            nitrate_mg_l: self.nitrate_mg_l.value,
            ph: self.ph.value,
        }
    }

    pub fn confidences(&self) -> [(&'static str, Option<f64>); 9] {
        [
            ("feed_kg", self.feed_kg.confidence),
            ("avg_weight_g", self.avg_weight_g.confidence),
            ("mortality_count", self.mortality_count.confidence),
            ("temperature_c", self.temperature_c.confidence),
            ("oxygen_mg_l", self.oxygen_mg_l.confidence),
            ("ammonia_mg_l", self.ammonia_mg_l.confidence),
            ("nitrite_mg_l", self.nitrite_mg_l.confidence),
            ("nitrate_mg_l", self.nitrate_mg_l.confidence),
            ("ph", self.ph.confidence),
        ]
    }
}
