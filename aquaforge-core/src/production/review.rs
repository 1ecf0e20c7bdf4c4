//! Human review of OCR drafts.
//!
//! Confidence scores only steer which fields a reviewer should double-check. They are
//! validated and reported here, then dropped before any metric is derived.

use crate::error::AquaforgeError;
use aquaforge_schemas::observation::{FieldReadings, ObservationDraft};

#[derive(Debug, Clone, PartialEq)]
pub struct DraftReview {
    pub readings: FieldReadings,
    pub notes: Option<String>,
    /// Fields with a guessed value whose confidence is below the review threshold.
    pub low_confidence_fields: Vec<&'static str>,
}

pub fn review_draft(
    draft: &ObservationDraft,
    review_threshold: f64,
) -> Result<DraftReview, AquaforgeError> {
    let readings = draft.readings();
    let guessed = guessed_fields(&readings);

    let mut low_confidence_fields = Vec::new();
    for (field, confidence) in draft.confidences() {
        let Some(confidence) = confidence else {
            continue;
        };
        if !(0.0..=100.0).contains(&confidence) {
            return Err(AquaforgeError::measurement(
                &format!("{field}.confidence"),
                confidence,
            ));
        }
        if confidence < review_threshold && guessed.contains(&field) {
            low_confidence_fields.push(field);
        }
    }

    Ok(DraftReview {
        readings,
        notes: draft.notes.clone(),
        low_confidence_fields,
    })
}

fn guessed_fields(readings: &FieldReadings) -> Vec<&'static str> {
    let present = [
        ("feed_kg", readings.feed_kg.is_some()),
        ("avg_weight_g", readings.avg_weight_g.is_some()),
        ("mortality_count", readings.mortality_count.is_some()),
        ("temperature_c", readings.temperature_c.is_some()),
        ("oxygen_mg_l", readings.oxygen_mg_l.is_some()),
        ("ammonia_mg_l", readings.ammonia_mg_l.is_some()),
        ("nitrite_mg_l", readings.nitrite_mg_l.is_some()),
        ("nitrate_mg_l", readings.nitrate_mg_l.is_some()),
        ("ph", readings.ph.is_some()),
    ];
    present
        .into_iter()
        .filter_map(|(field, is_present)| is_present.then_some(field))
        .collect()
}
