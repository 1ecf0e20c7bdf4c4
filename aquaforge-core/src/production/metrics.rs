//! Pure production metrics.
//!
//! Every function here takes the population *before* the observation's mortality is
//! applied. Absent inputs produce `None`, never zero.

use crate::geometry::grams_to_kg;
use aquaforge_schemas::observation::{FieldReadings, Observation};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    pub biomass_kg: Option<f64>,
    pub fca: Option<f64>,
    pub population_before: u64,
    pub population_after: u64,
}

/// Standing biomass: `population * avg_weight_g / 1000`.
pub fn biomass_kg(population: u64, avg_weight_g: Option<f64>) -> Option<f64> {
    avg_weight_g.map(|weight| grams_to_kg(population as f64 * weight))
}

/// Feed conversion ratio: kg of feed per kg of biomass gained since the previous weighing.
///
/// Undefined when feed or either weight is missing, or when the batch did not gain weight.
pub fn feed_conversion_ratio(
    feed_kg: Option<f64>,
    avg_weight_g: Option<f64>,
    previous_avg_weight_g: Option<f64>,
    population: u64,
) -> Option<f64> {
    let (feed_kg, weight, previous_weight) = (feed_kg?, avg_weight_g?, previous_avg_weight_g?);
    let weight_gain_g = weight - previous_weight;
    if weight_gain_g <= 0.0 {
        return None;
    }
    let gain_kg = grams_to_kg(weight_gain_g * population as f64);
    if gain_kg <= 0.0 {
        // Empty batch: no biomass could have been gained.
        return None;
    }
    Some(feed_kg / gain_kg)
}

pub fn population_after_mortality(population: u64, mortality_count: Option<u64>) -> u64 {
    match mortality_count {
        Some(dead) if dead > 0 => population.saturating_sub(dead),
        _ => population,
    }
}

/// Derives all metrics for one pending observation.
pub fn derive(
    readings: &FieldReadings,
    population_before: u64,
    previous: Option<&Observation>,
) -> DerivedMetrics {
    let previous_weight = previous.and_then(|p| p.readings.avg_weight_g);
    DerivedMetrics {
        biomass_kg: biomass_kg(population_before, readings.avg_weight_g),
        fca: feed_conversion_ratio(
            readings.feed_kg,
            readings.avg_weight_g,
            previous_weight,
            population_before,
        ),
        population_before,
        population_after: population_after_mortality(population_before, readings.mortality_count),
    }
}
