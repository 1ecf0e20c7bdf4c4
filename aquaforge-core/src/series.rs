//! Per-record metric series and batch KPIs handed to charting and export collaborators.

use aquaforge_schemas::{batch::Batch, observation::Observation};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub record_date: NaiveDate,
    pub feed_kg: Option<f64>,
    pub avg_weight_g: Option<f64>,
    pub fca: Option<f64>,
    pub biomass_kg: Option<f64>,
    pub mortality: Option<u64>,
    /// Saturates rather than wrapping on absurd counts.
    pub cumulative_mortality: u64,
    pub temperature_c: Option<f64>,
    pub oxygen_mg_l: Option<f64>,
    pub ammonia_mg_l: Option<f64>,
    pub nitrite_mg_l: Option<f64>,
    pub nitrate_mg_l: Option<f64>,
    pub ph: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductionSeries {
    pub points: Vec<SeriesPoint>,
}

impl ProductionSeries {
    pub fn from_observations(observations: &[Observation]) -> Self {
        let mut ordered: Vec<&Observation> = observations.iter().collect();
        // Stable sort keeps insertion order within a date.
        ordered.sort_by_key(|o| o.record_date);

        let mut cumulative_mortality = 0_u64;
        let points = ordered
            .into_iter()
            .map(|o| {
                let r = &o.readings;
                cumulative_mortality =
                    cumulative_mortality.saturating_add(r.mortality_count.unwrap_or(0));
                SeriesPoint {
                    record_date: o.record_date,
                    feed_kg: r.feed_kg,
                    avg_weight_g: r.avg_weight_g,
                    fca: o.calculated_fca,
                    biomass_kg: o.calculated_biomass_kg,
                    mortality: r.mortality_count,
                    cumulative_mortality,
                    temperature_c: r.temperature_c,
                    oxygen_mg_l: r.oxygen_mg_l,
                    ammonia_mg_l: r.ammonia_mg_l,
                    nitrite_mg_l: r.nitrite_mg_l,
                    nitrate_mg_l: r.nitrate_mg_l,
                    ph: r.ph,
                }
            })
            .collect();
        Self { points }
    }

    /// Points with a defined FCA, for a chart that must not plot gaps as zero.
    pub fn fca_points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.fca.map(|fca| (p.record_date, fca)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchKpis {
    pub batch_id: String,
    pub survival_rate_pct: f64,
    pub total_feed_kg: f64,
    pub cumulative_mortality: u64,
    pub latest_biomass_kg: Option<f64>,
    pub latest_fca: Option<f64>,
}

impl BatchKpis {
    pub fn compute(batch: &Batch, observations: &[Observation]) -> Self {
        let series = ProductionSeries::from_observations(observations);
        let survival_rate_pct = if batch.initial_population > 0 {
            batch.current_population as f64 / batch.initial_population as f64 * 100.0
        } else {
            0.0
        };
        Self {
            batch_id: batch.batch_id.clone(),
            survival_rate_pct,
            total_feed_kg: series.points.iter().filter_map(|p| p.feed_kg).sum(),
            cumulative_mortality: series.points.last().map_or(0, |p| p.cumulative_mortality),
            latest_biomass_kg: series.points.iter().rev().find_map(|p| p.biomass_kg),
            latest_fca: series.points.iter().rev().find_map(|p| p.fca),
        }
    }
}
