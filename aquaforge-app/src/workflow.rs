use crate::config::FarmKnowledgeBase;
use anyhow::{Context, Result};
use aquaforge_core::{
    alerts::{opportunity_count, unread_count},
    analysis::CostSummary,
    calibration::CalibratedServices,
    dosing::{BioremediationCalculator, DoseRecommendation},
    production::{
        builder::LedgerBuilder,
        ledger::{BatchLedger, CommitReceipt},
        state::ConfirmationRequest,
    },
    series::BatchKpis,
    AquaforgeError,
};
use aquaforge_schemas::observation::FieldReadings;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::io;
use tracing::{info, warn};

/// One row of a field observation sheet.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationRow {
    pub batch_id: String,
    pub record_date: NaiveDate,
    pub feed_kg: Option<f64>,
    pub avg_weight_g: Option<f64>,
    pub mortality_count: Option<u64>,
    pub temperature_c: Option<f64>,
    pub oxygen_mg_l: Option<f64>,
    pub ammonia_mg_l: Option<f64>,
    pub nitrite_mg_l: Option<f64>,
    pub nitrate_mg_l: Option<f64>,
    pub ph: Option<f64>,
    pub notes: Option<String>,
}

impl ObservationRow {
    pub fn into_request(self, recorded_at: DateTime<Utc>) -> ConfirmationRequest {
        ConfirmationRequest {
            batch_id: self.batch_id,
            record_date: self.record_date,
            readings: FieldReadings {
                feed_kg: self.feed_kg,
                avg_weight_g: self.avg_weight_g,
                mortality_count: self.mortality_count,
                temperature_c: self.temperature_c,
                oxygen_mg_l: self.oxygen_mg_l,
                ammonia_mg_l: self.ammonia_mg_l,
                nitrite_mg_l: self.nitrite_mg_l,
                nitrate_mg_l: self.nitrate_mg_l,
                ph: self.ph,
            },
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            recorded_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    pub confirmed: usize,
    pub failed: usize,
    pub alerts_raised: usize,
}

/// Builds a ledger from the knowledge base, calibrated alert thresholds included.
pub fn build_ledger(kb: &FarmKnowledgeBase, log_path: Option<&str>) -> Result<BatchLedger> {
    let mut builder = LedgerBuilder::new()
        .with_ponds(kb.ponds.values().cloned().collect())
        .with_batches(kb.batches.values().cloned().collect())
        .with_treatments(kb.sorted_treatments())
        .with_alert_thresholds(kb.calibration.alert_thresholds.clone());
    if let Some(path) = log_path {
        builder = builder.with_observation_logging_to_file(path);
    }
    builder.build().context("Failed to build batch ledger")
}

/// Confirms a request, preparing it again once if the batch moved underneath it.
fn confirm_with_retry(
    ledger: &mut BatchLedger,
    request: ConfirmationRequest,
) -> Result<CommitReceipt, AquaforgeError> {
    let confirmation = ledger.prepare(request.clone())?;
    match ledger.commit(confirmation) {
        Err(AquaforgeError::VersionConflict { batch_id, .. }) => {
            warn!(%batch_id, "retrying confirmation against fresh snapshot");
            ledger.confirm(request)
        }
        other => other,
    }
}

/// Feeds every CSV row through the ledger in file order.
///
/// A rejected row is logged and counted; it does not stop the rest of the sheet.
pub fn replay_observations<R: io::Read>(
    ledger: &mut BatchLedger,
    reader: R,
    recorded_at: DateTime<Utc>,
) -> Result<ReplaySummary> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut summary = ReplaySummary::default();

    for (index, row) in rdr.deserialize::<ObservationRow>().enumerate() {
        let line = index + 2;
        let row = row.with_context(|| format!("Malformed observation row at line {}", line))?;
        match confirm_with_retry(ledger, row.into_request(recorded_at)) {
            Ok(receipt) => {
                summary.confirmed += 1;
                summary.alerts_raised += receipt.alerts_raised;
            }
            Err(e) => {
                warn!(line, error = %e, "observation rejected");
                summary.failed += 1;
            }
        }
    }

    info!(
        confirmed = summary.confirmed,
        failed = summary.failed,
        alerts = summary.alerts_raised,
        "replay finished"
    );
    Ok(summary)
}

/// Dose suggestions for ponds with an unread oxygen or ammonia alert.
///
/// Ponds without a registered area and depth are skipped.
pub fn suggest_treatments(
    ledger: &BatchLedger,
    calculator: &BioremediationCalculator,
) -> Vec<(String, DoseRecommendation)> {
    let mut pond_ids: Vec<&str> = ledger
        .unread_alerts()
        .filter(|a| a.alert_type.is_bioremediation_opportunity())
        .filter_map(|a| a.pond_id.as_deref())
        .collect();
    pond_ids.sort_unstable();
    pond_ids.dedup();

    pond_ids
        .into_iter()
        .filter_map(|pond_id| {
            let volume = ledger.pond(pond_id)?.nominal_volume_m3()?;
            match calculator.recommend_for_volume(volume) {
                Ok(rec) => Some((pond_id.to_string(), rec)),
                Err(e) => {
                    warn!(pond_id, error = %e, "no dose suggestion");
                    None
                }
            }
        })
        .collect()
}

/// Prints per-batch KPIs and the alert inbox.
pub fn print_production_report(
    ledger: &BatchLedger,
    summary: &ReplaySummary,
    calculator: &BioremediationCalculator,
) {
    println!("\n--- [Production Report] ---");
    println!("========================================");
    println!(
        "Observations confirmed: {} (rejected: {})",
        summary.confirmed, summary.failed
    );

    let mut batches: Vec<_> = ledger.batches().collect();
    batches.sort_by(|a, b| a.batch_id.cmp(&b.batch_id));
    for batch in batches {
        let kpis = BatchKpis::compute(batch, ledger.observations(&batch.batch_id));
        println!("\nBatch {} (pond {}):", batch.batch_id, batch.pond_id);
        println!(
            "  - Population:        {} / {}",
            batch.current_population, batch.initial_population
        );
        println!("  - Survival:          {:.1}%", kpis.survival_rate_pct);
        println!("  - Total feed:        {:.2} kg", kpis.total_feed_kg);
        println!("  - Mortality:         {}", kpis.cumulative_mortality);
        match kpis.latest_biomass_kg {
            Some(b) => println!("  - Latest biomass:    {:.2} kg", b),
            None => println!("  - Latest biomass:    n/a"),
        }
        match kpis.latest_fca {
            Some(f) => println!("  - Latest FCA:        {:.2}", f),
            None => println!("  - Latest FCA:        n/a"),
        }
    }

    let alerts = ledger.alerts();
    println!("\nAlerts: {} unread", unread_count(alerts));
    for alert in alerts {
        println!(
            "  [{}] {} ({}): {}",
            alert.severity,
            alert.alert_type.label(),
            alert.batch_id.as_deref().unwrap_or("-"),
            alert.message
        );
    }
    println!(
        "Bioremediation opportunities: {}",
        opportunity_count(alerts)
    );
    for (pond_id, rec) in suggest_treatments(ledger, calculator) {
        println!(
            "  - Pond {}: {:.2} m3 ({}), apply {:.2} L",
            pond_id, rec.volume_m3, rec.label, rec.total_dose_liters
        );
    }
    println!("========================================");
}

pub fn run_replay<R: io::Read>(
    kb: &FarmKnowledgeBase,
    services: &CalibratedServices,
    observations: R,
    log_path: Option<&str>,
    recorded_at: DateTime<Utc>,
) -> Result<ReplaySummary> {
    let mut ledger = build_ledger(kb, log_path)?;
    let summary = replay_observations(&mut ledger, observations, recorded_at)?;
    let calculator = BioremediationCalculator::new(services.dose_table.clone());
    print_production_report(&ledger, &summary, &calculator);
    Ok(summary)
}

pub fn run_dose(
    services: &CalibratedServices,
    length_m: f64,
    width_m: f64,
    depth_m: f64,
    as_json: bool,
) -> Result<DoseRecommendation> {
    let calculator = BioremediationCalculator::new(services.dose_table.clone());
    let recommendation = calculator.calculate(length_m, width_m, depth_m)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
    } else {
        let revenue = services.treatment_analyzer.revenue(recommendation.total_dose_liters);
        println!("Volume:      {:.2} m3", recommendation.volume_m3);
        println!("Pond size:   {}", recommendation.label);
        println!("Rate:        {} L/m3", recommendation.rate_l_per_m3);
        println!("Total dose:  {:.2} L", recommendation.total_dose_liters);
        println!("Cost:        ${:.2}", revenue);
    }
    Ok(recommendation)
}

pub fn run_costs(kb: &FarmKnowledgeBase, services: &CalibratedServices) -> Result<CostSummary> {
    let treatments = kb.sorted_treatments();
    let (reports, summary) = services.treatment_analyzer.summarize(&treatments);

    println!("\n--- [Treatment Cost Report] ---");
    println!("========================================");
    for report in &reports {
        let effectiveness = match (report.effectiveness_pct, report.band) {
            (Some(pct), Some(band)) => format!("{:.1}% ({})", pct, band.label()),
            _ => "n/a".to_string(),
        };
        println!(
            "  - {} [{}]: {:.2} L, ${:.2}, effectiveness {}",
            report.treatment_id, report.pond_id, report.dose_liters, report.revenue, effectiveness
        );
    }
    println!("----------------------------------------");
    println!("Treatments:            {}", summary.total_treatments);
    println!("Total liters:          {:.2} L", summary.total_liters);
    println!("Total revenue:         ${:.2}", summary.total_revenue);
    println!(
        "Average per treatment: ${:.2}",
        summary.average_revenue_per_treatment
    );
    match summary.average_effectiveness_pct {
        Some(pct) => println!("Average effectiveness: {:.1}%", pct),
        None => println!("Average effectiveness: n/a"),
    }
    println!("========================================");
    Ok(summary)
}
