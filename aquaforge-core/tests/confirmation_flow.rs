use approx::assert_relative_eq;
use aquaforge_core::{
    alerts::opportunity_count,
    analysis::TreatmentAnalyzer,
    production::{builder::LedgerBuilder, review::review_draft, state::ConfirmationRequest},
    series::BatchKpis,
    AquaforgeError,
};
use aquaforge_schemas::{
    alert::{AlertType, Severity},
    batch::Batch,
    observation::{FieldGuess, FieldReadings, ObservationDraft},
    pond::Pond,
    treatment::BioremediationTreatment,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn recorded_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn pond() -> Pond {
    Pond {
        pond_id: "P-01".to_string(),
        name: "Estanque Sur".to_string(),
        area_m2: Some(200.0),
        depth_m: Some(1.5),
        species: Some("Camaron".to_string()),
    }
}

fn request(record_date: NaiveDate, readings: FieldReadings) -> ConfirmationRequest {
    ConfirmationRequest {
        batch_id: "B-01".to_string(),
        record_date,
        readings,
        notes: None,
        recorded_at: recorded_at(),
    }
}

#[test]
fn weekly_records_drive_population_fca_and_alerts() {
    let mut ledger = LedgerBuilder::new()
        .with_ponds(vec![pond()])
        .with_batches(vec![Batch::new("B-01", "P-01", 10_000, date(4, 1))])
        .build()
        .unwrap();

    // Baseline weighing, no FCA without a previous weight.
    ledger
        .confirm(request(
            date(4, 8),
            FieldReadings {
                feed_kg: Some(20.0),
                avg_weight_g: Some(10.0),
                mortality_count: Some(150),
                oxygen_mg_l: Some(5.5),
                ..Default::default()
            },
        ))
        .unwrap();
    let first = &ledger.observations("B-01")[0];
    assert_eq!(first.calculated_fca, None);
    // Biomass is computed before this record's mortality is applied.
    assert_relative_eq!(first.calculated_biomass_kg.unwrap(), 100.0);
    assert_eq!(ledger.batch("B-01").unwrap().current_population, 9_850);

    // Second weighing uses the reduced population as its baseline.
    let receipt = ledger
        .confirm(request(
            date(4, 15),
            FieldReadings {
                feed_kg: Some(29.55),
                avg_weight_g: Some(15.0),
                oxygen_mg_l: Some(1.8),
                ammonia_mg_l: Some(0.9),
                ..Default::default()
            },
        ))
        .unwrap();
    let second = &ledger.observations("B-01")[1];
    // gain = 5 g * 9850 / 1000 = 49.25 kg
    assert_relative_eq!(second.calculated_fca.unwrap(), 0.6, epsilon = 1e-12);
    assert_relative_eq!(second.calculated_biomass_kg.unwrap(), 147.75, epsilon = 1e-9);
    assert_eq!(receipt.population_after, 9_850);
    assert_eq!(receipt.alerts_raised, 2);

    let alerts = ledger.alerts();
    // The first record raised a high-mortality alert (150 > 50).
    assert_eq!(alerts.len(), 3);
    assert_eq!(alerts[0].alert_type, AlertType::HighMortality);
    assert_eq!(alerts[0].severity, Severity::Critical);
    assert_eq!(alerts[1].alert_type, AlertType::LowOxygen);
    assert_eq!(alerts[1].severity, Severity::Critical);
    assert_eq!(alerts[2].alert_type, AlertType::HighAmmonia);
    assert_eq!(alerts[2].severity, Severity::Warning);
    assert_eq!(opportunity_count(alerts), 2);

    // Weight loss leaves FCA undefined even though feed was supplied.
    ledger
        .confirm(request(
            date(4, 22),
            FieldReadings {
                feed_kg: Some(25.0),
                avg_weight_g: Some(14.0),
                ..Default::default()
            },
        ))
        .unwrap();
    assert_eq!(ledger.observations("B-01")[2].calculated_fca, None);

    let batch = ledger.batch("B-01").unwrap().clone();
    let kpis = BatchKpis::compute(&batch, ledger.observations("B-01"));
    assert_relative_eq!(kpis.survival_rate_pct, 98.5);
    assert_eq!(kpis.cumulative_mortality, 150);
    assert_relative_eq!(kpis.latest_fca.unwrap(), 0.6, epsilon = 1e-12);

    ledger.close_batch("B-01", date(4, 30)).unwrap();
    let err = ledger
        .confirm(request(date(5, 1), FieldReadings::default()))
        .unwrap_err();
    assert!(matches!(err, AquaforgeError::BatchUnavailable { .. }));
    assert_eq!(ledger.observations("B-01").len(), 3);
}

#[test]
fn mortality_beyond_population_floors_at_zero() {
    let mut ledger = LedgerBuilder::new()
        .with_ponds(vec![pond()])
        .with_batches(vec![Batch::new("B-01", "P-01", 40, date(4, 1))])
        .build()
        .unwrap();
    let receipt = ledger
        .confirm(request(
            date(4, 2),
            FieldReadings {
                mortality_count: Some(75),
                ..Default::default()
            },
        ))
        .unwrap();
    assert_eq!(receipt.population_after, 0);
    assert_eq!(ledger.batch("B-01").unwrap().current_population, 0);
}

#[test]
fn reviewed_ocr_draft_confirms_like_manual_entry() {
    let mut ledger = LedgerBuilder::new()
        .with_ponds(vec![pond()])
        .with_batches(vec![Batch::new("B-01", "P-01", 1_000, date(4, 1))])
        .build()
        .unwrap();

    let draft = ObservationDraft {
        avg_weight_g: FieldGuess { value: Some(20.0), confidence: Some(35.0) },
        oxygen_mg_l: FieldGuess { value: Some(6.0), confidence: Some(90.0) },
        notes: Some("hoja escaneada".to_string()),
        ..Default::default()
    };
    let review = review_draft(&draft, 60.0).unwrap();
    assert_eq!(review.low_confidence_fields, vec!["avg_weight_g"]);

    ledger
        .confirm(ConfirmationRequest {
            batch_id: "B-01".to_string(),
            record_date: date(4, 3),
            readings: review.readings,
            notes: review.notes,
            recorded_at: recorded_at(),
        })
        .unwrap();
    let stored = &ledger.observations("B-01")[0];
    assert_relative_eq!(stored.calculated_biomass_kg.unwrap(), 20.0);
    assert_eq!(stored.notes.as_deref(), Some("hoja escaneada"));
}

#[test]
fn confirmations_are_logged_to_csv() {
    let path = std::env::temp_dir().join(format!("aquaforge-log-{}.csv", std::process::id()));
    let path_str = path.to_str().unwrap().to_string();
    {
        let mut ledger = LedgerBuilder::new()
            .with_ponds(vec![pond()])
            .with_batches(vec![Batch::new("B-01", "P-01", 500, date(4, 1))])
            .with_observation_logging_to_file(&path_str)
            .build()
            .unwrap();
        ledger
            .confirm(request(
                date(4, 2),
                FieldReadings {
                    avg_weight_g: Some(4.0),
                    ..Default::default()
                },
            ))
            .unwrap();
    }
    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(contents.lines().count(), 2);
    assert!(contents.lines().nth(1).unwrap().starts_with("B-01,2024-04-02,"));
}

#[test]
fn treatment_costs_for_ledger_treatments() {
    let ledger = LedgerBuilder::new()
        .with_ponds(vec![pond()])
        .with_treatments(vec![BioremediationTreatment {
            treatment_id: "T-01".to_string(),
            pond_id: "P-01".to_string(),
            treatment_date: date(4, 10),
            product_name: "NitroFix".to_string(),
            dose_liters: 105.0,
            ammonia_before: Some(2.0),
            ammonia_after: Some(0.5),
            notes: None,
        }])
        .build()
        .unwrap();
    let (reports, summary) = TreatmentAnalyzer::default().summarize(ledger.treatments());
    assert_relative_eq!(reports[0].effectiveness_pct.unwrap(), 75.0);
    assert_relative_eq!(summary.total_revenue, 1312.5);
}
