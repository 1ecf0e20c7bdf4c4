use crate::{error::AquaforgeError, production::state::Confirmation};
use chrono::NaiveDate;
use csv::Writer;
use serde::Serialize;
use std::{fs, io};

#[derive(Debug, Serialize)]
struct LogEntry<'a> {
    batch_id: &'a str,
    record_date: NaiveDate,
    feed_kg: Option<f64>,
    avg_weight_g: Option<f64>,
    mortality_count: Option<u64>,
    temperature_c: Option<f64>,
    oxygen_mg_l: Option<f64>,
    ammonia_mg_l: Option<f64>,
    nitrite_mg_l: Option<f64>,
    nitrate_mg_l: Option<f64>,
    ph: Option<f64>,
    calculated_fca: Option<f64>,
    calculated_biomass_kg: Option<f64>,
    population_before: u64,
    population_after: u64,
    alerts_json: String,
}

/// Type-erased destination, so the ledger can log to a file or any other writer.
pub type LogSink = Box<dyn io::Write>;

/// Appends one CSV row per confirmed observation.
pub struct ObservationLogger<W: io::Write> {
    writer: Writer<W>,
    target: String,
}

impl ObservationLogger<LogSink> {
    pub fn new(path: &str) -> Result<Self, io::Error> {
        let file = fs::File::create(path)?;
        Ok(Self {
            writer: Writer::from_writer(Box::new(file) as LogSink),
            target: path.to_string(),
        })
    }
}

impl<W: io::Write> ObservationLogger<W> {
    pub fn from_writer(inner: W) -> Self {
        Self {
            writer: Writer::from_writer(inner),
            target: "<writer>".to_string(),
        }
    }

    pub fn log_confirmation(&mut self, confirmation: &Confirmation) -> Result<(), AquaforgeError> {
        let observation = &confirmation.observation;
        let readings = &observation.readings;
        let alert_types: Vec<_> = confirmation
            .alerts
            .iter()
            .map(|a| a.alert_type.as_str())
            .collect();

        let entry = LogEntry {
            batch_id: &observation.batch_id,
            record_date: observation.record_date,
            feed_kg: readings.feed_kg,
            avg_weight_g: readings.avg_weight_g,
            mortality_count: readings.mortality_count,
            temperature_c: readings.temperature_c,
            oxygen_mg_l: readings.oxygen_mg_l,
            ammonia_mg_l: readings.ammonia_mg_l,
            nitrite_mg_l: readings.nitrite_mg_l,
            nitrate_mg_l: readings.nitrate_mg_l,
            ph: readings.ph,
            calculated_fca: observation.calculated_fca,
            calculated_biomass_kg: observation.calculated_biomass_kg,
            population_before: confirmation.population_before,
            population_after: confirmation.population_after(),
            alerts_json: serde_json::to_string(&alert_types)?,
        };

        self.writer
            .serialize(entry)
            .map_err(|e| AquaforgeError::CsvError(self.target.clone(), e))?;
        self.writer
            .flush()
            .map_err(|e| AquaforgeError::FileIO(self.target.clone(), e))?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, AquaforgeError> {
        let target = self.target;
        self.writer
            .into_inner()
            .map_err(|e| AquaforgeError::FileIO(target, e.into_error()))
    }
}
