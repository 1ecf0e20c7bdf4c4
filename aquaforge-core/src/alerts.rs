//! Threshold alerts raised from a confirmed observation.
//!
//! Rules are independent of each other; a single observation can raise every alert type.

use crate::error::AquaforgeError;
use aquaforge_schemas::{
    alert::{Alert, AlertType, Severity},
    calibration::AlertThresholds,
    observation::Observation,
};
use chrono::{DateTime, Utc};

/// Back-references and timestamp stamped on every alert raised for one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertContext {
    pub pond_id: Option<String>,
    pub batch_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
}

impl AlertEvaluator {
    pub fn new(thresholds: AlertThresholds) -> Result<Self, AquaforgeError> {
        let t = &thresholds;
        let finite = [
            t.oxygen_warning_below,
            t.oxygen_critical_below,
            t.ammonia_warning_above,
            t.ammonia_critical_above,
            t.fca_warning_above,
            t.fca_target,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(AquaforgeError::InvalidCalibration(
                "alert thresholds must be finite".to_string(),
            ));
        }
        if t.oxygen_critical_below > t.oxygen_warning_below {
            return Err(AquaforgeError::InvalidCalibration(format!(
                "critical oxygen threshold {} is above warning threshold {}",
                t.oxygen_critical_below, t.oxygen_warning_below
            )));
        }
        if t.ammonia_critical_above < t.ammonia_warning_above {
            return Err(AquaforgeError::InvalidCalibration(format!(
                "critical ammonia threshold {} is below warning threshold {}",
                t.ammonia_critical_above, t.ammonia_warning_above
            )));
        }
        if t.mortality_critical_above < t.mortality_warning_above {
            return Err(AquaforgeError::InvalidCalibration(format!(
                "critical mortality threshold {} is below warning threshold {}",
                t.mortality_critical_above, t.mortality_warning_above
            )));
        }
        Ok(Self { thresholds })
    }

    pub fn standard() -> Self {
        Self {
            thresholds: AlertThresholds::default(),
        }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn evaluate(&self, observation: &Observation, context: &AlertContext) -> Vec<Alert> {
        let t = &self.thresholds;
        let readings = &observation.readings;
        let mut raised: Vec<(AlertType, Severity, String)> = Vec::new();

        if let Some(oxygen) = readings.oxygen_mg_l {
            if oxygen < t.oxygen_warning_below {
                let severity = if oxygen < t.oxygen_critical_below {
                    Severity::Critical
                } else {
                    Severity::Warning
                };
                raised.push((
                    AlertType::LowOxygen,
                    severity,
                    format!(
                        "Oxigeno bajo detectado: {} mg/L (minimo recomendado: {} mg/L)",
                        oxygen, t.oxygen_warning_below
                    ),
                ));
            }
        }

        if let Some(ammonia) = readings.ammonia_mg_l {
            if ammonia > t.ammonia_warning_above {
                let severity = if ammonia > t.ammonia_critical_above {
                    Severity::Critical
                } else {
                    Severity::Warning
                };
                raised.push((
                    AlertType::HighAmmonia,
                    severity,
                    format!(
                        "Amonio elevado: {} mg/L (maximo recomendado: {} mg/L)",
                        ammonia, t.ammonia_warning_above
                    ),
                ));
            }
        }

        if let Some(mortality) = readings.mortality_count {
            if mortality > t.mortality_warning_above {
                let severity = if mortality > t.mortality_critical_above {
                    Severity::Critical
                } else {
                    Severity::Warning
                };
                raised.push((
                    AlertType::HighMortality,
                    severity,
                    format!(
                        "Mortalidad elevada: {} individuos en un dia (maximo recomendado: {})",
                        mortality, t.mortality_warning_above
                    ),
                ));
            }
        }

        if let Some(fca) = observation.calculated_fca {
            if fca > t.fca_warning_above {
                raised.push((
                    AlertType::HighFca,
                    Severity::Warning,
                    format!(
                        "FCA elevado: {:.2} (umbral: {}, objetivo: < {})",
                        fca, t.fca_warning_above, t.fca_target
                    ),
                ));
            }
        }

        raised
            .into_iter()
            .map(|(alert_type, severity, message)| Alert {
                alert_type,
                severity,
                message,
                is_read: false,
                created_at: context.created_at,
                pond_id: context.pond_id.clone(),
                batch_id: context.batch_id.clone(),
            })
            .collect()
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn unread_count(alerts: &[Alert]) -> usize {
    alerts.iter().filter(|a| !a.is_read).count()
}

/// Unread alerts that a bioremediation treatment could address.
pub fn opportunity_count(alerts: &[Alert]) -> usize {
    alerts
        .iter()
        .filter(|a| !a.is_read && a.alert_type.is_bioremediation_opportunity())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquaforge_schemas::observation::FieldReadings;
    use chrono::{NaiveDate, TimeZone};

    fn observation(readings: FieldReadings, calculated_fca: Option<f64>) -> Observation {
        Observation {
            batch_id: "B-01".to_string(),
            record_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            readings,
            notes: None,
            calculated_fca,
            calculated_biomass_kg: None,
        }
    }

    fn context() -> AlertContext {
        AlertContext {
            pond_id: Some("P-01".to_string()),
            batch_id: Some("B-01".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 10, 8, 30, 0).unwrap(),
        }
    }

    fn oxygen(value: f64) -> Vec<Alert> {
        let readings = FieldReadings {
            oxygen_mg_l: Some(value),
            ..Default::default()
        };
        AlertEvaluator::standard().evaluate(&observation(readings, None), &context())
    }

    #[test]
    fn oxygen_tiers() {
        let critical = oxygen(1.5);
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].alert_type, AlertType::LowOxygen);
        assert_eq!(critical[0].severity, Severity::Critical);
        assert_eq!(
            critical[0].message,
            "Oxigeno bajo detectado: 1.5 mg/L (minimo recomendado: 4 mg/L)"
        );

        let warning = oxygen(3.5);
        assert_eq!(warning.len(), 1);
        assert_eq!(warning[0].severity, Severity::Warning);

        assert!(oxygen(5.0).is_empty());
        assert!(oxygen(4.0).is_empty());
        assert_eq!(oxygen(2.0)[0].severity, Severity::Warning);
    }

    #[test]
    fn ammonia_and_mortality_tiers() {
        let evaluator = AlertEvaluator::standard();
        let readings = FieldReadings {
            ammonia_mg_l: Some(1.6),
            mortality_count: Some(30),
            ..Default::default()
        };
        let alerts = evaluator.evaluate(&observation(readings, None), &context());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].alert_type, AlertType::HighAmmonia);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[1].alert_type, AlertType::HighMortality);
        assert_eq!(alerts[1].severity, Severity::Warning);
        assert_eq!(
            alerts[1].message,
            "Mortalidad elevada: 30 individuos en un dia (maximo recomendado: 10)"
        );

        let readings = FieldReadings {
            ammonia_mg_l: Some(0.5),
            mortality_count: Some(51),
            ..Default::default()
        };
        let alerts = evaluator.evaluate(&observation(readings, None), &context());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::HighMortality);
        assert_eq!(alerts[0].severity, Severity::Critical);
    }

    #[test]
    fn high_fca_is_always_a_warning() {
        let alerts = AlertEvaluator::standard()
            .evaluate(&observation(FieldReadings::default(), Some(3.456)), &context());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::HighFca);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(alerts[0].message, "FCA elevado: 3.46 (umbral: 2.5, objetivo: < 1.8)");

        let none = AlertEvaluator::standard()
            .evaluate(&observation(FieldReadings::default(), Some(2.5)), &context());
        assert!(none.is_empty());
    }

    #[test]
    fn every_rule_can_fire_at_once() {
        let readings = FieldReadings {
            oxygen_mg_l: Some(1.0),
            ammonia_mg_l: Some(2.0),
            mortality_count: Some(80),
            ..Default::default()
        };
        let alerts = AlertEvaluator::standard().evaluate(&observation(readings, Some(4.0)), &context());
        assert_eq!(alerts.len(), 4);
        assert!(alerts.iter().all(|a| !a.is_read));
        assert!(alerts.iter().all(|a| a.pond_id.as_deref() == Some("P-01")));
        assert_eq!(opportunity_count(&alerts), 2);
        assert_eq!(unread_count(&alerts), 4);
    }

    #[test]
    fn missing_readings_raise_nothing() {
        let alerts = AlertEvaluator::standard()
            .evaluate(&observation(FieldReadings::default(), None), &context());
        assert!(alerts.is_empty());
    }

    #[test]
    fn recalibrated_thresholds_apply() {
        let thresholds = AlertThresholds {
            oxygen_warning_below: 5.0,
            ..Default::default()
        };
        let evaluator = AlertEvaluator::new(thresholds).unwrap();
        let readings = FieldReadings {
            oxygen_mg_l: Some(4.5),
            ..Default::default()
        };
        let alerts = evaluator.evaluate(&observation(readings, None), &context());
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("minimo recomendado: 5 mg/L"));
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let thresholds = AlertThresholds {
            ammonia_critical_above: 0.2,
            ..Default::default()
        };
        assert!(matches!(
            AlertEvaluator::new(thresholds),
            Err(AquaforgeError::InvalidCalibration(_))
        ));
    }
}
