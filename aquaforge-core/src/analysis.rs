//! Bioremediation treatment effectiveness and the cost/revenue summary built on it.

use crate::error::AquaforgeError;
use aquaforge_schemas::{calibration::PricingConfig, treatment::BioremediationTreatment};
use serde::Serialize;

/// Percentage reduction in ammonia between the before and after readings.
///
/// `None` when either reading is missing or non-finite, or the before reading is not
/// positive. A negative result means ammonia rose after treatment and is returned as is.
pub fn effectiveness_pct(ammonia_before: Option<f64>, ammonia_after: Option<f64>) -> Option<f64> {
    let (before, after) = (ammonia_before?, ammonia_after?);
    if !before.is_finite() || !after.is_finite() || before <= 0.0 {
        return None;
    }
    Some((before - after) / before * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectivenessBand {
    High,
    Moderate,
    Low,
}

impl EffectivenessBand {
    pub fn from_pct(pct: f64) -> Self {
        if pct >= 60.0 {
            EffectivenessBand::High
        } else if pct >= 30.0 {
            EffectivenessBand::Moderate
        } else {
            EffectivenessBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EffectivenessBand::High => "Alta",
            EffectivenessBand::Moderate => "Media",
            EffectivenessBand::Low => "Baja",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentReport {
    pub treatment_id: String,
    pub pond_id: String,
    pub dose_liters: f64,
    pub revenue: f64,
    pub effectiveness_pct: Option<f64>,
    pub band: Option<EffectivenessBand>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostSummary {
    pub total_treatments: usize,
    pub total_liters: f64,
    pub total_revenue: f64,
    pub average_revenue_per_treatment: f64,
    /// Mean over treatments with a defined effectiveness only.
    pub average_effectiveness_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentAnalyzer {
    pricing: PricingConfig,
}

impl TreatmentAnalyzer {
    pub fn new(pricing: PricingConfig) -> Result<Self, AquaforgeError> {
        if !(pricing.price_per_liter.is_finite() && pricing.price_per_liter >= 0.0) {
            return Err(AquaforgeError::InvalidCalibration(format!(
                "price per liter must be a non-negative number, got {}",
                pricing.price_per_liter
            )));
        }
        Ok(Self { pricing })
    }

    pub fn price_per_liter(&self) -> f64 {
        self.pricing.price_per_liter
    }

    pub fn revenue(&self, dose_liters: f64) -> f64 {
        dose_liters * self.pricing.price_per_liter
    }

    pub fn report(&self, treatment: &BioremediationTreatment) -> TreatmentReport {
        let effectiveness = effectiveness_pct(treatment.ammonia_before, treatment.ammonia_after);
        TreatmentReport {
            treatment_id: treatment.treatment_id.clone(),
            pond_id: treatment.pond_id.clone(),
            dose_liters: treatment.dose_liters,
            revenue: self.revenue(treatment.dose_liters),
            effectiveness_pct: effectiveness,
            band: effectiveness.map(EffectivenessBand::from_pct),
        }
    }

    pub fn summarize(&self, treatments: &[BioremediationTreatment]) -> (Vec<TreatmentReport>, CostSummary) {
        let reports: Vec<TreatmentReport> = treatments.iter().map(|t| self.report(t)).collect();

        let total_treatments = reports.len();
        let total_liters: f64 = reports.iter().map(|r| r.dose_liters).sum();
        let total_revenue: f64 = reports.iter().map(|r| r.revenue).sum();
        let average_revenue_per_treatment = if total_treatments > 0 {
            total_revenue / total_treatments as f64
        } else {
            0.0
        };

        let defined: Vec<f64> = reports.iter().filter_map(|r| r.effectiveness_pct).collect();
        let average_effectiveness_pct = if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        };

        let summary = CostSummary {
            total_treatments,
            total_liters,
            total_revenue,
            average_revenue_per_treatment,
            average_effectiveness_pct,
        };
        (reports, summary)
    }
}

impl Default for TreatmentAnalyzer {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn treatment(id: &str, dose_liters: f64, before: Option<f64>, after: Option<f64>) -> BioremediationTreatment {
        BioremediationTreatment {
            treatment_id: id.to_string(),
            pond_id: "P-01".to_string(),
            treatment_date: NaiveDate::from_ymd_opt(2024, 9, 3).unwrap(),
            product_name: "NitroFix".to_string(),
            dose_liters,
            ammonia_before: before,
            ammonia_after: after,
            notes: None,
        }
    }

    #[test]
    fn effectiveness_examples() {
        assert_relative_eq!(effectiveness_pct(Some(2.0), Some(0.5)).unwrap(), 75.0);
        assert_relative_eq!(effectiveness_pct(Some(0.5), Some(1.0)).unwrap(), -100.0);
        assert_eq!(effectiveness_pct(Some(0.0), Some(0.2)), None);
        assert_eq!(effectiveness_pct(Some(-1.0), Some(0.2)), None);
        assert_eq!(effectiveness_pct(None, Some(0.2)), None);
        assert_eq!(effectiveness_pct(Some(1.0), None), None);
        assert_eq!(effectiveness_pct(Some(f64::NAN), Some(0.2)), None);
        assert_eq!(effectiveness_pct(Some(1.0), Some(f64::INFINITY)), None);
    }

    #[test]
    fn bands() {
        assert_eq!(EffectivenessBand::from_pct(75.0), EffectivenessBand::High);
        assert_eq!(EffectivenessBand::from_pct(60.0), EffectivenessBand::High);
        assert_eq!(EffectivenessBand::from_pct(30.0), EffectivenessBand::Moderate);
        assert_eq!(EffectivenessBand::from_pct(29.9), EffectivenessBand::Low);
        assert_eq!(EffectivenessBand::from_pct(-100.0), EffectivenessBand::Low);
    }

    #[test]
    fn revenue_uses_reference_price() {
        let analyzer = TreatmentAnalyzer::default();
        assert_relative_eq!(analyzer.revenue(10.0), 125.0);

        let custom = TreatmentAnalyzer::new(PricingConfig { price_per_liter: 8.0 }).unwrap();
        assert_relative_eq!(custom.revenue(10.0), 80.0);
        assert!(TreatmentAnalyzer::new(PricingConfig { price_per_liter: f64::NAN }).is_err());
    }

    #[test]
    fn summary_excludes_undefined_effectiveness() {
        let treatments = vec![
            treatment("T-1", 10.0, Some(2.0), Some(0.5)),
            treatment("T-2", 20.0, Some(0.5), Some(1.0)),
            treatment("T-3", 30.0, None, Some(0.3)),
            treatment("T-4", 40.0, Some(0.0), Some(0.3)),
        ];
        let (reports, summary) = TreatmentAnalyzer::default().summarize(&treatments);

        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].band, Some(EffectivenessBand::High));
        assert_eq!(reports[2].band, None);
        assert_eq!(summary.total_treatments, 4);
        assert_relative_eq!(summary.total_liters, 100.0);
        assert_relative_eq!(summary.total_revenue, 1250.0);
        assert_relative_eq!(summary.average_revenue_per_treatment, 312.5);
        // (75 + -100) / 2, the two undefined treatments are left out entirely.
        assert_relative_eq!(summary.average_effectiveness_pct.unwrap(), -12.5);
    }

    #[test]
    fn unreadable_ammonia_is_left_out_of_the_average() {
        let treatments = vec![
            treatment("T-1", 10.0, Some(2.0), Some(0.5)),
            treatment("T-2", 10.0, Some(f64::NAN), Some(0.5)),
        ];
        let (reports, summary) = TreatmentAnalyzer::default().summarize(&treatments);
        assert_eq!(reports[1].effectiveness_pct, None);
        assert_relative_eq!(summary.average_effectiveness_pct.unwrap(), 75.0);
    }

    #[test]
    fn empty_summary() {
        let (reports, summary) = TreatmentAnalyzer::default().summarize(&[]);
        assert!(reports.is_empty());
        assert_eq!(summary.total_treatments, 0);
        assert_eq!(summary.average_revenue_per_treatment, 0.0);
        assert_eq!(summary.average_effectiveness_pct, None);
    }
}
