//! Pond geometry and the unit conversions the metrics rely on.

use crate::error::AquaforgeError;

pub const GRAMS_PER_KG: f64 = 1000.0;

pub fn grams_to_kg(grams: f64) -> f64 {
    grams / GRAMS_PER_KG
}

/// Rectangular pond volume in m³. Full precision is kept for the dose math downstream.
pub fn volume(length_m: f64, width_m: f64, depth_m: f64) -> Result<f64, AquaforgeError> {
    let length_m = positive_dimension("length_m", length_m)?;
    let width_m = positive_dimension("width_m", width_m)?;
    let depth_m = positive_dimension("depth_m", depth_m)?;
    Ok(length_m * width_m * depth_m)
}

pub fn positive_dimension(name: &str, value: f64) -> Result<f64, AquaforgeError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AquaforgeError::InvalidDimension {
            name: name.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn volume_is_product_of_dimensions() {
        assert_relative_eq!(volume(20.0, 10.0, 1.5).unwrap(), 300.0);
        assert_relative_eq!(volume(0.3, 0.7, 1.1).unwrap(), 0.3 * 0.7 * 1.1);
    }

    #[test]
    fn non_positive_or_non_finite_dimensions_are_rejected() {
        for (l, w, d, bad) in [
            (0.0, 10.0, 1.5, "length_m"),
            (20.0, -3.0, 1.5, "width_m"),
            (20.0, 10.0, f64::NAN, "depth_m"),
            (f64::INFINITY, 10.0, 1.5, "length_m"),
        ] {
            match volume(l, w, d) {
                Err(AquaforgeError::InvalidDimension { name, .. }) => assert_eq!(name, bad),
                other => panic!("expected InvalidDimension for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn conversions() {
        assert_relative_eq!(grams_to_kg(2500.0), 2.5);
    }
}
