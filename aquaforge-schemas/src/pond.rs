use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pond {
    pub pond_id: String,
    pub name: String,
    pub area_m2: Option<f64>,
    pub depth_m: Option<f64>,
    pub species: Option<String>,
}

impl Pond {
    /// Nominal water volume from the registered area and depth, when both are known and positive.
    pub fn nominal_volume_m3(&self) -> Option<f64> {
        match (self.area_m2, self.depth_m) {
            (Some(area), Some(depth)) if area > 0.0 && depth > 0.0 => Some(area * depth),
            _ => None,
        }
    }
}
