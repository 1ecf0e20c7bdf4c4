use anyhow::{Context, Result};
use aquaforge_core::calibration::load_calibration;
use aquaforge_schemas::{
    batch::Batch,
    calibration::FarmCalibration,
    file_formats::{BatchFile, PondFile, TreatmentFile},
    pond::Pond,
    treatment::BioremediationTreatment,
};
use std::{collections::HashMap, fs, path::Path};
use tracing::{debug, info};

/// All farm records loaded from a directory of YAML files.
pub struct FarmKnowledgeBase {
    pub ponds: HashMap<String, Pond>,
    pub batches: HashMap<String, Batch>,
    pub treatments: HashMap<String, BioremediationTreatment>,
    pub calibration: FarmCalibration,
}

impl FarmKnowledgeBase {
    /// Loads all data from the specified base directory.
    ///
    /// Layout: `1_ponds/`, `2_batches/`, `3_treatments/` and an optional `calibration.yaml`.
    pub fn load(base_path: &str) -> Result<Self> {
        info!(base_path, "loading farm knowledge base");

        let ponds = load_yaml_files_into_map(
            Path::new(base_path).join("1_ponds"),
            |file: PondFile| file.ponds,
            |item: &Pond| item.pond_id.clone(),
        )?;
        let batches = load_yaml_files_into_map(
            Path::new(base_path).join("2_batches"),
            |file: BatchFile| file.batches,
            |item: &Batch| item.batch_id.clone(),
        )?;
        let treatments = load_yaml_files_into_map(
            Path::new(base_path).join("3_treatments"),
            |file: TreatmentFile| file.treatments,
            |item: &BioremediationTreatment| item.treatment_id.clone(),
        )?;

        let calibration_path = Path::new(base_path).join("calibration.yaml");
        let calibration = if calibration_path.is_file() {
            let path = calibration_path.to_string_lossy();
            load_calibration(&path).with_context(|| format!("Failed to load calibration {}", path))?
        } else {
            debug!("no calibration.yaml, using defaults");
            FarmCalibration::default()
        };

        info!(
            ponds = ponds.len(),
            batches = batches.len(),
            treatments = treatments.len(),
            "farm knowledge base loaded"
        );
        Ok(Self {
            ponds,
            batches,
            treatments,
            calibration,
        })
    }

    /// Treatments ordered by date, then id.
    pub fn sorted_treatments(&self) -> Vec<BioremediationTreatment> {
        let mut treatments: Vec<_> = self.treatments.values().cloned().collect();
        treatments.sort_by(|a, b| {
            a.treatment_date
                .cmp(&b.treatment_date)
                .then_with(|| a.treatment_id.cmp(&b.treatment_id))
        });
        treatments
    }
}

/// Generic helper to load all YAML files in a directory into a HashMap.
///
/// A missing directory yields an empty map: a farm may have no treatments yet.
fn load_yaml_files_into_map<P, F, E, T, K>(
    dir_path: P,
    extract_vec: E,
    get_key: K,
) -> Result<HashMap<String, T>>
where
    P: AsRef<Path>,
    F: for<'de> serde::Deserialize<'de>, // The file wrapper struct (e.g., PondFile)
    E: Fn(F) -> Vec<T>,
    K: Fn(&T) -> String,
{
    let mut map = HashMap::new();
    if !dir_path.as_ref().is_dir() {
        debug!(dir = ?dir_path.as_ref(), "directory not present, skipping");
        return Ok(map);
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir_path.as_ref())
        .with_context(|| format!("Failed to read directory: {:?}", dir_path.as_ref()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |s| s == "yaml" || s == "yml") {
            paths.push(path);
        }
    }
    // Later files win on duplicate ids, so make the order deterministic.
    paths.sort();

    for path in paths {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let file_wrapper: F = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))?;

        for item in extract_vec(file_wrapper) {
            map.insert(get_key(&item), item);
        }
    }
    Ok(map)
}
