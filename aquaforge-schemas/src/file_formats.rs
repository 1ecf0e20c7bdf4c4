use crate::{batch::Batch, pond::Pond, treatment::BioremediationTreatment};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PondFile {
    pub schema_version: String,
    pub ponds: Vec<Pond>,
}

#[derive(Debug, Deserialize)]
pub struct BatchFile {
    pub schema_version: String,
    pub batches: Vec<Batch>,
}

#[derive(Debug, Deserialize)]
pub struct TreatmentFile {
    pub schema_version: String,
    pub treatments: Vec<BioremediationTreatment>,
}
