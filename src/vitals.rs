//! The persisted vital-sign record and its synthetic generator.
//!
//! Every field except the effective timestamp is decided here, before the
//! database is touched. The timestamp is left to the database (`NOW()`).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

/// Patients a synthetic reading may be attributed to
pub const PATIENT_IDS: [&str; 3] = ["P001", "P002", "P003"];

/// LOINC code for heart rate
pub const LOINC_HEART_RATE: &str = "8867-4";
pub const HEART_RATE_DISPLAY: &str = "Heart rate";
pub const HEART_RATE_UNIT: &str = "beats/min";

/// Inclusive bounds for a synthetic heart rate
pub const HEART_RATE_MIN: f64 = 60.0;
pub const HEART_RATE_MAX: f64 = 100.0;

/// Source tag marking the row as generated
pub const SYNTHETIC_SOURCE: &str = "synthetic";

pub const ANNOTATION_NOTE: &str = "fastapi demo";

/// Free-form note stored in the `raw` column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub note: String,
}

/// One observation, ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct VitalsEvent {
    pub event_id: Uuid,
    pub patient_id: &'static str,
    pub loinc_code: &'static str,
    pub code_display: &'static str,
    pub value_num: f64,
    pub unit: &'static str,
    pub source: &'static str,
    pub raw: Annotation,
}

impl VitalsEvent {
    /// Build a synthetic heart-rate reading using the thread-local RNG.
    pub fn synthetic() -> Self {
        Self::synthetic_with(&mut rand::thread_rng())
    }

    /// Build a synthetic heart-rate reading from the given RNG.
    pub fn synthetic_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let patient_id = PATIENT_IDS.choose(rng).copied().unwrap_or(PATIENT_IDS[0]);
        let value = rng.gen_range(HEART_RATE_MIN..=HEART_RATE_MAX);

        Self {
            event_id: Uuid::new_v4(),
            patient_id,
            loinc_code: LOINC_HEART_RATE,
            code_display: HEART_RATE_DISPLAY,
            value_num: round_to_tenth(value),
            unit: HEART_RATE_UNIT,
            source: SYNTHETIC_SOURCE,
            raw: Annotation {
                note: ANNOTATION_NOTE.to_string(),
            },
        }
    }

    /// The annotation as a JSON value, for binding to the `raw` column.
    pub fn raw_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.raw)
    }
}

/// Round half away from zero to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
