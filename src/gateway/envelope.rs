//! Public response shapes

use super::engine::Prediction;
use serde::{Deserialize, Serialize};

/// Risk scores block of the envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risks {
    pub diabetes: f64,
    pub blood_pressure: f64,
    pub lipids: f64,
}

/// Fixed-shape success response of `/predict` and `/predict/by-id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub client_id: String,
    pub triage: String,
    pub control_focus: String,
    pub health_distance: f64,
    pub risks: Risks,
    pub explanation: String,
}

impl ResponseEnvelope {
    pub fn new(record: AnalysisRecord, explanation: String) -> Self {
        Self {
            client_id: record.client_id,
            triage: record.triage,
            control_focus: record.control_focus,
            health_distance: record.health_distance,
            risks: record.risks,
            explanation,
        }
    }
}

/// One scored row of a batch analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub client_id: String,
    pub triage: String,
    pub control_focus: String,
    pub health_distance: f64,
    pub risks: Risks,
}

impl From<Prediction> for AnalysisRecord {
    fn from(prediction: Prediction) -> Self {
        Self {
            client_id: prediction.client_id.into_string(),
            triage: prediction.triage,
            control_focus: prediction.control_focus,
            health_distance: prediction.health_distance,
            risks: Risks {
                diabetes: prediction.diabetes_risk,
                blood_pressure: prediction.blood_pressure_risk,
                lipids: prediction.lipids_risk,
            },
        }
    }
}
