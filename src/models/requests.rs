use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{ReportStatus, ReportType};

/// Request to create a report
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    #[validate(length(min = 1))]
    pub animal_type: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub district: String,
    #[serde(default)]
    pub province: Option<String>,
    #[validate(length(min = 1))]
    pub contact_phone: String,
    #[validate(length(min = 1))]
    pub contact_name: String,
}

/// Request to change a report's status
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: ReportStatus,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub resolution_note: Option<String>,
    #[serde(default)]
    pub share_as_success: Option<bool>,
}

/// Query for reports around a point
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_nearby_radius")]
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub radius: f64,
    #[serde(default, rename = "type")]
    pub report_type: Option<ReportType>,
    #[serde(default = "default_nearby_status")]
    pub status: ReportStatus,
}

fn default_nearby_radius() -> f64 {
    10.0
}

fn default_nearby_status() -> ReportStatus {
    ReportStatus::Active
}

/// Query for an on-demand radius search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiusSearchQuery {
    #[serde(default)]
    pub radius: Option<f64>,
}
