use serde::{Deserialize, Serialize};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::domain::{Match, MatchedKeywords, Report, ReportType};

/// One annotated hit from a radius search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusMatch {
    pub report: Report,
    pub distance_km: f64,
    pub match_score: u8,
    pub matched_keywords: MatchedKeywords,
}

/// Ranked result of a radius search; nothing here is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusSearchResult {
    pub count: usize,
    pub radius_km: f64,
    pub matches: Vec<RadiusMatch>,
}

/// Report annotated with its distance from a query point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyReport {
    #[serde(flatten)]
    pub report: Report,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportListResponse<T> {
    pub count: usize,
    pub reports: Vec<T>,
}

/// A match with both of its reports embedded, so clients can render the pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchWithReports {
    #[serde(flatten)]
    pub details: Match,
    pub lost_report: Report,
    pub found_report: Report,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListResponse {
    pub count: usize,
    pub matches: Vec<MatchWithReports>,
}

/// Public view of a resolved report shared as a success story
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessStory {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub animal_type: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_note: Option<String>,
    pub district: String,
}

impl From<Report> for SuccessStory {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            report_type: report.report_type,
            animal_type: report.animal_type,
            description: report.description,
            photo_url: report.photo_url,
            resolved_at: report.resolved_at,
            resolution_note: report.resolution_note,
            district: report.district,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedByType {
    pub lost: u64,
    pub found: u64,
    pub injured: u64,
}

/// Site-wide counters for the landing banner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_resolved: u64,
    pub by_type: ResolvedByType,
    pub active_reports: u64,
    /// Matches that led to contact between the two reporters
    pub successful_matches: u64,
    pub recent_successes: Vec<SuccessStory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_reports: u64,
    pub active_reports: u64,
    pub total_matches: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
