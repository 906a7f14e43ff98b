use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of sighting a report describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "report_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Lost,
    Found,
    Injured,
}

impl ReportType {
    /// Only lost and found reports take part in matching
    pub fn is_matchable(self) -> bool {
        matches!(self, ReportType::Lost | ReportType::Found)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "report_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Active,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "match_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Pending,
    Contacted,
}

/// A user-submitted sighting of a lost, found or injured animal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub animal_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub district: String,
    pub province: String,
    pub contact_phone: String,
    pub contact_name: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolution_note: Option<String>,
    #[serde(default)]
    pub share_as_success: bool,
}

impl Report {
    pub fn is_active(&self) -> bool {
        self.status == ReportStatus::Active
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Report data as handed to storage; id, status and timestamps are assigned on insert
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: Uuid,
    pub report_type: ReportType,
    pub animal_type: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub district: String,
    pub province: String,
    pub contact_phone: String,
    pub contact_name: String,
}

/// Resolution details applied on the ACTIVE -> RESOLVED transition
#[derive(Debug, Clone, Default)]
pub struct ResolveReport {
    pub resolution_note: Option<String>,
    pub share_as_success: Option<bool>,
}

/// A candidate pairing of one LOST and one FOUND report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,
    pub lost_report_id: Uuid,
    pub found_report_id: Uuid,
    pub match_score: u8,
    /// Great-circle distance in km at discovery time
    pub distance: f64,
    pub notified: bool,
    #[serde(default)]
    pub notified_at: Option<DateTime<Utc>>,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, report_id: Uuid) -> bool {
        self.lost_report_id == report_id || self.found_report_id == report_id
    }
}

/// Match data as handed to storage, already oriented lost/found
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewMatch {
    pub lost_report_id: Uuid,
    pub found_report_id: Uuid,
    pub match_score: u8,
    pub distance: f64,
}

impl NewMatch {
    /// Orient a pair of reports so the LOST one always lands in `lost_report_id`.
    ///
    /// Returns `None` unless exactly one side is LOST and the other FOUND.
    pub fn oriented(a: &Report, b: &Report, match_score: u8, distance: f64) -> Option<Self> {
        let (lost, found) = match (a.report_type, b.report_type) {
            (ReportType::Lost, ReportType::Found) => (a, b),
            (ReportType::Found, ReportType::Lost) => (b, a),
            _ => return None,
        };

        Some(Self {
            lost_report_id: lost.id,
            found_report_id: found.id,
            match_score,
            distance,
        })
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Candidate query parameters
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub report_type: ReportType,
    pub district: String,
    pub created_after: Option<DateTime<Utc>>,
}

/// Filter for report counts; unset fields match every report
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportCount {
    pub user_id: Option<Uuid>,
    pub report_type: Option<ReportType>,
    pub status: Option<ReportStatus>,
}

/// Filter for match counts
///
/// `user_id` keeps matches where either side belongs to that user.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchCount {
    pub user_id: Option<Uuid>,
    pub status: Option<MatchStatus>,
}

impl ReportCount {
    pub fn includes(&self, report: &Report) -> bool {
        self.user_id.map_or(true, |id| report.user_id == id)
            && self.report_type.map_or(true, |t| report.report_type == t)
            && self.status.map_or(true, |s| report.status == s)
    }
}

/// Radius and score cut-offs applied by the matcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    pub max_radius_km: f64,
    pub min_score: u8,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            max_radius_km: 2.0,
            min_score: 30,
        }
    }
}

/// Vocabulary terms both descriptions share, one per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedKeywords {
    pub color: Option<String>,
    pub size: Option<String>,
    pub breed: Option<String>,
}

impl MatchedKeywords {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none() && self.breed.is_none()
    }
}

/// Candidate that survived the radius and score filters
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub report: Report,
    pub distance_km: f64,
    pub match_score: u8,
}
