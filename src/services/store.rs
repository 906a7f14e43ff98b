use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    BoundingBox, Match, MatchCount, NewMatch, NewReport, Report, ReportCount, ReportStatus,
    ReportType, ResolveReport,
};

/// Errors that can occur when interacting with report/match storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence of reports and matches consumed by the matching services
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn create_report(&self, report: NewReport) -> Result<Report, StoreError>;

    async fn get_report_by_id(&self, id: Uuid) -> Result<Option<Report>, StoreError>;

    /// Active reports of one type in a district, optionally created on or after a cut-off
    async fn find_active_reports(
        &self,
        report_type: ReportType,
        district: &str,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Report>, StoreError>;

    async fn find_reports_in_area(
        &self,
        bbox: &BoundingBox,
        status: ReportStatus,
        report_type: Option<ReportType>,
    ) -> Result<Vec<Report>, StoreError>;

    /// All reports owned by a user, newest first
    async fn list_reports_by_user(&self, user_id: Uuid) -> Result<Vec<Report>, StoreError>;

    /// Move an ACTIVE report to RESOLVED. Returns `None` if the report does not
    /// exist or is not active.
    async fn resolve_report(
        &self,
        id: Uuid,
        resolution: ResolveReport,
    ) -> Result<Option<Report>, StoreError>;

    /// Upsert keyed by `(lost_report_id, found_report_id)`; refreshes score and
    /// distance when the pair already exists
    async fn create_match(&self, new_match: NewMatch) -> Result<Match, StoreError>;

    async fn get_match_by_id(&self, id: Uuid) -> Result<Option<Match>, StoreError>;

    /// Matches touching any of the given reports, best score first
    async fn list_matches_for_reports(&self, report_ids: &[Uuid]) -> Result<Vec<Match>, StoreError>;

    async fn mark_match_notified(&self, id: Uuid) -> Result<Option<Match>, StoreError>;

    async fn count_reports(&self, filter: ReportCount) -> Result<u64, StoreError>;

    async fn count_matches(&self, filter: MatchCount) -> Result<u64, StoreError>;

    /// Resolved reports shared as success stories, most recently resolved first
    async fn recent_successes(&self, limit: usize) -> Result<Vec<Report>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
