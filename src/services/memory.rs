use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::{distance::is_within_bounding_box, filters::is_candidate};
use crate::models::{
    BoundingBox, CandidateQuery, Match, MatchCount, MatchStatus, NewMatch, NewReport, Report,
    ReportCount, ReportStatus, ReportType, ResolveReport,
};
use crate::services::store::{MatchStore, StoreError};

#[derive(Default)]
struct Tables {
    reports: HashMap<Uuid, Report>,
    matches: HashMap<Uuid, Match>,
    /// (lost, found) -> match id
    pairs: HashMap<(Uuid, Uuid), Uuid>,
}

/// In-process store with the same semantics as [`PostgresStore`](super::PostgresStore)
///
/// Used by tests and benchmarks. `set_unavailable(true)` makes every call
/// fail, which is how storage outages are simulated.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Insert a fully formed report, keeping its id and timestamps
    pub async fn insert_report(&self, report: Report) {
        self.tables.write().await.reports.insert(report.id, report);
    }

    pub async fn match_count(&self) -> usize {
        self.tables.read().await.matches.len()
    }

    /// Stand-in for the external flow that moves matches to CONTACTED
    pub async fn set_match_status(&self, id: Uuid, status: MatchStatus) -> bool {
        match self.tables.write().await.matches.get_mut(&id) {
            Some(existing) => {
                existing.status = status;
                true
            }
            None => false,
        }
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store switched off".to_string()));
        }
        Ok(())
    }
}

fn sort_matches(matches: &mut [Match]) {
    matches.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn create_report(&self, report: NewReport) -> Result<Report, StoreError> {
        self.ensure_available()?;

        let created = Report {
            id: Uuid::new_v4(),
            user_id: report.user_id,
            report_type: report.report_type,
            animal_type: report.animal_type,
            description: report.description,
            photo_url: report.photo_url,
            latitude: report.latitude,
            longitude: report.longitude,
            address: report.address,
            district: report.district,
            province: report.province,
            contact_phone: report.contact_phone,
            contact_name: report.contact_name,
            status: ReportStatus::Active,
            created_at: Utc::now(),
            resolved_at: None,
            resolution_note: None,
            share_as_success: false,
        };

        self.tables
            .write()
            .await
            .reports
            .insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_report_by_id(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        self.ensure_available()?;
        Ok(self.tables.read().await.reports.get(&id).cloned())
    }

    async fn find_active_reports(
        &self,
        report_type: ReportType,
        district: &str,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Report>, StoreError> {
        self.ensure_available()?;

        let query = CandidateQuery {
            report_type,
            district: district.to_string(),
            created_after,
        };

        Ok(self
            .tables
            .read()
            .await
            .reports
            .values()
            .filter(|report| is_candidate(report, &query))
            .cloned()
            .collect())
    }

    async fn find_reports_in_area(
        &self,
        bbox: &BoundingBox,
        status: ReportStatus,
        report_type: Option<ReportType>,
    ) -> Result<Vec<Report>, StoreError> {
        self.ensure_available()?;

        let mut reports: Vec<Report> = self
            .tables
            .read()
            .await
            .reports
            .values()
            .filter(|report| report.status == status)
            .filter(|report| report_type.map_or(true, |t| report.report_type == t))
            .filter(|report| is_within_bounding_box(report.latitude, report.longitude, bbox))
            .cloned()
            .collect();

        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    async fn list_reports_by_user(&self, user_id: Uuid) -> Result<Vec<Report>, StoreError> {
        self.ensure_available()?;

        let mut reports: Vec<Report> = self
            .tables
            .read()
            .await
            .reports
            .values()
            .filter(|report| report.user_id == user_id)
            .cloned()
            .collect();

        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    async fn resolve_report(
        &self,
        id: Uuid,
        resolution: ResolveReport,
    ) -> Result<Option<Report>, StoreError> {
        self.ensure_available()?;

        let mut tables = self.tables.write().await;
        let Some(report) = tables.reports.get_mut(&id) else {
            return Ok(None);
        };
        if !report.is_active() {
            return Ok(None);
        }

        report.status = ReportStatus::Resolved;
        report.resolved_at = Some(Utc::now());
        if let Some(note) = resolution.resolution_note {
            report.resolution_note = Some(note);
        }
        if let Some(share) = resolution.share_as_success {
            report.share_as_success = share;
        }

        Ok(Some(report.clone()))
    }

    async fn create_match(&self, new_match: NewMatch) -> Result<Match, StoreError> {
        self.ensure_available()?;

        let mut tables = self.tables.write().await;
        let pair = (new_match.lost_report_id, new_match.found_report_id);

        if let Some(existing_id) = tables.pairs.get(&pair).copied() {
            if let Some(existing) = tables.matches.get_mut(&existing_id) {
                existing.match_score = new_match.match_score;
                existing.distance = new_match.distance;
                return Ok(existing.clone());
            }
        }

        let created = Match {
            id: Uuid::new_v4(),
            lost_report_id: new_match.lost_report_id,
            found_report_id: new_match.found_report_id,
            match_score: new_match.match_score,
            distance: new_match.distance,
            notified: false,
            notified_at: None,
            status: MatchStatus::Pending,
            created_at: Utc::now(),
        };

        tables.pairs.insert(pair, created.id);
        tables.matches.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_match_by_id(&self, id: Uuid) -> Result<Option<Match>, StoreError> {
        self.ensure_available()?;
        Ok(self.tables.read().await.matches.get(&id).cloned())
    }

    async fn list_matches_for_reports(&self, report_ids: &[Uuid]) -> Result<Vec<Match>, StoreError> {
        self.ensure_available()?;

        let mut matches: Vec<Match> = self
            .tables
            .read()
            .await
            .matches
            .values()
            .filter(|m| report_ids.iter().any(|id| m.involves(*id)))
            .cloned()
            .collect();

        sort_matches(&mut matches);
        Ok(matches)
    }

    async fn mark_match_notified(&self, id: Uuid) -> Result<Option<Match>, StoreError> {
        self.ensure_available()?;

        let mut tables = self.tables.write().await;
        let Some(existing) = tables.matches.get_mut(&id) else {
            return Ok(None);
        };

        existing.notified = true;
        existing.notified_at.get_or_insert_with(Utc::now);

        Ok(Some(existing.clone()))
    }

    async fn count_reports(&self, filter: ReportCount) -> Result<u64, StoreError> {
        self.ensure_available()?;

        let count = self
            .tables
            .read()
            .await
            .reports
            .values()
            .filter(|report| filter.includes(report))
            .count();

        Ok(count as u64)
    }

    async fn count_matches(&self, filter: MatchCount) -> Result<u64, StoreError> {
        self.ensure_available()?;

        let tables = self.tables.read().await;
        let owned_by = |report_id: Uuid, user_id: Uuid| {
            tables
                .reports
                .get(&report_id)
                .map_or(false, |report| report.user_id == user_id)
        };

        let count = tables
            .matches
            .values()
            .filter(|m| filter.status.map_or(true, |status| m.status == status))
            .filter(|m| {
                filter.user_id.map_or(true, |user_id| {
                    owned_by(m.lost_report_id, user_id) || owned_by(m.found_report_id, user_id)
                })
            })
            .count();

        Ok(count as u64)
    }

    async fn recent_successes(&self, limit: usize) -> Result<Vec<Report>, StoreError> {
        self.ensure_available()?;

        let mut successes: Vec<Report> = self
            .tables
            .read()
            .await
            .reports
            .values()
            .filter(|report| report.status == ReportStatus::Resolved && report.share_as_success)
            .cloned()
            .collect();

        successes.sort_by(|a, b| b.resolved_at.cmp(&a.resolved_at));
        successes.truncate(limit);
        Ok(successes)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}
