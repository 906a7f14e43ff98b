use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::distance::{calculate_bounding_box, haversine_distance};
use crate::error::ServiceError;
use crate::models::{
    GlobalStats, Match, MatchCount, MatchStatus, MatchWithReports, NearbyReport, NewReport,
    Report, ReportCount, ReportStatus, ReportType, ResolveReport, ResolvedByType, SuccessStory,
    UserStats,
};
use crate::services::discovery::{DiscoveryOutcome, MatchDiscoveryEngine};
use crate::services::store::MatchStore;

/// How many shared success stories the public stats carry
const RECENT_SUCCESS_LIMIT: usize = 5;

/// A stored report together with what discovery did for it
#[derive(Debug, Clone, Serialize)]
pub struct CreatedReport {
    pub report: Report,
    pub discovery: DiscoveryOutcome,
}

/// Report lifecycle and match bookkeeping around the matching engine
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn MatchStore>,
    discovery: MatchDiscoveryEngine,
}

impl ReportService {
    pub fn new(store: Arc<dyn MatchStore>, discovery: MatchDiscoveryEngine) -> Self {
        Self { store, discovery }
    }

    /// Persist a report, then run discovery synchronously for LOST/FOUND
    ///
    /// Discovery problems end up in [`CreatedReport::discovery`]; only the
    /// insert itself can fail this call.
    pub async fn create_report(&self, report: NewReport) -> Result<CreatedReport, ServiceError> {
        let report = self.store.create_report(report).await?;

        tracing::info!(
            "Created {:?} report {} in {}",
            report.report_type,
            report.id,
            report.district
        );

        let discovery = if report.report_type.is_matchable() {
            self.discovery.on_report_created(&report).await
        } else {
            DiscoveryOutcome::Skipped
        };

        if discovery.is_failed() {
            tracing::warn!("Report {} created but match discovery did not complete", report.id);
        }

        Ok(CreatedReport { report, discovery })
    }

    pub async fn get_report(&self, id: Uuid) -> Result<Report, ServiceError> {
        self.store
            .get_report_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("report {}", id)))
    }

    pub async fn my_reports(&self, user_id: Uuid) -> Result<Vec<Report>, ServiceError> {
        Ok(self.store.list_reports_by_user(user_id).await?)
    }

    /// Reports within `radius_km` of a point, nearest first
    ///
    /// Storage narrows by bounding box; exact distances are computed here.
    pub async fn nearby_reports(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        report_type: Option<ReportType>,
        status: ReportStatus,
    ) -> Result<Vec<NearbyReport>, ServiceError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(ServiceError::Validation("coordinates must be finite".to_string()));
        }
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ServiceError::Validation("radius must be positive".to_string()));
        }

        let bbox = calculate_bounding_box(latitude, longitude, radius_km);
        let reports = self
            .store
            .find_reports_in_area(&bbox, status, report_type)
            .await?;

        let mut nearby: Vec<NearbyReport> = reports
            .into_iter()
            .map(|report| {
                let distance = haversine_distance(latitude, longitude, report.latitude, report.longitude);
                NearbyReport { report, distance }
            })
            .filter(|nearby| nearby.distance <= radius_km)
            .collect();

        nearby.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(nearby)
    }

    /// Move a report to RESOLVED. Only the owner may do this, and only once.
    pub async fn resolve_report(
        &self,
        id: Uuid,
        requester_id: Uuid,
        resolution: ResolveReport,
    ) -> Result<Report, ServiceError> {
        let report = self.get_report(id).await?;

        if !report.is_owned_by(requester_id) {
            return Err(ServiceError::Forbidden(format!(
                "report {} does not belong to the requester",
                id
            )));
        }

        if !report.is_active() {
            return Err(ServiceError::Conflict(format!("report {} is already resolved", id)));
        }

        let resolved = self
            .store
            .resolve_report(id, resolution)
            .await?
            .ok_or_else(|| ServiceError::Conflict(format!("report {} is already resolved", id)))?;

        tracing::info!("Report {} resolved (share as success: {})", id, resolved.share_as_success);

        Ok(resolved)
    }

    /// Matches touching any of the user's active LOST/FOUND reports
    pub async fn my_matches(&self, user_id: Uuid) -> Result<Vec<MatchWithReports>, ServiceError> {
        let report_ids: Vec<Uuid> = self
            .store
            .list_reports_by_user(user_id)
            .await?
            .into_iter()
            .filter(|report| report.is_active() && report.report_type.is_matchable())
            .map(|report| report.id)
            .collect();

        if report_ids.is_empty() {
            return Ok(Vec::new());
        }

        let matches = self.store.list_matches_for_reports(&report_ids).await?;
        self.with_reports(matches).await
    }

    pub async fn matches_for_report(
        &self,
        report_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Vec<MatchWithReports>, ServiceError> {
        let report = self.get_report(report_id).await?;

        if !report.is_owned_by(requester_id) {
            return Err(ServiceError::Forbidden(format!(
                "report {} does not belong to the requester",
                report_id
            )));
        }

        let matches = self.store.list_matches_for_reports(&[report_id]).await?;
        self.with_reports(matches).await
    }

    /// Flag a match as notified; the requester must own one of its reports
    pub async fn mark_match_notified(
        &self,
        match_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Match, ServiceError> {
        let existing = self
            .store
            .get_match_by_id(match_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("match {}", match_id)))?;

        let mut owns_side = false;
        for report_id in [existing.lost_report_id, existing.found_report_id] {
            if let Some(report) = self.store.get_report_by_id(report_id).await? {
                if report.is_owned_by(requester_id) {
                    owns_side = true;
                    break;
                }
            }
        }

        if !owns_side {
            return Err(ServiceError::Forbidden(format!(
                "match {} does not involve the requester's reports",
                match_id
            )));
        }

        self.store
            .mark_match_notified(match_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("match {}", match_id)))
    }

    /// Public counters plus the latest shared success stories
    pub async fn global_stats(&self) -> Result<GlobalStats, ServiceError> {
        let resolved = |report_type| ReportCount {
            report_type,
            status: Some(ReportStatus::Resolved),
            ..Default::default()
        };

        let (total_resolved, lost, found, injured, active_reports, successful_matches, recent) =
            tokio::try_join!(
                self.store.count_reports(resolved(None)),
                self.store.count_reports(resolved(Some(ReportType::Lost))),
                self.store.count_reports(resolved(Some(ReportType::Found))),
                self.store.count_reports(resolved(Some(ReportType::Injured))),
                self.store.count_reports(ReportCount {
                    status: Some(ReportStatus::Active),
                    ..Default::default()
                }),
                self.store.count_matches(MatchCount {
                    status: Some(MatchStatus::Contacted),
                    ..Default::default()
                }),
                self.store.recent_successes(RECENT_SUCCESS_LIMIT),
            )?;

        Ok(GlobalStats {
            total_resolved,
            by_type: ResolvedByType {
                lost,
                found,
                injured,
            },
            active_reports,
            successful_matches,
            recent_successes: recent.into_iter().map(SuccessStory::from).collect(),
        })
    }

    pub async fn user_stats(&self, user_id: Uuid) -> Result<UserStats, ServiceError> {
        let (total_reports, active_reports, total_matches) = tokio::try_join!(
            self.store.count_reports(ReportCount {
                user_id: Some(user_id),
                ..Default::default()
            }),
            self.store.count_reports(ReportCount {
                user_id: Some(user_id),
                status: Some(ReportStatus::Active),
                ..Default::default()
            }),
            self.store.count_matches(MatchCount {
                user_id: Some(user_id),
                ..Default::default()
            }),
        )?;

        Ok(UserStats {
            total_reports,
            active_reports,
            total_matches,
        })
    }

    /// Attach both reports to each match, loading every report once
    async fn with_reports(
        &self,
        matches: Vec<Match>,
    ) -> Result<Vec<MatchWithReports>, ServiceError> {
        let mut reports: HashMap<Uuid, Option<Report>> = HashMap::new();
        for m in &matches {
            for id in [m.lost_report_id, m.found_report_id] {
                if !reports.contains_key(&id) {
                    let report = self.store.get_report_by_id(id).await?;
                    reports.insert(id, report);
                }
            }
        }

        let mut embedded = Vec::with_capacity(matches.len());
        for m in matches {
            let lost = reports.get(&m.lost_report_id).cloned().flatten();
            let found = reports.get(&m.found_report_id).cloned().flatten();

            match (lost, found) {
                (Some(lost_report), Some(found_report)) => embedded.push(MatchWithReports {
                    details: m,
                    lost_report,
                    found_report,
                }),
                _ => tracing::warn!("Match {} references a missing report, skipping", m.id),
            }
        }

        Ok(embedded)
    }
}
