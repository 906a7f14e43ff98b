//! Automatic match discovery, run right after a LOST or FOUND report is stored.
//!
//! Discovery is advisory. Whatever goes wrong in here is logged and reported
//! through [`DiscoveryOutcome`], never as an error, so report creation cannot
//! fail because matching did.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::core::{filters::candidate_query_for, Matcher};
use crate::models::{Match, MatchPolicy, NewMatch, Report};
use crate::services::store::MatchStore;

/// Discovery tuning, loaded from the `matching` config section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscoverySettings {
    pub policy: MatchPolicy,
    pub lookback_days: i64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            policy: MatchPolicy::default(),
            lookback_days: 30,
        }
    }
}

/// Step at which a discovery run gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStage {
    /// The lookback cut-off could not be represented
    ComputeWindow,
    FetchCandidates,
    PersistMatch,
}

/// What a discovery run did, for callers that want to look
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DiscoveryOutcome {
    /// The report type does not take part in matching
    Skipped,
    Completed {
        candidates: usize,
        matches: Vec<Match>,
    },
    Failed {
        stage: DiscoveryStage,
        error: String,
        /// Matches written before the failure
        persisted: Vec<Match>,
    },
}

impl DiscoveryOutcome {
    /// Matches written by this run, whether or not it finished
    pub fn matches(&self) -> &[Match] {
        match self {
            DiscoveryOutcome::Skipped => &[],
            DiscoveryOutcome::Completed { matches, .. } => matches,
            DiscoveryOutcome::Failed { persisted, .. } => persisted,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DiscoveryOutcome::Failed { .. })
    }
}

/// Finds and persists matches for newly created reports
#[derive(Clone)]
pub struct MatchDiscoveryEngine {
    store: Arc<dyn MatchStore>,
    matcher: Matcher,
    /// `None` when `lookback_days` is negative or too large for a `Duration`
    lookback: Option<Duration>,
}

impl MatchDiscoveryEngine {
    pub fn new(store: Arc<dyn MatchStore>, settings: DiscoverySettings) -> Self {
        Self {
            store,
            matcher: Matcher::new(settings.policy),
            lookback: (settings.lookback_days >= 0)
                .then(|| Duration::try_days(settings.lookback_days))
                .flatten(),
        }
    }

    /// Run discovery for a report that was just persisted
    pub async fn on_report_created(&self, report: &Report) -> DiscoveryOutcome {
        self.discover_at(report, Utc::now()).await
    }

    /// Same as [`on_report_created`](Self::on_report_created) with an explicit clock
    pub async fn discover_at(&self, report: &Report, now: DateTime<Utc>) -> DiscoveryOutcome {
        if !report.report_type.is_matchable() {
            tracing::debug!("Report {} ({:?}) skipped by discovery", report.id, report.report_type);
            return DiscoveryOutcome::Skipped;
        }

        let Some(created_after) = self.lookback.and_then(|lookback| now.checked_sub_signed(lookback))
        else {
            tracing::error!("Match discovery for {} has no usable lookback window", report.id);
            return DiscoveryOutcome::Failed {
                stage: DiscoveryStage::ComputeWindow,
                error: "lookback window out of range".to_string(),
                persisted: Vec::new(),
            };
        };

        let Some(query) = candidate_query_for(report, Some(created_after)) else {
            return DiscoveryOutcome::Skipped;
        };

        let candidates = match self
            .store
            .find_active_reports(query.report_type, &query.district, query.created_after)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!("Match discovery failed fetching candidates for {}: {}", report.id, e);
                return DiscoveryOutcome::Failed {
                    stage: DiscoveryStage::FetchCandidates,
                    error: e.to_string(),
                    persisted: Vec::new(),
                };
            }
        };

        let result = self.matcher.find_matches(report, candidates);
        let mut persisted = Vec::with_capacity(result.matches.len());

        for scored in &result.matches {
            let Some(new_match) =
                NewMatch::oriented(report, &scored.report, scored.match_score, scored.distance_km)
            else {
                tracing::warn!(
                    "Skipping candidate {} with non-opposite type {:?}",
                    scored.report.id,
                    scored.report.report_type
                );
                continue;
            };

            match self.store.create_match(new_match).await {
                Ok(created) => persisted.push(created),
                Err(e) => {
                    tracing::error!(
                        "Match discovery failed persisting {} <-> {}: {}",
                        new_match.lost_report_id,
                        new_match.found_report_id,
                        e
                    );
                    return DiscoveryOutcome::Failed {
                        stage: DiscoveryStage::PersistMatch,
                        error: e.to_string(),
                        persisted,
                    };
                }
            }
        }

        tracing::info!(
            "Discovery for report {} in {}: {} matches from {} candidates",
            report.id,
            report.district,
            persisted.len(),
            result.total_candidates
        );

        DiscoveryOutcome::Completed {
            candidates: result.total_candidates,
            matches: persisted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReportStatus, ReportType};
    use crate::services::InMemoryStore;
    use uuid::Uuid;

    fn create_test_report(report_type: ReportType) -> Report {
        Report {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            report_type,
            animal_type: "perro".to_string(),
            description: Some("labrador negro".to_string()),
            photo_url: None,
            latitude: -13.4103,
            longitude: -76.1344,
            address: "Av. Benavides 789".to_string(),
            district: "Chincha Alta".to_string(),
            province: "Chincha".to_string(),
            contact_phone: "987654321".to_string(),
            contact_name: "Ana".to_string(),
            status: ReportStatus::Active,
            created_at: Utc::now(),
            resolved_at: None,
            resolution_note: None,
            share_as_success: false,
        }
    }

    fn engine_with_lookback(lookback_days: i64) -> MatchDiscoveryEngine {
        MatchDiscoveryEngine::new(
            Arc::new(InMemoryStore::new()),
            DiscoverySettings {
                policy: MatchPolicy::default(),
                lookback_days,
            },
        )
    }

    #[tokio::test]
    async fn test_oversized_lookback_fails_without_panicking() {
        let report = create_test_report(ReportType::Lost);

        for lookback_days in [1_000_000_000, i64::MAX, -1] {
            let outcome = engine_with_lookback(lookback_days).on_report_created(&report).await;
            assert!(
                matches!(
                    outcome,
                    DiscoveryOutcome::Failed { stage: DiscoveryStage::ComputeWindow, .. }
                ),
                "lookback {} gave {:?}",
                lookback_days,
                outcome
            );
        }
    }

    #[tokio::test]
    async fn test_injured_skipped_before_window_check() {
        let report = create_test_report(ReportType::Injured);
        let outcome = engine_with_lookback(i64::MAX).on_report_created(&report).await;
        assert!(matches!(outcome, DiscoveryOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_completed_with_empty_store() {
        let report = create_test_report(ReportType::Found);
        let outcome = engine_with_lookback(30).on_report_created(&report).await;
        assert!(matches!(outcome, DiscoveryOutcome::Completed { candidates: 0, .. }));
    }
}
