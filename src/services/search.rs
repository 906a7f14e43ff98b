use std::sync::Arc;
use uuid::Uuid;

use crate::core::{filters::candidate_query_for, similarity::extract_matched_keywords, Matcher};
use crate::error::ServiceError;
use crate::models::{MatchPolicy, RadiusMatch, RadiusSearchResult};
use crate::services::store::MatchStore;

/// Radius search tuning, loaded from the `search` config section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub default_radius_km: f64,
    pub max_radius_km: f64,
    pub min_score: u8,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_radius_km: 2.0,
            max_radius_km: 50.0,
            min_score: 30,
        }
    }
}

/// On-demand, read-only re-run of discovery with a caller-chosen radius
#[derive(Clone)]
pub struct RadiusSearchService {
    store: Arc<dyn MatchStore>,
    settings: SearchSettings,
}

impl RadiusSearchService {
    pub fn new(store: Arc<dyn MatchStore>, settings: SearchSettings) -> Self {
        Self { store, settings }
    }

    /// Rank opposite-type candidates around one of the requester's reports
    ///
    /// Unlike discovery there is no time window and nothing is persisted.
    /// Each hit carries the keywords that explain its description score.
    /// Existence and ownership are checked before the radius is validated.
    pub async fn search_with_radius(
        &self,
        report_id: Uuid,
        requester_id: Uuid,
        radius_km: Option<f64>,
    ) -> Result<RadiusSearchResult, ServiceError> {
        let source = self
            .store
            .get_report_by_id(report_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("report {}", report_id)))?;

        if !source.is_owned_by(requester_id) {
            return Err(ServiceError::Forbidden(format!(
                "report {} does not belong to the requester",
                report_id
            )));
        }

        let radius_km = self.resolve_radius(radius_km)?;

        let Some(query) = candidate_query_for(&source, None) else {
            return Ok(RadiusSearchResult {
                count: 0,
                radius_km,
                matches: Vec::new(),
            });
        };

        let candidates = self
            .store
            .find_active_reports(query.report_type, &query.district, None)
            .await?;

        let matcher = Matcher::new(MatchPolicy {
            max_radius_km: radius_km,
            min_score: self.settings.min_score,
        });
        let result = matcher.find_matches(&source, candidates);

        let matches: Vec<RadiusMatch> = result
            .matches
            .into_iter()
            .map(|scored| {
                let matched_keywords = extract_matched_keywords(
                    source.description.as_deref(),
                    scored.report.description.as_deref(),
                );
                RadiusMatch {
                    report: scored.report,
                    distance_km: scored.distance_km,
                    match_score: scored.match_score,
                    matched_keywords,
                }
            })
            .collect();

        tracing::info!(
            "Radius search for report {} ({}km): {} of {} candidates",
            report_id,
            radius_km,
            matches.len(),
            result.total_candidates
        );

        Ok(RadiusSearchResult {
            count: matches.len(),
            radius_km,
            matches,
        })
    }

    fn resolve_radius(&self, radius_km: Option<f64>) -> Result<f64, ServiceError> {
        let radius_km = radius_km.unwrap_or(self.settings.default_radius_km);

        if !radius_km.is_finite() || radius_km <= 0.0 || radius_km > self.settings.max_radius_km {
            return Err(ServiceError::Validation(format!(
                "radius must be within (0, {}] km, got {}",
                self.settings.max_radius_km, radius_km
            )));
        }

        Ok(radius_km)
    }
}
