use crate::core::{distance::haversine_distance, scoring::calculate_match_score};
use crate::models::{MatchPolicy, Report, ScoredCandidate};

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredCandidate>,
    pub total_candidates: usize,
}

/// Candidate pipeline shared by automatic discovery and radius search
///
/// # Pipeline Stages
/// 1. Great-circle distance, discarded beyond the policy radius
/// 2. Composite scoring
/// 3. Threshold filter
/// 4. Ranking
#[derive(Debug, Clone)]
pub struct Matcher {
    policy: MatchPolicy,
}

impl Matcher {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn with_default_policy() -> Self {
        Self {
            policy: MatchPolicy::default(),
        }
    }

    /// Score candidates against a source report
    ///
    /// Candidates are expected to be pre-filtered by the store (opposite type,
    /// active, same district). A NaN distance fails the radius comparison, so
    /// degenerate coordinates simply drop out.
    ///
    /// # Returns
    /// Surviving candidates sorted by score (descending) then distance (ascending)
    pub fn find_matches(&self, source: &Report, candidates: Vec<Report>) -> MatchResult {
        let total_candidates = candidates.len();

        let mut matches: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter(|candidate| candidate.id != source.id)
            // Stage 1: distance
            .filter_map(|candidate| {
                let distance_km = haversine_distance(
                    source.latitude,
                    source.longitude,
                    candidate.latitude,
                    candidate.longitude,
                );

                if distance_km <= self.policy.max_radius_km {
                    Some((candidate, distance_km))
                } else {
                    tracing::trace!(
                        "Candidate {} discarded at {:.3}km (radius {}km)",
                        candidate.id,
                        distance_km,
                        self.policy.max_radius_km
                    );
                    None
                }
            })
            // Stage 2 & 3: score and threshold
            .filter_map(|(candidate, distance_km)| {
                let match_score = calculate_match_score(source, &candidate, distance_km);

                if match_score >= self.policy.min_score {
                    Some(ScoredCandidate {
                        report: candidate,
                        distance_km,
                        match_score,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stage 4: sort by score (descending) and then by distance (ascending)
        matches.sort_by(|a, b| {
            b.match_score.cmp(&a.match_score).then_with(|| {
                a.distance_km
                    .partial_cmp(&b.distance_km)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        MatchResult {
            matches,
            total_candidates,
        }
    }
}
