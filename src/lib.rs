//! Petmatch - lost & found animal report matching
//!
//! This library provides the matching engine that pairs LOST and FOUND
//! reports: great-circle distance, heuristic description similarity, a
//! bounded composite score, automatic discovery on report creation, and an
//! on-demand radius search.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    calculate_match_score, description_similarity, distance::haversine_distance, Matcher,
};
pub use error::ServiceError;
pub use models::{Match, MatchPolicy, MatchedKeywords, Report, ReportStatus, ReportType};
pub use services::{
    DiscoveryOutcome, InMemoryStore, MatchDiscoveryEngine, MatchStore, RadiusSearchService,
    ReportService,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let distance = haversine_distance(-13.4103, -76.1344, -13.4103, -76.1344);
        assert_eq!(distance, 0.0);
        assert_eq!(description_similarity(None, None), 0);
    }
}
