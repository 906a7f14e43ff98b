// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod similarity;

pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use filters::{candidate_query_for, is_candidate, opposite_type};
pub use matcher::{MatchResult, Matcher};
pub use scoring::{calculate_match_score, distance_score, time_decay_penalty};
pub use similarity::{description_similarity, extract_matched_keywords, similarity_breakdown};
