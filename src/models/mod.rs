// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, CandidateQuery, Match, MatchCount, MatchPolicy, MatchStatus, MatchedKeywords,
    NewMatch, NewReport, Report, ReportCount, ReportStatus, ReportType, ResolveReport,
    ScoredCandidate,
};
pub use requests::{CreateReportRequest, NearbyQuery, RadiusSearchQuery, UpdateStatusRequest};
pub use responses::{
    ErrorResponse, GlobalStats, HealthResponse, MatchListResponse, MatchWithReports, NearbyReport,
    RadiusMatch, RadiusSearchResult, ReportListResponse, ResolvedByType, SuccessStory, UserStats,
};
