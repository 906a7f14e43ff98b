use crate::models::{CandidateQuery, Report, ReportType};

/// The report type a new report should be matched against
///
/// LOST pairs with FOUND and vice versa; INJURED reports never match.
#[inline]
pub fn opposite_type(report_type: ReportType) -> Option<ReportType> {
    match report_type {
        ReportType::Lost => Some(ReportType::Found),
        ReportType::Found => Some(ReportType::Lost),
        ReportType::Injured => None,
    }
}

/// Build the candidate query for a source report
///
/// `None` when the report type does not take part in matching.
pub fn candidate_query_for(
    source: &Report,
    created_after: Option<chrono::DateTime<chrono::Utc>>,
) -> Option<CandidateQuery> {
    Some(CandidateQuery {
        report_type: opposite_type(source.report_type)?,
        district: source.district.clone(),
        created_after,
    })
}

/// Check if a report satisfies a candidate query
///
/// Mirrors what storage filters on: active status, exact type, exact
/// district string, and the optional creation window.
#[inline]
pub fn is_candidate(report: &Report, query: &CandidateQuery) -> bool {
    if !report.is_active() {
        return false;
    }

    if report.report_type != query.report_type {
        return false;
    }

    // District is compared verbatim, no case folding
    if report.district != query.district {
        return false;
    }

    if let Some(created_after) = query.created_after {
        if report.created_at < created_after {
            return false;
        }
    }

    true
}
