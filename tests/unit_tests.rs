// Unit tests for the petmatch scoring pipeline

use chrono::{DateTime, Duration, Utc};
use petmatch::core::{
    calculate_match_score, description_similarity, extract_matched_keywords,
    distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box},
    filters::{candidate_query_for, is_candidate, opposite_type},
    Matcher,
};
use petmatch::models::{MatchPolicy, NewMatch, Report, ReportStatus, ReportType};
use uuid::Uuid;

fn create_report(
    report_type: ReportType,
    lat: f64,
    lon: f64,
    description: Option<&str>,
    created_at: DateTime<Utc>,
) -> Report {
    Report {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        report_type,
        animal_type: "perro".to_string(),
        description: description.map(str::to_string),
        photo_url: None,
        latitude: lat,
        longitude: lon,
        address: "Jr. Lima 120".to_string(),
        district: "Chincha Alta".to_string(),
        province: "Chincha".to_string(),
        contact_phone: "956123456".to_string(),
        contact_name: "Luis".to_string(),
        status: ReportStatus::Active,
        created_at,
        resolved_at: None,
        resolution_note: None,
        share_as_success: false,
    }
}

#[test]
fn test_distance_same_point_is_zero() {
    assert_eq!(haversine_distance(-13.4103, -76.1344, -13.4103, -76.1344), 0.0);
}

#[test]
fn test_distance_chincha_points() {
    let distance = haversine_distance(-13.4103, -76.1344, -13.4250, -76.1280);
    assert!(distance > 1.7 && distance < 1.8, "got {}", distance);
}

#[test]
fn test_distance_is_bit_identical_on_repeat() {
    let first = haversine_distance(-13.4103, -76.1344, -13.4250, -76.1280);
    let second = haversine_distance(-13.4103, -76.1344, -13.4250, -76.1280);
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn test_bounding_box_contains_radius() {
    let bbox = calculate_bounding_box(-13.4103, -76.1344, 2.0);

    assert!(is_within_bounding_box(-13.4250, -76.1280, &bbox));
    assert!(!is_within_bounding_box(-13.5000, -76.1344, &bbox));
}

#[test]
fn test_similarity_color_and_overlap() {
    let score = description_similarity(
        Some("perro labrador color dorado"),
        Some("perro grande, color dorado, muy amigable"),
    );
    assert_eq!(score, 20);
}

#[test]
fn test_similarity_is_bounded() {
    let samples = [
        None,
        Some(""),
        Some("perro"),
        Some("labrador negro grande"),
        Some("gato siamés blanco pequeño con collar rojo"),
        Some("labrador negro grande con collar azul y placa"),
    ];

    for a in samples {
        for b in samples {
            let score = description_similarity(a, b);
            assert!(score <= 50);
            assert_eq!(score, description_similarity(b, a));
        }
    }
}

#[test]
fn test_keywords_explain_score() {
    let keywords = extract_matched_keywords(
        Some("perro labrador color dorado"),
        Some("perro grande, color dorado, muy amigable"),
    );

    assert_eq!(keywords.color.as_deref(), Some("dorado"));
    assert_eq!(keywords.size, None);
    assert_eq!(keywords.breed, None);
}

#[test]
fn test_match_score_close_same_day() {
    let now = Utc::now();
    let lost = create_report(ReportType::Lost, -13.4103, -76.1344, Some("labrador negro con collar"), now);
    let found = create_report(ReportType::Found, -13.4130, -76.1344, Some("vi un labrador oscuro"), now);

    assert_eq!(calculate_match_score(&lost, &found, 0.3), 85);
}

#[test]
fn test_match_score_never_leaves_range() {
    let now = Utc::now();
    let old = now - Duration::days(365);
    let a = create_report(ReportType::Lost, -13.4103, -76.1344, None, old);
    let mut b = create_report(ReportType::Found, -13.4103, -76.1344, None, now);
    b.animal_type = "gato".to_string();

    assert_eq!(calculate_match_score(&a, &b, 500.0), 10);
    assert_eq!(calculate_match_score(&a, &b, f64::NAN), 10);
}

#[test]
fn test_opposite_types() {
    assert_eq!(opposite_type(ReportType::Lost), Some(ReportType::Found));
    assert_eq!(opposite_type(ReportType::Found), Some(ReportType::Lost));
    assert_eq!(opposite_type(ReportType::Injured), None);
}

#[test]
fn test_candidate_filter_respects_district_and_window() {
    let now = Utc::now();
    let source = create_report(ReportType::Lost, -13.4103, -76.1344, None, now);
    let query = candidate_query_for(&source, Some(now - Duration::days(30))).unwrap();

    let fresh = create_report(ReportType::Found, -13.4110, -76.1344, None, now - Duration::days(3));
    assert!(is_candidate(&fresh, &query));

    let stale = create_report(ReportType::Found, -13.4110, -76.1344, None, now - Duration::days(31));
    assert!(!is_candidate(&stale, &query));

    let mut elsewhere = fresh.clone();
    elsewhere.district = "Pueblo Nuevo".to_string();
    assert!(!is_candidate(&elsewhere, &query));

    let mut resolved = fresh.clone();
    resolved.status = ReportStatus::Resolved;
    assert!(!is_candidate(&resolved, &query));

    let same_side = create_report(ReportType::Lost, -13.4110, -76.1344, None, now);
    assert!(!is_candidate(&same_side, &query));
}

#[test]
fn test_matcher_radius_threshold_and_order() {
    let now = Utc::now();
    let source = create_report(ReportType::Lost, -13.4103, -76.1344, Some("labrador negro"), now);

    let near_match = create_report(ReportType::Found, -13.4105, -76.1344, Some("labrador oscuro"), now);
    let near_plain = create_report(ReportType::Found, -13.4150, -76.1344, None, now);
    let outside = create_report(ReportType::Found, -13.4400, -76.1344, Some("labrador negro"), now);

    let matcher = Matcher::new(MatchPolicy::default());
    let result = matcher.find_matches(
        &source,
        vec![near_plain.clone(), outside.clone(), near_match.clone()],
    );

    assert_eq!(result.total_candidates, 3);
    assert_eq!(result.matches.len(), 2);
    assert_eq!(result.matches[0].report.id, near_match.id);
    assert_eq!(result.matches[1].report.id, near_plain.id);
    assert!(result.matches[0].match_score >= result.matches[1].match_score);
    assert!(result.matches.iter().all(|m| m.distance_km <= 2.0));
}

#[test]
fn test_matcher_threshold_drops_weak_pairs() {
    let now = Utc::now();
    let source = create_report(ReportType::Lost, -13.4103, -76.1344, None, now);
    let mut weak = create_report(ReportType::Found, -13.4110, -76.1344, None, now - Duration::days(10));
    weak.animal_type = "gato".to_string();

    let matcher = Matcher::new(MatchPolicy {
        max_radius_km: 2.0,
        min_score: 31,
    });

    // 40 + 0 + 0 - 10
    assert!(matcher.find_matches(&source, vec![weak]).matches.is_empty());
}

#[test]
fn test_new_match_orientation() {
    let now = Utc::now();
    let lost = create_report(ReportType::Lost, -13.4103, -76.1344, None, now);
    let found = create_report(ReportType::Found, -13.4110, -76.1344, None, now);
    let injured = create_report(ReportType::Injured, -13.4110, -76.1344, None, now);

    let from_lost = NewMatch::oriented(&lost, &found, 50, 0.1).unwrap();
    let from_found = NewMatch::oriented(&found, &lost, 50, 0.1).unwrap();

    assert_eq!(from_lost.lost_report_id, lost.id);
    assert_eq!(from_lost.found_report_id, found.id);
    assert_eq!(from_found.lost_report_id, lost.id);
    assert_eq!(from_found.found_report_id, found.id);
    assert!(NewMatch::oriented(&lost, &injured, 50, 0.1).is_none());
    assert!(NewMatch::oriented(&lost, &lost, 50, 0.1).is_none());
}
