use chrono::{DateTime, Utc};

use crate::core::similarity::description_similarity;
use crate::models::Report;

/// Bonus when both reports name the same animal type
const ANIMAL_TYPE_BONUS: f64 = 10.0;

/// Points lost per day between the two reports
const PENALTY_PER_DAY: f64 = 2.0;

const MAX_TIME_PENALTY: f64 = 10.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Calculate a match score (0-100) for a pair of reports
///
/// Scoring formula:
/// score = (
///     distance_bucket +            # 40 / 35 / 30 / 20 by proximity
///     animal_type_bonus +          # +10 on case-insensitive equality
///     description_similarity -     # 0-50, see core::similarity
///     time_decay_penalty           # 2 per day apart, at most 10
/// ) clamped to [0, 100] and rounded
///
/// Pure: the caller supplies the precomputed great-circle distance.
pub fn calculate_match_score(a: &Report, b: &Report, distance_km: f64) -> u8 {
    let mut score = f64::from(distance_score(distance_km));

    if same_animal_type(&a.animal_type, &b.animal_type) {
        score += ANIMAL_TYPE_BONUS;
    }

    score += f64::from(description_similarity(
        a.description.as_deref(),
        b.description.as_deref(),
    ));

    score -= time_decay_penalty(a.created_at, b.created_at);

    score.clamp(0.0, 100.0).round() as u8
}

/// Step score for proximity; anything past 2km (or NaN) gets the floor value
#[inline]
pub fn distance_score(distance_km: f64) -> u8 {
    if distance_km <= 0.5 {
        40
    } else if distance_km <= 1.0 {
        35
    } else if distance_km <= 2.0 {
        30
    } else {
        20
    }
}

/// Penalty for reports filed far apart in time, `min(|days| * 2, 10)`
#[inline]
pub fn time_decay_penalty(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    let seconds = (a - b).num_seconds().unsigned_abs() as f64;
    let days = seconds / SECONDS_PER_DAY;

    (days * PENALTY_PER_DAY).min(MAX_TIME_PENALTY)
}

#[inline]
fn same_animal_type(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReportStatus, ReportType};
    use chrono::Duration;
    use uuid::Uuid;

    fn create_test_report(
        report_type: ReportType,
        animal_type: &str,
        description: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Report {
        Report {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            report_type,
            animal_type: animal_type.to_string(),
            description: description.map(str::to_string),
            photo_url: None,
            latitude: -13.4103,
            longitude: -76.1344,
            address: "Av. Benavides 789".to_string(),
            district: "Chincha Alta".to_string(),
            province: "Chincha".to_string(),
            contact_phone: "987654321".to_string(),
            contact_name: "Ana".to_string(),
            status: ReportStatus::Active,
            created_at,
            resolved_at: None,
            resolution_note: None,
            share_as_success: false,
        }
    }

    #[test]
    fn test_distance_buckets() {
        assert_eq!(distance_score(0.0), 40);
        assert_eq!(distance_score(0.5), 40);
        assert_eq!(distance_score(0.51), 35);
        assert_eq!(distance_score(1.0), 35);
        assert_eq!(distance_score(1.5), 30);
        assert_eq!(distance_score(2.0), 30);
        assert_eq!(distance_score(2.01), 20);
        assert_eq!(distance_score(f64::NAN), 20);
    }

    #[test]
    fn test_distance_score_is_monotonic() {
        let mut previous = distance_score(0.0);
        for step in 1..=60 {
            let current = distance_score(step as f64 * 0.05);
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn test_time_decay_penalty() {
        let now = Utc::now();
        assert_eq!(time_decay_penalty(now, now), 0.0);
        assert_eq!(time_decay_penalty(now, now - Duration::days(2)), 4.0);
        assert_eq!(time_decay_penalty(now - Duration::days(2), now), 4.0);
        assert_eq!(time_decay_penalty(now, now - Duration::days(30)), MAX_TIME_PENALTY);
        assert_eq!(time_decay_penalty(now, now - Duration::hours(12)), 1.0);
    }

    #[test]
    fn test_close_same_day_same_species() {
        let now = Utc::now();
        let lost = create_test_report(ReportType::Lost, "Perro", Some("labrador negro con collar"), now);
        let found = create_test_report(ReportType::Found, "perro", Some("vi un labrador oscuro"), now);

        // 40 + 10 + (15 + 20)
        assert_eq!(calculate_match_score(&lost, &found, 0.3), 85);
    }

    #[test]
    fn test_animal_type_mismatch_is_soft() {
        let now = Utc::now();
        let lost = create_test_report(ReportType::Lost, "perro", None, now);
        let found = create_test_report(ReportType::Found, "gato", None, now);

        assert_eq!(calculate_match_score(&lost, &found, 0.2), 40);
    }

    #[test]
    fn test_stale_far_pair_floors() {
        let now = Utc::now();
        let lost = create_test_report(ReportType::Lost, "perro", None, now - Duration::days(20));
        let found = create_test_report(ReportType::Found, "gato", None, now);

        assert_eq!(calculate_match_score(&lost, &found, 10.0), 10);
    }

    #[test]
    fn test_score_rounds_to_nearest() {
        let now = Utc::now();
        let lost = create_test_report(ReportType::Lost, "perro", None, now - Duration::hours(9));
        let found = create_test_report(ReportType::Found, "perro", None, now);

        // 40 + 10 - 0.75
        assert_eq!(calculate_match_score(&lost, &found, 0.1), 49);
    }

    #[test]
    fn test_score_bounded() {
        let now = Utc::now();
        let description = Some("labrador negro grande con collar azul");
        let lost = create_test_report(ReportType::Lost, "perro", description, now);
        let found = create_test_report(ReportType::Found, "perro", description, now);

        let score = calculate_match_score(&lost, &found, 0.0);
        assert_eq!(score, 100);
    }
}
