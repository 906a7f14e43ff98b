use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::models::{
    BoundingBox, Match, MatchCount, NewMatch, NewReport, Report, ReportCount, ReportStatus,
    ReportType, ResolveReport,
};
use crate::services::store::{MatchStore, StoreError};

const REPORT_COLUMNS: &str = r#"
    id, user_id, report_type, animal_type, description, photo_url,
    latitude, longitude, address, district, province, contact_phone, contact_name,
    status, created_at, resolved_at, resolution_note, share_as_success
"#;

const MATCH_COLUMNS: &str = r#"
    id, lost_report_id, found_report_id, match_score, distance,
    notified, notified_at, status, created_at
"#;

/// PostgreSQL-backed report and match store
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

fn report_from_row(row: &PgRow) -> Result<Report, StoreError> {
    Ok(Report {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        report_type: row.try_get("report_type")?,
        animal_type: row.try_get("animal_type")?,
        description: row.try_get("description")?,
        photo_url: row.try_get("photo_url")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        address: row.try_get("address")?,
        district: row.try_get("district")?,
        province: row.try_get("province")?,
        contact_phone: row.try_get("contact_phone")?,
        contact_name: row.try_get("contact_name")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        resolved_at: row.try_get("resolved_at")?,
        resolution_note: row.try_get("resolution_note")?,
        share_as_success: row.try_get("share_as_success")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, StoreError> {
    let raw_score: i16 = row.try_get("match_score")?;
    let match_score = u8::try_from(raw_score)
        .ok()
        .filter(|score| *score <= 100)
        .ok_or_else(|| StoreError::InvalidData(format!("match_score out of range: {}", raw_score)))?;

    Ok(Match {
        id: row.try_get("id")?,
        lost_report_id: row.try_get("lost_report_id")?,
        found_report_id: row.try_get("found_report_id")?,
        match_score,
        distance: row.try_get("distance")?,
        notified: row.try_get("notified")?,
        notified_at: row.try_get("notified_at")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn count_from_row(row: &PgRow) -> Result<u64, StoreError> {
    let count: i64 = row.try_get(0)?;
    u64::try_from(count).map_err(|_| StoreError::InvalidData(format!("negative count {}", count)))
}

fn reports_from_rows(rows: &[PgRow]) -> Result<Vec<Report>, StoreError> {
    rows.iter().map(report_from_row).collect()
}

#[async_trait]
impl MatchStore for PostgresStore {
    async fn create_report(&self, report: NewReport) -> Result<Report, StoreError> {
        let query = format!(
            r#"
            INSERT INTO reports (
                id, user_id, report_type, animal_type, description, photo_url,
                latitude, longitude, address, district, province, contact_phone, contact_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {REPORT_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(report.user_id)
            .bind(report.report_type)
            .bind(&report.animal_type)
            .bind(&report.description)
            .bind(&report.photo_url)
            .bind(report.latitude)
            .bind(report.longitude)
            .bind(&report.address)
            .bind(&report.district)
            .bind(&report.province)
            .bind(&report.contact_phone)
            .bind(&report.contact_name)
            .fetch_one(&self.pool)
            .await?;

        let created = report_from_row(&row)?;
        tracing::debug!("Inserted report {} ({:?})", created.id, created.report_type);

        Ok(created)
    }

    async fn get_report_by_id(&self, id: Uuid) -> Result<Option<Report>, StoreError> {
        let query = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(report_from_row).transpose()
    }

    async fn find_active_reports(
        &self,
        report_type: ReportType,
        district: &str,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Report>, StoreError> {
        let query = format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE report_type = $1
              AND status = 'ACTIVE'
              AND district = $2
              AND ($3::timestamptz IS NULL OR created_at >= $3)
            "#
        );

        let rows = sqlx::query(&query)
            .bind(report_type)
            .bind(district)
            .bind(created_after)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            "Found {} active {:?} reports in {}",
            rows.len(),
            report_type,
            district
        );

        reports_from_rows(&rows)
    }

    async fn find_reports_in_area(
        &self,
        bbox: &BoundingBox,
        status: ReportStatus,
        report_type: Option<ReportType>,
    ) -> Result<Vec<Report>, StoreError> {
        let query = format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE status = $1
              AND latitude BETWEEN $2 AND $3
              AND longitude BETWEEN $4 AND $5
              AND ($6::report_type IS NULL OR report_type = $6)
            ORDER BY created_at DESC
            "#
        );

        let rows = sqlx::query(&query)
            .bind(status)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .bind(report_type)
            .fetch_all(&self.pool)
            .await?;

        reports_from_rows(&rows)
    }

    async fn list_reports_by_user(&self, user_id: Uuid) -> Result<Vec<Report>, StoreError> {
        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE user_id = $1 ORDER BY created_at DESC"
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        reports_from_rows(&rows)
    }

    async fn resolve_report(
        &self,
        id: Uuid,
        resolution: ResolveReport,
    ) -> Result<Option<Report>, StoreError> {
        // The status guard keeps RESOLVED terminal even under concurrent updates
        let query = format!(
            r#"
            UPDATE reports
            SET status = 'RESOLVED',
                resolved_at = NOW(),
                resolution_note = COALESCE($2, resolution_note),
                share_as_success = COALESCE($3, share_as_success)
            WHERE id = $1 AND status = 'ACTIVE'
            RETURNING {REPORT_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(&resolution.resolution_note)
            .bind(resolution.share_as_success)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(report_from_row).transpose()
    }

    async fn create_match(&self, new_match: NewMatch) -> Result<Match, StoreError> {
        let query = format!(
            r#"
            INSERT INTO matches (id, lost_report_id, found_report_id, match_score, distance)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (lost_report_id, found_report_id)
            DO UPDATE SET
                match_score = EXCLUDED.match_score,
                distance = EXCLUDED.distance
            RETURNING {MATCH_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(new_match.lost_report_id)
            .bind(new_match.found_report_id)
            .bind(i16::from(new_match.match_score))
            .bind(new_match.distance)
            .fetch_one(&self.pool)
            .await?;

        let created = match_from_row(&row)?;

        tracing::debug!(
            "Upserted match {}: lost {} <-> found {} (score {})",
            created.id,
            created.lost_report_id,
            created.found_report_id,
            created.match_score
        );

        Ok(created)
    }

    async fn get_match_by_id(&self, id: Uuid) -> Result<Option<Match>, StoreError> {
        let query = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn list_matches_for_reports(&self, report_ids: &[Uuid]) -> Result<Vec<Match>, StoreError> {
        if report_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            r#"
            SELECT {MATCH_COLUMNS}
            FROM matches
            WHERE lost_report_id = ANY($1) OR found_report_id = ANY($1)
            ORDER BY match_score DESC, created_at DESC
            "#
        );

        let rows = sqlx::query(&query)
            .bind(report_ids)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn mark_match_notified(&self, id: Uuid) -> Result<Option<Match>, StoreError> {
        let query = format!(
            r#"
            UPDATE matches
            SET notified = TRUE,
                notified_at = COALESCE(notified_at, NOW())
            WHERE id = $1
            RETURNING {MATCH_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn count_reports(&self, filter: ReportCount) -> Result<u64, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*)
            FROM reports
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::report_type IS NULL OR report_type = $2)
              AND ($3::report_status IS NULL OR status = $3)
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.report_type)
        .bind(filter.status)
        .fetch_one(&self.pool)
        .await?;

        count_from_row(&row)
    }

    async fn count_matches(&self, filter: MatchCount) -> Result<u64, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*)
            FROM matches m
            WHERE ($1::match_status IS NULL OR m.status = $1)
              AND (
                $2::uuid IS NULL
                OR EXISTS (
                    SELECT 1 FROM reports r
                    WHERE r.user_id = $2
                      AND r.id IN (m.lost_report_id, m.found_report_id)
                )
              )
            "#,
        )
        .bind(filter.status)
        .bind(filter.user_id)
        .fetch_one(&self.pool)
        .await?;

        count_from_row(&row)
    }

    async fn recent_successes(&self, limit: usize) -> Result<Vec<Report>, StoreError> {
        let query = format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE status = 'RESOLVED' AND share_as_success
            ORDER BY resolved_at DESC NULLS LAST
            LIMIT $1
            "#
        );

        let rows = sqlx::query(&query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        reports_from_rows(&rows)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
