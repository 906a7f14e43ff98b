use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    CreateReportRequest, NearbyQuery, NewReport, ReportListResponse, ReportStatus, ResolveReport,
    UpdateStatusRequest,
};
use crate::routes::{requester_id, validation_error, ApiError, AppState};

/// Configure all report routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/reports", web::post().to(create_report))
        .route("/reports/stats", web::get().to(global_stats))
        .route("/reports/nearby", web::get().to(nearby_reports))
        .route("/reports/mine", web::get().to(my_reports))
        .route("/reports/mine/stats", web::get().to(my_stats))
        .route("/reports/{id}", web::get().to(get_report))
        .route("/reports/{id}/status", web::patch().to(update_status));
}

/// Create report endpoint
///
/// POST /api/v1/reports
///
/// LOST and FOUND reports trigger match discovery before the response is
/// sent; the outcome is returned under `discovery`.
async fn create_report(
    state: web::Data<AppState>,
    req: web::Json<CreateReportRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = requester_id(&http_req)?;
    req.validate().map_err(validation_error)?;

    let req = req.into_inner();
    let province = req
        .province
        .filter(|province| !province.trim().is_empty())
        .unwrap_or_else(|| req.district.clone());

    let created = state
        .reports
        .create_report(NewReport {
            user_id,
            report_type: req.report_type,
            animal_type: req.animal_type,
            description: Some(req.description),
            photo_url: req.photo_url,
            latitude: req.latitude,
            longitude: req.longitude,
            address: req.address,
            district: req.district,
            province,
            contact_phone: req.contact_phone,
            contact_name: req.contact_name,
        })
        .await?;

    Ok(HttpResponse::Created().json(created))
}

/// Reports around a point
///
/// GET /api/v1/reports/nearby?latitude=..&longitude=..&radius=10&type=LOST
async fn nearby_reports(
    state: web::Data<AppState>,
    query: web::Query<NearbyQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate().map_err(validation_error)?;

    let reports = state
        .reports
        .nearby_reports(
            query.latitude,
            query.longitude,
            query.radius,
            query.report_type,
            query.status,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ReportListResponse {
        count: reports.len(),
        reports,
    }))
}

async fn my_reports(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = requester_id(&http_req)?;
    let reports = state.reports.my_reports(user_id).await?;

    Ok(HttpResponse::Ok().json(ReportListResponse {
        count: reports.len(),
        reports,
    }))
}

/// Public banner counters
///
/// GET /api/v1/reports/stats
async fn global_stats(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let stats = state.reports.global_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

async fn my_stats(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = requester_id(&http_req)?;
    let stats = state.reports.user_stats(user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "stats": stats })))
}

async fn get_report(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let report = state.reports.get_report(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "report": report })))
}

/// Update report status
///
/// PATCH /api/v1/reports/{id}/status
///
/// Only `RESOLVED` is accepted as a target; resolution is one-way.
async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateStatusRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = requester_id(&http_req)?;
    req.validate().map_err(validation_error)?;

    let req = req.into_inner();
    if req.status != ReportStatus::Resolved {
        return Err(crate::error::ServiceError::Conflict(
            "reports can only move from ACTIVE to RESOLVED".to_string(),
        )
        .into());
    }

    let report = state
        .reports
        .resolve_report(
            path.into_inner(),
            user_id,
            ResolveReport {
                resolution_note: req.resolution_note,
                share_as_success: req.share_as_success,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "report": report })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{configure_routes, USER_ID_HEADER};
    use crate::services::{
        DiscoverySettings, InMemoryStore, MatchDiscoveryEngine, MatchStore, RadiusSearchService,
        ReportService, SearchSettings,
    };
    use actix_web::{http::StatusCode, test, App};
    use std::sync::Arc;

    fn app_state() -> AppState {
        let store: Arc<dyn MatchStore> = Arc::new(InMemoryStore::new());
        let discovery = MatchDiscoveryEngine::new(store.clone(), DiscoverySettings::default());
        AppState {
            store: store.clone(),
            reports: ReportService::new(store.clone(), discovery),
            search: RadiusSearchService::new(store, SearchSettings::default()),
        }
    }

    #[actix_web::test]
    async fn test_stats_routes() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure_routes),
        )
        .await;
        let owner = Uuid::new_v4();

        let req = test::TestRequest::post()
            .uri("/api/v1/reports")
            .insert_header((USER_ID_HEADER, owner.to_string()))
            .set_json(serde_json::json!({
                "type": "LOST",
                "animalType": "gato",
                "description": "gato siamés",
                "latitude": -13.4103,
                "longitude": -76.1344,
                "address": "Jr. Lima 120",
                "district": "Chincha Alta",
                "contactPhone": "956123456",
                "contactName": "Luis"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/v1/reports/stats").to_request();
        let stats: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["activeReports"], 1);
        assert_eq!(stats["totalResolved"], 0);
        assert_eq!(stats["byType"]["lost"], 0);
        assert_eq!(stats["recentSuccesses"].as_array().map(Vec::len), Some(0));

        let req = test::TestRequest::get()
            .uri("/api/v1/reports/mine/stats")
            .insert_header((USER_ID_HEADER, owner.to_string()))
            .to_request();
        let mine: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(mine["stats"]["totalReports"], 1);
        assert_eq!(mine["stats"]["activeReports"], 1);
        assert_eq!(mine["stats"]["totalMatches"], 0);

        let req = test::TestRequest::get().uri("/api/v1/reports/mine/stats").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
