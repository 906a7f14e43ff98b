use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::models::{MatchListResponse, RadiusSearchQuery};
use crate::routes::{requester_id, ApiError, AppState};

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matches/mine", web::get().to(my_matches))
        .route("/matches/report/{report_id}", web::get().to(matches_for_report))
        .route("/matches/search/{report_id}", web::get().to(search_with_radius))
        .route("/matches/{match_id}/notified", web::patch().to(mark_notified));
}

async fn my_matches(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = requester_id(&http_req)?;
    let matches = state.reports.my_matches(user_id).await?;

    Ok(HttpResponse::Ok().json(MatchListResponse {
        count: matches.len(),
        matches,
    }))
}

async fn matches_for_report(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = requester_id(&http_req)?;
    let matches = state
        .reports
        .matches_for_report(path.into_inner(), user_id)
        .await?;

    Ok(HttpResponse::Ok().json(MatchListResponse {
        count: matches.len(),
        matches,
    }))
}

/// Radius search endpoint
///
/// GET /api/v1/matches/search/{report_id}?radius=3.5
///
/// Read-only: results are ranked and annotated but never stored.
async fn search_with_radius(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<RadiusSearchQuery>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = requester_id(&http_req)?;
    let result = state
        .search
        .search_with_radius(path.into_inner(), user_id, query.radius)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

async fn mark_notified(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user_id = requester_id(&http_req)?;
    let updated = state
        .reports
        .mark_match_notified(path.into_inner(), user_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "match": updated })))
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

    fn report_body(report_type: &str, lat: f64, description: &str) -> serde_json::Value {
        serde_json::json!({
            "type": report_type,
            "animalType": "perro",
            "description": description,
            "latitude": lat,
            "longitude": -76.1344,
            "address": "Av. Benavides 789",
            "district": "Chincha Alta",
            "contactPhone": "987654321",
            "contactName": "Ana"
        })
    }

    #[actix_web::test]
    async fn test_create_then_search() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure_routes),
        )
        .await;
        let owner = Uuid::new_v4();
        let finder = Uuid::new_v4();

        let req = test::TestRequest::post()
            .uri("/api/v1/reports")
            .insert_header((USER_ID_HEADER, owner.to_string()))
            .set_json(report_body("LOST", -13.4103, "labrador negro"))
            .to_request();
        let lost: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let lost_id = lost["report"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/v1/reports")
            .insert_header((USER_ID_HEADER, finder.to_string()))
            .set_json(report_body("FOUND", -13.4110, "labrador oscuro"))
            .to_request();
        let found: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found["discovery"]["outcome"], "completed");
        assert_eq!(found["discovery"]["matches"].as_array().unwrap().len(), 1);
        assert_eq!(found["discovery"]["matches"][0]["lostReportId"], lost_id.as_str());

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/matches/search/{}?radius=3", lost_id))
            .insert_header((USER_ID_HEADER, owner.to_string()))
            .to_request();
        let result: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result["count"], 1);
        assert_eq!(result["radiusKm"], 3.0);
        assert_eq!(result["matches"][0]["matchedKeywords"]["breed"], "labrador");
    }

    #[actix_web::test]
    async fn test_search_requires_owner() {
        let state = app_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;
        let owner = Uuid::new_v4();

        let req = test::TestRequest::post()
            .uri("/api/v1/reports")
            .insert_header((USER_ID_HEADER, owner.to_string()))
            .set_json(report_body("LOST", -13.4103, "gato"))
            .to_request();
        let lost: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let lost_id = lost["report"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/matches/search/{}", lost_id))
            .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/matches/search/{}", lost_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_unknown_report_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/matches/search/{}", Uuid::new_v4()))
            .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
