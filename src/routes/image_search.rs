use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::core::image::detect_food;
use crate::error::ApiError;
use crate::models::{
    HistoryQuery, ImageMatch, ImageSearchDetail, ImageSearchResponse, ImageSearchSummary, ImageUploadQuery,
};
use crate::routes::{AppState, AuthenticatedUser};
use crate::services::SearchParams;

/// Restaurants recorded in the search history row
const HISTORY_RESULTS: usize = 5;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", web::post().to(upload))
        .route("/results/{search_id}", web::get().to(results))
        .route("/history", web::get().to(history));
}

/// Multipart field that carries the photo
const UPLOAD_FIELD: &str = "file";

/// File name of the `file` part; other parts are skipped, a non-image file is rejected
async fn read_image_upload(mut payload: Multipart) -> Result<Option<String>, ApiError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;

        if field.name() != Some(UPLOAD_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;
            }
            continue;
        }

        let is_image = field
            .content_type()
            .map(|ct| ct.essence_str().starts_with("image/"))
            .unwrap_or(false);
        if !is_image {
            return Err(ApiError::BadRequest("File must be an image".to_string()));
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);

        let mut size = 0usize;
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::BadRequest(format!("Upload interrupted: {}", e)))?;
            size += chunk.len();
        }
        tracing::debug!("Received image upload {:?} ({} bytes)", filename, size);

        return Ok(Some(filename.unwrap_or_default()));
    }

    Ok(None)
}

/// POST /api/v1/image-search/upload?location=...
///
/// Guesses the dish from the upload and searches restaurants serving it.
async fn upload(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<ImageUploadQuery>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;

    let filename = read_image_upload(payload)
        .await?
        .ok_or_else(|| ApiError::BadRequest("An image file is required".to_string()))?;
    let detected = detect_food(Some(filename.as_str()).filter(|f| !f.is_empty()));

    let params = SearchParams {
        term: Some(detected.dish.to_string()),
        categories: Some(detected.category.to_string()),
        sort_by: "rating".to_string(),
        limit: 10,
        ..SearchParams::at(&query.location)
    };
    let restaurants = state.yelp.search(&params).await?.businesses;

    let summary: Vec<_> = restaurants
        .iter()
        .take(HISTORY_RESULTS)
        .map(|r| json!({ "id": r.id, "name": r.name }))
        .collect();
    let record = state
        .postgres
        .create_image_search(
            user.id,
            detected.dish,
            detected.cuisine,
            detected.confidence,
            json!(summary),
        )
        .await?;

    tracing::info!(
        "Image search {} by {}: {} ({} restaurants)",
        record.id,
        user.id,
        detected.dish,
        restaurants.len()
    );

    let match_reason = format!("Serves {} and similar dishes", detected.dish);
    Ok(HttpResponse::Ok().json(ImageSearchResponse {
        id: record.id,
        detected_dish: detected.dish.to_string(),
        detected_cuisine: detected.cuisine.to_string(),
        confidence: detected.confidence,
        restaurants: restaurants
            .into_iter()
            .map(|restaurant| ImageMatch {
                restaurant,
                match_reason: match_reason.clone(),
            })
            .collect(),
    }))
}

async fn results(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let search = state
        .postgres
        .get_image_search(path.into_inner(), user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Search"))?;

    Ok(HttpResponse::Ok().json(ImageSearchDetail {
        id: search.id,
        detected_dish: search.detected_dish,
        detected_cuisine: search.detected_cuisine,
        confidence: search.confidence_score,
        results: search.results,
        created_at: search.created_at,
    }))
}

async fn history(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;

    let searches: Vec<ImageSearchSummary> = state
        .postgres
        .list_image_searches(user.id, query.limit)
        .await?
        .into_iter()
        .map(|s| ImageSearchSummary {
            id: s.id,
            result_count: s.results.as_array().map_or(0, Vec::len),
            detected_dish: s.detected_dish,
            detected_cuisine: s.detected_cuisine,
            confidence: s.confidence_score,
            created_at: s.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(searches))
}
