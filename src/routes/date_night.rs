use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::core::compatibility::{analysis, categorize, compatibility, compromise_cuisines, score_suggestions};
use crate::core::discovery::price_filter_for;
use crate::error::ApiError;
use crate::models::{
    CompatibilityResponse, DateNightSuggestionsResponse, MessageResponse, PairRequest, PairResponse, PartnerQuery,
    Restaurant, SuggestionsQuery, TasteProfile,
};
use crate::routes::{AppState, AuthenticatedUser};
use crate::services::SearchParams;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/pair", web::post().to(pair))
        .route("/compatibility", web::get().to(get_compatibility))
        .route("/suggestions", web::get().to(suggestions))
        .route("/unpair", web::delete().to(unpair));
}

/// Both partners' profiles; either one missing is a 404
async fn profiles(state: &AppState, user_id: Uuid, partner_id: Uuid) -> Result<(TasteProfile, TasteProfile), ApiError> {
    if user_id == partner_id {
        return Err(ApiError::BadRequest("Cannot pair with yourself".to_string()));
    }
    let mine = state.require_taste_dna(user_id).await?.profile();
    let theirs = state.require_taste_dna(partner_id).await?.profile();
    Ok((mine, theirs))
}

async fn pair(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<PairRequest>,
) -> Result<HttpResponse, ApiError> {
    let (mine, theirs) = profiles(&state, user.id, req.partner_id).await?;
    let result = compatibility(&mine, &theirs);
    let merged = serde_json::to_value(&result.merged).map_err(|e| ApiError::Internal(e.to_string()))?;

    state
        .postgres
        .upsert_pairing(user.id, req.partner_id, result.score, merged)
        .await?;

    tracing::info!("Paired {} with {} at {:.2}", user.id, req.partner_id, result.score);
    Ok(HttpResponse::Ok().json(PairResponse {
        message: "Pairing created successfully".to_string(),
        compatibility_score: result.score,
    }))
}

async fn get_compatibility(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<PartnerQuery>,
) -> Result<HttpResponse, ApiError> {
    let (mine, theirs) = profiles(&state, user.id, query.partner_id).await?;
    let result = compatibility(&mine, &theirs);

    Ok(HttpResponse::Ok().json(CompatibilityResponse {
        compatibility_score: result.score,
        compromise_cuisines: compromise_cuisines(&mine, &theirs, &result.common_cuisines),
        shared_cuisines: result.common_cuisines,
        differences: result.differences,
        analysis: analysis(result.score).to_string(),
    }))
}

/// GET /api/v1/date-night/suggestions?partner_id=...&location=...&limit=5
///
/// Yelp AI picks come first, then a Fusion search on the merged
/// preferences. An AI failure leaves only the search results.
async fn suggestions(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<SuggestionsQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let (mine, theirs) = profiles(&state, user.id, query.partner_id).await?;
    let result = compatibility(&mine, &theirs);

    let (ai_picks, ai_insight) = match state
        .yelp_ai
        .date_night_recommendations(&mine, &theirs, &query.location)
        .await
    {
        Ok(reply) => {
            let picks: Vec<Restaurant> = reply
                .businesses
                .into_iter()
                .filter_map(|b| serde_json::from_value(b).ok())
                .collect();
            (picks, reply.text)
        }
        Err(e) => {
            tracing::warn!("Yelp AI date night request failed: {}", e);
            (Vec::new(), String::new())
        }
    };

    let categories: Vec<String> = result.merged.preferred_cuisines.iter().take(3).cloned().collect();
    let params = SearchParams {
        categories: (!categories.is_empty()).then(|| categories.join(",")),
        price: Some(price_filter_for(result.merged.price_sensitivity).to_string()),
        sort_by: "rating".to_string(),
        limit: (query.limit * 2) as u32,
        ..SearchParams::at(&query.location)
    };
    let searched = state.yelp.search(&params).await?.businesses;

    let scored = score_suggestions(ai_picks, searched, &mine, &theirs, &result.common_cuisines, query.limit);
    let ai_insight = if scored.is_empty() && ai_insight.is_empty() {
        "We couldn't find matching restaurants at this time. Please try a different location or criteria.".to_string()
    } else {
        ai_insight
    };
    let buckets = categorize(scored, query.limit);

    Ok(HttpResponse::Ok().json(DateNightSuggestionsResponse {
        perfect_matches: buckets.perfect_matches,
        you_will_love: buckets.you_will_love,
        they_will_love: buckets.they_will_love,
        ai_insight,
    }))
}

async fn unpair(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<PartnerQuery>,
) -> Result<HttpResponse, ApiError> {
    state.postgres.deactivate_pairing(user.id, query.partner_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Pairing removed")))
}
