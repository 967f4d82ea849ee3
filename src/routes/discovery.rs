use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::discovery::{
    self, explain_factors, predict_taste, pros_cons, select_best, select_diverse_options, strong_twin_count,
    twin_activity_counts,
};
use crate::error::ApiError;
use crate::models::{
    CompareOption, CompareResponse, ExplainRequest, ExplainResponse, FeelingLuckyResponse, LocationQuery,
    MessageResponse, RestaurantWithExplanation, TrendingItem, TrendingQuery, TrendingResponse, User,
};
use crate::routes::{AppState, AuthenticatedUser};
use crate::services::SearchParams;

/// Twin actions that count towards trending
const TRENDING_ACTIONS: [&str; 3] = ["save", "book", "like"];
const TRENDING_WINDOW: i64 = 100;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/lucky", web::get().to(feeling_lucky))
        .route("/compare", web::get().to(compare))
        .route("/trending", web::get().to(trending))
        .route("/explain", web::post().to(explain))
        .route("/predict", web::get().to(predict));
}

fn require_quiz(user: &User) -> Result<(), ApiError> {
    if user.quiz_completed {
        Ok(())
    } else {
        Err(ApiError::QuizNotCompleted)
    }
}

/// GET /api/v1/discovery/lucky?location=...
///
/// One best-scoring restaurant. Falls back to a plain rating search when the
/// taste-driven search finds nothing.
async fn feeling_lucky(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<LocationQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    require_quiz(&user)?;
    let profile = state.require_taste_dna(user.id).await?.profile();
    let twins = state.twins.get_user_twins(user.id).await?;

    let mut restaurants = state.yelp.search_for_taste(&query.location, &profile, 10).await?;
    if restaurants.is_empty() {
        let params = SearchParams {
            sort_by: "rating".to_string(),
            limit: 10,
            ..SearchParams::at(&query.location)
        };
        restaurants = state.yelp.search(&params).await?.businesses;
    }

    let Some(best) = select_best(restaurants, &profile) else {
        return Ok(HttpResponse::Ok().json(MessageResponse::new("No restaurants found in your area")));
    };

    let twin_count = strong_twin_count(&twins);
    let explanation = discovery::explanation(&best.restaurant, best.score, &profile, &twins);

    Ok(HttpResponse::Ok().json(FeelingLuckyResponse {
        restaurant: RestaurantWithExplanation {
            restaurant: best.restaurant,
            explanation,
            match_score: best.score,
            twin_endorsements: twin_count,
        },
        twin_count,
        confidence: best.score,
    }))
}

async fn compare(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<LocationQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    require_quiz(&user)?;
    let profile = state.require_taste_dna(user.id).await?.profile();

    let restaurants = state.yelp.search_for_taste(&query.location, &profile, 20).await?;
    let options = select_diverse_options(restaurants, &profile, 3)
        .into_iter()
        .map(|scored| {
            let (pros, cons) = pros_cons(&scored.restaurant, &profile);
            let explanation = discovery::explanation(&scored.restaurant, scored.score, &profile, &[]);
            CompareOption {
                restaurant: scored.restaurant,
                match_score: scored.score,
                pros,
                cons,
                explanation,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(CompareResponse {
        options,
        recommendation: "Based on your TasteDNA, we recommend comparing these diverse options!".to_string(),
    }))
}

/// Restaurants the caller's twins recently saved, booked or liked
async fn trending(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<TrendingQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    require_quiz(&user)?;

    let twin_ids: Vec<_> = state
        .twins
        .get_user_twins(user.id)
        .await?
        .into_iter()
        .map(|t| t.twin_id)
        .collect();

    let interactions = state
        .postgres
        .recent_interactions(&twin_ids, &TRENDING_ACTIONS, TRENDING_WINDOW)
        .await?;
    let counts = twin_activity_counts(interactions.iter().map(|i| i.restaurant_id.as_str()), query.limit);

    let mut items = Vec::with_capacity(counts.len());
    for (restaurant_id, count) in counts {
        match state.yelp.get_business(&restaurant_id).await {
            Ok(restaurant) => items.push(TrendingItem {
                restaurant,
                twin_visits: count,
                trend_score: discovery::trend_score(count),
            }),
            Err(e) => tracing::debug!("Skipping trending restaurant {}: {}", restaurant_id, e),
        }
    }

    Ok(HttpResponse::Ok().json(TrendingResponse {
        items,
        time_period: "this_week".to_string(),
    }))
}

async fn explain(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<ExplainRequest>,
) -> Result<HttpResponse, ApiError> {
    let profile = state.require_taste_dna(user.id).await?.profile();
    let restaurant = state.yelp.get_business(&req.restaurant_id).await?;

    Ok(HttpResponse::Ok().json(ExplainResponse {
        restaurant_id: req.restaurant_id.clone(),
        restaurant_name: restaurant.name.clone(),
        explanation: "This restaurant is a great match based on your TasteDNA profile!".to_string(),
        match_factors: explain_factors(&restaurant, &profile),
        twin_insights: Some("Your Taste Twins also love restaurants with similar vibes.".to_string()),
    }))
}

async fn predict(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let profile = state.require_taste_dna(user.id).await?.profile();
    Ok(HttpResponse::Ok().json(predict_taste(&profile)))
}
