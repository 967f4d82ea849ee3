use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::core::quiz::{calculate_taste_dna, quiz_questions};
use crate::error::ApiError;
use crate::models::{QuizResponse, QuizSubmission, TasteDnaCalculationResult, TasteDnaCard};
use crate::routes::{AppState, AuthenticatedUser};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/quiz", web::get().to(get_quiz))
        .route("/quiz/submit", web::post().to(submit_quiz))
        .route("/profile", web::get().to(get_profile))
        .route("/regenerate", web::post().to(submit_quiz))
        .route("/card", web::get().to(get_card));
}

async fn get_quiz(_user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let questions = quiz_questions();
    Ok(HttpResponse::Ok().json(QuizResponse {
        total_questions: questions.len(),
        questions,
    }))
}

/// POST /api/v1/taste-dna/quiz/submit and /regenerate
///
/// Stores the profile, runs the twin pipeline and drops the cached twin
/// lists of the caller and of every twin found.
async fn submit_quiz(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    submission: web::Json<QuizSubmission>,
) -> Result<HttpResponse, ApiError> {
    let submission = submission.into_inner();
    let profile = calculate_taste_dna(&submission.answers);
    let answers = serde_json::to_value(&submission.answers).ok();

    let taste_dna = state.postgres.upsert_taste_dna(user.id, &profile, answers).await?;
    let twins = state.twins.process_profile_update(user.id, &profile).await?;

    award_once(&state, user.id, "first_quiz").await;
    if !twins.is_empty() {
        award_once(&state, user.id, "first_twin").await;
    }

    tracing::info!("TasteDNA computed for user {} with {} twins", user.id, twins.len());

    Ok(HttpResponse::Ok().json(TasteDnaCalculationResult {
        top_twin_similarity: twins.first().map(|t| t.similarity_score),
        twin_count: twins.len(),
        taste_dna,
    }))
}

/// Achievements are a side effect; failing to record one never fails the quiz
async fn award_once(state: &AppState, user_id: Uuid, achievement: &str) {
    let result = async {
        if !state.postgres.has_achievement(user_id, achievement).await? {
            state.postgres.award_achievement(user_id, achievement, None).await?;
        }
        Ok::<_, crate::services::PostgresError>(())
    }
    .await;

    if let Err(e) = result {
        tracing::warn!("Failed to award {} to {}: {}", achievement, user_id, e);
    }
}

async fn get_profile(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let dna = state.require_taste_dna(user.id).await?;
    Ok(HttpResponse::Ok().json(dna))
}

async fn get_card(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let dna = state.require_taste_dna(user.id).await?;
    let twin_count = state.twins.get_twin_count(user.id).await?;

    Ok(HttpResponse::Ok().json(TasteDnaCard {
        user_name: user.name,
        adventure_score: dna.adventure_score,
        spice_tolerance: dna.spice_tolerance,
        price_sensitivity: dna.price_sensitivity,
        cuisine_diversity: dna.cuisine_diversity,
        ambiance_preference: dna.ambiance_preference,
        top_cuisines: dna.preferred_cuisines.into_iter().take(5).collect(),
        twin_count,
    }))
}
