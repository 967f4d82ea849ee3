use actix_web::{web, HttpResponse};
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::core::gamification::{
    achievement_info, challenge_percentage, share_text, DEFAULT_CHALLENGES, POINTS_PER_ACHIEVEMENT, REWARD_BOARD,
};
use crate::error::ApiError;
use crate::models::{
    AchievementResponse, AchievementsResponse, ChallengeListResponse, ChallengeProgress, LeaderboardEntry,
    LeaderboardQuery, LeaderboardResponse, MessageResponse, ProgressQuery, ProgressResponse, ShareCardRequest,
    ShareCardResponse, User,
};
use crate::routes::{AppState, AuthenticatedUser};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/challenges", web::get().to(list_challenges))
        .route("/challenges/{challenge_id}/join", web::post().to(join_challenge))
        .route("/challenges/{challenge_id}/progress", web::post().to(update_progress))
        .route("/leaderboard", web::get().to(leaderboard))
        .route("/achievements", web::get().to(achievements))
        .route("/share/taste-card", web::post().to(share_card));
}

/// Active challenges with the caller's progress; seeds the catalogue when empty
async fn list_challenges(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let mut challenges = state.postgres.list_active_challenges().await?;
    if challenges.is_empty() {
        tracing::info!("Seeding {} default challenges", DEFAULT_CHALLENGES.len());
        state.postgres.seed_challenges(&DEFAULT_CHALLENGES).await?;
        challenges = state.postgres.list_active_challenges().await?;
    }

    let mut response = ChallengeListResponse {
        active_challenges: Vec::new(),
        completed_challenges: Vec::new(),
    };

    for challenge in challenges {
        let progress = state.postgres.ensure_user_challenge(user.id, challenge.id).await?;
        let entry = ChallengeProgress {
            percentage: challenge_percentage(progress.progress, challenge.target_count),
            progress: progress.progress,
            completed: progress.completed,
            completed_at: progress.completed_at,
            challenge,
        };

        if entry.completed {
            response.completed_challenges.push(entry);
        } else {
            response.active_challenges.push(entry);
        }
    }

    Ok(HttpResponse::Ok().json(response))
}

async fn join_challenge(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let challenge_id = path.into_inner();
    state
        .postgres
        .get_challenge(challenge_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Challenge"))?;

    let message = if state.postgres.join_challenge(user.id, challenge_id).await? {
        "Joined challenge successfully"
    } else {
        "Already joined this challenge"
    };
    Ok(HttpResponse::Ok().json(MessageResponse::new(message)))
}

/// POST /api/v1/gamification/challenges/{id}/progress?increment=1
///
/// Reaching the target completes the challenge and credits its points to
/// the adventure leaderboard.
async fn update_progress(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<Uuid>,
    query: web::Query<ProgressQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let challenge_id = path.into_inner();

    let challenge = state
        .postgres
        .get_challenge(challenge_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Challenge"))?;
    let current = state
        .postgres
        .get_user_challenge(user.id, challenge_id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Not joined this challenge".to_string()))?;

    if current.completed {
        return Ok(HttpResponse::Ok().json(MessageResponse::new("Challenge already completed")));
    }

    let progress = current.progress.saturating_add(query.increment);
    let completed = progress >= challenge.target_count;
    let updated = state
        .postgres
        .update_challenge_progress(current.id, progress, completed)
        .await?;

    if completed {
        match state
            .cache
            .leaderboard_add(REWARD_BOARD, &user.id.to_string(), challenge.points_reward as f64)
            .await
        {
            Ok(total) => tracing::info!("User {} completed {} ({} points total)", user.id, challenge.title, total),
            Err(e) => tracing::warn!("Failed to credit points to {}: {}", user.id, e),
        }
    }

    Ok(HttpResponse::Ok().json(ProgressResponse {
        progress: updated.progress,
        completed: updated.completed,
        target: challenge.target_count,
    }))
}

async fn leaderboard(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    query: web::Query<LeaderboardQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let caller = user.id.to_string();

    let scores = state
        .cache
        .leaderboard_top(&query.board_type, query.limit)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Leaderboard {} unavailable: {}", query.board_type, e);
            Vec::new()
        });

    let ids: Vec<Uuid> = scores.iter().filter_map(|s| Uuid::parse_str(&s.user_id).ok()).collect();
    let users: HashMap<Uuid, User> = state
        .postgres
        .get_users(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let entries = scores
        .iter()
        .enumerate()
        .filter_map(|(i, s)| {
            let user = Uuid::parse_str(&s.user_id).ok().and_then(|id| users.get(&id))?;
            Some(LeaderboardEntry {
                rank: i + 1,
                user_id: user.id,
                user_name: user.name.clone(),
                avatar_url: user.avatar_url.clone(),
                score: s.score,
            })
        })
        .collect();

    let user_rank = state
        .cache
        .leaderboard_rank(&query.board_type, &caller)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Rank lookup failed for {}: {}", caller, e);
            None
        });
    let user_score = state.cache.user_score(&caller).await.unwrap_or_else(|e| {
        tracing::warn!("Score lookup failed for {}: {}", caller, e);
        0.0
    });

    Ok(HttpResponse::Ok().json(LeaderboardResponse {
        board_type: query.into_inner().board_type,
        entries,
        user_rank,
        user_score,
    }))
}

async fn achievements(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let earned = state.postgres.list_achievements(user.id).await?;
    let total_points = earned.len() as i64 * POINTS_PER_ACHIEVEMENT;

    let achievements = earned
        .into_iter()
        .map(|a| {
            let info = achievement_info(&a.achievement_type);
            AchievementResponse {
                id: a.id,
                title: info.map_or_else(|| a.achievement_type.clone(), |i| i.title.to_string()),
                description: info.map(|i| i.description.to_string()).unwrap_or_default(),
                icon: info.map_or("🏆", |i| i.icon).to_string(),
                achievement_type: a.achievement_type,
                earned_at: a.earned_at,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(AchievementsResponse {
        achievements,
        total_points,
    }))
}

/// Card data for client-side rendering plus a ready-made share text
async fn share_card(
    state: web::Data<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    req: web::Json<ShareCardRequest>,
) -> Result<HttpResponse, ApiError> {
    let dna = state.postgres.get_taste_dna(user.id).await?;
    let twin_count = state.twins.get_twin_count(user.id).await?;

    let Some(dna) = dna else {
        return Ok(HttpResponse::Ok().json(ShareCardResponse {
            card_url: None,
            card_data: json!({}),
            share_text: share_text(None, twin_count),
        }));
    };

    let mut card = json!({
        "user_name": user.name,
        "avatar_url": user.avatar_url,
        "adventure_score": dna.adventure_score,
        "spice_tolerance": dna.spice_tolerance,
        "price_sensitivity": dna.price_sensitivity,
        "cuisine_diversity": dna.cuisine_diversity,
        "ambiance": dna.ambiance_preference,
        "style": req.style,
    });
    if req.include_twins {
        card["twin_count"] = json!(twin_count);
    }
    if req.include_top_cuisines {
        card["top_cuisines"] = json!(dna.preferred_cuisines.iter().take(3).collect::<Vec<_>>());
    }

    Ok(HttpResponse::Ok().json(ShareCardResponse {
        card_url: None,
        card_data: card,
        share_text: share_text(Some(&dna.profile()), twin_count),
    }))
}
