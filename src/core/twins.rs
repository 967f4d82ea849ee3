//! Twin selection rules shared by the matching pipeline.
//!
//! The index returns raw neighbours; these helpers turn them into the
//! ordered, self-free, minimum-sized list the API exposes.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::core::encoder::cosine_similarity;
use crate::models::{TasteDna, TwinMatch, User};

/// A neighbour before it is enriched with account data
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub user_id: Uuid,
    pub score: f64,
}

/// How many neighbours to ask for when the caller gives no limit.
///
/// Uses the index size so every other user is a candidate, bounded by
/// `max_top_k`. An empty or unreadable index falls back to the bound.
pub fn default_top_k(index_count: u64, max_top_k: usize) -> usize {
    match index_count {
        0 => max_top_k,
        n => (n as usize).min(max_top_k),
    }
}

/// Neighbours to request so `top_k` remain after the querying user is
/// dropped. Never exceeds `max_top_k`, the largest query the index accepts.
pub fn query_size(top_k: usize, max_top_k: usize) -> usize {
    top_k.saturating_add(1).min(max_top_k)
}

/// Drop the querying user and keep the first `top_k` hits in index order
pub fn nearest_others(hits: Vec<Candidate>, self_id: Uuid, top_k: usize) -> Vec<Candidate> {
    hits.into_iter()
        .filter(|c| c.user_id != self_id)
        .take(top_k)
        .collect()
}

/// Cuisines both users listed, sorted
pub fn shared_cuisines(mine: &[String], theirs: &[String]) -> Vec<String> {
    let theirs: HashSet<&str> = theirs.iter().map(String::as_str).collect();
    let mut shared: Vec<String> = mine
        .iter()
        .filter(|c| theirs.contains(c.as_str()))
        .cloned()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    shared.sort();
    shared
}

/// Extra candidates to lift a short twin list up to `min_twins`.
///
/// `pool` holds other users with their locally computed embeddings. Users
/// in `exclude` and the querying user are skipped; the rest are ranked by
/// cosine similarity to `embedding`, best first.
pub fn fallback_candidates(
    self_id: Uuid,
    embedding: &[f32],
    pool: &[(Uuid, Vec<f32>)],
    exclude: &HashSet<Uuid>,
    found: usize,
    min_twins: usize,
) -> Vec<Candidate> {
    let needed = min_twins.saturating_sub(found);
    if needed == 0 {
        return Vec::new();
    }

    let mut scored: Vec<Candidate> = pool
        .iter()
        .filter(|(id, _)| *id != self_id && !exclude.contains(id))
        .map(|(id, other)| Candidate {
            user_id: *id,
            score: cosine_similarity(embedding, other),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(needed);
    scored
}

/// Join candidates with their account and taste rows.
///
/// Candidates whose user row is gone are dropped. A missing DNA row leaves
/// the trait scores at zero and the shared cuisine list empty.
pub fn enrich(
    candidates: &[Candidate],
    users: &HashMap<Uuid, User>,
    dnas: &HashMap<Uuid, TasteDna>,
    my_cuisines: &[String],
) -> Vec<TwinMatch> {
    candidates
        .iter()
        .filter_map(|c| {
            let user = users.get(&c.user_id)?;
            let dna = dnas.get(&c.user_id);
            Some(TwinMatch {
                twin_id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                avatar_url: user.avatar_url.clone(),
                similarity_score: c.score,
                shared_cuisines: dna
                    .map(|d| shared_cuisines(my_cuisines, &d.preferred_cuisines))
                    .unwrap_or_default(),
                adventure_score: dna.map_or(0.0, |d| d.adventure_score),
                spice_tolerance: dna.map_or(0.0, |d| d.spice_tolerance),
            })
        })
        .collect()
}

pub fn sort_by_similarity(twins: &mut [TwinMatch]) {
    twins.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
