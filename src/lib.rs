//! TasteSync - restaurant discovery driven by TasteDNA profiles
//!
//! A quiz turns into a TasteDNA profile, the profile into a 64-dimensional
//! feature vector and then a 512-dimensional unit embedding. Embeddings live
//! in a vector index; nearest neighbours become the user's Taste Twins,
//! mirrored into Postgres and cached.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_taste_dna, cosine_similarity, feature_vector, TasteEncoder, EMBEDDING_DIM, FEATURE_DIM};
pub use error::ApiError;
pub use models::{TasteDna, TasteProfile, TwinMatch, User};
