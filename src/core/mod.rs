// Core algorithm exports
pub mod compatibility;
pub mod discovery;
pub mod encoder;
pub mod features;
pub mod gamification;
pub mod image;
pub mod quiz;
pub mod twins;

pub use compatibility::{compatibility, Compatibility, MergedPreferences};
pub use discovery::{match_score, price_filter_for};
pub use encoder::{cosine_similarity, TasteEncoder, EMBEDDING_DIM};
pub use features::{feature_vector, FEATURE_DIM};
pub use quiz::{apply_interaction, calculate_taste_dna, quiz_questions};
