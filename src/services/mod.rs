// Service exports
pub mod auth;
pub mod cache;
pub mod pinecone;
pub mod postgres;
pub mod twin_matching;
pub mod vector;
pub mod yelp;
pub mod yelp_ai;

pub use auth::{AuthError, Claims, JwtKeys};
pub use cache::{CacheError, CacheKey, CacheManager, CacheStats, LeaderboardScore};
pub use pinecone::PineconeIndex;
pub use postgres::{PostgresClient, PostgresError, TwinEdge};
pub use twin_matching::{MatchingError, MatchingOptions, TwinMatchingService};
pub use vector::{InMemoryVectorIndex, VectorIndex, VectorIndexError, VectorMatch, VectorRecord};
pub use yelp::{SearchParams, YelpClient, YelpError};
pub use yelp_ai::{AiChatResponse, ChatOptions, YelpAiClient};
