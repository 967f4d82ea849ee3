use moka::Expiry;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),

    #[error("Redis is not configured")]
    Unavailable,
}

#[derive(Clone)]
struct CachedEntry {
    bytes: Arc<Vec<u8>>,
    ttl: Duration,
}

/// Expires each L1 entry after the TTL it was written with
struct EntryTtl;

impl Expiry<String, CachedEntry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, value: &CachedEntry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// A single leaderboard row as stored in Redis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardScore {
    pub user_id: String,
    pub score: f64,
}

/// Multi-tier cache manager
///
/// L1 is an in-process `moka` cache, L2 is Redis and is shared across
/// instances. Without Redis the manager runs L1-only and leaderboard reads
/// come back empty.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, CachedEntry>,
    default_ttl: Duration,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, default_ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            ..Self::in_memory(l1_size, default_ttl_secs)
        })
    }

    /// Create an L1-only cache manager
    pub fn in_memory(l1_size: u64, default_ttl_secs: u64) -> Self {
        let l1_cache = moka::future::Cache::builder()
            .max_capacity(l1_size)
            .expire_after(EntryTtl)
            .build();

        Self {
            redis: None,
            l1_cache,
            default_ttl: Duration::from_secs(default_ttl_secs),
        }
    }

    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(entry) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&entry.bytes)?);
        }

        let Some(redis) = &self.redis else {
            return Err(CacheError::CacheMiss(key.to_string()));
        };

        let mut conn = redis.lock().await;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut *conn).await?;
        let ttl: i64 = if value.is_some() {
            redis::cmd("TTL").arg(key).query_async(&mut *conn).await?
        } else {
            -2
        };
        drop(conn);

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);

            // Keep L1 from outliving the L2 entry
            let ttl = if ttl > 0 { Duration::from_secs(ttl as u64) } else { self.default_ttl };
            self.insert_l1(key, json.as_bytes().to_vec(), ttl).await;

            return Ok(serde_json::from_str(&json)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Like [`get`](Self::get), but a miss or a broken cache both read as `None`
    pub async fn get_or_none<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.get(key).await {
            Ok(value) => Some(value),
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Set a value with the default TTL
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Set a value in both tiers with an explicit TTL
    pub async fn set_with_ttl<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;
        self.insert_l1(key, json.as_bytes().to_vec(), ttl).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(ttl.as_secs().max(1))
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {} (ttl {}s)", key, ttl.as_secs());
        Ok(())
    }

    async fn insert_l1(&self, key: &str, bytes: Vec<u8>, ttl: Duration) {
        let entry = CachedEntry { bytes: Arc::new(bytes), ttl };
        self.l1_cache.insert(key.to_string(), entry).await;
    }

    /// Delete a value from both cache tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("DEL").arg(key).query_async::<()>(&mut *conn).await?;
        }
        Ok(())
    }

    /// Delete and log instead of failing; used for invalidation after writes
    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.delete(key).await {
            tracing::warn!("Cache invalidation failed for {}: {}", key, e);
        }
    }

    /// Add `points` to a member's leaderboard score and return the new total
    pub async fn leaderboard_add(&self, board: &str, user_id: &str, points: f64) -> Result<f64, CacheError> {
        let redis = self.redis.as_ref().ok_or(CacheError::Unavailable)?;
        let mut conn = redis.lock().await;

        let total: f64 = redis::cmd("ZINCRBY")
            .arg(CacheKey::leaderboard(board))
            .arg(points)
            .arg(user_id)
            .query_async(&mut *conn)
            .await?;

        redis::cmd("SET")
            .arg(CacheKey::user_score(user_id))
            .arg(total)
            .query_async::<()>(&mut *conn)
            .await?;

        Ok(total)
    }

    /// Top `limit` members, highest score first; at least one is requested
    pub async fn leaderboard_top(&self, board: &str, limit: isize) -> Result<Vec<LeaderboardScore>, CacheError> {
        let Some(redis) = &self.redis else {
            return Ok(Vec::new());
        };
        let last = leaderboard_stop(limit);
        let mut conn = redis.lock().await;

        let rows: Vec<(String, f64)> = redis::cmd("ZREVRANGE")
            .arg(CacheKey::leaderboard(board))
            .arg(0)
            .arg(last)
            .arg("WITHSCORES")
            .query_async(&mut *conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, score)| LeaderboardScore { user_id, score })
            .collect())
    }

    /// 1-based rank of a member, `None` when unranked
    pub async fn leaderboard_rank(&self, board: &str, user_id: &str) -> Result<Option<i64>, CacheError> {
        let Some(redis) = &self.redis else {
            return Ok(None);
        };
        let mut conn = redis.lock().await;

        let rank: Option<i64> = redis::cmd("ZREVRANK")
            .arg(CacheKey::leaderboard(board))
            .arg(user_id)
            .query_async(&mut *conn)
            .await?;

        Ok(rank.map(|r| r + 1))
    }

    pub async fn user_score(&self, user_id: &str) -> Result<f64, CacheError> {
        let Some(redis) = &self.redis else {
            return Ok(0.0);
        };
        let mut conn = redis.lock().await;

        let score: Option<f64> = redis::cmd("GET")
            .arg(CacheKey::user_score(user_id))
            .query_async(&mut *conn)
            .await?;

        Ok(score.unwrap_or(0.0))
    }

    pub async fn health_check(&self) -> Result<(), CacheError> {
        let redis = self.redis.as_ref().ok_or(CacheError::Unavailable)?;
        let mut conn = redis.lock().await;
        redis::cmd("PING").query_async::<String>(&mut *conn).await?;
        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            l1_size: self.l1_cache.entry_count(),
            redis_enabled: self.redis.is_some(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub l1_size: u64,
    pub redis_enabled: bool,
}

/// Inclusive ZREVRANGE stop index for the first `limit` members.
/// A stop of -1 would mean the whole set, so `limit` is floored at one.
fn leaderboard_stop(limit: isize) -> isize {
    limit.max(1) - 1
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Twin list for a user
    pub fn twins(user_id: &str) -> String {
        format!("twins:{}", user_id)
    }

    /// Yelp business detail
    pub fn restaurant(yelp_id: &str) -> String {
        format!("restaurant:{}", yelp_id)
    }

    pub fn leaderboard(board: &str) -> String {
        format!("leaderboard:{}", board)
    }

    pub fn user_score(user_id: &str) -> String {
        format!("user:score:{}", user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_set_get() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        let key = "test_key";
        let value = "test_value";

        cache.set(key, &value).await.unwrap();
        let result: String = cache.get(key).await.unwrap();
        assert_eq!(result, value);

        cache.delete(key).await.unwrap();
        assert!(cache.get::<String>(key).await.is_err());
    }

    #[tokio::test]
    async fn test_l1_only_round_trip_and_delete() {
        let cache = CacheManager::in_memory(100, 60);
        assert!(!cache.has_redis());

        cache
            .set_with_ttl("twins:abc", &vec![1, 2, 3], Duration::from_secs(900))
            .await
            .unwrap();
        let value: Vec<i32> = cache.get("twins:abc").await.unwrap();
        assert_eq!(value, vec![1, 2, 3]);

        cache.invalidate("twins:abc").await;
        assert!(cache.get_or_none::<Vec<i32>>("twins:abc").await.is_none());
    }

    #[tokio::test]
    async fn test_l1_entry_expires() {
        let cache = CacheManager::in_memory(100, 60);
        cache
            .set_with_ttl("short", &"x", Duration::from_millis(50))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(matches!(cache.get::<String>("short").await, Err(CacheError::CacheMiss(_))));
    }

    #[tokio::test]
    async fn test_leaderboard_without_redis_degrades() {
        let cache = CacheManager::in_memory(10, 60);
        assert!(cache.leaderboard_top("adventure", 10).await.unwrap().is_empty());
        assert_eq!(cache.leaderboard_rank("adventure", "u1").await.unwrap(), None);
        assert_eq!(cache.user_score("u1").await.unwrap(), 0.0);
        assert!(matches!(
            cache.leaderboard_add("adventure", "u1", 10.0).await,
            Err(CacheError::Unavailable)
        ));
    }

    #[test]
    fn test_leaderboard_stop_never_spans_whole_board() {
        assert_eq!(leaderboard_stop(10), 9);
        assert_eq!(leaderboard_stop(1), 0);
        assert_eq!(leaderboard_stop(0), 0);
        assert_eq!(leaderboard_stop(-5), 0);
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::twins("user123"), "twins:user123");
        assert_eq!(CacheKey::restaurant("biz"), "restaurant:biz");
        assert_eq!(CacheKey::leaderboard("adventure"), "leaderboard:adventure");
        assert_eq!(CacheKey::user_score("user123"), "user:score:user123");
    }
}
