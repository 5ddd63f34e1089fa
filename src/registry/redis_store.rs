//! Redis implementation of [`SharedStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::SharedStore;
use crate::error::QuizError;

/// `HSET` guarded by `EXISTS`, run server-side so the pair is atomic.
const SET_FIELD_IF_EXISTS: &str = r"
if redis.call('EXISTS', KEYS[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
";

/// Redis-backed store using a multiplexed, auto-reconnecting connection.
///
/// Cloning is cheap; clones share the underlying connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    set_if_exists: redis::Script,
}

impl RedisStore {
    /// Connects to the Redis server at `url` (e.g. `redis://127.0.0.1:6379/0`).
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::BackendUnavailable`] if the URL is malformed or
    /// the server cannot be reached.
    pub async fn connect(url: &str) -> Result<Self, QuizError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("connected to redis room store");
        Ok(Self {
            conn,
            set_if_exists: redis::Script::new(SET_FIELD_IF_EXISTS),
        })
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl SharedStore for RedisStore {
    async fn create_hash(&self, key: &str, fields: &[(&str, String)]) -> Result<(), QuizError> {
        let mut conn = self.conn.clone();
        let () = conn.hset_multiple(key, fields).await?;
        Ok(())
    }

    async fn get_all(&self, key: &str) -> Result<HashMap<String, String>, QuizError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(fields)
    }

    async fn set_field_if_exists(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, QuizError> {
        let mut conn = self.conn.clone();
        let updated: i64 = self
            .set_if_exists
            .key(key)
            .arg(field)
            .arg(value)
            .invoke_async(&mut conn)
            .await?;
        Ok(updated == 1)
    }

    async fn add_member(&self, key: &str, member: &str) -> Result<u64, QuizError> {
        let mut conn = self.conn.clone();
        let added: u64 = conn.sadd(key, member).await?;
        Ok(added)
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, QuizError> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    async fn delete(&self, key: &str) -> Result<(), QuizError> {
        let mut conn = self.conn.clone();
        let _removed: u64 = conn.del(key).await?;
        Ok(())
    }
}
