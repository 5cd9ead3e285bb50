//! Redis storage for salon entities
//!
//! Layout per entity kind:
//! - `{kind}:{id}` holds the row as JSON
//! - `{kind}:all` is the set of every id
//! - `{kind}:idx:{key}` is the set of ids whose row carries index `key`
//! - `{kind}:keys:{id}` is the set of index keys the row is filed under
//!
//! Writes run as Lua scripts, so the existence check, the index bookkeeping
//! and the row write happen in one atomic step on the server. The previous
//! index memberships are read from `{kind}:keys:{id}` inside the script,
//! never from a copy of the row fetched beforehand.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use salon_common::{Appointment, Customer, Entity, SalonService, Staff};
use salon_core::{EntityStore, Repositories};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

// KEYS: row, all-set, keys-set
// ARGV: id, json, index prefix, index keys...
const CREATE_SCRIPT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 1 then
    return 0
end
redis.call('SET', KEYS[1], ARGV[2])
redis.call('SADD', KEYS[2], ARGV[1])
for i = 4, #ARGV do
    redis.call('SADD', ARGV[3] .. ARGV[i], ARGV[1])
    redis.call('SADD', KEYS[3], ARGV[i])
end
return 1
";

// KEYS: row, keys-set
// ARGV: id, json, index prefix, index keys...
const UPDATE_SCRIPT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
for _, key in ipairs(redis.call('SMEMBERS', KEYS[2])) do
    redis.call('SREM', ARGV[3] .. key, ARGV[1])
end
redis.call('DEL', KEYS[2])
redis.call('SET', KEYS[1], ARGV[2])
for i = 4, #ARGV do
    redis.call('SADD', ARGV[3] .. ARGV[i], ARGV[1])
    redis.call('SADD', KEYS[2], ARGV[i])
end
return 1
";

// KEYS: row, all-set, keys-set
// ARGV: id, index prefix
const DELETE_SCRIPT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
for _, key in ipairs(redis.call('SMEMBERS', KEYS[3])) do
    redis.call('SREM', ARGV[2] .. key, ARGV[1])
end
redis.call('DEL', KEYS[1], KEYS[3])
redis.call('SREM', KEYS[2], ARGV[1])
return 1
";

/// Open a managed (auto-reconnecting) connection
pub async fn connect(redis_url: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

    let conn = ConnectionManager::new(client)
        .await
        .context("Failed to connect to Redis")?;

    info!("Connected to Redis at {}", redis_url);
    Ok(conn)
}

/// Redis-backed stores for every entity kind, sharing one connection
pub fn redis_repositories(conn: ConnectionManager) -> Repositories {
    Repositories {
        customers: Arc::new(RedisStore::<Customer>::new(conn.clone())),
        staff: Arc::new(RedisStore::<Staff>::new(conn.clone())),
        services: Arc::new(RedisStore::<SalonService>::new(conn.clone())),
        appointments: Arc::new(RedisStore::<Appointment>::new(conn)),
    }
}

/// Rows that are still filed under `key`. An index set can briefly list a
/// row that has since been re-filed elsewhere (e.g. when the set was read
/// just before a move), so membership is confirmed against the row itself.
pub fn still_indexed<E: Entity>(rows: Vec<E>, key: &str) -> Vec<E> {
    rows.into_iter()
        .filter(|row| {
            let filed = row.index_keys().iter().any(|k| k == key);
            if !filed {
                debug!("Skipping {} {} no longer under {}", E::KIND, row.id(), key);
            }
            filed
        })
        .collect()
}

pub struct RedisStore<E> {
    conn: ConnectionManager,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RedisStore<E> {
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    fn row_key(id: impl std::fmt::Display) -> String {
        format!("{}:{}", E::KIND, id)
    }

    fn all_key() -> String {
        format!("{}:all", E::KIND)
    }

    fn keys_key(id: impl std::fmt::Display) -> String {
        format!("{}:keys:{}", E::KIND, id)
    }

    fn index_prefix() -> String {
        format!("{}:idx:", E::KIND)
    }

    fn index_key(key: &str) -> String {
        format!("{}{}", Self::index_prefix(), key)
    }

    fn to_json(entity: &E) -> Result<String> {
        serde_json::to_string(entity).with_context(|| format!("Failed to serialize {} row", E::KIND))
    }

    async fn load(&self, id: &E::Id) -> Result<Option<E>> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(Self::row_key(id)).await?;

        match json {
            Some(data) => {
                let entity: E = serde_json::from_str(&data)
                    .with_context(|| format!("Failed to deserialize {} row {}", E::KIND, id))?;
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    /// Fetch the rows for a set of ids, oldest first. Ids whose row has
    /// disappeared are skipped.
    async fn load_many(&self, ids: Vec<String>) -> Result<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| Self::row_key(id)).collect();
        let mut conn = self.conn.clone();
        let rows: Vec<Option<String>> = conn.mget(&keys).await?;

        let mut entities = Vec::with_capacity(rows.len());
        for (id, row) in ids.iter().zip(rows) {
            match row {
                Some(data) => {
                    let entity: E = serde_json::from_str(&data).with_context(|| {
                        format!("Failed to deserialize {} row {}", E::KIND, id)
                    })?;
                    entities.push(entity);
                }
                None => warn!("Dangling {} id in index: {}", E::KIND, id),
            }
        }

        entities.sort_by_key(|e| e.created_at());
        Ok(entities)
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for RedisStore<E> {
    async fn create(&self, entity: &E) -> Result<()> {
        let id = entity.id();
        let json = Self::to_json(entity)?;

        let script = Script::new(CREATE_SCRIPT);
        let mut invocation = script.prepare_invoke();
        invocation
            .key(Self::row_key(id))
            .key(Self::all_key())
            .key(Self::keys_key(id))
            .arg(id.to_string())
            .arg(json)
            .arg(Self::index_prefix());
        for index in entity.index_keys() {
            invocation.arg(index);
        }

        let mut conn = self.conn.clone();
        let created: i64 = invocation.invoke_async(&mut conn).await?;
        if created == 0 {
            anyhow::bail!("{} {} already exists", E::KIND, id);
        }

        debug!("Stored {} {}", E::KIND, id);
        Ok(())
    }

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>> {
        self.load(id).await
    }

    async fn find_all(&self) -> Result<Vec<E>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.smembers(Self::all_key()).await?;
        self.load_many(ids).await
    }

    async fn find_by_index(&self, key: &str) -> Result<Vec<E>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.smembers(Self::index_key(key)).await?;
        let rows = self.load_many(ids).await?;
        Ok(still_indexed(rows, key))
    }

    async fn update(&self, entity: &E) -> Result<()> {
        let id = entity.id();
        let json = Self::to_json(entity)?;

        let script = Script::new(UPDATE_SCRIPT);
        let mut invocation = script.prepare_invoke();
        invocation
            .key(Self::row_key(id))
            .key(Self::keys_key(id))
            .arg(id.to_string())
            .arg(json)
            .arg(Self::index_prefix());
        for index in entity.index_keys() {
            invocation.arg(index);
        }

        let mut conn = self.conn.clone();
        let updated: i64 = invocation.invoke_async(&mut conn).await?;
        if updated == 0 {
            anyhow::bail!("{} {} does not exist", E::KIND, id);
        }

        debug!("Updated {} {}", E::KIND, id);
        Ok(())
    }

    async fn delete(&self, id: &E::Id) -> Result<bool> {
        let script = Script::new(DELETE_SCRIPT);
        let mut invocation = script.prepare_invoke();
        invocation
            .key(Self::row_key(id))
            .key(Self::all_key())
            .key(Self::keys_key(id))
            .arg(id.to_string())
            .arg(Self::index_prefix());

        let mut conn = self.conn.clone();
        let deleted: i64 = invocation.invoke_async(&mut conn).await?;

        if deleted == 1 {
            debug!("Deleted {} {}", E::KIND, id);
        }
        Ok(deleted == 1)
    }

    async fn exists(&self, id: &E::Id) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(Self::row_key(id)).await?;
        Ok(exists)
    }

    async fn count(&self) -> Result<usize> {
        let mut conn = self.conn.clone();
        let count: usize = conn.scard(Self::all_key()).await?;
        Ok(count)
    }
}
