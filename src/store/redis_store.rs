//! Redis Store
//!
//! `Store` implementation over a multiplexed Redis connection. Only compiled
//! when the `redis` feature is enabled.

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::DriverOptions;
use crate::error::{CacheError, Result, StoreError};
use crate::store::{Driver, ErrorChannel, Store};

// == Redis Driver ==
/// Builds [`RedisStore`] clients from connection parameters.
///
/// Recognised options are `db`, `username` and `password`; others are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisDriver;

impl Driver for RedisDriver {
    fn create_client(
        &self,
        port: u16,
        host: &str,
        options: &DriverOptions,
    ) -> Result<Arc<dyn Store>> {
        let info = connection_info(port, host, options)?;
        Ok(Arc::new(RedisStore::open(info)?))
    }
}

fn connection_info(port: u16, host: &str, options: &DriverOptions) -> Result<ConnectionInfo> {
    let mut settings = RedisConnectionInfo::default();

    for (name, value) in options {
        match (name.as_str(), value) {
            ("db", Value::Number(n)) => {
                settings.db = n.as_i64().ok_or_else(|| invalid_option(name, value))?;
            }
            ("username", Value::String(s)) => settings.username = Some(s.clone()),
            ("password", Value::String(s)) => settings.password = Some(s.clone()),
            ("db" | "username" | "password", _) => return Err(invalid_option(name, value)),
            _ => debug!(option = %name, "Ignoring unsupported redis driver option"),
        }
    }

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host.to_string(), port),
        redis: settings,
    })
}

fn invalid_option(name: &str, value: &Value) -> CacheError {
    CacheError::Configuration(format!("invalid redis option `{name}`: {value}"))
}

// == Redis Store ==
/// Redis backed [`Store`].
///
/// The connection is established lazily on the first command and shared by
/// every subsequent one.
pub struct RedisStore {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    errors: ErrorChannel,
}

impl RedisStore {
    /// Opens a client without performing any network I/O.
    pub fn open(info: ConnectionInfo) -> Result<Self> {
        let client = redis::Client::open(info)
            .map_err(|e| CacheError::Configuration(format!("failed to create redis client: {e}")))?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            errors: ErrorChannel::new(),
        })
    }

    async fn connection(&self) -> std::result::Result<ConnectionManager, StoreError> {
        let manager = self
            .connection
            .get_or_try_init(|| self.client.get_connection_manager())
            .await?;
        Ok(manager.clone())
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("addr", &self.client.get_connection_info().addr)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn read(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn.get(key).await?;
        Ok(payload)
    }

    async fn write_with_expiry(
        &self,
        key: &str,
        payload: &str,
        ttl_secs: u64,
    ) -> std::result::Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);

        // MULTI / SET / EXPIRE / EXEC
        let () = redis::pipe()
            .atomic()
            .set(key, payload)
            .ignore()
            .expire(key, ttl)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _removed: i64 = conn.del(key).await?;
        Ok(())
    }

    fn errors(&self) -> &ErrorChannel {
        &self.errors
    }
}
