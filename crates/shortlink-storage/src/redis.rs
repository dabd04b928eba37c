use async_trait::async_trait;
use redis::{
    AsyncCommands, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo,
};
use shortlink_core::error::{Result, StoreError};
use shortlink_core::KvStore;
use std::time::Duration;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

/// Connection parameters for [`RedisStore`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct RedisStoreSettings {
    /// `host:port` of the Redis server.
    #[builder(default = String::from("localhost:6379"), setter(into))]
    pub addr: String,
    /// Password sent with `AUTH`, if the server requires one.
    #[builder(default, setter(strip_option(fallback = password_opt), into))]
    pub password: Option<String>,
    /// Logical database index.
    #[builder(default = 0)]
    pub db: i64,
    /// Prefix prepended to every key, e.g. `"myapp:"`.
    #[builder(default, setter(into))]
    pub key_prefix: String,
}

const DEFAULT_REDIS_PORT: u16 = 6379;

impl RedisStoreSettings {
    /// Builds the connection parameters handed to [`redis::Client::open`].
    ///
    /// `addr` is `host:port`; a bare host uses the default Redis port. An
    /// empty password counts as no password.
    fn connection_info(&self) -> Result<ConnectionInfo> {
        let (host, port) = match self.addr.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|e| {
                    StoreError::Unavailable(format!(
                        "invalid redis address '{}': {e}",
                        self.addr
                    ))
                })?;
                (host, port)
            }
            None => (self.addr.as_str(), DEFAULT_REDIS_PORT),
        };
        if host.is_empty() {
            return Err(StoreError::Unavailable(format!(
                "invalid redis address '{}': missing host",
                self.addr
            )));
        }

        let mut redis_settings = RedisConnectionInfo::default().set_db(self.db);
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            redis_settings = redis_settings.set_password(password);
        }

        let info = ConnectionAddr::Tcp(host.to_string(), port)
            .into_connection_info()
            .map_err(|e| StoreError::Unavailable(format!("invalid redis settings: {e}")))?;
        Ok(info.set_redis_settings(redis_settings))
    }
}

/// A Redis-based implementation of [`KvStore`].
///
/// `GET`, `SET` / `SET PX` and `INCR` map one-to-one onto the trait, so TTL
/// enforcement and increment atomicity are delegated to the server.
#[derive(Debug, Clone)]
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StoreError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() || message.to_ascii_lowercase().contains("timed out") {
        StoreError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Operation(message)
    }
}

impl RedisStore {
    /// Creates a store on top of an existing connection.
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: String::new(),
        }
    }

    /// Creates a store whose keys are all prefixed with `key_prefix`.
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a connection and checks it with `PING`.
    ///
    /// A server that cannot be reached or rejects the credentials fails
    /// here instead of on the first request.
    pub async fn connect(settings: RedisStoreSettings) -> Result<Self> {
        info!(
            addr = %settings.addr,
            db = settings.db,
            auth = settings.password.is_some(),
            "connecting to redis"
        );

        let client = redis::Client::open(settings.connection_info()?)
            .map_err(|e| StoreError::Unavailable(format!("invalid redis settings: {e}")))?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("Redis ping failed", e))?;
        debug!(reply = %pong, "redis connectivity check passed");

        Ok(Self::with_prefix(conn, settings.key_prefix))
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.key(key);
        trace!(key = %key, "GET");

        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(&key).await.map_err(|e| {
            warn!(key = %key, error = %e, "Redis error on get");
            map_redis_error("failed to fetch value from Redis", e)
        })
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let key = self.key(key);
        trace!(key = %key, ?ttl, "SET");

        let mut conn = self.conn.clone();
        let result = match ttl {
            Some(ttl) => {
                let millis = u64::try_from(ttl.as_millis()).map_err(|_| {
                    StoreError::InvalidData(format!("ttl too large for Redis: {ttl:?}"))
                })?;
                if millis == 0 {
                    return Err(StoreError::InvalidData(
                        "Redis does not accept a zero ttl".to_string(),
                    ));
                }
                conn.pset_ex::<_, _, ()>(&key, value, millis).await
            }
            None => conn.set::<_, _, ()>(&key, value).await,
        };

        result.map_err(|e| {
            warn!(key = %key, error = %e, "Redis error on set");
            map_redis_error("failed to write value to Redis", e)
        })
    }

    async fn incr(&self, key: &str) -> Result<u64> {
        let key = self.key(key);
        trace!(key = %key, "INCR");

        let mut conn = self.conn.clone();
        let value = conn.incr::<_, _, i64>(&key, 1).await.map_err(|e| {
            warn!(key = %key, error = %e, "Redis error on incr");
            map_redis_error("failed to increment value in Redis", e)
        })?;

        u64::try_from(value).map_err(|_| {
            StoreError::InvalidData(format!("counter at '{key}' is negative: {value}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tcp_addr(info: &ConnectionInfo) -> (String, u16) {
        match info.addr() {
            ConnectionAddr::Tcp(host, port) => (host.clone(), *port),
            other => panic!("unexpected address: {other:?}"),
        }
    }

    #[test]
    fn default_settings() {
        let info = RedisStoreSettings::builder()
            .build()
            .connection_info()
            .unwrap();

        assert_eq!(tcp_addr(&info), ("localhost".to_string(), 6379));
        assert_eq!(info.redis_settings().db(), 0);
        assert_eq!(info.redis_settings().password(), None);
    }

    #[test]
    fn password_and_db_are_passed_through() {
        let info = RedisStoreSettings::builder()
            .addr("10.0.0.1:6380")
            .password("p@ss:w/rd")
            .db(3)
            .build()
            .connection_info()
            .unwrap();

        assert_eq!(tcp_addr(&info), ("10.0.0.1".to_string(), 6380));
        assert_eq!(info.redis_settings().db(), 3);
        assert_eq!(info.redis_settings().password(), Some("p@ss:w/rd"));
    }

    #[test]
    fn optional_password_setter() {
        let settings = RedisStoreSettings::builder()
            .password_opt(Some("s3cret".to_string()))
            .build();
        assert_eq!(settings.password.as_deref(), Some("s3cret"));

        let settings = RedisStoreSettings::builder().password_opt(None).build();
        assert!(settings.password.is_none());
    }

    #[test]
    fn empty_password_is_ignored() {
        let info = RedisStoreSettings::builder()
            .password("")
            .build()
            .connection_info()
            .unwrap();
        assert_eq!(info.redis_settings().password(), None);
    }

    #[test]
    fn host_without_port_uses_default_port() {
        let info = RedisStoreSettings::builder()
            .addr("redis.internal")
            .build()
            .connection_info()
            .unwrap();
        assert_eq!(tcp_addr(&info), ("redis.internal".to_string(), 6379));
    }

    #[test]
    fn malformed_address_is_rejected() {
        for addr in ["localhost:port", ":6379", "localhost:70000"] {
            let err = RedisStoreSettings::builder()
                .addr(addr)
                .build()
                .connection_info()
                .unwrap_err();
            assert!(matches!(err, StoreError::Unavailable(_)), "{addr}");
        }
    }
}
