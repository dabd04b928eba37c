use crate::error::{Result, TestInfraError};
use ::redis::{ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo};
use std::time::Duration;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use typed_builder::TypedBuilder;

const REDIS_PORT: u16 = 6379;

/// Settings for a disposable Redis server.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RedisConfig {
    /// Docker image tag of the `redis` image.
    #[builder(default = "8.6.0".to_string(), setter(into))]
    pub tag: String,
    /// Enables `requirepass` when set.
    #[builder(default, setter(strip_option, into))]
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Test fixture for a single Redis server.
pub struct RedisServer {
    container: ContainerAsync<GenericImage>,
    config: RedisConfig,
}

impl RedisServer {
    /// Starts a Redis container and waits until it answers `PING`.
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let image = GenericImage::new("redis", config.tag.as_str())
            .with_exposed_port(REDIS_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"));

        let container = match config.password.as_deref() {
            Some(password) => {
                image
                    .with_cmd(["redis-server", "--requirepass", password])
                    .start()
                    .await?
            }
            None => image.start().await?,
        };

        let server = Self { container, config };
        server.wait_until_ready().await?;
        Ok(server)
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();

        match host.as_str() {
            "localhost" => Ok(String::from("127.0.0.1")),
            _ => Ok(host),
        }
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(REDIS_PORT).await?)
    }

    /// `host:port` as seen from the test process.
    pub async fn addr(&self) -> Result<String> {
        Ok(format!("{}:{}", self.host().await?, self.port().await?))
    }

    /// Connection parameters for database `db`, credentials included.
    pub async fn connection_info(&self, db: i64) -> Result<ConnectionInfo> {
        let host = self.host().await?;
        let port = self.port().await?;

        let mut settings = RedisConnectionInfo::default().set_db(db);
        if let Some(password) = self.config.password.as_deref() {
            settings = settings.set_password(password);
        }

        Ok(ConnectionAddr::Tcp(host, port)
            .into_connection_info()?
            .set_redis_settings(settings))
    }

    async fn wait_until_ready(&self) -> Result<()> {
        let client = ::redis::Client::open(self.connection_info(0).await?)?;

        let mut last_error = None;
        for _ in 0..20 {
            match client.get_multiplexed_async_connection().await {
                Ok(mut conn) => {
                    match ::redis::cmd("PING").query_async::<String>(&mut conn).await {
                        Ok(_) => return Ok(()),
                        Err(err) => last_error = Some(err.to_string()),
                    }
                }
                Err(err) => last_error = Some(err.to_string()),
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }

        Err(TestInfraError::NotReady(
            last_error.unwrap_or_else(|| "no attempt made".to_string()),
        ))
    }
}
