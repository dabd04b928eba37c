use shortlink_core::keys::{self, COUNTER_KEY};
use shortlink_core::fingerprint;
use shortlink_service::{Shortener, ShortlinkError, ShortlinkService};
use shortlink_storage::{KvStore, RedisStore, RedisStoreSettings};
use shortlink_test_infra::redis::{RedisConfig, RedisServer};

struct Fixture {
    redis: RedisServer,
    service: ShortlinkService<RedisStore>,
}

impl Fixture {
    async fn start() -> Self {
        let redis = RedisServer::new(RedisConfig::default())
            .await
            .expect("Failed to start Redis");
        let addr = redis.addr().await.expect("Failed to get Redis address");
        let store = RedisStore::connect(RedisStoreSettings::builder().addr(addr).build())
            .await
            .expect("Failed to connect store");

        Self {
            redis,
            service: ShortlinkService::new(store),
        }
    }
}

#[tokio::test]
async fn test_shorten_info_unshorten_against_redis() {
    let fixture = Fixture::start().await;
    let service = &fixture.service;

    let id = service.shorten("https://example.com", 60).await.unwrap();
    assert_eq!(id.as_str(), "1");

    let detail = service.shortlink_info(id.as_str()).await.unwrap();
    assert_eq!(detail.url, "https://example.com");
    assert_eq!(detail.expiration_in_minutes, 60);
    assert!(detail.created_at <= jiff::Timestamp::now());

    assert_eq!(service.unshorten(id.as_str()).await.unwrap(), "https://example.com");
}

#[tokio::test]
async fn test_dedup_against_redis() {
    let fixture = Fixture::start().await;
    let service = &fixture.service;

    let first = service.shorten("https://example.com", 60).await.unwrap();
    let second = service.shorten("https://example.com", 60).await.unwrap();
    let other = service.shorten("https://example.org", 60).await.unwrap();

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(
        service.store().get(COUNTER_KEY).await.unwrap().as_deref(),
        Some("2")
    );
}

#[tokio::test]
async fn test_records_carry_ttl_and_counter_does_not() {
    let fixture = Fixture::start().await;
    let service = &fixture.service;
    let id = service.shorten("https://example.com", 5).await.unwrap();

    let info = fixture.redis.connection_info(0).await.unwrap();
    let client = redis::Client::open(info).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();

    for key in [
        keys::forward_key(&id),
        keys::detail_key(&id),
        keys::hash_index_key(&fingerprint("https://example.com")),
    ] {
        let ttl: i64 = redis::cmd("PTTL")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .unwrap();
        assert!(ttl > 0 && ttl <= 5 * 60 * 1000, "ttl of {key} was {ttl}");
    }

    let ttl: i64 = redis::cmd("PTTL")
        .arg(COUNTER_KEY)
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(ttl, -1, "counter must not expire");
}

#[tokio::test]
async fn test_unknown_id_against_redis() {
    let fixture = Fixture::start().await;

    for shortlink in ["notThere", "doesNotExist"] {
        let err = fixture.service.unshorten(shortlink).await.unwrap_err();
        assert!(matches!(err, ShortlinkError::NotFound(_)), "{shortlink}");

        let err = fixture.service.shortlink_info(shortlink).await.unwrap_err();
        assert!(matches!(err, ShortlinkError::NotFound(_)), "{shortlink}");
    }
}
