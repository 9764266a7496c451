//! `PostgreSQL` session store housekeeping.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `TEST_DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use sportsstore_integration_tests::{test_pool, unique_name};
use sportsstore_storefront::middleware::{postgres_store, spawn_expired_session_cleanup};

async fn session_exists(pool: &sqlx::PgPool, id: &str) -> bool {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM store.session WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_expired_sessions_are_purged() {
    let pool = test_pool().await;
    let expired = unique_name("expired");
    let live = unique_name("live");

    for (id, offset) in [(&expired, "-1 hour"), (&live, "1 hour")] {
        sqlx::query(
            r"
            INSERT INTO store.session (id, data, expiry_date)
            VALUES ($1, $2, now() + $3::interval)
            ",
        )
        .bind(id)
        .bind(Vec::<u8>::new())
        .bind(offset)
        .execute(&pool)
        .await
        .unwrap();
    }

    let cleanup =
        spawn_expired_session_cleanup(postgres_store(&pool), Duration::from_millis(50));
    tokio::time::sleep(Duration::from_millis(500)).await;
    cleanup.abort();

    assert!(!session_exists(&pool, &expired).await);
    assert!(session_exists(&pool, &live).await);

    sqlx::query("DELETE FROM store.session WHERE id = $1")
        .bind(&live)
        .execute(&pool)
        .await
        .unwrap();
}
