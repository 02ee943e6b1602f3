//! Test database helper utilities
//!
//! Integration tests run against a real PostgreSQL instance pointed to by
//! `TEST_DATABASE_URL`. When the variable is unset the tests skip, so the
//! unit suite stays runnable without infrastructure.

use sqlx::PgPool;
use std::sync::Once;
use DeskGenie::database::DatabaseService;

static INIT: Once = Once::new();

pub struct TestDatabase {
    pub pool: PgPool,
}

impl TestDatabase {
    /// Connect to the test database and apply migrations. Returns `None`
    /// when `TEST_DATABASE_URL` is unset; callers skip in that case.
    pub async fn connect() -> Option<Self> {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt::try_init();
        });

        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url)
            .await
            .expect("Failed to connect to test database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let db = Self { pool };
        db.cleanup().await;
        Some(db)
    }

    pub fn services(&self) -> DatabaseService {
        DatabaseService::new(self.pool.clone())
    }

    /// Wipe all tables, children first.
    pub async fn cleanup(&self) {
        for table in [
            "ticket_publications",
            "ticket_media",
            "tickets",
            "support_chats",
            "audit_log",
            "users",
        ] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&self.pool)
                .await
                .unwrap_or_else(|e| panic!("Failed to clean {}: {}", table, e));
        }
    }
}
