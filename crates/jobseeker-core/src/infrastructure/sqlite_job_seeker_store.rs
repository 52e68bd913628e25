//! SQLite-backed job seeker store
//!
//! Every statement is parameterized. Each operation runs under the store's
//! optional deadline and the caller's cancellation token.

use crate::config::StoreSettings;
use crate::domain::{EmailMatch, IdStrategy, JobSeeker, JobSeekerStore, Repository};
use crate::error::{Result, StorageError};
use crate::storage::Database;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use sqlx::SqlitePool;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

const SELECT_COLUMNS: &str =
    "SELECT id, email, full_name, country, city, phone_number, created_at, updated_at FROM job_seekers";

const UPSERT_SQL: &str = r#"
    INSERT INTO job_seekers (id, email, full_name, country, city, phone_number, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        email = excluded.email,
        full_name = excluded.full_name,
        country = excluded.country,
        city = excluded.city,
        phone_number = excluded.phone_number,
        updated_at = excluded.updated_at
    RETURNING id, email, full_name, country, city, phone_number, created_at, updated_at
"#;

/// SQLite implementation of [`JobSeekerStore`]
#[derive(Debug, Clone)]
pub struct SqliteJobSeekerStore {
    pool: SqlitePool,
    id_strategy: IdStrategy,
    email_match: EmailMatch,
    query_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl SqliteJobSeekerStore {
    /// Create a store with store-generated ids, exact email matching and no deadline
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            id_strategy: IdStrategy::default(),
            email_match: EmailMatch::default(),
            query_timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a store over an opened database
    pub fn from_database(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }

    /// Apply the `[store]` section of the configuration
    pub fn with_settings(self, settings: &StoreSettings) -> Self {
        self.with_id_strategy(settings.id_strategy)
            .with_email_match(settings.email_match)
            .with_query_timeout(settings.query_timeout())
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    pub fn with_email_match(mut self, email_match: EmailMatch) -> Self {
        self.email_match = email_match;
        self
    }

    /// Bound every operation by `timeout`. `None` waits indefinitely.
    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Abort in-flight and future operations once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Find every job seeker with the given email
    pub async fn find_by_email(&self, email: &str) -> Result<Vec<JobSeeker>> {
        let sql = format!(
            "{} WHERE email = ?{} ORDER BY created_at",
            SELECT_COLUMNS,
            self.email_collation()
        );

        self.run("find_by_email", async {
            let rows: Vec<JobSeekerRow> = sqlx::query_as(&sql)
                .bind(email)
                .fetch_all(&self.pool)
                .await?;

            rows.into_iter().map(JobSeekerRow::into_job_seeker).collect()
        })
        .await
    }

    /// Lazily stream every job seeker
    ///
    /// Rows are decoded as they arrive. The stream is not bounded by the
    /// query timeout.
    pub fn stream_all(&self) -> BoxStream<'_, Result<JobSeeker>> {
        sqlx::query_as::<_, JobSeekerRow>(SELECT_COLUMNS)
            .fetch(&self.pool)
            .map(|row| {
                row.map_err(StorageError::from)
                    .and_then(JobSeekerRow::into_job_seeker)
            })
            .boxed()
    }

    fn email_collation(&self) -> &'static str {
        match self.email_match {
            EmailMatch::Exact => "",
            EmailMatch::CaseInsensitive => " COLLATE NOCASE",
        }
    }

    /// Run one storage operation under the deadline and cancellation token
    async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            warn!(operation, "Storage operation cancelled before start");
            return Err(StorageError::Cancelled);
        }

        let bounded = async {
            match self.query_timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(operation, timeout_ms = limit.as_millis() as u64, "Storage operation timed out");
                        Err(StorageError::Timeout(limit))
                    }
                },
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(operation, "Storage operation cancelled");
                Err(StorageError::Cancelled)
            }
            result = bounded => result,
        }
    }
}

#[async_trait]
impl Repository<JobSeeker, Uuid> for SqliteJobSeekerStore {
    async fn save(&self, entity: &JobSeeker) -> Result<JobSeeker> {
        let id = self.id_strategy.resolve(entity.id)?;

        self.run("save", async {
            let row: JobSeekerRow = sqlx::query_as(UPSERT_SQL)
                .bind(id.to_string())
                .bind(&entity.email)
                .bind(&entity.full_name)
                .bind(&entity.country)
                .bind(&entity.city)
                .bind(&entity.phone_number)
                .bind(entity.created_at)
                .bind(entity.updated_at)
                .fetch_one(&self.pool)
                .await?;

            debug!(id = %id, created = entity.is_new(), "Saved job seeker");
            row.into_job_seeker()
        })
        .await
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<JobSeeker>> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);

        self.run("find_by_id", async {
            let row: Option<JobSeekerRow> = sqlx::query_as(&sql)
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

            row.map(JobSeekerRow::into_job_seeker).transpose()
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<JobSeeker>> {
        self.run("find_all", async {
            let rows: Vec<JobSeekerRow> = sqlx::query_as(SELECT_COLUMNS)
                .fetch_all(&self.pool)
                .await?;

            rows.into_iter().map(JobSeekerRow::into_job_seeker).collect()
        })
        .await
    }

    async fn delete_by_id(&self, id: &Uuid) -> Result<()> {
        self.run("delete_by_id", async {
            let result = sqlx::query("DELETE FROM job_seekers WHERE id = ?")
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;

            debug!(id = %id, rows = result.rows_affected(), "Deleted job seeker");
            Ok(())
        })
        .await
    }

    async fn exists_by_id(&self, id: &Uuid) -> Result<bool> {
        self.run("exists_by_id", async {
            let (exists,): (i64,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM job_seekers WHERE id = ?)")
                    .bind(id.to_string())
                    .fetch_one(&self.pool)
                    .await?;

            Ok(exists != 0)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.run("count", async {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM job_seekers")
                .fetch_one(&self.pool)
                .await?;

            Ok(count.max(0) as u64)
        })
        .await
    }
}

#[async_trait]
impl JobSeekerStore for SqliteJobSeekerStore {
    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM job_seekers WHERE email = ?{})",
            self.email_collation()
        );

        self.run("exists_by_email", async {
            let (exists,): (i64,) = sqlx::query_as(&sql)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

            debug!(email, exists = exists != 0, "Checked job seeker email");
            Ok(exists != 0)
        })
        .await
    }

    fn email_match(&self) -> EmailMatch {
        self.email_match
    }
}

/// Raw `job_seekers` row
#[derive(Debug, sqlx::FromRow)]
struct JobSeekerRow {
    id: String,
    email: String,
    full_name: String,
    country: Option<String>,
    city: Option<String>,
    phone_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl JobSeekerRow {
    fn into_job_seeker(self) -> Result<JobSeeker> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StorageError::CorruptRow(format!("Invalid job seeker ID '{}': {}", self.id, e)))?;

        Ok(JobSeeker {
            id,
            email: self.email,
            full_name: self.full_name,
            country: self.country,
            city: self.city,
            phone_number: self.phone_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use std::collections::HashSet;

    async fn test_store() -> (Database, SqliteJobSeekerStore) {
        let db = Database::in_memory().await.expect("Failed to create database");
        let store = SqliteJobSeekerStore::from_database(&db);
        (db, store)
    }

    fn seeker(email: &str) -> JobSeeker {
        JobSeeker::new(email, "Test Seeker").with_id(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_save_then_find_by_id_roundtrip() {
        let (_db, store) = test_store().await;
        let original = seeker("ada@example.com")
            .with_country("United Kingdom")
            .with_city("London")
            .with_phone_number("+44 20 7946 0000");

        let saved = store.save(&original).await.unwrap();
        assert_eq!(saved, original);

        let found = store.find_by_id(&original.id).await.unwrap();
        assert_eq!(found, Some(original));
    }

    #[tokio::test]
    async fn test_save_generates_id_for_new_entity() {
        let (_db, store) = test_store().await;
        let saved = store
            .save(&JobSeeker::new("new@example.com", "New Seeker"))
            .await
            .unwrap();

        assert!(!saved.id.is_nil());
        assert!(store.exists_by_id(&saved.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_client_strategy_rejects_nil_id() {
        let (_db, store) = test_store().await;
        let store = store.with_id_strategy(IdStrategy::Client);

        let err = store
            .save(&JobSeeker::new("new@example.com", "New Seeker"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::MissingIdentifier));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_existing_updates_and_keeps_created_at() {
        let (_db, store) = test_store().await;
        let original = store.save(&seeker("ada@example.com")).await.unwrap();

        let mut changed = original.clone();
        changed.email = "ada@analytical.engine".to_string();
        changed.created_at = original.created_at + chrono::Duration::days(1);
        changed.updated_at = original.updated_at + chrono::Duration::hours(1);

        let saved = store.save(&changed).await.unwrap();
        assert_eq!(saved.id, original.id);
        assert_eq!(saved.email, "ada@analytical.engine");
        assert_eq!(saved.created_at, original.created_at);
        assert_eq!(saved.updated_at, changed.updated_at);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_db, store) = test_store().await;
        let saved = store.save(&seeker("ada@example.com")).await.unwrap();

        store.delete_by_id(&saved.id).await.unwrap();
        assert!(store.find_by_id(&saved.id).await.unwrap().is_none());

        store.delete_by_id(&saved.id).await.unwrap();
        let never_stored = Uuid::new_v4();
        store.delete_by_id(&never_stored).await.unwrap();
        assert!(store.find_by_id(&never_stored).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_all_returns_exactly_saved() {
        let (_db, store) = test_store().await;
        let mut expected = HashSet::new();
        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            let saved = store.save(&seeker(email)).await.unwrap();
            expected.insert(saved.id);
        }

        let all = store.find_all().await.unwrap();
        let ids: HashSet<Uuid> = all.iter().map(|s| s.id).collect();
        assert_eq!(all.len(), 3);
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_stream_all_matches_find_all() {
        let (_db, store) = test_store().await;
        for email in ["a@example.com", "b@example.com"] {
            store.save(&seeker(email)).await.unwrap();
        }

        let streamed: Vec<JobSeeker> = store.stream_all().try_collect().await.unwrap();
        let mut streamed_ids: Vec<Uuid> = streamed.iter().map(|s| s.id).collect();
        let mut all_ids: Vec<Uuid> = store.find_all().await.unwrap().iter().map(|s| s.id).collect();
        streamed_ids.sort();
        all_ids.sort();
        assert_eq!(streamed_ids, all_ids);
    }

    #[tokio::test]
    async fn test_exists_by_email_before_and_after_save() {
        let (_db, store) = test_store().await;
        assert!(!store.exists_by_email("ada@example.com").await.unwrap());

        store.save(&seeker("ada@example.com")).await.unwrap();
        assert!(store.exists_by_email("ada@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_by_email_is_exact_by_default() {
        let (_db, store) = test_store().await;
        store.save(&seeker("a@b.com")).await.unwrap();

        assert!(!store.exists_by_email("A@b.com").await.unwrap());
        assert!(!store.exists_by_email(" a@b.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_by_email_case_insensitive() {
        let (_db, store) = test_store().await;
        let store = store.with_email_match(EmailMatch::CaseInsensitive);
        store.save(&seeker("a@b.com")).await.unwrap();

        assert!(store.exists_by_email("A@B.com").await.unwrap());
        assert!(!store.exists_by_email("a@b.com ").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_email_returns_duplicates() {
        let (_db, store) = test_store().await;
        store.save(&seeker("dup@example.com")).await.unwrap();
        store.save(&seeker("dup@example.com")).await.unwrap();
        store.save(&seeker("other@example.com")).await.unwrap();

        let found = store.find_by_email("dup@example.com").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|s| s.email == "dup@example.com"));
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts_operations() {
        let (_db, store) = test_store().await;
        let token = CancellationToken::new();
        let store = store.with_cancellation(token.clone());

        store.save(&seeker("ada@example.com")).await.unwrap();
        token.cancel();

        let err = store.find_all().await.unwrap_err();
        assert!(matches!(err, StorageError::Cancelled));
        assert!(!err.is_retryable());
        assert!(matches!(
            store.exists_by_email("ada@example.com").await,
            Err(StorageError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_corrupt_id_is_reported() {
        let (db, store) = test_store().await;
        sqlx::query("INSERT INTO job_seekers (id, email, full_name) VALUES ('not-a-uuid', 'x@example.com', 'X')")
            .execute(db.pool())
            .await
            .unwrap();

        let err = store.find_all().await.unwrap_err();
        assert!(matches!(err, StorageError::CorruptRow(_)));
    }

    #[tokio::test]
    async fn test_with_settings() {
        let (_db, store) = test_store().await;
        let settings = StoreSettings {
            id_strategy: IdStrategy::Client,
            email_match: EmailMatch::CaseInsensitive,
            query_timeout_ms: 1500,
        };
        let store = store.with_settings(&settings);

        assert_eq!(store.id_strategy(), IdStrategy::Client);
        assert_eq!(store.email_match(), EmailMatch::CaseInsensitive);
        assert_eq!(store.query_timeout(), Some(Duration::from_millis(1500)));
    }
}
