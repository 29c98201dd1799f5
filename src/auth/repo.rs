use axum::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A registered candidate. `cnic_id` is unique across all profiles; the
/// fingerprint columns are written by the external enrollment process only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub cnic_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub fingerprint_enrolled_at: Option<OffsetDateTime>,
}

/// Persistence seam for profiles. Production uses [`PgProfiles`]; tests use
/// an in-memory fake.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up exactly one profile by CNIC.
    async fn find_by_cnic(&self, cnic_id: &str) -> anyhow::Result<Option<Profile>>;

    /// Insert a new profile. Uniqueness of `cnic_id` is enforced by the
    /// database constraint, not checked again here.
    async fn create(&self, cnic_id: &str, full_name: &str) -> anyhow::Result<Profile>;

    /// All profiles, newest first.
    async fn list(&self) -> anyhow::Result<Vec<Profile>>;
}

#[derive(Clone)]
pub struct PgProfiles {
    db: PgPool,
}

impl PgProfiles {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfiles {
    async fn find_by_cnic(&self, cnic_id: &str) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, cnic_id, full_name, email, phone, created_at, fingerprint_enrolled_at
            FROM profiles
            WHERE cnic_id = $1
            "#,
        )
        .bind(cnic_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(profile)
    }

    async fn create(&self, cnic_id: &str, full_name: &str) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (cnic_id, full_name)
            VALUES ($1, $2)
            RETURNING id, cnic_id, full_name, email, phone, created_at, fingerprint_enrolled_at
            "#,
        )
        .bind(cnic_id)
        .bind(full_name)
        .fetch_one(&self.db)
        .await?;
        Ok(profile)
    }

    async fn list(&self) -> anyhow::Result<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, cnic_id, full_name, email, phone, created_at, fingerprint_enrolled_at
            FROM profiles
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(profiles)
    }
}
