use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::records::dto::SubCheck;

const JOINED_COLUMNS: &str = r#"
    r.id, r.user_id,
    r.cons_result, r.seatbelt_result, r.lane_result, r.handbreak_result, r.backlight_result,
    r.user_image_at_test_start, r.user_image_at_test_end,
    r.overall_result, r.final_result,
    r.created_at, r.updated_at, r.test_start_time, r.test_end_time,
    p.full_name, p.email, p.cnic_id
"#;

/// One `profile_test_results` row inner-joined with its owning profile.
/// The profile columns stay optional so projection can apply the
/// placeholder fallbacks uniformly.
#[derive(Debug, Clone, FromRow)]
pub struct TestResultRow {
    pub id: i64,
    pub user_id: Uuid,
    pub cons_result: Option<String>,
    pub seatbelt_result: Option<String>,
    pub lane_result: Option<String>,
    pub handbreak_result: Option<String>,
    pub backlight_result: Option<String>,
    pub user_image_at_test_start: Option<String>,
    pub user_image_at_test_end: Option<String>,
    pub overall_result: Option<String>,
    pub final_result: Option<String>,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
    pub test_start_time: Option<OffsetDateTime>,
    pub test_end_time: Option<OffsetDateTime>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub cnic_id: Option<String>,
}

/// All attempts joined with profiles, newest first. No pagination; the
/// dashboard filters the full list in memory.
pub async fn list_joined(db: &PgPool) -> anyhow::Result<Vec<TestResultRow>> {
    let rows = sqlx::query_as::<_, TestResultRow>(&format!(
        r#"
        SELECT {JOINED_COLUMNS}
        FROM profile_test_results r
        INNER JOIN profiles p ON p.id = r.user_id
        ORDER BY r.created_at DESC
        "#
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Point lookup of one attempt by its numeric id.
pub async fn get_joined(db: &PgPool, id: i64) -> anyhow::Result<Option<TestResultRow>> {
    let row = sqlx::query_as::<_, TestResultRow>(&format!(
        r#"
        SELECT {JOINED_COLUMNS}
        FROM profile_test_results r
        INNER JOIN profiles p ON p.id = r.user_id
        WHERE r.id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Begin an attempt: start timestamp set, every sub-check unset.
pub async fn start_test(db: &PgPool, user_id: Uuid) -> anyhow::Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO profile_test_results (user_id, test_start_time, created_at)
        VALUES ($1, now(), now())
        RETURNING id
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(id)
}

/// Record the final result and, when the test has ended, the end timestamp.
/// Returns false when no row matched.
pub async fn update_status(
    db: &PgPool,
    id: i64,
    final_result: &str,
    test_end_time: Option<OffsetDateTime>,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE profile_test_results
        SET final_result = $2,
            test_end_time = COALESCE($3, test_end_time),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(final_result)
    .bind(test_end_time)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Record one sub-check outcome. The column is taken from the closed
/// [`SubCheck`] enum, never from request input.
pub async fn update_result(
    db: &PgPool,
    id: i64,
    check: SubCheck,
    result: &str,
) -> anyhow::Result<bool> {
    let query = format!(
        r#"
        UPDATE profile_test_results
        SET {} = $2, updated_at = now()
        WHERE id = $1
        "#,
        check.column()
    );
    let outcome = sqlx::query(&query)
        .bind(id)
        .bind(result)
        .execute(db)
        .await?;
    Ok(outcome.rows_affected() > 0)
}
