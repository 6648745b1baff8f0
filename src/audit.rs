use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// Append a row to the audit trail. The table is write-only; a failed insert
/// is logged and swallowed so audit never fails the request that triggered it.
pub async fn record(
    db: &PgPool,
    user_id: Option<Uuid>,
    action: &str,
    entity_type: Option<&str>,
    entity_id: Option<Uuid>,
    details: Option<&str>,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO audit_logs (user_id, action, entity_type, entity_id, details)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(details)
    .execute(db)
    .await;

    if let Err(e) = result {
        warn!(error = %e, action, "audit log write failed");
    }
}
