use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{PasswordResetToken, User};

const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, role, status, phone, address, created_at";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// New accounts rely on the schema defaults: role `customer`, status
    /// `Pending` until an admin approves them.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, full_name)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}

impl PasswordResetToken {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<PasswordResetToken> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, used, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Most recent unused, unexpired token for the user. Older outstanding
    /// tokens stay untouched until their own expiry or use.
    pub async fn find_latest_valid(
        db: &PgPool,
        user_id: Uuid,
    ) -> anyhow::Result<Option<PasswordResetToken>> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, user_id, token_hash, expires_at, used, created_at
            FROM password_reset_tokens
            WHERE user_id = $1 AND used = FALSE AND expires_at > now()
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Rotate the password and burn the token as one transaction; a crash
    /// cannot leave the password changed with the token still redeemable.
    /// Returns `Ok(false)` when a concurrent consumer burned the token first;
    /// transaction failures stay errors so they surface as 500, not as a bad
    /// token.
    pub async fn consume(
        db: &PgPool,
        token_id: Uuid,
        user_id: Uuid,
        new_password_hash: &str,
    ) -> anyhow::Result<bool> {
        let mut tx = db.begin().await?;

        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(new_password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query(
            "UPDATE password_reset_tokens SET used = TRUE WHERE id = $1 AND used = FALSE",
        )
        .bind(token_id)
        .execute(&mut *tx)
        .await?;

        // A concurrent consumer got here first; the row flip serializes them.
        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
