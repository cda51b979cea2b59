use async_trait::async_trait;
use uuid::Uuid;

use crate::models::usermodel::User;

#[async_trait]
pub trait UserExt {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;

    /// Stores freshly generated credentials for a first-time customer and
    /// marks the email as verified so the welcome flow runs only once.
    async fn set_user_credentials(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<User, sqlx::Error>;
}

#[async_trait]
impl UserExt for super::db::DBClient {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn set_user_credentials(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $1, email_verified = true, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(password_hash)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }
}
