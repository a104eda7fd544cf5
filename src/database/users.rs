use sqlx::PgPool;

use crate::database::manager::{Database, DatabaseError};
use crate::database::models::User;
use crate::types::Role;

const USER_COLUMNS: &str = "user_id, username, password_hash, role, created_at";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    pub async fn select_all(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn select_one(&self, user_id: i32) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn select_404(&self, user_id: i32) -> Result<User, DatabaseError> {
        self.select_one(user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", user_id)))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn insert(&self, username: &str, password_hash: &str, role: Role) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(password_hash)
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?)
    }

    /// Apply the provided fields, keeping the rest
    pub async fn update(
        &self,
        user_id: i32,
        username: Option<&str>,
        role: Option<Role>,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET \
                username = COALESCE($2, username), \
                role = COALESCE($3, role), \
                password_hash = COALESCE($4, password_hash) \
             WHERE user_id = $1 RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(username)
            .bind(role.map(|r| r.as_str()))
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn update_password(&self, user_id: i32, password_hash: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, user_id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
