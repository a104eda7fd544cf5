use sqlx::PgPool;

use crate::database::manager::{Database, DatabaseError};
use crate::database::models::{NewPhoto, ReportPhoto};

const PHOTO_COLUMNS: &str = "photo_id, photo_type, photo_url, public_id, photo_description, photo_stage, \
     category, user_id, store_id, uploaded_at";

pub struct PhotoRepository {
    pool: PgPool,
}

impl PhotoRepository {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }

    pub async fn insert(&self, photo: &NewPhoto) -> Result<ReportPhoto, DatabaseError> {
        let sql = format!(
            "INSERT INTO report_photos \
                (photo_type, photo_url, public_id, photo_description, photo_stage, category, user_id, store_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            PHOTO_COLUMNS
        );
        Ok(sqlx::query_as::<_, ReportPhoto>(&sql)
            .bind(&photo.photo_type)
            .bind(&photo.photo_url)
            .bind(&photo.public_id)
            .bind(&photo.photo_description)
            .bind(&photo.photo_stage)
            .bind(&photo.category)
            .bind(photo.user_id)
            .bind(photo.store_id)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn select_all(&self) -> Result<Vec<ReportPhoto>, DatabaseError> {
        let sql = format!("SELECT {} FROM report_photos ORDER BY uploaded_at DESC", PHOTO_COLUMNS);
        Ok(sqlx::query_as::<_, ReportPhoto>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn select_by_user(&self, user_id: i32) -> Result<Vec<ReportPhoto>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM report_photos WHERE user_id = $1 ORDER BY uploaded_at DESC",
            PHOTO_COLUMNS
        );
        Ok(sqlx::query_as::<_, ReportPhoto>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn select_one(&self, photo_id: i32) -> Result<Option<ReportPhoto>, DatabaseError> {
        let sql = format!("SELECT {} FROM report_photos WHERE photo_id = $1", PHOTO_COLUMNS);
        Ok(sqlx::query_as::<_, ReportPhoto>(&sql)
            .bind(photo_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn select_404(&self, photo_id: i32) -> Result<ReportPhoto, DatabaseError> {
        self.select_one(photo_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Photo {} not found", photo_id)))
    }

    pub async fn delete(&self, photo_id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM report_photos WHERE photo_id = $1")
            .bind(photo_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every row pointing at `photo_url`; returns how many went
    pub async fn delete_by_url(&self, photo_url: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM report_photos WHERE photo_url = $1")
            .bind(photo_url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
