// src/db/photo_repository.rs
// DOCUMENTATION: Photo database operations
// PURPOSE: Insert-or-skip photos and link them to a place or a nearby business

use crate::db::{PlaceRepository, ReviewRepository};
use crate::errors::PlacesError;
use crate::models::photo::PhotoRow;
use crate::models::{CreatePhotoRequest, InsertOutcome, OwnerRef, Photo, PhotoOrigin};
use sqlx::SqlitePool;

const PHOTO_COLUMNS: &str =
    "id, owner_id, search_name, origin, title, farm_id, server_id, photo_id, secret, url";

pub struct PhotoRepository;

impl PhotoRepository {
    /// Insert a photo unless (photo_id, search_name) already exists
    /// DOCUMENTATION: The origin picks the owner table - places for place-origin,
    /// reviews for review-origin
    pub async fn insert_photo(
        pool: &SqlitePool,
        req: &CreatePhotoRequest,
        owner: OwnerRef<'_>,
    ) -> Result<InsertOutcome, PlacesError> {
        let mut tx = pool.begin().await?;

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM photos WHERE photo_id = ? AND search_name = ?")
                .bind(&req.photo_id)
                .bind(&req.search_name)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    log::error!("Failed to look up photo {}: {}", req.photo_id, e);
                    PlacesError::DatabaseError(format!("Lookup photo failed: {}", e))
                })?;

        if let Some((existing_id,)) = existing {
            log::debug!("Photo already exists: {} for {}", req.photo_id, req.search_name);
            return Ok(InsertOutcome::SkippedDuplicate { existing_id });
        }

        let owner_id = match req.origin {
            PhotoOrigin::Place => PlaceRepository::resolve_owner(&mut *tx, owner).await?,
            PhotoOrigin::Review => ReviewRepository::resolve_owner(&mut *tx, owner).await?,
        };

        let id = sqlx::query(
            r#"
            INSERT INTO photos (
                owner_id, search_name, origin, title,
                farm_id, server_id, photo_id, secret, url
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(owner_id)
        .bind(&req.search_name)
        .bind(req.origin.as_i64())
        .bind(&req.title)
        .bind(&req.farm_id)
        .bind(&req.server_id)
        .bind(&req.photo_id)
        .bind(&req.secret)
        .bind(req.display_url())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to create photo: {}", e);
            PlacesError::DatabaseError(format!("Create photo failed: {}", e))
        })?
        .last_insert_rowid();

        tx.commit().await?;

        log::info!("Created photo {} for {} (id {})", req.photo_id, req.search_name, id);
        Ok(InsertOutcome::Inserted { id })
    }

    /// Insert a batch of photos sharing one owner
    pub async fn insert_photos(
        pool: &SqlitePool,
        reqs: &[CreatePhotoRequest],
        owner: OwnerRef<'_>,
    ) -> Result<Vec<InsertOutcome>, PlacesError> {
        let mut outcomes = Vec::with_capacity(reqs.len());
        for req in reqs {
            match Self::insert_photo(pool, req, owner).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(PlacesError::NoOwningRecord(reason)) => {
                    log::warn!("Rejected photo {}: no owning record {}", req.photo_id, reason);
                    outcomes.push(InsertOutcome::Rejected { reason });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcomes)
    }

    /// Get photos found for a search, in insertion order
    pub async fn list_for(pool: &SqlitePool, search_name: &str) -> Result<Vec<Photo>, PlacesError> {
        let rows = sqlx::query_as::<_, PhotoRow>(&format!(
            "SELECT {} FROM photos WHERE search_name = ? ORDER BY id ASC",
            PHOTO_COLUMNS
        ))
        .bind(search_name)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch photos for {}: {}", search_name, e);
            PlacesError::DatabaseError(format!("Fetch photos failed: {}", e))
        })?;

        rows.into_iter().map(PhotoRow::to_photo).collect()
    }

    /// Random photos for a search, clamped to what is stored
    pub async fn sample_for(
        pool: &SqlitePool,
        search_name: &str,
        count: u32,
    ) -> Result<Vec<Photo>, PlacesError> {
        let rows = sqlx::query_as::<_, PhotoRow>(&format!(
            "SELECT {} FROM photos WHERE search_name = ? ORDER BY RANDOM() LIMIT ?",
            PHOTO_COLUMNS
        ))
        .bind(search_name)
        .bind(i64::from(count))
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to sample photos for {}: {}", search_name, e);
            PlacesError::DatabaseError(format!("Sample photos failed: {}", e))
        })?;

        rows.into_iter().map(PhotoRow::to_photo).collect()
    }
}
