// src/db/review_repository.rs
// DOCUMENTATION: Review database operations
// PURPOSE: Insert-or-skip nearby businesses and link them to the place that produced them

use crate::db::repository::pick_latest;
use crate::db::PlaceRepository;
use crate::errors::PlacesError;
use crate::models::{CreateReviewRequest, InsertOutcome, OwnerRef, Review};
use sqlx::{SqliteConnection, SqlitePool};

pub struct ReviewRepository;

impl ReviewRepository {
    /// Insert a review unless (name, search_name) already exists
    /// DOCUMENTATION: Duplicate check first, then owner resolution, then insert.
    /// An owner that resolves to no place fails with NoOwningRecord and writes nothing.
    pub async fn insert_review(
        pool: &SqlitePool,
        req: &CreateReviewRequest,
        owner: OwnerRef<'_>,
    ) -> Result<InsertOutcome, PlacesError> {
        let mut tx = pool.begin().await?;

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM reviews WHERE name = ? AND search_name = ?")
                .bind(&req.name)
                .bind(&req.search_name)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    log::error!("Failed to look up review {}: {}", req.name, e);
                    PlacesError::DatabaseError(format!("Lookup review failed: {}", e))
                })?;

        if let Some((existing_id,)) = existing {
            log::debug!(
                "Review already exists: {} for {} (id {})",
                req.name,
                req.search_name,
                existing_id
            );
            return Ok(InsertOutcome::SkippedDuplicate { existing_id });
        }

        let place_id = PlaceRepository::resolve_owner(&mut *tx, owner).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO reviews (
                place_id, search_name, name, latitude, longitude,
                rating, review_count, price, url
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(place_id)
        .bind(&req.search_name)
        .bind(&req.name)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.rating)
        .bind(req.review_count)
        .bind(&req.price)
        .bind(&req.url)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to create review: {}", e);
            PlacesError::DatabaseError(format!("Create review failed: {}", e))
        })?
        .last_insert_rowid();

        tx.commit().await?;

        log::info!("Created review {} for {} (id {})", req.name, req.search_name, id);
        Ok(InsertOutcome::Inserted { id })
    }

    /// Insert a batch of reviews sharing one owner
    /// DOCUMENTATION: Unresolvable owners become Rejected outcomes; other failures abort
    pub async fn insert_reviews(
        pool: &SqlitePool,
        reqs: &[CreateReviewRequest],
        owner: OwnerRef<'_>,
    ) -> Result<Vec<InsertOutcome>, PlacesError> {
        let mut outcomes = Vec::with_capacity(reqs.len());
        for req in reqs {
            match Self::insert_review(pool, req, owner).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(PlacesError::NoOwningRecord(reason)) => {
                    log::warn!("Rejected review {}: no owning record {}", req.name, reason);
                    outcomes.push(InsertOutcome::Rejected { reason });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcomes)
    }

    /// Get reviews produced by a search, in insertion order
    pub async fn list_for(pool: &SqlitePool, search_name: &str) -> Result<Vec<Review>, PlacesError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, place_id, search_name, name, latitude, longitude,
                   rating, review_count, price, url
            FROM reviews
            WHERE search_name = ?
            ORDER BY id ASC
            "#,
        )
        .bind(search_name)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch reviews for {}: {}", search_name, e);
            PlacesError::DatabaseError(format!("Fetch reviews failed: {}", e))
        })?;

        Ok(reviews)
    }

    /// Resolve the owning review of a review-origin photo
    pub(crate) async fn resolve_owner(
        conn: &mut SqliteConnection,
        owner: OwnerRef<'_>,
    ) -> Result<i64, PlacesError> {
        match owner {
            OwnerRef::Id(id) => {
                let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM reviews WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&mut *conn)
                    .await?;
                found
                    .map(|(id,)| id)
                    .ok_or_else(|| PlacesError::NoOwningRecord(format!("review id {}", id)))
            }
            OwnerRef::SearchTerm(term) => {
                let ids: Vec<(i64,)> =
                    sqlx::query_as("SELECT id FROM reviews WHERE name = ? ORDER BY id DESC")
                        .bind(term)
                        .fetch_all(&mut *conn)
                        .await?;
                pick_latest(ids, "review", term)
            }
        }
    }
}
