// src/db/repository.rs
// DOCUMENTATION: Database access layer for places
// PURPOSE: Insert-or-skip writes, name lookups and sampling over the places table

use crate::errors::PlacesError;
use crate::models::*;
use sqlx::{SqliteConnection, SqlitePool};

/// PlaceRepository: All database operations for places
/// DOCUMENTATION: Places are keyed by exact display name; the first write wins
pub struct PlaceRepository;

impl PlaceRepository {
    /// Insert a place unless one with the same name exists
    /// DOCUMENTATION: Never updates - a later search for the same name is a no-op
    /// even when the provider now returns different coordinates or rating
    pub async fn insert_place(
        pool: &SqlitePool,
        req: &CreatePlaceRequest,
    ) -> Result<InsertOutcome, PlacesError> {
        let mut tx = pool.begin().await?;

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM places WHERE name = ?")
            .bind(&req.name)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Failed to look up place {}: {}", req.name, e);
                PlacesError::DatabaseError(e.to_string())
            })?;

        if let Some((existing_id,)) = existing {
            log::debug!("Place already exists: {} (id {})", req.name, existing_id);
            return Ok(InsertOutcome::SkippedDuplicate { existing_id });
        }

        let id = sqlx::query(
            r#"
            INSERT INTO places (name, latitude, longitude, rating)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&req.name)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.rating)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Failed to create place {}: {}", req.name, e);
            PlacesError::DatabaseError(e.to_string())
        })?
        .last_insert_rowid();

        tx.commit().await?;

        log::info!("Created place {} with id: {}", req.name, id);
        Ok(InsertOutcome::Inserted { id })
    }

    /// Insert a batch, reporting one outcome per record in input order
    pub async fn insert_places(
        pool: &SqlitePool,
        reqs: &[CreatePlaceRequest],
    ) -> Result<Vec<InsertOutcome>, PlacesError> {
        let mut outcomes = Vec::with_capacity(reqs.len());
        for req in reqs {
            outcomes.push(Self::insert_place(pool, req).await?);
        }
        Ok(outcomes)
    }

    /// Get place by exact name
    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Place>, PlacesError> {
        let place = sqlx::query_as::<_, Place>(
            "SELECT id, name, latitude, longitude, rating FROM places WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch place {}: {}", name, e);
            PlacesError::DatabaseError(e.to_string())
        })?;

        Ok(place)
    }

    /// Get place by surrogate id
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Place, PlacesError> {
        sqlx::query_as::<_, Place>(
            "SELECT id, name, latitude, longitude, rating FROM places WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PlacesError::NotFound(format!("place id {}", id)))
    }

    /// Random sample of places, clamped to the table size
    /// DOCUMENTATION: Seeds the selection menu; asking for more rows than exist
    /// returns every row once rather than failing
    pub async fn sample_places(pool: &SqlitePool, count: u32) -> Result<Vec<Place>, PlacesError> {
        let places = sqlx::query_as::<_, Place>(
            r#"
            SELECT id, name, latitude, longitude, rating
            FROM places
            ORDER BY RANDOM()
            LIMIT ?
            "#,
        )
        .bind(i64::from(count))
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to sample places: {}", e);
            PlacesError::DatabaseError(e.to_string())
        })?;

        Ok(places)
    }

    /// Total number of stored places
    pub async fn count(pool: &SqlitePool) -> Result<i64, PlacesError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM places")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Resolve the owning place of a dependent row
    /// DOCUMENTATION: A threaded id must exist; a name lookup must match at least one
    /// row and picks the most recently inserted one when several match
    pub(crate) async fn resolve_owner(
        conn: &mut SqliteConnection,
        owner: OwnerRef<'_>,
    ) -> Result<i64, PlacesError> {
        match owner {
            OwnerRef::Id(id) => {
                let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM places WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&mut *conn)
                    .await?;
                found
                    .map(|(id,)| id)
                    .ok_or_else(|| PlacesError::NoOwningRecord(format!("place id {}", id)))
            }
            OwnerRef::SearchTerm(term) => {
                let ids: Vec<(i64,)> =
                    sqlx::query_as("SELECT id FROM places WHERE name = ? ORDER BY id DESC")
                        .bind(term)
                        .fetch_all(&mut *conn)
                        .await?;
                pick_latest(ids, "place", term)
            }
        }
    }
}

/// First row of an id-descending result, or a NoOwningRecord error
pub(crate) fn pick_latest(ids: Vec<(i64,)>, table: &str, term: &str) -> Result<i64, PlacesError> {
    if ids.len() > 1 {
        log::warn!(
            "{} {} rows share the name '{}'; linking to the latest",
            ids.len(),
            table,
            term
        );
    }
    ids.first()
        .map(|(id,)| *id)
        .ok_or_else(|| PlacesError::NoOwningRecord(format!("{} '{}'", table, term)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::init_memory_pool;

    fn place(name: &str, lat: f64, lon: f64, rating: Option<f64>) -> CreatePlaceRequest {
        CreatePlaceRequest {
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            rating,
        }
    }

    #[tokio::test]
    async fn test_insert_place_first_write_wins() {
        let pool = init_memory_pool().await.unwrap();

        let first = PlaceRepository::insert_place(&pool, &place("Y Park", 1.0, 2.0, Some(4.5)))
            .await
            .unwrap();
        let second = PlaceRepository::insert_place(&pool, &place("Y Park", 9.0, 9.0, None))
            .await
            .unwrap();

        let id = first.id().unwrap();
        assert_eq!(first, InsertOutcome::Inserted { id });
        assert_eq!(second, InsertOutcome::SkippedDuplicate { existing_id: id });
        assert_eq!(PlaceRepository::count(&pool).await.unwrap(), 1);

        let stored = PlaceRepository::find_by_name(&pool, "Y Park").await.unwrap().unwrap();
        assert_eq!(stored.latitude, 1.0);
        assert_eq!(stored.rating, Some(4.5));
    }

    #[tokio::test]
    async fn test_name_is_not_normalized() {
        let pool = init_memory_pool().await.unwrap();
        PlaceRepository::insert_place(&pool, &place("Lake Tahoe", 39.0, -120.0, None))
            .await
            .unwrap();

        let outcome = PlaceRepository::insert_place(&pool, &place("lake tahoe", 39.0, -120.0, None))
            .await
            .unwrap();
        assert!(outcome.is_inserted());
        assert!(PlaceRepository::find_by_name(&pool, "LAKE TAHOE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unrated_place_stays_unrated() {
        let pool = init_memory_pool().await.unwrap();
        PlaceRepository::insert_place(&pool, &place("Quiet Spot", 0.0, 0.0, None))
            .await
            .unwrap();

        let stored = PlaceRepository::find_by_name(&pool, "Quiet Spot").await.unwrap().unwrap();
        assert_eq!(stored.rating, None);
        assert_eq!(stored.rating_label(), "unrated");
    }

    #[tokio::test]
    async fn test_batch_reports_each_record() {
        let pool = init_memory_pool().await.unwrap();
        let outcomes = PlaceRepository::insert_places(
            &pool,
            &[
                place("A", 0.0, 0.0, None),
                place("A", 1.0, 1.0, None),
                place("B", 0.0, 0.0, Some(3.0)),
            ],
        )
        .await
        .unwrap();

        assert!(outcomes[0].is_inserted());
        assert_eq!(
            outcomes[1],
            InsertOutcome::SkippedDuplicate { existing_id: outcomes[0].id().unwrap() }
        );
        assert!(outcomes[2].is_inserted());
    }

    #[tokio::test]
    async fn test_sample_places_clamps_to_table_size() {
        let pool = init_memory_pool().await.unwrap();
        for name in ["A", "B", "C"] {
            PlaceRepository::insert_place(&pool, &place(name, 0.0, 0.0, None))
                .await
                .unwrap();
        }

        let sample = PlaceRepository::sample_places(&pool, 10).await.unwrap();
        assert_eq!(sample.len(), 3);

        let mut names: Vec<String> = sample.into_iter().map(|p| p.name).collect();
        names.sort();
        assert_eq!(names, vec!["A", "B", "C"]);

        assert_eq!(PlaceRepository::sample_places(&pool, 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sample_places_empty_table() {
        let pool = init_memory_pool().await.unwrap();
        assert!(PlaceRepository::sample_places(&pool, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let pool = init_memory_pool().await.unwrap();
        let err = PlaceRepository::get_by_id(&pool, 42).await.unwrap_err();
        assert!(matches!(err, PlacesError::NotFound(_)));
    }

    #[test]
    fn test_pick_latest() {
        assert_eq!(pick_latest(vec![(9,), (4,)], "review", "Cafe").unwrap(), 9);
        assert!(matches!(
            pick_latest(Vec::new(), "place", "Nowhere"),
            Err(PlacesError::NoOwningRecord(_))
        ));
    }
}
