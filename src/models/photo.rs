// src/models/photo.rs

use crate::errors::PlacesError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Shown for photos without a title
pub const UNTITLED: &str = "untitled";

/// Which table a photo's owner lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoOrigin {
    /// Photo search triggered by a place (Google)
    Place,
    /// Photo search triggered by a nearby business (Yelp)
    Review,
}

impl PhotoOrigin {
    /// Discriminator stored in the `origin` column
    pub fn as_i64(self) -> i64 {
        match self {
            PhotoOrigin::Place => 1,
            PhotoOrigin::Review => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(PhotoOrigin::Place),
            2 => Some(PhotoOrigin::Review),
            _ => None,
        }
    }
}

/// Photo row as stored; origin is kept as its integer discriminator
#[derive(Debug, FromRow)]
pub(crate) struct PhotoRow {
    pub id: i64,
    pub owner_id: i64,
    pub search_name: String,
    pub origin: i64,
    pub title: Option<String>,
    pub farm_id: String,
    pub server_id: String,
    pub photo_id: String,
    pub secret: String,
    pub url: String,
}

impl PhotoRow {
    /// An unknown origin discriminator means the row cannot be linked to an owner
    pub(crate) fn to_photo(self) -> Result<Photo, PlacesError> {
        let Some(origin) = PhotoOrigin::from_i64(self.origin) else {
            log::warn!("Photo {} has unknown origin {}", self.id, self.origin);
            return Err(PlacesError::DatabaseError(format!(
                "Photo {} has unknown origin {}",
                self.id, self.origin
            )));
        };

        Ok(Photo {
            id: self.id,
            owner_id: self.owner_id,
            search_name: self.search_name,
            origin,
            title: self.title,
            farm_id: self.farm_id,
            server_id: self.server_id,
            photo_id: self.photo_id,
            secret: self.secret,
            url: self.url,
        })
    }
}

/// Photo found near a place or a nearby business
/// Unique on (photo_id, search_name)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub owner_id: i64,
    pub search_name: String,
    pub origin: PhotoOrigin,
    pub title: Option<String>,
    pub farm_id: String,
    pub server_id: String,
    pub photo_id: String,
    pub secret: String,
    pub url: String,
}

impl Photo {
    pub fn title_label(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    /// Convert database photo into the (title, url) pair shown to users
    pub fn to_link(&self) -> PhotoLink {
        PhotoLink {
            title: self.title_label().to_string(),
            url: self.url.clone(),
        }
    }
}

/// Request to create a new photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePhotoRequest {
    pub search_name: String,
    pub origin: PhotoOrigin,
    pub title: Option<String>,
    pub farm_id: String,
    pub server_id: String,
    pub photo_id: String,
    pub secret: String,
}

impl CreatePhotoRequest {
    /// Large (`_h`) static image URL
    pub fn display_url(&self) -> String {
        format!(
            "https://farm{}.staticflickr.com/{}/{}_{}_h.jpg",
            self.farm_id, self.server_id, self.photo_id, self.secret
        )
    }
}

impl fmt::Display for CreatePhotoRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_url())
    }
}

/// (title, url) pair exposed to presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoLink {
    pub title: String,
    pub url: String,
}
