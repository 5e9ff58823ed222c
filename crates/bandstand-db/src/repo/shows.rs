//! Show queries and creation. Shows are create-only: no edit or delete
//! surface exists for them.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;

use crate::entities::{artist, show, venue};
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct NewShow {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: DateTime<FixedOffset>,
}

/// A show row denormalized for the listing page.
#[derive(Debug, Clone, Serialize)]
pub struct ShowListing {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTime<FixedOffset>,
}

/// Every show with its venue and artist display fields. Referenced rows
/// are fetched in two batched lookups, not per show.
pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<ShowListing>, StoreError> {
    let shows = show::Entity::find()
        .order_by_asc(show::Column::StartTime)
        .order_by_asc(show::Column::Id)
        .all(db)
        .await?;

    if shows.is_empty() {
        return Ok(Vec::new());
    }

    let mut artist_ids: Vec<i32> = shows.iter().map(|s| s.artist_id).collect();
    artist_ids.sort_unstable();
    artist_ids.dedup();
    let mut venue_ids: Vec<i32> = shows.iter().map(|s| s.venue_id).collect();
    venue_ids.sort_unstable();
    venue_ids.dedup();

    let artists: HashMap<i32, artist::Model> = artist::Entity::find()
        .filter(artist::Column::Id.is_in(artist_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    let venues: HashMap<i32, venue::Model> = venue::Entity::find()
        .filter(venue::Column::Id.is_in(venue_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();

    Ok(assemble_listings(shows, &artists, &venues))
}

fn assemble_listings(
    shows: Vec<show::Model>,
    artists: &HashMap<i32, artist::Model>,
    venues: &HashMap<i32, venue::Model>,
) -> Vec<ShowListing> {
    shows
        .into_iter()
        .filter_map(|s| {
            // FK integrity guarantees both; a row missing its join
            // partner is dropped rather than invented
            let artist = artists.get(&s.artist_id)?;
            let venue = venues.get(&s.venue_id)?;
            Some(ShowListing {
                venue_id: venue.id,
                venue_name: venue.name.clone(),
                artist_id: artist.id,
                artist_name: artist.name.clone(),
                artist_image_link: artist.image_link.clone(),
                start_time: s.start_time,
            })
        })
        .collect()
}

/// Insert a show. A dangling artist or venue reference fails the FK
/// check and surfaces as [`StoreError::Constraint`]; nothing persists.
pub async fn create<C: TransactionTrait>(db: &C, input: NewShow) -> Result<show::Model, StoreError> {
    if input.artist_id <= 0 {
        return Err(StoreError::validation("artist_id is required"));
    }
    if input.venue_id <= 0 {
        return Err(StoreError::validation("venue_id is required"));
    }

    let txn = db.begin().await?;
    let active = show::ActiveModel {
        artist_id: Set(input.artist_id),
        venue_id: Set(input.venue_id),
        start_time: Set(input.start_time),
        ..Default::default()
    };
    let created = active.insert(&txn).await.map_err(StoreError::from_db)?;
    txn.commit().await?;
    Ok(created)
}
