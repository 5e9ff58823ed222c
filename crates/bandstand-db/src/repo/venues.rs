//! Venue queries and mutations.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use crate::entities::{artist, show, venue};
use crate::error::StoreError;
use crate::genres;

use super::SearchResults;

/// Fields accepted by venue create and edit submissions. An edit
/// overwrites every mutable column from this payload; absent optional
/// fields clear the stored value.
#[derive(Debug, Clone, Default)]
pub struct NewVenue {
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub genres: Vec<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: u64,
}

/// Venues grouped under one distinct (city, state) pair.
#[derive(Debug, Clone, Serialize)]
pub struct LocationVenues {
    pub city: Option<String>,
    pub state: Option<String>,
    pub venues: Vec<VenueSummary>,
}

/// A venue's show as displayed on its detail page.
#[derive(Debug, Clone, Serialize)]
pub struct ShowWithArtist {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTime<FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct VenueDetail {
    pub venue: venue::Model,
    pub past_shows: Vec<ShowWithArtist>,
    pub upcoming_shows: Vec<ShowWithArtist>,
}

#[derive(Debug, FromQueryResult)]
struct UpcomingCountRow {
    venue_id: i32,
    upcoming: i64,
}

/// Upcoming-show count per venue, computed in one grouped aggregate
/// query. Venues with no upcoming shows have no row here.
async fn upcoming_counts<C: ConnectionTrait>(
    db: &C,
    venue_ids: Option<&[i32]>,
) -> Result<HashMap<i32, u64>, StoreError> {
    let mut query = show::Entity::find()
        .select_only()
        .column(show::Column::VenueId)
        .column_as(show::Column::Id.count(), "upcoming")
        .filter(show::Column::StartTime.gt(Utc::now().fixed_offset()))
        .group_by(show::Column::VenueId);

    if let Some(ids) = venue_ids {
        query = query.filter(show::Column::VenueId.is_in(ids.iter().copied()));
    }

    let rows = query.into_model::<UpcomingCountRow>().all(db).await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.venue_id, row.upcoming as u64))
        .collect())
}

/// Distinct (city, state) pairs, each with its venues and per-venue
/// upcoming-show counts. Ordered by city, then state.
pub async fn list_locations<C: ConnectionTrait>(db: &C) -> Result<Vec<LocationVenues>, StoreError> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::City)
        .order_by_asc(venue::Column::State)
        .order_by_asc(venue::Column::Id)
        .all(db)
        .await?;

    let counts = upcoming_counts(db, None).await?;
    Ok(group_by_location(venues, &counts))
}

fn group_by_location(
    venues: Vec<venue::Model>,
    counts: &HashMap<i32, u64>,
) -> Vec<LocationVenues> {
    let mut groups: Vec<LocationVenues> = Vec::new();
    for v in venues {
        let summary = VenueSummary {
            id: v.id,
            name: v.name,
            num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
        };
        match groups.last_mut() {
            // Input is sorted by (city, state), so equal pairs are adjacent
            Some(group) if group.city == v.city && group.state == v.state => {
                group.venues.push(summary);
            }
            _ => groups.push(LocationVenues {
                city: v.city,
                state: v.state,
                venues: vec![summary],
            }),
        }
    }
    groups
}

/// Case-insensitive substring search on venue name. An empty term
/// matches every venue.
pub async fn search_by_name<C: ConnectionTrait>(
    db: &C,
    term: &str,
) -> Result<SearchResults<VenueSummary>, StoreError> {
    let pattern = super::like_pattern(term);
    let venues = venue::Entity::find()
        .filter(Expr::col((venue::Entity, venue::Column::Name)).ilike(pattern.as_str()))
        .order_by_asc(venue::Column::Name)
        .all(db)
        .await?;

    let ids: Vec<i32> = venues.iter().map(|v| v.id).collect();
    let counts = if ids.is_empty() {
        HashMap::new()
    } else {
        upcoming_counts(db, Some(&ids)).await?
    };

    let data: Vec<VenueSummary> = venues
        .into_iter()
        .map(|v| VenueSummary {
            num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
            id: v.id,
            name: v.name,
        })
        .collect();

    Ok(SearchResults {
        count: data.len(),
        data,
    })
}

/// Bare venue row, no show resolution. Used to populate the edit form.
pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> Result<venue::Model, StoreError> {
    venue::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

/// Venue plus its shows partitioned into past and upcoming, with each
/// show's artist display fields resolved.
pub async fn get_detail<C: ConnectionTrait>(db: &C, id: i32) -> Result<VenueDetail, StoreError> {
    let venue_model = venue::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)?;

    let rows = show::Entity::find()
        .filter(show::Column::VenueId.eq(id))
        .find_also_related(artist::Entity)
        .order_by_asc(show::Column::StartTime)
        .all(db)
        .await?;

    // The FK guarantees the artist row; a missing join partner is dropped
    let shows: Vec<(show::Model, artist::Model)> = rows
        .into_iter()
        .filter_map(|(s, a)| a.map(|a| (s, a)))
        .collect();

    let (past_shows, upcoming_shows) = partition_shows(shows, Utc::now().fixed_offset());

    Ok(VenueDetail {
        venue: venue_model,
        past_shows,
        upcoming_shows,
    })
}

fn partition_shows(
    rows: Vec<(show::Model, artist::Model)>,
    now: DateTime<FixedOffset>,
) -> (Vec<ShowWithArtist>, Vec<ShowWithArtist>) {
    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for (s, a) in rows {
        let entry = ShowWithArtist {
            artist_id: a.id,
            artist_name: a.name,
            artist_image_link: a.image_link,
            start_time: s.start_time,
        };
        if super::is_upcoming(s.start_time, now) {
            upcoming.push(entry);
        } else {
            past.push(entry);
        }
    }
    (past, upcoming)
}

fn validate(input: &NewVenue) -> Result<(), StoreError> {
    if input.name.trim().is_empty() {
        return Err(StoreError::validation("name is required"));
    }
    Ok(())
}

fn apply(input: NewVenue, active: &mut venue::ActiveModel) {
    active.name = Set(input.name);
    active.city = Set(input.city);
    active.state = Set(input.state);
    active.address = Set(input.address);
    active.phone = Set(input.phone);
    active.image_link = Set(input.image_link);
    active.facebook_link = Set(input.facebook_link);
    active.website_link = Set(input.website_link);
    active.genres = Set(Some(genres::to_stored(&input.genres)));
    active.seeking_talent = Set(input.seeking_talent);
    active.seeking_description = Set(input.seeking_description);
}

pub async fn create<C: TransactionTrait>(
    db: &C,
    input: NewVenue,
) -> Result<venue::Model, StoreError> {
    validate(&input)?;

    let txn = db.begin().await?;
    let mut active = <venue::ActiveModel as sea_orm::ActiveModelTrait>::default();
    apply(input, &mut active);
    let created = active.insert(&txn).await.map_err(StoreError::from_db)?;
    txn.commit().await?;
    Ok(created)
}

/// Full-field overwrite of an existing venue.
pub async fn update<C: TransactionTrait>(
    db: &C,
    id: i32,
    input: NewVenue,
) -> Result<venue::Model, StoreError> {
    validate(&input)?;

    let txn = db.begin().await?;
    let existing = venue::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(StoreError::NotFound)?;

    let mut active: venue::ActiveModel = existing.into();
    apply(input, &mut active);
    let updated = active.update(&txn).await.map_err(StoreError::from_db)?;
    txn.commit().await?;
    Ok(updated)
}

/// Delete a venue. Its shows go with it (FK cascade).
pub async fn delete<C: TransactionTrait>(db: &C, id: i32) -> Result<(), StoreError> {
    let txn = db.begin().await?;
    let result = venue::Entity::delete_by_id(id)
        .exec(&txn)
        .await
        .map_err(StoreError::from_db)?;
    if result.rows_affected == 0 {
        // Dropping the transaction rolls it back
        return Err(StoreError::NotFound);
    }
    txn.commit().await?;
    tracing::info!(venue_id = id, "venue deleted");
    Ok(())
}
