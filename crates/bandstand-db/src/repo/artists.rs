//! Artist queries and mutations.

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

/// Fields accepted by artist create and edit submissions. An edit
/// overwrites every mutable column from this payload.
#[derive(Debug, Clone, Default)]
pub struct NewArtist {
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub genres: Vec<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

/// Minimal projection for the artist index page.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct ArtistRef {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: u64,
}

/// An artist's booking as displayed on their detail page.
#[derive(Debug, Clone, Serialize)]
pub struct ShowWithVenue {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: DateTime<FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct ArtistDetail {
    pub artist: artist::Model,
    pub past_shows: Vec<ShowWithVenue>,
    pub upcoming_shows: Vec<ShowWithVenue>,
}

#[derive(Debug, FromQueryResult)]
struct UpcomingCountRow {
    artist_id: i32,
    upcoming: i64,
}

async fn upcoming_counts<C: ConnectionTrait>(
    db: &C,
    artist_ids: &[i32],
) -> Result<HashMap<i32, u64>, StoreError> {
    if artist_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = show::Entity::find()
        .select_only()
        .column(show::Column::ArtistId)
        .column_as(show::Column::Id.count(), "upcoming")
        .filter(show::Column::StartTime.gt(Utc::now().fixed_offset()))
        .filter(show::Column::ArtistId.is_in(artist_ids.iter().copied()))
        .group_by(show::Column::ArtistId)
        .into_model::<UpcomingCountRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.artist_id, row.upcoming as u64))
        .collect())
}

/// All artists ordered by id ascending, id and name only.
pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<ArtistRef>, StoreError> {
    Ok(artist::Entity::find()
        .select_only()
        .column(artist::Column::Id)
        .column(artist::Column::Name)
        .order_by_asc(artist::Column::Id)
        .into_model::<ArtistRef>()
        .all(db)
        .await?)
}

/// Case-insensitive substring search on artist name. An empty term
/// matches every artist.
pub async fn search_by_name<C: ConnectionTrait>(
    db: &C,
    term: &str,
) -> Result<SearchResults<ArtistSummary>, StoreError> {
    let pattern = super::like_pattern(term);
    let artists = artist::Entity::find()
        .filter(Expr::col((artist::Entity, artist::Column::Name)).ilike(pattern.as_str()))
        .order_by_asc(artist::Column::Name)
        .all(db)
        .await?;

    let ids: Vec<i32> = artists.iter().map(|a| a.id).collect();
    let counts = upcoming_counts(db, &ids).await?;

    let data: Vec<ArtistSummary> = artists
        .into_iter()
        .map(|a| ArtistSummary {
            num_upcoming_shows: counts.get(&a.id).copied().unwrap_or(0),
            id: a.id,
            name: a.name,
        })
        .collect();

    Ok(SearchResults {
        count: data.len(),
        data,
    })
}

/// Bare artist row, no show resolution. Used to populate the edit form.
pub async fn get<C: ConnectionTrait>(db: &C, id: i32) -> Result<artist::Model, StoreError> {
    artist::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)
}

/// Artist plus their shows partitioned into past and upcoming, with
/// each show's venue display fields resolved.
pub async fn get_detail<C: ConnectionTrait>(db: &C, id: i32) -> Result<ArtistDetail, StoreError> {
    let artist_model = artist::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound)?;

    let rows = show::Entity::find()
        .filter(show::Column::ArtistId.eq(id))
        .find_also_related(venue::Entity)
        .order_by_asc(show::Column::StartTime)
        .all(db)
        .await?;

    let shows: Vec<(show::Model, venue::Model)> = rows
        .into_iter()
        .filter_map(|(s, v)| v.map(|v| (s, v)))
        .collect();

    let (past_shows, upcoming_shows) = partition_shows(shows, Utc::now().fixed_offset());

    Ok(ArtistDetail {
        artist: artist_model,
        past_shows,
        upcoming_shows,
    })
}

fn partition_shows(
    rows: Vec<(show::Model, venue::Model)>,
    now: DateTime<FixedOffset>,
) -> (Vec<ShowWithVenue>, Vec<ShowWithVenue>) {
    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for (s, v) in rows {
        let entry = ShowWithVenue {
            venue_id: v.id,
            venue_name: v.name,
            venue_image_link: v.image_link,
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

fn validate(input: &NewArtist) -> Result<(), StoreError> {
    if input.name.trim().is_empty() {
        return Err(StoreError::validation("name is required"));
    }
    Ok(())
}

fn apply(input: NewArtist, active: &mut artist::ActiveModel) {
    active.name = Set(input.name);
    active.city = Set(input.city);
    active.state = Set(input.state);
    active.phone = Set(input.phone);
    active.image_link = Set(input.image_link);
    active.facebook_link = Set(input.facebook_link);
    active.website_link = Set(input.website_link);
    active.genres = Set(Some(genres::to_stored(&input.genres)));
    active.seeking_venue = Set(input.seeking_venue);
    active.seeking_description = Set(input.seeking_description);
}

pub async fn create<C: TransactionTrait>(
    db: &C,
    input: NewArtist,
) -> Result<artist::Model, StoreError> {
    validate(&input)?;

    let txn = db.begin().await?;
    let mut active = <artist::ActiveModel as sea_orm::ActiveModelTrait>::default();
    apply(input, &mut active);
    let created = active.insert(&txn).await.map_err(StoreError::from_db)?;
    txn.commit().await?;
    Ok(created)
}

/// Full-field overwrite of an existing artist.
pub async fn update<C: TransactionTrait>(
    db: &C,
    id: i32,
    input: NewArtist,
) -> Result<artist::Model, StoreError> {
    validate(&input)?;

    let txn = db.begin().await?;
    let existing = artist::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(StoreError::NotFound)?;

    let mut active: artist::ActiveModel = existing.into();
    apply(input, &mut active);
    let updated = active.update(&txn).await.map_err(StoreError::from_db)?;
    txn.commit().await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn fixed_now() -> DateTime<FixedOffset> {
        chrono::FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 1, 20, 0, 0)
            .unwrap()
    }

    fn make_venue(id: i32, name: &str) -> venue::Model {
        venue::Model {
            id,
            name: name.into(),
            city: None,
            state: None,
            address: None,
            phone: None,
            image_link: Some(format!("https://img.example.com/venue-{id}.jpg")),
            facebook_link: None,
            website_link: None,
            genres: None,
            seeking_talent: false,
            seeking_description: None,
        }
    }

    fn make_show(id: i32, artist_id: i32, venue_id: i32, start: DateTime<FixedOffset>) -> show::Model {
        show::Model {
            id,
            artist_id,
            venue_id,
            start_time: start,
        }
    }

    // ── Partitioning ──────────────────────────────────────────────────

    #[test]
    fn test_partition_mutually_exclusive() {
        let now = fixed_now();
        let rows = vec![
            (make_show(1, 5, 1, now - Duration::days(1)), make_venue(1, "The Musical Hop")),
            (make_show(2, 5, 2, now + Duration::days(1)), make_venue(2, "Park Square Live Music & Coffee")),
        ];
        let (past, upcoming) = partition_shows(rows, now);
        assert_eq!(past.len(), 1);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(past[0].venue_name, "The Musical Hop");
        assert_eq!(upcoming[0].venue_id, 2);
    }

    #[test]
    fn test_partition_carries_venue_display_fields() {
        let now = fixed_now();
        let rows = vec![(make_show(1, 5, 3, now + Duration::hours(2)), make_venue(3, "The Dueling Pianos Bar"))];
        let (_, upcoming) = partition_shows(rows, now);
        assert_eq!(
            upcoming[0].venue_image_link.as_deref(),
            Some("https://img.example.com/venue-3.jpg")
        );
    }

    // ── Validation ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_requires_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = create(&db, NewArtist::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_missing_artist_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<artist::Model, _, _>([vec![]])
            .into_connection();
        let input = NewArtist {
            name: "Guns N Petals".into(),
            ..Default::default()
        };
        let err = update(&db, 99, input).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_update_overwrites_every_field() {
        // The stored row has every optional field populated; the payload
        // leaves them absent, so the update must clear them.
        let existing = artist::Model {
            id: 4,
            name: "Guns N Petals".into(),
            city: Some("San Francisco".into()),
            state: Some("CA".into()),
            phone: Some("326-123-5000".into()),
            image_link: Some("https://img.example.com/old.jpg".into()),
            facebook_link: Some("https://www.facebook.com/GunsNPetals".into()),
            website_link: Some("https://gunsnpetalsband.com".into()),
            genres: Some(genres::to_stored(&["Rock n Roll".to_string()])),
            seeking_venue: true,
            seeking_description: Some("Looking for shows".into()),
        };
        let overwritten = artist::Model {
            name: "Guns N Petals".into(),
            city: None,
            state: None,
            phone: None,
            image_link: None,
            facebook_link: None,
            website_link: None,
            genres: Some(genres::to_stored(&[])),
            seeking_venue: false,
            seeking_description: None,
            ..existing.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .append_query_results([vec![overwritten.clone()]])
            .into_connection();

        let input = NewArtist {
            name: "Guns N Petals".into(),
            ..Default::default()
        };
        let updated = update(&db, 4, input).await.unwrap();
        assert_eq!(updated, overwritten);
        assert!(updated.city.is_none());
        assert!(!updated.seeking_venue);
    }
}
