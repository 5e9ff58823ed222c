use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use bandstand_db::entities::artist;
use bandstand_db::repo::artists::{
    ArtistDetail, ArtistRef, ArtistSummary, NewArtist, ShowWithVenue,
};
use bandstand_db::repo::{self, SearchResults};
use bandstand_db::{genres, AppState};

use super::venues::SearchForm;
use super::{blank_to_none, forms, ApiError};

#[derive(Debug, Serialize)]
pub struct ArtistsPage {
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Serialize)]
pub struct ArtistSearchPage {
    pub search_term: String,
    #[serde(flatten)]
    pub results: SearchResults<ArtistSummary>,
}

/// Artist detail view-model: the record with genres decoded plus their
/// bookings split into past and upcoming.
#[derive(Debug, Serialize)]
pub struct ArtistView {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<ShowWithVenue>,
    pub upcoming_shows: Vec<ShowWithVenue>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl From<ArtistDetail> for ArtistView {
    fn from(detail: ArtistDetail) -> Self {
        let a = detail.artist;
        Self {
            id: a.id,
            name: a.name,
            genres: genres::from_stored(a.genres.as_ref()),
            city: a.city,
            state: a.state,
            phone: a.phone,
            website_link: a.website_link,
            facebook_link: a.facebook_link,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
            image_link: a.image_link,
            past_shows_count: detail.past_shows.len(),
            upcoming_shows_count: detail.upcoming_shows.len(),
            past_shows: detail.past_shows,
            upcoming_shows: detail.upcoming_shows,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistFormValues {
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

impl From<artist::Model> for ArtistFormValues {
    fn from(a: artist::Model) -> Self {
        Self {
            name: a.name,
            city: a.city,
            state: a.state,
            phone: a.phone,
            image_link: a.image_link,
            facebook_link: a.facebook_link,
            website_link: a.website_link,
            genres: genres::from_stored(a.genres.as_ref()),
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistFormPage {
    pub genre_choices: &'static [&'static str],
    pub state_choices: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<ArtistFormValues>,
}

/// Artist create/edit submission. Mirrors the venue form minus address,
/// with seeking_venue in place of seeking_talent.
#[derive(Debug, Deserialize)]
pub struct ArtistForm {
    #[serde(default)]
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_venue: Option<String>,
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    fn into_new_artist(self) -> NewArtist {
        NewArtist {
            name: self.name.trim().to_string(),
            city: blank_to_none(self.city),
            state: blank_to_none(self.state),
            phone: blank_to_none(self.phone),
            image_link: blank_to_none(self.image_link),
            facebook_link: blank_to_none(self.facebook_link),
            website_link: blank_to_none(self.website_link),
            genres: self.genres.as_deref().map(genres::parse).unwrap_or_default(),
            seeking_venue: self.seeking_venue.is_some(),
            seeking_description: blank_to_none(self.seeking_description),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistMutated {
    pub message: String,
    pub id: i32,
}

/// GET /artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ArtistsPage>, ApiError> {
    let artists = repo::artists::list(&state.db).await?;
    Ok(Json(ArtistsPage { artists }))
}

/// POST /artists/search
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Result<Json<ArtistSearchPage>, ApiError> {
    let results = repo::artists::search_by_name(&state.db, &form.search_term).await?;
    Ok(Json(ArtistSearchPage {
        search_term: form.search_term,
        results,
    }))
}

/// GET /artists/{id}
pub async fn show_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ArtistView>, ApiError> {
    let detail = repo::artists::get_detail(&state.db, id).await?;
    Ok(Json(ArtistView::from(detail)))
}

/// GET /artists/create
pub async fn new_artist_form() -> Json<ArtistFormPage> {
    Json(ArtistFormPage {
        genre_choices: forms::GENRE_CHOICES,
        state_choices: forms::STATE_CHOICES,
        artist: None,
    })
}

/// POST /artists/create
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ArtistForm>,
) -> Result<(StatusCode, Json<ArtistMutated>), ApiError> {
    let created = repo::artists::create(&state.db, form.into_new_artist()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ArtistMutated {
            message: format!("Artist {} was successfully listed!", created.name),
            id: created.id,
        }),
    ))
}

/// GET /artists/{id}/edit
pub async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ArtistFormPage>, ApiError> {
    let existing = repo::artists::get(&state.db, id).await?;
    Ok(Json(ArtistFormPage {
        genre_choices: forms::GENRE_CHOICES,
        state_choices: forms::STATE_CHOICES,
        artist: Some(ArtistFormValues::from(existing)),
    }))
}

/// POST /artists/{id}/edit (full-field overwrite)
pub async fn update_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Form(form): Form<ArtistForm>,
) -> Result<Json<ArtistMutated>, ApiError> {
    let updated = repo::artists::update(&state.db, id, form.into_new_artist()).await?;
    Ok(Json(ArtistMutated {
        message: format!("Artist {} was successfully updated!", updated.name),
        id: updated.id,
    }))
}
