use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use bandstand_db::entities::venue;
use bandstand_db::repo::venues::{LocationVenues, NewVenue, ShowWithArtist, VenueDetail, VenueSummary};
use bandstand_db::repo::{self, SearchResults};
use bandstand_db::{genres, AppState};

use super::{blank_to_none, forms, ApiError};

#[derive(Debug, Serialize)]
pub struct VenuesPage {
    pub areas: Vec<LocationVenues>,
}

#[derive(Debug, Serialize)]
pub struct VenueSearchPage {
    pub search_term: String,
    #[serde(flatten)]
    pub results: SearchResults<VenueSummary>,
}

/// Venue detail view-model: the record with genres decoded plus its
/// shows split into past and upcoming.
#[derive(Debug, Serialize)]
pub struct VenueView {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub website_link: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<ShowWithArtist>,
    pub upcoming_shows: Vec<ShowWithArtist>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl From<VenueDetail> for VenueView {
    fn from(detail: VenueDetail) -> Self {
        let v = detail.venue;
        Self {
            id: v.id,
            name: v.name,
            genres: genres::from_stored(v.genres.as_ref()),
            address: v.address,
            city: v.city,
            state: v.state,
            phone: v.phone,
            website_link: v.website_link,
            facebook_link: v.facebook_link,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
            image_link: v.image_link,
            past_shows_count: detail.past_shows.len(),
            upcoming_shows_count: detail.upcoming_shows.len(),
            past_shows: detail.past_shows,
            upcoming_shows: detail.upcoming_shows,
        }
    }
}

/// Current field values rendered into the create/edit form.
#[derive(Debug, Serialize)]
pub struct VenueFormValues {
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

impl From<venue::Model> for VenueFormValues {
    fn from(v: venue::Model) -> Self {
        Self {
            name: v.name,
            city: v.city,
            state: v.state,
            address: v.address,
            phone: v.phone,
            image_link: v.image_link,
            facebook_link: v.facebook_link,
            website_link: v.website_link,
            genres: genres::from_stored(v.genres.as_ref()),
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VenueFormPage {
    pub genre_choices: &'static [&'static str],
    pub state_choices: &'static [&'static str],
    /// Populated for the edit form, absent for the blank create form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<VenueFormValues>,
}

/// Venue create/edit submission. `genres` arrives as free text and is
/// run through the tolerant parser; the seeking_talent checkbox is true
/// when present at all.
#[derive(Debug, Deserialize)]
pub struct VenueForm {
    #[serde(default)]
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub genres: Option<String>,
    pub facebook_link: Option<String>,
    pub image_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_talent: Option<String>,
    pub seeking_description: Option<String>,
}

impl VenueForm {
    fn into_new_venue(self) -> NewVenue {
        NewVenue {
            name: self.name.trim().to_string(),
            city: blank_to_none(self.city),
            state: blank_to_none(self.state),
            address: blank_to_none(self.address),
            phone: blank_to_none(self.phone),
            image_link: blank_to_none(self.image_link),
            facebook_link: blank_to_none(self.facebook_link),
            website_link: blank_to_none(self.website_link),
            genres: self.genres.as_deref().map(genres::parse).unwrap_or_default(),
            seeking_talent: self.seeking_talent.is_some(),
            seeking_description: blank_to_none(self.seeking_description),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VenueMutated {
    pub message: String,
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct VenueDeleted {
    pub message: String,
    pub redirect: &'static str,
}

/// GET /venues
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VenuesPage>, ApiError> {
    let areas = repo::venues::list_locations(&state.db).await?;
    Ok(Json(VenuesPage { areas }))
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}

/// POST /venues/search
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Result<Json<VenueSearchPage>, ApiError> {
    let results = repo::venues::search_by_name(&state.db, &form.search_term).await?;
    Ok(Json(VenueSearchPage {
        search_term: form.search_term,
        results,
    }))
}

/// GET /venues/{id}
pub async fn show_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VenueView>, ApiError> {
    let detail = repo::venues::get_detail(&state.db, id).await?;
    Ok(Json(VenueView::from(detail)))
}

/// GET /venues/create
pub async fn new_venue_form() -> Json<VenueFormPage> {
    Json(VenueFormPage {
        genre_choices: forms::GENRE_CHOICES,
        state_choices: forms::STATE_CHOICES,
        venue: None,
    })
}

/// POST /venues/create
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    Form(form): Form<VenueForm>,
) -> Result<(StatusCode, Json<VenueMutated>), ApiError> {
    let created = repo::venues::create(&state.db, form.into_new_venue()).await?;
    Ok((
        StatusCode::CREATED,
        Json(VenueMutated {
            message: format!("Venue {} was successfully listed!", created.name),
            id: created.id,
        }),
    ))
}

/// GET /venues/{id}/edit
pub async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VenueFormPage>, ApiError> {
    let existing = repo::venues::get(&state.db, id).await?;
    Ok(Json(VenueFormPage {
        genre_choices: forms::GENRE_CHOICES,
        state_choices: forms::STATE_CHOICES,
        venue: Some(VenueFormValues::from(existing)),
    }))
}

/// POST /venues/{id}/edit (full-field overwrite)
pub async fn update_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Form(form): Form<VenueForm>,
) -> Result<Json<VenueMutated>, ApiError> {
    let updated = repo::venues::update(&state.db, id, form.into_new_venue()).await?;
    Ok(Json(VenueMutated {
        message: format!("Venue {} was successfully updated!", updated.name),
        id: updated.id,
    }))
}

/// DELETE /venues/{id}
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VenueDeleted>, ApiError> {
    repo::venues::delete(&state.db, id).await?;
    Ok(Json(VenueDeleted {
        message: format!("Venue {id} was successfully deleted."),
        redirect: "/venues",
    }))
}
