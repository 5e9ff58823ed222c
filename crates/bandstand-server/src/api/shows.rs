use axum::{
    extract::State,
    http::StatusCode,
    Form, Json,
};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use bandstand_db::repo;
use bandstand_db::repo::shows::{NewShow, ShowListing};
use bandstand_db::AppState;

use super::ApiError;

#[derive(Debug, Serialize)]
pub struct ShowsPage {
    pub shows: Vec<ShowListing>,
}

/// Blank show form: ids empty, start time defaulted to the current
/// instant.
#[derive(Debug, Serialize)]
pub struct ShowFormPage {
    pub artist_id: Option<i32>,
    pub venue_id: Option<i32>,
    pub start_time_default: DateTime<FixedOffset>,
}

#[derive(Debug, Deserialize)]
pub struct ShowForm {
    pub artist_id: Option<String>,
    pub venue_id: Option<String>,
    pub start_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShowCreated {
    pub message: &'static str,
    pub id: i32,
}

/// GET /shows
pub async fn list_shows(State(state): State<Arc<AppState>>) -> Result<Json<ShowsPage>, ApiError> {
    let shows = repo::shows::list(&state.db).await?;
    Ok(Json(ShowsPage { shows }))
}

/// GET /shows/create
pub async fn new_show_form() -> Json<ShowFormPage> {
    Json(ShowFormPage {
        artist_id: None,
        venue_id: None,
        start_time_default: Utc::now().fixed_offset(),
    })
}

/// POST /shows/create
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ShowForm>,
) -> Result<(StatusCode, Json<ShowCreated>), ApiError> {
    let input = parse_show_form(form)?;
    let created = repo::shows::create(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShowCreated {
            message: "Show was successfully listed!",
            id: created.id,
        }),
    ))
}

fn parse_show_form(form: ShowForm) -> Result<NewShow, ApiError> {
    Ok(NewShow {
        artist_id: parse_id(form.artist_id.as_deref(), "artist_id")?,
        venue_id: parse_id(form.venue_id.as_deref(), "venue_id")?,
        start_time: parse_start_time(form.start_time.as_deref().unwrap_or(""))?,
    })
}

fn parse_id(raw: Option<&str>, field: &str) -> Result<i32, ApiError> {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() {
        return Err(ApiError::unprocessable(format!("{field} is required")));
    }
    raw.parse::<i32>()
        .map_err(|_| ApiError::unprocessable(format!("{field} must be a numeric id")))
}

/// Accepts RFC 3339 or the form layer's `YYYY-MM-DD HH:MM:SS` shape;
/// naive timestamps are taken as UTC.
fn parse_start_time(raw: &str) -> Result<DateTime<FixedOffset>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::unprocessable("start_time is required"));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|_| ApiError::unprocessable(format!("start_time is not a valid timestamp: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(artist_id: &str, venue_id: &str, start_time: &str) -> ShowForm {
        ShowForm {
            artist_id: Some(artist_id.into()),
            venue_id: Some(venue_id.into()),
            start_time: Some(start_time.into()),
        }
    }

    #[test]
    fn test_parse_show_form_rfc3339() {
        let parsed = parse_show_form(form("4", "1", "2035-04-01T20:00:00+00:00")).unwrap();
        assert_eq!(parsed.artist_id, 4);
        assert_eq!(parsed.venue_id, 1);
        assert_eq!(parsed.start_time.to_rfc3339(), "2035-04-01T20:00:00+00:00");
    }

    #[test]
    fn test_parse_show_form_naive_timestamp() {
        let parsed = parse_show_form(form("4", "1", "2035-04-01 20:00:00")).unwrap();
        assert_eq!(parsed.start_time.to_rfc3339(), "2035-04-01T20:00:00+00:00");
    }

    #[test]
    fn test_parse_show_form_missing_fields() {
        let err = parse_show_form(ShowForm {
            artist_id: None,
            venue_id: Some("1".into()),
            start_time: Some("2035-04-01 20:00:00".into()),
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable(_)));
    }

    #[test]
    fn test_parse_show_form_non_numeric_id() {
        let err = parse_show_form(form("petals", "1", "2035-04-01 20:00:00")).unwrap_err();
        match err {
            ApiError::Unprocessable(msg) => assert!(msg.contains("artist_id")),
            other => panic!("expected Unprocessable, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_start_time_garbage() {
        let err = parse_start_time("next tuesday").unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable(_)));
    }

    #[test]
    fn test_shows_page_serialization() {
        let start = DateTime::parse_from_rfc3339("2035-04-01T20:00:00+00:00").unwrap();
        let page = ShowsPage {
            shows: vec![ShowListing {
                venue_id: 1,
                venue_name: "The Musical Hop".into(),
                artist_id: 4,
                artist_name: "Guns N Petals".into(),
                artist_image_link: None,
                start_time: start,
            }],
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["shows"][0]["venue_name"], "The Musical Hop");
        assert_eq!(json["shows"][0]["artist_id"], 4);
    }
}
