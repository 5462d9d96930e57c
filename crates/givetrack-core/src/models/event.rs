use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::FormPart;

/// Validation failures for user-entered event and donation data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("All fields must be filled!")]
    MissingFields,

    #[error("Enter a valid amount")]
    InvalidAmount,

    #[error("This event has already ended")]
    EventEnded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Calendar date, `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    /// URL of the uploaded event image
    #[serde(default)]
    pub image: Option<String>,
    // Sent as a number, a decimal string or null depending on the endpoint
    #[serde(default)]
    pub total_donations: Option<Decimal>,
}

impl Event {
    pub fn total_donations(&self) -> Decimal {
        self.total_donations.unwrap_or(Decimal::ZERO)
    }

    /// Event date, accepting both plain dates and RFC 3339 timestamps
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(&self.date).ok().map(|dt| dt.date_naive()))
    }

    /// An event is past once its calendar day is before `today`. Events
    /// on `today` still accept donations; undated events never end.
    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.parsed_date().map(|d| d < today).unwrap_or(false)
    }

    pub fn accepts_donations(&self, today: NaiveDate) -> bool {
        !self.is_past(today)
    }

    pub fn matches_title(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.title.to_lowercase().contains(&query.to_lowercase())
    }

    pub fn formatted_date(&self) -> String {
        match self.parsed_date() {
            Some(date) => date.format("%b %d, %Y").to_string(),
            None if self.date.is_empty() => "TBD".to_string(),
            None => self.date.clone(),
        }
    }
}

/// Events whose title contains `query`, case-insensitively, in list order
pub fn filter_events<'a>(events: &'a [Event], query: &str) -> Vec<&'a Event> {
    events.iter().filter(|e| e.matches_title(query)).collect()
}

/// Image file attached to an event form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl ImageUpload {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime = match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
            Some(ext) if ext == "png" => Some("image/png".to_string()),
            Some(ext) if ext == "jpg" || ext == "jpeg" => Some("image/jpeg".to_string()),
            Some(ext) if ext == "gif" => Some("image/gif".to_string()),
            Some(ext) if ext == "webp" => Some("image/webp".to_string()),
            _ => None,
        };
        Ok(Self {
            file_name,
            bytes,
            mime,
        })
    }
}

/// Create/edit payload for an event, sent as multipart form data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub image: Option<ImageUpload>,
}

impl EventForm {
    /// Prefill an edit form; the image is only sent when replaced
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date.clone(),
            location: event.location.clone(),
            image: None,
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        let filled = [&self.title, &self.description, &self.date, &self.location]
            .iter()
            .all(|field| !field.trim().is_empty());
        if filled {
            Ok(())
        } else {
            Err(FormError::MissingFields)
        }
    }

    pub fn to_parts(&self) -> Vec<FormPart> {
        let mut parts: Vec<FormPart> = [
            ("title", &self.title),
            ("description", &self.description),
            ("date", &self.date),
            ("location", &self.location),
        ]
        .into_iter()
        .map(|(name, value)| FormPart::Text {
            name: name.to_string(),
            value: value.clone(),
        })
        .collect();

        if let Some(ref image) = self.image {
            parts.push(FormPart::File {
                name: "image".to_string(),
                file_name: image.file_name.clone(),
                bytes: image.bytes.clone(),
                mime: image.mime.clone(),
            });
        }
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn event(title: &str, date: &str) -> Event {
        Event {
            id: 1,
            title: title.to_string(),
            description: "Annual fundraiser".to_string(),
            date: date.to_string(),
            location: "Town Hall".to_string(),
            image: None,
            total_donations: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    #[test]
    fn test_parse_event_total_donations_variants() {
        let json = r#"{"id": 3, "title": "Gala", "date": "2026-05-01", "total_donations": "1500.50"}"#;
        let e: Event = serde_json::from_str(json).expect("string total");
        assert_eq!(e.total_donations(), Decimal::from_str("1500.50").expect("decimal"));

        let json = r#"{"id": 3, "title": "Gala", "total_donations": 2000}"#;
        let e: Event = serde_json::from_str(json).expect("number total");
        assert_eq!(e.total_donations(), Decimal::from(2000));

        let json = r#"{"id": 3, "title": "Gala", "total_donations": null}"#;
        let e: Event = serde_json::from_str(json).expect("null total");
        assert_eq!(e.total_donations(), Decimal::ZERO);
    }

    #[test]
    fn test_is_past_by_calendar_day() {
        let today = day("2026-03-10");
        assert!(event("Run", "2026-03-09").is_past(today));
        assert!(!event("Run", "2026-03-10").is_past(today));
        assert!(!event("Run", "2026-03-11").is_past(today));
        assert!(event("Run", "2026-03-09T23:30:00+00:00").is_past(today));
        assert!(!event("Run", "").is_past(today));
        assert!(event("Run", "2026-03-10").accepts_donations(today));
    }

    #[test]
    fn test_filter_events_case_insensitive() {
        let events = vec![
            event("Winter Charity Gala", "2026-01-01"),
            event("Food Drive", "2026-02-01"),
            event("Gala Dinner", "2026-03-01"),
        ];
        let found: Vec<&str> = filter_events(&events, "gala")
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(found, vec!["Winter Charity Gala", "Gala Dinner"]);
        assert_eq!(filter_events(&events, "  ").len(), 3);
        assert!(filter_events(&events, "marathon").is_empty());
    }

    #[test]
    fn test_form_validation() {
        let mut form = EventForm::from_event(&event("Gala", "2026-01-01"));
        assert_eq!(form.validate(), Ok(()));

        form.location = "   ".to_string();
        assert_eq!(form.validate(), Err(FormError::MissingFields));
    }

    #[test]
    fn test_form_parts_include_image_only_when_set() {
        let mut form = EventForm::from_event(&event("Gala", "2026-01-01"));
        assert_eq!(form.to_parts().len(), 4);

        form.image = Some(ImageUpload {
            file_name: "poster.png".to_string(),
            bytes: vec![1, 2, 3],
            mime: Some("image/png".to_string()),
        });
        let parts = form.to_parts();
        assert_eq!(parts.len(), 5);
        assert!(matches!(parts.last(), Some(FormPart::File { name, .. }) if name == "image"));
    }

    #[test]
    fn test_formatted_date() {
        assert_eq!(event("Gala", "2026-02-06").formatted_date(), "Feb 06, 2026");
        assert_eq!(event("Gala", "").formatted_date(), "TBD");
        assert_eq!(event("Gala", "soon").formatted_date(), "soon");
    }
}
