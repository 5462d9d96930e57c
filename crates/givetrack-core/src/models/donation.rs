use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::event::{Event, FormError};
use super::page::PageSize;

/// Quick-pick donation amounts
pub const PRESET_AMOUNTS: [u32; 3] = [500, 1000, 1500];

/// Donations loaded alongside an event's detail view
pub const EVENT_DETAIL_DONATION_LIMIT: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    #[serde(default)]
    pub donor: Option<String>,
    #[serde(default)]
    pub donor_email: Option<String>,
    pub amount: Decimal,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub event_title: Option<String>,
}

/// Body of `POST events/{id}/donations/`
#[derive(Debug, Clone, Serialize)]
pub struct NewDonation {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Parse a user-entered amount; it must be a positive number
pub fn parse_amount(input: &str) -> Result<Decimal, FormError> {
    let amount = Decimal::from_str(input.trim()).map_err(|_| FormError::InvalidAmount)?;
    if amount <= Decimal::ZERO {
        return Err(FormError::InvalidAmount);
    }
    Ok(amount)
}

pub fn total_amount(donations: &[Donation]) -> Decimal {
    donations.iter().map(|d| d.amount).sum()
}

/// Search and pagination parameters for donation listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationQuery {
    pub search: String,
    pub page: u32,
    pub page_size: PageSize,
}

impl Default for DonationQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl DonationQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("search".to_string(), self.search.clone()),
            ("page".to_string(), self.page.max(1).to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ]
    }
}

/// One row of `GET donations/summary/`: an event with its donation totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationSummaryRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub status: Option<String>,
}

impl DonationSummaryRow {
    pub fn has_donations(&self) -> bool {
        self.count > 0
    }

    pub fn status_label(&self) -> &str {
        if !self.has_donations() {
            return "No Donations";
        }
        self.status.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonationSummaryPage {
    #[serde(default)]
    pub results: Vec<DonationSummaryRow>,
    #[serde(default)]
    pub total: u64,
}

/// Donations for one event, as shown in the per-event report
#[derive(Debug, Clone)]
pub struct DonationReport {
    pub event_title: String,
    pub donations: Vec<Donation>,
    pub total: u64,
}

/// An event with the donations shown on its detail view
#[derive(Debug, Clone)]
pub struct EventOverview {
    pub event: Event,
    pub donations: Vec<Donation>,
}

impl EventOverview {
    /// Sum of the listed donations, which may differ from the server's
    /// `total_donations` when more than one page exists
    pub fn listed_total(&self) -> Decimal {
        total_amount(&self.donations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation(amount: &str) -> Donation {
        Donation {
            id: 1,
            donor: Some("Kiran".to_string()),
            donor_email: None,
            amount: Decimal::from_str(amount).expect("decimal"),
            date: None,
            event_title: None,
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("500"), Ok(Decimal::from(500)));
        assert_eq!(parse_amount(" 250.75 "), Ok(Decimal::from_str("250.75").expect("decimal")));
        assert_eq!(parse_amount(""), Err(FormError::InvalidAmount));
        assert_eq!(parse_amount("0"), Err(FormError::InvalidAmount));
        assert_eq!(parse_amount("-10"), Err(FormError::InvalidAmount));
        assert_eq!(parse_amount("ten"), Err(FormError::InvalidAmount));
    }

    #[test]
    fn test_total_amount() {
        let donations = vec![donation("500"), donation("1000.50"), donation("0.50")];
        assert_eq!(total_amount(&donations), Decimal::from(1501));
        assert_eq!(total_amount(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_new_donation_serializes_as_number() {
        let body = serde_json::to_value(NewDonation {
            amount: Decimal::from(1000),
        })
        .expect("serialize");
        assert_eq!(body, serde_json::json!({"amount": 1000.0}));
    }

    #[test]
    fn test_query_pairs() {
        let query = DonationQuery {
            search: "gala".to_string(),
            page: 0,
            page_size: PageSize::All,
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("search".to_string(), "gala".to_string()),
                ("page".to_string(), "1".to_string()),
                ("page_size".to_string(), "all".to_string()),
            ]
        );
    }

    #[test]
    fn test_summary_status_label() {
        let json = r#"{"results": [
            {"id": 1, "name": "Gala", "date": "2026-01-01", "count": 0, "amount": "0", "status": "Completed"},
            {"id": 2, "name": "Run", "date": "2026-09-01", "count": 4, "amount": 2500, "status": "Upcoming"}
        ], "total": 2}"#;
        let page: DonationSummaryPage = serde_json::from_str(json).expect("parse summary");
        assert_eq!(page.total, 2);
        assert_eq!(page.results[0].status_label(), "No Donations");
        assert!(!page.results[0].has_donations());
        assert_eq!(page.results[1].status_label(), "Upcoming");
        assert_eq!(page.results[1].amount, Decimal::from(2500));
    }
}
