//! Typed calls for the event and donation endpoints.
//!
//! Payloads are decoded into the models but otherwise passed through as
//! the server sends them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::{
    Donation, DonationQuery, DonationReport, DonationSummaryPage, Event, EventForm, EventOverview,
    FormError, Listing, NewDonation, PageSize, EVENT_DETAIL_DONATION_LIMIT,
};

use super::{ApiClient, ApiRequest, ApiResult};

fn event_path(event_id: i64) -> String {
    format!("events/{}/", event_id)
}

fn event_donations_path(event_id: i64) -> String {
    format!("events/{}/donations/", event_id)
}

impl ApiClient {
    // ===== Events =====

    /// Fetch all events visible to the current user
    pub async fn list_events(&self) -> ApiResult<Vec<Event>> {
        let listing: Listing<Event> = self.send(&ApiRequest::get("events/")).await?.json()?;
        let events = listing.into_items();
        debug!(count = events.len(), "Fetched events");
        Ok(events)
    }

    pub async fn get_event(&self, event_id: i64) -> ApiResult<Event> {
        self.send(&ApiRequest::get(event_path(event_id))).await?.json()
    }

    pub async fn create_event(&self, form: &EventForm) -> ApiResult<Event> {
        form.validate()?;
        let request = ApiRequest::post_form("events/", form.to_parts());
        self.send(&request).await?.json()
    }

    pub async fn update_event(&self, event_id: i64, form: &EventForm) -> ApiResult<Event> {
        form.validate()?;
        let request = ApiRequest::put_form(event_path(event_id), form.to_parts());
        self.send(&request).await?.json()
    }

    pub async fn delete_event(&self, event_id: i64) -> ApiResult<()> {
        self.send(&ApiRequest::delete(event_path(event_id))).await?;
        Ok(())
    }

    /// Load an event together with its most recent donations.
    ///
    /// Both requests run concurrently. A failed donation listing leaves the
    /// overview with no donations rather than failing it.
    pub async fn event_overview(&self, event_id: i64) -> ApiResult<EventOverview> {
        let query = DonationQuery {
            search: String::new(),
            page: 1,
            page_size: PageSize::Count(EVENT_DETAIL_DONATION_LIMIT),
        };
        let (event, donations) = futures::join!(
            self.get_event(event_id),
            self.event_donations(event_id, &query)
        );

        let donations = match donations {
            Ok(listing) => listing.into_items(),
            Err(e) => {
                warn!(event_id, error = %e, "Failed to load donations for event");
                Vec::new()
            }
        };

        Ok(EventOverview {
            event: event?,
            donations,
        })
    }

    // ===== Donations =====

    /// Donate to an event. Past events and non-positive amounts are
    /// rejected locally without contacting the server.
    pub async fn donate(&self, event: &Event, amount: Decimal, today: NaiveDate) -> ApiResult<()> {
        if !event.accepts_donations(today) {
            return Err(FormError::EventEnded.into());
        }
        if amount <= Decimal::ZERO {
            return Err(FormError::InvalidAmount.into());
        }

        let request = ApiRequest::post_json(event_donations_path(event.id), &NewDonation { amount })?;
        self.send(&request).await?;
        debug!(event_id = event.id, "Donation recorded");
        Ok(())
    }

    pub async fn event_donations(
        &self,
        event_id: i64,
        query: &DonationQuery,
    ) -> ApiResult<Listing<Donation>> {
        let request = ApiRequest::get(event_donations_path(event_id)).with_query(query.to_pairs());
        self.send(&request).await?.json()
    }

    /// Donations for one event, titled after the event. The title comes
    /// from the first donation row; an empty page falls back to fetching
    /// the event itself.
    pub async fn donation_report(
        &self,
        event_id: i64,
        query: &DonationQuery,
    ) -> ApiResult<DonationReport> {
        let listing = self.event_donations(event_id, query).await?;
        let total = listing.total();
        let donations = listing.into_items();

        let event_title = match donations.first().and_then(|d| d.event_title.clone()) {
            Some(title) => title,
            None => self.get_event(event_id).await?.title,
        };

        Ok(DonationReport {
            event_title,
            donations,
            total,
        })
    }

    /// Per-event donation totals
    pub async fn donation_summary(&self, query: &DonationQuery) -> ApiResult<DonationSummaryPage> {
        let request = ApiRequest::get("donations/summary/").with_query(query.to_pairs());
        self.send(&request).await?.json()
    }
}
