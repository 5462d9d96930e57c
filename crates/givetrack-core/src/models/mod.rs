//! Data models for fundraising events and donations.
//!
//! - `Event`, `EventForm`: events and their create/edit payload
//! - `Donation`, `DonationSummaryRow`: individual gifts and per-event totals
//! - `Listing`, `PageSize`, `Paginator`: list shapes and pagination
//! - `UserProfile`, `Role`: the signed-in user and what they may do

pub mod donation;
pub mod event;
pub mod page;
pub mod user;

pub use donation::{
    parse_amount, total_amount, Donation, DonationQuery, DonationReport, DonationSummaryPage,
    DonationSummaryRow, EventOverview, NewDonation, EVENT_DETAIL_DONATION_LIMIT, PRESET_AMOUNTS,
};
pub use event::{filter_events, Event, EventForm, FormError, ImageUpload};
pub use page::{Listing, PageSize, Paginator, EVENTS_PER_PAGE, PAGE_SIZE_CHOICES};
pub use user::{Role, UserProfile};
