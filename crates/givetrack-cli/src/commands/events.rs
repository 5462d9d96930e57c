use anyhow::Result;
use chrono::Local;

use givetrack_core::models::{filter_events, Event, EventForm, ImageUpload, Paginator};
use givetrack_core::utils::{format_amount, format_date, format_optional, truncate_string};

use super::EventFields;
use crate::app::{confirm, App};

const TITLE_WIDTH: usize = 30;
const LOCATION_WIDTH: usize = 20;
const DONOR_WIDTH: usize = 24;

fn status(event: &Event) -> &'static str {
    if event.is_past(Local::now().date_naive()) {
        "Ended"
    } else {
        "Open"
    }
}

pub async fn list(app: &mut App, search: &str, page: usize) -> Result<()> {
    let events = app.api.list_events().await?;
    let matching = filter_events(&events, search);

    if matching.is_empty() {
        println!("No events found.");
        return Ok(());
    }

    let paginator = Paginator::default();
    let pages = paginator.total_pages(matching.len());
    let page = page.clamp(1, pages);

    println!(
        "{:>5}  {:<12}  {:<title$}  {:<location$}  {:>12}  {}",
        "ID",
        "Date",
        "Title",
        "Location",
        "Raised",
        "Status",
        title = TITLE_WIDTH,
        location = LOCATION_WIDTH
    );
    for event in paginator.page(&matching, page) {
        println!(
            "{:>5}  {:<12}  {:<title$}  {:<location$}  {:>12}  {}",
            event.id,
            event.formatted_date(),
            truncate_string(&event.title, TITLE_WIDTH),
            truncate_string(&event.location, LOCATION_WIDTH),
            format_amount(event.total_donations()),
            status(event),
            title = TITLE_WIDTH,
            location = LOCATION_WIDTH
        );
    }
    println!("\nPage {} of {} ({} events)", page, pages, matching.len());
    Ok(())
}

pub async fn show(app: &mut App, id: i64) -> Result<()> {
    let overview = app.api.event_overview(id).await?;
    let event = &overview.event;

    println!("{}", event.title);
    println!("Date:     {} ({})", event.formatted_date(), status(event));
    println!("Location: {}", event.location);
    println!("Image:    {}", format_optional(&event.image, "none"));
    println!("Raised:   {}", format_amount(event.total_donations()));
    if !event.description.is_empty() {
        println!("\n{}", event.description);
    }

    println!();
    if overview.donations.is_empty() {
        println!("No donations yet.");
        return Ok(());
    }

    println!("{:<donor$}  {:>12}  {}", "Donor", "Amount", "Date", donor = DONOR_WIDTH);
    for donation in &overview.donations {
        let donor = format_optional(&donation.donor, "Anonymous");
        let date = donation.date.as_deref().map(format_date).unwrap_or_default();
        println!(
            "{:<donor$}  {:>12}  {}",
            truncate_string(&donor, DONOR_WIDTH),
            format_amount(donation.amount),
            date,
            donor = DONOR_WIDTH
        );
    }
    println!(
        "\n{} donations listed, {} in total",
        overview.donations.len(),
        format_amount(overview.listed_total())
    );
    Ok(())
}

/// Overlay the given fields on `form`
fn apply_fields(form: &mut EventForm, fields: EventFields) -> Result<()> {
    if let Some(title) = fields.title {
        form.title = title;
    }
    if let Some(description) = fields.description {
        form.description = description;
    }
    if let Some(date) = fields.date {
        form.date = date;
    }
    if let Some(location) = fields.location {
        form.location = location;
    }
    if let Some(path) = fields.image {
        form.image = Some(ImageUpload::from_path(&path)?);
    }
    Ok(())
}

pub async fn create(app: &mut App, fields: EventFields) -> Result<()> {
    app.require_event_manager().await?;

    let mut form = EventForm::default();
    apply_fields(&mut form, fields)?;
    let event = app.api.create_event(&form).await?;
    println!("Created event #{}: {}", event.id, event.title);
    Ok(())
}

pub async fn update(app: &mut App, id: i64, fields: EventFields) -> Result<()> {
    app.require_event_manager().await?;

    let current = app.api.get_event(id).await?;
    let mut form = EventForm::from_event(&current);
    apply_fields(&mut form, fields)?;
    let event = app.api.update_event(id, &form).await?;
    println!("Updated event #{}: {}", event.id, event.title);
    Ok(())
}

pub async fn delete(app: &mut App, id: i64, yes: bool) -> Result<()> {
    app.require_event_manager().await?;

    if !yes && !confirm(&format!("Delete event #{}?", id))? {
        println!("Cancelled.");
        return Ok(());
    }
    app.api.delete_event(id).await?;
    println!("Deleted event #{}.", id);
    Ok(())
}
