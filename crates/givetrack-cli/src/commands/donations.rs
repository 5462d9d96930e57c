use anyhow::{bail, Result};
use chrono::Local;
use rust_decimal::Decimal;
use tracing::warn;

use givetrack_core::models::{parse_amount, DonationQuery};
use givetrack_core::ApiError;
use givetrack_core::utils::{format_amount, format_date, format_optional, truncate_string};

use super::TableQuery;
use crate::app::App;

const NAME_WIDTH: usize = 30;
const EMAIL_WIDTH: usize = 28;

/// Shown when the server rejects a donation without saying why
const DONATION_FAILED: &str = "Donation failed";

fn to_query(query: TableQuery) -> DonationQuery {
    DonationQuery {
        search: query.search,
        page: query.page.max(1),
        page_size: query.page_size,
    }
}

fn page_footer(query: &DonationQuery, total: u64) -> String {
    let pages = query.page_size.total_pages(total).max(1);
    format!("Page {} of {} ({} rows)", query.page, pages, total)
}

pub async fn donate(
    app: &mut App,
    event_id: i64,
    amount: Option<&str>,
    preset: Option<u32>,
) -> Result<()> {
    app.require_user().await?;

    let amount = match (preset, amount) {
        (Some(preset), _) => Decimal::from(preset),
        (None, Some(text)) => parse_amount(text)?,
        (None, None) => bail!("Enter an amount or choose a preset"),
    };

    let event = app.api.get_event(event_id).await?;
    match app.api.donate(&event, amount, Local::now().date_naive()).await {
        Ok(()) => {}
        Err(e @ (ApiError::Validation(_) | ApiError::SessionExpired(_))) => return Err(e.into()),
        Err(e) if e.detail().is_some() => return Err(e.into()),
        Err(e) => {
            warn!(event_id, error = %e, "Donation rejected");
            bail!(DONATION_FAILED);
        }
    }
    println!(
        "Thank you! {} donated to {}.",
        format_amount(amount),
        event.title
    );
    Ok(())
}

pub async fn summary(app: &mut App, query: TableQuery) -> Result<()> {
    let query = to_query(query);
    let page = app.api.donation_summary(&query).await?;

    if page.results.is_empty() {
        println!("No events found.");
        return Ok(());
    }

    println!(
        "{:>4}  {:<name$}  {:<12}  {:>9}  {:>12}  {}",
        "#",
        "Event",
        "Date",
        "Donations",
        "Amount",
        "Status",
        name = NAME_WIDTH
    );
    for (i, row) in page.results.iter().enumerate() {
        let date = row.date.as_deref().map(format_date).unwrap_or_default();
        println!(
            "{:>4}  {:<name$}  {:<12}  {:>9}  {:>12}  {}",
            query.page_size.row_number(query.page, i, page.total),
            truncate_string(&row.name, NAME_WIDTH),
            date,
            row.count,
            format_amount(row.amount),
            row.status_label(),
            name = NAME_WIDTH
        );
    }
    println!("\n{}", page_footer(&query, page.total));
    Ok(())
}

pub async fn list(app: &mut App, event_id: i64, query: TableQuery) -> Result<()> {
    let query = to_query(query);
    let report = app.api.donation_report(event_id, &query).await?;

    println!("Donations for {}\n", report.event_title);
    if report.donations.is_empty() {
        println!("No donations found.");
        return Ok(());
    }

    println!(
        "{:>4}  {:<name$}  {:<email$}  {:>12}  {}",
        "#",
        "Donor",
        "Email",
        "Amount",
        "Date",
        name = NAME_WIDTH,
        email = EMAIL_WIDTH
    );
    for (i, donation) in report.donations.iter().enumerate() {
        let date = donation.date.as_deref().map(format_date).unwrap_or_default();
        println!(
            "{:>4}  {:<name$}  {:<email$}  {:>12}  {}",
            query.page_size.row_number(query.page, i, report.total),
            truncate_string(&format_optional(&donation.donor, "Anonymous"), NAME_WIDTH),
            truncate_string(&format_optional(&donation.donor_email, "-"), EMAIL_WIDTH),
            format_amount(donation.amount),
            date,
            name = NAME_WIDTH,
            email = EMAIL_WIDTH
        );
    }
    println!("\n{}", page_footer(&query, report.total));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use givetrack_core::models::PageSize;

    #[test]
    fn test_page_footer() {
        let query = DonationQuery {
            search: String::new(),
            page: 2,
            page_size: PageSize::Count(10),
        };
        assert_eq!(page_footer(&query, 25), "Page 2 of 3 (25 rows)");

        let everything = DonationQuery {
            page: 1,
            page_size: PageSize::All,
            ..query
        };
        assert_eq!(page_footer(&everything, 0), "Page 1 of 1 (0 rows)");
    }

    #[test]
    fn test_to_query_clamps_page() {
        let query = to_query(TableQuery {
            search: "gala".to_string(),
            page: 0,
            page_size: PageSize::Count(5),
        });
        assert_eq!(query.page, 1);
        assert_eq!(query.search, "gala");
    }
}
