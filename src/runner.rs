use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;

use crate::birthday::fetch_birthdays;
use crate::calendar::EventSource;
use crate::config::AppConfig;
use crate::render::{render_page, write_page};

/// Fetch, render and write the page once.
///
/// The output file is only touched after every earlier step succeeded.
/// Returns the number of birthdays written.
pub async fn run_once<S>(source: &S, config: &AppConfig, now: DateTime<Utc>) -> Result<usize>
where
    S: EventSource + ?Sized,
{
    let birthdays = fetch_birthdays(source, &config.calendar, now).await?;
    println!("Found {} upcoming birthdays", birthdays.len());

    for b in &birthdays {
        info!("{}: {}", b.date, b.name);
    }

    let html = render_page(&birthdays, &config.output.title);
    write_page(&html, &config.output.path)?;

    Ok(birthdays.len())
}
