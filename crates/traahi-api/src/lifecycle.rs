use chrono::{Local, NaiveDate};

use traahi_types::models::{Campaign, Partition};

/// Today's date on the server's local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Split campaigns into upcoming (event on or after `today`) and conducted
/// (event before `today`). Both halves come back sorted by event date.
pub fn partition<I>(campaigns: I, today: NaiveDate) -> Partition
where
    I: IntoIterator<Item = Campaign>,
{
    let (mut upcoming, mut conducted): (Vec<_>, Vec<_>) = campaigns
        .into_iter()
        .partition(|c| c.event_date >= today);

    upcoming.sort_by_key(|c| (c.event_date, c.id));
    conducted.sort_by_key(|c| (c.event_date, c.id));

    Partition {
        upcoming,
        conducted,
    }
}
