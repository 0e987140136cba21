//! Menus, one module per area. Each adds methods to [`App`](crate::app::App).

mod products;
mod reports;
mod sale;
mod users;
mod warehouses;

use chrono::{DateTime, FixedOffset, Utc};

/// `17-08-2025 10:15` in the business time zone.
pub(crate) fn local_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%d-%m-%Y %H:%M").to_string()
}
