//! # Domain Models
//!
//! Query and payload types for the analytics API.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DateRange`] | `startDate`/`endDate` window, rendered as `YYYY-MM-DD` |
//! | [`CategorySales`] | Revenue per category |
//! | [`TopProduct`] | Product ranked by sales or views |
//! | [`DailySales`] | Revenue per day |
//! | [`InventoryItem`] | Stock level with [`StockStatus`] |
//! | [`ActivitySummary`] | Event count per activity type |
//!
//! Payload types mirror the service's JSON field for field; nothing is
//! renamed or recomputed on the client side.

mod date_range;
mod models;

pub use date_range::{format_date, parse_date, DateRange, DEFAULT_WINDOW_DAYS};
pub use models::{
    ActivitySummary, CategorySales, DailySales, InventoryItem, StockStatus, TopProduct,
};
