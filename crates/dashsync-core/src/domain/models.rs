use serde::{Deserialize, Serialize};

/// Revenue for one product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category: String,
    pub total_sales: f64,
    pub product_count: u64,
}

/// A product ranked by units sold or by views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_name: String,
    pub quantity_sold: u64,
    pub percentage_of_total: f64,
}

/// Aggregated sales for one calendar day.
///
/// `date` is kept exactly as the server rendered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: String,
    pub total_sales: f64,
    pub transaction_count: u64,
}

/// Stock classification assigned by the analytics service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Low,
    Medium,
    Adequate,
}

/// Current stock level for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub product_id: i64,
    pub product_name: String,
    pub category: String,
    pub stock_quantity: i64,
    pub status: StockStatus,
}

/// Event count for one user activity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub activity_type: String,
    pub count: u64,
    pub percentage: f64,
}
