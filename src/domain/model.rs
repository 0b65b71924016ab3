use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle state of a pricing-plan order as reported by the commerce API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    Active,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => OrderStatus::Active,
            "canceled" | "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Active => "ACTIVE",
            OrderStatus::Cancelled => "CANCELED",
            OrderStatus::Other(raw) => raw,
        }
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(OrderStatus::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub total: String,
    pub currency: String,
}

impl Price {
    pub fn display(&self) -> String {
        if self.total.is_empty() {
            return String::new();
        }
        format!("{} {}", self.total, self.currency).trim_end().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub plan_name: String,
    /// Contact id of the buyer.
    pub subscriber: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_date: Option<String>,
    pub price: Option<Price>,
}

impl Order {
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// End date, treating blank strings as absent.
    pub fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref().filter(|d| !d.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// One spreadsheet line: an order flattened together with its contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub order_id: String,
    pub status: String,
    pub plan_name: String,
    pub customer_name: String,
    pub email: String,
    pub start_date: String,
    pub end_date: String,
    pub price: String,
    pub highlighted: bool,
}

impl Row {
    pub const HEADERS: [&'static str; 8] = [
        "Order ID",
        "Status",
        "Plan Name",
        "Customer Name",
        "Email",
        "Start Date",
        "End Date",
        "Price",
    ];

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.order_id.clone(),
            self.status.clone(),
            self.plan_name.clone(),
            self.customer_name.clone(),
            self.email.clone(),
            self.start_date.clone(),
            self.end_date.clone(),
            self.price.clone(),
        ]
    }
}

/// An order dropped during enrichment, kept for the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedOrder {
    pub order_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub rows: Vec<Row>,
    pub skipped: Vec<SkippedOrder>,
    /// Orders discarded by the status / plan filter.
    pub filtered_out: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    /// Clears background colour and text format.
    Plain,
    Header,
    Highlight,
}

/// A style applied to a band of rows across all columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRule {
    /// Zero-based, end-exclusive. `None` covers the whole worksheet.
    pub rows: Option<(usize, usize)>,
    pub style: RowStyle,
}

/// Everything the sheet writer sends, derived only from the rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPlan {
    pub values: Vec<Vec<String>>,
    pub formats: Vec<FormatRule>,
}

impl SheetPlan {
    pub fn data_rows(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    pub fn highlighted_rows(&self) -> usize {
        self.formats
            .iter()
            .filter(|f| f.style == RowStyle::Highlight)
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows_written: usize,
    pub rows_highlighted: usize,
    pub destination: String,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub orders_fetched: usize,
    pub orders_filtered_out: usize,
    pub rows_written: usize,
    pub rows_highlighted: usize,
    pub skipped: Vec<SkippedOrder>,
    pub destination: String,
}
