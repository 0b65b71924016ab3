use crate::domain::model::{Contact, FormatRule, LoadSummary, Order, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read side: the commerce platform.
pub trait OrderSource: Send + Sync {
    fn list_orders(&self) -> impl std::future::Future<Output = Result<Vec<Order>>> + Send;
    fn get_contact(
        &self,
        contact_id: &str,
    ) -> impl std::future::Future<Output = Result<Contact>> + Send;
}

/// Write side: a single worksheet.
pub trait SheetSink: Send + Sync {
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;
    fn write_values(
        &self,
        values: &[Vec<String>],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn apply_formats(
        &self,
        formats: &[FormatRule],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn describe(&self) -> String;
}

pub trait ConfigProvider: Send + Sync {
    /// Case-insensitive substring a plan name must contain, if any.
    fn plan_name_filter(&self) -> Option<&str>;
    fn expiring_within_days(&self) -> Option<i64>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Order>>;
    async fn transform(&self, orders: Vec<Order>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<LoadSummary>;
}
