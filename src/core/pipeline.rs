use crate::core::transform::{build_sheet_plan, is_selected, project_row, should_highlight};
use crate::core::{ConfigProvider, OrderSource, Pipeline, SheetSink};
use crate::domain::model::{LoadSummary, Order, SkippedOrder, TransformResult};
use crate::utils::error::{Result, SyncError};
use chrono::NaiveDate;

/// Orders -> active subscriptions with contacts -> worksheet.
pub struct SubscriptionPipeline<S: OrderSource, K: SheetSink, C: ConfigProvider> {
    source: S,
    sink: K,
    config: C,
    today: NaiveDate,
}

impl<S: OrderSource, K: SheetSink, C: ConfigProvider> SubscriptionPipeline<S, K, C> {
    pub fn new(source: S, sink: K, config: C) -> Self {
        Self {
            source,
            sink,
            config,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Pins the date the highlight threshold is measured from.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    fn skip(skipped: &mut Vec<SkippedOrder>, err: SyncError) {
        tracing::warn!("⚠️ {}", err);
        if let SyncError::ContactLookupError { order_id, message } = err {
            skipped.push(SkippedOrder {
                order_id,
                reason: message,
            });
        }
    }
}

#[async_trait::async_trait]
impl<S: OrderSource, K: SheetSink, C: ConfigProvider> Pipeline for SubscriptionPipeline<S, K, C> {
    async fn extract(&self) -> Result<Vec<Order>> {
        tracing::info!("📥 Fetching orders from the commerce API");
        let orders = self.source.list_orders().await?;
        tracing::info!("Retrieved {} total orders", orders.len());
        Ok(orders)
    }

    async fn transform(&self, orders: Vec<Order>) -> Result<TransformResult> {
        let total = orders.len();
        let plan_filter = self.config.plan_name_filter();
        let selected: Vec<Order> = orders
            .into_iter()
            .filter(|order| is_selected(order, plan_filter))
            .collect();
        let filtered_out = total - selected.len();

        match plan_filter {
            Some(filter) => tracing::info!(
                "Filtered to {} active orders with '{}' in the plan name ({} discarded)",
                selected.len(),
                filter,
                filtered_out
            ),
            None => tracing::info!(
                "Filtered to {} active orders ({} discarded)",
                selected.len(),
                filtered_out
            ),
        }

        let within_days = self.config.expiring_within_days();
        let mut rows = Vec::with_capacity(selected.len());
        let mut skipped = Vec::new();

        for order in &selected {
            let Some(contact_id) = order.subscriber.as_deref() else {
                Self::skip(
                    &mut skipped,
                    SyncError::ContactLookupError {
                        order_id: order.id.clone(),
                        message: "order has no subscriber reference".to_string(),
                    },
                );
                continue;
            };

            match self.source.get_contact(contact_id).await {
                Ok(contact) => {
                    let highlighted = should_highlight(order, self.today, within_days);
                    rows.push(project_row(order, &contact, highlighted));
                }
                Err(err) if err.is_record_level() => Self::skip(
                    &mut skipped,
                    SyncError::ContactLookupError {
                        order_id: order.id.clone(),
                        message: format!("contact {}: {}", contact_id, err),
                    },
                ),
                // Would fail the same way for every remaining order.
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            "✅ Enriched {} orders, skipped {}",
            rows.len(),
            skipped.len()
        );
        Ok(TransformResult {
            rows,
            skipped,
            filtered_out,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<LoadSummary> {
        let plan = build_sheet_plan(&result.rows);
        let destination = self.sink.describe();

        if plan.data_rows() == 0 {
            tracing::warn!("No active subscriptions found; {} will only hold the header", destination);
        }

        tracing::debug!("Clearing {}", destination);
        self.sink.clear().await?;
        tracing::debug!("Writing {} rows", plan.values.len());
        self.sink.write_values(&plan.values).await?;
        self.sink.apply_formats(&plan.formats).await?;

        let summary = LoadSummary {
            rows_written: plan.data_rows(),
            rows_highlighted: plan.highlighted_rows(),
            destination,
        };
        tracing::info!(
            "📄 Updated sheet with {} orders, highlighted {} rows",
            summary.rows_written,
            summary.rows_highlighted
        );
        Ok(summary)
    }
}
