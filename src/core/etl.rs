use crate::core::Pipeline;
use crate::domain::model::SyncReport;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<SyncReport> {
        tracing::info!("🚀 Starting subscription sync");
        self.monitor.log_stats("Start");

        let orders = self.pipeline.extract().await?;
        let orders_fetched = orders.len();
        self.monitor.log_stats("Extract");

        let transformed = self.pipeline.transform(orders).await?;
        let orders_filtered_out = transformed.filtered_out;
        let skipped = transformed.skipped.clone();
        self.monitor.log_stats("Transform");

        let summary = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(SyncReport {
            orders_fetched,
            orders_filtered_out,
            rows_written: summary.rows_written,
            rows_highlighted: summary.rows_highlighted,
            skipped,
            destination: summary.destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{LoadSummary, Order, OrderStatus, SkippedOrder, TransformResult};
    use crate::utils::error::SyncError;

    struct StubPipeline {
        fail_extract: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<Vec<Order>> {
            if self.fail_extract {
                return Err(SyncError::TransientError {
                    service: "stub".to_string(),
                    message: "HTTP 503".to_string(),
                });
            }
            Ok(vec![Order {
                id: "1".to_string(),
                status: OrderStatus::Active,
                plan_name: String::new(),
                subscriber: None,
                start_date: None,
                end_date: None,
                created_date: None,
                price: None,
            }])
        }

        async fn transform(&self, _orders: Vec<Order>) -> Result<TransformResult> {
            Ok(TransformResult {
                rows: Vec::new(),
                skipped: vec![SkippedOrder {
                    order_id: "1".to_string(),
                    reason: "no contact".to_string(),
                }],
                filtered_out: 0,
            })
        }

        async fn load(&self, _result: TransformResult) -> Result<LoadSummary> {
            Ok(LoadSummary {
                rows_written: 0,
                rows_highlighted: 0,
                destination: "stub".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_report_collects_stage_results() {
        let engine = EtlEngine::new(StubPipeline { fail_extract: false });
        let report = engine.run().await.unwrap();

        assert_eq!(report.orders_fetched, 1);
        assert_eq!(report.rows_written, 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.destination, "stub");
    }

    #[tokio::test]
    async fn test_stage_error_aborts_run() {
        let engine = EtlEngine::new(StubPipeline { fail_extract: true });
        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, SyncError::TransientError { .. }));
    }
}
