pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::SyncConfig;

pub use adapters::{CsvPreview, GoogleSheetsClient, ServiceAccountAuth, WixClient, WixClientConfig};
pub use core::{etl::EtlEngine, pipeline::SubscriptionPipeline};
pub use domain::model::SyncReport;
pub use utils::error::{Result, SyncError};
