use clap::Parser;
use subsync::domain::ports::SheetSink;
use subsync::utils::{logger, validation::Validate};
use subsync::{
    CliArgs, CsvPreview, EtlEngine, GoogleSheetsClient, ServiceAccountAuth, SubscriptionPipeline,
    SyncConfig, SyncError, SyncReport, WixClient, WixClientConfig,
};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting subscription sheet sync");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let result = if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the sheet will not be modified");
        run(CsvPreview::new(std::io::stdout()), config, monitor_enabled).await
    } else {
        match build_sheets_client(&config) {
            Ok(sheets) => run(sheets, config, monitor_enabled).await,
            Err(e) => Err(e),
        }
    };

    match result {
        Ok(report) => display_report(&report),
        Err(e) => exit_with(&e),
    }

    tracing::info!("Subscription sheet sync completed");
}

fn load_config(path: &str) -> subsync::Result<SyncConfig> {
    let config = SyncConfig::from_file(path)?;
    config.validate()?;
    Ok(config)
}

fn build_sheets_client(
    config: &SyncConfig,
) -> subsync::Result<GoogleSheetsClient<ServiceAccountAuth>> {
    let auth = ServiceAccountAuth::from_file(&config.sheets.credentials_path)?;
    tracing::info!("🔑 Using service account {}", auth.client_email());
    GoogleSheetsClient::new(
        config.sheets_base_url(),
        config.sheets.spreadsheet_id.clone(),
        config.sheets.worksheet_id,
        auth,
        config.sheets_timeout(),
    )
}

async fn run<K: SheetSink>(
    sink: K,
    config: SyncConfig,
    monitor_enabled: bool,
) -> subsync::Result<SyncReport> {
    let source = WixClient::new(WixClientConfig::from(&config))?;
    let pipeline = SubscriptionPipeline::new(source, sink, config);
    EtlEngine::new_with_monitoring(pipeline, monitor_enabled)
        .run()
        .await
}

fn exit_with(e: &SyncError) -> ! {
    tracing::error!(
        "❌ Sync failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}

fn display_config_summary(config: &SyncConfig, args: &CliArgs) {
    use subsync::core::ConfigProvider;

    eprintln!("📋 Configuration Summary:");
    eprintln!("  Commerce API: {}", config.commerce_base_url());
    eprintln!("  Site: {}", config.commerce.site_id);
    eprintln!("  Page size: {}", config.page_size());
    if let Some(filter) = config.plan_name_filter() {
        eprintln!("  Plan filter: contains '{}'", filter);
    }
    if let Some(days) = config.expiring_within_days() {
        eprintln!("  Highlight: end date within {} days", days);
    }
    eprintln!(
        "  Sheet: {} (worksheet {})",
        config.sheets.spreadsheet_id, config.sheets.worksheet_id
    );
    if args.dry_run {
        eprintln!("  🔍 DRY RUN MODE ENABLED");
    }
    eprintln!();
}

// Goes to stderr so a dry run's CSV on stdout stays clean.
fn display_report(report: &SyncReport) {
    eprintln!("✅ Sync completed successfully!");
    eprintln!("  Orders fetched: {}", report.orders_fetched);
    eprintln!("  Orders filtered out: {}", report.orders_filtered_out);
    eprintln!("  Rows written: {}", report.rows_written);
    eprintln!("  Rows highlighted: {}", report.rows_highlighted);
    eprintln!("  Destination: {}", report.destination);

    if !report.skipped.is_empty() {
        eprintln!("⚠️ Skipped {} orders:", report.skipped.len());
        for skipped in &report.skipped {
            eprintln!("  {}: {}", skipped.order_id, skipped.reason);
        }
    }
}
