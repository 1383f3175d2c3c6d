use clap::Parser;
use transcript_etl::utils::error::ErrorSeverity;
use transcript_etl::utils::{logger, validation::Validate};
use transcript_etl::{CliConfig, EtlEngine, LocalStorage, TranscriptPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // Logging
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting transcript-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // Validate before touching any file
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // Storage and pipeline; relative input paths resolve against the working directory
    let storage = LocalStorage::new(".");
    let pipeline = TranscriptPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    // Run the engine
    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Reconciliation completed successfully!");
            println!("✅ Reconciliation completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Reconciliation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // Exit code by severity
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,      // warning, run still succeeded
                ErrorSeverity::Medium => 2,   // unreadable dataset
                ErrorSeverity::High => 1,     // invalid configuration
                ErrorSeverity::Critical => 3, // file system or archive failure
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
