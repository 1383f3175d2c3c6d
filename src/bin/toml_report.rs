use clap::Parser;
use transcript_etl::core::ConfigProvider;
use transcript_etl::utils::error::ErrorSeverity;
use transcript_etl::utils::{logger, validation::Validate};
use transcript_etl::{EtlEngine, LocalStorage, TomlConfig, TranscriptPipeline};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Transcript reconciliation driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "transcript-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the output directory from config
    #[arg(long)]
    output_path: Option<String>,

    /// Show what would be processed without reading or writing any data
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // Logging follows the [monitoring] table
    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // Command-line overrides win over the file
    if let Some(output_path) = args.output_path.clone() {
        tracing::info!("🔧 Output path overridden to: {}", output_path);
        config.output.path = output_path;
    }

    // Validate before touching any file
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Report: {}", config.report.name);
    if let Some(description) = &config.report.description {
        println!("  Description: {}", description);
    }
    println!("  Enrollment: {}", config.enrollment_path());
    println!(
        "  Required catalog: {}",
        config.required_catalog_path().unwrap_or("(none)")
    );
    println!(
        "  Elective catalog: {}",
        config.elective_catalog_path().unwrap_or("(none)")
    );
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    let policy = config.policy();

    println!("🔍 Dry Run Analysis:");
    println!();

    println!("⚙️ Policy:");
    println!("  Fuzzy match threshold: {}", policy.fuzzy_threshold);
    println!("  Graduation units: {}", policy.graduation_units);
    println!("  Elective target units: {}", policy.elective_target_units);
    println!("  First-term entitlement: {}", policy.entitlement.baseline);
    let mut lower = String::from("0");
    for tier in &policy.entitlement.tiers {
        let bound = if tier.inclusive { "<=" } else { "<" };
        println!(
            "  Average {} .. {} {}: {} credits",
            lower, bound, tier.upper, tier.credits
        );
        lower = tier.upper.to_string();
    }
    println!("  Above {}: {} credits", lower, policy.entitlement.ceiling);

    let overrides = config.grade_overrides();
    if !overrides.is_empty() {
        println!();
        println!("🎯 Grade Simulation:");
        for grade_override in overrides {
            println!("  {} -> {}", grade_override.course_name, grade_override.grade);
        }
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
