use anyhow::Context;
use clap::Parser;
use composition_proxy::utils::error::{ErrorSeverity, ProxyError};
use composition_proxy::utils::{logger, validation::Validate};
use composition_proxy::{BuilderConfig, CompositionProxyTypeBuilder, ProxyTypeBuilder, RegistryManifest};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "proxy-plan")]
#[command(about = "Plan a composition proxy type from a TOML type manifest")]
struct Args {
    /// Path to the TOML type manifest
    #[arg(short, long)]
    registry: String,

    /// Path to the TOML builder configuration
    #[arg(short, long)]
    config: Option<String>,

    /// Override the target type from config
    #[arg(long)]
    target: Option<String>,

    /// Override the explicit interface list from config
    #[arg(long, value_delimiter = ',')]
    interfaces: Vec<String>,

    /// Override the base type from config
    #[arg(long)]
    base_type: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Loading type manifest from: {}", args.registry);
    let registry = RegistryManifest::from_file(&args.registry)
        .and_then(RegistryManifest::into_registry)
        .with_context(|| format!("failed to load type manifest '{}'", args.registry))?;

    let mut config = match &args.config {
        Some(path) => BuilderConfig::from_file(path)
            .with_context(|| format!("failed to load builder config '{}'", path))?,
        None => BuilderConfig::default(),
    };

    // 套用命令列覆蓋設定
    if let Some(target) = &args.target {
        config.proxy.target_type = Some(target.clone());
    }
    if !args.interfaces.is_empty() {
        config.proxy.interfaces = args.interfaces.clone();
    }
    if let Some(base) = &args.base_type {
        config.proxy.base_type = Some(base.clone());
    }

    if let Err(e) = config.validate() {
        report(&e);
        std::process::exit(exit_code(&e));
    }

    let mut builder =
        CompositionProxyTypeBuilder::new(Arc::new(registry)).with_classifier(config.classifier());
    config.apply_to(&mut builder);

    match builder.plan() {
        Ok(plan) => {
            tracing::info!(
                "✅ Planned {} with {} member(s)",
                plan.name,
                plan.members.len()
            );
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }
        Err(e) => {
            report(&e);
            std::process::exit(exit_code(&e));
        }
    }
}

fn report(e: &ProxyError) {
    tracing::error!(
        "❌ Proxy planning failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
}

fn exit_code(e: &ProxyError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
