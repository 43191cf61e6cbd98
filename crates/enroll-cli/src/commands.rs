use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::{json, Value};

use enroll_chain::{Block, HashChain};
use enroll_core::{EnrollmentCoordinator, Outcome, OutcomeKind};
use enroll_ledger::{ContractClient, Credentials, InMemoryContract, LedgerConfig};
use enroll_server::{AppState, EnrollServer, ServiceConfig};

use crate::cli::*;

/// Courses registered by `demo` and `serve --seed`.
const SAMPLE_COURSES: &[(&str, u32, &[&str])] = &[
    ("CS101", 30, &[]),
    ("CS201", 30, &["CS101"]),
    ("CS301", 1, &["CS201"]),
];

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args).await,
        Command::Demo(args) => cmd_demo(&config, args, &cli.format).await,
        Command::VerifyChain(args) => cmd_verify_chain(args, &cli.format),
        Command::InitConfig(args) => cmd_init_config(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServiceConfig> {
    match path {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(ServiceConfig::default()),
    }
}

/// Coordinator over a fresh devnet contract owned by the configured admin.
fn build_coordinator(
    config: &ServiceConfig,
    ledger: LedgerConfig,
) -> anyhow::Result<Arc<EnrollmentCoordinator>> {
    let admin = config.admin.credentials().context("parsing admin key")?;
    let contract = InMemoryContract::new(admin.address());
    let client = Arc::new(ContractClient::new(contract, ledger));
    Ok(Arc::new(EnrollmentCoordinator::new(
        client,
        admin,
        config.coordinator.clone(),
    )))
}

async fn seed_courses(coordinator: &EnrollmentCoordinator) -> Vec<(String, Outcome)> {
    let mut steps = Vec::new();
    for (name, seats, prerequisites) in SAMPLE_COURSES {
        let prerequisites = prerequisites.iter().map(|p| p.to_string()).collect();
        let outcome = coordinator.add_course(name, *seats, prerequisites).await;
        steps.push((format!("add course {name}"), outcome));
    }
    steps
}

async fn cmd_serve(mut config: ServiceConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind}"))?;
    }

    let coordinator = build_coordinator(&config, config.ledger.clone())?;
    if args.seed {
        for (step, outcome) in seed_courses(&coordinator).await {
            print_step(&step, &outcome);
        }
    }

    println!(
        "Enrollment server on {} (admin {})",
        config.server.bind_addr.to_string().bold(),
        coordinator.admin_address().to_hex().cyan()
    );
    let server = EnrollServer::new(config.server.clone(), AppState::new(coordinator));
    server
        .serve_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    println!("{} Server stopped.", "✓".green());
    Ok(())
}

/// Steps and final chain of one demo run.
pub struct DemoReport {
    pub steps: Vec<(String, Outcome)>,
    pub blocks: Vec<Block>,
    pub valid: bool,
}

pub async fn run_demo(config: &ServiceConfig) -> anyhow::Result<DemoReport> {
    // The devnet confirms instantly; polling at the configured interval would
    // only slow the run down.
    let ledger = LedgerConfig {
        poll_interval_ms: 1,
        ..config.ledger.clone()
    };
    let coordinator = build_coordinator(config, ledger)?;
    let mut steps = seed_courses(&coordinator).await;

    let alice = Credentials::generate();
    let bob = Credentials::generate();
    coordinator.register_student("S1", Some(alice.address())).await;
    coordinator.register_student("S2", None).await;

    let enroll = |id: &'static str, code: &'static str, who: &Credentials| {
        let coordinator = coordinator.clone();
        let (address, key) = (who.address(), who.secret_hex());
        async move {
            let outcome = coordinator.enroll(id, code, address, &key).await;
            (format!("{id} enrolls in {code}"), outcome)
        }
    };

    steps.push(enroll("S1", "CS201", &alice).await);
    steps.push(enroll("S1", "CS101", &alice).await);
    coordinator.complete_course("S1", "CS101").await;
    steps.push(enroll("S1", "CS201", &alice).await);
    coordinator.complete_course("S1", "CS201").await;
    coordinator.complete_course("S2", "CS101").await;
    coordinator.complete_course("S2", "CS201").await;
    steps.push(enroll("S1", "CS301", &alice).await);
    steps.push(enroll("S2", "CS301", &bob).await);

    Ok(DemoReport {
        steps,
        blocks: coordinator.chain_blocks().await,
        valid: coordinator.verify_chain().await.is_ok(),
    })
}

async fn cmd_demo(
    config: &ServiceConfig,
    args: DemoArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let report = run_demo(config).await?;

    if let Some(path) = &args.export {
        let exported = json!({ "length": report.blocks.len(), "blocks": report.blocks });
        std::fs::write(path, serde_json::to_string_pretty(&exported)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    match format {
        OutputFormat::Json => {
            let steps: Vec<Value> = report
                .steps
                .iter()
                .map(|(step, outcome)| {
                    json!({
                        "step": step,
                        "outcome": outcome.name(),
                        "kind": outcome.kind(),
                        "message": outcome.message(),
                    })
                })
                .collect();
            let out = json!({ "steps": steps, "blocks": report.blocks, "valid": report.valid });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            for (step, outcome) in &report.steps {
                print_step(step, outcome);
            }
            println!("\nAudit chain ({} blocks):", report.blocks.len().to_string().bold());
            for block in &report.blocks {
                print_block(block);
            }
            let integrity = if report.valid { "valid".green() } else { "BROKEN".red() };
            println!("Integrity: {integrity}");
            if let Some(path) = &args.export {
                println!("Exported to {}", path.display().to_string().blue());
            }
        }
    }
    Ok(())
}

fn cmd_verify_chain(args: VerifyChainArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let chain = parse_exported_chain(&raw)?;
    let result = chain.verify_detailed();

    match format {
        OutputFormat::Json => {
            let out = json!({
                "valid": result.is_ok(),
                "length": chain.len(),
                "error": result.as_ref().err().map(|e| e.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => match &result {
            Ok(()) => {
                println!("{} Audit chain integrity verified", "✓".green().bold());
                println!("  Blocks: {}", chain.len().to_string().bold());
                println!("  Tail: {}", chain.tail().hash().yellow());
            }
            Err(e) => println!("{} {}", "✗".red().bold(), e),
        },
    }

    result.with_context(|| format!("{} failed verification", args.file.display()))
}

fn cmd_init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    if args.path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", args.path.display());
    }
    let text = ServiceConfig::default().to_toml_string()?;
    std::fs::write(&args.path, text).with_context(|| format!("writing {}", args.path.display()))?;
    println!(
        "{} Wrote default configuration to {}",
        "✓".green().bold(),
        args.path.display().to_string().bold()
    );
    println!("  Set {} to keep a stable admin account.", "admin.private_key".cyan());
    Ok(())
}

/// Accepts a bare block array or an object carrying a `blocks` array, such as
/// the `/api/chain` response or a `demo --export` file.
pub fn parse_exported_chain(raw: &str) -> anyhow::Result<HashChain> {
    let value: Value = serde_json::from_str(raw).context("chain file is not JSON")?;
    let blocks = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove("blocks") {
            Some(blocks) => blocks,
            None => bail!("chain file has no `blocks` field"),
        },
        _ => bail!("chain file must be a block array or an object with `blocks`"),
    };
    let blocks: Vec<Block> = serde_json::from_value(blocks).context("malformed block")?;
    Ok(HashChain::from_blocks(blocks)?)
}

fn print_step(step: &str, outcome: &Outcome) {
    let marker = match outcome.kind() {
        OutcomeKind::Success => "✓".green().bold(),
        OutcomeKind::Validation => "•".yellow().bold(),
        OutcomeKind::Ledger => "✗".red().bold(),
    };
    let tx = outcome
        .tx_hash()
        .map(|h| format!(" ({})", h.as_str().dimmed()))
        .unwrap_or_default();
    println!("{marker} {step}: {}{tx}", outcome.message());
}

fn print_block(block: &Block) {
    println!(
        "  #{} {} <- {}",
        block.index().to_string().yellow(),
        short(block.hash()).cyan(),
        short(block.previous_hash()).dimmed()
    );
    println!("     {}", block.data());
}

fn short(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
