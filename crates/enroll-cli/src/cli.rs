use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "enroll",
    about = "Course enrollment with ledger-backed seats and a local audit chain",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Service configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the HTTP API over a local devnet contract
    Serve(ServeArgs),
    /// Run a sample enrollment scenario and print the audit chain
    Demo(DemoArgs),
    /// Verify an exported audit chain file
    VerifyChain(VerifyChainArgs),
    /// Write a configuration file with every default filled in
    InitConfig(InitConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<String>,
    /// Register the sample courses before serving
    #[arg(long)]
    pub seed: bool,
}

#[derive(Args)]
pub struct DemoArgs {
    /// Write the resulting chain to this file as JSON
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyChainArgs {
    /// Exported chain: a block array or an object with a `blocks` field
    pub file: PathBuf,
}

#[derive(Args)]
pub struct InitConfigArgs {
    pub path: PathBuf,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli =
            Cli::try_parse_from(["enroll", "serve", "--bind", "0.0.0.0:8080", "--seed"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind.as_deref(), Some("0.0.0.0:8080"));
            assert!(args.seed);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_demo_export() {
        let cli = Cli::try_parse_from(["enroll", "demo", "--export", "chain.json"]).unwrap();
        if let Command::Demo(args) = cli.command {
            assert_eq!(args.export, Some(PathBuf::from("chain.json")));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verify_chain() {
        let cli = Cli::try_parse_from(["enroll", "verify-chain", "chain.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::VerifyChain(ref a) if a.file == PathBuf::from("chain.json")
        ));
    }

    #[test]
    fn verify_chain_requires_file() {
        assert!(Cli::try_parse_from(["enroll", "verify-chain"]).is_err());
    }

    #[test]
    fn parse_init_config() {
        let cli = Cli::try_parse_from(["enroll", "init-config", "enroll.toml", "--force"]).unwrap();
        if let Command::InitConfig(args) = cli.command {
            assert_eq!(args.path, PathBuf::from("enroll.toml"));
            assert!(args.force);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_globals() {
        let cli = Cli::try_parse_from([
            "enroll", "--verbose", "--format", "json", "--config", "c.toml", "demo",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }
}
