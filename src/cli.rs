use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "workerbridge")]
#[command(about = "Run items against a remote worker API", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $WORKERBRIDGE_CONFIG or config/workerbridge.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory receiving downloaded binary slots
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// Emit an error record for a failed item and keep going
    #[arg(long, global = true)]
    pub continue_on_fail: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process every item of an items file
    Run(RunArgs),
    /// Fetch the status payload of an execution
    Status(ExecutionArgs),
    /// List the files of an execution
    Files(ExecutionArgs),
    /// Download one output file, or all of them when no name is given
    Download(DownloadArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// JSON array of items
    #[arg(long)]
    pub items: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ExecutionArgs {
    pub execution_id: String,
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    pub execution_id: String,
    pub file_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "workerbridge",
            "--continue-on-fail",
            "run",
            "--items",
            "items.json",
            "--output",
            "out",
        ]);

        assert!(cli.continue_on_fail);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert!(matches!(cli.command, Commands::Run(ref args) if args.items == PathBuf::from("items.json")));
    }

    #[test]
    fn test_parse_download_without_name() {
        let cli = Cli::parse_from(["workerbridge", "download", "E1"]);
        match cli.command {
            Commands::Download(args) => {
                assert_eq!(args.execution_id, "E1");
                assert!(args.file_name.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
