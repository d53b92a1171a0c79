use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use snapkeeper::backend::BackendOption;
use snapkeeper::cli::{handle_command, Commands, JobArgs, RunContext};
use snapkeeper::config::KeeperPaths;
use snapkeeper::logging;

#[derive(Parser)]
#[command(
    name = "snapkeeper",
    author = "Kaylee Beyene",
    version,
    about = "Generational expiration for tarsnap archives",
    long_about = "snapkeeper makes tarsnap backups and deletes the old ones that a \
                  set of retention deltas no longer needs, keeping grandfather, \
                  father and son generations."
)]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug output, including tarsnap command lines
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Option passed to every tarsnap call, e.g. `-o keyfile=/etc/key` (repeatable)
    #[arg(short = 'o', long = "option", value_name = "KEY[=VALUE]", global = true)]
    options: Vec<BackendOption>,

    /// Job file to use
    #[arg(short, long, env = "SNAPKEEPER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// tarsnap executable
    #[arg(long, value_name = "PATH", default_value = "tarsnap", global = true)]
    tarsnap_binary: PathBuf,

    /// Prompt once for the key passphrase
    #[arg(long, global = true)]
    ask_passphrase: bool,

    #[command(flatten)]
    job: JobArgs,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(logging::level(cli.quiet, cli.verbose))?;

    // The default job file only applies when no job is given on the command line
    let config = cli.config.or_else(|| {
        if cli.job.is_empty() {
            KeeperPaths::new().ok()?.existing_config_file()
        } else {
            None
        }
    });

    let ctx = RunContext {
        config,
        job: cli.job,
        options: cli.options,
        tarsnap_binary: cli.tarsnap_binary,
        ask_passphrase: cli.ask_passphrase,
    };

    handle_command(ctx, cli.command)?;
    Ok(())
}
