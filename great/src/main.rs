mod cmd;
mod file;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use eyre::Result;
use human_panic::setup_panic;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about=None)]
/// GREAT regulatory domains for peak-to-gene annotation.
struct Args {
    #[clap(flatten)]
    verbose: Verbosity,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute a basal plus extension regulatory domain for each gene and
    /// write them as a bed file
    Domains(cmd::domains::DomainsCmd),

    /// Write a bed file with a small window around each gene's TSS
    Tss(cmd::tss::TssCmd),

    /// Assign peaks to the genes whose regulatory domain they overlap,
    /// reporting the distance from peak centre to TSS
    Annotate(cmd::annotate::AnnotateCmd),
}

fn main() -> Result<()> {
    setup_panic!();
    jane_eyre::install()?;

    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match args.command {
        Commands::Domains(cmd) => cmd.run()?,
        Commands::Tss(cmd) => cmd.run()?,
        Commands::Annotate(cmd) => cmd.run()?,
    }
    Ok(())
}
