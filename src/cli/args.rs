//! Command-line arguments for the `subreach` binary.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "subreach")]
#[command(about = "Reachability analysis over typed call graphs", long_about = None)]
pub struct Args {
    /// Path to the graph description (JSON)
    pub graph: PathBuf,

    /// Method ids to treat as purged (unreachable) for this run
    #[arg(long = "purge", value_name = "METHOD_ID")]
    pub purge: Vec<u32>,

    /// Record BFS distances per method (roughly 2x slower)
    #[arg(long)]
    pub distances: bool,

    /// Sweep single-purge impacts: over the --purge candidates if given,
    /// otherwise over every reachable non-root method
    #[arg(long)]
    pub sweep: bool,

    /// Emit machine-readable JSON instead of a text summary
    #[arg(long)]
    pub json: bool,

    /// Sets the level of logging verbosity
    ///
    /// -v: Info
    /// -vv: Debug
    /// -vvv: Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
