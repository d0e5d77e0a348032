use std::path::PathBuf;

use anyhow::bail;
use clap::Parser as ClapParser;
use tracing::*;

use crate::config::Config;
use crate::convert::Printouts;

mod config;
mod convert;
mod diagnostics;
mod logging;

const AFTER_HELP: &str = "\
Use `/` to go deeper into the tree and integers to pick among blocks with the same name, \
e.g. `-q SCENARIO/Tech/1/id`. Names are case sensitive.

Beware: `ALL` under GAME or FLIGHTSTATE prints most of the save file.";

#[derive(Debug, ClapParser)]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
struct Args {
    /// Paths to Kerbal Space Program save files (`.sfs`).
    #[arg(required = true)]
    filepath: Vec<PathBuf>,

    /// Keep only this many levels of nesting. `0` keeps everything.
    #[arg(short, long, value_name = "N")]
    depth: Option<usize>,

    /// Pretty-print the JSON output.
    #[arg(short, long)]
    format: bool,

    /// Show the full game version, including build number and platform.
    #[arg(short, long)]
    kspv: bool,

    /// Infer a type for every value instead of keeping the text as-is.
    #[arg(short = 'R', long)]
    recursive: bool,

    /// Keep only the last of several same-name blocks instead of exporting an array.
    #[arg(long)]
    last_wins: bool,

    /// Where to write the JSON. Defaults to `<FILEPATH>.json`; only valid with a single input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file, read before `ksv.toml` in the working directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print an object inside PARAMETERS, or ALL.
    #[arg(short = 'p', value_name = "REF", help_heading = "Printouts")]
    parameters: Vec<sfs::Path>,

    /// Print an object inside GAME, or ALL.
    #[arg(short = 'q', value_name = "REF", help_heading = "Printouts")]
    game: Vec<sfs::Path>,

    /// Print an object inside FLIGHTSTATE, or ALL.
    #[arg(short = 'r', value_name = "REF", help_heading = "Printouts")]
    flight_state: Vec<sfs::Path>,
}

impl Args {
    /// Flags given on the command line take precedence over the configuration.
    fn apply_to(&self, config: &mut Config) {
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        config.pretty |= self.format;
        config.full_version |= self.kspv;
        config.recursive |= self.recursive;
        config.last_wins |= self.last_wins;
    }
}

fn main() -> anyhow::Result<()> {
    logging::setup_logging();

    let cli = Args::parse();

    debug!(?cli);

    if cli.output.is_some() && cli.filepath.len() > 1 {
        bail!("`--output` can only be used with a single input file");
    }

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    debug!(?config);

    let printouts = Printouts {
        parameters: cli.parameters.clone(),
        game: cli.game.clone(),
        flight_state: cli.flight_state.clone(),
    };

    let mut stdout = std::io::stdout().lock();
    let mut failed = 0;
    for input in &cli.filepath {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| convert::default_output(input));
        if let Err(e) = convert::convert_file(input, &output, &config, &printouts, &mut stdout) {
            error!("{e:#}");
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} save files could not be converted", cli.filepath.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn printouts_repeat() {
        let cli = Args::try_parse_from([
            "ksv", "-q", "SCENARIO/Tech/1", "-q", "Title", "-r", "ALL", "-R", "persistent.sfs",
        ])
        .unwrap();
        assert_eq!(cli.game.len(), 2);
        assert!(cli.flight_state[0].is_all());
        assert!(cli.recursive);
    }

    #[test]
    fn invalid_reference_is_rejected() {
        assert!(Args::try_parse_from(["ksv", "-p", "a//b", "persistent.sfs"]).is_err());
        assert!(Args::try_parse_from(["ksv"]).is_err());
    }
}
