use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use sfs::{resolve_in, to_json, Block, JsonView, ResolveError, SaveSummary, Section};
use tracing::*;

use crate::config::Config;
use crate::diagnostics;

/// Objects to print after the summary, relative to their section.
#[derive(Debug, Default)]
pub struct Printouts {
    pub parameters: Vec<sfs::Path>,
    pub game: Vec<sfs::Path>,
    pub flight_state: Vec<sfs::Path>,
}

impl Printouts {
    pub fn iter(&self) -> impl Iterator<Item = (Section, &sfs::Path)> {
        [
            (Section::Parameters, &self.parameters),
            (Section::Game, &self.game),
            (Section::FlightState, &self.flight_state),
        ]
        .into_iter()
        .flat_map(|(section, paths)| paths.iter().map(move |path| (section, path)))
    }
}

/// `persistent.sfs` becomes `persistent.sfs.json` next to it.
pub fn default_output(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Convert one save file: print its summary and the requested objects to `out`, then write the
/// whole tree as JSON to `output`.
#[instrument(skip_all, fields(input = %input.display()))]
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &Config,
    printouts: &Printouts,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let src = match std::fs::read_to_string(input) {
        Ok(src) => src,
        Err(e) => {
            error!(path = ?input, "failed to read input");
            return Err(e).with_context(|| format!("failed to read file `{}`", input.display()));
        }
    };

    let parsed = match sfs::parse(&src, &config.parse_options()) {
        Ok(parsed) => parsed,
        Err(e) => {
            let path = input.display().to_string();
            diagnostics::print_parse_error(&path, &src, &e)?;
            bail!("failed to parse save file `{}`", input.display());
        }
    };

    if parsed.is_partial() {
        warn!(
            max_depth = config.max_depth,
            omitted = parsed.truncations.len(),
            "blocks deeper than the depth limit were left out"
        );
        for truncated in &parsed.truncations {
            debug!(
                name = %truncated.name,
                line = truncated.line,
                depth = truncated.depth,
                "omitted"
            );
        }
    }

    let summary = SaveSummary::from_root(&parsed.root);
    write_summary(out, &summary, config.full_version)?;

    for (section, path) in printouts.iter() {
        write_printout(out, &parsed.root, section, path, config)?;
    }

    write_json(output, &parsed.root, config)?;
    info!(output = %output.display(), "wrote JSON");

    Ok(())
}

fn write_summary(
    out: &mut impl Write,
    summary: &SaveSummary,
    full_version: bool,
) -> anyhow::Result<()> {
    let or_unknown = |value: Option<&str>| value.unwrap_or("unknown").to_string();
    writeln!(out, "{}\n", or_unknown(summary.title.as_deref()))?;
    writeln!(out, "Save Time:\t{}", or_unknown(summary.saved_at.as_deref()))?;
    writeln!(out, "KSP Version:\t{}\n", or_unknown(summary.version(full_version)))?;
    Ok(())
}

fn write_printout(
    out: &mut impl Write,
    root: &Block,
    section: Section,
    path: &sfs::Path,
    config: &Config,
) -> anyhow::Result<()> {
    writeln!(out, "{section}/{path}")?;
    if path.is_all() {
        warn!(%section, "printing ALL of a section, this can be very long");
    }

    match resolve_in(root, section, path) {
        Ok(resolved) => {
            let value = to_json(resolved, &config.export_options());
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        Err(ResolveError::NotFound { segment, resolved }) => {
            debug!(%segment, %resolved, "printout not found");
            writeln!(
                out,
                "Reference failed at `{segment}`, please check the spelling. This is case sensitive!"
            )?;
        }
    }
    Ok(())
}

fn write_json(output: &Path, root: &Block, config: &Config) -> anyhow::Result<()> {
    let file = File::create(output)
        .with_context(|| format!("failed to create output file `{}`", output.display()))?;
    let mut writer = BufWriter::new(file);
    let view = JsonView::block(root, config.export_options());

    if config.pretty {
        serde_json::to_writer_pretty(&mut writer, &view)?;
    } else {
        serde_json::to_writer(&mut writer, &view)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write `{}`", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SAVE: &str = "GAME\n{\n\tversion = 1.12.5\n\tTitle = Test (SANDBOX)\n\tpersistentTimestamp = 2024-01-02T03:04:05\n\tFLIGHTSTATE\n\t{\n\t\tUT = 42.5\n\t\tVESSEL\n\t\t{\n\t\t\tname = A\n\t\t}\n\t\tVESSEL\n\t\t{\n\t\t\tname = B\n\t\t}\n\t}\n}\n";

    fn config() -> Config {
        Config {
            max_depth: 0,
            pretty: false,
            recursive: false,
            last_wins: false,
            full_version: false,
        }
    }

    type Run = (anyhow::Result<()>, String, PathBuf, tempfile::TempDir);

    fn run(src: &str, config: &Config, printouts: &Printouts) -> Run {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("persistent.sfs");
        std::fs::write(&input, src).unwrap();
        let output = default_output(&input);
        let mut out = Vec::new();
        let result = convert_file(&input, &output, config, printouts, &mut out);
        (result, String::from_utf8(out).unwrap(), output, dir)
    }

    #[test]
    fn output_sits_next_to_input() {
        assert_eq!(
            default_output(Path::new("saves/persistent.sfs")),
            PathBuf::from("saves/persistent.sfs.json")
        );
    }

    #[test]
    fn writes_summary_and_json() {
        let (result, printed, output, _dir) = run(SAVE, &config(), &Printouts::default());
        result.unwrap();
        assert!(printed.starts_with("Test (SANDBOX)\n\nSave Time:\t2024-01-02 03:04\nKSP Version:\t1.12.5\n"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(
            written["GAME"]["FLIGHTSTATE"]["VESSEL"],
            json!([{"name": "A"}, {"name": "B"}])
        );
        assert_eq!(written["GAME"]["FLIGHTSTATE"]["UT"], json!("42.5"));
    }

    #[test]
    fn printouts_and_failed_references() {
        let printouts = Printouts {
            flight_state: vec![
                sfs::Path::parse("VESSEL/1/name").unwrap(),
                sfs::Path::parse("vessel").unwrap(),
            ],
            ..Default::default()
        };
        let (result, printed, _, _dir) = run(SAVE, &config(), &printouts);
        result.unwrap();
        assert!(printed.contains("FLIGHTSTATE/VESSEL/1/name\n\"B\"\n"));
        assert!(printed.contains("FLIGHTSTATE/vessel\nReference failed at `vessel`"));
    }

    #[test]
    fn last_wins_and_depth_limit() {
        let config = Config {
            max_depth: 3,
            last_wins: true,
            ..config()
        };
        let (result, _, output, _dir) = run(SAVE, &config, &Printouts::default());
        result.unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(written["GAME"]["FLIGHTSTATE"]["VESSEL"], json!({}));
    }

    #[test]
    fn malformed_input_fails_without_output() {
        let (result, _, output, _dir) = run("GAME\n{\n\tTitle = x\n", &config(), &Printouts::default());
        assert!(result.is_err());
        assert!(!output.exists());
    }
}
