use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use sfs::{Malformation, ParseError};

pub type DiagnosticReport<'a> = Report<'a, (&'a String, std::ops::Range<usize>)>;

pub fn malformed_input_report<'a>(path: &'a String, err: &ParseError) -> DiagnosticReport<'a> {
    let ParseError::MalformedInput { kind, line, span } = err;

    let mut report = Report::build(ReportKind::Error, path, span.start)
        .with_message(format!("malformed save file: {kind}"))
        .with_label(
            Label::new((path, span.clone()))
                .with_message(format!("detected on line {}", line.fg(Color::Blue)))
                .with_color(Color::Red),
        );

    match kind {
        Malformation::UnmatchedClose => {
            report.set_help(format!(
                "remove this {} or open a block before it",
                "}".fg(Color::Blue)
            ));
        }
        Malformation::UnclosedBlock(_) => {
            report.set_help(format!(
                "add a matching {} after the block's contents",
                "}".fg(Color::Blue)
            ));
        }
        Malformation::MissingOpen(_) => {
            report.set_help(format!(
                "write {} after a block name, or use `key = value` for a value",
                "{".fg(Color::Blue)
            ));
        }
        Malformation::StrayOpen | Malformation::Unexpected(_) => {}
    }

    report.finish()
}

/// Render a parse failure to stderr.
pub fn print_parse_error(path: &String, src: &str, err: &ParseError) -> anyhow::Result<()> {
    malformed_input_report(path, err).eprint((path, Source::from(src)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_renders_the_offending_line() {
        let src = "BLOCK { } }";
        let err = sfs::parse(src, &Default::default()).unwrap_err();
        let path = "broken.sfs".to_string();

        let mut rendered = Vec::new();
        malformed_input_report(&path, &err)
            .write((&path, Source::from(src)), &mut rendered)
            .unwrap();
        let rendered = String::from_utf8(rendered).unwrap();
        assert!(rendered.contains("malformed save file"));
        assert!(rendered.contains("broken.sfs"));
    }
}
