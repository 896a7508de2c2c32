//! Command-line front end shared by the `needleman-wunsch` and
//! `smith-waterman` binaries. Owns every presentation decision; the core
//! only sees the sink and the mark-optimal-path switch.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use tracing_subscriber::EnvFilter;

use crate::aligner::{run_alignment, Alignment, AlignmentKind, AlignmentSink, Summary};
use crate::formatter::{Formatter, Tag};
use crate::reader::read_two_sequences;
use crate::scoring::ScoringSchema;
use crate::table::render_table;

const GAP: u8 = b'-';

#[derive(Parser, Debug)]
#[command(disable_help_flag = true)]
pub struct Args {
    /// match bonus
    #[arg(value_parser = clap::value_parser!(i32).range(0..))]
    m: i32,

    /// mismatch penalty
    #[arg(value_parser = clap::value_parser!(i32).range(0..))]
    k: i32,

    /// indel (gap) penalty
    #[arg(value_parser = clap::value_parser!(i32).range(0..))]
    d: i32,

    /// parallelize the computation with 'num-threads' threads (must be > 1)
    #[arg(short = 'p', value_name = "num-threads")]
    threads: Option<usize>,

    /// read the input sequences from 'sequence-file' instead of standard input
    #[arg(short = 'f', value_name = "sequence-file")]
    file: Option<PathBuf>,

    /// list match, mismatch, and indel counts for each alignment pair
    #[arg(short = 'l')]
    list_counts: bool,

    /// be quiet and don't print the aligned strings
    #[arg(short = 'q')]
    quiet: bool,

    /// summarize the algorithm's run
    #[arg(short = 's')]
    summarize: bool,

    /// print the scores table; only useful for shorter input sequences
    #[arg(short = 't')]
    table: bool,

    /// use unicode arrows when printing the scores table
    #[arg(short = 'u')]
    unicode: bool,

    /// color the output with ANSI escape sequences
    #[arg(short = 'c')]
    colorize: bool,

    /// print this usage message
    #[arg(short = 'h')]
    help: bool,
}

fn build_command(kind: AlignmentKind) -> clap::Command {
    let about = match kind {
        AlignmentKind::Global => "Align two sequences with the Needleman-Wunsch algorithm",
        AlignmentKind::Local => "Align two sequences with the Smith-Waterman algorithm",
    };
    Args::command().about(about)
}

/// `-p` operand to worker count: absent means single-threaded, present must
/// ask for actual parallelism.
fn worker_count(threads: Option<usize>) -> Result<usize> {
    match threads {
        None => Ok(1),
        Some(p) if p > 1 => Ok(p),
        Some(p) => bail!("num-threads is {p}; num-threads must be greater than 1"),
    }
}

pub fn run(kind: AlignmentKind) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut cmd = build_command(kind);
    let matches = match cmd.clone().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            // clap renders the message together with the usage text
            let _ = err.print();
            std::process::exit(1);
        }
    };
    let args = Args::from_arg_matches(&matches).expect("argument struct matches the command");

    if args.help {
        let _ = cmd.print_help();
        std::process::exit(1);
    }

    let threads = worker_count(args.threads)?;

    let (top, side) = match &args.file {
        Some(path) => {
            let mut file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            read_two_sequences(&mut file)
                .with_context(|| format!("failed to read sequences from {}", path.display()))?
        }
        None => read_two_sequences(&mut io::stdin())
            .context("failed to read sequences from standard input")?,
    };

    let fmt = Formatter::new(args.colorize);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut sink = PrintSink {
        out: &mut out,
        fmt: &fmt,
        quiet: args.quiet,
        list_counts: args.list_counts,
        error: None,
    };
    let summary = run_alignment(
        &top,
        &side,
        ScoringSchema::new(args.m, args.k, args.d),
        threads,
        kind,
        args.table,
        &mut sink,
    )?;
    if let Some(err) = sink.error.take() {
        return Err(err).context("failed to print alignments");
    }
    drop(sink);

    if args.summarize {
        write_summary(&summary, &mut out)?;
    }

    if args.table {
        // extra newline to separate the output sections
        if !args.quiet || args.summarize || args.list_counts {
            writeln!(out)?;
        }
        render_table(summary.table(), args.unicode, &fmt, &mut out)?;
    }

    Ok(())
}

/// Prints each alignment as the reconstruction engine emits it.
struct PrintSink<'a, W: Write> {
    out: W,
    fmt: &'a Formatter,
    quiet: bool,
    list_counts: bool,
    error: Option<io::Error>,
}

impl<W: Write> PrintSink<'_, W> {
    fn write_solution(&mut self, alignment: &Alignment) -> io::Result<()> {
        if !self.quiet {
            let top = alignment.top.as_bytes();
            let side = alignment.side.as_bytes();
            writeln!(self.out, "{}", paint_aligned(self.fmt, top, side))?;
            writeln!(self.out, "{}", paint_aligned(self.fmt, side, top))?;
        }
        if self.list_counts {
            let stats = alignment.stats;
            writeln!(
                self.out,
                "{} match{}, {} mismatch{}, {} indel{}",
                stats.matches,
                if stats.matches == 1 { "" } else { "es" },
                stats.mismatches,
                if stats.mismatches == 1 { "" } else { "es" },
                stats.indels,
                if stats.indels == 1 { "" } else { "s" },
            )?;
        }
        writeln!(self.out)
    }
}

impl<W: Write> AlignmentSink for PrintSink<'_, W> {
    fn emit(&mut self, alignment: &Alignment) {
        if self.error.is_some() || (self.quiet && !self.list_counts) {
            return;
        }
        if let Err(err) = self.write_solution(alignment) {
            self.error = Some(err);
        }
    }
}

/// Formats one line of an aligned pair, coloring each character by its
/// relationship to the opposite character.
fn paint_aligned(fmt: &Formatter, line: &[u8], opposite: &[u8]) -> String {
    let mut painted = String::with_capacity(line.len());
    for (i, &ch) in line.iter().enumerate() {
        let tag = if ch == opposite[i] {
            Tag::Match
        } else if ch == GAP || opposite[i] == GAP {
            Tag::Gap
        } else {
            Tag::Mismatch
        };
        painted.push_str(&fmt.paint(tag, &(ch as char).to_string()));
    }
    painted
}

fn write_summary(summary: &Summary, out: &mut dyn Write) -> io::Result<()> {
    let solutions = summary.solution_count();
    let branches = summary.branch_count();
    writeln!(
        out,
        "{} optimal alignment{}",
        solutions,
        if solutions == 1 { "" } else { "s" }
    )?;
    writeln!(out, "Optimal score is {}", summary.optimal_score())?;
    writeln!(
        out,
        "{} branch cell{}",
        branches,
        if branches == 1 { "" } else { "s" }
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_operands_and_flags() {
        let args = Args::try_parse_from([
            "needleman-wunsch",
            "-p",
            "4",
            "-f",
            "seqs.txt",
            "-l",
            "-s",
            "1",
            "2",
            "3",
        ])
        .unwrap();
        assert_eq!((1, 2, 3), (args.m, args.k, args.d));
        assert_eq!(Some(4), args.threads);
        assert_eq!(Some(PathBuf::from("seqs.txt")), args.file);
        assert!(args.list_counts && args.summarize);
        assert!(!args.quiet && !args.table && !args.unicode && !args.colorize);
    }

    #[test]
    fn missing_operands_fail_to_parse() {
        assert!(Args::try_parse_from(["needleman-wunsch", "1", "1"]).is_err());
    }

    #[test]
    fn negative_costs_fail_to_parse() {
        assert!(Args::try_parse_from(["needleman-wunsch", "1", "1", "--", "-1"]).is_err());
    }

    #[test]
    fn unknown_option_fails_to_parse() {
        assert!(Args::try_parse_from(["needleman-wunsch", "-z", "1", "1", "1"]).is_err());
    }

    #[test]
    fn worker_count_defaults_to_single_threaded() {
        assert_eq!(1, worker_count(None).unwrap());
        assert_eq!(8, worker_count(Some(8)).unwrap());
    }

    #[test]
    fn worker_count_rejects_degenerate_parallelism() {
        assert!(worker_count(Some(1)).is_err());
        assert!(worker_count(Some(0)).is_err());
    }

    #[test]
    fn paint_aligned_tags_by_relationship() {
        let fmt = Formatter::new(true);
        let plain = Formatter::new(false);
        // 'A' vs 'A' match, 'C' vs '-' gap, 'G' vs 'T' mismatch
        let painted = paint_aligned(&fmt, b"ACG", b"A-T");
        assert!(painted.contains('\u{1b}'));
        assert_eq!("ACG", paint_aligned(&plain, b"ACG", b"A-T"));
    }
}
