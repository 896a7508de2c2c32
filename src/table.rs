//! Scoring-table enumeration and the didactic table rendering.

use std::io::{self, Write};

use crate::aligner::score_table::ScoreCell;
use crate::aligner::walk_table::WalkCell;
use crate::bioseq::Sequence;
use crate::formatter::{Formatter, Tag};
use crate::matrix::Matrix;

const ASCII_LEFT_ARROW: &str = "<";
const ASCII_UP_ARROW: &str = "^";
const ASCII_DIAG_ARROW: &str = "\\";
const UNICODE_LEFT_ARROW: &str = "\u{2190}";
const UNICODE_UP_ARROW: &str = "\u{2191}";
const UNICODE_DIAG_ARROW: &str = "\u{2196}";

/// One cell of the scoring table as seen by a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableCell {
    pub col: usize,
    pub row: usize,
    pub score: i32,
    pub diag: bool,
    pub up: bool,
    pub left: bool,
    /// Some co-optimal alignment's traversal touched this cell. Only set
    /// when the run was asked to mark the optimal path.
    pub in_optimal_path: bool,
    /// The characters meeting at this cell agree. False on border cells.
    pub matches: bool,
}

/// Read-only handle over a finished run's table, owned by the summary.
pub struct TableView {
    scores: Matrix<ScoreCell>,
    walk: Matrix<WalkCell>,
    top: Sequence,
    side: Sequence,
    greatest_abs_score: i32,
}

impl TableView {
    pub(crate) fn new(
        scores: Matrix<ScoreCell>,
        walk: Matrix<WalkCell>,
        top: Sequence,
        side: Sequence,
        greatest_abs_score: i32,
    ) -> Self {
        Self {
            scores,
            walk,
            top,
            side,
            greatest_abs_score,
        }
    }

    /// Table dimension as `[cols, rows]`.
    pub fn dim(&self) -> [usize; 2] {
        self.scores.dim()
    }

    pub fn top(&self) -> &Sequence {
        &self.top
    }

    pub fn side(&self) -> &Sequence {
        &self.side
    }

    /// Greatest absolute score in the table interior.
    pub fn greatest_abs_score(&self) -> i32 {
        self.greatest_abs_score
    }

    pub fn cell(&self, col: usize, row: usize) -> TableCell {
        let score = &self.scores[[col, row]];
        let walk = &self.walk[[col, row]];
        TableCell {
            col,
            row,
            score: score.score,
            diag: walk.diag,
            up: walk.up,
            left: walk.left,
            in_optimal_path: walk.in_optimal_path,
            matches: col > 0
                && row > 0
                && self.top.as_bytes()[col - 1] == self.side.as_bytes()[row - 1],
        }
    }

    /// Enumerates every cell, column by column, rows within a column.
    pub fn cells(&self) -> impl Iterator<Item = TableCell> + '_ {
        let [cols, rows] = self.dim();
        (0..cols).flat_map(move |col| (0..rows).map(move |row| self.cell(col, row)))
    }
}

/// Width of the score column: digits of the greatest absolute score plus a
/// sign position.
fn score_column_width(greatest_abs: i32) -> usize {
    let mut value = greatest_abs;
    let mut width = 1;
    loop {
        value /= 10;
        if value == 0 {
            break;
        }
        width += 1;
    }
    width + 1
}

struct ArrowGlyphs {
    left: &'static str,
    up: &'static str,
    diag: &'static str,
}

impl ArrowGlyphs {
    fn new(unicode: bool) -> Self {
        if unicode {
            Self {
                left: UNICODE_LEFT_ARROW,
                up: UNICODE_UP_ARROW,
                diag: UNICODE_DIAG_ARROW,
            }
        } else {
            Self {
                left: ASCII_LEFT_ARROW,
                up: ASCII_UP_ARROW,
                diag: ASCII_DIAG_ARROW,
            }
        }
    }
}

/// Renders the scoring table with arrow annotations.
///
/// Each table row prints as two lines: a directional line carrying the diag
/// and up arrows, and a score line carrying the left arrows and the signed
/// scores. Arrows and scores on the optimal path take their semantic tags.
pub fn render_table(
    view: &TableView,
    unicode: bool,
    fmt: &Formatter,
    out: &mut dyn Write,
) -> io::Result<()> {
    let glyphs = ArrowGlyphs::new(unicode);
    let width = score_column_width(view.greatest_abs_score());
    render_top_string(view, width, fmt, out)?;
    let [_, rows] = view.dim();
    for row in 0..rows {
        render_directional_line(view, row, width, &glyphs, fmt, out)?;
        render_score_line(view, row, width, &glyphs, fmt, out)?;
    }
    Ok(())
}

fn render_top_string(
    view: &TableView,
    width: usize,
    fmt: &Formatter,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut line = format!("*    {:>width$}", "-");
    for &byte in view.top().as_bytes() {
        line.push_str(&format!("    {:>pad$}{}", "", byte as char, pad = width - 1));
    }
    writeln!(out, "{}", fmt.paint(Tag::TopString, &line))
}

/// Tag for an arrow on the optimal path: indel arrows take the gap tag,
/// diagonal arrows the match/mismatch tag of their character pair.
fn diag_arrow_tag(cell: &TableCell) -> Tag {
    if cell.matches {
        Tag::Match
    } else {
        Tag::Mismatch
    }
}

fn render_directional_line(
    view: &TableView,
    row: usize,
    width: usize,
    glyphs: &ArrowGlyphs,
    fmt: &Formatter,
    out: &mut dyn Write,
) -> io::Result<()> {
    let [cols, _] = view.dim();
    // Single space standing in for the side-string character column.
    let mut line = String::from(" ");
    for col in 0..cols {
        let cell = view.cell(col, row);
        if cell.diag {
            let arrow = format!("  {} ", glyphs.diag);
            if cell.in_optimal_path {
                line.push_str(&fmt.paint(diag_arrow_tag(&cell), &arrow));
            } else {
                line.push_str(&arrow);
            }
        } else {
            line.push_str("    ");
        }
        if cell.up {
            let arrow = format!("{:>width$}", glyphs.up);
            if cell.in_optimal_path {
                line.push_str(&fmt.paint(Tag::Gap, &arrow));
            } else {
                line.push_str(&arrow);
            }
        } else {
            line.push_str(&" ".repeat(width));
        }
    }
    writeln!(out, "{line}")
}

fn render_score_line(
    view: &TableView,
    row: usize,
    width: usize,
    glyphs: &ArrowGlyphs,
    fmt: &Formatter,
    out: &mut dyn Write,
) -> io::Result<()> {
    let [cols, _] = view.dim();
    let side_char = if row == 0 {
        '-'
    } else {
        view.side().as_bytes()[row - 1] as char
    };
    let mut line = fmt.paint(Tag::SideString, &side_char.to_string());
    for col in 0..cols {
        let cell = view.cell(col, row);
        if cell.left {
            let arrow = format!("  {} ", glyphs.left);
            if cell.in_optimal_path {
                line.push_str(&fmt.paint(Tag::Gap, &arrow));
            } else {
                line.push_str(&arrow);
            }
        } else {
            line.push_str("    ");
        }
        let score = format!("{:+width$}", cell.score);
        if cell.in_optimal_path {
            line.push_str(&fmt.paint(Tag::OptimalPath, &score));
        } else {
            line.push_str(&score);
        }
    }
    writeln!(out, "{line}")
}
