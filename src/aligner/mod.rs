//! Alignment algorithms: computation state, entry point, and summary.

use std::sync::RwLock;

use thiserror::Error;

use crate::bioseq::Sequence;
use crate::matrix::Matrix;
use crate::scoring::ScoringSchema;
use crate::table::TableView;

mod engine;
mod reconstruct;
pub(crate) mod score_table;
pub(crate) mod walk_table;

use score_table::ScoreCell;
use walk_table::WalkCell;

/// Which optimality the run targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignmentKind {
    /// Needleman-Wunsch: globally optimal alignment of the whole sequences.
    Global,
    /// Smith-Waterman: locally optimal alignment of subsequences.
    Local,
}

/// One co-optimal alignment, as handed to the sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    /// Aligned form of the top sequence, gaps as `-`.
    pub top: String,
    /// Aligned form of the side sequence, gaps as `-`.
    pub side: String,
    pub stats: AlignmentStats,
}

/// Per-alignment character accounting, computed during emission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub matches: u32,
    pub mismatches: u32,
    pub indels: u32,
}

/// Consumer of the reconstruction stream. Called once per co-optimal
/// alignment, in the engine's deterministic emission order.
pub trait AlignmentSink {
    fn emit(&mut self, alignment: &Alignment);
}

/// Error type for the core entry point.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq)]
pub enum AlignError {
    #[error("worker thread count must be at least 1")]
    NoWorkers,
}

/// State of one alignment run: the input sequences (borrowed for the run's
/// lifetime), the parameters, both matrices, and the shared counters.
pub(crate) struct Computation<'s> {
    pub(crate) top: &'s Sequence,
    pub(crate) side: &'s Sequence,
    pub(crate) kind: AlignmentKind,
    threads: usize,
    pub(crate) scores: Matrix<ScoreCell>,
    pub(crate) walk: Matrix<WalkCell>,
    pub(crate) greatest_abs_score: i32,
    branch_count: u64,
    solution_count: RwLock<u64>,
}

impl<'s> Computation<'s> {
    /// Binds the inputs and runs the scoring engine; the returned computation
    /// holds the filled matrices.
    fn new(
        top: &'s Sequence,
        side: &'s Sequence,
        schema: ScoringSchema,
        threads: usize,
        kind: AlignmentKind,
    ) -> Self {
        let outcome = engine::fill(top.as_bytes(), side.as_bytes(), &schema, kind, threads);
        Self {
            top,
            side,
            kind,
            threads,
            scores: outcome.scores,
            walk: outcome.walk,
            greatest_abs_score: outcome.greatest_abs_score,
            branch_count: outcome.branch_count,
            solution_count: RwLock::new(0),
        }
    }

    /// Counts one emitted solution. Multi-threaded runs write through the
    /// lock; single-threaded runs skip locking entirely.
    pub(crate) fn inc_solution_count(&mut self) {
        if self.threads > 1 {
            *self
                .solution_count
                .write()
                .expect("solution count lock poisoned") += 1;
        } else {
            *self
                .solution_count
                .get_mut()
                .expect("solution count lock poisoned") += 1;
        }
    }

    fn solution_count(&self) -> u64 {
        *self
            .solution_count
            .read()
            .expect("solution count lock poisoned")
    }

    fn optimal_score(&self) -> i32 {
        let [cols, rows] = self.scores.dim();
        match self.kind {
            AlignmentKind::Global => self.scores[[cols - 1, rows - 1]].score,
            AlignmentKind::Local => self.greatest_abs_score,
        }
    }
}

/// Derived quantities of a finished run, plus the table handle a renderer
/// may enumerate.
pub struct Summary {
    solution_count: u64,
    optimal_score: i32,
    branch_count: u64,
    table: TableView,
}

impl Summary {
    /// Total number of co-optimal alignments emitted.
    pub fn solution_count(&self) -> u64 {
        self.solution_count
    }

    /// GLOBAL: the bottom-right corner score. LOCAL: the greatest absolute
    /// score recorded during scoring.
    pub fn optimal_score(&self) -> i32 {
        self.optimal_score
    }

    /// Number of cells with two or more back-pointers (diagnostic).
    pub fn branch_count(&self) -> u64 {
        self.branch_count
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }
}

/// Runs a complete alignment: scores the table, reconstructs every
/// co-optimal alignment into `sink`, and returns the summary.
///
/// `mark_optimal_path` makes the reconstruction record the cells it visits
/// so a table rendering can highlight them; leave it off when the table is
/// not going to be printed.
pub fn run_alignment(
    top: &Sequence,
    side: &Sequence,
    schema: ScoringSchema,
    threads: usize,
    kind: AlignmentKind,
    mark_optimal_path: bool,
    sink: &mut dyn AlignmentSink,
) -> Result<Summary, AlignError> {
    if threads == 0 {
        return Err(AlignError::NoWorkers);
    }

    let mut computation = Computation::new(top, side, schema, threads, kind);
    reconstruct::construct_alignments(&mut computation, mark_optimal_path, sink);

    Ok(Summary {
        solution_count: computation.solution_count(),
        optimal_score: computation.optimal_score(),
        branch_count: computation.branch_count,
        table: TableView::new(
            computation.scores,
            computation.walk,
            (*computation.top).clone(),
            (*computation.side).clone(),
            computation.greatest_abs_score,
        ),
    })
}
