//! Score matrix: the grid of alignment scores the scoring engine fills.
//!
//! Two renditions share the same cell payload. Single-threaded runs fill a
//! plain [`Matrix<ScoreCell>`] and never construct a synchronization
//! primitive. Multi-threaded runs fill a [`SharedScoreTable`] whose cells each
//! pair the payload with a lock and a "ready" condition, then freeze it into
//! the plain matrix once the workers have joined. Freezing consumes every
//! per-cell primitive, so their destruction is tied to the end of scoring.

use std::sync::{Condvar, Mutex};

use crate::aligner::AlignmentKind;
use crate::matrix::Matrix;

/// One cell of the score matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreCell {
    pub score: i32,
    /// True once the score is final. Border cells are born ready.
    pub ready: bool,
}

impl ScoreCell {
    fn pending() -> Self {
        Self {
            score: 0,
            ready: false,
        }
    }

    fn ready(score: i32) -> Self {
        Self { score, ready: true }
    }
}

/// Score of the border cell at the given distance from the origin.
///
/// Under GLOBAL the borders accumulate the indel penalty; under LOCAL they
/// are zero. A border cell has `col == 0` or `row == 0`, so `col + row` is
/// its distance from the origin.
pub(crate) fn border_score(kind: AlignmentKind, indel: i32, distance: usize) -> i32 {
    match kind {
        AlignmentKind::Global => indel * distance as i32,
        AlignmentKind::Local => 0,
    }
}

/// Plain score matrix with initialized borders; interior cells are pending.
pub(crate) fn new_plain(
    kind: AlignmentKind,
    indel: i32,
    cols: usize,
    rows: usize,
) -> Matrix<ScoreCell> {
    Matrix::from_fn(cols, rows, |col, row| {
        if col == 0 || row == 0 {
            ScoreCell::ready(border_score(kind, indel, col + row))
        } else {
            ScoreCell::pending()
        }
    })
}

struct SyncScoreCell {
    state: Mutex<ScoreCell>,
    ready_cv: Condvar,
}

impl SyncScoreCell {
    fn new(cell: ScoreCell) -> Self {
        Self {
            state: Mutex::new(cell),
            ready_cv: Condvar::new(),
        }
    }
}

/// Score matrix shared by the scoring workers. Each cell owns a lock and a
/// condition over its `ready` flag; a consumer blocks until the producer of
/// the cell publishes its score.
pub(crate) struct SharedScoreTable {
    cells: Matrix<SyncScoreCell>,
}

impl SharedScoreTable {
    pub(crate) fn new(kind: AlignmentKind, indel: i32, cols: usize, rows: usize) -> Self {
        let cells = Matrix::from_fn(cols, rows, |col, row| {
            if col == 0 || row == 0 {
                SyncScoreCell::new(ScoreCell::ready(border_score(kind, indel, col + row)))
            } else {
                SyncScoreCell::new(ScoreCell::pending())
            }
        });
        Self { cells }
    }

    /// Reads a score that is already final. Border cells and a worker's own
    /// prior writes qualify; waiting here would indicate a scheduling bug.
    pub(crate) fn read_score(&self, col: usize, row: usize) -> i32 {
        let state = self.cells[[col, row]]
            .state
            .lock()
            .expect("score cell lock poisoned");
        debug_assert!(state.ready, "read of unready cell ({col}, {row})");
        state.score
    }

    /// Blocks until cell `(col, row)` is ready, then returns its score.
    pub(crate) fn wait_score(&self, col: usize, row: usize) -> i32 {
        let cell = &self.cells[[col, row]];
        let mut state = cell.state.lock().expect("score cell lock poisoned");
        while !state.ready {
            state = cell
                .ready_cv
                .wait(state)
                .expect("score cell lock poisoned");
        }
        state.score
    }

    /// Publishes the final score of `(col, row)` and wakes the waiting
    /// consumer. At most one thread ever waits on a given cell: the worker
    /// that owns the column to its right.
    pub(crate) fn publish(&self, col: usize, row: usize, score: i32) {
        let cell = &self.cells[[col, row]];
        let mut state = cell.state.lock().expect("score cell lock poisoned");
        *state = ScoreCell::ready(score);
        cell.ready_cv.notify_one();
    }

    /// Consumes the table into its plain form, destroying every per-cell
    /// synchronization primitive.
    pub(crate) fn into_plain(self) -> Matrix<ScoreCell> {
        self.cells
            .map(|cell| cell.state.into_inner().expect("score cell lock poisoned"))
    }
}
