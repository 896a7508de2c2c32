//! Walk matrix: back-pointers plus the bookkeeping the reconstruction
//! engine scribbles over while enumerating co-optimal paths.

use std::sync::{Mutex, MutexGuard};

use crate::aligner::AlignmentKind;
use crate::matrix::Matrix;

/// Direction of an adjacent predecessor cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Left,
    Diag,
}

/// One cell of the walk matrix.
///
/// `diag`/`left`/`up` record which predecessors are optimal. The `*_done`
/// flags track which of those the current traversal has exhausted; outside a
/// traversal every cell satisfies `*_done == !*`, i.e. a direction is "done"
/// exactly when there is no pointer in it. `src` records how the traversal
/// entered this cell so it can back out again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WalkCell {
    pub diag: bool,
    pub left: bool,
    pub up: bool,
    pub diag_done: bool,
    pub left_done: bool,
    pub up_done: bool,
    pub src: Option<Direction>,
    pub in_optimal_path: bool,
}

impl WalkCell {
    /// A cell with no outgoing directions. Reconstruction can only stop or
    /// turn around here. Border cells under LOCAL and zero-score cells are
    /// exhausted from birth.
    pub(crate) fn exhausted() -> Self {
        Self::with_pointers(false, false, false)
    }

    /// A cell with the given back-pointers; each `*_done` flag starts as the
    /// negation of its pointer.
    pub(crate) fn with_pointers(diag: bool, left: bool, up: bool) -> Self {
        Self {
            diag,
            left,
            up,
            diag_done: !diag,
            left_done: !left,
            up_done: !up,
            src: None,
            in_optimal_path: false,
        }
    }

    pub(crate) fn has_pointers(&self) -> bool {
        self.diag || self.left || self.up
    }

    pub(crate) fn all_done(&self) -> bool {
        self.diag_done && self.left_done && self.up_done
    }

    /// A branch cell offers two or more predecessors to the traversal.
    pub(crate) fn is_branch(&self) -> bool {
        (self.diag as u8 + self.left as u8 + self.up as u8) > 1
    }

    /// Restores `*_done == !*`, making the cell walkable by a later pass.
    pub(crate) fn reset_done(&mut self) {
        self.diag_done = !self.diag;
        self.left_done = !self.left;
        self.up_done = !self.up;
    }
}

/// The cells of column `col` before scoring: interior cells exhausted (the
/// engine overwrites them), borders per algorithm.
fn initial_column(kind: AlignmentKind, col: usize, rows: usize) -> Vec<WalkCell> {
    (0..rows)
        .map(|row| match kind {
            // Top row points left, left column points up, origin nowhere.
            AlignmentKind::Global if col > 0 && row == 0 => {
                WalkCell::with_pointers(false, true, false)
            }
            AlignmentKind::Global if col == 0 && row > 0 => {
                WalkCell::with_pointers(false, false, true)
            }
            _ => WalkCell::exhausted(),
        })
        .collect()
}

/// Plain walk matrix with initialized borders.
pub(crate) fn new_plain(kind: AlignmentKind, cols: usize, rows: usize) -> Matrix<WalkCell> {
    Matrix::from_columns((0..cols).map(|col| initial_column(kind, col, rows)).collect())
}

/// Walk matrix shared by the scoring workers. Each worker owns a disjoint
/// column set, so a column-granular lock is enough; a worker takes it once
/// per column and never contends.
pub(crate) struct SharedWalkTable {
    columns: Vec<Mutex<Vec<WalkCell>>>,
}

impl SharedWalkTable {
    pub(crate) fn new(kind: AlignmentKind, cols: usize, rows: usize) -> Self {
        Self {
            columns: (0..cols)
                .map(|col| Mutex::new(initial_column(kind, col, rows)))
                .collect(),
        }
    }

    pub(crate) fn lock_column(&self, col: usize) -> MutexGuard<'_, Vec<WalkCell>> {
        self.columns[col].lock().expect("walk column lock poisoned")
    }

    pub(crate) fn into_plain(self) -> Matrix<WalkCell> {
        Matrix::from_columns(
            self.columns
                .into_iter()
                .map(|column| column.into_inner().expect("walk column lock poisoned"))
                .collect(),
        )
    }
}
