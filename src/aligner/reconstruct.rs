//! Reconstruction engine: enumerates every co-optimal alignment.
//!
//! The enumeration is a depth-first traversal of the walk matrix, written as
//! a loop rather than recursion so that arbitrarily long inputs cannot
//! overflow the call stack. The matrix itself is the traversal's scratchpad:
//! the `*_done` flags record which branches of a cell the current pass has
//! exhausted, and `src` records how the pass entered the cell so it can back
//! out. Backing out restores `*_done == !*`, leaving the cell ready for a
//! later pass that arrives from a different parent.

use tracing::debug;

use crate::aligner::walk_table::Direction;
use crate::aligner::{Alignment, AlignmentKind, AlignmentSink, AlignmentStats, Computation};

const GAP: u8 = b'-';
const FILLER: u8 = b' ';

/// Enumerates all co-optimal alignments of the computation, streaming each
/// one to `sink` in deterministic order: start cells in column-major order,
/// branches explored diag, left, up.
pub(crate) fn construct_alignments(
    computation: &mut Computation<'_>,
    mark_optimal_path: bool,
    sink: &mut dyn AlignmentSink,
) {
    let [cols, rows] = computation.walk.dim();
    let starts = starting_cells(computation);
    debug!(count = starts.len(), "start cells for reconstruction");

    // Worst case, an aligned pair spans every character of both sequences.
    let mut buffers = SolutionBuffers::new(cols + rows + 1);

    for (start_col, start_row) in starts {
        debug!(start_col, start_row, "constructing alignments for subtable");
        let leader_len = buffers.write_leader(computation, start_col, start_row);
        walk_subtable(
            computation,
            &mut buffers,
            start_col,
            start_row,
            leader_len,
            mark_optimal_path,
            sink,
        );
        // The loop above exits with every flag at the start cell set; put the
        // done/pointer duality back so a later pass may cross this cell.
        computation.walk[[start_col, start_row]].reset_done();
    }
}

/// Where traversals begin. GLOBAL: the bottom-right corner. LOCAL: every
/// interior cell scoring the table maximum, in column-major order.
fn starting_cells(computation: &Computation<'_>) -> Vec<(usize, usize)> {
    let [cols, rows] = computation.walk.dim();
    match computation.kind {
        AlignmentKind::Global => vec![(cols - 1, rows - 1)],
        AlignmentKind::Local => {
            let maximum = computation.greatest_abs_score;
            let mut starts = Vec::new();
            for col in 1..cols {
                for row in 1..rows {
                    if computation.scores[[col, row]].score == maximum {
                        starts.push((col, row));
                    }
                }
            }
            starts
        }
    }
}

struct SolutionBuffers {
    /// Aligned top characters, back to front.
    x: Vec<u8>,
    /// Aligned side characters, back to front.
    y: Vec<u8>,
}

impl SolutionBuffers {
    fn new(capacity: usize) -> Self {
        Self {
            x: vec![0; capacity],
            y: vec![0; capacity],
        }
    }

    /// Pads the stretch between the bottom-right corner and a LOCAL start
    /// cell: space filler along the overhang, then character pairs along the
    /// diagonal. Returns the number of characters written. A start at the
    /// corner itself (always the case under GLOBAL) writes nothing.
    fn write_leader(
        &mut self,
        computation: &Computation<'_>,
        start_col: usize,
        start_row: usize,
    ) -> usize {
        let top = computation.top.as_bytes();
        let side = computation.side.as_bytes();
        let [cols, rows] = computation.walk.dim();
        let mut col = cols - 1;
        let mut row = rows - 1;
        let mut n = 0;

        while col - start_col > row - start_row {
            self.x[n] = top[col - 1];
            self.y[n] = FILLER;
            col -= 1;
            n += 1;
        }
        while row - start_row > col - start_col {
            self.x[n] = FILLER;
            self.y[n] = side[row - 1];
            row -= 1;
            n += 1;
        }
        while col != start_col || row != start_row {
            self.x[n] = top[col - 1];
            self.y[n] = side[row - 1];
            col -= 1;
            row -= 1;
            n += 1;
        }
        n
    }

    /// Pads from cell `(col, row)` back to the table origin: character pairs
    /// along the diagonal, then the leftover of either sequence against
    /// space filler. Returns the total character count. Used when a LOCAL
    /// path ends before either sequence is spent; a GLOBAL path always ends
    /// at the origin and writes nothing.
    fn write_trailer(
        &mut self,
        computation: &Computation<'_>,
        mut col: usize,
        mut row: usize,
        mut n: usize,
    ) -> usize {
        let top = computation.top.as_bytes();
        let side = computation.side.as_bytes();

        while col > 0 && row > 0 {
            self.x[n] = top[col - 1];
            self.y[n] = side[row - 1];
            col -= 1;
            row -= 1;
            n += 1;
        }
        while col > 0 {
            self.x[n] = top[col - 1];
            self.y[n] = FILLER;
            col -= 1;
            n += 1;
        }
        while row > 0 {
            self.x[n] = FILLER;
            self.y[n] = side[row - 1];
            row -= 1;
            n += 1;
        }
        n
    }

    /// Builds the alignment record for the first `count` buffered characters.
    /// The buffers were filled walking backwards, so emission reverses them.
    fn solution(&self, count: usize) -> Alignment {
        let mut top = String::with_capacity(count);
        let mut side = String::with_capacity(count);
        let mut stats = AlignmentStats::default();
        for i in (0..count).rev() {
            let (a, b) = (self.x[i], self.y[i]);
            top.push(a as char);
            side.push(b as char);
            if a == b {
                stats.matches += 1;
            } else if a == GAP || b == GAP {
                stats.indels += 1;
            } else {
                stats.mismatches += 1;
            }
        }
        Alignment { top, side, stats }
    }
}

/// The iterative walk from one start cell. `(start_col, start_row)` bounds
/// the subtable; the traversal ends when the start cell itself has every
/// direction exhausted.
fn walk_subtable(
    computation: &mut Computation<'_>,
    buffers: &mut SolutionBuffers,
    start_col: usize,
    start_row: usize,
    leader_len: usize,
    mark_optimal_path: bool,
    sink: &mut dyn AlignmentSink,
) {
    let top = computation.top.as_bytes();
    let side = computation.side.as_bytes();
    let mut col = start_col;
    let mut row = start_row;
    let mut n = leader_len;

    loop {
        let cell = computation.walk[[col, row]];
        if col == start_col && row == start_row && cell.all_done() {
            break;
        }

        if mark_optimal_path {
            computation.walk[[col, row]].in_optimal_path = true;
        }

        // A cell with no way further back completes a solution.
        if !cell.has_pointers() {
            let count = buffers.write_trailer(computation, col, row, n);
            let alignment = buffers.solution(count);
            computation.inc_solution_count();
            sink.emit(&alignment);
        }

        if cell.all_done() {
            // Every branch below this cell is exhausted: restore the cell
            // for future passes and back out into the parent, retiring the
            // direction we came in by.
            computation.walk[[col, row]].reset_done();
            match cell.src {
                Some(Direction::Up) => {
                    row += 1;
                    computation.walk[[col, row]].up_done = true;
                }
                Some(Direction::Left) => {
                    col += 1;
                    computation.walk[[col, row]].left_done = true;
                }
                Some(Direction::Diag) => {
                    col += 1;
                    row += 1;
                    computation.walk[[col, row]].diag_done = true;
                }
                None => unreachable!("backtrack from a cell that was never descended into"),
            }
            n -= 1;
        } else if cell.diag && !cell.diag_done {
            buffers.x[n] = top[col - 1];
            buffers.y[n] = side[row - 1];
            col -= 1;
            row -= 1;
            computation.walk[[col, row]].src = Some(Direction::Diag);
            n += 1;
        } else if cell.left && !cell.left_done {
            buffers.x[n] = top[col - 1];
            buffers.y[n] = GAP;
            col -= 1;
            computation.walk[[col, row]].src = Some(Direction::Left);
            n += 1;
        } else if cell.up && !cell.up_done {
            buffers.x[n] = GAP;
            buffers.y[n] = side[row - 1];
            row -= 1;
            computation.walk[[col, row]].src = Some(Direction::Up);
            n += 1;
        } else {
            unreachable!("walk cell with open direction but no matching pointer");
        }
    }
}
