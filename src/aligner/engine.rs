//! Scoring engine: fills the score and walk matrices.
//!
//! The parallel fill partitions columns round-robin over `p` long-lived
//! workers; worker `w` owns columns `w+1, w+1+p, …` and scores each
//! top-to-bottom. Within a column the previous row is the worker's own last
//! write, and the diagonal predecessor is the left-neighbor score of the
//! previous row, so both ride along in locals. The only cross-worker
//! synchronization in the inner loop is the wait for the left neighbor's
//! "ready" condition: once `(c-1, r)` is ready, every earlier cell of column
//! `c-1` is ready too, which is what makes the unsynchronized diagonal read
//! sound.

use std::sync::RwLock;
use std::thread;

use tracing::debug;

use crate::aligner::score_table::{self, ScoreCell, SharedScoreTable};
use crate::aligner::walk_table::{self, SharedWalkTable, WalkCell};
use crate::aligner::AlignmentKind;
use crate::matrix::Matrix;
use crate::scoring::ScoringSchema;

/// Everything the scoring step produces.
pub(crate) struct FillOutcome {
    pub scores: Matrix<ScoreCell>,
    pub walk: Matrix<WalkCell>,
    /// Greatest absolute score in the interior of the table. Defines the
    /// LOCAL start-cell set and the printed column width.
    pub greatest_abs_score: i32,
    /// Number of cells with two or more back-pointers.
    pub branch_count: u64,
}

/// Scores one interior cell and derives its walk cell.
///
/// `diag_src`, `up_src` and `left_src` are the already-final scores of the
/// three predecessors.
fn resolve_cell(
    top_char: u8,
    side_char: u8,
    diag_src: i32,
    up_src: i32,
    left_src: i32,
    schema: &ScoringSchema,
    kind: AlignmentKind,
) -> (i32, WalkCell) {
    let diag_score = diag_src + schema.substitution(top_char, side_char);
    let up_score = up_src + schema.indel();
    let left_score = left_src + schema.indel();

    let best = diag_score.max(up_score).max(left_score);
    if kind == AlignmentKind::Local && best <= 0 {
        // Zero ends every local path; the cell offers no way further back.
        return (0, WalkCell::exhausted());
    }

    let cell = WalkCell::with_pointers(
        best == diag_score,
        best == left_score,
        best == up_score,
    );
    (best, cell)
}

pub(crate) fn fill(
    top: &[u8],
    side: &[u8],
    schema: &ScoringSchema,
    kind: AlignmentKind,
    threads: usize,
) -> FillOutcome {
    let cols = top.len() + 1;
    let rows = side.len() + 1;
    if threads > 1 {
        fill_parallel(top, side, schema, kind, threads, cols, rows)
    } else {
        fill_serial(top, side, schema, kind, cols, rows)
    }
}

/// Single-threaded fill. Same recurrence and scan order as one worker that
/// owns every column; no synchronization primitive is ever constructed.
fn fill_serial(
    top: &[u8],
    side: &[u8],
    schema: &ScoringSchema,
    kind: AlignmentKind,
    cols: usize,
    rows: usize,
) -> FillOutcome {
    let mut scores = score_table::new_plain(kind, schema.indel(), cols, rows);
    let mut walk = walk_table::new_plain(kind, cols, rows);
    let mut greatest_abs_score = 0;
    let mut branch_count = 0;

    for col in 1..cols {
        for row in 1..rows {
            let (score, cell) = resolve_cell(
                top[col - 1],
                side[row - 1],
                scores[[col - 1, row - 1]].score,
                scores[[col, row - 1]].score,
                scores[[col - 1, row]].score,
                schema,
                kind,
            );
            scores[[col, row]] = ScoreCell { score, ready: true };
            walk[[col, row]] = cell;
            if cell.is_branch() {
                branch_count += 1;
            }
            greatest_abs_score = greatest_abs_score.max(score.abs());
        }
    }

    FillOutcome {
        scores,
        walk,
        greatest_abs_score,
        branch_count,
    }
}

fn fill_parallel(
    top: &[u8],
    side: &[u8],
    schema: &ScoringSchema,
    kind: AlignmentKind,
    threads: usize,
    cols: usize,
    rows: usize,
) -> FillOutcome {
    let scores = SharedScoreTable::new(kind, schema.indel(), cols, rows);
    let walk = SharedWalkTable::new(kind, cols, rows);
    let branch_count = RwLock::new(0u64);
    let mut greatest_abs_score = 0;

    debug!(workers = threads, "spawning scoring workers");
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(threads);
        for worker in 0..threads {
            let scores = &scores;
            let walk = &walk;
            let branch_count = &branch_count;
            handles.push(scope.spawn(move || {
                let mut local_abs = 0i32;
                let mut col = worker + 1;
                while col < cols {
                    let mut column = walk.lock_column(col);
                    let mut diag_src = scores.read_score(col - 1, 0);
                    let mut up_src = scores.read_score(col, 0);
                    for row in 1..rows {
                        let left_src = scores.wait_score(col - 1, row);
                        let (score, cell) = resolve_cell(
                            top[col - 1],
                            side[row - 1],
                            diag_src,
                            up_src,
                            left_src,
                            schema,
                            kind,
                        );
                        scores.publish(col, row, score);
                        column[row] = cell;
                        if cell.is_branch() {
                            *branch_count.write().expect("branch count lock poisoned") += 1;
                        }
                        local_abs = local_abs.max(score.abs());
                        diag_src = left_src;
                        up_src = score;
                    }
                    drop(column);
                    col += threads;
                }
                local_abs
            }));
        }
        // Join fence: scoring is complete once every worker has returned.
        for handle in handles {
            let local_abs = handle.join().expect("scoring worker panicked");
            greatest_abs_score = greatest_abs_score.max(local_abs);
        }
    });

    let branch_count = branch_count
        .into_inner()
        .expect("branch count lock poisoned");
    debug!(branches = branch_count, "scoring workers joined");

    FillOutcome {
        scores: scores.into_plain(),
        walk: walk.into_plain(),
        greatest_abs_score,
        branch_count,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // the common m=1, k=1, d=1 schema
    fn unit_schema() -> ScoringSchema {
        ScoringSchema::new(1, 1, 1)
    }

    fn recurrence_holds(
        outcome: &FillOutcome,
        top: &[u8],
        side: &[u8],
        schema: &ScoringSchema,
        kind: AlignmentKind,
    ) {
        let [cols, rows] = outcome.scores.dim();
        for col in 1..cols {
            for row in 1..rows {
                let (expected, _) = resolve_cell(
                    top[col - 1],
                    side[row - 1],
                    outcome.scores[[col - 1, row - 1]].score,
                    outcome.scores[[col, row - 1]].score,
                    outcome.scores[[col - 1, row]].score,
                    schema,
                    kind,
                );
                assert_eq!(expected, outcome.scores[[col, row]].score, "at ({col}, {row})");
                assert!(outcome.scores[[col, row]].ready);
            }
        }
    }

    #[test]
    fn global_corner_scores_wikipedia_example() {
        let schema = unit_schema();
        let outcome = fill(b"GCATGCU", b"GATTACA", &schema, AlignmentKind::Global, 1);
        assert_eq!(0, outcome.scores[[7, 7]].score);
        recurrence_holds(
            &outcome,
            b"GCATGCU",
            b"GATTACA",
            &schema,
            AlignmentKind::Global,
        );
    }

    #[test]
    fn local_scores_clamp_at_zero() {
        let schema = ScoringSchema::new(1, 5, 5);
        let outcome = fill(b"AAA", b"TTT", &schema, AlignmentKind::Local, 1);
        let [cols, rows] = outcome.scores.dim();
        for col in 1..cols {
            for row in 1..rows {
                assert_eq!(0, outcome.scores[[col, row]].score);
                assert!(!outcome.walk[[col, row]].has_pointers());
                assert!(outcome.walk[[col, row]].all_done());
            }
        }
        assert_eq!(0, outcome.greatest_abs_score);
    }

    #[test]
    fn local_maximum_matches_smith_waterman_example() {
        let schema = ScoringSchema::new(3, 3, 2);
        let outcome = fill(
            b"TGTTACGG",
            b"GGTTGACTA",
            &schema,
            AlignmentKind::Local,
            1,
        );
        assert_eq!(13, outcome.greatest_abs_score);
    }

    #[test]
    fn unique_diagonal_has_no_branches() {
        let schema = ScoringSchema::new(1, 100, 1);
        let outcome = fill(b"AT", b"AT", &schema, AlignmentKind::Global, 1);
        assert_eq!(0, outcome.branch_count);
        assert!(outcome.walk[[2, 2]].diag);
        assert!(!outcome.walk[[2, 2]].left && !outcome.walk[[2, 2]].up);
    }

    #[test]
    fn branch_count_equals_multi_pointer_cells() {
        let outcome = fill(
            b"GCATGCU",
            b"GATTACA",
            &unit_schema(),
            AlignmentKind::Global,
            1,
        );
        let [cols, rows] = outcome.walk.dim();
        let mut expected = 0;
        for col in 1..cols {
            for row in 1..rows {
                if outcome.walk[[col, row]].is_branch() {
                    expected += 1;
                }
            }
        }
        assert_eq!(expected, outcome.branch_count);
    }

    #[test]
    fn parallel_fill_matches_serial_fill() {
        for kind in [AlignmentKind::Global, AlignmentKind::Local] {
            let schema = unit_schema();
            let serial = fill(b"GCATGCU", b"GATTACA", &schema, kind, 1);
            for threads in [2, 4, 13] {
                let parallel = fill(b"GCATGCU", b"GATTACA", &schema, kind, threads);
                let [cols, rows] = serial.scores.dim();
                assert_eq!([cols, rows], parallel.scores.dim());
                for col in 0..cols {
                    for row in 0..rows {
                        assert_eq!(
                            serial.scores[[col, row]],
                            parallel.scores[[col, row]],
                            "score at ({col}, {row}), {threads} threads"
                        );
                        assert_eq!(
                            serial.walk[[col, row]],
                            parallel.walk[[col, row]],
                            "walk cell at ({col}, {row}), {threads} threads"
                        );
                    }
                }
                assert_eq!(serial.greatest_abs_score, parallel.greatest_abs_score);
                assert_eq!(serial.branch_count, parallel.branch_count);
            }
        }
    }

    #[test]
    fn empty_sequences_leave_only_borders() {
        let schema = unit_schema();
        let outcome = fill(b"ABC", b"", &schema, AlignmentKind::Global, 1);
        assert_eq!([4, 1], outcome.scores.dim());
        assert_eq!(-3, outcome.scores[[3, 0]].score);
        let parallel = fill(b"ABC", b"", &schema, AlignmentKind::Global, 4);
        assert_eq!(-3, parallel.scores[[3, 0]].score);
    }
}
