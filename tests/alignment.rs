//! End-to-end behavior of the alignment engine through the public API.

use pairalign::{
    run_alignment, Alignment, AlignmentKind, AlignmentSink, ScoringSchema, Sequence, Summary,
    TableCell,
};

struct CollectSink(Vec<Alignment>);

impl AlignmentSink for CollectSink {
    fn emit(&mut self, alignment: &Alignment) {
        self.0.push(alignment.clone());
    }
}

fn align(
    top: &str,
    side: &str,
    (m, k, d): (i32, i32, i32),
    threads: usize,
    kind: AlignmentKind,
) -> (Summary, Vec<Alignment>) {
    let top = Sequence::new(top).unwrap();
    let side = Sequence::new(side).unwrap();
    let mut sink = CollectSink(Vec::new());
    let summary = run_alignment(
        &top,
        &side,
        ScoringSchema::new(m, k, d),
        threads,
        kind,
        true,
        &mut sink,
    )
    .unwrap();
    (summary, sink.0)
}

fn strip_gaps(aligned: &str) -> String {
    aligned.chars().filter(|c| *c != '-').collect()
}

/// Score of an emitted global alignment under the scoring function.
fn rescore(alignment: &Alignment, (m, k, d): (i32, i32, i32)) -> i32 {
    alignment
        .top
        .bytes()
        .zip(alignment.side.bytes())
        .map(|(a, b)| {
            if a == b'-' || b == b'-' {
                -d
            } else if a == b {
                m
            } else {
                -k
            }
        })
        .sum()
}

fn sorted_pairs(alignments: &[Alignment]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = alignments
        .iter()
        .map(|a| (a.top.clone(), a.side.clone()))
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn global_wikipedia_example_has_three_co_optimal_alignments() {
    let costs = (1, 1, 1);
    let (summary, alignments) =
        align("GCATGCU", "GATTACA", costs, 1, AlignmentKind::Global);

    assert_eq!(0, summary.optimal_score());
    assert_eq!(3, summary.solution_count());
    assert_eq!(3, alignments.len());
    assert!(sorted_pairs(&alignments).contains(&("GCATG-CU".into(), "G-ATTACA".into())));

    for alignment in &alignments {
        assert_eq!(alignment.top.len(), alignment.side.len());
        assert!(alignment.top.len() <= 7 + 7);
        assert_eq!("GCATGCU", strip_gaps(&alignment.top));
        assert_eq!("GATTACA", strip_gaps(&alignment.side));
        assert_eq!(summary.optimal_score(), rescore(alignment, costs));
    }
}

#[test]
fn identical_sequences_align_to_themselves() {
    let (summary, alignments) = align("AAA", "AAA", (1, 1, 2), 1, AlignmentKind::Global);
    assert_eq!(3, summary.optimal_score());
    assert_eq!(1, summary.solution_count());
    assert_eq!("AAA", alignments[0].top);
    assert_eq!("AAA", alignments[0].side);
    assert_eq!(3, alignments[0].stats.matches);
}

#[test]
fn one_empty_sequence_pairs_against_gaps() {
    let (summary, alignments) = align("ABC", "", (1, 1, 1), 1, AlignmentKind::Global);
    assert_eq!(-3, summary.optimal_score());
    assert_eq!(1, summary.solution_count());
    assert_eq!("ABC", alignments[0].top);
    assert_eq!("---", alignments[0].side);
}

#[test]
fn local_example_contains_known_segment() {
    let (summary, alignments) =
        align("TGTTACGG", "GGTTGACTA", (3, 3, 2), 1, AlignmentKind::Local);
    assert_eq!(13, summary.optimal_score());
    assert_eq!(summary.solution_count() as usize, alignments.len());
    assert!(alignments
        .iter()
        .any(|a| a.top.contains("GTT-AC") && a.side.contains("GTTGAC")));
}

#[test]
fn parallel_and_serial_runs_are_equivalent() {
    for kind in [AlignmentKind::Global, AlignmentKind::Local] {
        let (serial_summary, serial_alignments) =
            align("GCATGCU", "GATTACA", (1, 1, 1), 1, kind);
        for threads in [2, 4] {
            let (parallel_summary, parallel_alignments) =
                align("GCATGCU", "GATTACA", (1, 1, 1), threads, kind);

            assert_eq!(
                serial_summary.solution_count(),
                parallel_summary.solution_count()
            );
            assert_eq!(
                serial_summary.optimal_score(),
                parallel_summary.optimal_score()
            );
            assert_eq!(
                serial_summary.branch_count(),
                parallel_summary.branch_count()
            );
            assert_eq!(
                sorted_pairs(&serial_alignments),
                sorted_pairs(&parallel_alignments)
            );

            // element-wise equality of the full tables, pointers included
            let serial_cells: Vec<TableCell> = serial_summary.table().cells().collect();
            let parallel_cells: Vec<TableCell> = parallel_summary.table().cells().collect();
            assert_eq!(serial_cells, parallel_cells);
        }
    }
}

#[test]
fn branchless_input_has_one_solution() {
    let (summary, alignments) = align("AT", "AT", (1, 100, 1), 1, AlignmentKind::Global);
    assert_eq!(0, summary.branch_count());
    assert_eq!(1, summary.solution_count());
    assert_eq!("AT", alignments[0].top);
    assert_eq!("AT", alignments[0].side);
}

#[test]
fn branch_count_matches_multi_pointer_cells() {
    let (summary, _) = align("GCATGCU", "GATTACA", (1, 1, 1), 1, AlignmentKind::Global);
    let multi_pointer_cells = summary
        .table()
        .cells()
        .filter(|c| (c.diag as u8 + c.up as u8 + c.left as u8) > 1)
        .count() as u64;
    assert_eq!(multi_pointer_cells, summary.branch_count());
}

#[test]
fn expensive_gaps_force_gapless_alignment() {
    let (summary, alignments) = align("AAA", "TTT", (1, 1, 100), 1, AlignmentKind::Global);
    assert_eq!(-3, summary.optimal_score());
    assert_eq!(1, alignments.len());
    assert!(!alignments[0].top.contains('-'));
    assert!(!alignments[0].side.contains('-'));
    assert_eq!(3, alignments[0].stats.mismatches);
}

#[test]
fn swapping_inputs_transposes_the_alignments() {
    let (_, forward) = align("GCATGCU", "GATTACA", (1, 1, 1), 1, AlignmentKind::Global);
    let (_, backward) = align("GATTACA", "GCATGCU", (1, 1, 1), 1, AlignmentKind::Global);

    let mut transposed: Vec<(String, String)> = backward
        .iter()
        .map(|a| (a.side.clone(), a.top.clone()))
        .collect();
    transposed.sort();
    assert_eq!(sorted_pairs(&forward), transposed);
}

#[test]
fn repeated_runs_emit_identical_output() {
    for threads in [1, 4] {
        let (first_summary, first) =
            align("TGTTACGG", "GGTTGACTA", (3, 3, 2), threads, AlignmentKind::Local);
        let (second_summary, second) =
            align("TGTTACGG", "GGTTGACTA", (3, 3, 2), threads, AlignmentKind::Local);
        assert_eq!(first, second);
        assert_eq!(first_summary.solution_count(), second_summary.solution_count());
    }
}

#[test]
fn local_run_over_dissimilar_sequences_finds_nothing() {
    let (summary, alignments) = align("AAA", "TTT", (1, 5, 5), 1, AlignmentKind::Local);
    assert_eq!(0, summary.optimal_score());
    assert_eq!(0, summary.solution_count());
    assert!(alignments.is_empty());
}

#[test]
fn emission_counts_match_solution_count() {
    let (summary, alignments) = align("GCATGCU", "GATTACA", (1, 1, 1), 4, AlignmentKind::Global);
    assert_eq!(summary.solution_count() as usize, alignments.len());
}
