//! Global and local pairwise sequence alignment.
//!
//! Scores the classical dynamic-programming table — optionally in parallel,
//! with one long-lived worker per column stripe — and then enumerates *all*
//! co-optimal alignments by an iterative walk over the back-pointer matrix.
//! The `needleman-wunsch` and `smith-waterman` binaries wrap the same engine
//! for globally and locally optimal alignment respectively.

pub mod aligner;
pub mod bioseq;
pub mod cli;
pub mod formatter;
pub mod matrix;
pub mod reader;
pub mod scoring;
pub mod table;

pub use aligner::{
    run_alignment, AlignError, Alignment, AlignmentKind, AlignmentSink, AlignmentStats, Summary,
};
pub use bioseq::Sequence;
pub use scoring::ScoringSchema;
pub use table::{TableCell, TableView};
