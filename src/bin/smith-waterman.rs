//! Locally optimal sequence alignment (Smith-Waterman).

use pairalign::aligner::AlignmentKind;

fn main() {
    if let Err(err) = pairalign::cli::run(AlignmentKind::Local) {
        eprintln!("smith-waterman: {err:#}");
        std::process::exit(1);
    }
}
