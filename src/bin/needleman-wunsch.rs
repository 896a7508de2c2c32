//! Globally optimal sequence alignment (Needleman-Wunsch).

use pairalign::aligner::AlignmentKind;

fn main() {
    if let Err(err) = pairalign::cli::run(AlignmentKind::Global) {
        eprintln!("needleman-wunsch: {err:#}");
        std::process::exit(1);
    }
}
