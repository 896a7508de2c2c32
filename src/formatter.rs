//! Semantic output formatting: maps format tags to ANSI escapes.

use crossterm::style::Stylize;

/// Semantic roles a printed fragment can take. The colorizer decides how
/// each role looks; callers never emit escape sequences themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    /// The first input sequence, printed along the top of the table.
    TopString,
    /// The second input sequence, printed along the side of the table.
    SideString,
    /// A score on a cell some co-optimal alignment passes through.
    OptimalPath,
    /// A matching character pair, or the arrow of a matching diagonal step.
    Match,
    /// A mismatching character pair, or its arrow.
    Mismatch,
    /// A gap character, or the arrow of an indel step.
    Gap,
}

/// Applies ANSI styling for a tag, or passes text through untouched when
/// colorizing is off.
pub struct Formatter {
    colorize: bool,
}

impl Formatter {
    pub fn new(colorize: bool) -> Self {
        Self { colorize }
    }

    pub fn paint(&self, tag: Tag, text: &str) -> String {
        if !self.colorize {
            return text.to_string();
        }
        let styled = match tag {
            Tag::TopString | Tag::SideString => text.bold(),
            Tag::OptimalPath => text.green().bold(),
            Tag::Match => text.cyan().bold(),
            Tag::Mismatch => text.red().bold(),
            Tag::Gap => text.yellow().bold(),
        };
        styled.to_string()
    }
}
