//! Template assembly: nested text fragments flattened into indented source.
//!
//! Code templates are built as trees of [`Fragment`]s. A line may itself
//! contain newlines (handy for verbatim chunks of boilerplate); every physical
//! line it contains is indented when the fragment is flattened. The layer
//! knows nothing about the language being generated.
//!
//! # Examples
//!
//! ```
//! use formgen::template::{as_string, indent, Fragment};
//!
//! let fragment = Fragment::from(vec![
//!     Fragment::from("class Rental {"),
//!     indent(1, vec!["price = 0.0", "discount = 0"]),
//!     Fragment::from("}"),
//! ]);
//!
//! assert_eq!(
//!     as_string(&fragment),
//!     "class Rental {\n    price = 0.0\n    discount = 0\n}"
//! );
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// A line of text or an ordered sequence of fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Line(String),
    Sequence(Vec<Fragment>),
    /// Indents every contained line by the given number of units
    Indented(usize, Box<Fragment>),
}

impl From<&str> for Fragment {
    fn from(s: &str) -> Self {
        Fragment::Line(s.to_string())
    }
}

impl From<String> for Fragment {
    fn from(s: String) -> Self {
        Fragment::Line(s)
    }
}

impl<T: Into<Fragment>> From<Vec<T>> for Fragment {
    fn from(items: Vec<T>) -> Self {
        Fragment::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Indents `fragment` by `levels` units.
pub fn indent(levels: usize, fragment: impl Into<Fragment>) -> Fragment {
    Fragment::Indented(levels, Box::new(fragment.into()))
}

/// Flattens `fragment` using 4-space indentation units.
pub fn as_string(fragment: &Fragment) -> String {
    TemplatePrinter::default().print(fragment)
}

/// Flattens fragments into text.
#[derive(Debug, Clone, Copy)]
pub struct TemplatePrinter {
    indent_width: usize,
}

impl Default for TemplatePrinter {
    fn default() -> Self {
        TemplatePrinter::new(4)
    }
}

impl TemplatePrinter {
    pub fn new(indent_width: usize) -> Self {
        TemplatePrinter { indent_width }
    }

    /// Depth-first flattening; lines are joined with newlines. Empty lines get
    /// no indentation.
    pub fn print(&self, fragment: &Fragment) -> String {
        let mut lines = Vec::new();
        self.collect_lines(fragment, 0, &mut lines);
        lines.join("\n")
    }

    fn collect_lines(&self, fragment: &Fragment, level: usize, lines: &mut Vec<String>) {
        match fragment {
            Fragment::Line(text) => {
                for line in text.split('\n') {
                    if line.is_empty() {
                        lines.push(String::new());
                    } else {
                        lines.push(format!("{}{}", self.indent(level), line));
                    }
                }
            }
            Fragment::Sequence(items) => {
                for item in items {
                    self.collect_lines(item, level, lines);
                }
            }
            Fragment::Indented(levels, inner) => self.collect_lines(inner, level + levels, lines),
        }
    }

    fn indent(&self, level: usize) -> String {
        " ".repeat(level * self.indent_width)
    }
}

static WORD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("word separator pattern is valid"));

/// Turns a display name into a camel-cased identifier: `"rental price"` →
/// `rentalPrice`.
pub fn camel_case(name: &str) -> String {
    WORD_SEPARATOR
        .split(name)
        .filter(|word| !word.is_empty())
        .enumerate()
        .map(|(index, word)| {
            let word = word.to_lowercase();
            if index == 0 { word } else { with_first_upper(&word) }
        })
        .collect()
}

/// Upper-cases the first character.
pub fn with_first_upper(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
