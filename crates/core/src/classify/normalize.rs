//! Failure text normalization for table embedding.

use std::fmt::Display;

/// Render a failure as a single line safe to place in a pipe-delimited table.
///
/// Line breaks, carriage returns and tabs become spaces, whitespace runs
/// collapse to one space, the ends are trimmed and the `|` delimiter is
/// escaped as `\|`.
pub fn normalize(error: &dyn Display) -> String {
    let text = error.to_string();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace('|', "\\|")
}
