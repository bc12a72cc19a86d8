//! Console output helpers for the `snake-matrix` tool.

use console::{style, Emoji};
use nalgebra::DMatrix;
use std::fmt::Display;

pub static CHECK: Emoji<'static, 'static> = Emoji("✓", "+");
pub static CROSS: Emoji<'static, 'static> = Emoji("✗", "x");

const RULE_WIDTH: usize = 72;
const LABEL_WIDTH: usize = 20;

pub fn check_icon() -> String {
    style(format!("{}", CHECK)).green().to_string()
}

pub fn cross_icon() -> String {
    style(format!("{}", CROSS)).red().to_string()
}

pub fn bold<T: AsRef<str>>(text: T) -> String {
    style(text.as_ref()).bold().to_string()
}

pub fn error<T: AsRef<str>>(text: T) -> String {
    style(text.as_ref()).red().to_string()
}

pub fn warning<T: AsRef<str>>(text: T) -> String {
    style(text.as_ref()).color256(214).bold().to_string()
}

pub fn success<T: AsRef<str>>(text: T) -> String {
    style(text.as_ref()).green().to_string()
}

pub fn highlight<T: AsRef<str>>(text: T) -> String {
    style(text.as_ref()).blue().bold().to_string()
}

pub fn light<T: AsRef<str>>(text: T) -> String {
    style(text.as_ref()).color256(245).to_string()
}

pub fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

pub fn double_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Tool name and version followed by a one-line description.
pub fn banner(name: &str, version: &str, tagline: &str) -> String {
    format!(
        "\n{}\n{}\n{}\n{}\n",
        format!("{} {}", highlight(name), version),
        rule(),
        tagline,
        double_rule()
    )
}

/// An indented `label: value` line aligned with the other rows.
pub fn field<V: Display>(label: &str, value: V) -> String {
    format!("  {:<width$} {}", format!("{}:", label), value, width = LABEL_WIDTH)
}

/// Renders a matrix row by row in scientific notation.
pub fn format_matrix(matrix: &DMatrix<f64>, precision: usize) -> String {
    matrix
        .row_iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .map(|v| format!("{:>width$.precision$e}", v, width = precision + 8, precision = precision))
                .collect();
            format!("  {}", cells.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
