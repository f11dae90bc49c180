//! Plain-text rendering for terminal output.

use std::fmt::Write;

use crate::types::{SweetView, UserView};

/// Format minor units as a decimal amount (`450` -> `4.50`).
pub fn format_price(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Render sweets as an aligned table. Empty input renders a single notice line.
pub fn render_sweets(sweets: &[SweetView]) -> String {
    if sweets.is_empty() {
        return "no sweets found\n".to_string();
    }

    let headers = ["ID", "NAME", "CATEGORY", "PRICE", "QTY"];
    let rows: Vec<[String; 5]> = sweets
        .iter()
        .map(|s| {
            [
                s.id.to_string(),
                s.name.clone(),
                s.category.clone(),
                format_price(s.price),
                s.quantity.to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers.map(String::from), &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line = cells
        .iter()
        .zip(widths.iter())
        .enumerate()
        .map(|(i, (cell, &w))| {
            // Numeric columns are right-aligned.
            if i >= 3 {
                format!("{cell:>w$}")
            } else {
                format!("{cell:<w$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

pub fn render_user(user: &UserView) -> String {
    format!("{} ({}) id={}\n", user.email, user.role, user.id)
}
