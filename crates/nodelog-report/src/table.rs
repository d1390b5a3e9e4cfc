//! Plain-text tables for terminal reports.
//!
//! Columns are right aligned and separated by `" | "`, with a dashed rule
//! under the header. Widths are measured in terminal cells so node names with
//! wide characters still line up.

use unicode_width::UnicodeWidthStr;

/// A header row plus data rows, all rendered as strings.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with empty cells; extra cells are
    /// dropped.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .map(Into::into)
            .take(self.headers.len())
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let rule: Vec<String> = self
            .headers
            .iter()
            .map(|h| "-".repeat(h.width()))
            .collect();

        let mut out = String::new();
        push_line(&mut out, &self.headers, &widths);
        push_line(&mut out, &rule, &widths);
        for row in &self.rows {
            push_line(&mut out, row, &widths);
        }
        out
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.width());
            }
        }
        widths
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{}{}", " ".repeat(w - cell.width()), cell))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}
