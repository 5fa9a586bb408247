//! Boxed tables for the workout and store listings.

use console::measure_text_width;

/// A simple table for formatted output.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    widths: Vec<usize>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let widths = headers.iter().map(|h| measure_text_width(h)).collect();

        Self {
            headers,
            rows: Vec::new(),
            widths,
        }
    }

    /// Add a row. Cells past the header count are dropped.
    pub fn add_row<S: AsRef<str>>(&mut self, cells: &[S]) {
        let row: Vec<String> = cells
            .iter()
            .take(self.headers.len())
            .map(|c| c.as_ref().to_string())
            .collect();

        for (width, cell) in self.widths.iter_mut().zip(&row) {
            *width = (*width).max(measure_text_width(cell));
        }

        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(self.border('┌', '┬', '┐'));
        lines.push(self.line(&self.headers));
        lines.push(self.border('├', '┼', '┤'));
        lines.extend(self.rows.iter().map(|row| self.line(row)));
        lines.push(self.border('└', '┴', '┘'));
        lines.join("\n")
    }

    fn border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self.widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    }

    fn line(&self, cells: &[String]) -> String {
        let mut s = String::from("│");
        for (i, width) in self.widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = width - measure_text_width(cell);
            s.push_str(&format!(" {}{} │", cell, " ".repeat(pad)));
        }
        s
    }
}
