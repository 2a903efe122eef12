//! Table rendering for formatted output.

/// A simple box-drawn table.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl Table {
    pub fn new(headers: Vec<&str>) -> Self {
        let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        let column_widths = headers.iter().map(|h| h.chars().count()).collect();

        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = self.column_widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            self.render_border('┌', '┬', '┐'),
            self.render_row(&self.headers),
            self.render_border('├', '┼', '┤'),
        ];
        lines.extend(self.rows.iter().map(|row| self.render_row(row)));
        lines.push(self.render_border('└', '┴', '┘'));
        lines.join("\n")
    }

    fn render_border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self
            .column_widths
            .iter()
            .map(|width| "─".repeat(width + 2))
            .collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut s = String::from("│");
        for (i, width) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            let padding = width - cell.chars().count();
            s.push_str(&format!(" {}{} │", cell, " ".repeat(padding)));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_rows_with_borders() {
        let mut table = Table::new(vec!["Component", "Commands"]);
        table.add_row(vec!["git".to_string(), "install, verify".to_string()]);
        table.add_row(vec!["sdkman".to_string()]);

        let output = table.render();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "┌───────────┬─────────────────┐");
        assert_eq!(lines[3], "│ git       │ install, verify │");
        assert_eq!(lines[4], "│ sdkman    │                 │");
    }
}
