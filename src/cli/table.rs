/// Describes how a column should align its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableColumn {
    pub header: String,
    pub alignment: Alignment,
}

impl TableColumn {
    pub fn left(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            alignment: Alignment::Left,
        }
    }

    pub fn right(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            alignment: Alignment::Right,
        }
    }
}

/// Plain-text table. The widest left-aligned column shrinks when the terminal is narrow.
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

const MIN_TRUNCATED_WIDTH: usize = 8;
const FALLBACK_TERMINAL_WIDTH: usize = 120;

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn compute_widths(&self, max_total: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .fold(column.header.chars().count(), usize::max)
            })
            .collect();

        let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        if total > max_total {
            let widest_left = widths
                .iter()
                .enumerate()
                .filter(|(idx, _)| self.columns[*idx].alignment == Alignment::Left)
                .max_by_key(|(_, width)| **width)
                .map(|(idx, _)| idx);
            if let Some(idx) = widest_left {
                let excess = total - max_total;
                widths[idx] = widths[idx].saturating_sub(excess).max(MIN_TRUNCATED_WIDTH);
            }
        }
        widths
    }

    pub fn render_with_width(&self, max_total: usize) -> String {
        let widths = self.compute_widths(max_total);
        let header: Vec<String> = self.columns.iter().map(|c| c.header.clone()).collect();
        let mut lines = vec![self.render_row(&header, &widths)];
        lines.push(
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &self.rows {
            lines.push(self.render_row(row, &widths));
        }
        lines.join("\n")
    }

    /// Renders against the current terminal width.
    pub fn render(&self) -> String {
        let width = crossterm::terminal::size()
            .map(|(cols, _)| usize::from(cols))
            .unwrap_or(FALLBACK_TERMINAL_WIDTH);
        self.render_with_width(width)
    }

    fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        self.columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (column, width))| {
                let cell = truncate(row.get(idx).map(String::as_str).unwrap_or(""), *width);
                match column.alignment {
                    Alignment::Left => format!("{cell:<width$}"),
                    Alignment::Right => format!("{cell:>width$}"),
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec![
            TableColumn::right("#"),
            TableColumn::left("Category"),
            TableColumn::right("Amount"),
        ]);
        table.push(vec!["1".into(), "Rent (shared)".into(), "$480.000".into()]);
        table.push(vec!["2".into(), "Gym".into(), "$30.000".into()]);
        table
    }

    #[test]
    fn columns_are_aligned() {
        let rendered = sample().render_with_width(200);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "#  Category         Amount");
        assert_eq!(lines[2], "1  Rent (shared)  $480.000");
        assert_eq!(lines[3], "2  Gym             $30.000");
    }

    #[test]
    fn narrow_terminals_truncate_the_widest_text_column() {
        let rendered = sample().render_with_width(20);
        assert!(rendered.contains("Rent (s~"));
    }
}
