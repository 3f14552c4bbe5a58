use std::fmt::Write as _;

/// How a column pads its cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Column-typed text table.
///
/// Only the last left-aligned column shrinks when `max_width` is set; counts
/// and scores are never cut.
#[derive(Debug)]
pub struct Table {
    columns: Vec<(&'static str, Align)>,
    rows: Vec<Vec<String>>,
    level_column: Option<usize>,
    color: bool,
}

impl Table {
    #[must_use]
    pub fn new(columns: &[(&'static str, Align)]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: Vec::new(),
            level_column: None,
            color: false,
        }
    }

    /// Paint the cells of `column` as risk levels once they are padded.
    #[must_use]
    pub fn with_levels(mut self, column: usize, color: bool) -> Self {
        self.level_column = Some(column);
        self.color = color;
        self
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn render(&self, max_width: Option<usize>) -> String {
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, (title, _))| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(index))
                    .map(|cell| cell.chars().count())
                    .fold(title.len(), usize::max)
            })
            .collect();

        if let Some(limit) = max_width {
            self.shrink_text_column(&mut widths, limit);
        }

        let titles: Vec<String> = self.columns.iter().map(|(t, _)| (*t).to_string()).collect();
        let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let mut out = self.line(&titles, &widths, false);
        out.push('\n');
        out.push_str(&"=".repeat(total));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&self.line(row, &widths, true));
        }
        out
    }

    fn shrink_text_column(&self, widths: &mut [usize], limit: usize) {
        let Some(index) = self
            .columns
            .iter()
            .rposition(|(_, align)| *align == Align::Left)
        else {
            return;
        };
        let others: usize = widths
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, w)| w + 2)
            .sum();
        let room = limit.saturating_sub(others).max(self.columns[index].0.len());
        widths[index] = widths[index].min(room);
    }

    fn line(&self, cells: &[String], widths: &[usize], body: bool) -> String {
        let mut line = String::new();
        for (index, ((_, align), width)) in self.columns.iter().zip(widths).enumerate() {
            if index > 0 {
                line.push_str("  ");
            }
            let cell = clip(cells.get(index).map_or("", String::as_str), *width);
            let mut padded = String::with_capacity(*width);
            let _ = match align {
                Align::Left => write!(padded, "{cell:<width$}"),
                Align::Right => write!(padded, "{cell:>width$}"),
            };
            if body && self.level_column == Some(index) {
                padded = padded.replacen(&cell, &paint_level(&cell, self.color), 1);
            }
            line.push_str(&padded);
        }
        line.trim_end().to_string()
    }
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Wrap a risk level or alert severity in its terminal color.
#[must_use]
pub fn paint_level(level: &str, color: bool) -> String {
    if !color {
        return level.to_string();
    }
    let code = match level {
        "CRITICAL" => "1;31",
        "HIGH" => "31",
        "MEDIUM" => "33",
        "LOW" => "32",
        _ => return level.to_string(),
    };
    format!("\u{1b}[{code}m{level}\u{1b}[0m")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Align, Table, paint_level};

    fn alerts() -> Table {
        let mut table = Table::new(&[
            ("SEVERITY", Align::Left),
            ("SCORE", Align::Right),
            ("ENTITY", Align::Left),
        ]);
        table.row(vec!["CRITICAL".into(), "4.5".into(), "Ivan Petrov".into()]);
        table.row(vec!["HIGH".into(), "82".into(), "Baltic Freight Holdings".into()]);
        table
    }

    #[test]
    fn scores_align_right_and_names_left() {
        let out = alerts().render(None);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "SEVERITY  SCORE  ENTITY");
        assert!(lines[1].chars().all(|c| c == '='));
        assert_eq!(lines[2], "CRITICAL    4.5  Ivan Petrov");
        assert_eq!(lines[3], "HIGH         82  Baltic Freight Holdings");
    }

    #[test]
    fn narrow_terminal_clips_only_the_entity_column() {
        let out = alerts().render(Some(30));
        assert!(out.contains("Baltic Fre..."));
        assert!(out.contains("CRITICAL"));
        assert!(out.lines().all(|line| line.chars().count() <= 30));
    }

    #[test]
    fn painted_levels_keep_the_column_width() {
        let plain = alerts().render(None);
        let painted = alerts().with_levels(0, true).render(None);
        assert!(painted.contains("\u{1b}[1;31mCRITICAL\u{1b}[0m    4.5"));
        assert!(painted.contains("\u{1b}[31mHIGH\u{1b}[0m         82"));
        assert_eq!(painted.lines().next(), plain.lines().next());
    }

    #[test]
    fn levels_are_painted_only_with_color() {
        assert_eq!(paint_level("HIGH", false), "HIGH");
        assert_eq!(paint_level("CRITICAL", true), "\u{1b}[1;31mCRITICAL\u{1b}[0m");
        assert_eq!(paint_level("MOSES", true), "MOSES");
    }
}
