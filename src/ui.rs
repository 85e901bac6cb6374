//! Terminal output: section banners, the configuration summary and the tool
//! status table.
//!
//! ```rust,ignore
//! let mut table = Table::new(&["Tool", "Status", "Path"]);
//! table.add_row(vec!["CMake".into(), "✓".into(), "/usr/bin/cmake".into()]);
//! table.print();
//! ```

use colored::*;
use console::{measure_text_width, truncate_str};

use crate::context::BuildContext;
use crate::toolchain::ToolPaths;

const BANNER_WIDTH: usize = 70;

/// Box-drawn table that shrinks its widest columns to fit the terminal.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(measure_text_width(&sanitize(cell)));
            }
        }

        let overhead = 3 + 3 * self.headers.len();
        let available = max_width.saturating_sub(overhead);
        let mut total: usize = widths.iter().sum();
        while total > available {
            let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widest <= 8 {
                break;
            }
            widths[idx] -= 1;
            total -= 1;
        }
        widths
    }

    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        let widths = self.column_widths(max_width);

        let border = |left: &str, mid: &str, right: &str| -> String {
            let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, inner.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| -> String {
            let mut out = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let text = truncate_str(&sanitize(cell), *width, "...").to_string();
                let padding = width.saturating_sub(measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text };
                out.push_str(&format!(" {}{} │", text, " ".repeat(padding)));
            }
            out
        };

        let mut lines = vec![
            border("┌", "┬", "┐"),
            line(&self.headers, true),
            border("├", "┼", "┤"),
        ];
        lines.extend(self.rows.iter().map(|row| line(row, false)));
        lines.push(border("└", "┴", "┘"));
        lines
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        for line in self.render(term_width as usize) {
            println!("{}", line);
        }
    }
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}

/// `====` banner around a title.
pub fn section(title: &str) {
    let rule = "=".repeat(BANNER_WIDTH);
    println!("{}", rule);
    println!("{}", title.bold());
    println!("{}", rule);
    println!();
}

pub fn print_configuration(ctx: &BuildContext) {
    let sel = &ctx.selection;
    let mut table = Table::new(&["Setting", "Value"]);
    let rows = [
        ("Project", sel.project_name.clone()),
        ("C++ standard", sel.cxx_standard.to_string()),
        ("CMake minimum", sel.cmake_minimum_version.clone()),
        ("IDE", sel.ide.to_string()),
        ("Build system", sel.build_system.to_string()),
        ("Configuration", sel.configuration.to_string()),
        ("Platform", sel.platform.to_string()),
        ("Toolchain", sel.toolchain.to_string()),
        ("Build folder", sel.build_folder_name().to_string()),
        ("Generator", sel.cmake_generator().to_string()),
        ("Verbose", yes_no(sel.verbose)),
        ("Clean first", yes_no(sel.clean_first)),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }
    table.print();
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}

pub fn tool_status_table(tools: &ToolPaths) -> Table {
    let mut table = Table::new(&["Tool", "Status", "Path"]);
    for (name, path) in tools.entries() {
        let (status, location) = match path {
            Some(p) => ("✓".green().to_string(), p.display().to_string()),
            None => ("x".red().to_string(), "not found".dimmed().to_string()),
        };
        table.add_row(vec![name.to_string(), status, location]);
    }
    table
}

pub fn print_tool_status(tools: &ToolPaths) {
    tool_status_table(tools).print();
    if let Some(year) = &tools.visual_studio {
        println!("  Visual Studio {}", year);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[String]) -> Vec<String> {
        lines.iter().map(|l| console::strip_ansi_codes(l).to_string()).collect()
    }

    #[test]
    fn test_render_aligns_columns() {
        let mut table = Table::new(&["Tool", "Path"]);
        table.add_row(vec!["CMake".into(), "/usr/bin/cmake".into()]);
        table.add_row(vec!["too".into(), "many".into(), "cells".into()]);

        let lines = plain(&table.render(200));
        assert_eq!(lines.len(), 5);
        let width = measure_text_width(&lines[0]);
        assert!(lines.iter().all(|l| measure_text_width(l) == width));
        assert!(lines[3].contains("/usr/bin/cmake"));
    }

    #[test]
    fn test_render_truncates_to_terminal() {
        let mut table = Table::new(&["Tool", "Path"]);
        table.add_row(vec!["CMake".into(), "x".repeat(120)]);

        let lines = plain(&table.render(60));
        assert!(lines.iter().all(|l| measure_text_width(l) <= 60));
        assert!(lines[3].contains("..."));
    }

    #[test]
    fn test_tool_table_has_row_per_tool() {
        let table = tool_status_table(&ToolPaths::default());
        let lines = plain(&table.render(200));
        assert_eq!(lines.len(), 4 + 8);
        assert!(lines.iter().any(|l| l.contains("vcvarsall.bat")));
    }
}
