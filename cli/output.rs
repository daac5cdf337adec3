use aicc_core::ContentStats;
use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// One row of the planned-files table.
#[derive(Debug, Serialize)]
pub struct FileRow {
    pub path: String,
    pub bytes: usize,
    pub size: String,
    pub tokens: Option<usize>,
}

impl FileRow {
    pub fn new(path: String, stats: ContentStats) -> Self {
        Self {
            path,
            bytes: stats.bytes,
            size: stats.human_size(),
            tokens: stats.tokens,
        }
    }
}

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    Ok(())
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    write_to_stdout(&content)
}

pub fn print_pattern_list(title: &str, patterns: &[String]) {
    println!("{}", format!(" {} ", title).green().bold().underline());
    if patterns.is_empty() {
        println!("  {}", "(none)".yellow());
    }
    for pattern in patterns {
        println!("  {}", pattern.cyan());
    }
    println!();
}

pub fn print_files_table(rows: &[FileRow]) {
    println!("{}", " Planned Files ".green().bold().underline());
    if rows.is_empty() {
        println!("{}", "(No files selected for the body)".yellow());
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Path").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
        Cell::new("Tokens").fg(Color::Green),
    ]);
    for row in rows {
        let tokens = row
            .tokens
            .map_or_else(|| "N/A".to_string(), |n| n.to_string());
        table.add_row(vec![
            Cell::new(&row.path).fg(Color::Cyan),
            Cell::new(&row.size)
                .set_alignment(CellAlignment::Right)
                .fg(Color::DarkGrey),
            Cell::new(tokens).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
}

pub fn print_summary(label: &str, value: &str) {
    println!("{:<14} {}", label.green(), value.cyan());
}
