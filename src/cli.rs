//! Command handler functions for the covtree CLI.
//!
//! Handlers take already-resolved inputs and either return their output as a
//! `String` or stream it into a caller-supplied writer, so they are easy to
//! test without capturing stdout.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::info;

use crate::config::{self, Config};
use crate::profile;
use crate::project::{self, Report};
use crate::render::{self, RenderOptions};
use crate::source::FsSourceReader;
use crate::tree::CoverageTree;

/// Output format for the `report` command.
#[derive(Clone, Debug, ValueEnum)]
pub enum Format {
    Html,
    Json,
}

/// Assemble and validate a [`Config`] from raw flag values.
pub fn load_config(root: &str, cutlines: &str, ignores: &str) -> Result<Config> {
    let config = Config {
        root: root.to_string(),
        cutlines: config::parse_cutlines(cutlines)?,
        ignores: config::parse_ignores(ignores),
    };
    config.validate()?;
    Ok(config)
}

/// Load a profile, build the tree and project it, reading sources from
/// `source_dir`.
pub fn build_report(profile_path: &Path, config: &Config, source_dir: &Path) -> Result<Report> {
    let files = profile::load_file(profile_path)
        .with_context(|| format!("Failed to load profile {}", profile_path.display()))?;
    let tree = CoverageTree::build(config, files)?;
    let reader = FsSourceReader::new(source_dir);
    let report = project::project(&tree, &config.cutlines, &reader)?;
    info!(views = report.views.len(), initial = %report.initial_id, "projected report");
    Ok(report)
}

pub fn cmd_report<W: Write>(
    report: &Report,
    format: &Format,
    options: &RenderOptions,
    out: &mut W,
) -> Result<()> {
    match format {
        Format::Html => render::write_html(report, options, out)?,
        Format::Json => render::write_json(report, out)?,
    }
    out.flush()?;
    Ok(())
}

/// One row per view, in report order.
pub fn cmd_summary(report: &Report) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "{:<60} {:>8} {:>8} {:>8}  STATUS",
        "PATH", "STMTS", "COVERED", "RATE"
    )
    .unwrap();
    writeln!(out, "{}", "-".repeat(96)).unwrap();

    for view in &report.views {
        let path = view
            .links
            .iter()
            .map(|l| l.title.as_str())
            .collect::<Vec<_>>()
            .join("/");
        let path = if view.is_dir() { format!("{path}/") } else { path };
        let status = report
            .cutlines
            .classify(&view.counts)
            .map(|c| c.as_str())
            .unwrap_or("-");
        writeln!(
            out,
            "{:<60} {:>8} {:>8} {:>7.1}%  {}",
            path, view.counts.statements, view.counts.covered, view.percentage, status
        )
        .unwrap();
    }

    out
}
