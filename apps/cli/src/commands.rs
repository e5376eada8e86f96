// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command implementations. Every input is read before any computation and
//! nothing is written unless the whole command succeeded.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pitchline_calibration::{blank_sheet, resolve, summarize, MeasurementSummary, MeasurementTable};
use pitchline_drawing::{Drawing, RoofModel};

use crate::config::Config;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create an all-unknown measurement sheet for a drawing.
    Sheet {
        drawing: PathBuf,
        output: Option<PathBuf>,
    },
    /// Calibrate a partially surveyed sheet.
    Fill {
        drawing: PathBuf,
        sheet: PathBuf,
        output: Option<PathBuf>,
        summary: Option<PathBuf>,
    },
    /// Print the totals of a complete sheet.
    Summary { drawing: PathBuf, sheet: PathBuf },
}

pub fn run(command: &Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Sheet { drawing, output } => sheet(drawing, output.as_deref(), config),
        Command::Fill {
            drawing,
            sheet,
            output,
            summary,
        } => fill(drawing, sheet, output.as_deref(), summary.as_deref(), config),
        Command::Summary { drawing, sheet } => print_summary(drawing, sheet, config),
    }
}

fn sheet(drawing_path: &Path, output: Option<&Path>, config: &Config) -> anyhow::Result<()> {
    let drawing = read_drawing(drawing_path)?;
    let (model, table) = blank_sheet(&drawing, &config.engine)
        .with_context(|| format!("cannot resolve drawing {}", drawing_path.display()))?;

    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_path(&format!("{}.sheet.json", file_stem(drawing_path))));
    write_file(&target, &table.to_json()?)?;

    tracing::info!(
        path = %target.display(),
        lines = model.primitives.len(),
        facets = model.facets.len(),
        "wrote measurement sheet"
    );
    Ok(())
}

fn fill(
    drawing_path: &Path,
    sheet_path: &Path,
    output: Option<&Path>,
    summary_path: Option<&Path>,
    config: &Config,
) -> anyhow::Result<()> {
    let drawing = read_drawing(drawing_path)?;
    let mut table = read_table(sheet_path)?;

    let resolution = resolve(&drawing, &mut table, &config.engine)
        .with_context(|| format!("cannot calibrate {}", sheet_path.display()))?;

    tracing::info!(
        slope = resolution.calibration.slope,
        area_scale = resolution.calibration.area_scale_factor,
        predicted = resolution.calibration.predicted_lines.len(),
        computed = resolution.calibration.computed_facets.len(),
        "calibrated measurement sheet"
    );

    // Serialize everything before the first write.
    let table_json = table.to_json()?;
    let summary_json = serde_json::to_string_pretty(&resolution)?;

    let target = output.map(Path::to_path_buf).unwrap_or_else(|| match &config.output_dir {
        Some(dir) => dir.join(file_name(sheet_path)),
        None => sheet_path.to_path_buf(),
    });
    write_file(&target, &table_json)?;
    tracing::info!(path = %target.display(), "wrote filled sheet");

    if let Some(path) = summary_path {
        write_file(path, &summary_json)?;
        tracing::info!(path = %path.display(), "wrote summary");
    }
    Ok(())
}

fn print_summary(drawing_path: &Path, sheet_path: &Path, config: &Config) -> anyhow::Result<()> {
    let summary = load_summary(drawing_path, sheet_path, config)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Totals of a complete sheet; fails while any value is still unknown.
fn load_summary(
    drawing_path: &Path,
    sheet_path: &Path,
    config: &Config,
) -> anyhow::Result<MeasurementSummary> {
    let drawing = read_drawing(drawing_path)?;
    let mut table = read_table(sheet_path)?;

    let model = RoofModel::build(drawing.to_primitives(), &config.engine.drawing)
        .with_context(|| format!("cannot resolve drawing {}", drawing_path.display()))?;
    table.reconcile(&model)?;
    let summary = summarize(&model, &table)
        .with_context(|| format!("cannot summarize {}", sheet_path.display()))?;

    tracing::debug!(
        facets = summary.facet_count,
        total_area = summary.total_area,
        "summarized measurement sheet"
    );
    Ok(summary)
}

fn read_drawing(path: &Path) -> anyhow::Result<Drawing> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read drawing {}", path.display()))?;
    Drawing::from_json(&text).with_context(|| format!("invalid drawing {}", path.display()))
}

fn read_table(path: &Path) -> anyhow::Result<MeasurementTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read measurement sheet {}", path.display()))?;
    MeasurementTable::from_json(&text)
        .with_context(|| format!("invalid measurement sheet {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("cannot write {}", path.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "drawing".into())
}

fn file_name(path: &Path) -> PathBuf {
    path.file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sheet.json"))
}
