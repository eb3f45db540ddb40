//! Export pipeline
//!
//! Every export borrows the scene immutably; a failed export leaves the
//! scene exactly as it was. Snapshots are the only format that can be read
//! back, through [`import_snapshot`].

mod pdf;
mod png;
mod snapshot;
mod svg;

pub use pdf::{export_pdf, PDF_PAGE_HEIGHT_MM, PDF_PAGE_WIDTH_MM};
pub use png::export_png;
pub use snapshot::{import_snapshot, Snapshot, SnapshotObject, SnapshotScene, SNAPSHOT_VERSION};
pub use svg::export_svg;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use tracing::{info, span, Level};

use crate::core::RackError;
use crate::scene::Scene;

/// Prefix of every exported file name
pub const FILENAME_PREFIX: &str = "rack-diagram";

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Pdf,
    Svg,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Svg => "svg",
            ExportFormat::Json => "json",
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, ExportFormat::Png | ExportFormat::Pdf)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            "svg" => Ok(ExportFormat::Svg),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Timestamped file name, `rack-diagram-YYYYMMDD-HHMMSS.<ext>`
pub fn export_filename(format: ExportFormat, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}-{}.{}",
        FILENAME_PREFIX,
        timestamp.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

/// Export `scene` in `format`; `title` is used by PDF output
pub fn export_scene(scene: &Scene, format: ExportFormat, title: &str) -> Result<Vec<u8>, RackError> {
    let export_span = span!(Level::INFO, "export_scene", %format, objects = scene.len());
    let _enter = export_span.enter();

    let bytes = match format {
        ExportFormat::Png => export_png(scene)?,
        ExportFormat::Pdf => export_pdf(scene, title)?,
        ExportFormat::Svg => export_svg(scene).into_bytes(),
        ExportFormat::Json => Snapshot::capture(scene).to_json()?.into_bytes(),
    };
    info!(bytes = bytes.len(), "Export completed");
    Ok(bytes)
}
