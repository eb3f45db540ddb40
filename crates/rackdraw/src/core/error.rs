//! Core error types for rack diagram processing
//!
//! Catalog misses are not errors: lookups return `Option` and the loader folds
//! asset failures into a placeholder. The variants here cover the failures
//! that cross into caller-visible territory (export, import, configuration)
//! and the per-stage failures the loader logs before falling through.

use thiserror::Error;

/// Core error type for rack diagram processing
#[derive(Error, Debug)]
pub enum RackError {
    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("Asset error for '{path}': {message}")]
    AssetError { path: String, message: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Unknown renderer: {name}")]
    UnknownRenderer { name: String },

    #[error("Export error: {message}")]
    ExportError { message: String },

    #[error("Import error: {message}")]
    ImportError { message: String },

    #[error("Config error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },
}

impl RackError {
    /// Create a new catalog error
    pub fn catalog_error(message: impl Into<String>) -> Self {
        Self::CatalogError {
            message: message.into(),
        }
    }

    /// Create a new asset error for the given path
    pub fn asset_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssetError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::RenderError {
            message: message.into(),
        }
    }

    /// Create a new export error
    pub fn export_error(message: impl Into<String>) -> Self {
        Self::ExportError {
            message: message.into(),
        }
    }

    /// Create a new import error
    pub fn import_error(message: impl Into<String>) -> Self {
        Self::ImportError {
            message: message.into(),
        }
    }

    /// Create a new config error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Returns true for failures that should be shown to the end user
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            RackError::ExportError { .. } | RackError::ImportError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_error() {
        let error = RackError::asset_error("switches/a.png", "decode failed");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Asset error"));
        assert!(error_msg.contains("switches/a.png"));
        assert!(error_msg.contains("decode failed"));
    }

    #[test]
    fn test_import_error() {
        let error = RackError::import_error("missing field `scene`");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Import error"));
        assert!(error_msg.contains("missing field"));
    }

    #[test]
    fn test_unknown_renderer() {
        let error = RackError::UnknownRenderer {
            name: "fiber_tray".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown renderer: fiber_tray");
    }

    #[test]
    fn test_user_visible() {
        assert!(RackError::export_error("x").is_user_visible());
        assert!(RackError::import_error("x").is_user_visible());
        assert!(!RackError::render_error("x").is_user_visible());
        assert!(!RackError::asset_error("p", "x").is_user_visible());
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: RackError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: RackError = json_err.into();
        assert!(error.to_string().starts_with("JSON error"));
    }
}
