//! Command-line interface for the rackdraw utility
//!
//! Scenes live on disk as JSON snapshots. `place` adds equipment to a
//! snapshot (creating it if needed), `export` turns one into PNG, PDF, SVG or
//! JSON, and `catalog` / `render` inspect the device catalog.

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::style::{Color, Stylize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use rackdraw::core::logging::init_logging;
use rackdraw::export::{export_filename, export_scene, import_snapshot, ExportFormat, Snapshot};
use rackdraw::loader::LoadOptions;
use rackdraw::scene::{EquipmentComposer, LockFlags, Scene, SceneObject, ViewMetadata};
use rackdraw::{open_composer, EditorConfig};

/// Rackdraw - Compose network-rack diagrams
#[derive(Parser)]
#[command(name = "rackdraw")]
#[command(about = "Compose network-rack diagrams and export them to PNG, PDF, SVG or JSON")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Editor configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Device catalog, overrides the configuration
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Asset base directory, overrides the configuration
    #[arg(long, global = true)]
    pub assets: Option<PathBuf>,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List catalog devices
    Catalog {
        /// Only list this category
        #[arg(long)]
        category: Option<String>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,

        /// Fetch and decode every catalog image, reporting failures
        #[arg(long)]
        check_assets: bool,
    },

    /// Render a single device
    Render {
        #[arg(long)]
        category: String,

        #[arg(long)]
        key: String,

        #[arg(long, value_enum, default_value_t = DeviceFormat::Svg)]
        format: DeviceFormat,

        /// Override a renderer parameter, e.g. `--param ports=48`
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Place a device into a scene file, creating the file if needed
    Place {
        /// Scene snapshot to update
        #[arg(short, long)]
        scene: PathBuf,

        #[arg(long)]
        category: String,

        #[arg(long)]
        key: String,

        #[arg(long, default_value_t = 0.0)]
        x: f64,

        #[arg(long, default_value_t = 0.0)]
        y: f64,

        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Rack position (U1 at the bottom); inferred from racks when omitted
        #[arg(long)]
        position: Option<u32>,
    },

    /// Export a scene file
    Export {
        /// Scene snapshot to export
        #[arg(short, long)]
        scene: PathBuf,

        #[arg(long, value_enum, default_value_t = FormatChoice::Png)]
        format: FormatChoice,

        /// Output file; defaults to a timestamped name
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Title printed on PDF pages
        #[arg(long, default_value = "Rack Diagram")]
        title: String,
    },

    /// Print the equipment list of a scene
    Equipment {
        #[arg(short, long)]
        scene: PathBuf,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Check that a scene file can be imported
    Validate {
        #[arg(short, long)]
        scene: PathBuf,
    },
}

/// Scene export formats
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum FormatChoice {
    Png,
    Pdf,
    Svg,
    Json,
}

impl From<FormatChoice> for ExportFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Png => ExportFormat::Png,
            FormatChoice::Pdf => ExportFormat::Pdf,
            FormatChoice::Svg => ExportFormat::Svg,
            FormatChoice::Json => ExportFormat::Json,
        }
    }
}

/// Single-device output formats
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum DeviceFormat {
    Svg,
    Png,
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var("NO_COLOR").is_err()
                    && crossterm::tty::IsTty::is_tty(&std::io::stdout())
            }
        }
    }
}

fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    Ok((name.trim().to_string(), value))
}

/// Build the editor configuration from a file, the environment and flags
pub fn build_config(cli: &Cli) -> Result<EditorConfig> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::load_from_file(path)?,
        None => EditorConfig::default(),
    }
    .with_env_overrides();

    if let Some(catalog) = &cli.catalog {
        config.catalog_path = Some(catalog.clone());
    }
    if let Some(assets) = &cli.assets {
        config.asset_dir = assets.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Main CLI application
pub struct RackdrawApp {
    composer: EquipmentComposer,
}

impl RackdrawApp {
    pub fn new(config: &EditorConfig) -> Result<Self> {
        Ok(Self {
            composer: open_composer(config)?,
        })
    }

    /// Set up logging, build the configuration and dispatch
    pub fn run(cli: Cli) -> Result<()> {
        let log_level = std::env::var("RACKDRAW_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var("RACKDRAW_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Rackdraw v{}", env!("CARGO_PKG_VERSION"));
        }

        let config = build_config(&cli)?;
        let app = Self::new(&config)?;
        app.dispatch(cli.command, cli.verbose)
    }

    pub fn dispatch(&self, command: Commands, verbose: bool) -> Result<()> {
        match command {
            Commands::Catalog {
                category,
                json,
                color,
                check_assets,
            } => {
                self.catalog_command(category.as_deref(), json, color.enabled())?;
                if check_assets {
                    let (loaded, declared) = self.check_assets();
                    println!("Assets: {}/{} loaded", loaded, declared);
                    if loaded < declared {
                        eprintln!("Warning: {} assets failed to load", declared - loaded);
                    }
                }
                Ok(())
            }
            Commands::Render {
                category,
                key,
                format,
                params,
                output,
            } => self.render_command(&category, &key, format, &params, output),
            Commands::Place {
                scene,
                category,
                key,
                x,
                y,
                scale,
                position,
            } => self.place_command(&scene, &category, &key, (x, y), scale, position, verbose),
            Commands::Export {
                scene,
                format,
                output,
                title,
            } => self.export_command(&scene, format.into(), output, &title, verbose),
            Commands::Equipment { scene, json } => self.equipment_command(&scene, json),
            Commands::Validate { scene } => self.validate_command(&scene),
        }
    }

    /// Handle the catalog command
    fn catalog_command(&self, category: Option<&str>, json: bool, colored: bool) -> Result<()> {
        let catalog = self.composer.loader().catalog();
        let devices: Vec<_> = catalog
            .iter()
            .filter(|device| category.map_or(true, |c| device.category == c))
            .collect();

        if let Some(c) = category {
            if devices.is_empty() {
                bail!("No devices in category '{}'", c);
            }
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&devices)?);
            return Ok(());
        }

        let mut current: Option<&str> = None;
        for device in &devices {
            if current != Some(device.category.as_str()) {
                current = Some(device.category.as_str());
                if colored {
                    println!("{}", device.category.as_str().with(Color::Cyan).bold());
                } else {
                    println!("{}", device.category);
                }
            }
            let key = if colored {
                format!("{}", device.key.as_str().with(Color::Yellow))
            } else {
                device.key.clone()
            };
            // pad on the raw key so color codes don't skew the column
            let padding = 28usize.saturating_sub(device.key.len());
            println!(
                "  {}{}{:>3}U  {}",
                key,
                " ".repeat(padding),
                device.rack_units,
                device.display_name
            );
        }
        println!();
        println!("Total: {} devices", devices.len());
        Ok(())
    }

    /// Warm the asset cache, returning loaded and declared image counts
    fn check_assets(&self) -> (usize, usize) {
        let loader = self.composer.loader();
        let declared = loader
            .catalog()
            .iter()
            .map(|device| device.images.len())
            .sum();
        let loaded = loader.warm_cache();
        debug!(loaded, declared, "Catalog assets checked");
        (loaded, declared)
    }

    /// Handle the render command
    fn render_command(
        &self,
        category: &str,
        key: &str,
        format: DeviceFormat,
        params: &[(String, f64)],
        output: Option<PathBuf>,
    ) -> Result<()> {
        let config = self.composer.config();
        let mut options = LoadOptions::new(config.standard_width, config.rack_unit_pixels);
        for (name, value) in params {
            options = options.with_param(name.clone(), *value);
        }

        let loader = self.composer.loader();
        let result = loader.load_device(
            category,
            key,
            rackdraw::Canvas::default(),
            &options,
        );
        info!(source = %result.source_kind, "Device rendered");
        if result.is_placeholder() {
            eprintln!("Warning: '{}/{}' rendered as a placeholder", category, key);
        }

        let bytes = match format {
            DeviceFormat::Svg => rackdraw::core::svg::canvas_to_svg(&result.surface).into_bytes(),
            DeviceFormat::Png => {
                let surface = result.surface;
                let mut scene = Scene::new(ViewMetadata {
                    zoom: config.zoom,
                    width: surface.width.max(1.0),
                    height: surface.height.max(1.0),
                });
                scene.add(SceneObject {
                    id: 0,
                    category: category.to_string(),
                    key: key.to_string(),
                    equipment_name: result.display_name,
                    rack_units: result.rack_units,
                    x: 0.0,
                    y: 0.0,
                    scale: 1.0,
                    locks: LockFlags::EQUIPMENT,
                    rack_position: None,
                    source_kind: result.source_kind,
                    surface,
                });
                export_scene(&scene, ExportFormat::Png, key)?
            }
        };
        self.write_output(output, &bytes)
    }

    /// Handle the place command
    #[allow(clippy::too_many_arguments)]
    fn place_command(
        &self,
        path: &Path,
        category: &str,
        key: &str,
        (x, y): (f64, f64),
        scale: f64,
        position: Option<u32>,
        verbose: bool,
    ) -> Result<()> {
        let mut scene = if path.exists() {
            self.load_scene(path)?
        } else {
            debug!(path = %path.display(), "Starting a new scene");
            Scene::new(ViewMetadata::from_config(self.composer.config()))
        };

        let object = self
            .composer
            .create_scene_object(category, key, x, y)
            .ok_or_else(|| anyhow!("Device '{}/{}' is not in the catalog", category, key))?;
        let name = object.equipment_name.clone();
        let id = scene.add(object);
        scene.scale_object(id, scale)?;

        match position {
            Some(position) => {
                scene.set_rack_position(id, Some(position));
            }
            None => {
                scene.infer_rack_positions();
            }
        }

        let json = Snapshot::capture(&scene).to_json()?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write scene file '{}'", path.display()))?;

        if verbose {
            eprintln!("Scene now holds {} objects", scene.len());
        }
        let placed = scene
            .get(id)
            .and_then(|object| object.rack_position)
            .map(|p| format!(" at U{}", p))
            .unwrap_or_default();
        println!("Placed #{} {}{}", id, name, placed);
        Ok(())
    }

    /// Handle the export command
    fn export_command(
        &self,
        path: &Path,
        format: ExportFormat,
        output: Option<PathBuf>,
        title: &str,
        verbose: bool,
    ) -> Result<()> {
        let scene = self.load_scene(path)?;
        let bytes = export_scene(&scene, format, title)?;

        let output = output.unwrap_or_else(|| {
            PathBuf::from(export_filename(format, &Local::now().naive_local()))
        });
        self.write_output(Some(output.clone()), &bytes)?;

        if verbose {
            eprintln!("Wrote {} bytes", bytes.len());
        }
        if output.to_string_lossy() != "-" {
            println!("Exported {}", output.display());
        }
        Ok(())
    }

    /// Handle the equipment command
    fn equipment_command(&self, path: &Path, json: bool) -> Result<()> {
        let scene = self.load_scene(path)?;
        let entries = scene.equipment_list();

        if json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        if entries.is_empty() {
            println!("No equipment placed");
            return Ok(());
        }
        for entry in &entries {
            let position = entry
                .rack_position
                .map(|p| format!("U{}", p))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:>5}  {:<36} {:<16} {}U",
                position, entry.equipment_name, entry.category, entry.rack_units
            );
        }
        Ok(())
    }

    /// Handle the validate command
    fn validate_command(&self, path: &Path) -> Result<()> {
        match self.load_scene(path) {
            Ok(scene) => {
                println!("✓ Valid scene with {} objects", scene.len());
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid scene: {:#}", e);
                Err(e)
            }
        }
    }

    /// Read a snapshot file and rebuild its scene
    pub fn load_scene(&self, path: &Path) -> Result<Scene> {
        let json = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read scene file '{}': {}", path.display(), e))?;
        let mut scene = Scene::default();
        import_snapshot(&json, &self.composer, &mut scene)?;
        Ok(scene)
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &[u8]) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content)?;
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    fn app() -> RackdrawApp {
        RackdrawApp::new(&EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_cli_parsing_render_command() {
        let args = vec![
            "rackdraw",
            "render",
            "--category",
            "switches",
            "--key",
            "generic-24-port",
            "--param",
            "ports=48",
            "-o",
            "switch.svg",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Render {
                category,
                key,
                format,
                params,
                output,
            } => {
                assert_eq!(category, "switches");
                assert_eq!(key, "generic-24-port");
                assert_eq!(format, DeviceFormat::Svg); // default
                assert_eq!(params, vec![("ports".to_string(), 48.0)]);
                assert_eq!(output.unwrap().to_string_lossy(), "switch.svg");
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_parsing_bad_param() {
        let args = vec![
            "rackdraw", "render", "--category", "a", "--key", "b", "--param", "ports",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_parsing_place_command() {
        let args = vec![
            "rackdraw",
            "place",
            "--scene",
            "rack.json",
            "--category",
            "routers",
            "--key",
            "cisco-isr-4331",
            "--y",
            "120",
            "--position",
            "5",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Place {
                scene,
                x,
                y,
                scale,
                position,
                ..
            } => {
                assert_eq!(scene.to_string_lossy(), "rack.json");
                assert_eq!((x, y), (0.0, 120.0));
                assert_eq!(scale, 1.0);
                assert_eq!(position, Some(5));
            }
            _ => panic!("Expected Place command"),
        }
    }

    #[test]
    fn test_cli_parsing_export_defaults() {
        let args = vec!["rackdraw", "export", "-s", "rack.json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Export {
                format,
                output,
                title,
                ..
            } => {
                assert_eq!(format, FormatChoice::Png);
                assert!(output.is_none());
                assert_eq!(title, "Rack Diagram");
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = vec![
            "rackdraw",
            "catalog",
            "--json",
            "--verbose",
            "--catalog",
            "devices.json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.catalog.unwrap().to_string_lossy(), "devices.json");
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_build_config_flags_override() {
        let cli = Cli::try_parse_from(vec![
            "rackdraw",
            "--assets",
            "/srv/assets",
            "validate",
            "-s",
            "x.json",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.asset_dir, PathBuf::from("/srv/assets"));
    }

    #[test]
    fn test_catalog_command_unknown_category() {
        let app = app();
        assert!(app.catalog_command(Some("toasters"), false, false).is_err());
        assert!(app.catalog_command(Some("racks"), true, false).is_ok());
    }

    #[test]
    fn test_check_assets_warms_cache() {
        let cli = Cli::try_parse_from(vec!["rackdraw", "catalog", "--check-assets"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Catalog {
                check_assets: true,
                ..
            }
        ));

        let app = app();
        let (loaded, declared) = app.check_assets();
        assert!(loaded >= 1);
        assert!(loaded <= declared);
        assert_eq!(app.composer.loader().cache().len(), loaded);
    }

    #[test]
    fn test_missing_catalog_still_opens() {
        let config = EditorConfig {
            catalog_path: Some(PathBuf::from("/nonexistent/catalog.json")),
            ..EditorConfig::default()
        };
        let app = RackdrawApp::new(&config).unwrap();
        assert_eq!(app.check_assets(), (0, 0));
        assert!(app
            .place_command(
                &tempdir().unwrap().path().join("rack.json"),
                "racks",
                "42u-open-frame",
                (0.0, 0.0),
                1.0,
                None,
                false,
            )
            .is_err());
    }

    #[test]
    fn test_place_then_export() {
        let app = app();
        let dir = tempdir().unwrap();
        let scene_path = dir.path().join("rack.json");

        app.place_command(
            &scene_path,
            "racks",
            "42u-open-frame",
            (0.0, 0.0),
            1.0,
            None,
            false,
        )
        .unwrap();
        app.place_command(
            &scene_path,
            "patch-panels",
            "cat6-24-port",
            (0.0, 1804.0),
            1.0,
            None,
            false,
        )
        .unwrap();

        let scene = app.load_scene(&scene_path).unwrap();
        assert_eq!(scene.len(), 2);
        let list = scene.equipment_list();
        assert_eq!(list[0].equipment_name, "Cat6 24-Port Patch Panel");
        assert_eq!(list[0].rack_position, Some(1));

        let svg_path = dir.path().join("rack.svg");
        app.export_command(
            &scene_path,
            ExportFormat::Svg,
            Some(svg_path.clone()),
            "Rack",
            false,
        )
        .unwrap();
        let svg = fs::read_to_string(&svg_path).unwrap();
        assert!(svg.contains("data-key=\"cat6-24-port\""));
    }

    #[test]
    fn test_place_unknown_device_leaves_file_alone() {
        let app = app();
        let dir = tempdir().unwrap();
        let scene_path = dir.path().join("rack.json");

        let result = app.place_command(
            &scene_path,
            "switches",
            "nope",
            (0.0, 0.0),
            1.0,
            None,
            false,
        );
        assert!(result.is_err());
        assert!(!scene_path.exists());
    }

    #[test]
    fn test_validate_rejects_broken_scene() {
        let app = app();
        let dir = tempdir().unwrap();
        let scene_path = dir.path().join("broken.json");
        fs::write(&scene_path, "{\"version\": 7}").unwrap();

        assert!(app.validate_command(&scene_path).is_err());
        assert!(app.validate_command(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_render_command_writes_file() {
        let app = app();
        let dir = tempdir().unwrap();
        let out = dir.path().join("panel.svg");

        app.render_command(
            "patch-panels",
            "cat6-48-port",
            DeviceFormat::Svg,
            &[],
            Some(out.clone()),
        )
        .unwrap();
        let svg = fs::read_to_string(&out).unwrap();
        assert!(svg.contains("height=\"88\""));
    }
}
