use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

use crate::config::{LoggingConfig, Section};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Map a configured level name to a filter. Unknown names fall back to INFO;
/// "off"/"none" disable the output.
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Relative log paths live under `base_dir` (the resolved home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Size-rotated log file; parent directories are created.
fn open_rotating_file(path: &Path, section: &Section) -> Result<FileRotate<AppendCount>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create log directory {}", parent.display()))?;
    }
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);

    Ok(FileRotate::new(
        path,
        AppendCount::new(backups),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    ))
}

/// Per-output target filters.
///
/// A named section claims its target (and everything below it) for itself;
/// the "default" section covers every target no other section names.
fn targets_for(cfg: &LoggingConfig, pick: impl Fn(&Section) -> LevelFilter) -> Vec<(String, Targets)> {
    let named: Vec<&String> = cfg.keys().filter(|k| *k != DEFAULT_SECTION).collect();

    cfg.iter()
        .map(|(name, section)| {
            let level = pick(section);
            let targets = if name == DEFAULT_SECTION {
                named
                    .iter()
                    .fold(Targets::new().with_default(level), |t, n| {
                        t.with_target(n.as_str(), LevelFilter::OFF)
                    })
            } else {
                Targets::new()
                    .with_default(LevelFilter::OFF)
                    .with_target(name.as_str(), level)
            };
            (name.clone(), targets)
        })
        .collect()
}

/// Build console and file layers for `cfg`.
fn build_layers(cfg: &LoggingConfig, base_dir: &Path) -> Result<Vec<BoxedLayer>> {
    let ansi = std::io::stdout().is_terminal();
    let mut layers: Vec<BoxedLayer> = Vec::new();

    for (_, targets) in targets_for(cfg, |s| parse_level(&s.console_level)) {
        layers.push(
            fmt::layer()
                .with_ansi(ansi)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(targets)
                .boxed(),
        );
    }

    // File level defaults to the console level when unset
    let file_targets = targets_for(cfg, |s| {
        if s.file_level.trim().is_empty() {
            parse_level(&s.console_level)
        } else {
            parse_level(&s.file_level)
        }
    });
    for (name, targets) in file_targets {
        let Some(section) = cfg.get(&name) else {
            continue;
        };
        if section.file.trim().is_empty() {
            continue;
        }
        let path = resolve_log_path(&section.file, base_dir);
        let writer = open_rotating_file(&path, section)
            .with_context(|| format!("logging.{name}: cannot open {}", path.display()))?;
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(Mutex::new(writer))
                .with_filter(targets)
                .boxed(),
        );
    }

    Ok(layers)
}

/// Initialize logging from a configuration.
/// - `cfg`: logging sections; empty means plain console output at INFO
/// - `base_dir`: directory used to resolve relative log file paths (server.home_dir)
///
/// Installing a subscriber twice is not an error; the first one wins.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) -> Result<()> {
    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return Ok(());
    }

    let layers = build_layers(cfg, base_dir)?;
    let _ = Registry::default().with(layers).try_init();
    Ok(())
}

// =================== tests ===================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;
    use tracing::Level;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(parse_level("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" Info "), LevelFilter::INFO);
        assert_eq!(parse_level("warn"), LevelFilter::WARN);
        assert_eq!(parse_level("ERROR"), LevelFilter::ERROR);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("none"), LevelFilter::OFF);
        assert_eq!(parse_level("loud"), LevelFilter::INFO);
    }

    #[test]
    fn test_named_section_claims_its_target() {
        let mut cfg = default_logging_config();
        cfg.insert("sqlx".into(), section("warn", "", ""));

        let targets: std::collections::BTreeMap<_, _> =
            targets_for(&cfg, |s| parse_level(&s.console_level))
                .into_iter()
                .collect();

        let default = &targets["default"];
        assert!(default.would_enable("users_info::domain", &Level::INFO));
        assert!(!default.would_enable("users_info::domain", &Level::DEBUG));
        assert!(!default.would_enable("sqlx::query", &Level::ERROR));

        let sqlx = &targets["sqlx"];
        assert!(sqlx.would_enable("sqlx::query", &Level::WARN));
        assert!(!sqlx.would_enable("sqlx::query", &Level::INFO));
        assert!(!sqlx.would_enable("users_info", &Level::ERROR));
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = tmp.path().join("abs.log");
        assert_eq!(resolve_log_path(&abs.to_string_lossy(), Path::new("/x")), abs);
    }

    #[test]
    fn test_rotating_file_creates_parent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let res = open_rotating_file(&p, &section("info", "nested/dir/app.log", "debug"));
        assert!(res.is_ok(), "writer should be created");
        assert!(p.parent().unwrap().is_dir(), "parent dir must be created");
    }

    #[test]
    fn test_build_layers_counts_outputs() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("info", "logs/app.log", "debug"));
        cfg.insert("api_ingress".into(), section("debug", "", ""));

        let layers = build_layers(&cfg, tmp.path()).unwrap();

        // two console layers plus one file layer for "default"
        assert_eq!(layers.len(), 3);
        assert!(tmp.path().join("logs").is_dir());
    }
}
