use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use runtime::DatabaseConfig;
use sea_orm::sqlx::sqlite::SqliteJournalMode;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use url::Url;

const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
// Pooled in-memory SQLite must never recycle its only connection
const MEMORY_CONN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

/// Detect DB backend from URL scheme.
pub fn detect_backend(dsn: &str) -> Result<Backend> {
    let raw = dsn.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
        "postgres" | "postgresql" => Ok(Backend::Postgres),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes.
/// - Adds `mode=rwc` when no query is given so the file gets created.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if is_memory_dsn(dsn) {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create database directory {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    out.push('?');
    out.push_str(query.unwrap_or("mode=rwc"));
    Ok(out)
}

/// Final DSN for `cfg`: sqlite paths are anchored at `base_dir`.
pub fn resolve_dsn(cfg: &DatabaseConfig, base_dir: &Path, create_dirs: bool) -> Result<String> {
    let dsn = cfg.url.trim();
    match detect_backend(dsn)? {
        Backend::Sqlite => absolutize_sqlite_dsn(dsn, base_dir, create_dirs),
        Backend::Postgres => Ok(dsn.to_string()),
    }
}

/// Pool options for `dsn`. `acquire_timeout_sec == 0` selects the default.
pub fn connect_options(dsn: &str, cfg: &DatabaseConfig, acquire_timeout_sec: u64) -> ConnectOptions {
    let mut opts = ConnectOptions::new(dsn.to_string());
    let acquire = if acquire_timeout_sec == 0 {
        DEFAULT_ACQUIRE_TIMEOUT
    } else {
        Duration::from_secs(acquire_timeout_sec)
    };
    opts.acquire_timeout(acquire).sqlx_logging(false);

    if is_memory_dsn(dsn) {
        opts.max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_CONN_LIFETIME)
            .max_lifetime(MEMORY_CONN_LIFETIME);
    } else if let Some(max) = cfg.max_conns {
        opts.max_connections(max);
    }

    if dsn.starts_with("sqlite:") {
        let busy = cfg
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms)));
        // WAL lets readers on other connections proceed while a writer commits
        let wal = !is_memory_dsn(dsn);
        opts.map_sqlx_sqlite_opts(move |mut o| {
            if let Some(busy) = busy {
                o = o.busy_timeout(busy);
            }
            if wal {
                o = o.journal_mode(SqliteJournalMode::Wal);
            }
            o
        });
    }
    opts
}

/// Connect to the configured database.
pub async fn connect(cfg: &DatabaseConfig, base_dir: &Path, acquire_timeout_sec: u64) -> Result<DatabaseConnection> {
    let dsn = resolve_dsn(cfg, base_dir, true)?;
    tracing::info!("Connecting to database: {}", redact(&dsn));

    let db = Database::connect(connect_options(&dsn, cfg, acquire_timeout_sec))
        .await
        .with_context(|| format!("failed to connect to {}", redact(&dsn)))?;
    tracing::info!("Connected DB backend: {:?}", db.get_database_backend());
    Ok(db)
}

/// Hide credentials before a DSN reaches the logs.
fn redact(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => dsn.to_string(),
    }
}
