//! Connection URLs and backend selection

use crate::duckdb::DuckDbSource;
use crate::error::{DbError, DbResult};
use crate::traits::ConnectionSource;
use std::path::PathBuf;

/// Connection parameters as given on the command line or in config.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSettings {
    /// Connection URL
    pub url: String,
    /// User name, when the backend authenticates
    pub user: Option<String>,
    /// Password, when the backend authenticates
    pub password: Option<String>,
}

/// A parsed connection URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// In-memory DuckDB database
    DuckDbMemory,
    /// DuckDB database file
    DuckDbFile(PathBuf),
}

impl DatabaseUrl {
    /// Parse a connection URL.
    ///
    /// Accepted forms: `duckdb::memory:`, `:memory:`, `duckdb:` (in-memory),
    /// `duckdb:<path>`, and a bare file path. A leading `jdbc:` is ignored.
    /// Any other scheme is reported as not implemented.
    pub fn parse(url: &str) -> DbResult<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DbError::ConnectionError(
                "connection URL is empty".to_string(),
            ));
        }
        let url = url.strip_prefix("jdbc:").unwrap_or(url);

        if url == ":memory:" {
            return Ok(DatabaseUrl::DuckDbMemory);
        }
        if let Some(rest) = url.strip_prefix("duckdb:") {
            return Ok(match rest {
                "" | ":memory:" => DatabaseUrl::DuckDbMemory,
                path => DatabaseUrl::DuckDbFile(PathBuf::from(path)),
            });
        }
        if let Some(scheme) = url_scheme(url) {
            return Err(DbError::NotImplemented {
                backend: scheme.to_string(),
                feature: "connections".to_string(),
            });
        }
        Ok(DatabaseUrl::DuckDbFile(PathBuf::from(url)))
    }
}

/// The scheme of `url`, if it has one.
///
/// Single-letter prefixes are treated as Windows drive letters, not schemes.
fn url_scheme(url: &str) -> Option<&str> {
    let (scheme, _) = url.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && scheme.len() > 1
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Open the connection source a URL points at.
pub fn open_source(settings: &ConnectionSettings) -> DbResult<Box<dyn ConnectionSource>> {
    match DatabaseUrl::parse(&settings.url)? {
        DatabaseUrl::DuckDbMemory => {
            log_ignored_credentials(settings);
            Ok(Box::new(DuckDbSource::in_memory()?))
        }
        DatabaseUrl::DuckDbFile(path) => {
            log_ignored_credentials(settings);
            Ok(Box::new(DuckDbSource::from_path(&path)?))
        }
    }
}

fn log_ignored_credentials(settings: &ConnectionSettings) {
    if settings.user.is_some() || settings.password.is_some() {
        log::debug!("DuckDB does not authenticate; ignoring user and password");
    }
}
