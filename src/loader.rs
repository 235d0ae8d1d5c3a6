use crate::catalog::{Catalog, CatalogError, ItemId};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Where a catalog document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::File(PathBuf::from(s))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog: {0}")]
    Malformed(serde_json::Error),

    #[error("Duplicate item id: {0}")]
    DuplicateId(ItemId),
}

impl From<CatalogError> for LoadError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Malformed(e) => LoadError::Malformed(e),
            CatalogError::DuplicateId(id) => LoadError::DuplicateId(id),
        }
    }
}

impl LoadError {
    pub fn user_message(&self) -> String {
        match self {
            LoadError::Status { status, .. } => format!("Server responded with HTTP {}", status),
            LoadError::Http(e) => format!("Network error: {}", e),
            LoadError::Io(e) => format!("File system error: {}", e),
            LoadError::Malformed(e) => format!("Data format error: {}", e),
            LoadError::DuplicateId(id) => format!("Catalog lists item {} more than once", id),
        }
    }
}

/// Fetch and parse the catalog. One attempt, no retry and no timeout.
pub async fn load(source: &Source) -> Result<Catalog, LoadError> {
    load_with_progress(source, &ProgressBar::hidden()).await
}

/// Same as [`load`], advancing `pb` as bytes arrive.
pub async fn load_with_progress(source: &Source, pb: &ProgressBar) -> Result<Catalog, LoadError> {
    info!("loading catalog from {}", source);
    let bytes = match source {
        Source::Url(url) => fetch(url, pb).await?,
        Source::File(path) => tokio::fs::read(path).await?,
    };
    let catalog = Catalog::from_json(&bytes)?;
    if catalog.is_empty() {
        warn!("{} contains no items", source);
    } else {
        info!("loaded {} items", catalog.len());
    }
    Ok(catalog)
}

async fn fetch(url: &str, pb: &ProgressBar) -> Result<Vec<u8>, LoadError> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    if let Some(total) = response.content_length() {
        pb.set_length(total);
    }
    debug!("response {} for {}", status, url);

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        body.extend_from_slice(&chunk);
        pb.set_position(body.len() as u64);
    }
    Ok(body)
}

/// Spinner shown on stderr while a load is in flight.
pub fn spinner(source: &Source) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} {bytes}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Loading {}", source));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
