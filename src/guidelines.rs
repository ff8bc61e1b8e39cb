use crate::error::ApiError;
use std::path::{Path, PathBuf};

/// Load the review guidelines from a URL or a filesystem path.
///
/// The loaded text is shared read-only across every file analysis of the
/// pass; a load failure is fatal to the pass before any file is processed.
pub async fn load(source: &str) -> Result<String, ApiError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        load_from_url(source).await
    } else {
        load_from_file(source).await
    }
}

async fn load_from_url(url: &str) -> Result<String, ApiError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| ApiError::Guidelines(format!("request to {} failed: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(ApiError::Guidelines(format!(
            "request to {} returned status {}",
            url,
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| ApiError::Guidelines(format!("reading body from {} failed: {}", url, e)))
}

async fn load_from_file(source: &str) -> Result<String, ApiError> {
    let path = resolve_path(source);
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ApiError::Guidelines(format!("reading {} failed: {}", path.display(), e)))
}

fn resolve_path(source: &str) -> PathBuf {
    let path = Path::new(source);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
