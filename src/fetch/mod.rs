// src/fetch/mod.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use url::Url;

/// Filename to fall back on when the URL has no usable final path segment.
const FALLBACK_FILENAME: &str = "download.xls";

fn filename_from_url(url: &Url) -> &str {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_FILENAME)
}

/// Download the published workbook and save it under `dest_dir` using the
/// filename from the URL. Returns the full path of the saved file.
pub async fn download_xls(
    client: &Client,
    url_str: &str,
    dest_dir: impl AsRef<Path>,
) -> Result<PathBuf> {
    let dest_dir = dest_dir.as_ref();
    let url = Url::parse(url_str).with_context(|| format!("parsing source URL {:?}", url_str))?;
    let dest_path = dest_dir.join(filename_from_url(&url));

    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let resp = client
        .get(url.as_str())
        .send()
        .await
        .with_context(|| format!("requesting {}", url))?
        .error_for_status()?;
    let bytes = resp.bytes().await?;
    fs::write(&dest_path, &bytes)
        .await
        .with_context(|| format!("saving workbook to {:?}", dest_path))?;

    info!(path = %dest_path.display(), bytes = bytes.len(), "saved workbook");
    Ok(dest_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_comes_from_the_last_path_segment() {
        let url =
            Url::parse("https://example.com/raw/master/assets/vendas-combustiveis-m3.xls").unwrap();
        assert_eq!(filename_from_url(&url), "vendas-combustiveis-m3.xls");
    }

    #[test]
    fn bare_host_falls_back_to_a_default_name() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(filename_from_url(&url), FALLBACK_FILENAME);
    }
}
