use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::DownloadError;
use crate::models::ListingItem;

/// Every download is written with this extension, whatever the content type.
const FILE_EXTENSION: &str = "jpg";

#[derive(Debug, PartialEq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    NoMediaUrl,
    /// The display name cannot be used as a file stem.
    BadName,
}

/// Turn a post fullname into a file stem, or `None` if it would escape the folder.
pub(crate) fn file_stem(display_name: &str) -> Option<String> {
    if display_name.contains("..") || display_name.contains('\0') {
        return None;
    }

    let stem: String = display_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if stem.trim().is_empty() {
        None
    } else {
        Some(stem)
    }
}

pub(crate) async fn download_a_file(
    client: &Client,
    item: &ListingItem,
    dest_dir: &Path,
) -> Result<DownloadOutcome, DownloadError> {
    let Some(url) = item.media_url.as_deref() else {
        return Ok(DownloadOutcome::NoMediaUrl);
    };
    let Some(stem) = file_stem(&item.display_name) else {
        return Ok(DownloadOutcome::BadName);
    };

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Remote { status });
    }

    fs::create_dir_all(dest_dir).await?;
    let fname = dest_dir.join(format!("{}.{}", stem, FILE_EXTENSION));
    let partial = dest_dir.join(format!("{}.{}.part", stem, FILE_EXTENSION));

    if let Err(e) = write_body(response, &partial).await {
        let _ = fs::remove_file(&partial).await;
        return Err(e);
    }
    // rename replaces, so a re-run overwrites earlier downloads.
    fs::rename(&partial, &fname).await?;

    Ok(DownloadOutcome::Saved(fname))
}

async fn write_body(response: reqwest::Response, path: &Path) -> Result<(), DownloadError> {
    let mut dest = File::create(path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        dest.write_all(&chunk?).await?;
    }
    dest.flush().await?;
    Ok(())
}
