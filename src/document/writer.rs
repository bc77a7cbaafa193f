use std::{
    io,
    path::{Component, Path, PathBuf},
};

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::{fs, io::AsyncWriteExt};

use crate::error::{ApiTesterError, ApiTesterResult};

static NAME_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[/\\:]").expect("valid regex"));
static TIMESTAMP_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[:.]").expect("valid regex"));

/// True when `folder` names a non-empty location inside the vault: no
/// root, drive prefix or `..` components.
pub fn is_vault_relative(folder: &str) -> bool {
    let path = Path::new(folder.trim());
    path.components().any(|c| matches!(c, Component::Normal(_)))
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Writes `contents` as a new note under `vault_root/folder`.
///
/// The folder is created when missing. The file itself is never
/// overwritten: a name collision fails with a persistence error and a
/// failed write leaves no file behind.
pub async fn write_document(
    vault_root: &Path,
    folder: &str,
    request_name: &str,
    saved_at: DateTime<Utc>,
    contents: &str,
) -> ApiTesterResult<PathBuf> {
    if !is_vault_relative(folder) {
        return Err(ApiTesterError::persistence(
            folder,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "save path must be a folder inside the vault",
            ),
        ));
    }
    let dir = vault_root.join(folder.trim());
    fs::create_dir_all(&dir)
        .await
        .map_err(|err| ApiTesterError::persistence(&dir, err))?;

    let path = dir.join(document_file_name(request_name, saved_at));
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|err| ApiTesterError::persistence(&path, err))?;

    let written = async {
        file.write_all(contents.as_bytes()).await?;
        file.flush().await
    }
    .await;

    if let Err(err) = written {
        drop(file);
        let _ = fs::remove_file(&path).await;
        return Err(ApiTesterError::persistence(&path, err));
    }

    tracing::info!(path = %path.display(), "saved request document");
    Ok(path)
}

pub fn document_file_name(request_name: &str, saved_at: DateTime<Utc>) -> String {
    let iso = saved_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    format!(
        "{}-{}.md",
        sanitize_name(request_name),
        TIMESTAMP_SEPARATORS.replace_all(&iso, "-")
    )
}

fn sanitize_name(name: &str) -> String {
    NAME_SEPARATORS.replace_all(name, "-").into_owned()
}
