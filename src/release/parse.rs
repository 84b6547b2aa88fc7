use serde_json::{Map, Value};
use tracing::debug;

use super::{DataPackAsset, ReleaseInfo};
use crate::config::FeedKind;
use crate::core::LauncherError;

type JsonObject = Map<String, Value>;

/// Extract a [`ReleaseInfo`] from a decoded release feed.
///
/// Checks run in a fixed order so the reported reason names the first
/// expectation that failed: root shape, non-empty `assets`, `name`,
/// `target_commitish` (when `track_commit`), then the first asset's
/// `browser_download_url` and `size`. Assets are taken by position: index 0 is
/// the archive, index 1 the data pack. An incomplete second asset is ignored.
pub fn parse_release(
    root: &Value,
    kind: FeedKind,
    track_commit: bool,
    with_data_pack: bool,
) -> Result<ReleaseInfo, LauncherError> {
    let release = match kind {
        FeedKind::Latest => root
            .as_object()
            .ok_or_else(|| LauncherError::no_release("release feed is not a JSON object"))?,
        FeedKind::List => {
            let releases = root
                .as_array()
                .ok_or_else(|| LauncherError::no_release("release list is not a JSON array"))?;
            releases
                .first()
                .ok_or_else(|| LauncherError::no_release("release list is empty"))?
                .as_object()
                .ok_or_else(|| LauncherError::no_release("latest release is not a JSON object"))?
        }
    };

    let assets = release
        .get("assets")
        .and_then(Value::as_array)
        .ok_or_else(|| LauncherError::no_release("release has no assets array"))?;
    if assets.is_empty() {
        return Err(LauncherError::no_release("release has no assets"));
    }

    let version_label = string_field(release, "name", "release")?.to_string();

    let commit_id = if track_commit {
        Some(string_field(release, "target_commitish", "release")?.to_string())
    } else {
        None
    };

    let archive = asset_object(&assets[0], 0)?;
    let archive_url = string_field(archive, "browser_download_url", "asset 0")?.to_string();
    let archive_size = size_field(archive, "asset 0")?;

    let data_pack = if with_data_pack {
        assets.get(1).and_then(data_pack_asset)
    } else {
        None
    };

    if with_data_pack && data_pack.is_none() {
        debug!("Release {version_label} has no usable data pack asset");
    }

    Ok(ReleaseInfo {
        version_label,
        commit_id,
        archive_url,
        archive_size,
        data_pack,
        data_pack_commit_id: None,
    })
}

/// Asset 1 counts only when it carries both a URL and a size.
fn data_pack_asset(value: &Value) -> Option<DataPackAsset> {
    let asset = value.as_object()?;
    let url = asset.get("browser_download_url")?.as_str()?;
    let size = asset.get("size")?.as_u64()?;
    Some(DataPackAsset {
        url: url.to_string(),
        size,
    })
}

fn asset_object(value: &Value, index: usize) -> Result<&JsonObject, LauncherError> {
    value
        .as_object()
        .ok_or_else(|| LauncherError::no_release(format!("asset {index} is not a JSON object")))
}

fn string_field<'v>(
    object: &'v JsonObject,
    field: &str,
    owner: &str,
) -> Result<&'v str, LauncherError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| LauncherError::no_release(format!("{owner} has no string field '{field}'")))
}

fn size_field(object: &JsonObject, owner: &str) -> Result<u64, LauncherError> {
    object
        .get("size")
        .and_then(Value::as_u64)
        .ok_or_else(|| LauncherError::no_release(format!("{owner} has no numeric field 'size'")))
}
