use serde_json::{Value, json};

/// Body of `GET /releases/latest` with the given assets, in order.
pub fn release_json(name: &str, commit: Option<&str>, assets: &[(&str, u64)]) -> Value {
    let assets: Vec<Value> = assets
        .iter()
        .enumerate()
        .map(|(index, (url, size))| {
            json!({
                "id": index + 1,
                "name": url.rsplit('/').next().unwrap_or(url),
                "browser_download_url": url,
                "size": size,
                "content_type": "application/zip",
            })
        })
        .collect();

    let mut release = json!({
        "tag_name": name,
        "name": name,
        "draft": false,
        "prerelease": false,
        "assets": assets,
    });
    if let Some(commit) = commit {
        release["target_commitish"] = Value::String(commit.to_string());
    }
    release
}

/// Body of `GET /releases`: the given releases, newest first.
pub fn release_list_json(releases: Vec<Value>) -> Value {
    Value::Array(releases)
}

/// Body of `GET /git/trees/{sha}` from `(path, url, sha)` triples.
pub fn tree_json(entries: &[(&str, &str, &str)]) -> Value {
    let tree: Vec<Value> = entries
        .iter()
        .map(|(path, url, sha)| {
            json!({
                "path": path,
                "mode": "040000",
                "type": "tree",
                "sha": sha,
                "url": url,
            })
        })
        .collect();

    json!({
        "sha": "0000000000000000000000000000000000000000",
        "tree": tree,
        "truncated": false,
    })
}
