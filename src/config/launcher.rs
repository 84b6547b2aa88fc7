use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete launcher configuration, normally read from `launcher.toml`.
///
/// Every section and field has a default, so an empty file (or no file at all)
/// gives the stock launcher: latest release of `salvoilmiosi/bang-sdl`,
/// version marker comparison on the release name, no data pack, and the
/// client/server executables started as child processes.
///
/// ## TOML Example
/// ```toml
/// [feed]
/// track_commit = true
///
/// [data_pack]
/// enabled = true
/// file = "cards.pak"
///
/// [install]
/// launch_on_update_failure = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Where releases are published.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Local installation layout.
    #[serde(default)]
    pub install: InstallConfig,

    /// Optional second release asset.
    #[serde(default)]
    pub data_pack: DataPackConfig,

    /// How the installed version is determined.
    #[serde(default)]
    pub version: VersionConfig,

    /// How the installed application is started.
    #[serde(default)]
    pub launch: LaunchConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Shape of the release listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// `/releases/latest`, a single release object.
    #[default]
    Latest,
    /// `/releases`, an array with the newest release first.
    List,
}

/// Remote release feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the GitHub-compatible REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Repository owner.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Repository name.
    #[serde(default = "default_repo")]
    pub repo: String,

    #[serde(default)]
    pub kind: FeedKind,

    /// Compare installations by release commit (`target_commitish`) instead of
    /// the release name. Re-tagging a release on a new commit then counts as a
    /// new version.
    #[serde(default)]
    pub track_commit: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            owner: default_owner(),
            repo: default_repo(),
            kind: FeedKind::default(),
            track_commit: false,
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_owner() -> String {
    "salvoilmiosi".to_string()
}

fn default_repo() -> String {
    "bang-sdl".to_string()
}

/// Local install layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Install directory. Defaults to the directory containing the launcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Name of the version marker file inside the install directory.
    #[serde(default = "default_marker_file")]
    pub marker_file: String,

    /// Still start the previously installed game when the update check or the
    /// download fails. Never applies after extraction has started.
    #[serde(default)]
    pub launch_on_update_failure: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            dir: None,
            marker_file: default_marker_file(),
            launch_on_update_failure: false,
        }
    }
}

fn default_marker_file() -> String {
    "version.txt".to_string()
}

/// Second release asset carrying the card resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPackConfig {
    #[serde(default)]
    pub enabled: bool,

    /// File name of the data pack inside the install directory.
    #[serde(default = "default_data_pack_file")]
    pub file: String,

    /// Tree entry looked up in the release commit.
    #[serde(default = "default_tree_root")]
    pub tree_root: String,

    /// Tree entry looked up inside `tree_root`; its sha versions the data pack.
    #[serde(default = "default_tree_entry")]
    pub tree_entry: String,
}

impl Default for DataPackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: default_data_pack_file(),
            tree_root: default_tree_root(),
            tree_entry: default_tree_entry(),
        }
    }
}

fn default_data_pack_file() -> String {
    "cards.pak".to_string()
}

fn default_tree_root() -> String {
    "resources".to_string()
}

fn default_tree_entry() -> String {
    "cards".to_string()
}

/// Where the installed main version comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSource {
    /// The marker file written after each install.
    #[default]
    Marker,
    /// Ask the installed binary, falling back to the marker.
    Introspection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionConfig {
    #[serde(default)]
    pub source: VersionSource,
}

/// How the installed application is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMethod {
    /// Spawn the client or server executable.
    #[default]
    Process,
    /// Load the game library and call its entry point (feature `dylib`).
    Library,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    #[serde(default)]
    pub method: LaunchMethod,

    /// Client executable name, without the platform suffix.
    #[serde(default = "default_client_binary")]
    pub client_binary: String,

    /// Server executable name, without the platform suffix.
    #[serde(default = "default_server_binary")]
    pub server_binary: String,

    /// Library base name; the platform prefix and extension are added.
    #[serde(default = "default_library")]
    pub library: String,

    /// `extern "C" fn(c_int) -> c_int` entry point.
    #[serde(default = "default_entry_symbol")]
    pub entry_symbol: String,

    /// `extern "C" fn() -> *const c_char` returning the build commit.
    #[serde(default = "default_version_symbol")]
    pub version_symbol: String,

    /// `extern "C" fn() -> *const c_char` returning the data pack commit.
    #[serde(default = "default_content_version_symbol")]
    pub content_version_symbol: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            method: LaunchMethod::default(),
            client_binary: default_client_binary(),
            server_binary: default_server_binary(),
            library: default_library(),
            entry_symbol: default_entry_symbol(),
            version_symbol: default_version_symbol(),
            content_version_symbol: default_content_version_symbol(),
        }
    }
}

fn default_client_binary() -> String {
    "bangclient".to_string()
}

fn default_server_binary() -> String {
    "bangserver".to_string()
}

fn default_library() -> String {
    "bang".to_string()
}

fn default_entry_symbol() -> String {
    "bang_main".to_string()
}

fn default_version_symbol() -> String {
    "bang_version_commit".to_string()
}

fn default_content_version_symbol() -> String {
    "bang_content_commit".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// GitHub rejects API requests without a user agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Maximum silence on an open connection before the read fails, in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("bang-launcher/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_connect_timeout() -> u64 {
    15
}

const fn default_read_timeout() -> u64 {
    60
}
