//! Data models for TeraBox API responses and relay output.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One file or folder entry from the share listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareEntry {
    #[serde(default)]
    pub server_filename: Option<String>,
    #[serde(default, deserialize_with = "deserialize_u64")]
    pub size: u64,
    #[serde(default, alias = "fsid", deserialize_with = "deserialize_string")]
    pub fs_id: String,
    #[serde(default, deserialize_with = "deserialize_u64")]
    pub isdir: u64,
    #[serde(default)]
    pub path: String,
}

impl ShareEntry {
    pub fn is_dir(&self) -> bool {
        self.isdir == 1
    }
}

/// Response from the `shorturlinfo` listing endpoint.
///
/// `errno` is left for callers to inspect. Credential fields are kept as
/// raw JSON so they can be echoed back untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareListResponse {
    #[serde(default = "missing_errno")]
    pub errno: i64,
    #[serde(default)]
    pub errmsg: Option<String>,
    #[serde(default)]
    pub share_title: Option<String>,
    #[serde(default)]
    pub uk: Value,
    #[serde(default)]
    pub shareid: Value,
    #[serde(default)]
    pub sign: Value,
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub list: Vec<ShareEntry>,
}

/// A body without `errno` is never treated as success.
fn missing_errno() -> i64 {
    -1
}

impl ShareListResponse {
    pub fn is_ok(&self) -> bool {
        self.errno == 0
    }

    /// Credentials needed by every later call within this share session.
    pub fn credentials(&self) -> ShareCredentials {
        ShareCredentials {
            uk: value_to_string(&self.uk),
            shareid: value_to_string(&self.shareid),
            sign: value_to_string(&self.sign),
            timestamp: value_to_string(&self.timestamp),
        }
    }
}

/// Response from the `download` endpoint.
#[derive(Debug, Deserialize)]
pub struct DownloadResponse {
    #[serde(default = "missing_errno")]
    pub errno: i64,
    #[serde(default)]
    pub dlink: Vec<DownloadLink>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadLink {
    #[serde(default)]
    pub url: Option<String>,
}

/// Session-scoped credentials returned with the base listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareCredentials {
    pub uk: String,
    pub shareid: String,
    pub sign: String,
    pub timestamp: String,
}

/// Everything a traversal needs to talk to one share.
#[derive(Debug, Clone)]
pub struct ShareSession {
    pub surl: String,
    pub credentials: ShareCredentials,
}

/// A listing entry as returned by the basic `/terabox` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRecord {
    pub file_name: Option<String>,
    pub size: u64,
    pub size_readable: String,
    pub is_dir: bool,
    pub fs_id: String,
    pub path: String,
}

impl From<&ShareEntry> for EntryRecord {
    fn from(entry: &ShareEntry) -> Self {
        Self {
            file_name: entry.server_filename.clone(),
            size: entry.size,
            size_readable: format_size(entry.size),
            is_dir: entry.is_dir(),
            fs_id: entry.fs_id.clone(),
            path: entry.path.clone(),
        }
    }
}

/// A file in the fully expanded tree, with its resolved download link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_name: String,
    pub path: String,
    pub size: u64,
    pub size_readable: String,
    pub fs_id: String,
    pub download_url: Option<String>,
    pub is_dir: bool,
}

impl FileRecord {
    pub fn new(entry: &ShareEntry, download_url: Option<String>) -> Self {
        Self {
            file_name: entry
                .server_filename
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            path: entry.path.clone(),
            size: entry.size,
            size_readable: format_size(entry.size),
            fs_id: entry.fs_id.clone(),
            download_url,
            is_dir: false,
        }
    }
}

/// Body of `GET /terabox`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareInfoResponse {
    pub success: bool,
    pub title: String,
    pub uk: Value,
    pub shareid: Value,
    pub sign: Value,
    pub timestamp: Value,
    pub total_files: usize,
    pub total_folders: usize,
    pub files: Vec<EntryRecord>,
}

/// Body of `GET /terabox/files`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesResponse {
    pub success: bool,
    pub title: String,
    pub total_files: usize,
    pub total_size: String,
    pub files: Vec<FileRecord>,
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Render a provider scalar the way it is sent back as a query parameter.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Num(serde_json::Number),
}

// TeraBox sends the same field as a number or a string depending on the endpoint.
fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Str(s)) if s.is_empty() => Ok(0),
        Some(StringOrNumber::Str(s)) => s.parse().map_err(Error::custom),
        Some(StringOrNumber::Num(n)) => n
            .as_u64()
            .ok_or_else(|| Error::custom(format!("expected unsigned integer, got {}", n))),
        None => Ok(0),
    }
}

fn deserialize_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Str(s)) => s,
        Some(StringOrNumber::Num(n)) => n.to_string(),
        None => String::new(),
    })
}
