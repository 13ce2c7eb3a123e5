//! File-backed token store.
//!
//! Layout of the document:
//!
//! ```json
//! {
//!   "ghl":    { "access_token": "...", "refresh_token": "...", "expires_at": 1700000000000 },
//!   "podium": { "access_token": "...", "refresh_token": "...", "expires_at": 1700000000000 },
//!   "location_id": "loc_123"
//! }
//! ```
//!
//! Every operation is a whole-file read-modify-write with no locking. Two
//! writers racing (e.g. both OAuth callbacks landing at once) can lose an
//! update. The I/O is plain `std::fs` and blocks the calling runtime worker
//! for the duration of the read or write. Read failures are treated as an empty document and write failures
//! are logged; neither reaches the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

const LOCATION_ID_KEY: &str = "location_id";

/// Platforms that hold a token record in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ghl,
    Podium,
}

impl Platform {
    /// Key of this platform's record in the token document.
    pub fn key(self) -> &'static str {
        match self {
            Platform::Ghl => "ghl",
            Platform::Podium => "podium",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// OAuth credentials for one platform. `expires_at` is epoch milliseconds.
///
/// Every field is optional: an empty record means the platform has not been
/// connected yet, and `save` only writes the fields that are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl TokenRecord {
    /// True when there is no usable access token at `now_ms`.
    pub fn needs_refresh(&self, now_ms: i64) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(token), Some(expires_at)) => token.is_empty() || now_ms >= expires_at,
            _ => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.expires_at.is_none()
    }
}

/// Typed view of the whole token document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStoreDocument {
    #[serde(default)]
    pub ghl: Option<TokenRecord>,
    #[serde(default)]
    pub podium: Option<TokenRecord>,
    #[serde(default)]
    pub location_id: Option<String>,
}

/// Token store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge the present fields of `record` into the stored record.
    pub fn save(&self, platform: Platform, record: &TokenRecord) {
        let mut doc = self.read();

        let fields = match serde_json::to_value(record) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => Map::new(),
            Err(e) => {
                error!("tokenStore: failed to serialize {platform} record: {e}");
                return;
            }
        };

        match doc.get_mut(platform.key()) {
            Some(Value::Object(existing)) => existing.extend(fields),
            _ => {
                doc.insert(platform.key().to_string(), Value::Object(fields));
            }
        }

        self.write(&doc);
    }

    /// Last saved record for `platform`, or an empty record.
    pub fn load(&self, platform: Platform) -> TokenRecord {
        let doc = self.read();
        match doc.get(platform.key()) {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warn!("tokenStore: ignoring malformed {platform} record: {e}");
                TokenRecord::default()
            }),
            None => TokenRecord::default(),
        }
    }

    pub fn save_location_id(&self, location_id: &str) {
        let mut doc = self.read();
        doc.insert(
            LOCATION_ID_KEY.to_string(),
            Value::String(location_id.to_string()),
        );
        self.write(&doc);
    }

    pub fn location_id(&self) -> Option<String> {
        self.read()
            .get(LOCATION_ID_KEY)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    /// The whole document, for status reporting.
    pub fn snapshot(&self) -> TokenStoreDocument {
        TokenStoreDocument {
            ghl: self.record_if_present(Platform::Ghl),
            podium: self.record_if_present(Platform::Podium),
            location_id: self.location_id(),
        }
    }

    fn record_if_present(&self, platform: Platform) -> Option<TokenRecord> {
        Some(self.load(platform)).filter(|r| !r.is_empty())
    }

    fn read(&self) -> Map<String, Value> {
        if !self.path.exists() {
            return Map::new();
        }

        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                error!("tokenStore read error ({}): {e}", self.path.display());
                return Map::new();
            }
        };

        if raw.trim().is_empty() {
            return Map::new();
        }

        match serde_json::from_str(&raw) {
            Ok(Value::Object(doc)) => doc,
            Ok(_) => {
                error!("tokenStore read error ({}): not a JSON object", self.path.display());
                Map::new()
            }
            Err(e) => {
                error!("tokenStore read error ({}): {e}", self.path.display());
                Map::new()
            }
        }
    }

    fn write(&self, doc: &Map<String, Value>) {
        let json = match serde_json::to_string_pretty(doc) {
            Ok(json) => json,
            Err(e) => {
                error!("tokenStore write error: {e}");
                return;
            }
        };

        match std::fs::write(&self.path, json) {
            Ok(()) => debug!("tokenStore: wrote {}", self.path.display()),
            Err(e) => error!("tokenStore write error ({}): {e}", self.path.display()),
        }
    }
}
