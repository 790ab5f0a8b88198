//! Response bodies.
//!
//! Field names follow the JSON shapes deployed clients already parse (`dirs`, `result`,
//! `data`), so they must not be renamed.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
}

/// One member of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EntryRes {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

/// Body of `GET /collections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListCollectionsRes {
    pub dirs: Vec<EntryRes>,
}

/// Body of `GET /collections/{collection_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListEntriesRes {
    pub result: Vec<EntryRes>,
}

/// Body of `GET /weathercollections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConditionEntriesRes {
    pub result: Vec<EntryRes>,
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadSummaryRes {
    pub name: String,
    pub mimetype: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadFailureRes {
    pub name: String,
    pub reason: String,
}

/// Body of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadRes {
    pub status: bool,
    pub message: String,
    pub data: Vec<UploadSummaryRes>,
}

/// Body of every error response.
///
/// `stored` and `failed` are only present when an upload partially failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored: Option<Vec<UploadSummaryRes>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<Vec<UploadFailureRes>>,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            stored: None,
            failed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_uses_type_key() {
        let entry = EntryRes {
            name: "Snow Day".into(),
            entry_type: EntryType::Directory,
        };
        assert_eq!(
            serde_json::to_value(entry).unwrap(),
            json!({"name": "Snow Day", "type": "directory"})
        );
    }

    #[test]
    fn plain_error_omits_upload_fields() {
        assert_eq!(
            serde_json::to_value(ErrorRes::new("nope")).unwrap(),
            json!({"error": "nope"})
        );
    }
}
