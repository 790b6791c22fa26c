//! BioModels API response types.
//!
//! Only the fields the harness reads are modeled; everything else in the
//! metadata document is ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// Accept `null` wherever a missing field would fall back to its default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET /model/identifiers` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierList {
    pub models: Vec<String>,
}

/// `GET /{model_id}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub format: ModelFormat,
    pub files: ModelFiles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFormat {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFiles {
    #[serde(default)]
    pub main: Vec<FileEntry>,

    /// `None` when the record has no `additional` key at all.
    #[serde(default)]
    pub additional: Option<Vec<FileEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_model_info() {
        let value = json!({
            "name": "Edelstein1996 - EPSP ACh event",
            "publicationId": "BIOMD0000000001",
            "format": {"name": "SBML", "version": "L2V4"},
            "files": {
                "main": [{"name": "BIOMD0000000001_url.xml", "fileSize": 1234}],
                "additional": [
                    {"name": "BIOMD0000000001.sedml", "description": "SED-ML file"},
                    {"name": "BIOMD0000000001.png", "description": "Reaction graph"}
                ]
            }
        });

        let info: ModelInfo = serde_json::from_value(value).unwrap();
        assert_eq!(info.name, "Edelstein1996 - EPSP ACh event");
        assert_eq!(info.format.name, "SBML");
        assert_eq!(info.files.main[0].name, "BIOMD0000000001_url.xml");
        assert_eq!(info.files.main[0].description, "");
        assert_eq!(info.files.additional.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_parse_model_info_without_additional() {
        let value = json!({
            "name": "m",
            "format": {"name": "SBML"},
            "files": {"main": [{"name": "model.xml"}]}
        });
        let info: ModelInfo = serde_json::from_value(value).unwrap();
        assert!(info.files.additional.is_none());
    }

    #[test]
    fn test_parse_null_name_and_description() {
        let value = json!({
            "name": null,
            "format": {"name": "SBML"},
            "files": {
                "main": [{"name": "model.xml", "description": null}],
                "additional": [{"name": "sim.sedml", "description": null}]
            }
        });
        let info: ModelInfo = serde_json::from_value(value).unwrap();
        assert_eq!(info.name, "");
        assert_eq!(info.files.main[0].description, "");
        assert_eq!(info.files.additional.unwrap()[0].description, "");
    }

    #[test]
    fn test_parse_identifiers() {
        let list: IdentifierList =
            serde_json::from_value(json!({"models": ["BIOMD0000000001", "MODEL1006230000"]})).unwrap();
        assert_eq!(list.models.len(), 2);
    }

    #[test]
    fn test_missing_format_is_error() {
        let result = serde_json::from_value::<ModelInfo>(json!({"name": "m", "files": {"main": []}}));
        assert!(result.is_err());
    }
}
