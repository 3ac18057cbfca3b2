use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Campaign content summary as served by the hosting site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignIndex {
    pub game_characters: Vec<CharacterStub>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterStub {
    pub title: String,
    pub path: String,
}

/// Markers found on one character page. Each field is independent; a page
/// with neither is represented as `None` by the extractor, not as an empty
/// value of this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterExtraction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_sheet_attrs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_slug: Option<String>,
}

pub type StandardSheet = IndexMap<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    pub path: String,
    pub sheet_type: String,
    #[serde(serialize_with = "serialize_sheet_or_empty")]
    pub standardized_sheet: Option<StandardSheet>,
}

impl CharacterRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CampaignSnapshot {
    pub platform: Option<String>,
    pub characters: IndexMap<String, CharacterRecord>,
}

fn serialize_sheet_or_empty<S>(sheet: &Option<StandardSheet>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match sheet {
        Some(sheet) => sheet.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}
