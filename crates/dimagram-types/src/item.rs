use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::id::ItemId;

/// One entry of the Queue or the Archive.
///
/// The wire shape is always `{id, url, description, credits}`. Missing,
/// `null` and empty text fields all load as `None`, and `None` is written
/// back as `""` because the editing frontend expects strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumItem {
    pub id: ItemId,
    pub url: String,
    #[serde(
        default,
        deserialize_with = "optional_text",
        serialize_with = "text_or_empty"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        serialize_with = "text_or_empty"
    )]
    pub credits: Option<String>,
}

impl AlbumItem {
    /// Create an item with no description or credits.
    pub fn new(id: ItemId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            description: None,
            credits: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_credits(mut self, credits: impl Into<String>) -> Self {
        self.credits = Some(credits.into());
        self
    }

    /// Serialized form used for the remote pointer object.
    pub fn to_pointer_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn text_or_empty<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_legacy_numeric_id_without_optional_fields() {
        let item: AlbumItem = serde_json::from_value(json!({"id": 3, "url": "https://cdn/x.jpg"})).unwrap();
        assert_eq!(item.id.as_str(), "3");
        assert_eq!(item.description, None);
        assert_eq!(item.credits, None);
    }

    #[test]
    fn null_and_empty_text_load_as_none() {
        let item: AlbumItem = serde_json::from_value(json!({
            "id": "a", "url": "u", "description": null, "credits": ""
        }))
        .unwrap();
        assert_eq!(item.description, None);
        assert_eq!(item.credits, None);
    }

    #[test]
    fn writes_full_wire_shape() {
        let item = AlbumItem::new(ItemId::new("1").unwrap(), "a").with_credits("me");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value, json!({"id": "1", "url": "a", "description": "", "credits": "me"}));
    }

    #[test]
    fn missing_url_is_rejected() {
        assert!(serde_json::from_value::<AlbumItem>(json!({"id": "1"})).is_err());
    }

    #[test]
    fn pointer_json_matches_item() {
        let item = AlbumItem::new(ItemId::new("9").unwrap(), "b").with_description("sunset");
        let bytes = item.to_pointer_json().unwrap();
        let back: AlbumItem = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, item);
    }
}
