//! Items of the remote collection (recipes) and their wire normalisation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Kept as the remote wrote it, so `2` is not stored back as `2.0`
    pub amount: Number,
    pub name: String,
}

/// A collection item as held in state. `ingredients` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Every other field the remote stores for the item, kept verbatim
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub ingredients: Vec<Ingredient>,
}

/// An item as returned by the remote, where the sub-collection may be absent or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteItem {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub ingredients: Option<Vec<Ingredient>>,
}

impl Item {
    pub fn new(fields: Map<String, Value>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            fields,
            ingredients,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }
}

impl From<RemoteItem> for Item {
    fn from(remote: RemoteItem) -> Self {
        Self {
            fields: remote.fields,
            ingredients: remote.ingredients.unwrap_or_default(),
        }
    }
}

/// Default every missing sub-collection to empty, preserving order.
pub fn normalize(items: Vec<RemoteItem>) -> Vec<Item> {
    items.into_iter().map(Item::from).collect()
}
