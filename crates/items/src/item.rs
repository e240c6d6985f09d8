use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{DomainResult, Entity, ItemId, ProductId, Resource, error::require_non_blank};

/// A single tracked unit of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub product_id: ProductId,
    /// Unit key (serial / activation key).
    pub key: String,
    /// Key of the box the unit ships in.
    pub box_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemDraft {
    pub product_id: ProductId,
    pub key: String,
    pub box_key: String,
}

/// Items never move between products; only the keys are editable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    pub key: Option<String>,
    pub box_key: Option<String>,
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &ItemId {
        &self.id
    }
}

impl Resource for Item {
    type Draft = ItemDraft;
    type Patch = ItemPatch;

    const KIND: &'static str = "item";

    fn create(id: ItemId, draft: ItemDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        require_non_blank("key", &draft.key)?;
        require_non_blank("box_key", &draft.box_key)?;
        Ok(Self {
            id,
            product_id: draft.product_id,
            key: draft.key,
            box_key: draft.box_key,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, patch: ItemPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(key) = &patch.key {
            require_non_blank("key", key)?;
        }
        if let Some(box_key) = &patch.box_key {
            require_non_blank("box_key", box_key)?;
        }
        if let Some(key) = patch.key {
            self.key = key;
        }
        if let Some(box_key) = patch.box_key {
            self.box_key = box_key;
        }
        self.updated_at = now;
        Ok(())
    }
}
