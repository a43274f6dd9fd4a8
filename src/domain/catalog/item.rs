//! Sellable catalog items: photos and upload plans.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Money;
use crate::domain::foundation::{ItemId, UserId, ValidationError};

/// The two kinds of thing a buyer can pay for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Photo,
    Plan,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Photo => "photo",
            ItemKind::Plan => "plan",
        }
    }
}

impl Default for ItemKind {
    fn default() -> Self {
        ItemKind::Photo
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(ItemKind::Photo),
            "plan" => Ok(ItemKind::Plan),
            other => Err(ValidationError::invalid_format(
                "item_type",
                format!("unknown item type '{}'", other),
            )),
        }
    }
}

/// Reference to a catalog item by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: ItemId,
}

impl ItemRef {
    pub fn photo(id: ItemId) -> Self {
        Self {
            kind: ItemKind::Photo,
            id,
        }
    }

    pub fn plan(id: ItemId) -> Self {
        Self {
            kind: ItemKind::Plan,
            id,
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A photo listed for licensing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: ItemId,
    pub owner_id: UserId,
    pub price: Money,
    pub is_published: bool,
    /// Key of the original file in the object store.
    pub object_key: String,
}

/// A time-boxed upload pack sold to sellers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: ItemId,
    pub price: Money,
    pub upload_limit: u32,
    pub max_price_per_item: Money,
    pub duration_days: u32,
}

impl Plan {
    pub fn terms(&self) -> PlanTerms {
        PlanTerms {
            upload_limit: self.upload_limit,
            max_price_per_item: self.max_price_per_item.clone(),
            duration_days: self.duration_days,
        }
    }
}

/// What a plan payment buys, copied onto the order when it is issued.
/// Later catalog edits never change what an existing order grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTerms {
    pub upload_limit: u32,
    pub max_price_per_item: Money,
    pub duration_days: u32,
}

/// Either kind of catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Photo(Photo),
    Plan(Plan),
}

impl Item {
    pub fn id(&self) -> &ItemId {
        match self {
            Item::Photo(p) => &p.id,
            Item::Plan(p) => &p.id,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Photo(_) => ItemKind::Photo,
            Item::Plan(_) => ItemKind::Plan,
        }
    }

    pub fn price(&self) -> &Money {
        match self {
            Item::Photo(p) => &p.price,
            Item::Plan(p) => &p.price,
        }
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            kind: self.kind(),
            id: self.id().clone(),
        }
    }
}
