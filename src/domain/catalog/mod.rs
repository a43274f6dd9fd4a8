//! Catalog module - photos, plans, and money.

mod item;
mod money;

pub use item::{Item, ItemKind, ItemRef, Photo, Plan, PlanTerms};
pub use money::{Currency, Money};
