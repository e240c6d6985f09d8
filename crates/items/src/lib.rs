//! Items: individually tracked units of a product (keyed, boxed).

pub mod item;

pub use item::{Item, ItemDraft, ItemPatch};
