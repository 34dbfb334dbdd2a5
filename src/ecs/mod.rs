//! Entity-component store
//!
//! - `entity`: generational entity handles
//! - `component`: sparse per-kind columns
//! - `components`: the gameplay component types
//! - `store`: `ComponentStore`, the typed and dynamic access API

mod component;
mod components;
mod entity;
mod store;

pub use component::ComponentStorage;
pub use components::*;
pub use entity::{Entity, EntityAllocator};
pub use store::{transfer, Component, ComponentKind, ComponentStore, ComponentType};
