//! Per-entity contact lists, rebuilt by every physics step

use crate::ecs::Entity;

/// What an entity touched during the last physics step.
///
/// Sides are from this entity's point of view in y-up world space:
/// `touching_bottom` holds whatever it stands on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contacts {
    pub touching_top: Vec<Entity>,
    pub touching_bottom: Vec<Entity>,
    pub touching_left: Vec<Entity>,
    pub touching_right: Vec<Entity>,
    /// Sensor overlaps, in either direction
    pub intersecting: Vec<Entity>,
}

impl Contacts {
    pub fn is_empty(&self) -> bool {
        self.touching_top.is_empty()
            && self.touching_bottom.is_empty()
            && self.touching_left.is_empty()
            && self.touching_right.is_empty()
            && self.intersecting.is_empty()
    }

    /// Every entity this one touches on any side.
    pub fn touching(&self) -> impl Iterator<Item = Entity> + '_ {
        self.touching_top
            .iter()
            .chain(&self.touching_bottom)
            .chain(&self.touching_left)
            .chain(&self.touching_right)
            .copied()
    }
}
