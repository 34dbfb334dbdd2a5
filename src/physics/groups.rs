//! Collision groups and the filter table deciding which groups meet

use bitflags::bitflags;

bitflags! {
    /// Classifies colliders for selective overlap testing. Combine with `|`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionGroups: u32 {
        const GROUND = 1 << 0;
        const PLAYER = 1 << 1;
        const ENEMY = 1 << 2;
        const PICKUP = 1 << 3;
    }
}

/// For each group bit, the groups it collides with.
///
/// A pair of colliders is tested when either side's row accepts the other,
/// so `allow(a, b)` is enough to make `a` and `b` meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionFilter {
    rows: Vec<(CollisionGroups, CollisionGroups)>,
}

impl CollisionFilter {
    /// A filter where nothing collides.
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    /// Makes every bit of `group` collide with `with`.
    pub fn allow(mut self, group: CollisionGroups, with: CollisionGroups) -> Self {
        for bit in group.iter() {
            match self.rows.iter_mut().find(|(g, _)| *g == bit) {
                Some((_, row)) => *row |= with,
                None => self.rows.push((bit, with)),
            }
        }
        self
    }

    /// Union of the rows of every bit in `group`.
    pub fn collides_with(&self, group: CollisionGroups) -> CollisionGroups {
        self.rows
            .iter()
            .filter(|(g, _)| group.intersects(*g))
            .fold(CollisionGroups::empty(), |acc, (_, row)| acc | *row)
    }

    pub fn should_test(&self, a: CollisionGroups, b: CollisionGroups) -> bool {
        self.collides_with(a).intersects(b) || self.collides_with(b).intersects(a)
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        use CollisionGroups as G;
        Self::empty()
            .allow(G::GROUND, G::PLAYER | G::ENEMY)
            .allow(G::PLAYER, G::GROUND | G::ENEMY | G::PICKUP)
            .allow(G::ENEMY, G::GROUND | G::PLAYER)
    }
}
