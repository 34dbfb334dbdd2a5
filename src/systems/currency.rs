//! Currency pickup
//!
//! A `Wallet` entity whose collider overlapped a `Currency` entity during
//! the last physics step collects it. Collected pickups are despawned.

use log::debug;

use crate::ecs::{ComponentStore, Currency, Entity, Wallet};
use crate::error::Result;
use crate::physics::PhysicsEngine;

/// Returns the total value collected this frame.
pub fn collect_currency(store: &mut ComponentStore, physics: &PhysicsEngine) -> Result<u32> {
    let mut collected: Vec<Entity> = Vec::new();
    let mut total: u32 = 0;

    for wallet in store.entities_with::<Wallet>() {
        let Some(contacts) = physics.contacts(wallet) else {
            continue;
        };

        let mut gained: u32 = 0;
        for other in contacts.intersecting.iter().copied().chain(contacts.touching()) {
            if collected.contains(&other) {
                continue;
            }
            if let Some(currency) = store.try_get::<Currency>(other) {
                gained = gained.saturating_add(currency.value);
                collected.push(other);
            }
        }

        if gained > 0 {
            let wallet_value = &mut store.get_mut::<Wallet>(wallet)?.value;
            *wallet_value = wallet_value.saturating_add(gained);
            debug!("entity {} collected {} (wallet now {})", wallet, gained, *wallet_value);
            total = total.saturating_add(gained);
        }
    }

    for pickup in collected {
        store.despawn(pickup);
    }
    Ok(total)
}
