//! Key handler table
//!
//! Handlers are keyed by key plus exact modifier set and run synchronously
//! while a frame's events are dispatched. A handled event stops
//! propagating.

use log::debug;

use super::{EventKind, EventStream, Key, Modifiers};
use crate::screen::EventLoopControl;

/// A key together with the modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySignature {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeySignature {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

impl From<Key> for KeySignature {
    fn from(key: Key) -> Self {
        Self::new(key, Modifiers::empty())
    }
}

/// Called with the owner of the bindings when its key is pressed.
pub type KeyHandler<C> = Box<dyn FnMut(&mut C) -> Option<EventLoopControl>>;

/// Key-pressed handlers of a `C` (a `Level`, a `Hud`, ...).
pub struct KeyBindings<C> {
    handlers: Vec<(KeySignature, KeyHandler<C>)>,
}

impl<C> KeyBindings<C> {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Registers `handler` for `signature`. Several handlers may share a
    /// signature; they run in registration order.
    pub fn on_key_pressed<F>(&mut self, signature: impl Into<KeySignature>, handler: F)
    where
        F: FnMut(&mut C) -> Option<EventLoopControl> + 'static,
    {
        self.handlers.push((signature.into(), Box::new(handler)));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the handlers matching this frame's key presses.
    ///
    /// Repeats are ignored. The strongest control any handler returned wins.
    pub fn dispatch(&mut self, owner: &mut C, events: &mut EventStream) -> Option<EventLoopControl> {
        let mut control = None;
        if self.handlers.is_empty() {
            return control;
        }

        for event in events.iter_mut() {
            let EventKind::KeyDown { key, modifiers, repeat: false } = event.kind else {
                continue;
            };
            let signature = KeySignature::new(key, modifiers);

            let mut handled = false;
            for (bound, handler) in self.handlers.iter_mut() {
                if *bound == signature {
                    handled = true;
                    control = EventLoopControl::strongest(control, handler(owner));
                }
            }
            if handled {
                debug!("key binding fired for {:?}", signature);
                event.stop_propagation();
            }
        }
        control
    }

    /// Appends `other`'s handlers after this table's.
    pub fn extend(&mut self, other: KeyBindings<C>) {
        self.handlers.extend(other.handlers);
    }
}

impl<C> Default for KeyBindings<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for KeyBindings<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|(signature, _)| signature))
            .finish()
    }
}
