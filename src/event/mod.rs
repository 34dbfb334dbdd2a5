//! Input events
//!
//! The platform turns whatever the backend reports into an ordered list of
//! `Event`s once per frame. Consumers walk the list through an
//! `EventStream`; a consumer that handles an event calls
//! `stop_propagation` and later consumers no longer see it.

mod bindings;
mod keys;

pub use bindings::{KeyBindings, KeyHandler, KeySignature};
pub use keys::{Key, Modifiers, MouseButton};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// The window was asked to close
    Quit,
    KeyDown {
        key: Key,
        modifiers: Modifiers,
        /// Auto-repeat while the key is held
        repeat: bool,
    },
    KeyUp {
        key: Key,
        modifiers: Modifiers,
    },
    /// Coordinates are screen pixels, y down
    MouseButtonDown {
        button: MouseButton,
        x: f32,
        y: f32,
    },
    MouseButtonUp {
        button: MouseButton,
        x: f32,
        y: f32,
    },
    MouseMotion {
        x: f32,
        y: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    propagate: bool,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, propagate: true }
    }

    pub fn key_down(key: Key) -> Self {
        Self::new(EventKind::KeyDown {
            key,
            modifiers: Modifiers::empty(),
            repeat: false,
        })
    }

    pub fn key_up(key: Key) -> Self {
        Self::new(EventKind::KeyUp {
            key,
            modifiers: Modifiers::empty(),
        })
    }

    /// Hides this event from every later consumer.
    pub fn stop_propagation(&mut self) {
        self.propagate = false;
    }

    pub fn is_propagating(&self) -> bool {
        self.propagate
    }
}

/// One frame's events, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct EventStream {
    events: Vec<Event>,
}

impl EventStream {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events nobody has stopped yet.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.propagate)
    }

    /// Like `iter`, but handlers may stop the events they consume.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Event> {
        self.events.iter_mut().filter(|e| e.propagate)
    }

    /// Every event, stopped or not.
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains_quit(&self) -> bool {
        self.events.iter().any(|e| e.kind == EventKind::Quit)
    }
}

impl From<Vec<Event>> for EventStream {
    fn from(events: Vec<Event>) -> Self {
        Self::new(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_events_are_skipped() {
        let mut stream = EventStream::from(vec![
            Event::key_down(Key::A),
            Event::key_down(Key::B),
            Event::key_up(Key::A),
        ]);

        for event in stream.iter_mut() {
            if let EventKind::KeyDown { key: Key::B, .. } = event.kind {
                event.stop_propagation();
            }
        }

        let remaining: Vec<_> = stream.iter().map(|e| e.kind).collect();
        assert_eq!(remaining, vec![Event::key_down(Key::A).kind, Event::key_up(Key::A).kind]);
        assert_eq!(stream.all().len(), 3);
    }

    #[test]
    fn test_quit_is_seen_even_when_stopped() {
        let mut quit = Event::new(EventKind::Quit);
        quit.stop_propagation();
        let stream = EventStream::from(vec![quit]);
        assert!(stream.contains_quit());
        assert_eq!(stream.iter().count(), 0);
    }
}
