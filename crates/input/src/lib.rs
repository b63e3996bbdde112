//! Window/input event callback registry.
//!
//! The app translates windowing-library events into [`InputEvent`]s and runs
//! them through a [`Callbacks`] registry. Handlers are plain closures keyed
//! by event kind, so consumers never see the windowing library directly.
//!
//! # Invariants
//! - Handlers for one kind run in registration order.
//! - Events with no registered handler are dropped silently.

mod event;

pub use event::{Button, EventKind, InputEvent, KeyCode};

use std::collections::HashMap;

/// A registered event handler.
pub type Handler = Box<dyn FnMut(&InputEvent)>;

/// Registry of event handlers, dispatched by event kind.
///
/// Multiple handlers may be registered for the same kind; all of them run,
/// in the order they were appended.
#[derive(Default)]
pub struct Callbacks {
    handlers: HashMap<EventKind, Vec<Handler>>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    pub fn append(&mut self, kind: EventKind, handler: impl FnMut(&InputEvent) + 'static) {
        self.handlers
            .entry(kind)
            .or_default()
            .push(Box::new(handler));
    }

    /// Invoke every handler registered for the event's kind.
    pub fn dispatch(&mut self, event: &InputEvent) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
            for handler in handlers.iter_mut() {
                handler(event);
            }
        }
    }

    /// Number of handlers registered for a kind.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut counts: Vec<(EventKind, usize)> = self
            .handlers
            .iter()
            .map(|(k, v)| (*k, v.len()))
            .collect();
        counts.sort_by_key(|(k, _)| *k as u8);
        f.debug_struct("Callbacks").field("handlers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_run_for_their_kind_only() {
        let resizes = Rc::new(RefCell::new(0));
        let keys = Rc::new(RefCell::new(0));

        let mut callbacks = Callbacks::new();
        let r = resizes.clone();
        callbacks.append(EventKind::Resized, move |_| *r.borrow_mut() += 1);
        let k = keys.clone();
        callbacks.append(EventKind::Key, move |_| *k.borrow_mut() += 1);

        callbacks.dispatch(&InputEvent::Resized {
            width: 800,
            height: 600,
        });
        callbacks.dispatch(&InputEvent::Resized {
            width: 100,
            height: 100,
        });
        callbacks.dispatch(&InputEvent::Key {
            code: KeyCode::Escape,
            pressed: true,
        });

        assert_eq!(*resizes.borrow(), 2);
        assert_eq!(*keys.borrow(), 1);
    }

    #[test]
    fn multiple_handlers_run_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let mut callbacks = Callbacks::new();
        for tag in [1, 2, 3] {
            let o = order.clone();
            callbacks.append(EventKind::Scroll, move |_| o.borrow_mut().push(tag));
        }
        callbacks.dispatch(&InputEvent::Scroll { dx: 0.0, dy: 1.0 });

        assert_eq!(*order.borrow(), vec![1, 2, 3]);
        assert_eq!(callbacks.handler_count(EventKind::Scroll), 3);
    }

    #[test]
    fn unhandled_events_are_dropped() {
        let mut callbacks = Callbacks::new();
        // No handlers registered; must not panic.
        callbacks.dispatch(&InputEvent::CursorEntered(true));
        assert_eq!(callbacks.handler_count(EventKind::CursorEntered), 0);
    }

    #[test]
    fn handler_sees_event_payload() {
        let seen = Rc::new(RefCell::new((0u32, 0u32)));

        let mut callbacks = Callbacks::new();
        let s = seen.clone();
        callbacks.append(EventKind::Resized, move |event| {
            if let InputEvent::Resized { width, height } = event {
                *s.borrow_mut() = (*width, *height);
            }
        });
        callbacks.dispatch(&InputEvent::Resized {
            width: 1280,
            height: 720,
        });

        assert_eq!(*seen.borrow(), (1280, 720));
    }
}
