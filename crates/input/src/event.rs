/// Keys the viewer reacts to or logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Space,
    /// Any key the viewer doesn't react to.
    Other,
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// A window/input event, decoupled from the windowing library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Resized { width: u32, height: u32 },
    Key { code: KeyCode, pressed: bool },
    CursorMoved { x: f64, y: f64 },
    CursorEntered(bool),
    MouseButton { button: Button, pressed: bool },
    Scroll { dx: f32, dy: f32 },
}

/// Discriminant of an [`InputEvent`], used as the dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Resized,
    Key,
    CursorMoved,
    CursorEntered,
    MouseButton,
    Scroll,
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::Resized { .. } => EventKind::Resized,
            InputEvent::Key { .. } => EventKind::Key,
            InputEvent::CursorMoved { .. } => EventKind::CursorMoved,
            InputEvent::CursorEntered(_) => EventKind::CursorEntered,
            InputEvent::MouseButton { .. } => EventKind::MouseButton,
            InputEvent::Scroll { .. } => EventKind::Scroll,
        }
    }
}
