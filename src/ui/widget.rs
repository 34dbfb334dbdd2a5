//! The widget trait

use std::any::Any;

use crate::error::Result;
use crate::event::EventStream;
use crate::geometry::Rect;
use crate::render::Renderer;
use crate::screen::EventLoopControl;

/// Handle of a widget inside a `Hud`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) u32);

/// An anchored rectangle drawn over a level.
pub trait Widget: Any {
    /// Sees the frame's events before the level does. Widgets stop the
    /// events they consume.
    fn update(&mut self, _events: &mut EventStream) -> Option<EventLoopControl> {
        None
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<()>;

    /// Screen rectangle covered by the widget, after applying its anchor.
    /// Widgets whose size depends on text measure it with `renderer`.
    fn bounds(&mut self, renderer: &mut dyn Renderer) -> Rect;

    /// Called once when the widget is removed from its HUD.
    fn destroy(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
