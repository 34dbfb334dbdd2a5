//! Retained-mode HUD widgets
//!
//! Widgets are anchored rectangles in screen pixels. A `Hud` owns a list of
//! them and sits on top of a level inside a `LevelScreen`.

mod button;
mod hud;
mod panel;
mod text;
mod theme;
mod widget;

pub use button::Button;
pub use hud::Hud;
pub use panel::Panel;
pub use text::Text;
pub use theme::*;
pub use widget::{Widget, WidgetId};
