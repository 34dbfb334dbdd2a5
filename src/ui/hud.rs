//! HUD: an ordered set of widgets drawn over a level

use log::debug;

use super::widget::{Widget, WidgetId};
use crate::error::Result;
use crate::event::{EventStream, KeyBindings, KeySignature};
use crate::geometry::Rect;
use crate::render::Renderer;
use crate::screen::EventLoopControl;

/// Widgets are updated and drawn in insertion order. A hidden HUD neither
/// draws nor sees events.
pub struct Hud {
    widgets: Vec<(WidgetId, Box<dyn Widget>)>,
    next_id: u32,
    visible: bool,
    bindings: KeyBindings<Hud>,
}

impl Hud {
    pub fn new() -> Self {
        Self {
            widgets: Vec::new(),
            next_id: 0,
            visible: true,
            bindings: KeyBindings::new(),
        }
    }

    pub fn add(&mut self, widget: impl Widget) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        self.widgets.push((id, Box::new(widget)));
        id
    }

    /// Removes a widget, calling its `destroy`. Returns false for unknown ids.
    pub fn remove(&mut self, id: WidgetId) -> bool {
        match self.widgets.iter().position(|(wid, _)| *wid == id) {
            Some(index) => {
                let (_, mut widget) = self.widgets.remove(index);
                widget.destroy();
                true
            }
            None => false,
        }
    }

    pub fn get<W: Widget>(&self, id: WidgetId) -> Option<&W> {
        self.widgets
            .iter()
            .find(|(wid, _)| *wid == id)
            .and_then(|(_, widget)| widget.as_any().downcast_ref::<W>())
    }

    pub fn get_mut<W: Widget>(&mut self, id: WidgetId) -> Option<&mut W> {
        self.widgets
            .iter_mut()
            .find(|(wid, _)| *wid == id)
            .and_then(|(_, widget)| widget.as_any_mut().downcast_mut::<W>())
    }

    /// Screen rectangle of a widget, or `None` for unknown ids.
    pub fn bounds(&mut self, id: WidgetId, renderer: &mut dyn Renderer) -> Option<Rect> {
        self.widgets
            .iter_mut()
            .find(|(wid, _)| *wid == id)
            .map(|(_, widget)| widget.bounds(renderer))
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn on_key_pressed<F>(&mut self, key: impl Into<KeySignature>, handler: F)
    where
        F: FnMut(&mut Hud) -> Option<EventLoopControl> + 'static,
    {
        self.bindings.on_key_pressed(key, handler);
    }

    /// Runs the HUD's key bindings, then every widget's `update`.
    pub fn update(&mut self, events: &mut EventStream) -> Option<EventLoopControl> {
        if !self.visible {
            return None;
        }

        let mut bindings = std::mem::take(&mut self.bindings);
        let mut control = bindings.dispatch(self, events);
        let added = std::mem::replace(&mut self.bindings, bindings);
        self.bindings.extend(added);

        for (_, widget) in self.widgets.iter_mut() {
            control = EventLoopControl::strongest(control, widget.update(events));
        }
        if let Some(control) = control {
            debug!("hud requested {:?}", control);
        }
        control
    }

    pub fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        for (_, widget) in self.widgets.iter_mut() {
            widget.draw(renderer)?;
        }
        Ok(())
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Hud {
    fn drop(&mut self) {
        for (_, widget) in self.widgets.iter_mut() {
            widget.destroy();
        }
    }
}
