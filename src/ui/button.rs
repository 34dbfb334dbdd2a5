//! Clickable button

use std::any::Any;

use macroquad::math::Vec2;

use super::text::Text;
use super::theme::{BUTTON_BG, BUTTON_HOVER, BUTTON_PRESSED};
use super::widget::Widget;
use crate::error::Result;
use crate::event::{EventKind, EventStream, MouseButton};
use crate::geometry::{Anchor, Rect};
use crate::render::Renderer;
use crate::screen::EventLoopControl;

type ClickHandler = Box<dyn FnMut() -> Option<EventLoopControl>>;

/// A labelled rectangle that runs a handler when clicked.
///
/// A left click is a press and a release both inside the button. Mouse
/// button events inside the button are captured.
pub struct Button {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    anchor: Anchor,
    label: Text,
    hovered: bool,
    pressed: bool,
    on_click: Option<ClickHandler>,
}

impl Button {
    pub fn new(label: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            anchor: Anchor::NW,
            label: Text::new(label, 0.0, 0.0).with_anchor(Anchor::Center),
            hovered: false,
            pressed: false,
            on_click: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn on_click<F>(mut self, handler: F) -> Self
    where
        F: FnMut() -> Option<EventLoopControl> + 'static,
    {
        self.on_click = Some(Box::new(handler));
        self
    }

    pub fn label(&self) -> &Text {
        &self.label
    }

    pub fn label_mut(&mut self) -> &mut Text {
        &mut self.label
    }

    pub fn rect(&self) -> Rect {
        Rect::anchored(Vec2::new(self.x, self.y), self.width, self.height, self.anchor)
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    fn click(&mut self) -> Option<EventLoopControl> {
        self.on_click.as_mut().and_then(|handler| handler())
    }
}

impl Widget for Button {
    fn update(&mut self, events: &mut EventStream) -> Option<EventLoopControl> {
        let rect = self.rect();
        let mut control = None;

        for event in events.iter_mut() {
            match event.kind {
                EventKind::MouseMotion { x, y } => {
                    self.hovered = rect.contains(x, y);
                }
                EventKind::MouseButtonDown { button: MouseButton::Left, x, y } if rect.contains(x, y) => {
                    self.pressed = true;
                    event.stop_propagation();
                }
                EventKind::MouseButtonUp { button: MouseButton::Left, x, y } => {
                    let was_pressed = std::mem::take(&mut self.pressed);
                    if rect.contains(x, y) {
                        event.stop_propagation();
                        if was_pressed {
                            control = EventLoopControl::strongest(control, self.click());
                        }
                    }
                }
                _ => {}
            }
        }
        control
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let rect = self.rect();
        let color = if self.pressed {
            BUTTON_PRESSED
        } else if self.hovered {
            BUTTON_HOVER
        } else {
            BUTTON_BG
        };
        renderer.draw_rect(rect, color);

        let center = rect.center();
        self.label.set_position(center.x, center.y);
        self.label.draw(renderer)
    }

    fn bounds(&mut self, _renderer: &mut dyn Renderer) -> Rect {
        self.rect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
