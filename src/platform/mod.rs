//! Window, input and frame pacing
//!
//! `Game::run` only talks to a `Platform`. The macroquad one polls the
//! window each frame and turns macroquad's input state into `Event`s.

mod keymap;

use std::future::Future;

use macroquad::input::{
    get_keys_pressed, get_keys_released, is_key_down, is_mouse_button_pressed, is_mouse_button_released,
    is_quit_requested, mouse_position, prevent_quit, KeyCode, MouseButton as MqMouseButton,
};
use macroquad::time::get_time;

use crate::event::{Event, EventKind, Key, Modifiers, MouseButton};
use crate::render::{MacroquadRenderer, Renderer};

pub use keymap::key_from_keycode;

pub trait Platform {
    /// Events that happened since the previous call, in order.
    fn poll_events(&mut self) -> Vec<Event>;

    fn renderer(&mut self) -> &mut dyn Renderer;

    /// Presents the frame and resolves when the next one may start.
    fn next_frame(&mut self) -> impl Future<Output = ()>;
}

const MOUSE_BUTTONS: [(MqMouseButton, MouseButton); 3] = [
    (MqMouseButton::Left, MouseButton::Left),
    (MqMouseButton::Right, MouseButton::Right),
    (MqMouseButton::Middle, MouseButton::Middle),
];

pub struct MacroquadPlatform {
    renderer: MacroquadRenderer,
    /// Seconds per frame; `None` leaves pacing to vsync
    frame_time: Option<f64>,
    frame_start: f64,
    last_mouse: (f32, f32),
}

impl MacroquadPlatform {
    /// Must be called from inside the macroquad main future.
    pub fn new(fps: Option<u32>) -> Self {
        // Window close arrives as a Quit event instead of ending the process
        prevent_quit();
        Self {
            renderer: MacroquadRenderer::new(),
            frame_time: fps.filter(|&fps| fps > 0).map(|fps| 1.0 / fps as f64),
            frame_start: get_time(),
            last_mouse: mouse_position(),
        }
    }

    fn modifiers() -> Modifiers {
        let mut modifiers = Modifiers::empty();
        if is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift) {
            modifiers |= Modifiers::SHIFT;
        }
        if is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl) {
            modifiers |= Modifiers::CTRL;
        }
        if is_key_down(KeyCode::LeftAlt) || is_key_down(KeyCode::RightAlt) {
            modifiers |= Modifiers::ALT;
        }
        modifiers
    }

    fn wait_for_frame_time(&self) {
        let Some(target) = self.frame_time else {
            return;
        };
        #[cfg(not(target_arch = "wasm32"))]
        {
            let spin_margin = 0.002;
            while get_time() - self.frame_start + spin_margin < target {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        }
        while get_time() - self.frame_start < target {
            std::hint::spin_loop();
        }
    }
}

impl Platform for MacroquadPlatform {
    fn poll_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if is_quit_requested() {
            events.push(Event::new(EventKind::Quit));
        }

        let modifiers = Self::modifiers();
        // HashSet order is arbitrary; sort so a frame's events are stable
        let mut pressed: Vec<Key> = get_keys_pressed().into_iter().filter_map(key_from_keycode).collect();
        pressed.sort_unstable();
        for key in pressed {
            events.push(Event::new(EventKind::KeyDown { key, modifiers, repeat: false }));
        }
        let mut released: Vec<Key> = get_keys_released().into_iter().filter_map(key_from_keycode).collect();
        released.sort_unstable();
        for key in released {
            events.push(Event::new(EventKind::KeyUp { key, modifiers }));
        }

        let (x, y) = mouse_position();
        if (x, y) != self.last_mouse {
            self.last_mouse = (x, y);
            events.push(Event::new(EventKind::MouseMotion { x, y }));
        }
        for (mq_button, button) in MOUSE_BUTTONS {
            if is_mouse_button_pressed(mq_button) {
                events.push(Event::new(EventKind::MouseButtonDown { button, x, y }));
            }
            if is_mouse_button_released(mq_button) {
                events.push(Event::new(EventKind::MouseButtonUp { button, x, y }));
            }
        }
        events
    }

    fn renderer(&mut self) -> &mut dyn Renderer {
        &mut self.renderer
    }

    async fn next_frame(&mut self) {
        self.wait_for_frame_time();
        macroquad::window::next_frame().await;
        self.frame_start = get_time();
    }
}
