//! Screens and the frame loop's control signal
//!
//! A `Game` owns exactly one active `Screen`. Every frame the screen sees
//! the frame's events, answers with an optional `EventLoopControl`, and is
//! then drawn.

use log::debug;

use crate::error::Result;
use crate::event::EventStream;
use crate::level::Level;
use crate::render::Renderer;
use crate::ui::Hud;

/// What the frame loop should do after a screen's update.
///
/// Ordered by strength: when several handlers answer in the same frame the
/// strongest answer wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventLoopControl {
    /// Draw, then wait for the next frame.
    #[default]
    WaitForFrame,
    /// Run `update` again before drawing.
    Continue,
    /// Draw this frame, then leave the loop.
    Exit,
}

impl EventLoopControl {
    /// Combines two optional answers, keeping the stronger one.
    pub fn strongest(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, None) => a,
            (None, b) => b,
        }
    }
}

/// Per-update view of the frame loop handed to a screen.
pub struct ScreenContext {
    dt: f32,
    frame: u64,
    next_screen: Option<Box<dyn Screen>>,
}

impl ScreenContext {
    pub(crate) fn new(dt: f32, frame: u64) -> Self {
        Self {
            dt,
            frame,
            next_screen: None,
        }
    }

    /// Fixed timestep in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Number of frames completed before this one.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Replaces the active screen once the current `update` returns.
    pub fn set_screen(&mut self, screen: impl Screen + 'static) {
        self.next_screen = Some(Box::new(screen));
    }

    pub(crate) fn take_screen(&mut self) -> Option<Box<dyn Screen>> {
        self.next_screen.take()
    }
}

pub trait Screen {
    fn update(&mut self, ctx: &mut ScreenContext, events: &mut EventStream) -> Result<Option<EventLoopControl>>;

    fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<()>;
}

/// Draws nothing and ignores input.
#[derive(Debug, Default)]
pub struct BlankScreen;

impl Screen for BlankScreen {
    fn update(&mut self, _ctx: &mut ScreenContext, _events: &mut EventStream) -> Result<Option<EventLoopControl>> {
        Ok(None)
    }

    fn draw(&mut self, _renderer: &mut dyn Renderer) -> Result<()> {
        Ok(())
    }
}

/// A level with an optional HUD on top.
///
/// Events reach the HUD first, so widgets can capture clicks and keys
/// before the level sees them. A control from the level overrides the
/// HUD's.
pub struct LevelScreen {
    level: Level,
    hud: Option<Hud>,
}

impl LevelScreen {
    pub fn new(level: Level) -> Self {
        Self { level, hud: None }
    }

    pub fn with_hud(mut self, hud: Hud) -> Self {
        self.hud = Some(hud);
        self
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn hud(&self) -> Option<&Hud> {
        self.hud.as_ref()
    }

    pub fn hud_mut(&mut self) -> Option<&mut Hud> {
        self.hud.as_mut()
    }

    pub fn set_hud(&mut self, hud: Option<Hud>) {
        self.hud = hud;
    }
}

impl Screen for LevelScreen {
    fn update(&mut self, ctx: &mut ScreenContext, events: &mut EventStream) -> Result<Option<EventLoopControl>> {
        let hud_control = match self.hud.as_mut() {
            Some(hud) => hud.update(events),
            None => None,
        };
        let level_control = self.level.update(events, ctx.dt())?;

        let control = level_control.or(hud_control);
        if control.is_some() {
            debug!("level screen frame {} answered {:?}", ctx.frame(), control);
        }
        Ok(control)
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        self.level.draw(renderer)?;
        if let Some(hud) = self.hud.as_mut() {
            hud.draw(renderer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, Key};
    use crate::testing::{DrawCall, RecordingRenderer};
    use crate::ui::Text;

    const DT: f32 = 1.0 / 60.0;

    fn hud_answering(control: EventLoopControl) -> Hud {
        let mut hud = Hud::new();
        hud.on_key_pressed(Key::H, move |_: &mut Hud| Some(control));
        hud
    }

    #[test]
    fn test_strongest() {
        use EventLoopControl::*;
        assert_eq!(EventLoopControl::strongest(None, None), None);
        assert_eq!(EventLoopControl::strongest(Some(Continue), None), Some(Continue));
        assert_eq!(EventLoopControl::strongest(None, Some(WaitForFrame)), Some(WaitForFrame));
        assert_eq!(EventLoopControl::strongest(Some(Exit), Some(Continue)), Some(Exit));
        assert_eq!(EventLoopControl::default(), WaitForFrame);
    }

    #[test]
    fn test_hud_control_used_when_level_is_silent() {
        let mut screen = LevelScreen::new(Level::new()).with_hud(hud_answering(EventLoopControl::Continue));
        let mut ctx = ScreenContext::new(DT, 0);
        let mut events = EventStream::from(vec![Event::key_down(Key::H)]);

        let control = screen.update(&mut ctx, &mut events).unwrap();
        assert_eq!(control, Some(EventLoopControl::Continue));
    }

    #[test]
    fn test_level_control_overrides_hud() {
        let mut level = Level::new();
        level.on_key_pressed(Key::L, |_: &mut Level| Some(EventLoopControl::Exit));
        let mut screen = LevelScreen::new(level).with_hud(Hud::new());
        let mut ctx = ScreenContext::new(DT, 0);
        let mut events = EventStream::from(vec![Event::key_down(Key::L)]);
        assert_eq!(screen.update(&mut ctx, &mut events).unwrap(), Some(EventLoopControl::Exit));

        // The level wins even when its answer is weaker than the HUD's.
        let mut level = Level::new();
        level.on_key_pressed(Key::L, |_: &mut Level| Some(EventLoopControl::WaitForFrame));
        let mut screen = LevelScreen::new(level).with_hud(hud_answering(EventLoopControl::Exit));
        let mut events = EventStream::from(vec![Event::key_down(Key::H), Event::key_down(Key::L)]);
        assert_eq!(
            screen.update(&mut ctx, &mut events).unwrap(),
            Some(EventLoopControl::WaitForFrame)
        );
    }

    #[test]
    fn test_hud_is_drawn_over_the_level() {
        let mut hud = Hud::new();
        hud.add(Text::new("Coins: 0", 4.0, 4.0));
        let mut screen = LevelScreen::new(Level::new()).with_hud(hud);

        let mut renderer = RecordingRenderer::new(640.0, 480.0);
        screen.draw(&mut renderer).unwrap();
        assert!(matches!(renderer.calls.first(), Some(DrawCall::Clear(_))));
        assert!(matches!(renderer.calls.last(), Some(DrawCall::Text { .. })));
    }

    #[test]
    fn test_context_carries_a_transition() {
        let mut ctx = ScreenContext::new(DT, 3);
        assert_eq!(ctx.frame(), 3);
        assert!(ctx.take_screen().is_none());
        ctx.set_screen(BlankScreen);
        assert!(ctx.take_screen().is_some());
        assert!(ctx.take_screen().is_none());
    }
}
