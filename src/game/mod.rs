//! The frame loop
//!
//! `Game` owns the active screen and drives it once per frame: poll events,
//! update (possibly several times when the screen answers `Continue`),
//! apply a requested screen change, draw, then wait for the next frame.

use log::{error, info, warn};

use crate::config::GameConfig;
use crate::error::Result;
use crate::event::EventStream;
use crate::platform::Platform;
use crate::screen::{EventLoopControl, Screen, ScreenContext};

pub struct Game {
    config: GameConfig,
    screen: Option<Box<dyn Screen>>,
    frame: u64,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            screen: None,
            frame: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of frames drawn so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn has_screen(&self) -> bool {
        self.screen.is_some()
    }

    /// Makes `screen` the active screen. The previous one is dropped.
    pub fn set_screen(&mut self, screen: impl Screen + 'static) {
        self.replace_screen(Box::new(screen));
    }

    fn replace_screen(&mut self, screen: Box<dyn Screen>) {
        if self.screen.replace(screen).is_some() {
            info!("screen changed at frame {}", self.frame);
        } else {
            info!("screen set at frame {}", self.frame);
        }
    }

    /// Runs frames until the screen answers `Exit` or the window is closed.
    ///
    /// Returns immediately when no screen is set. A failing `update` or
    /// `draw` ends the loop with that error.
    pub async fn run<P: Platform>(&mut self, platform: &mut P) -> Result<()> {
        if self.screen.is_none() {
            info!("no screen set, nothing to run");
            return Ok(());
        }
        info!("game loop starting at {} fps", self.config.fps);

        let result = self.run_frames(platform).await;
        match &result {
            Ok(()) => info!("game loop stopped after {} frames", self.frame),
            Err(e) => error!("game loop aborted at frame {}: {}", self.frame, e),
        }
        result
    }

    async fn run_frames<P: Platform>(&mut self, platform: &mut P) -> Result<()> {
        let dt = self.config.dt();
        let max_continues = self.config.max_continues_per_frame;

        loop {
            let mut events = EventStream::new(platform.poll_events());
            if events.contains_quit() {
                info!("quit requested");
                return Ok(());
            }

            let mut continues = 0;
            let control = loop {
                let Some(screen) = self.screen.as_mut() else {
                    return Ok(());
                };
                let mut ctx = ScreenContext::new(dt, self.frame);
                let control = screen.update(&mut ctx, &mut events)?;
                if let Some(next) = ctx.take_screen() {
                    self.replace_screen(next);
                }

                if control != Some(EventLoopControl::Continue) {
                    break control;
                }
                if continues >= max_continues {
                    warn!(
                        "screen answered Continue {} times in frame {}, drawing anyway",
                        continues + 1,
                        self.frame
                    );
                    break control;
                }
                continues += 1;
                // Re-runs see no new input
                events = EventStream::new(Vec::new());
            };

            if let Some(screen) = self.screen.as_mut() {
                screen.draw(platform.renderer())?;
            }
            self.frame += 1;

            if control == Some(EventLoopControl::Exit) {
                return Ok(());
            }
            platform.next_frame().await;
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
