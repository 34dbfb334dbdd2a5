//! autogamer demo: a main menu and one playable level
//!
//! Arrows or A/D move, Space/W/Up jumps, P pauses, Escape returns to the
//! menu. Ctrl+arrows pan the camera, Ctrl+0 recenters it.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use autogamer::ecs::{CharacterSprites, Health, PlatformerControls, ViewportTarget, Wallet};
use autogamer::physics::{PhysicsBody, PhysicsCollider, Shape};
use autogamer::ui::{Button, Panel, Text, WidgetId, FONT_SIZE_HEADER, TEXT_DIM};
use autogamer::{
    Anchor, CharacterSpritesheet, CollisionGroups, Entity, EventLoopControl, EventStream, Game, GameConfig, Hud,
    Key, Level, LevelScreen, MacroquadPlatform, Renderer, Result, Screen, ScreenContext, TileMap, VERSION,
};
use log::{error, info, warn};
use macroquad::math::Vec2;
use macroquad::window::Conf;

const CONFIG_PATH: &str = "autogamer.ron";
const LEVEL_PATH: &str = "assets/levels/level1.ron";
const PLAYER_IMAGE: &str = "assets/sprites/player.png";
const PLAYER_METADATA: &str = "assets/sprites/player.json";

const GRAVITY: Vec2 = Vec2::new(0.0, -900.0);
const PLAYER_HEALTH: u32 = 3;

fn load_config() -> GameConfig {
    if !Path::new(CONFIG_PATH).exists() {
        return GameConfig::default();
    }
    GameConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        eprintln!("{}, using defaults", e);
        GameConfig::default()
    })
}

fn window_conf() -> Conf {
    let config = load_config();
    Conf {
        window_title: format!("{} v{}", config.title, VERSION),
        window_width: config.width as i32,
        window_height: config.height as i32,
        window_resizable: true,
        high_dpi: config.high_dpi,
        ..Default::default()
    }
}

/// Play / Quit buttons. Choosing Play loads the level.
struct MainMenu {
    hud: Hud,
    play_requested: Rc<Cell<bool>>,
}

impl MainMenu {
    fn new() -> Self {
        let play_requested = Rc::new(Cell::new(false));
        let mut hud = Hud::new();

        hud.add(Text::new("autogamer", 480.0, 200.0).with_anchor(Anchor::S).with_font_size(FONT_SIZE_HEADER));
        hud.add(
            Text::new(format!("v{}  arrows to move, space to jump", VERSION), 480.0, 210.0)
                .with_anchor(Anchor::N)
                .with_color(TEXT_DIM),
        );
        let flag = play_requested.clone();
        hud.add(
            Button::new("Play", 480.0, 280.0, 200.0, 48.0)
                .with_anchor(Anchor::Center)
                .on_click(move || {
                    flag.set(true);
                    None
                }),
        );
        hud.add(
            Button::new("Quit", 480.0, 350.0, 200.0, 48.0)
                .with_anchor(Anchor::Center)
                .on_click(|| Some(EventLoopControl::Exit)),
        );
        let flag = play_requested.clone();
        hud.on_key_pressed(Key::Enter, move |_: &mut Hud| {
            flag.set(true);
            None
        });
        hud.on_key_pressed(Key::Escape, |_: &mut Hud| Some(EventLoopControl::Exit));

        Self { hud, play_requested }
    }
}

impl Screen for MainMenu {
    fn update(&mut self, ctx: &mut ScreenContext, events: &mut EventStream) -> Result<Option<EventLoopControl>> {
        let control = self.hud.update(events);
        if self.play_requested.replace(false) {
            ctx.set_screen(PlayScreen::load(LEVEL_PATH)?);
        }
        Ok(control)
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.clear(macroquad::color::Color::new(0.08, 0.08, 0.12, 1.0));
        self.hud.draw(renderer)
    }
}

/// The level with a health and coin counter on top.
struct PlayScreen {
    inner: LevelScreen,
    player: Entity,
    health_text: WidgetId,
    coins_text: WidgetId,
    paused_text: WidgetId,
    back_to_menu: Rc<Cell<bool>>,
}

impl PlayScreen {
    fn load(path: &str) -> Result<Self> {
        let map = TileMap::open(path)?;
        let mut level = Level::new();
        level.set_gravity(GRAVITY)?;
        level.set_viewport_dimensions(map.tile_width() as f32 * 16.0, map.tile_height() as f32 * 12.0)?;

        let player = level.add_player()?;
        let (tw, th) = (map.tile_width() as f32, map.tile_height() as f32);
        level.load(map)?;
        spawn_player_components(&mut level, player, tw, th)?;

        level.on_key_pressed(Key::P, |level: &mut Level| {
            level.toggle_paused();
            None
        });

        let back_to_menu = Rc::new(Cell::new(false));
        let mut hud = Hud::new();
        hud.add(Panel::new(8.0, 8.0, 180.0, 64.0));
        let health_text = hud.add(Text::new("", 16.0, 14.0));
        let coins_text = hud.add(Text::new("", 16.0, 42.0));
        let paused_text = hud.add(Text::new("", 480.0, 360.0).with_anchor(Anchor::Center).with_font_size(FONT_SIZE_HEADER));
        let flag = back_to_menu.clone();
        hud.on_key_pressed(Key::Escape, move |_: &mut Hud| {
            flag.set(true);
            None
        });

        let mut screen = Self {
            inner: LevelScreen::new(level).with_hud(hud),
            player,
            health_text,
            coins_text,
            paused_text,
            back_to_menu,
        };
        screen.refresh_hud();
        Ok(screen)
    }

    fn refresh_hud(&mut self) {
        let store = self.inner.level().store();
        let health = store.try_get::<Health>(self.player).map_or(0, |h| h.value);
        let coins = store.try_get::<Wallet>(self.player).map_or(0, |w| w.value);
        let paused = self.inner.level().is_paused();

        let Some(hud) = self.inner.hud_mut() else {
            return;
        };
        if let Some(text) = hud.get_mut::<Text>(self.health_text) {
            text.set_text(format!("Health: {}", health));
        }
        if let Some(text) = hud.get_mut::<Text>(self.coins_text) {
            text.set_text(format!("Coins: {}", coins));
        }
        if let Some(text) = hud.get_mut::<Text>(self.paused_text) {
            text.set_text(if paused { "PAUSED" } else { "" });
        }
    }
}

fn spawn_player_components(level: &mut Level, player: Entity, tile_w: f32, tile_h: f32) -> Result<()> {
    let store = level.store_mut();
    store.add(player, PhysicsBody::new(1.0)?)?;
    store.add(
        player,
        PhysicsCollider::new(Shape::rect(tile_w * 0.75, tile_h * 0.9), CollisionGroups::PLAYER)?,
    )?;
    store.add(
        player,
        PlatformerControls::new(tile_w * 8.0, tile_w * 8.0, tile_h * 24.0).with_midair_multiplier(0.2),
    )?;
    store.add(player, Health::new(PLAYER_HEALTH))?;
    store.add(player, Wallet::new(0))?;
    store.add(player, ViewportTarget)?;

    match CharacterSpritesheet::open(PLAYER_IMAGE, PLAYER_METADATA) {
        Ok(sheet) => {
            let sprites: CharacterSprites = sheet.sprites();
            if let Some(sprite) = sprites.default_sprite() {
                store.add(player, sprite)?;
            }
            store.add(player, sprites)?;
        }
        Err(e) => warn!("player drawn without sprites: {}", e),
    }
    Ok(())
}

impl Screen for PlayScreen {
    fn update(&mut self, ctx: &mut ScreenContext, events: &mut EventStream) -> Result<Option<EventLoopControl>> {
        let control = self.inner.update(ctx, events)?;
        if self.back_to_menu.replace(false) {
            info!("back to the menu with {} coins", self.inner.level().collected_currency());
            ctx.set_screen(MainMenu::new());
        }
        self.refresh_hud();
        Ok(control)
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        self.inner.draw(renderer)
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);
        pretty_env_logger::init();
    }

    let config = load_config();
    let mut platform = MacroquadPlatform::new(Some(config.fps));
    let mut game = Game::new(config);
    game.set_screen(MainMenu::new());

    if let Err(e) = game.run(&mut platform).await {
        error!("autogamer stopped: {}", e);
        std::process::exit(1);
    }
}
