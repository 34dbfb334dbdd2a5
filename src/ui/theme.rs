//! HUD theme - shared colors and font sizes

use macroquad::prelude::Color;

/// Primary text color
pub const TEXT_COLOR: Color = Color::new(0.95, 0.95, 0.95, 1.0);

/// Dimmed/secondary text
pub const TEXT_DIM: Color = Color::new(0.6, 0.6, 0.65, 1.0);

/// Translucent backdrop behind HUD elements
pub const PANEL_BG: Color = Color::new(0.0, 0.0, 0.0, 0.55);

/// Button background
pub const BUTTON_BG: Color = Color::new(0.2, 0.2, 0.24, 1.0);

/// Button background while hovered
pub const BUTTON_HOVER: Color = Color::new(0.27, 0.31, 0.4, 1.0);

/// Button background while the mouse button is held on it
pub const BUTTON_PRESSED: Color = Color::new(0.16, 0.4, 0.55, 1.0);

/// Standard HUD text size
pub const FONT_SIZE_CONTENT: u16 = 24;

/// Titles
pub const FONT_SIZE_HEADER: u16 = 48;
