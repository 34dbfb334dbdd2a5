//! Per-frame systems run by `Level::update`
//!
//! Order: controls, physics (in `crate::physics`), currency, camera.

pub mod camera;
pub mod controls;
pub mod currency;

pub use camera::{update_camera, Viewport, DEBUG_PAN_STEP};
pub use controls::ControlSystem;
pub use currency::collect_currency;
