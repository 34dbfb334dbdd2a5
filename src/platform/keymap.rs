//! macroquad key codes to `Key`

use macroquad::input::KeyCode;

use crate::event::Key;

/// Keys the runtime has no name for map to `None`.
pub fn key_from_keycode(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Space => Key::Space,
        KeyCode::Enter | KeyCode::KpEnter => Key::Enter,
        KeyCode::Escape => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::LeftShift => Key::LeftShift,
        KeyCode::RightShift => Key::RightShift,
        KeyCode::LeftControl => Key::LeftControl,
        KeyCode::RightControl => Key::RightControl,
        KeyCode::LeftAlt => Key::LeftAlt,
        KeyCode::RightAlt => Key::RightAlt,
        KeyCode::A => Key::A,
        KeyCode::B => Key::B,
        KeyCode::C => Key::C,
        KeyCode::D => Key::D,
        KeyCode::E => Key::E,
        KeyCode::F => Key::F,
        KeyCode::G => Key::G,
        KeyCode::H => Key::H,
        KeyCode::I => Key::I,
        KeyCode::J => Key::J,
        KeyCode::K => Key::K,
        KeyCode::L => Key::L,
        KeyCode::M => Key::M,
        KeyCode::N => Key::N,
        KeyCode::O => Key::O,
        KeyCode::P => Key::P,
        KeyCode::Q => Key::Q,
        KeyCode::R => Key::R,
        KeyCode::S => Key::S,
        KeyCode::T => Key::T,
        KeyCode::U => Key::U,
        KeyCode::V => Key::V,
        KeyCode::W => Key::W,
        KeyCode::X => Key::X,
        KeyCode::Y => Key::Y,
        KeyCode::Z => Key::Z,
        KeyCode::Key0 | KeyCode::Kp0 => Key::Num0,
        KeyCode::Key1 | KeyCode::Kp1 => Key::Num1,
        KeyCode::Key2 | KeyCode::Kp2 => Key::Num2,
        KeyCode::Key3 | KeyCode::Kp3 => Key::Num3,
        KeyCode::Key4 | KeyCode::Kp4 => Key::Num4,
        KeyCode::Key5 | KeyCode::Kp5 => Key::Num5,
        KeyCode::Key6 | KeyCode::Kp6 => Key::Num6,
        KeyCode::Key7 | KeyCode::Kp7 => Key::Num7,
        KeyCode::Key8 | KeyCode::Kp8 => Key::Num8,
        KeyCode::Key9 | KeyCode::Kp9 => Key::Num9,
        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_digits_share_number_keys() {
        assert_eq!(key_from_keycode(KeyCode::Kp7), Some(Key::Num7));
        assert_eq!(key_from_keycode(KeyCode::Key7), Some(Key::Num7));
        assert_eq!(key_from_keycode(KeyCode::Space), Some(Key::Space));
        assert_eq!(key_from_keycode(KeyCode::PrintScreen), None);
    }
}
