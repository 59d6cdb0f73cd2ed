//! Adapter to convert winit key events to our KeyPress type

use winit::keyboard::{Key, ModifiersState, NamedKey};

use super::types::{KeyCode, KeyPress, Modifiers};

/// Convert winit key event data to a chord
///
/// Shift is not a modifier of its own: it shows up as the uppercase letter
/// (`A`) or, for Tab, as `Backtab`. Returns None for keys with no token,
/// including bare modifier presses.
pub fn keypress_from_winit(logical_key: &Key, state: ModifiersState) -> Option<KeyPress> {
    let mods = Modifiers::new(state.control_key(), state.alt_key(), state.super_key());

    let (key, is_upper) = match logical_key {
        Key::Named(named) => {
            let code = match named {
                NamedKey::Enter => KeyCode::Return,
                NamedKey::Escape => KeyCode::Escape,
                NamedKey::Tab if state.shift_key() => KeyCode::Backtab,
                NamedKey::Tab => KeyCode::Tab,
                NamedKey::Backspace => KeyCode::Backspace,
                NamedKey::Delete => KeyCode::Delete,
                NamedKey::Insert => KeyCode::Insert,
                NamedKey::Space => KeyCode::Space,
                NamedKey::Pause => KeyCode::Pause,
                NamedKey::PrintScreen => KeyCode::Print,
                NamedKey::Clear => KeyCode::Clear,

                NamedKey::ArrowUp => KeyCode::Up,
                NamedKey::ArrowDown => KeyCode::Down,
                NamedKey::ArrowLeft => KeyCode::Left,
                NamedKey::ArrowRight => KeyCode::Right,

                NamedKey::Home => KeyCode::Home,
                NamedKey::End => KeyCode::End,
                NamedKey::PageUp => KeyCode::PageUp,
                NamedKey::PageDown => KeyCode::PageDown,

                NamedKey::F1 => KeyCode::F(1),
                NamedKey::F2 => KeyCode::F(2),
                NamedKey::F3 => KeyCode::F(3),
                NamedKey::F4 => KeyCode::F(4),
                NamedKey::F5 => KeyCode::F(5),
                NamedKey::F6 => KeyCode::F(6),
                NamedKey::F7 => KeyCode::F(7),
                NamedKey::F8 => KeyCode::F(8),
                NamedKey::F9 => KeyCode::F(9),
                NamedKey::F10 => KeyCode::F(10),
                NamedKey::F11 => KeyCode::F(11),
                NamedKey::F12 => KeyCode::F(12),

                _ => return None,
            };
            (code, false)
        }

        Key::Character(s) => {
            let mut chars = s.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::from_char(c)?
        }

        _ => return None,
    };

    Some(KeyPress {
        key,
        mods,
        is_upper,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_key() {
        let kp = keypress_from_winit(&Key::Character("s".into()), ModifiersState::CONTROL)
            .expect("should map");
        assert_eq!(kp.to_string(), "C-s");
    }

    #[test]
    fn test_uppercase_is_distinct() {
        let kp = keypress_from_winit(&Key::Character("F".into()), ModifiersState::SHIFT)
            .expect("should map");
        assert_eq!(kp.key, KeyCode::Char('f'));
        assert!(kp.is_upper);
        assert!(kp.mods.is_empty());
        assert_eq!(kp.to_string(), "F");
    }

    #[test]
    fn test_named_keys() {
        let kp = keypress_from_winit(&Key::Named(NamedKey::Enter), ModifiersState::empty())
            .expect("should map");
        assert_eq!(kp.to_string(), "Return");

        let kp = keypress_from_winit(&Key::Named(NamedKey::ArrowLeft), ModifiersState::ALT)
            .expect("should map");
        assert_eq!(kp.to_string(), "M-Left");

        let kp = keypress_from_winit(&Key::Named(NamedKey::Space), ModifiersState::CONTROL)
            .expect("should map");
        assert_eq!(kp.to_string(), "C-Space");
    }

    #[test]
    fn test_shift_tab_is_backtab() {
        let kp = keypress_from_winit(&Key::Named(NamedKey::Tab), ModifiersState::SHIFT)
            .expect("should map");
        assert_eq!(kp.key, KeyCode::Backtab);
    }

    #[test]
    fn test_bare_modifier_is_ignored() {
        assert!(keypress_from_winit(&Key::Named(NamedKey::Control), ModifiersState::CONTROL)
            .is_none());
        assert!(keypress_from_winit(&Key::Named(NamedKey::Shift), ModifiersState::SHIFT).is_none());
    }

    #[test]
    fn test_function_keys() {
        let keys = [
            NamedKey::F1,
            NamedKey::F2,
            NamedKey::F3,
            NamedKey::F4,
            NamedKey::F5,
            NamedKey::F6,
            NamedKey::F7,
            NamedKey::F8,
            NamedKey::F9,
            NamedKey::F10,
            NamedKey::F11,
            NamedKey::F12,
        ];
        for (i, named) in keys.into_iter().enumerate() {
            let kp = keypress_from_winit(&Key::Named(named), ModifiersState::empty())
                .expect("should map");
            assert_eq!(kp.key, KeyCode::F(i as u8 + 1));
        }
    }
}
