//! Core types for the keymap system: KeyPress, Modifiers, KeyCode
//!
//! A [`KeyPress`] is one chord: a base key plus the control, meta and super
//! flags. Shift is not a modifier here; a shifted single letter is recorded
//! through `is_upper`, so `A` and `S-a` are distinct chords.
//!
//! # String form
//!
//! ```text
//! chord    := { modifier "-" } token
//! modifier := "C" | "M" | "S"          (ctrl, meta, super)
//! sequence := chord { " " chord }
//! ```

use std::fmt;
use std::str::FromStr;

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b001);
    pub const META: Modifiers = Modifiers(0b010); // Alt
    pub const SUPER: Modifiers = Modifiers(0b100); // Cmd on macOS, Win on Windows

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, meta: bool, super_: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b001;
        }
        if meta {
            bits |= 0b010;
        }
        if super_ {
            bits |= 0b100;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b001 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b010 != 0
    }

    #[inline]
    pub const fn super_(self) -> bool {
        self.0 & 0b100 != 0
    }

    /// Check if no modifiers are held
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    /// Canonical `C-M-S-` prefix (empty when no modifier is held)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl() {
            f.write_str("C-")?;
        }
        if self.meta() {
            f.write_str("M-")?;
        }
        if self.super_() {
            f.write_str("S-")?;
        }
        Ok(())
    }
}

/// A base key symbol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable key (letters are normalized to lowercase)
    Char(char),

    // Named keys
    Escape,
    Tab,
    Backtab,
    Backspace,
    Return,
    Enter,
    Insert,
    Delete,
    Pause,
    Print,
    SysReq,
    Clear,
    Space,

    // Navigation
    Home,
    End,
    Left,
    Up,
    Right,
    Down,
    PageUp,
    PageDown,

    // Function keys
    F(u8), // F1-F12
}

/// Token names for the non-character keys, in chord-string spelling
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("Esc", KeyCode::Escape),
    ("Tab", KeyCode::Tab),
    ("Backtab", KeyCode::Backtab),
    ("Backspace", KeyCode::Backspace),
    ("Return", KeyCode::Return),
    ("Enter", KeyCode::Enter),
    ("Insert", KeyCode::Insert),
    ("Delete", KeyCode::Delete),
    ("Pause", KeyCode::Pause),
    ("Print", KeyCode::Print),
    ("SysReq", KeyCode::SysReq),
    ("Clear", KeyCode::Clear),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
    ("Left", KeyCode::Left),
    ("Up", KeyCode::Up),
    ("Right", KeyCode::Right),
    ("Down", KeyCode::Down),
    ("PageUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("Space", KeyCode::Space),
];

impl KeyCode {
    /// Look up a chord-string token. Returns the key and its `is_upper` flag.
    pub fn from_token(token: &str) -> Option<(KeyCode, bool)> {
        if let Some((_, code)) = NAMED_KEYS.iter().find(|(name, _)| *name == token) {
            return Some((*code, false));
        }
        if let Some(n) = token.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
            if (1..=12).contains(&n) {
                return Some((KeyCode::F(n), false));
            }
        }

        let mut chars = token.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Self::from_char(c)
    }

    /// Map a produced character to a key. Returns the key and its `is_upper` flag.
    pub fn from_char(c: char) -> Option<(KeyCode, bool)> {
        if c == ' ' {
            return Some((KeyCode::Space, false));
        }
        if !is_token_char(c) {
            return None;
        }
        if c.is_alphabetic() && c.is_uppercase() {
            let mut lower = c.to_lowercase();
            let l = lower.next()?;
            if lower.next().is_some() || !is_token_char(l) {
                return None;
            }
            return Some((KeyCode::Char(l), true));
        }
        Some((KeyCode::Char(c), false))
    }

    /// The character this key types, if any
    pub fn as_char(self) -> Option<char> {
        match self {
            KeyCode::Char(c) => Some(c),
            KeyCode::Space => Some(' '),
            _ => None,
        }
    }

    fn write_token(self, f: &mut fmt::Formatter<'_>, upper: bool) -> fmt::Result {
        match self {
            KeyCode::Char(c) if upper => {
                for u in c.to_uppercase() {
                    write!(f, "{}", u)?;
                }
                Ok(())
            }
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::F(n) => write!(f, "F{}", n),
            named => {
                let name = NAMED_KEYS
                    .iter()
                    .find(|(_, code)| *code == named)
                    .map(|(name, _)| *name)
                    .unwrap_or("?");
                f.write_str(name)
            }
        }
    }
}

/// Printable ASCII plus the Latin-1 supplement
fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() || ('\u{a0}'..='\u{ff}').contains(&c)
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_token(f, false)
    }
}

/// Error produced while parsing a chord string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// A modifier letter outside `C`, `M`, `S`
    UnknownModifier { modifier: String, chord: String },
    /// A token missing from the key table
    UnknownKey(String),
    /// An empty key sequence
    Empty,
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyParseError::UnknownModifier { modifier, chord } => {
                write!(f, "Unknown key modifier: {} in key definition {}", modifier, chord)
            }
            KeyParseError::UnknownKey(token) => write!(f, "Unknown key {}", token),
            KeyParseError::Empty => write!(f, "Empty key sequence"),
        }
    }
}

impl std::error::Error for KeyParseError {}

/// A single chord: a key with modifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: KeyCode,
    pub mods: Modifiers,
    /// Set for single letters typed in uppercase
    pub is_upper: bool,
}

impl KeyPress {
    /// Create a new chord
    pub const fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self {
            key,
            mods,
            is_upper: false,
        }
    }

    /// Create a chord with no modifiers
    pub const fn key(key: KeyCode) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Chord for a typed character; `None` when the character has no token
    pub fn char(c: char) -> Option<Self> {
        let (key, is_upper) = KeyCode::from_char(c)?;
        Some(Self {
            key,
            mods: Modifiers::NONE,
            is_upper,
        })
    }

    /// Same chord with different modifiers
    pub const fn with_mods(self, mods: Modifiers) -> Self {
        Self {
            key: self.key,
            mods,
            is_upper: self.is_upper,
        }
    }

    /// True if ctrl, meta or super is held
    pub fn has_any_modifier(&self) -> bool {
        !self.mods.is_empty()
    }

    /// The text this chord would insert into a line editor
    pub fn text(&self) -> Option<String> {
        if self.has_any_modifier() {
            return None;
        }
        let c = self.key.as_char()?;
        if self.is_upper {
            Some(c.to_uppercase().collect())
        } else {
            Some(c.to_string())
        }
    }

    /// Build the synthetic key event used to replay this chord to a page
    pub fn to_synthetic(&self, kind: KeyEventKind) -> SyntheticKeyEvent {
        SyntheticKeyEvent {
            kind,
            key: self.key,
            mods: self.mods,
            shift: self.is_upper,
            text: if self.is_upper { self.text() } else { None },
        }
    }
}

impl FromStr for KeyPress {
    type Err = KeyParseError;

    fn from_str(chord: &str) -> Result<Self, Self::Err> {
        let (left, token) = match chord.rfind('-') {
            Some(idx) => (&chord[..idx], &chord[idx + 1..]),
            None => ("", chord),
        };
        let token = if token.is_empty() { "-" } else { token };

        let mut mods = Modifiers::NONE;
        for part in left.split('-') {
            match part {
                "" => break,
                "C" => mods = mods | Modifiers::CTRL,
                "M" => mods = mods | Modifiers::META,
                "S" => mods = mods | Modifiers::SUPER,
                other => {
                    return Err(KeyParseError::UnknownModifier {
                        modifier: other.to_string(),
                        chord: chord.to_string(),
                    })
                }
            }
        }

        let (key, is_upper) =
            KeyCode::from_token(token).ok_or_else(|| KeyParseError::UnknownKey(token.to_string()))?;

        Ok(Self {
            key,
            mods,
            is_upper,
        })
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mods)?;
        self.key.write_token(f, self.is_upper)
    }
}

/// Parse a space-separated sequence such as `"C-x C-f"`
pub fn parse_key_sequence(sequence: &str) -> Result<Vec<KeyPress>, KeyParseError> {
    let keys = sequence
        .split_whitespace()
        .map(KeyPress::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    if keys.is_empty() {
        return Err(KeyParseError::Empty);
    }
    Ok(keys)
}

/// Format a sequence back to its space-separated string form
pub fn format_key_sequence(keys: &[KeyPress]) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Press or release half of a synthetic key event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEventKind {
    Press,
    Release,
}

/// A key event posted back to a page, bypassing the keyboard handler
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticKeyEvent {
    pub kind: KeyEventKind,
    pub key: KeyCode,
    pub mods: Modifiers,
    /// Shift held, for letters and for selection-extending motion
    pub shift: bool,
    /// Uppercase text carried by shifted letters
    pub text: Option<String>,
}

impl SyntheticKeyEvent {
    /// Same event with shift held
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(s: &str) -> KeyPress {
        s.parse().unwrap()
    }

    #[test]
    fn test_modifiers_individual() {
        assert!(Modifiers::CTRL.ctrl());
        assert!(!Modifiers::CTRL.meta());
        assert!(Modifiers::META.meta());
        assert!(Modifiers::SUPER.super_());
        assert!(Modifiers::NONE.is_empty());
    }

    #[test]
    fn test_modifiers_combined() {
        let mods = Modifiers::CTRL | Modifiers::META;
        assert!(mods.ctrl());
        assert!(mods.meta());
        assert!(!mods.super_());
        assert_eq!(mods, Modifiers::new(true, true, false));
    }

    #[test]
    fn test_parse_simple_chords() {
        assert_eq!(kp("a"), KeyPress::key(KeyCode::Char('a')));
        assert_eq!(kp("C-x"), KeyPress::new(KeyCode::Char('x'), Modifiers::CTRL));
        assert_eq!(kp("M-<"), KeyPress::new(KeyCode::Char('<'), Modifiers::META));
        assert_eq!(
            kp("C-M-Space"),
            KeyPress::new(KeyCode::Space, Modifiers::CTRL | Modifiers::META)
        );
        assert_eq!(kp("S-Return"), KeyPress::new(KeyCode::Return, Modifiers::SUPER));
    }

    #[test]
    fn test_parse_minus_key() {
        assert_eq!(kp("-"), KeyPress::key(KeyCode::Char('-')));
        assert_eq!(kp("C--"), KeyPress::new(KeyCode::Char('-'), Modifiers::CTRL));
        assert_eq!(kp("C--").to_string(), "C--");
    }

    #[test]
    fn test_uppercase_letter_is_distinct_from_super() {
        let upper = kp("A");
        let super_a = kp("S-a");
        assert!(upper.is_upper);
        assert_eq!(upper.key, KeyCode::Char('a'));
        assert!(!super_a.is_upper);
        assert_ne!(upper, super_a);
        assert_ne!(upper, kp("a"));
    }

    #[test]
    fn test_accented_letters() {
        let lower = kp("é");
        let upper = kp("É");
        assert_eq!(lower.key, upper.key);
        assert!(upper.is_upper);
        assert_eq!(upper.to_string(), "É");
    }

    #[test]
    fn test_unknown_modifier() {
        let err = "X-a".parse::<KeyPress>().unwrap_err();
        assert_eq!(
            err,
            KeyParseError::UnknownModifier {
                modifier: "X".to_string(),
                chord: "X-a".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            "C-Foo".parse::<KeyPress>().unwrap_err(),
            KeyParseError::UnknownKey("Foo".to_string())
        );
        assert!("F13".parse::<KeyPress>().is_err());
        assert!("€".parse::<KeyPress>().is_err());
    }

    #[test]
    fn test_display_canonical_order() {
        let chord = KeyPress::new(
            KeyCode::Char('x'),
            Modifiers::SUPER | Modifiers::CTRL | Modifiers::META,
        );
        assert_eq!(chord.to_string(), "C-M-S-x");
        assert_eq!(kp("M-C-x").to_string(), "C-M-x");
    }

    #[test]
    fn test_round_trip_over_token_table() {
        let mut tokens: Vec<String> = NAMED_KEYS.iter().map(|(n, _)| n.to_string()).collect();
        tokens.extend((1..=12).map(|n| format!("F{}", n)));
        tokens.extend(('!'..='~').map(|c| c.to_string()));
        tokens.extend(('\u{a0}'..='\u{fe}').map(|c| c.to_string()));

        let mod_sets = [
            Modifiers::NONE,
            Modifiers::CTRL,
            Modifiers::META,
            Modifiers::SUPER,
            Modifiers::CTRL | Modifiers::META,
            Modifiers::CTRL | Modifiers::META | Modifiers::SUPER,
        ];

        for token in &tokens {
            let base = kp(token);
            for mods in mod_sets {
                let chord = base.with_mods(mods);
                let again: KeyPress = chord.to_string().parse().unwrap();
                assert_eq!(again, chord, "round trip failed for {}", chord);
            }
        }
    }

    #[test]
    fn test_parse_sequence() {
        let keys = parse_key_sequence("C-x  C-f").unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(format_key_sequence(&keys), "C-x C-f");
        assert_eq!(parse_key_sequence("   "), Err(KeyParseError::Empty));
    }

    #[test]
    fn test_text_and_synthetic() {
        assert_eq!(kp("A").text(), Some("A".to_string()));
        assert_eq!(kp("Space").text(), Some(" ".to_string()));
        assert_eq!(kp("C-a").text(), None);

        let event = kp("Down").to_synthetic(KeyEventKind::Press);
        assert_eq!(event.key, KeyCode::Down);
        assert_eq!(event.text, None);
    }
}
