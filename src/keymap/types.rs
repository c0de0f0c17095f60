//! Core types for the keymap system: Modifiers, KeyCombo, KeyEvent

use std::fmt;
use std::str::FromStr;

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b001);
    pub const ALT: Modifiers = Modifiers(0b010);
    pub const SHIFT: Modifiers = Modifiers(0b100);

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, alt: bool, shift: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b001;
        }
        if alt {
            bits |= 0b010;
        }
        if shift {
            bits |= 0b100;
        }
        Modifiers(bits)
    }

    /// Check if ctrl is held
    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b001 != 0
    }

    /// Check if alt is held
    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b010 != 0
    }

    /// Check if shift is held
    #[inline]
    pub const fn shift(self) -> bool {
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

    /// Check if this contains all modifiers in other
    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("ctrl");
        }
        if self.alt() {
            parts.push("alt");
        }
        if self.shift() {
            parts.push("shift");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key combination: one letter plus an exact set of modifiers
///
/// The letter is stored lowercase. Duplicate modifiers collapse because the
/// set is a bitfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    letter: char,
    mods: Modifiers,
}

impl KeyCombo {
    /// Create a combo from a letter and modifiers
    ///
    /// Returns `None` unless `letter` is an ASCII letter.
    pub fn new(letter: char, mods: Modifiers) -> Option<Self> {
        letter.is_ascii_alphabetic().then(|| Self {
            letter: letter.to_ascii_lowercase(),
            mods,
        })
    }

    /// Create a combo for a bare letter
    pub fn letter(letter: char) -> Option<Self> {
        Self::new(letter, Modifiers::NONE)
    }

    pub fn key(&self) -> char {
        self.letter
    }

    pub fn mods(&self) -> Modifiers {
        self.mods
    }

    /// Check whether an observed key press selects this combo
    ///
    /// The letter compares case-insensitively. Each modifier flag must equal
    /// its membership in the combo: ctrl+a does not match ctrl+shift+a.
    pub fn matches(&self, ctrl: bool, alt: bool, shift: bool, c: char) -> bool {
        c.to_ascii_lowercase() == self.letter
            && ctrl == self.mods.ctrl()
            && alt == self.mods.alt()
            && shift == self.mods.shift()
    }

    /// Display the combo for humans, e.g. `Ctrl+Shift+A`
    pub fn display_string(&self) -> String {
        let mut s = String::new();
        if self.mods.ctrl() {
            s.push_str("Ctrl+");
        }
        if self.mods.alt() {
            s.push_str("Alt+");
        }
        if self.mods.shift() {
            s.push_str("Shift+");
        }
        s.push(self.letter.to_ascii_uppercase());
        s
    }
}

/// Canonical keymap form, e.g. `ctrl+shift+a`
impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.is_empty() {
            write!(f, "{}", self.letter)
        } else {
            write!(f, "{}+{}", self.mods, self.letter)
        }
    }
}

/// Function keys F1 through F12
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FunctionKey {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

impl FunctionKey {
    pub const ALL: [FunctionKey; 12] = [
        FunctionKey::F1,
        FunctionKey::F2,
        FunctionKey::F3,
        FunctionKey::F4,
        FunctionKey::F5,
        FunctionKey::F6,
        FunctionKey::F7,
        FunctionKey::F8,
        FunctionKey::F9,
        FunctionKey::F10,
        FunctionKey::F11,
        FunctionKey::F12,
    ];

    /// Function key by number (1-12)
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.number())
    }
}

impl FromStr for FunctionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(['F', 'f'])
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(FunctionKey::from_number)
            .ok_or_else(|| format!("Unknown function key: {}", s))
    }
}

/// The key part of a raw key press
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A letter key
    Char(char),
    /// A function key
    Function(FunctionKey),
    /// Anything else (arrows, digits, ...), ignored by dispatch
    Other,
}

/// A raw key press as delivered by the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub mods: Modifiers,
}

impl KeyEvent {
    pub const fn new(key: Key, mods: Modifiers) -> Self {
        Self { key, mods }
    }

    /// A letter press with modifiers
    pub const fn char(c: char, mods: Modifiers) -> Self {
        Self::new(Key::Char(c), mods)
    }

    /// A function key press with modifiers
    pub const fn function(key: FunctionKey, mods: Modifiers) -> Self {
        Self::new(Key::Function(key), mods)
    }

    /// Check if this press selects the given combo
    pub fn is_combo(&self, combo: &KeyCombo) -> bool {
        match self.key {
            Key::Char(c) => combo.matches(self.mods.ctrl(), self.mods.alt(), self.mods.shift(), c),
            _ => false,
        }
    }
}
