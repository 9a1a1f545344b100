//! 按键目录
//!
//! 符号按键到后端按键名的静态映射，以及是否需要 Shift 的判断。
//! 后端按键名沿用 X11 keysym 命名 (`Shift_L`, `Return`, `at` ...)。

use super::backend::{InputBackend, KeyCode};
use lazy_static::lazy_static;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// 需要按住 Shift 才能输入的标点
const SHIFTED_PUNCTUATION: &str = "~!@#$%^&*()_+{}|:\"<>?";

lazy_static! {
    /// 标点与空白字符对应的 keysym 名称
    static ref CHAR_SYMBOLS: HashMap<char, &'static str> = [
        (' ', "space"),
        ('!', "exclam"),
        ('"', "quotedbl"),
        ('#', "numbersign"),
        ('$', "dollar"),
        ('%', "percent"),
        ('&', "ampersand"),
        ('\'', "apostrophe"),
        ('(', "parenleft"),
        (')', "parenright"),
        ('*', "asterisk"),
        ('+', "plus"),
        (',', "comma"),
        ('-', "minus"),
        ('.', "period"),
        ('/', "slash"),
        (':', "colon"),
        (';', "semicolon"),
        ('<', "less"),
        ('=', "equal"),
        ('>', "greater"),
        ('?', "question"),
        ('@', "at"),
        ('[', "bracketleft"),
        ('\\', "backslash"),
        (']', "bracketright"),
        ('^', "asciicircum"),
        ('_', "underscore"),
        ('`', "grave"),
        ('{', "braceleft"),
        ('|', "bar"),
        ('}', "braceright"),
        ('~', "asciitilde"),
        ('\n', "Return"),
        ('\r', "Return"),
        ('\t', "Tab"),
    ]
    .into_iter()
    .collect();

    static ref SYMBOL_CHARS: HashMap<&'static str, char> = CHAR_SYMBOLS
        .iter()
        .filter(|(c, _)| !c.is_control())
        .map(|(c, name)| (*name, *c))
        .collect();
}

/// 具名按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Shift,
    Ctrl,
    Alt,
    /// macOS Command
    Cmd,
    /// Windows 徽标键
    Win,
    /// Linux Super / Meta
    Meta,
    Enter,
    Tab,
    Space,
    Backspace,
    Delete,
    Escape,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    CapsLock,
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

impl Key {
    pub const ALL: [Key; 33] = [
        Key::Shift,
        Key::Ctrl,
        Key::Alt,
        Key::Cmd,
        Key::Win,
        Key::Meta,
        Key::Enter,
        Key::Tab,
        Key::Space,
        Key::Backspace,
        Key::Delete,
        Key::Escape,
        Key::Home,
        Key::End,
        Key::PageUp,
        Key::PageDown,
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::CapsLock,
        Key::F1,
        Key::F2,
        Key::F3,
        Key::F4,
        Key::F5,
        Key::F6,
        Key::F7,
        Key::F8,
        Key::F9,
        Key::F10,
        Key::F11,
        Key::F12,
    ];

    /// 规范名称
    pub fn name(self) -> &'static str {
        match self {
            Key::Shift => "shift",
            Key::Ctrl => "ctrl",
            Key::Alt => "alt",
            Key::Cmd => "cmd",
            Key::Win => "win",
            Key::Meta => "meta",
            Key::Enter => "enter",
            Key::Tab => "tab",
            Key::Space => "space",
            Key::Backspace => "backspace",
            Key::Delete => "delete",
            Key::Escape => "escape",
            Key::Home => "home",
            Key::End => "end",
            Key::PageUp => "pageup",
            Key::PageDown => "pagedown",
            Key::Up => "up",
            Key::Down => "down",
            Key::Left => "left",
            Key::Right => "right",
            Key::CapsLock => "capslock",
            Key::F1 => "f1",
            Key::F2 => "f2",
            Key::F3 => "f3",
            Key::F4 => "f4",
            Key::F5 => "f5",
            Key::F6 => "f6",
            Key::F7 => "f7",
            Key::F8 => "f8",
            Key::F9 => "f9",
            Key::F10 => "f10",
            Key::F11 => "f11",
            Key::F12 => "f12",
        }
    }

    /// 后端查询用的 keysym 名称
    pub fn keysym(self) -> &'static str {
        match self {
            Key::Shift => "Shift_L",
            Key::Ctrl => "Control_L",
            Key::Alt => "Alt_L",
            Key::Cmd | Key::Win => "Super_L",
            Key::Meta => "Meta_L",
            Key::Enter => "Return",
            Key::Tab => "Tab",
            Key::Space => "space",
            Key::Backspace => "BackSpace",
            Key::Delete => "Delete",
            Key::Escape => "Escape",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "Prior",
            Key::PageDown => "Next",
            Key::Up => "Up",
            Key::Down => "Down",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::CapsLock => "Caps_Lock",
            Key::F1 => "F1",
            Key::F2 => "F2",
            Key::F3 => "F3",
            Key::F4 => "F4",
            Key::F5 => "F5",
            Key::F6 => "F6",
            Key::F7 => "F7",
            Key::F8 => "F8",
            Key::F9 => "F9",
            Key::F10 => "F10",
            Key::F11 => "F11",
            Key::F12 => "F12",
        }
    }

    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Key::Shift | Key::Ctrl | Key::Alt | Key::Cmd | Key::Win | Key::Meta
        )
    }

    /// 将字符串转换为具名按键，大小写不敏感，支持常见别名
    pub fn from_name(name: &str) -> Option<Key> {
        let key = match name.trim().to_lowercase().as_str() {
            "shift" => Key::Shift,
            "ctrl" | "control" => Key::Ctrl,
            "alt" | "option" => Key::Alt,
            "cmd" | "command" => Key::Cmd,
            "win" | "windows" => Key::Win,
            "meta" => Key::Meta,
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "space" => Key::Space,
            "backspace" | "bs" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "escape" | "esc" => Key::Escape,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdn" => Key::PageDown,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "capslock" => Key::CapsLock,
            "f1" => Key::F1,
            "f2" => Key::F2,
            "f3" => Key::F3,
            "f4" => Key::F4,
            "f5" => Key::F5,
            "f6" => Key::F6,
            "f7" => Key::F7,
            "f8" => Key::F8,
            "f9" => Key::F9,
            "f10" => Key::F10,
            "f11" => Key::F11,
            "f12" => Key::F12,
            _ => return None,
        };
        Some(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 符号按键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolicKey {
    /// 具名按键常量
    Named(Key),
    /// 单个字符
    Char(char),
    /// 按名称指定的按键，例如 "enter" 或 keysym 名称 "XF86AudioMute"
    Name(String),
    /// 已经是后端按键码，不做转换
    Raw(KeyCode),
}

impl SymbolicKey {
    /// 由文本记号构造：单个字符保持原样，多字符名称转为小写
    pub fn from_token(token: &str) -> Self {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => SymbolicKey::Char(c),
            _ => SymbolicKey::Name(token.to_lowercase()),
        }
    }
}

impl From<Key> for SymbolicKey {
    fn from(key: Key) -> Self {
        SymbolicKey::Named(key)
    }
}

impl From<char> for SymbolicKey {
    fn from(c: char) -> Self {
        SymbolicKey::Char(c)
    }
}

impl From<&str> for SymbolicKey {
    fn from(s: &str) -> Self {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => SymbolicKey::Char(c),
            _ => SymbolicKey::Name(s.to_string()),
        }
    }
}

impl fmt::Display for SymbolicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolicKey::Named(key) => write!(f, "{key}"),
            SymbolicKey::Char(c) => write!(f, "{c:?}"),
            SymbolicKey::Name(name) => write!(f, "{name}"),
            SymbolicKey::Raw(code) => write!(f, "#{code}"),
        }
    }
}

/// 按键目录
pub struct KeyCatalog;

impl KeyCatalog {
    /// 将符号按键解析为后端按键码，未知按键返回 `None`
    pub fn resolve<B: InputBackend + ?Sized>(
        backend: &mut B,
        key: &SymbolicKey,
    ) -> Option<KeyCode> {
        match key {
            SymbolicKey::Raw(code) => backend.raw_keycode(*code),
            other => {
                let name = Self::symbol_name(other)?;
                backend.keycode_for_symbol(&name)
            }
        }
    }

    /// 符号按键对应的 keysym 名称
    pub fn symbol_name(key: &SymbolicKey) -> Option<Cow<'static, str>> {
        match key {
            SymbolicKey::Named(key) => Some(Cow::Borrowed(key.keysym())),
            SymbolicKey::Char(c) => Self::char_symbol(*c),
            SymbolicKey::Name(name) => {
                if let Some(key) = Key::from_name(name) {
                    return Some(Cow::Borrowed(key.keysym()));
                }
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => None,
                    (Some(c), None) => Self::char_symbol(c),
                    _ => Some(Cow::Owned(name.clone())),
                }
            }
            SymbolicKey::Raw(_) => None,
        }
    }

    fn char_symbol(c: char) -> Option<Cow<'static, str>> {
        if c.is_ascii_alphanumeric() {
            return Some(Cow::Owned(c.to_string()));
        }
        if let Some(name) = CHAR_SYMBOLS.get(&c) {
            return Some(Cow::Borrowed(name));
        }
        if c.is_control() {
            return None;
        }
        Some(Cow::Owned(format!("U{:04X}", c as u32)))
    }

    /// keysym 名称对应的可输入字符，用于不认识 keysym 的后端
    pub fn char_for_symbol(name: &str) -> Option<char> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(c);
        }
        if let Some(c) = SYMBOL_CHARS.get(name) {
            return Some(*c);
        }
        name.strip_prefix('U')
            .filter(|hex| hex.len() >= 4)
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32)
    }

    /// 大写字母或 Shift 标点需要 Shift
    pub fn requires_shift(key: &SymbolicKey) -> bool {
        let c = match key {
            SymbolicKey::Char(c) => *c,
            SymbolicKey::Name(name) => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return false,
                }
            }
            SymbolicKey::Named(_) | SymbolicKey::Raw(_) => return false,
        };
        c.is_uppercase() || SHIFTED_PUNCTUATION.contains(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("enter"), Some(Key::Enter));
        assert_eq!(Key::from_name("Return"), Some(Key::Enter));
        assert_eq!(Key::from_name("ESC"), Some(Key::Escape));
        assert_eq!(Key::from_name("control"), Some(Key::Ctrl));
        assert!(Key::from_name("unknown").is_none());
    }

    #[test]
    fn test_names_round_trip_through_from_name() {
        for key in Key::ALL {
            assert_eq!(Key::from_name(key.name()), Some(key));
        }
    }

    #[test]
    fn test_symbol_name_for_chars() {
        assert_eq!(KeyCatalog::symbol_name(&'a'.into()).as_deref(), Some("a"));
        assert_eq!(KeyCatalog::symbol_name(&'@'.into()).as_deref(), Some("at"));
        assert_eq!(KeyCatalog::symbol_name(&' '.into()).as_deref(), Some("space"));
        assert_eq!(KeyCatalog::symbol_name(&'\n'.into()).as_deref(), Some("Return"));
        assert_eq!(KeyCatalog::symbol_name(&'é'.into()).as_deref(), Some("U00E9"));
        assert_eq!(KeyCatalog::symbol_name(&'\u{7}'.into()), None);
    }

    #[test]
    fn test_symbol_name_for_names() {
        let enter = SymbolicKey::Name("enter".to_string());
        assert_eq!(KeyCatalog::symbol_name(&enter).as_deref(), Some("Return"));

        let media = SymbolicKey::Name("XF86AudioMute".to_string());
        assert_eq!(KeyCatalog::symbol_name(&media).as_deref(), Some("XF86AudioMute"));

        assert_eq!(KeyCatalog::symbol_name(&SymbolicKey::Name(String::new())), None);
        assert_eq!(KeyCatalog::symbol_name(&SymbolicKey::Raw(42)), None);
    }

    #[test]
    fn test_char_for_symbol() {
        assert_eq!(KeyCatalog::char_for_symbol("a"), Some('a'));
        assert_eq!(KeyCatalog::char_for_symbol("at"), Some('@'));
        assert_eq!(KeyCatalog::char_for_symbol("U00E9"), Some('é'));
        assert_eq!(KeyCatalog::char_for_symbol("Shift_L"), None);
    }

    #[test]
    fn test_requires_shift() {
        assert!(KeyCatalog::requires_shift(&'A'.into()));
        assert!(KeyCatalog::requires_shift(&'@'.into()));
        assert!(KeyCatalog::requires_shift(&'?'.into()));
        assert!(!KeyCatalog::requires_shift(&'a'.into()));
        assert!(!KeyCatalog::requires_shift(&'1'.into()));
        assert!(!KeyCatalog::requires_shift(&Key::Shift.into()));
        assert!(!KeyCatalog::requires_shift(&SymbolicKey::Name("F1".to_string())));
    }

    #[test]
    fn test_from_token_lowers_names_only() {
        assert_eq!(SymbolicKey::from_token("A"), SymbolicKey::Char('A'));
        assert_eq!(SymbolicKey::from_token("ENTER"), SymbolicKey::Name("enter".to_string()));
    }
}
