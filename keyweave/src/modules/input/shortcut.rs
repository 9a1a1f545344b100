//! 快捷键字符串解析
//!
//! 把 "Ctrl+Shift+S" 之类的字符串拆成修饰键与目标键

use super::keys::{Key, SymbolicKey};
use super::platform::Platform;
use crate::error::InputError;

/// 解析后的快捷键
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub modifiers: Vec<Key>,
    pub key: SymbolicKey,
}

impl Shortcut {
    /// 解析快捷键字符串
    ///
    /// 最后一段是目标键，其余各段必须是修饰键。`super` 与 `cmdorctrl`
    /// 按 `platform` 解析。
    pub fn parse(shortcut: &str, platform: Platform) -> Result<Self, InputError> {
        let parts: Vec<&str> = shortcut.split('+').map(str::trim).collect();
        let Some((last, modifier_parts)) = parts.split_last() else {
            return Err(InputError::InvalidShortcut(shortcut.to_string()));
        };
        if modifier_parts.is_empty() || last.is_empty() {
            return Err(InputError::InvalidShortcut(shortcut.to_string()));
        }

        let modifiers = modifier_parts
            .iter()
            .map(|part| {
                Self::normalize_modifier(part, platform).ok_or_else(|| {
                    InputError::InvalidShortcut(format!("{shortcut}: unknown modifier {part}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let key = match Key::from_name(last) {
            Some(key) => SymbolicKey::Named(key),
            None => SymbolicKey::from_token(&last.to_lowercase()),
        };
        Ok(Self { modifiers, key })
    }

    /// 标准化修饰键名称
    fn normalize_modifier(part: &str, platform: Platform) -> Option<Key> {
        let key = match part.to_lowercase().as_str() {
            "cmdorctrl" | "commandorcontrol" => platform.paste_modifier_key(),
            "super" => platform.extra_modifier_key(),
            other => Key::from_name(other).filter(|key| key.is_modifier())?,
        };
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shortcut() {
        let shortcut = Shortcut::parse("Ctrl+Shift+S", Platform::Linux).unwrap();
        assert_eq!(shortcut.modifiers, vec![Key::Ctrl, Key::Shift]);
        assert_eq!(shortcut.key, SymbolicKey::Char('s'));
    }

    #[test]
    fn test_parse_named_target() {
        let shortcut = Shortcut::parse("alt + F4", Platform::Windows).unwrap();
        assert_eq!(shortcut.modifiers, vec![Key::Alt]);
        assert_eq!(shortcut.key, SymbolicKey::Named(Key::F4));
    }

    #[test]
    fn test_parse_platform_aliases() {
        let mac = Shortcut::parse("CmdOrCtrl+Super+q", Platform::Mac).unwrap();
        assert_eq!(mac.modifiers, vec![Key::Cmd, Key::Cmd]);

        let linux = Shortcut::parse("CmdOrCtrl+Super+q", Platform::Linux).unwrap();
        assert_eq!(linux.modifiers, vec![Key::Ctrl, Key::Meta]);

        let option = Shortcut::parse("option+command+c", Platform::Mac).unwrap();
        assert_eq!(option.modifiers, vec![Key::Alt, Key::Cmd]);
    }

    #[test]
    fn test_parse_shortcut_invalid() {
        assert!(Shortcut::parse("S", Platform::Linux).is_err());
        assert!(Shortcut::parse("ctrl+", Platform::Linux).is_err());
        assert!(Shortcut::parse("enter+s", Platform::Linux).is_err());
        assert!(Shortcut::parse("hyper+s", Platform::Linux).is_err());
    }
}
