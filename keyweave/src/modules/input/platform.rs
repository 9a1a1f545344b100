//! 平台识别
//!
//! 集中处理与操作系统相关的按键选择

use super::keys::Key;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Mac,
    Windows,
    Linux,
}

impl Platform {
    /// 编译目标所在的平台，非 macOS / Windows 一律视为 Linux
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// 该平台特有的第四个修饰键
    pub fn extra_modifier_key(self) -> Key {
        match self {
            Platform::Mac => Key::Cmd,
            Platform::Windows => Key::Win,
            Platform::Linux => Key::Meta,
        }
    }

    /// 粘贴快捷键使用的修饰键
    pub fn paste_modifier_key(self) -> Key {
        match self {
            Platform::Mac => Key::Cmd,
            Platform::Windows | Platform::Linux => Key::Ctrl,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Mac => write!(f, "mac"),
            Platform::Windows => write!(f, "windows"),
            Platform::Linux => write!(f, "linux"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_modifier_key() {
        assert_eq!(Platform::Mac.extra_modifier_key(), Key::Cmd);
        assert_eq!(Platform::Windows.extra_modifier_key(), Key::Win);
        assert_eq!(Platform::Linux.extra_modifier_key(), Key::Meta);
    }

    #[test]
    fn test_paste_modifier_key() {
        assert_eq!(Platform::Mac.paste_modifier_key(), Key::Cmd);
        assert_eq!(Platform::Windows.paste_modifier_key(), Key::Ctrl);
        assert_eq!(Platform::Linux.paste_modifier_key(), Key::Ctrl);
    }
}
