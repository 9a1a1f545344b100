//! 修饰键解析

use super::keys::Key;
use super::platform::Platform;

/// 请求的修饰键：单个或多个
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifierSpec {
    Single(Key),
    Multiple(Vec<Key>),
}

impl ModifierSpec {
    pub fn contains(&self, key: Key) -> bool {
        match self {
            ModifierSpec::Single(single) => *single == key,
            ModifierSpec::Multiple(keys) => keys.contains(&key),
        }
    }
}

impl From<Key> for ModifierSpec {
    fn from(key: Key) -> Self {
        ModifierSpec::Single(key)
    }
}

impl From<Vec<Key>> for ModifierSpec {
    fn from(keys: Vec<Key>) -> Self {
        ModifierSpec::Multiple(keys)
    }
}

impl From<&[Key]> for ModifierSpec {
    fn from(keys: &[Key]) -> Self {
        ModifierSpec::Multiple(keys.to_vec())
    }
}

/// 修饰键解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifierResolver {
    platform: Platform,
}

impl ModifierResolver {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// 平台有效的修饰键，顺序即按下顺序
    pub fn universe(&self) -> [Key; 4] {
        [Key::Shift, Key::Ctrl, self.platform.extra_modifier_key(), Key::Alt]
    }

    /// 请求中属于本平台的修饰键，按 `universe()` 顺序排列
    pub fn active_modifiers(&self, requested: &ModifierSpec) -> Vec<Key> {
        self.universe()
            .into_iter()
            .filter(|key| requested.contains(*key))
            .collect()
    }
}
