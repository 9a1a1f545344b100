//! 按键注入器
//!
//! 把符号按键解析成按键码并发送按下 / 释放事件，每次调用结束前与后端同步。

use super::backend::{InputBackend, KeyCode, KeyDirection};
use super::keys::{Key, KeyCatalog, SymbolicKey};
use crate::error::InputError;

/// 单次按键操作的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// 事件已发送
    Emitted,
    /// 按键无法解析，什么也没有发送
    Unresolved,
}

impl KeyOutcome {
    pub fn is_emitted(self) -> bool {
        self == KeyOutcome::Emitted
    }
}

/// 按键注入器
#[derive(Debug)]
pub struct InputInjector<B> {
    backend: B,
}

impl<B: InputBackend> InputInjector<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_inner(self) -> B {
        self.backend
    }

    /// 按下按键，不释放
    ///
    /// 需要 Shift 的单个字符会在按下前按住 Shift，并在字符按下后立即释放 Shift；
    /// 字符本身的释放由随后的 `release_key_up` 完成。
    pub fn press_key_down(&mut self, key: &SymbolicKey) -> Result<KeyOutcome, InputError> {
        let Some(code) = KeyCatalog::resolve(&mut self.backend, key) else {
            tracing::debug!("Unresolved key {}, press skipped", key);
            return Ok(KeyOutcome::Unresolved);
        };

        let shift = if matches!(key, SymbolicKey::Raw(_)) || !KeyCatalog::requires_shift(key) {
            None
        } else {
            let shift = KeyCatalog::resolve(&mut self.backend, &Key::Shift.into());
            if shift.is_none() {
                tracing::warn!("Shift key unresolved, pressing {} without it", key);
            }
            shift
        };

        if let Some(shift) = shift {
            self.emit(shift, KeyDirection::Down)?;
        }
        if let Err(e) = self.emit(code, KeyDirection::Down) {
            // 不能让 Shift 保持按下
            if let Some(shift) = shift {
                if let Err(release) = self.emit(shift, KeyDirection::Up) {
                    tracing::warn!("Failed to release Shift after {} failed: {}", key, release);
                }
            }
            return Err(e);
        }
        if let Some(shift) = shift {
            self.emit(shift, KeyDirection::Up)?;
        }
        self.backend.sync()?;
        Ok(KeyOutcome::Emitted)
    }

    /// 释放按键
    pub fn release_key_up(&mut self, key: &SymbolicKey) -> Result<KeyOutcome, InputError> {
        let Some(code) = KeyCatalog::resolve(&mut self.backend, key) else {
            tracing::debug!("Unresolved key {}, release skipped", key);
            return Ok(KeyOutcome::Unresolved);
        };
        self.emit(code, KeyDirection::Up)?;
        self.backend.sync()?;
        Ok(KeyOutcome::Emitted)
    }

    /// 屏幕尺寸 (宽, 高)
    pub fn screen_dimensions(&self) -> Result<(u32, u32), InputError> {
        self.backend.screen_dimensions()
    }

    fn emit(&mut self, code: KeyCode, direction: KeyDirection) -> Result<(), InputError> {
        tracing::trace!("Key event {:?} {}", direction, code);
        self.backend.send_key_event(code, direction)
    }
}
