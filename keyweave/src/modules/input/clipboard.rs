//! 剪贴板注入模块
//!
//! 把文本写入系统剪贴板，轮询确认写入已经可见，再发送粘贴快捷键 (Ctrl+V 或 Cmd+V)。

use super::backend::InputBackend;
use super::modifiers::ModifierSpec;
use super::platform::Platform;
use super::sequencer::{KeySequencer, Sleeper};
use crate::error::InputError;
use crate::modules::config::ConfigManager;
use auto_impl::auto_impl;
use std::sync::Arc;

/// 剪贴板能力
#[auto_impl(&mut, Box)]
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), InputError>;
    fn get_text(&mut self) -> Result<String, InputError>;
}

/// 系统剪贴板
pub struct ArboardClipboard {
    inner: arboard::Clipboard,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self, InputError> {
        let inner =
            arboard::Clipboard::new().map_err(|e| InputError::ClipboardFailed(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl std::fmt::Debug for ArboardClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArboardClipboard").finish_non_exhaustive()
    }
}

impl Clipboard for ArboardClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), InputError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| InputError::ClipboardFailed(e.to_string()))
    }

    fn get_text(&mut self) -> Result<String, InputError> {
        match self.inner.get_text() {
            Ok(text) => Ok(text),
            // 空剪贴板读出为空字符串
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(InputError::ClipboardFailed(e.to_string())),
        }
    }
}

/// 一次粘贴请求的暂存状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardStagingState {
    pub staged_text: String,
    pub confirmed: bool,
    pub attempts: u32,
}

/// 剪贴板粘贴协调器
pub struct ClipboardPasteCoordinator<C> {
    clipboard: C,
    config: Arc<ConfigManager>,
    platform: Platform,
}

impl<C: Clipboard> ClipboardPasteCoordinator<C> {
    pub fn new(clipboard: C, config: Arc<ConfigManager>, platform: Platform) -> Self {
        Self {
            clipboard,
            config,
            platform,
        }
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut C {
        &mut self.clipboard
    }

    /// 粘贴文本
    ///
    /// 剪贴板在超时内没有读回暂存文本时返回 `InputError::PasteFailed`，
    /// 此时不会发送粘贴快捷键，也不会清空剪贴板。
    pub fn paste<B: InputBackend>(
        &mut self,
        sequencer: &mut KeySequencer<B>,
        text: &str,
    ) -> Result<(), InputError> {
        let mut state = self.stage(text)?;
        self.await_confirmation(&mut state, sequencer.sleeper())?;

        let modifier = ModifierSpec::Single(self.platform.paste_modifier_key());
        sequencer.type_input("v".into(), Some(&modifier), None)?;

        self.clipboard.set_text("")?;
        tracing::debug!("Pasted {} chars after {} polls", text.chars().count(), state.attempts);
        Ok(())
    }

    /// 写入剪贴板
    pub fn stage(&mut self, text: &str) -> Result<ClipboardStagingState, InputError> {
        self.clipboard.set_text(text)?;
        Ok(ClipboardStagingState {
            staged_text: text.to_string(),
            confirmed: false,
            attempts: 0,
        })
    }

    /// 以 `1 / wait_scan_rate` 的间隔轮询，直到读回暂存文本或用完
    /// `auto_wait_timeout * wait_scan_rate` 次尝试
    pub fn await_confirmation(
        &mut self,
        state: &mut ClipboardStagingState,
        sleeper: &dyn Sleeper,
    ) -> Result<(), InputError> {
        let timing = self.config.timing();
        let interval = timing.poll_interval();
        let max_attempts = timing.max_attempts();

        while !state.confirmed && state.attempts < max_attempts {
            match self.clipboard.get_text() {
                Ok(current) if current == state.staged_text => state.confirmed = true,
                Ok(_) => {
                    sleeper.sleep(interval);
                    state.attempts += 1;
                }
                Err(e) => {
                    tracing::warn!("Clipboard read failed while waiting: {}", e);
                    sleeper.sleep(interval);
                    state.attempts += 1;
                }
            }
        }

        if !state.confirmed {
            tracing::warn!(
                "Clipboard did not match staged text after {} polls",
                state.attempts
            );
            return Err(InputError::PasteFailed);
        }
        Ok(())
    }
}
