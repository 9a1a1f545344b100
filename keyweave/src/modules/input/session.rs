//! 输入会话
//!
//! 由调用方显式构造并持有，聚合按键序列器与剪贴板粘贴协调器。
//! 同一会话的所有操作串行执行；跨线程共享时使用 `SharedSession`。

use super::backend::{EnigoBackend, InputBackend};
use super::clipboard::{ArboardClipboard, Clipboard, ClipboardPasteCoordinator};
use super::injector::{InputInjector, KeyOutcome};
use super::keys::SymbolicKey;
use super::modifiers::ModifierSpec;
use super::platform::Platform;
use super::sequencer::{KeySequencer, Sleeper, ThreadSleeper, TypeInput};
use super::shortcut::Shortcut;
use crate::error::InputError;
use crate::modules::config::{ConfigManager, InjectionMethod};
use std::sync::Arc;
use std::time::Duration;

/// 加锁共享的会话
pub type SharedSession<B, C> = Arc<parking_lot::Mutex<InputSession<B, C>>>;

/// 文本注入请求
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInputRequest {
    pub text: String,
    /// `None` 时使用配置中的注入方式
    pub method: Option<InjectionMethod>,
}

impl TextInputRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            method: None,
        }
    }

    pub fn with_method(mut self, method: InjectionMethod) -> Self {
        self.method = Some(method);
        self
    }
}

/// 输入会话
pub struct InputSession<B, C> {
    sequencer: KeySequencer<B>,
    paste: ClipboardPasteCoordinator<C>,
    config: Arc<ConfigManager>,
    platform: Platform,
}

impl InputSession<EnigoBackend, ArboardClipboard> {
    /// 使用真实显示服务器与系统剪贴板创建会话
    pub fn system(config: Arc<ConfigManager>) -> Result<Self, InputError> {
        let backend = EnigoBackend::new()?;
        let clipboard = ArboardClipboard::new()?;
        Ok(Self::new(backend, clipboard, config, Platform::current()))
    }
}

impl<B: InputBackend, C: Clipboard> InputSession<B, C> {
    pub fn new(backend: B, clipboard: C, config: Arc<ConfigManager>, platform: Platform) -> Self {
        Self::with_sleeper(backend, clipboard, config, platform, ThreadSleeper)
    }

    pub fn with_sleeper<S>(
        backend: B,
        clipboard: C,
        config: Arc<ConfigManager>,
        platform: Platform,
        sleeper: S,
    ) -> Self
    where
        S: Sleeper + Send + Sync + 'static,
    {
        let sequencer = KeySequencer::with_sleeper(
            InputInjector::new(backend),
            config.clone(),
            platform,
            sleeper,
        );
        let paste = ClipboardPasteCoordinator::new(clipboard, config.clone(), platform);
        Self {
            sequencer,
            paste,
            config,
            platform,
        }
    }

    /// 包装成可跨线程共享的会话
    pub fn into_shared(self) -> SharedSession<B, C> {
        Arc::new(parking_lot::Mutex::new(self))
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn config(&self) -> &Arc<ConfigManager> {
        &self.config
    }

    pub fn sequencer_mut(&mut self) -> &mut KeySequencer<B> {
        &mut self.sequencer
    }

    /// 屏幕尺寸 (宽, 高)
    pub fn screen_size(&self) -> Result<(u32, u32), InputError> {
        self.sequencer.injector().screen_dimensions()
    }

    pub fn key_down(&mut self, key: impl Into<SymbolicKey>) -> Result<KeyOutcome, InputError> {
        self.sequencer.injector_mut().press_key_down(&key.into())
    }

    pub fn key_up(&mut self, key: impl Into<SymbolicKey>) -> Result<KeyOutcome, InputError> {
        self.sequencer.injector_mut().release_key_up(&key.into())
    }

    pub fn tap(&mut self, key: impl Into<SymbolicKey>) -> Result<KeyOutcome, InputError> {
        self.sequencer.tap(&key.into())
    }

    /// 输入文本、按键或带修饰键的组合
    pub fn type_input(
        &mut self,
        input: impl Into<TypeInput>,
        modifier: Option<ModifierSpec>,
        interval: Option<Duration>,
    ) -> Result<(), InputError> {
        self.sequencer
            .type_input(input.into(), modifier.as_ref(), interval)
    }

    /// 修饰键组合，修饰键按平台顺序解析
    pub fn chord(
        &mut self,
        modifier: impl Into<ModifierSpec>,
        key: impl Into<SymbolicKey>,
    ) -> Result<(), InputError> {
        self.sequencer.chord_with(&modifier.into(), &key.into())
    }

    /// 执行 "Ctrl+Shift+S" 形式的快捷键
    pub fn press_shortcut(&mut self, shortcut: &str) -> Result<(), InputError> {
        let shortcut = Shortcut::parse(shortcut, self.platform)?;
        let spec = ModifierSpec::Multiple(shortcut.modifiers);
        self.sequencer.chord_with(&spec, &shortcut.key)
    }

    /// 通过剪贴板粘贴文本
    pub fn paste(&mut self, text: &str) -> Result<(), InputError> {
        self.paste.paste(&mut self.sequencer, text)
    }

    /// 按请求的方式注入文本
    pub fn inject(&mut self, request: &TextInputRequest) -> Result<(), InputError> {
        let method = request
            .method
            .unwrap_or(self.config.current().input.injection_method);
        match Self::effective_method(method, &request.text) {
            InjectionMethod::Clipboard => {
                tracing::info!("Injecting {} chars via clipboard", request.text.chars().count());
                self.paste(&request.text)
            }
            _ => {
                tracing::info!("Injecting {} chars via keyboard", request.text.chars().count());
                self.type_input(request.text.as_str(), None, None)
            }
        }
    }

    /// `Auto` 时，只有可直接按键输入的文本才走键盘
    fn effective_method(method: InjectionMethod, text: &str) -> InjectionMethod {
        match method {
            InjectionMethod::Auto => {
                let typeable = text
                    .chars()
                    .all(|c| c.is_ascii_graphic() || matches!(c, ' ' | '\n' | '\t'));
                if typeable {
                    InjectionMethod::Keyboard
                } else {
                    InjectionMethod::Clipboard
                }
            }
            other => other,
        }
    }
}

impl<B, C> std::fmt::Debug for InputSession<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSession")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}
