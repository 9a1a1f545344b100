//! 按键序列
//!
//! 在注入器之上组合出单击、逐字符输入与修饰键组合。所有操作都是阻塞的，
//! 总耗时等于其中的等待之和。

use super::backend::InputBackend;
use super::injector::{InputInjector, KeyOutcome};
use super::keys::{Key, SymbolicKey};
use super::modifiers::{ModifierResolver, ModifierSpec};
use super::platform::Platform;
use crate::error::InputError;
use crate::modules::config::ConfigManager;
use auto_impl::auto_impl;
use std::sync::Arc;
use std::time::Duration;

/// 组合键中相邻两次按键变化之间的等待
pub const DEFAULT_KEY_SHORTCUT_DELAY: Duration = Duration::from_millis(100);

/// 组合键支持的修饰键数量
const MAX_CHORD_MODIFIERS: usize = 2;

/// 阻塞等待
#[auto_impl(&, Box, Arc)]
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// 使用 `std::thread::sleep` 的等待
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// 要输入的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeInput {
    /// 具名按键，例如回车
    Key(Key),
    /// 逐字符输入的文本
    Text(String),
    /// 按顺序输入的按键名称列表
    Keys(Vec<String>),
}

impl TypeInput {
    /// 作为组合键目标时对应的按键
    fn chord_target(&self) -> Option<SymbolicKey> {
        match self {
            TypeInput::Key(key) => Some(SymbolicKey::Named(*key)),
            TypeInput::Text(text) => Some(SymbolicKey::from(text.as_str())),
            TypeInput::Keys(keys) => match keys.as_slice() {
                [only] => Some(SymbolicKey::from_token(only)),
                _ => None,
            },
        }
    }
}

impl From<Key> for TypeInput {
    fn from(key: Key) -> Self {
        TypeInput::Key(key)
    }
}

impl From<&str> for TypeInput {
    fn from(text: &str) -> Self {
        TypeInput::Text(text.to_string())
    }
}

impl From<String> for TypeInput {
    fn from(text: String) -> Self {
        TypeInput::Text(text)
    }
}

impl From<Vec<String>> for TypeInput {
    fn from(keys: Vec<String>) -> Self {
        TypeInput::Keys(keys)
    }
}

/// 按键序列器
pub struct KeySequencer<B> {
    injector: InputInjector<B>,
    sleeper: Box<dyn Sleeper + Send + Sync>,
    resolver: ModifierResolver,
    config: Arc<ConfigManager>,
}

impl<B: InputBackend> KeySequencer<B> {
    pub fn new(injector: InputInjector<B>, config: Arc<ConfigManager>, platform: Platform) -> Self {
        Self::with_sleeper(injector, config, platform, ThreadSleeper)
    }

    pub fn with_sleeper<S>(
        injector: InputInjector<B>,
        config: Arc<ConfigManager>,
        platform: Platform,
        sleeper: S,
    ) -> Self
    where
        S: Sleeper + Send + Sync + 'static,
    {
        Self {
            injector,
            sleeper: Box::new(sleeper),
            resolver: ModifierResolver::new(platform),
            config,
        }
    }

    pub fn injector(&self) -> &InputInjector<B> {
        &self.injector
    }

    pub fn injector_mut(&mut self) -> &mut InputInjector<B> {
        &mut self.injector
    }

    pub fn sleeper(&self) -> &dyn Sleeper {
        &*self.sleeper
    }

    pub fn resolver(&self) -> ModifierResolver {
        self.resolver
    }

    /// 按下并立即释放，不等待
    pub fn tap(&mut self, key: &SymbolicKey) -> Result<KeyOutcome, InputError> {
        let down = self.injector.press_key_down(key)?;
        self.injector.release_key_up(key)?;
        Ok(down)
    }

    /// 逐字符输入文本，每个字符之后等待 `interval`
    pub fn type_text(&mut self, text: &str, interval: Duration) -> Result<(), InputError> {
        for c in text.chars() {
            self.tap(&SymbolicKey::Char(c))?;
            self.sleeper.sleep(interval);
        }
        Ok(())
    }

    /// 按顺序输入按键名称，多字符名称转为小写，单个字符保持原样
    pub fn type_keys<S: AsRef<str>>(
        &mut self,
        keys: &[S],
        interval: Duration,
    ) -> Result<(), InputError> {
        for token in keys {
            self.tap(&SymbolicKey::from_token(token.as_ref()))?;
            self.sleeper.sleep(interval);
        }
        Ok(())
    }

    /// 修饰键组合
    ///
    /// 依次按下修饰键，单击目标键，再按相反顺序释放修饰键，每两次变化之间等待
    /// `DEFAULT_KEY_SHORTCUT_DELAY`。只支持 1 或 2 个修饰键，超出范围时不发送任何事件。
    pub fn chord(&mut self, modifiers: &[Key], key: &SymbolicKey) -> Result<(), InputError> {
        if modifiers.is_empty() || modifiers.len() > MAX_CHORD_MODIFIERS {
            tracing::error!(
                "Returned key modifiers out of range: {} active ({:?})",
                modifiers.len(),
                modifiers
            );
            return Err(InputError::ModifierOutOfRange(modifiers.len()));
        }

        let mut held = 0;
        let result = self.chord_inner(modifiers, key, &mut held);
        if result.is_err() {
            self.release_held(&modifiers[..held]);
        }
        result
    }

    fn chord_inner(
        &mut self,
        modifiers: &[Key],
        key: &SymbolicKey,
        held: &mut usize,
    ) -> Result<(), InputError> {
        for modifier in modifiers {
            self.injector.press_key_down(&SymbolicKey::Named(*modifier))?;
            *held += 1;
            self.sleeper.sleep(DEFAULT_KEY_SHORTCUT_DELAY);
        }

        self.injector.press_key_down(key)?;
        self.sleeper.sleep(DEFAULT_KEY_SHORTCUT_DELAY);
        self.injector.release_key_up(key)?;

        for modifier in modifiers.iter().rev() {
            self.sleeper.sleep(DEFAULT_KEY_SHORTCUT_DELAY);
            self.injector.release_key_up(&SymbolicKey::Named(*modifier))?;
            *held -= 1;
        }
        Ok(())
    }

    /// 组合键失败后尽量释放已按下的修饰键
    fn release_held(&mut self, held: &[Key]) {
        for modifier in held.iter().rev() {
            if let Err(e) = self.injector.release_key_up(&SymbolicKey::Named(*modifier)) {
                tracing::warn!("Failed to release {} after chord error: {}", modifier, e);
            }
        }
    }

    /// 解析请求的修饰键后执行组合键
    pub fn chord_with(
        &mut self,
        modifier: &ModifierSpec,
        key: &SymbolicKey,
    ) -> Result<(), InputError> {
        let active = self.resolver.active_modifiers(modifier);
        tracing::debug!(
            "Modifiers ({}): {}",
            active.len(),
            active.iter().map(|k| k.name()).collect::<Vec<_>>().join(" ")
        );
        self.chord(&active, key)
    }

    /// 输入入口
    ///
    /// - 无修饰键的具名按键：单击后等待 `DEFAULT_KEY_SHORTCUT_DELAY`
    /// - 无修饰键的文本或按键列表：按 `interval` (缺省为配置的 `type_delay`) 逐个输入
    /// - 带修饰键：解析有效修饰键后执行组合键
    ///
    /// 无论结果如何，结束时清除单次生效的 `type_delay` 覆盖值。
    pub fn type_input(
        &mut self,
        input: TypeInput,
        modifier: Option<&ModifierSpec>,
        interval: Option<Duration>,
    ) -> Result<(), InputError> {
        let result = self.dispatch(input, modifier, interval);
        self.config.reset_type_delay();
        result
    }

    fn dispatch(
        &mut self,
        input: TypeInput,
        modifier: Option<&ModifierSpec>,
        interval: Option<Duration>,
    ) -> Result<(), InputError> {
        match (input, modifier) {
            (TypeInput::Key(key), None) => {
                tracing::debug!("Scenario 1: reserved key {}", key);
                self.tap(&SymbolicKey::Named(key))?;
                self.sleeper.sleep(DEFAULT_KEY_SHORTCUT_DELAY);
                Ok(())
            }
            (TypeInput::Text(text), None) => {
                let interval = interval.unwrap_or_else(|| self.configured_interval());
                tracing::debug!("Scenario 2: text block of {} chars", text.chars().count());
                self.type_text(&text, interval)
            }
            (TypeInput::Keys(keys), None) => {
                let interval = interval.unwrap_or_else(|| self.configured_interval());
                tracing::debug!("Scenario 2: {} key names", keys.len());
                self.type_keys(&keys, interval)
            }
            (input, Some(modifier)) => {
                tracing::debug!("Scenario 3: combination of modifiers and other keys");
                let key = input.chord_target().ok_or_else(|| {
                    InputError::InvalidShortcut(format!("{input:?} is not a single chord target"))
                })?;
                self.chord_with(modifier, &key)
            }
        }
    }

    fn configured_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.config.type_delay()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::config::{TimingSettings, UserConfig};
    use crate::modules::input::backend::KeyEvent;
    use crate::modules::input::recording::{EventLog, RecordingBackend, RecordingSleeper, Trace};

    struct Fixture {
        sequencer: KeySequencer<RecordingBackend>,
        backend: RecordingBackend,
        config: Arc<ConfigManager>,
        log: EventLog,
    }

    impl Fixture {
        fn new(platform: Platform) -> Self {
            Self::with_config(platform, UserConfig::default())
        }

        fn with_config(platform: Platform, config: UserConfig) -> Self {
            let log = EventLog::new();
            let backend = RecordingBackend::new(log.clone());
            let config = Arc::new(ConfigManager::with_config(config).unwrap());
            let sequencer = KeySequencer::with_sleeper(
                InputInjector::new(backend.clone()),
                config.clone(),
                platform,
                RecordingSleeper::new(log.clone()),
            );
            Self { sequencer, backend, config, log }
        }

        fn code(&self, name: &str) -> u32 {
            self.backend.code(name).unwrap()
        }

        /// 按键与等待，去掉同步标记
        fn timeline(&self) -> Vec<Trace> {
            self.log
                .entries()
                .into_iter()
                .filter(|t| !matches!(t, Trace::Sync))
                .collect()
        }
    }

    const SETTLE: Trace = Trace::Sleep(DEFAULT_KEY_SHORTCUT_DELAY);

    #[test]
    fn test_tap_has_no_delay() {
        let mut f = Fixture::new(Platform::Linux);
        f.sequencer.tap(&'x'.into()).unwrap();
        let x = f.code("x");
        assert_eq!(
            f.timeline(),
            vec![Trace::Key(KeyEvent::down(x)), Trace::Key(KeyEvent::up(x))]
        );
    }

    #[test]
    fn test_type_text_taps_with_interval() {
        let mut f = Fixture::new(Platform::Linux);
        let interval = Duration::from_millis(50);
        f.sequencer.type_text("hi", interval).unwrap();

        let (h, i) = (f.code("h"), f.code("i"));
        assert_eq!(
            f.timeline(),
            vec![
                Trace::Key(KeyEvent::down(h)),
                Trace::Key(KeyEvent::up(h)),
                Trace::Sleep(interval),
                Trace::Key(KeyEvent::down(i)),
                Trace::Key(KeyEvent::up(i)),
                Trace::Sleep(interval),
            ]
        );
        assert_eq!(f.log.key_events().len(), 4);
        assert_eq!(f.log.sleeps().len(), 2);
    }

    #[test]
    fn test_type_keys_lowers_names_only() {
        let mut f = Fixture::new(Platform::Linux);
        f.sequencer
            .type_keys(&["ENTER", "A"], Duration::ZERO)
            .unwrap();

        let (enter, shift, a) = (f.code("Return"), f.code("Shift_L"), f.code("A"));
        assert_eq!(
            f.log.key_events(),
            vec![
                KeyEvent::down(enter),
                KeyEvent::up(enter),
                KeyEvent::down(shift),
                KeyEvent::down(a),
                KeyEvent::up(shift),
                KeyEvent::up(a),
            ]
        );
    }

    #[test]
    fn test_single_modifier_chord() {
        let mut f = Fixture::new(Platform::Linux);
        f.sequencer.chord(&[Key::Ctrl], &'v'.into()).unwrap();

        let (ctrl, v) = (f.code("Control_L"), f.code("v"));
        assert_eq!(
            f.timeline(),
            vec![
                Trace::Key(KeyEvent::down(ctrl)),
                SETTLE,
                Trace::Key(KeyEvent::down(v)),
                SETTLE,
                Trace::Key(KeyEvent::up(v)),
                SETTLE,
                Trace::Key(KeyEvent::up(ctrl)),
            ]
        );
    }

    #[test]
    fn test_two_modifier_chord_nests() {
        let mut f = Fixture::new(Platform::Linux);
        f.sequencer.chord(&[Key::Shift, Key::Ctrl], &'t'.into()).unwrap();

        let (shift, ctrl, t) = (f.code("Shift_L"), f.code("Control_L"), f.code("t"));
        assert_eq!(
            f.log.key_events(),
            vec![
                KeyEvent::down(shift),
                KeyEvent::down(ctrl),
                KeyEvent::down(t),
                KeyEvent::up(t),
                KeyEvent::up(ctrl),
                KeyEvent::up(shift),
            ]
        );
        assert_eq!(f.log.sleeps(), vec![DEFAULT_KEY_SHORTCUT_DELAY; 5]);
    }

    #[test]
    fn test_chord_out_of_range_emits_nothing() {
        let mut f = Fixture::new(Platform::Linux);
        let err = f
            .sequencer
            .chord(&[Key::Shift, Key::Ctrl, Key::Alt], &'t'.into())
            .unwrap_err();
        assert_eq!(err, InputError::ModifierOutOfRange(3));

        let err = f.sequencer.chord(&[], &'t'.into()).unwrap_err();
        assert_eq!(err, InputError::ModifierOutOfRange(0));
        assert!(f.log.entries().is_empty());
    }

    #[test]
    fn test_type_input_with_three_modifiers_is_rejected() {
        let mut f = Fixture::new(Platform::Mac);
        let spec = ModifierSpec::Multiple(vec![Key::Shift, Key::Ctrl, Key::Cmd]);
        let err = f.sequencer.type_input("z".into(), Some(&spec), None).unwrap_err();
        assert_eq!(err, InputError::ModifierOutOfRange(3));
        assert!(f.log.key_events().is_empty());
    }

    #[test]
    fn test_type_input_reserved_key() {
        let mut f = Fixture::new(Platform::Linux);
        f.sequencer.type_input(Key::Enter.into(), None, None).unwrap();

        let enter = f.code("Return");
        assert_eq!(
            f.timeline(),
            vec![
                Trace::Key(KeyEvent::down(enter)),
                Trace::Key(KeyEvent::up(enter)),
                SETTLE,
            ]
        );
    }

    #[test]
    fn test_type_input_uses_configured_delay() {
        let config = UserConfig {
            timing: TimingSettings {
                type_delay: 0.25,
                ..TimingSettings::default()
            },
            ..UserConfig::default()
        };
        let mut f = Fixture::with_config(Platform::Linux, config);
        f.sequencer.type_input("ab".into(), None, None).unwrap();
        assert_eq!(f.log.sleeps(), vec![Duration::from_millis(250); 2]);
    }

    #[test]
    fn test_type_delay_override_is_single_use() {
        let mut f = Fixture::new(Platform::Linux);
        f.config.override_type_delay(0.5).unwrap();

        f.sequencer.type_input("a".into(), None, None).unwrap();
        f.sequencer.type_input("b".into(), None, None).unwrap();

        assert_eq!(
            f.log.sleeps(),
            vec![Duration::from_millis(500), Duration::ZERO]
        );
    }

    #[test]
    fn test_explicit_interval_beats_config() {
        let mut f = Fixture::new(Platform::Linux);
        f.config.override_type_delay(0.5).unwrap();
        f.sequencer
            .type_input("a".into(), None, Some(Duration::from_millis(10)))
            .unwrap();
        assert_eq!(f.log.sleeps(), vec![Duration::from_millis(10)]);
        assert_eq!(f.config.type_delay(), 0.0);
    }

    #[test]
    fn test_type_input_with_modifier_resolves_platform_order() {
        let mut f = Fixture::new(Platform::Windows);
        let spec = ModifierSpec::Multiple(vec![Key::Alt, Key::Ctrl]);
        f.sequencer.type_input("s".into(), Some(&spec), None).unwrap();

        let (ctrl, alt, s) = (f.code("Control_L"), f.code("Alt_L"), f.code("s"));
        assert_eq!(
            f.log.key_events(),
            vec![
                KeyEvent::down(ctrl),
                KeyEvent::down(alt),
                KeyEvent::down(s),
                KeyEvent::up(s),
                KeyEvent::up(alt),
                KeyEvent::up(ctrl),
            ]
        );
    }

    #[test]
    fn test_multi_key_list_is_not_a_chord_target() {
        let mut f = Fixture::new(Platform::Linux);
        let keys = vec!["a".to_string(), "b".to_string()];
        let err = f
            .sequencer
            .type_input(keys.into(), Some(&Key::Ctrl.into()), None)
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidShortcut(_)));
        assert!(f.log.entries().is_empty());
    }

    #[test]
    fn test_unresolved_chord_target_still_releases_modifiers() {
        let mut f = Fixture::new(Platform::Linux);
        f.sequencer
            .chord(&[Key::Ctrl], &SymbolicKey::Name("XF86NoSuchKey".to_string()))
            .unwrap();

        let ctrl = f.code("Control_L");
        assert_eq!(
            f.log.key_events(),
            vec![KeyEvent::down(ctrl), KeyEvent::up(ctrl)]
        );
    }

    #[test]
    fn test_backend_error_releases_held_modifiers() {
        let log = EventLog::new();
        let backend = RecordingBackend::new(log.clone()).failing_on("x");
        let (ctrl, alt) = (
            backend.code("Control_L").unwrap(),
            backend.code("Alt_L").unwrap(),
        );
        let mut sequencer = KeySequencer::with_sleeper(
            InputInjector::new(backend),
            Arc::new(ConfigManager::with_config(UserConfig::default()).unwrap()),
            Platform::Linux,
            RecordingSleeper::new(log.clone()),
        );

        let err = sequencer.chord(&[Key::Ctrl, Key::Alt], &'x'.into()).unwrap_err();

        assert!(matches!(err, InputError::BackendFailed(_)));
        assert_eq!(
            log.key_events(),
            vec![
                KeyEvent::down(ctrl),
                KeyEvent::down(alt),
                KeyEvent::up(alt),
                KeyEvent::up(ctrl),
            ]
        );
    }
}
