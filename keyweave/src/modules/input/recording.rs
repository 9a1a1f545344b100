//! 记录型后端
//!
//! 不接触真实显示服务器与系统剪贴板，把所有按键、同步、等待和剪贴板访问按顺序
//! 写入同一个 `EventLog`。用于演练 (dry run) 与测试。

use super::backend::{InputBackend, KeyCode, KeyDirection, KeyEvent};
use super::clipboard::Clipboard;
use super::keys::{Key, KeyCatalog, SymbolicKey};
use super::sequencer::Sleeper;
use crate::error::InputError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// 日志条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trace {
    Key(KeyEvent),
    Sync,
    Sleep(Duration),
    ClipboardSet(String),
    ClipboardGet(String),
}

/// 共享的有序事件日志
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<parking_lot::Mutex<Vec<Trace>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, trace: Trace) {
        self.entries.lock().push(trace);
    }

    pub fn entries(&self) -> Vec<Trace> {
        self.entries.lock().clone()
    }

    /// 只保留按键事件
    pub fn key_events(&self) -> Vec<KeyEvent> {
        self.entries
            .lock()
            .iter()
            .filter_map(|t| match t {
                Trace::Key(event) => Some(*event),
                _ => None,
            })
            .collect()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.entries
            .lock()
            .iter()
            .filter_map(|t| match t {
                Trace::Sleep(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// 剪贴板读取次数
    pub fn clipboard_reads(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|t| matches!(t, Trace::ClipboardGet(_)))
            .count()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// 第一个分配的按键码，与 X11 最小按键码一致
const FIRST_KEYCODE: KeyCode = 8;

/// 记录型输入后端
///
/// 认识所有具名按键与可打印 ASCII 字符，其余名称视为未知。
/// `failing_on` 可让某个按键码的按下事件失败。
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    log: EventLog,
    keymap: HashMap<String, KeyCode>,
    screen: (u32, u32),
    fail_down: Option<KeyCode>,
}

impl RecordingBackend {
    pub fn new(log: EventLog) -> Self {
        let mut backend = Self {
            log,
            keymap: HashMap::new(),
            screen: (1920, 1080),
            fail_down: None,
        };
        for key in Key::ALL {
            backend.define(key.keysym());
        }
        for c in (' '..='~').map(SymbolicKey::Char) {
            if let Some(name) = KeyCatalog::symbol_name(&c) {
                backend.define(&name);
            }
        }
        backend
    }

    fn define(&mut self, name: &str) {
        let next = FIRST_KEYCODE + self.keymap.len() as KeyCode;
        self.keymap.entry(name.to_string()).or_insert(next);
    }

    /// 增加一个可解析的名称
    pub fn with_symbol(mut self, name: &str, code: KeyCode) -> Self {
        self.keymap.insert(name.to_string(), code);
        self
    }

    pub fn with_screen(mut self, width: u32, height: u32) -> Self {
        self.screen = (width, height);
        self
    }

    /// 按下 `name` 时返回 `InputError::BackendFailed`，事件不写入日志
    pub fn failing_on(mut self, name: &str) -> Self {
        self.fail_down = self.code(name);
        self
    }

    /// 按 keysym 名称查询已分配的按键码
    pub fn code(&self, name: &str) -> Option<KeyCode> {
        self.keymap.get(name).copied()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }
}

impl InputBackend for RecordingBackend {
    fn send_key_event(&mut self, code: KeyCode, direction: KeyDirection) -> Result<(), InputError> {
        if direction == KeyDirection::Down && self.fail_down == Some(code) {
            return Err(InputError::BackendFailed(format!("key {code} rejected")));
        }
        self.log.push(Trace::Key(KeyEvent { code, direction }));
        Ok(())
    }

    fn sync(&mut self) -> Result<(), InputError> {
        self.log.push(Trace::Sync);
        Ok(())
    }

    fn keycode_for_symbol(&mut self, name: &str) -> Option<KeyCode> {
        self.code(name)
    }

    fn screen_dimensions(&self) -> Result<(u32, u32), InputError> {
        Ok(self.screen)
    }
}

/// 只记录不等待的 `Sleeper`
#[derive(Debug, Clone)]
pub struct RecordingSleeper {
    log: EventLog,
}

impl RecordingSleeper {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.log.push(Trace::Sleep(duration));
    }
}

/// 内存剪贴板
///
/// 可以模拟写入后读回延迟：`lagging(n)` 在每次写入后的前 `n` 次读取仍返回旧内容，
/// `never_converges()` 永远读不到新内容。
#[derive(Debug, Clone)]
pub struct MemoryClipboard {
    log: EventLog,
    visible: String,
    staged: String,
    /// `None` 表示永不同步
    lag: Option<u32>,
    pending_reads: u32,
}

impl MemoryClipboard {
    pub fn new(log: EventLog) -> Self {
        Self::lagging(log, 0)
    }

    pub fn lagging(log: EventLog, reads: u32) -> Self {
        Self {
            log,
            visible: String::new(),
            staged: String::new(),
            lag: Some(reads),
            pending_reads: 0,
        }
    }

    pub fn never_converges(log: EventLog) -> Self {
        Self {
            lag: None,
            ..Self::new(log)
        }
    }

    /// 当前对读取方可见的内容
    pub fn contents(&self) -> &str {
        &self.visible
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), InputError> {
        self.log.push(Trace::ClipboardSet(text.to_string()));
        self.staged = text.to_string();
        match self.lag {
            Some(0) => self.visible = self.staged.clone(),
            Some(reads) => self.pending_reads = reads,
            None => {}
        }
        Ok(())
    }

    fn get_text(&mut self) -> Result<String, InputError> {
        if self.visible != self.staged && self.lag.is_some() {
            if self.pending_reads == 0 {
                self.visible = self.staged.clone();
            } else {
                self.pending_reads -= 1;
            }
        }
        self.log.push(Trace::ClipboardGet(self.visible.clone()));
        Ok(self.visible.clone())
    }
}
