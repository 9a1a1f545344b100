//! 输入模块
//!
//! 提供键盘模拟、修饰键组合和剪贴板粘贴功能

pub mod backend;
pub mod clipboard;
pub mod injector;
pub mod keys;
pub mod modifiers;
pub mod platform;
pub mod recording;
pub mod sequencer;
pub mod session;
pub mod shortcut;

pub use backend::{EnigoBackend, InputBackend, KeyCode, KeyDirection, KeyEvent};
pub use clipboard::{ArboardClipboard, Clipboard, ClipboardPasteCoordinator, ClipboardStagingState};
pub use injector::{InputInjector, KeyOutcome};
pub use keys::{Key, KeyCatalog, SymbolicKey};
pub use modifiers::{ModifierResolver, ModifierSpec};
pub use platform::Platform;
pub use recording::{EventLog, MemoryClipboard, RecordingBackend, RecordingSleeper, Trace};
pub use sequencer::{KeySequencer, Sleeper, ThreadSleeper, TypeInput, DEFAULT_KEY_SHORTCUT_DELAY};
pub use session::{InputSession, SharedSession, TextInputRequest};
pub use shortcut::Shortcut;
pub use crate::error::InputError;
