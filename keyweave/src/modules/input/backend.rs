//! 输入后端
//!
//! 后端负责把按键码真正发送到显示服务器。`EnigoBackend` 使用 enigo 库
//! 进行键盘输入模拟。

use super::keys::KeyCatalog;
use crate::error::InputError;
use auto_impl::auto_impl;
use enigo::{Direction, Enigo, Keyboard, Mouse, Settings};
use std::collections::HashMap;

/// 后端分配的不透明按键码
pub type KeyCode = u32;

/// 按键方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyDirection {
    Down,
    Up,
}

/// 发送给后端的单个按键事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub direction: KeyDirection,
}

impl KeyEvent {
    pub fn down(code: KeyCode) -> Self {
        Self { code, direction: KeyDirection::Down }
    }

    pub fn up(code: KeyCode) -> Self {
        Self { code, direction: KeyDirection::Up }
    }
}

/// 输入后端能力
#[auto_impl(&mut, Box)]
pub trait InputBackend {
    /// 发送一个原始按键事件
    fn send_key_event(&mut self, code: KeyCode, direction: KeyDirection) -> Result<(), InputError>;

    /// 同步屏障，保证之前的事件已经送达
    fn sync(&mut self) -> Result<(), InputError>;

    /// 按 keysym 名称查询按键码，未知名称返回 `None`
    fn keycode_for_symbol(&mut self, name: &str) -> Option<KeyCode>;

    /// 校验调用方直接给出的原始按键码，后端不支持时返回 `None`
    fn raw_keycode(&self, code: KeyCode) -> Option<KeyCode> {
        Some(code)
    }

    /// 屏幕尺寸 (宽, 高)
    fn screen_dimensions(&self) -> Result<(u32, u32), InputError>;
}

/// 驻留按键码的起始值，低于它的按键码按原始扫描码发送
const INTERNED_BASE: KeyCode = 0x1_0000;

/// enigo 输入后端
///
/// enigo 以 `enigo::Key` 描述按键而不是数值按键码，这里把解析过的按键
/// 驻留在表中，以表下标加 `INTERNED_BASE` 作为按键码返回给调用方。
#[derive(Debug)]
pub struct EnigoBackend {
    enigo: Enigo,
    keys: Vec<enigo::Key>,
    codes: HashMap<String, KeyCode>,
}

impl EnigoBackend {
    /// 连接到当前显示服务器
    pub fn new() -> Result<Self, InputError> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            tracing::warn!(
                "Failed to create Enigo instance: {:?}. Keyboard injection disabled.",
                e
            );
            InputError::PermissionDenied(format!("Keyboard injection not available: {e}"))
        })?;
        tracing::info!("Keyboard injector initialized successfully");
        Ok(Self {
            enigo,
            keys: Vec::new(),
            codes: HashMap::new(),
        })
    }

    fn enigo_key(name: &str) -> Option<enigo::Key> {
        use enigo::Key;

        let key = match name {
            "Shift_L" | "Shift_R" => Key::Shift,
            "Control_L" | "Control_R" => Key::Control,
            "Alt_L" | "Alt_R" => Key::Alt,
            "Super_L" | "Super_R" | "Meta_L" | "Meta_R" => Key::Meta,
            "Return" => Key::Return,
            "Tab" => Key::Tab,
            "space" => Key::Space,
            "BackSpace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Escape" => Key::Escape,
            "Home" => Key::Home,
            "End" => Key::End,
            "Prior" => Key::PageUp,
            "Next" => Key::PageDown,
            "Up" => Key::UpArrow,
            "Down" => Key::DownArrow,
            "Left" => Key::LeftArrow,
            "Right" => Key::RightArrow,
            "Caps_Lock" => Key::CapsLock,
            "F1" => Key::F1,
            "F2" => Key::F2,
            "F3" => Key::F3,
            "F4" => Key::F4,
            "F5" => Key::F5,
            "F6" => Key::F6,
            "F7" => Key::F7,
            "F8" => Key::F8,
            "F9" => Key::F9,
            "F10" => Key::F10,
            "F11" => Key::F11,
            "F12" => Key::F12,
            other => Key::Unicode(KeyCatalog::char_for_symbol(other)?),
        };
        Some(key)
    }

    /// 原始扫描码只占 16 位，更大的值会与驻留按键码冲突
    fn raw_scancode(code: KeyCode) -> Option<KeyCode> {
        if code < INTERNED_BASE {
            Some(code)
        } else {
            tracing::warn!("Raw keycode {} is out of range, ignored", code);
            None
        }
    }

    fn direction(direction: KeyDirection) -> Direction {
        match direction {
            KeyDirection::Down => Direction::Press,
            KeyDirection::Up => Direction::Release,
        }
    }
}

impl InputBackend for EnigoBackend {
    fn send_key_event(&mut self, code: KeyCode, direction: KeyDirection) -> Result<(), InputError> {
        let dir = Self::direction(direction);
        if code < INTERNED_BASE {
            let raw = u16::try_from(code)
                .map_err(|_| InputError::BackendFailed(format!("Invalid raw keycode {code}")))?;
            return self
                .enigo
                .raw(raw, dir)
                .map_err(|e| InputError::BackendFailed(e.to_string()));
        }

        let key = self
            .keys
            .get((code - INTERNED_BASE) as usize)
            .copied()
            .ok_or_else(|| InputError::BackendFailed(format!("Unknown keycode {code}")))?;
        self.enigo
            .key(key, dir)
            .map_err(|e| InputError::BackendFailed(e.to_string()))
    }

    fn sync(&mut self) -> Result<(), InputError> {
        // enigo 在每次事件后已经刷新连接
        Ok(())
    }

    fn keycode_for_symbol(&mut self, name: &str) -> Option<KeyCode> {
        if let Some(code) = self.codes.get(name) {
            return Some(*code);
        }
        let key = Self::enigo_key(name)?;
        let code = INTERNED_BASE + self.keys.len() as KeyCode;
        self.keys.push(key);
        self.codes.insert(name.to_string(), code);
        Some(code)
    }

    fn raw_keycode(&self, code: KeyCode) -> Option<KeyCode> {
        Self::raw_scancode(code)
    }

    fn screen_dimensions(&self) -> Result<(u32, u32), InputError> {
        let (width, height) = self
            .enigo
            .main_display()
            .map_err(|e| InputError::BackendFailed(e.to_string()))?;
        let width = u32::try_from(width)
            .map_err(|_| InputError::BackendFailed(format!("Invalid screen width {width}")))?;
        let height = u32::try_from(height)
            .map_err(|_| InputError::BackendFailed(format!("Invalid screen height {height}")))?;
        Ok((width, height))
    }
}
