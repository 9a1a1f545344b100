//! keyweave 错误类型定义
//!
//! 所有模块的错误类型统一在此定义，使用 thiserror 自动派生 Error trait

use thiserror::Error;

/// 应用统一错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入相关错误
    #[error(transparent)]
    Input(#[from] InputError),

    /// 配置相关错误
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// 错误代码（用于日志与调用方判断）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InputPermissionDenied,
    InputBackendFailed,
    InputModifierOutOfRange,
    InputClipboardFailed,
    InputPasteFailed,
    InputInvalidShortcut,

    ConfigLoadFailed,
    ConfigSaveFailed,
    ConfigValidationFailed,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InputPermissionDenied => write!(f, "INPUT_PERMISSION_DENIED"),
            ErrorCode::InputBackendFailed => write!(f, "INPUT_BACKEND_FAILED"),
            ErrorCode::InputModifierOutOfRange => write!(f, "INPUT_MODIFIER_OUT_OF_RANGE"),
            ErrorCode::InputClipboardFailed => write!(f, "INPUT_CLIPBOARD_FAILED"),
            ErrorCode::InputPasteFailed => write!(f, "INPUT_PASTE_FAILED"),
            ErrorCode::InputInvalidShortcut => write!(f, "INPUT_INVALID_SHORTCUT"),
            ErrorCode::ConfigLoadFailed => write!(f, "CONFIG_LOAD_FAILED"),
            ErrorCode::ConfigSaveFailed => write!(f, "CONFIG_SAVE_FAILED"),
            ErrorCode::ConfigValidationFailed => write!(f, "CONFIG_VALIDATION_FAILED"),
        }
    }
}

/// 输入相关错误
///
/// 未解析的按键不在此列：它们以 `KeyOutcome::Unresolved` 的形式返回，而不是错误。
#[derive(Debug, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Input backend failed: {0}")]
    BackendFailed(String),

    /// 组合键中的修饰键数量只支持 1 或 2 个
    #[error("Modifier combination out of supported range: {0} active modifiers")]
    ModifierOutOfRange(usize),

    #[error("Clipboard operation failed: {0}")]
    ClipboardFailed(String),

    /// 剪贴板在超时前没有同步到暂存文本
    #[error("Paste method failed.")]
    PasteFailed,

    #[error("Invalid shortcut format: {0}")]
    InvalidShortcut(String),
}

/// 配置相关错误
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

impl AppError {
    /// 获取对应的错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Input(e) => match e {
                InputError::PermissionDenied(_) => ErrorCode::InputPermissionDenied,
                InputError::BackendFailed(_) => ErrorCode::InputBackendFailed,
                InputError::ModifierOutOfRange(_) => ErrorCode::InputModifierOutOfRange,
                InputError::ClipboardFailed(_) => ErrorCode::InputClipboardFailed,
                InputError::PasteFailed => ErrorCode::InputPasteFailed,
                InputError::InvalidShortcut(_) => ErrorCode::InputInvalidShortcut,
            },
            AppError::Config(e) => match e {
                ConfigError::LoadFailed(_) => ErrorCode::ConfigLoadFailed,
                ConfigError::SaveFailed(_) => ErrorCode::ConfigSaveFailed,
                ConfigError::ValidationFailed(_) => ErrorCode::ConfigValidationFailed,
            },
        }
    }

    /// 检查是否为可恢复错误
    ///
    /// 剪贴板同步超时与剪贴板读写失败可以由调用方重试
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Input(InputError::PasteFailed)
                | AppError::Input(InputError::ClipboardFailed(_))
        )
    }
}
