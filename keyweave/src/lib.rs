//! keyweave 核心库
//!
//! 虚拟键盘输入注入：按键序列、修饰键组合与基于剪贴板的粘贴

mod error;
pub mod modules;

use anyhow::Result;
use modules::config::ConfigManager;
use modules::input::{
    Clipboard, EventLog, InputBackend, InputSession, MemoryClipboard, RecordingBackend,
    RecordingSleeper, TextInputRequest,
};
use std::sync::Arc;

pub use error::{AppError, ConfigError, ErrorCode, InputError};

pub(crate) const APP_DIR: &str = "keyweave";

/// 演练模式的环境变量：设置后只记录事件，不接触真实显示服务器
const DRY_RUN_ENV: &str = "KEYWEAVE_DRY_RUN";

/// 初始化日志，可重复调用
pub fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt;
    if fmt().try_init().is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
    Ok(())
}

/// 把命令行参数作为文本注入到当前焦点窗口
pub fn run() -> Result<()> {
    init_logging()?;

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(APP_DIR);
    let config = Arc::new(ConfigManager::new(config_dir));
    if let Err(e) = config.load().map_err(AppError::from) {
        tracing::error!("Configuration error [{}]: {}", e.code(), e);
        return Err(e.into());
    }

    let text = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        tracing::warn!("Nothing to inject");
        return Ok(());
    }
    let request = TextInputRequest::new(text);

    if std::env::var_os(DRY_RUN_ENV).is_some() {
        let log = EventLog::new();
        let session = InputSession::with_sleeper(
            RecordingBackend::new(log.clone()),
            MemoryClipboard::new(log.clone()),
            config,
            modules::input::Platform::current(),
            RecordingSleeper::new(log.clone()),
        );
        inject(session, &request)?;
        for entry in log.entries() {
            tracing::info!("{:?}", entry);
        }
        return Ok(());
    }

    inject(InputSession::system(config)?, &request)
}

fn inject<B: InputBackend, C: Clipboard>(
    mut session: InputSession<B, C>,
    request: &TextInputRequest,
) -> Result<()> {
    if let Err(e) = session.inject(request).map_err(AppError::from) {
        tracing::error!(
            "Injection failed [{}] (recoverable: {}): {}",
            e.code(),
            e.is_recoverable(),
            e
        );
        return Err(e.into());
    }
    Ok(())
}
