//! 配置管理器

use crate::error::ConfigError;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// 默认字符间隔 (秒)
pub const DEFAULT_TYPE_DELAY: f64 = 0.0;
/// 默认剪贴板轮询频率 (次/秒)
pub const DEFAULT_WAIT_SCAN_RATE: f64 = 3.0;
/// 默认最长等待时间 (秒)
pub const DEFAULT_AUTO_WAIT_TIMEOUT: f64 = 3.0;

/// 文本注入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InjectionMethod {
    /// 逐字符模拟按键
    Keyboard,
    /// 写入剪贴板后粘贴
    Clipboard,
    /// 根据文本内容自动选择
    #[default]
    Auto,
}

/// 时间设置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// 输入文本时每个字符之间的间隔 (秒)
    pub type_delay: f64,
    /// 剪贴板轮询频率 (次/秒)
    pub wait_scan_rate: f64,
    /// 等待剪贴板同步的最长时间 (秒)
    pub auto_wait_timeout: f64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            type_delay: DEFAULT_TYPE_DELAY,
            wait_scan_rate: DEFAULT_WAIT_SCAN_RATE,
            auto_wait_timeout: DEFAULT_AUTO_WAIT_TIMEOUT,
        }
    }
}

impl TimingSettings {
    /// 剪贴板轮询间隔
    ///
    /// 无法表示为 `Duration` 的频率 (未经校验的配置) 返回零间隔
    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.wait_scan_rate).unwrap_or_default()
    }

    /// 剪贴板最多轮询次数，向零截断
    pub fn max_attempts(&self) -> u32 {
        (self.auto_wait_timeout * self.wait_scan_rate) as u32
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.wait_scan_rate.is_finite() || self.wait_scan_rate <= 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "wait_scan_rate must be a positive number, got {}",
                self.wait_scan_rate
            )));
        }
        if Duration::try_from_secs_f64(1.0 / self.wait_scan_rate).is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "wait_scan_rate {} gives a poll interval that is too long",
                self.wait_scan_rate
            )));
        }
        validate_seconds("auto_wait_timeout", self.auto_wait_timeout)?;
        validate_seconds("type_delay", self.type_delay)
    }
}

fn validate_seconds(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::ValidationFailed(format!(
            "{name} must be a non-negative number of seconds, got {value}"
        )));
    }
    Ok(())
}

/// 输入设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InputSettings {
    pub injection_method: InjectionMethod,
}

/// 用户配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserConfig {
    pub timing: TimingSettings,
    pub input: InputSettings,
}

impl UserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()
    }
}

/// 配置管理器
///
/// 持有当前配置快照，所有读取都在调用时进行，不做缓存。
#[derive(Debug)]
pub struct ConfigManager {
    config: ArcSwap<UserConfig>,
    config_path: PathBuf,
    /// 单次生效的字符间隔覆盖值，下一次输入分派后清除
    type_delay_override: parking_lot::Mutex<Option<f64>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::APP_DIR);
        Self::new(config_dir)
    }
}

impl ConfigManager {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_path = config_dir.join("config.toml");
        let config = ArcSwap::new(Arc::new(UserConfig::default()));
        Self {
            config,
            config_path,
            type_delay_override: parking_lot::Mutex::new(None),
        }
    }

    /// 使用给定配置创建，不访问文件系统
    pub fn with_config(config: UserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let manager = Self::default();
        manager.config.store(Arc::new(config));
        Ok(manager)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 从磁盘加载配置并设为当前配置，文件不存在时使用默认值
    pub fn load(&self) -> Result<UserConfig, ConfigError> {
        if !self.config_path.exists() {
            tracing::debug!("No config at {}, using defaults", self.config_path.display());
            return Ok(UserConfig::default());
        }
        let content = std::fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        let config: UserConfig =
            toml::from_str(&content).map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        self.config.store(Arc::new(config.clone()));
        tracing::info!("Loaded config from {}", self.config_path.display());
        Ok(config)
    }

    pub fn save(&self, config: &UserConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let content =
            toml::to_string(config).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }
        std::fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        self.config.store(Arc::new(config.clone()));
        Ok(())
    }

    pub fn current(&self) -> Arc<UserConfig> {
        self.config.load_full()
    }

    pub fn update<F>(&self, f: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut UserConfig),
    {
        let mut config = (*self.current()).clone();
        f(&mut config);
        self.save(&config)
    }

    /// 当前时间设置
    pub fn timing(&self) -> TimingSettings {
        self.config.load().timing
    }

    /// 覆盖下一次输入使用的字符间隔
    pub fn override_type_delay(&self, seconds: f64) -> Result<(), ConfigError> {
        validate_seconds("type_delay", seconds)?;
        *self.type_delay_override.lock() = Some(seconds);
        Ok(())
    }

    /// 生效的字符间隔：覆盖值优先，否则为配置值
    pub fn type_delay(&self) -> f64 {
        let override_delay = *self.type_delay_override.lock();
        override_delay.unwrap_or_else(|| self.config.load().timing.type_delay)
    }

    /// 清除覆盖值，恢复配置中的字符间隔
    pub fn reset_type_delay(&self) {
        if let Some(previous) = self.type_delay_override.lock().take() {
            tracing::debug!("Type delay override {}s reset to default", previous);
        }
    }
}
