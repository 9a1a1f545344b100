//! 配置模块

pub mod manager;

pub use manager::{
    ConfigManager, InjectionMethod, InputSettings, TimingSettings, UserConfig,
    DEFAULT_AUTO_WAIT_TIMEOUT, DEFAULT_TYPE_DELAY, DEFAULT_WAIT_SCAN_RATE,
};
