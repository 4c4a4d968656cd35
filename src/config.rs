use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::ToolMode;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 本次运行的处理模式
    pub mode: ToolMode,
    /// 待处理图片所在目录
    pub input_folder: String,
    /// 处理结果导出目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 处理失败的图片记录文件
    pub failure_log_file: String,
    // --- Gemini 配置 ---
    pub gemini_api_key: String,
    pub gemini_api_base_url: String,
    pub gemini_model_name: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ToolMode::Logo,
            input_folder: "input_images".to_string(),
            output_folder: "cleaned_images".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            failure_log_file: "failed.txt".to_string(),
            gemini_api_key: String::new(),
            gemini_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_model_name: "gemini-2.5-flash-image".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// TOML 配置文件中的可选字段，存在的字段覆盖默认值
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    mode: Option<ToolMode>,
    input_folder: Option<String>,
    output_folder: Option<String>,
    verbose_logging: Option<bool>,
    output_log_file: Option<String>,
    failure_log_file: Option<String>,
    gemini_api_key: Option<String>,
    gemini_api_base_url: Option<String>,
    gemini_model_name: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果设置了 `CONFIG_FILE`，先读取该 TOML 文件，再用环境变量覆盖
    pub fn from_env() -> AppResult<Self> {
        let base = match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        let file: FileConfig =
            toml::from_str(content).map_err(|source| AppError::TomlParseFailed {
                path: origin.to_string(),
                source,
            })?;

        let default = Self::default();
        Ok(Self {
            mode: file.mode.unwrap_or(default.mode),
            input_folder: file.input_folder.unwrap_or(default.input_folder),
            output_folder: file.output_folder.unwrap_or(default.output_folder),
            verbose_logging: file.verbose_logging.unwrap_or(default.verbose_logging),
            output_log_file: file.output_log_file.unwrap_or(default.output_log_file),
            failure_log_file: file.failure_log_file.unwrap_or(default.failure_log_file),
            gemini_api_key: file.gemini_api_key.unwrap_or(default.gemini_api_key),
            gemini_api_base_url: file
                .gemini_api_base_url
                .unwrap_or(default.gemini_api_base_url),
            gemini_model_name: file.gemini_model_name.unwrap_or(default.gemini_model_name),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(default.request_timeout_secs),
        })
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        Ok(Self {
            mode: match std::env::var("TOOL_MODE") {
                Ok(v) => v.parse()?,
                Err(_) => self.mode,
            },
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(self.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(self.output_folder),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            failure_log_file: std::env::var("FAILURE_LOG_FILE").unwrap_or(self.failure_log_file),
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .unwrap_or(self.gemini_api_key),
            gemini_api_base_url: std::env::var("GEMINI_API_BASE_URL")
                .unwrap_or(self.gemini_api_base_url),
            gemini_model_name: std::env::var("GEMINI_MODEL_NAME").unwrap_or(self.gemini_model_name),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
        })
    }
}

/// 读取并解析环境变量，未设置时返回 `None`
fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
