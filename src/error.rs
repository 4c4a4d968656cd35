use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 无法识别的处理模式
    #[error("未知的处理模式: {0}")]
    UnknownMode(String),

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 图片不存在
    #[error("图片不存在: {0}")]
    ItemNotFound(String),

    /// 图片尚未处理完成，无法下载
    #[error("图片尚未处理完成: {0}")]
    ItemNotDone(String),

    /// 结果不是合法的 data URL
    #[error("无法解析图片数据: {0}")]
    InvalidImageData(String),
}

/// 图片编辑服务的错误
///
/// `Display` 的内容会直接作为图片的错误提示展示给用户
#[derive(Debug, Error)]
pub enum EditError {
    /// 网络请求失败
    #[error("{0}")]
    RequestFailed(String),

    /// 服务返回非 2xx 状态码
    #[error("Request failed with status {status}: {message}")]
    BadStatus { status: u16, message: String },

    /// 没有返回任何候选结果
    #[error("No candidates returned from Gemini")]
    NoCandidates,

    /// 候选结果中没有图片
    #[error("No image data found in Gemini response")]
    NoImageData,

    /// 响应体无法解析
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    /// 其他错误（服务自身给出的描述）
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for EditError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EditError::InvalidBody(err.to_string())
        } else {
            EditError::RequestFailed(err.to_string())
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
