//! # 错误处理模块
//!
//! 定义了频谱图显示库中使用的所有错误类型和错误处理机制。

use crate::types::AxisSide;
use std::fmt;

/// 频谱图显示库的结果类型
pub type Result<T> = std::result::Result<T, DisplayError>;

/// 频谱图显示错误类型
#[derive(Debug)]
pub enum DisplayError {
    /// I/O 错误
    Io(std::io::Error),

    /// 未知的坐标轴类型
    UnknownAxis {
        /// 出错的坐标轴（解析独立字符串时为空）
        side: Option<AxisSide>,
        /// 传入的坐标轴名称
        value: String,
    },

    /// 参数无效
    InvalidArgument(String),

    /// 矩阵形状错误
    Shape(String),

    /// 绘图后端错误
    Render(String),

    /// PNG 编解码错误
    Image(String),

    /// 图像尺寸不一致
    ImageSizeMismatch {
        /// 实际图像尺寸
        actual: (u32, u32),
        /// 期望图像尺寸
        expected: (u32, u32),
    },

    /// 图像与基准图不一致
    ImageMismatch {
        /// 基准图名称
        name: String,
        /// 均方根差异
        rms: f64,
        /// 容差
        tol: f64,
    },

    /// 基准图不存在
    BaselineMissing(String),

    /// 数据解析错误
    ParseError {
        /// 错误描述
        message: String,
        /// 原始数据
        raw_data: Option<String>,
    },

    /// 配置错误
    ConfigError(String),

    /// 其他错误
    Other(String),
}

impl DisplayError {
    /// 是否属于参数无效类错误
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            DisplayError::UnknownAxis { .. } | DisplayError::InvalidArgument(_)
        )
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Io(err) => write!(f, "I/O 错误: {err}"),
            DisplayError::UnknownAxis { side, value } => {
                write!(f, "未知的坐标轴类型: {value:?}")?;
                if let Some(side) = side {
                    write!(f, " ({side})")?;
                }
                Ok(())
            }
            DisplayError::InvalidArgument(msg) => write!(f, "参数无效: {msg}"),
            DisplayError::Shape(msg) => write!(f, "矩阵形状错误: {msg}"),
            DisplayError::Render(msg) => write!(f, "绘图错误: {msg}"),
            DisplayError::Image(msg) => write!(f, "图像编解码错误: {msg}"),
            DisplayError::ImageSizeMismatch { actual, expected } => write!(
                f,
                "图像尺寸不一致: 实际 {}x{}, 期望 {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            DisplayError::ImageMismatch { name, rms, tol } => {
                write!(f, "图像与基准图 {name} 不一致: RMS {rms:.3} > 容差 {tol}")
            }
            DisplayError::BaselineMissing(path) => write!(f, "基准图不存在: {path}"),
            DisplayError::ParseError { message, raw_data } => {
                write!(f, "数据解析错误: {message}")?;
                if let Some(data) = raw_data {
                    write!(f, "\n原始数据: {data}")?;
                }
                Ok(())
            }
            DisplayError::ConfigError(msg) => write!(f, "配置错误: {msg}"),
            DisplayError::Other(msg) => write!(f, "错误: {msg}"),
        }
    }
}

impl std::error::Error for DisplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DisplayError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        DisplayError::Io(err)
    }
}

impl From<serde_json::Error> for DisplayError {
    fn from(err: serde_json::Error) -> Self {
        DisplayError::ParseError {
            message: format!("JSON 解析错误: {err}"),
            raw_data: None,
        }
    }
}

impl From<png::DecodingError> for DisplayError {
    fn from(err: png::DecodingError) -> Self {
        DisplayError::Image(format!("PNG 解码失败: {err}"))
    }
}

impl From<png::EncodingError> for DisplayError {
    fn from(err: png::EncodingError) -> Self {
        DisplayError::Image(format!("PNG 编码失败: {err}"))
    }
}

/// 将绘图后端的错误转换为 `DisplayError::Render`
pub(crate) fn render_err<E: fmt::Display>(err: E) -> DisplayError {
    DisplayError::Render(err.to_string())
}

/// 便捷的错误创建宏
#[macro_export]
macro_rules! display_error {
    ($kind:ident, $msg:expr) => {
        $crate::error::DisplayError::$kind($msg.to_string())
    };
    ($kind:ident, $msg:expr, $($arg:tt)*) => {
        $crate::error::DisplayError::$kind(format!($msg, $($arg)*))
    };
}
