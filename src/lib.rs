//! # 频谱图显示库
//!
//! 将时频矩阵（STFT、CQT、色度、梅尔谱等）绘制为带语义坐标轴的图像，
//! 并提供与基准图的像素级比较。
//!
//! ## 主要功能
//!
//! - **坐标轴分派**: 每个坐标轴独立选择类型，决定网格坐标、刻度与标签
//! - **显式绘图区域**: 所有绘制都在调用方传入的区域上完成，没有全局图像状态
//! - **基准图比较**: RMS 差异比较，失败时输出期望图与差异图
//! - **批量渲染**: 利用 Rayon 并行渲染矩阵 JSON 文件
//!
//! ## 架构设计
//!
//! - `types`: 坐标轴类型与矩阵数据
//! - `convert`: 频率、时间与音名换算
//! - `axis`: 各坐标轴类型的网格、刻度与标签
//! - `colormap`: 颜色映射与自动选择
//! - `display`: `specshow` 与颜色条
//! - `figure`: 像素缓冲区与 PNG 编解码
//! - `compare`: 图像比较与基准图管理
//! - `renderer`: 批量渲染
//! - `config`: 配置管理
//! - `utils`: 通用工具函数
//! - `error`: 错误处理

pub mod axis;
pub mod colormap;
pub mod compare;
pub mod config;
pub mod convert;
pub mod display;
pub mod error;
pub mod figure;
pub mod renderer;
pub mod types;
pub mod utils;

// 重新导出主要的公共API
pub use axis::{AxisLayout, AxisParams, Scale, Tick};
pub use colormap::Colormap;
pub use compare::{assert_baseline, check_baseline, BaselineSettings, BaselineStatus};
pub use config::DisplayConfig;
pub use display::{colorbar, specshow, SpecImage, SpecShowOptions};
pub use error::{DisplayError, Result};
pub use figure::Figure;
pub use renderer::SpecRenderer;
pub use types::{AxisKind, AxisSide, Matrix, MatrixFile, RenderReport, SpecData};

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 支持的坐标轴类型名称
pub const AXIS_NAMES: &[&str] = &[
    "none", "linear", "log", "time", "frames", "lag", "cqt_note", "cqt_hz", "chroma", "mel",
];
