//! # 配置管理模块
//!
//! 管理频谱图渲染的配置选项和参数设置。

use crate::axis::{DEFAULT_BINS_PER_OCTAVE, DEFAULT_HOP_LENGTH, DEFAULT_N_TICKS, DEFAULT_SR};
use crate::colormap::Colormap;
use crate::compare::DEFAULT_TOLERANCE;
use crate::error::{DisplayError, Result};
use crate::types::AxisKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 频谱图渲染配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// 采样率
    pub sample_rate: u32,

    /// 帧移
    pub hop_length: usize,

    /// 每八度频点数
    pub bins_per_octave: usize,

    /// 最低频率（None 表示按坐标轴类型取默认值）
    pub fmin: Option<f64>,

    /// 最高频率（None 表示 sr/2）
    pub fmax: Option<f64>,

    /// 默认水平轴类型
    pub x_axis: AxisKind,

    /// 默认垂直轴类型
    pub y_axis: AxisKind,

    /// 水平轴刻度数量提示
    pub n_xticks: usize,

    /// 垂直轴刻度数量提示
    pub n_yticks: usize,

    /// 颜色映射（None 表示自动选择）
    pub colormap: Option<Colormap>,

    /// 自动选择颜色映射时是否忽略两端 2% 的离群值
    pub robust: bool,

    /// 并行处理线程数（None表示使用系统默认）
    pub num_threads: Option<usize>,

    /// 是否启用详细日志
    pub verbose: bool,

    /// 是否启用进度条
    pub show_progress: bool,

    /// 支持的矩阵文件扩展名
    pub supported_extensions: Vec<String>,

    /// 图像输出配置
    pub figure: FigureConfig,

    /// 基准图比较配置
    pub compare: CompareConfig,
}

/// 图像输出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// 图像宽度（像素）
    pub width: u32,

    /// 图像高度（像素）
    pub height: u32,

    /// 是否绘制颜色条
    pub show_colorbar: bool,

    /// 输出目录
    pub output_dir: Option<PathBuf>,
}

/// 基准图比较配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// 基准图目录（None 表示不比较）
    pub baseline_dir: Option<PathBuf>,

    /// 比较结果目录
    pub result_dir: Option<PathBuf>,

    /// RMS 容差
    pub tolerance: f64,

    /// 基准图不存在时是否生成
    pub generate_missing: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SR,
            hop_length: DEFAULT_HOP_LENGTH,
            bins_per_octave: DEFAULT_BINS_PER_OCTAVE,
            fmin: None,
            fmax: None,
            x_axis: AxisKind::Plain,
            y_axis: AxisKind::Plain,
            n_xticks: DEFAULT_N_TICKS,
            n_yticks: DEFAULT_N_TICKS,
            colormap: None,
            robust: true,
            num_threads: None,
            verbose: false,
            show_progress: true,
            supported_extensions: vec!["json".to_string()],
            figure: FigureConfig::default(),
            compare: CompareConfig::default(),
        }
    }
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            show_colorbar: true,
            output_dir: None,
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            baseline_dir: None,
            result_dir: None,
            tolerance: DEFAULT_TOLERANCE,
            generate_missing: false,
        }
    }
}

impl DisplayConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DisplayConfig = toml::from_str(&content)
            .map_err(|e| DisplayError::ConfigError(format!("配置文件解析错误: {e}")))?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DisplayError::ConfigError(format!("配置序列化错误: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.supported_extensions.is_empty() {
            return Err(DisplayError::ConfigError(
                "支持的文件扩展名列表不能为空".to_string(),
            ));
        }

        if let Some(threads) = self.num_threads {
            if threads == 0 {
                return Err(DisplayError::ConfigError("线程数必须大于0".to_string()));
            }
        }

        if self.sample_rate == 0 {
            return Err(DisplayError::ConfigError("采样率必须大于0".to_string()));
        }

        if self.hop_length == 0 || self.bins_per_octave == 0 {
            return Err(DisplayError::ConfigError(
                "帧移和每八度频点数必须大于0".to_string(),
            ));
        }

        if let (Some(fmin), Some(fmax)) = (self.fmin, self.fmax) {
            if fmin >= fmax {
                return Err(DisplayError::ConfigError(format!(
                    "频率范围不合理: fmin {fmin} 应小于 fmax {fmax}"
                )));
            }
        }

        if self.figure.width == 0 || self.figure.height == 0 {
            return Err(DisplayError::ConfigError("图像尺寸必须大于0".to_string()));
        }

        if !(self.compare.tolerance >= 0.0) {
            return Err(DisplayError::ConfigError(format!(
                "比较容差不能为负数: {}",
                self.compare.tolerance
            )));
        }

        Ok(())
    }

    /// 检查文件扩展名是否支持
    pub fn is_supported_extension(&self, extension: &str) -> bool {
        self.supported_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// 获取有效的线程数
    pub fn effective_thread_count(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get)
    }
}

/// 从环境变量或默认值创建配置
pub fn create_default_config() -> DisplayConfig {
    let mut config = DisplayConfig::default();

    if let Ok(threads) = std::env::var("SPECSHOW_THREADS") {
        if let Ok(num) = threads.parse::<usize>() {
            config.num_threads = Some(num);
        }
    }

    if let Ok(verbose) = std::env::var("SPECSHOW_VERBOSE") {
        config.verbose = verbose.eq_ignore_ascii_case("true") || verbose == "1";
    }

    if let Ok(sr) = std::env::var("SPECSHOW_SR") {
        if let Ok(sr) = sr.parse::<u32>() {
            config.sample_rate = sr;
        }
    }

    config
}
