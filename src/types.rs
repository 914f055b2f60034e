//! # 数据类型定义模块
//!
//! 定义了频谱图显示中使用的数据结构：坐标轴类型、输入矩阵和渲染报告。

use crate::colormap::Colormap;
use crate::compare::BaselineStatus;
use crate::error::{DisplayError, Result};
use crate::utils::string_utils;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex32;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 解析失败时错误信息中保留的原始内容长度
const RAW_DATA_PREVIEW: usize = 80;

/// 坐标轴语义类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    /// 原始索引，不显示刻度
    #[default]
    #[serde(rename = "none")]
    Plain,
    /// 线性频率 (Hz)
    Linear,
    /// 对数频率 (Hz)
    Log,
    /// 时间 (秒)
    Time,
    /// 帧索引
    Frames,
    /// 滞后时间（正负对称）
    Lag,
    /// CQT 频率，以音名标注
    CqtNote,
    /// CQT 频率，以 Hz 标注
    CqtHz,
    /// 音级 (pitch class)
    Chroma,
    /// 梅尔频率
    Mel,
}

impl AxisKind {
    /// 所有支持的坐标轴类型
    pub const ALL: [AxisKind; 10] = [
        AxisKind::Plain,
        AxisKind::Linear,
        AxisKind::Log,
        AxisKind::Time,
        AxisKind::Frames,
        AxisKind::Lag,
        AxisKind::CqtNote,
        AxisKind::CqtHz,
        AxisKind::Chroma,
        AxisKind::Mel,
    ];

    /// 坐标轴类型名称
    pub fn name(self) -> &'static str {
        match self {
            AxisKind::Plain => "none",
            AxisKind::Linear => "linear",
            AxisKind::Log => "log",
            AxisKind::Time => "time",
            AxisKind::Frames => "frames",
            AxisKind::Lag => "lag",
            AxisKind::CqtNote => "cqt_note",
            AxisKind::CqtHz => "cqt_hz",
            AxisKind::Chroma => "chroma",
            AxisKind::Mel => "mel",
        }
    }

    /// 按指定坐标轴解析名称，错误中会带上坐标轴信息
    pub fn parse_for(name: &str, side: AxisSide) -> Result<Self> {
        name.parse::<AxisKind>().map_err(|_| DisplayError::UnknownAxis {
            side: Some(side),
            value: name.to_string(),
        })
    }

    /// 解析可选的坐标轴名称，`None` 表示使用原始索引
    pub fn parse_optional(name: Option<&str>, side: AxisSide) -> Result<Self> {
        match name {
            Some(name) => Self::parse_for(name, side),
            None => Ok(AxisKind::Plain),
        }
    }
}

impl FromStr for AxisKind {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self> {
        AxisKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| DisplayError::UnknownAxis {
                side: None,
                value: s.to_string(),
            })
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 图像的两个坐标轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSide {
    /// 水平轴（矩阵的列）
    X,
    /// 垂直轴（矩阵的行）
    Y,
}

impl fmt::Display for AxisSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisSide::X => f.write_str("x_axis"),
            AxisSide::Y => f.write_str("y_axis"),
        }
    }
}

/// 借用的频谱矩阵视图，形状为 (频点数, 帧数)
#[derive(Debug, Clone)]
pub enum SpecData<'a> {
    /// 实数矩阵
    Real(ArrayView2<'a, f32>),
    /// 复数矩阵，显示前取模
    Complex(ArrayView2<'a, Complex32>),
    /// 布尔掩码
    Mask(ArrayView2<'a, bool>),
}

impl SpecData<'_> {
    /// 矩阵形状 (行数, 列数)
    pub fn shape(&self) -> (usize, usize) {
        match self {
            SpecData::Real(a) => a.dim(),
            SpecData::Complex(a) => a.dim(),
            SpecData::Mask(a) => a.dim(),
        }
    }

    /// 是否为复数输入
    pub fn is_complex(&self) -> bool {
        matches!(self, SpecData::Complex(_))
    }

    /// 是否为布尔掩码
    pub fn is_mask(&self) -> bool {
        matches!(self, SpecData::Mask(_))
    }

    /// 转换为用于着色的实数矩阵
    ///
    /// 复数取模，布尔值映射为 0/1，实数原样复制。
    pub fn magnitude(&self) -> Array2<f32> {
        match self {
            SpecData::Real(a) => a.to_owned(),
            SpecData::Complex(a) => a.mapv(|z| z.norm()),
            SpecData::Mask(a) => a.mapv(|b| if b { 1.0 } else { 0.0 }),
        }
    }
}

impl<'a> From<&'a Array2<f32>> for SpecData<'a> {
    fn from(a: &'a Array2<f32>) -> Self {
        SpecData::Real(a.view())
    }
}

impl<'a> From<ArrayView2<'a, f32>> for SpecData<'a> {
    fn from(a: ArrayView2<'a, f32>) -> Self {
        SpecData::Real(a)
    }
}

impl<'a> From<&'a Array2<Complex32>> for SpecData<'a> {
    fn from(a: &'a Array2<Complex32>) -> Self {
        SpecData::Complex(a.view())
    }
}

impl<'a> From<ArrayView2<'a, Complex32>> for SpecData<'a> {
    fn from(a: ArrayView2<'a, Complex32>) -> Self {
        SpecData::Complex(a)
    }
}

impl<'a> From<&'a Array2<bool>> for SpecData<'a> {
    fn from(a: &'a Array2<bool>) -> Self {
        SpecData::Mask(a.view())
    }
}

/// 拥有所有权的频谱矩阵
#[derive(Debug, Clone, PartialEq)]
pub enum Matrix {
    /// 实数矩阵
    Real(Array2<f32>),
    /// 复数矩阵
    Complex(Array2<Complex32>),
    /// 布尔掩码
    Mask(Array2<bool>),
}

impl Matrix {
    /// 获取借用视图
    pub fn view(&self) -> SpecData<'_> {
        match self {
            Matrix::Real(a) => SpecData::Real(a.view()),
            Matrix::Complex(a) => SpecData::Complex(a.view()),
            Matrix::Mask(a) => SpecData::Mask(a.view()),
        }
    }

    /// 矩阵形状 (行数, 列数)
    pub fn shape(&self) -> (usize, usize) {
        self.view().shape()
    }
}

/// 矩阵 JSON 文件格式
///
/// `data` 为实部（或实数矩阵），`imag` 存在时组成复数矩阵，
/// `mask` 为真时将非零值视为 `true`。其余字段覆盖渲染参数。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatrixFile {
    /// 按行存储的矩阵数据
    pub data: Vec<Vec<f32>>,

    /// 虚部
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imag: Option<Vec<Vec<f32>>>,

    /// 是否为布尔掩码
    #[serde(default)]
    pub mask: bool,

    /// 采样率
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sr: Option<u32>,

    /// 帧移
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop_length: Option<usize>,

    /// 每八度频点数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bins_per_octave: Option<usize>,

    /// 水平轴类型名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,

    /// 垂直轴类型名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<String>,
}

impl MatrixFile {
    /// 从实数矩阵构造
    pub fn from_real(a: &Array2<f32>) -> Self {
        Self {
            data: rows_of(a),
            ..Self::default()
        }
    }

    /// 从复数矩阵构造
    pub fn from_complex(a: &Array2<Complex32>) -> Self {
        Self {
            data: rows_of(&a.mapv(|z| z.re)),
            imag: Some(rows_of(&a.mapv(|z| z.im))),
            ..Self::default()
        }
    }

    /// 从文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| DisplayError::ParseError {
            message: format!("矩阵文件 JSON 解析错误: {e}"),
            raw_data: Some(string_utils::truncate_string(content.trim(), RAW_DATA_PREVIEW)),
        })
    }

    /// 保存到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 转换为矩阵，检查每行长度一致
    pub fn to_matrix(&self) -> Result<Matrix> {
        let real = to_array(&self.data, "data")?;

        if let Some(imag) = &self.imag {
            let imag = to_array(imag, "imag")?;
            if imag.dim() != real.dim() {
                return Err(DisplayError::Shape(format!(
                    "实部形状 {:?} 与虚部形状 {:?} 不一致",
                    real.dim(),
                    imag.dim()
                )));
            }
            let complex = ndarray::Zip::from(&real)
                .and(&imag)
                .map_collect(|&re, &im| Complex32::new(re, im));
            return Ok(Matrix::Complex(complex));
        }

        if self.mask {
            return Ok(Matrix::Mask(real.mapv(|v| v != 0.0)));
        }

        Ok(Matrix::Real(real))
    }
}

fn rows_of(a: &Array2<f32>) -> Vec<Vec<f32>> {
    a.rows().into_iter().map(|row| row.to_vec()).collect()
}

fn to_array(rows: &[Vec<f32>], field: &str) -> Result<Array2<f32>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).unwrap_or(0);

    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(DisplayError::Shape(format!(
            "{field} 第 {i} 行长度为 {}, 期望 {n_cols}",
            row.len()
        )));
    }

    let flat: Vec<f32> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| DisplayError::Shape(format!("{field}: {e}")))
}

/// 单个文件的渲染报告
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    /// 输入矩阵文件路径
    pub file_path: String,

    /// 输出 PNG 路径
    pub output_path: String,

    /// 矩阵行数
    pub n_rows: usize,

    /// 矩阵列数
    pub n_cols: usize,

    /// 水平轴类型
    pub x_axis: AxisKind,

    /// 垂直轴类型
    pub y_axis: AxisKind,

    /// 使用的颜色映射
    pub colormap: Colormap,

    /// 基准图比较结果
    pub baseline: Option<BaselineStatus>,

    /// 处理时间（毫秒）
    pub processing_time_ms: u64,
}

impl RenderReport {
    /// 获取输入文件名（不含路径）
    pub fn filename(&self) -> String {
        PathBuf::from(&self.file_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("未知文件")
            .to_string()
    }

    /// 基准图比较是否未失败
    pub fn is_ok(&self) -> bool {
        !matches!(self.baseline, Some(BaselineStatus::Failed { .. }))
    }
}
