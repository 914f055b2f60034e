//! # 频谱图显示模块
//!
//! `specshow` 将 (频点 × 帧) 矩阵绘制到调用方提供的绘图区域上，
//! 两个坐标轴各自按 [`AxisKind`] 计算网格、刻度和标签。
//!
//! 绘图区域总是显式传入，不存在全局的"当前图像"状态：
//!
//! ```no_run
//! use specshow::{display::{specshow, SpecShowOptions}, AxisKind, Figure};
//! use ndarray::Array2;
//!
//! let cqt = Array2::<f32>::ones((84, 200));
//! let mut figure = Figure::new(800, 400)?;
//! let options = SpecShowOptions::new().with_y_axis(AxisKind::CqtNote);
//! figure.draw(|root| specshow(root, &cqt, &options))?;
//! figure.save_png("cqt_note.png")?;
//! # Ok::<(), specshow::DisplayError>(())
//! ```

use crate::axis::{nice_ticks, trim_float, AxisLayout, AxisParams, DEFAULT_N_TICKS};
use crate::colormap::{finite_range, Colormap};
use crate::config::DisplayConfig;
use crate::display_error;
use crate::error::{render_err, DisplayError, Result};
use crate::types::{AxisKind, AxisSide, SpecData};

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::Shift;
use plotters::prelude::*;
use rayon::prelude::*;
use std::ops::Range;

/// `specshow` 的参数
#[derive(Debug, Clone, PartialEq)]
pub struct SpecShowOptions {
    /// 水平轴类型（矩阵的列）
    pub x_axis: AxisKind,
    /// 垂直轴类型（矩阵的行）
    pub y_axis: AxisKind,
    /// 单位换算参数
    pub params: AxisParams,
    /// 水平轴刻度数量提示
    pub n_xticks: usize,
    /// 垂直轴刻度数量提示
    pub n_yticks: usize,
    /// 指定颜色映射，`None` 时根据数据自动选择
    pub cmap: Option<Colormap>,
    /// 自动选择颜色映射时是否使用第 2/98 百分位
    pub robust: bool,
    /// 颜色归一化下限
    pub vmin: Option<f32>,
    /// 颜色归一化上限
    pub vmax: Option<f32>,
    /// 图标题
    pub caption: Option<String>,
}

impl Default for SpecShowOptions {
    fn default() -> Self {
        Self {
            x_axis: AxisKind::Plain,
            y_axis: AxisKind::Plain,
            params: AxisParams::default(),
            n_xticks: DEFAULT_N_TICKS,
            n_yticks: DEFAULT_N_TICKS,
            cmap: None,
            robust: true,
            vmin: None,
            vmax: None,
            caption: None,
        }
    }
}

impl SpecShowOptions {
    /// 使用默认参数创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 从配置创建
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            x_axis: config.x_axis,
            y_axis: config.y_axis,
            params: AxisParams {
                sr: f64::from(config.sample_rate),
                hop_length: config.hop_length,
                bins_per_octave: config.bins_per_octave,
                fmin: config.fmin,
                fmax: config.fmax,
                n_ticks: DEFAULT_N_TICKS,
            },
            n_xticks: config.n_xticks,
            n_yticks: config.n_yticks,
            cmap: config.colormap,
            robust: config.robust,
            vmin: None,
            vmax: None,
            caption: None,
        }
    }

    pub fn with_x_axis(mut self, kind: AxisKind) -> Self {
        self.x_axis = kind;
        self
    }

    pub fn with_y_axis(mut self, kind: AxisKind) -> Self {
        self.y_axis = kind;
        self
    }

    /// 按名称设置水平轴，未知名称立即返回错误
    pub fn try_x_axis(self, name: &str) -> Result<Self> {
        Ok(self.with_x_axis(AxisKind::parse_for(name, AxisSide::X)?))
    }

    /// 按名称设置垂直轴，未知名称立即返回错误
    pub fn try_y_axis(self, name: &str) -> Result<Self> {
        Ok(self.with_y_axis(AxisKind::parse_for(name, AxisSide::Y)?))
    }

    pub fn with_sr(mut self, sr: u32) -> Self {
        self.params.sr = f64::from(sr);
        self
    }

    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        self.params.hop_length = hop_length;
        self
    }

    pub fn with_bins_per_octave(mut self, bins_per_octave: usize) -> Self {
        self.params.bins_per_octave = bins_per_octave;
        self
    }

    pub fn with_fmin(mut self, fmin: f64) -> Self {
        self.params.fmin = Some(fmin);
        self
    }

    pub fn with_fmax(mut self, fmax: f64) -> Self {
        self.params.fmax = Some(fmax);
        self
    }

    pub fn with_ticks(mut self, n_xticks: usize, n_yticks: usize) -> Self {
        self.n_xticks = n_xticks;
        self.n_yticks = n_yticks;
        self
    }

    pub fn with_cmap(mut self, cmap: Colormap) -> Self {
        self.cmap = Some(cmap);
        self
    }

    pub fn with_robust(mut self, robust: bool) -> Self {
        self.robust = robust;
        self
    }

    pub fn with_vrange(mut self, vmin: f32, vmax: f32) -> Self {
        self.vmin = Some(vmin);
        self.vmax = Some(vmax);
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// 某个坐标轴的换算参数
    pub fn axis_params(&self, side: AxisSide) -> AxisParams {
        let n_ticks = match side {
            AxisSide::X => self.n_xticks,
            AxisSide::Y => self.n_yticks,
        };
        AxisParams {
            n_ticks,
            ..self.params.clone()
        }
    }

    /// 检查参数有效性，在绘制任何内容之前调用
    pub fn validate(&self) -> Result<()> {
        self.params.validate(self.x_axis)?;
        self.params.validate(self.y_axis)?;
        if let (Some(vmin), Some(vmax)) = (self.vmin, self.vmax) {
            if !(vmin < vmax) {
                return Err(display_error!(
                    InvalidArgument,
                    "颜色范围无效: vmin {} 必须小于 vmax {}",
                    vmin,
                    vmax
                ));
            }
        }
        Ok(())
    }

    /// 用数据范围补全未指定的 vmin/vmax
    ///
    /// 只指定一端时，补全后的范围仍必须满足 vmin < vmax。
    pub fn color_range(&self, data_min: f32, data_max: f32) -> Result<(f32, f32)> {
        let vmin = self.vmin.unwrap_or(data_min);
        let vmax = self.vmax.unwrap_or(data_max);
        let overridden = self.vmin.is_some() || self.vmax.is_some();
        if overridden && !(vmin < vmax) {
            return Err(display_error!(
                InvalidArgument,
                "颜色范围无效: vmin {} 必须小于 vmax {}（数据范围 {} .. {}）",
                vmin,
                vmax,
                data_min,
                data_max
            ));
        }
        Ok((vmin, vmax))
    }
}

/// 渲染结果句柄，可用于进一步装饰（如颜色条）
#[derive(Debug, Clone, PartialEq)]
pub struct SpecImage {
    /// 矩阵形状 (行数, 列数)
    pub shape: (usize, usize),
    /// 水平轴布局
    pub x: AxisLayout,
    /// 垂直轴布局
    pub y: AxisLayout,
    /// 使用的颜色映射
    pub cmap: Colormap,
    /// 颜色归一化下限
    pub vmin: f32,
    /// 颜色归一化上限
    pub vmax: f32,
    /// 输入是否为复数
    pub complex_input: bool,
}

/// 绘制频谱图
///
/// 复数输入自动取模；布尔输入按 0/1 绘制。第 0 行位于底部。
/// 参数错误（包括无效的频率范围）在绘制之前返回，不会留下部分图像。
pub fn specshow<'a, DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    data: impl Into<SpecData<'a>>,
    options: &SpecShowOptions,
) -> Result<SpecImage> {
    let data = data.into();
    let (n_rows, n_cols) = data.shape();
    if n_rows == 0 || n_cols == 0 {
        return Err(display_error!(Shape, "无法显示空矩阵: {} 行 {} 列", n_rows, n_cols));
    }
    options.validate()?;

    if data.is_complex() {
        tracing::warn!("输入为复数矩阵，显示其幅值");
    }

    let x = options
        .x_axis
        .layout(n_cols, &options.axis_params(AxisSide::X));
    let y = options
        .y_axis
        .layout(n_rows, &options.axis_params(AxisSide::Y));
    check_edges(&x, AxisSide::X)?;
    check_edges(&y, AxisSide::Y)?;

    let values: Vec<f32> = data.magnitude().iter().copied().collect();
    let cmap = options
        .cmap
        .unwrap_or_else(|| Colormap::auto(&values, data.is_mask(), options.robust));
    let (data_min, data_max) = finite_range(&values).unwrap_or((0.0, 1.0));
    let (vmin, vmax) = options.color_range(data_min, data_max)?;

    // 非有限值不着色
    let colors: Vec<Option<RGBColor>> = values
        .par_iter()
        .map(|&v| v.is_finite().then(|| cmap.color(v, vmin, vmax)))
        .collect();

    let (x0, x1) = x.range();
    let (y0, y1) = y.range();

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(10)
        .x_label_area_size(label_area(&x, 40))
        .y_label_area_size(label_area(&y, 60));
    if let Some(caption) = &options.caption {
        builder.caption(caption, ("sans-serif", 20));
    }

    let mut chart = builder
        .build_cartesian_2d(
            TickedRange::new(x0, x1, x.tick_positions()),
            TickedRange::new(y0, y1, y.tick_positions()),
        )
        .map_err(render_err)?;

    let cells = (0..n_rows)
        .flat_map(|i| (0..n_cols).map(move |j| (i, j)))
        .filter_map(|(i, j)| {
            colors[i * n_cols + j].map(|color| {
                Rectangle::new(
                    [
                        (x.display_edges[j], y.display_edges[i]),
                        (x.display_edges[j + 1], y.display_edges[i + 1]),
                    ],
                    color.filled(),
                )
            })
        });
    chart.draw_series(cells).map_err(render_err)?;

    let x_formatter = |v: &f64| x.label_for(*v);
    let y_formatter = |v: &f64| y.label_for(*v);
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter);
    if !x.title.is_empty() {
        mesh.x_desc(x.title);
    }
    if !y.title.is_empty() {
        mesh.y_desc(y.title);
    }
    mesh.draw().map_err(render_err)?;

    Ok(SpecImage {
        shape: (n_rows, n_cols),
        x,
        y,
        cmap,
        vmin,
        vmax,
        complex_input: data.is_complex(),
    })
}

/// 为已渲染的频谱图绘制纵向颜色条
pub fn colorbar<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, image: &SpecImage) -> Result<()> {
    const STEPS: usize = 128;

    let lo = f64::from(image.vmin);
    let hi = if image.vmax > image.vmin {
        f64::from(image.vmax)
    } else {
        lo + 1.0
    };
    let ticks = nice_ticks(lo, hi, DEFAULT_N_TICKS, 0.0);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, TickedRange::new(lo, hi, ticks))
        .map_err(render_err)?;

    let span = hi - lo;
    chart
        .draw_series((0..STEPS).map(|k| {
            let a = lo + span * k as f64 / STEPS as f64;
            let b = lo + span * (k + 1) as f64 / STEPS as f64;
            let color = image
                .cmap
                .color((0.5 * (a + b)) as f32, image.vmin, image.vmax);
            Rectangle::new([(0.0, a), (1.0, b)], color.filled())
        }))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_label_formatter(&|v: &f64| trim_float(*v, 2))
        .draw()
        .map_err(render_err)?;

    Ok(())
}

/// 刻度位置固定的连续坐标
///
/// 刻度来自 [`AxisLayout`]，不由绘图库自动生成；标签由调用方的格式化函数给出。
#[derive(Debug, Clone, PartialEq)]
struct TickedRange {
    lo: f64,
    hi: f64,
    ticks: Vec<f64>,
}

impl TickedRange {
    fn new(lo: f64, hi: f64, ticks: Vec<f64>) -> Self {
        Self { lo, hi, ticks }
    }
}

impl Ranged for TickedRange {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let span = self.hi - self.lo;
        let pixels = limit.1 - limit.0;
        if pixels == 0 || span == 0.0 {
            return limit.1;
        }
        let t = (value - self.lo) / span;
        limit.0 + (f64::from(pixels) * t + 1e-3).floor() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.max_num_points() == 0 {
            return Vec::new();
        }
        self.ticks.clone()
    }

    fn range(&self) -> Range<f64> {
        self.lo..self.hi
    }
}

fn label_area(layout: &AxisLayout, size: i32) -> i32 {
    if layout.ticks.is_empty() && layout.title.is_empty() {
        size / 2
    } else {
        size
    }
}

fn check_edges(layout: &AxisLayout, side: AxisSide) -> Result<()> {
    let finite = layout.display_edges.iter().all(|e| e.is_finite());
    let increasing = layout.display_edges.windows(2).all(|w| w[1] > w[0]);
    if finite && increasing {
        Ok(())
    } else {
        Err(DisplayError::InvalidArgument(format!(
            "{side} 的 {} 坐标无法映射到显示刻度",
            layout.kind
        )))
    }
}
