//! # 坐标轴模块
//!
//! 每种坐标轴类型对应一套纯函数：网格边界、显示刻度变换、刻度位置与标签。
//! 所有计算只依赖 (频点数, 采样率, 每八度频点数, 帧移, fmin, fmax)。

use crate::convert::{self, PITCH_CLASSES};
use crate::error::{DisplayError, Result};
use crate::types::AxisKind;

/// 默认采样率
pub const DEFAULT_SR: u32 = 22050;
/// 默认帧移
pub const DEFAULT_HOP_LENGTH: usize = 512;
/// 默认每八度频点数
pub const DEFAULT_BINS_PER_OCTAVE: usize = 12;
/// 默认刻度数量提示
pub const DEFAULT_N_TICKS: usize = 5;

/// 梅尔轴对数区的起点 (Hz)
const MEL_LINTHRESH: f64 = 1000.0;

/// 坐标轴换算参数
#[derive(Debug, Clone, PartialEq)]
pub struct AxisParams {
    /// 采样率
    pub sr: f64,
    /// 帧移
    pub hop_length: usize,
    /// 每八度频点数
    pub bins_per_octave: usize,
    /// 最低频率（CQT 默认 C1，梅尔默认 0）
    pub fmin: Option<f64>,
    /// 最高频率（默认 sr/2）
    pub fmax: Option<f64>,
    /// 刻度数量提示
    pub n_ticks: usize,
}

impl Default for AxisParams {
    fn default() -> Self {
        Self {
            sr: f64::from(DEFAULT_SR),
            hop_length: DEFAULT_HOP_LENGTH,
            bins_per_octave: DEFAULT_BINS_PER_OCTAVE,
            fmin: None,
            fmax: None,
            n_ticks: DEFAULT_N_TICKS,
        }
    }
}

impl AxisParams {
    /// 检查参数对指定坐标轴类型是否有效
    pub fn validate(&self, kind: AxisKind) -> Result<()> {
        if !(self.sr.is_finite() && self.sr > 0.0) {
            return Err(DisplayError::InvalidArgument(format!(
                "采样率必须为正数: {}",
                self.sr
            )));
        }
        if self.hop_length == 0 {
            return Err(DisplayError::InvalidArgument("帧移必须大于0".to_string()));
        }
        if self.bins_per_octave == 0 {
            return Err(DisplayError::InvalidArgument(
                "每八度频点数必须大于0".to_string(),
            ));
        }
        if matches!(kind, AxisKind::CqtNote | AxisKind::CqtHz) {
            if let Some(fmin) = self.fmin {
                if !(fmin > 0.0) {
                    return Err(DisplayError::InvalidArgument(format!(
                        "CQT 最低频率必须为正数: {fmin}"
                    )));
                }
            }
        }
        if kind == AxisKind::Mel && self.mel_fmax() <= self.mel_fmin() {
            return Err(DisplayError::InvalidArgument(format!(
                "梅尔频率范围无效: {} .. {}",
                self.mel_fmin(),
                self.mel_fmax()
            )));
        }
        Ok(())
    }

    fn nyquist(&self) -> f64 {
        self.sr / 2.0
    }

    fn mel_fmin(&self) -> f64 {
        self.fmin.unwrap_or(0.0)
    }

    fn mel_fmax(&self) -> f64 {
        self.fmax.unwrap_or_else(|| self.nyquist())
    }

    fn cqt_fmin(&self) -> f64 {
        self.fmin.unwrap_or_else(convert::c1_hz)
    }
}

/// 显示刻度变换
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// 线性
    Linear,
    /// 以 2 为底的对数
    Log2,
    /// 以 2 为底的对称对数：`linthresh` 以内线性，以外对数
    SymLog {
        /// 线性区阈值
        linthresh: f64,
        /// 线性区在显示坐标中的宽度
        linscale: f64,
    },
}

impl Scale {
    /// 物理值转换为显示坐标
    pub fn forward(self, v: f64) -> f64 {
        match self {
            Scale::Linear => v,
            Scale::Log2 => v.log2(),
            Scale::SymLog {
                linthresh,
                linscale,
            } => {
                if v.abs() <= linthresh {
                    linscale * v / linthresh
                } else {
                    v.signum() * (linscale + (v.abs() / linthresh).log2())
                }
            }
        }
    }
}

/// 刻度
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// 显示坐标
    pub position: f64,
    /// 物理值
    pub value: f64,
    /// 标签
    pub label: String,
}

/// 坐标轴布局：一次渲染中某个坐标轴的全部几何信息
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    /// 坐标轴类型
    pub kind: AxisKind,
    /// 该方向上的频点/帧数
    pub n: usize,
    /// 网格边界（物理值），长度 n + 1
    pub edges: Vec<f64>,
    /// 网格边界（显示坐标）
    pub display_edges: Vec<f64>,
    /// 显示刻度变换
    pub scale: Scale,
    /// 刻度
    pub ticks: Vec<Tick>,
    /// 坐标轴标题
    pub title: &'static str,
}

impl AxisLayout {
    /// 显示坐标范围
    pub fn range(&self) -> (f64, f64) {
        let first = self.display_edges.first().copied().unwrap_or(0.0);
        let last = self.display_edges.last().copied().unwrap_or(1.0);
        if last > first {
            (first, last)
        } else {
            (first, first + 1.0)
        }
    }

    /// 刻度位置
    pub fn tick_positions(&self) -> Vec<f64> {
        self.ticks.iter().map(|t| t.position).collect()
    }

    /// 查找指定显示坐标上的刻度标签
    pub fn label_for(&self, position: f64) -> String {
        self.ticks
            .iter()
            .find(|t| (t.position - position).abs() <= 1e-9 * t.position.abs().max(1.0))
            .map(|t| t.label.clone())
            .unwrap_or_default()
    }

    /// 刻度标签列表
    pub fn labels(&self) -> Vec<&str> {
        self.ticks.iter().map(|t| t.label.as_str()).collect()
    }
}

impl AxisKind {
    /// 显示刻度变换
    pub fn scale(self) -> Scale {
        match self {
            AxisKind::Log => Scale::SymLog {
                linthresh: convert::c2_hz(),
                linscale: 0.5,
            },
            AxisKind::Mel => Scale::SymLog {
                linthresh: MEL_LINTHRESH,
                linscale: 1.0,
            },
            AxisKind::CqtNote | AxisKind::CqtHz => Scale::Log2,
            _ => Scale::Linear,
        }
    }

    /// 坐标轴标题
    pub fn title(self) -> &'static str {
        match self {
            AxisKind::Plain => "",
            AxisKind::Linear | AxisKind::Log | AxisKind::CqtHz | AxisKind::Mel => "Hz",
            AxisKind::Time => "Time",
            AxisKind::Frames => "Frames",
            AxisKind::Lag => "Lag",
            AxisKind::CqtNote => "Note",
            AxisKind::Chroma => "Pitch class",
        }
    }

    /// 网格边界（物理值），长度为 n + 1
    pub fn edges(self, n: usize, params: &AxisParams) -> Vec<f64> {
        match self {
            AxisKind::Plain | AxisKind::Frames => (0..=n).map(|k| k as f64).collect(),
            AxisKind::Linear | AxisKind::Log => fft_edges(n, params.sr),
            AxisKind::Time | AxisKind::Lag => (0..=n)
                .map(|k| convert::frames_to_time(k as f64, params.sr, params.hop_length))
                .collect(),
            AxisKind::CqtNote | AxisKind::CqtHz => {
                let bpo = params.bins_per_octave;
                let fmin = params.cqt_fmin() * 2f64.powf(-0.5 / bpo as f64);
                convert::cqt_frequencies(n + 1, fmin, bpo)
            }
            AxisKind::Chroma => {
                let width = 12.0 / params.bins_per_octave as f64;
                (0..=n).map(|k| (k as f64 - 0.5) * width).collect()
            }
            AxisKind::Mel => mel_edges(n, params.mel_fmin(), params.mel_fmax()),
        }
    }

    /// 计算刻度
    pub fn ticks(self, edges: &[f64], params: &AxisParams) -> Vec<Tick> {
        let (lo, hi) = match (edges.first(), edges.last()) {
            (Some(&lo), Some(&hi)) if hi > lo => (lo, hi),
            _ => return Vec::new(),
        };
        let scale = self.scale();
        let n_ticks = params.n_ticks.max(1);
        let tick = |value: f64, label: String| Tick {
            position: scale.forward(value),
            value,
            label,
        };

        match self {
            AxisKind::Plain => Vec::new(),
            AxisKind::Frames => nice_ticks(lo, hi, n_ticks, 1.0)
                .into_iter()
                .map(|v| tick(v, format!("{}", v.round() as i64)))
                .collect(),
            AxisKind::Linear => nice_ticks(lo, hi, n_ticks, 0.0)
                .into_iter()
                .map(|v| tick(v, format_hz(v)))
                .collect(),
            AxisKind::Time => {
                let step = time_step((hi - lo) / n_ticks as f64, hi - lo);
                multiples(lo, hi, step)
                    .into_iter()
                    .map(|v| tick(v, format_time(v, hi - lo)))
                    .collect()
            }
            AxisKind::Lag => lag_ticks(hi, n_ticks)
                .into_iter()
                .map(|(v, label)| tick(v, label))
                .collect(),
            AxisKind::Log | AxisKind::Mel => {
                let mut candidates = vec![0.0];
                candidates.extend((0..=30).map(|k| f64::from(1u32 << k)));
                let kept = thin(&candidates, lo, hi, scale, n_ticks);
                kept.into_iter().map(|v| tick(v, format_hz(v))).collect()
            }
            AxisKind::CqtNote | AxisKind::CqtHz => {
                let mut midis: Vec<f64> = (0..=11).map(|k| 12.0 * k as f64).collect();
                let visible = midis
                    .iter()
                    .filter(|&&m| in_range(convert::midi_to_hz(m), lo, hi))
                    .count();
                if visible < 2 {
                    // 可见的 C 不足两个时改用所有自然音
                    midis = (0..=132)
                        .filter(|m| [0, 2, 4, 5, 7, 9, 11].contains(&(m % 12)))
                        .map(f64::from)
                        .collect();
                }
                let freqs: Vec<f64> = midis.into_iter().map(convert::midi_to_hz).collect();
                thin(&freqs, lo, hi, scale, n_ticks * 2)
                    .into_iter()
                    .map(|hz| {
                        let label = if self == AxisKind::CqtNote {
                            convert::hz_to_note(hz, true)
                        } else {
                            format_hz(hz)
                        };
                        tick(hz, label)
                    })
                    .collect()
            }
            AxisKind::Chroma => {
                let first = lo.ceil() as i64;
                let last = hi.floor() as i64;
                (first..=last)
                    .filter(|&p| in_range(p as f64, lo, hi))
                    .map(|p| {
                        let label = PITCH_CLASSES[p.rem_euclid(12) as usize].to_string();
                        tick(p as f64, label)
                    })
                    .collect()
            }
        }
    }

    /// 计算完整的坐标轴布局
    pub fn layout(self, n: usize, params: &AxisParams) -> AxisLayout {
        let scale = self.scale();
        let edges = self.edges(n, params);
        let display_edges = edges.iter().map(|&e| scale.forward(e)).collect();
        let ticks = self.ticks(&edges, params);

        tracing::debug!(
            axis = %self,
            n,
            ticks = ticks.len(),
            "坐标轴布局完成"
        );

        AxisLayout {
            kind: self,
            n,
            edges,
            display_edges,
            scale,
            ticks,
            title: self.title(),
        }
    }
}

/// FFT 频点网格边界：中心频率下移半个频点，首个边界截断到 0，末尾补 Nyquist
fn fft_edges(n: usize, sr: f64) -> Vec<f64> {
    if n < 2 {
        return (0..=n).map(|k| k as f64 * sr / 2.0).collect();
    }
    let centers = convert::fft_frequencies(sr, 2 * (n - 1));
    let half = 0.5 * (centers[1] - centers[0]);
    let mut edges: Vec<f64> = centers.iter().map(|c| (c - half).max(0.0)).collect();
    edges.push(centers[n - 1]);
    edges
}

/// 梅尔频点网格边界：中心频率在梅尔刻度上下移半个频点，截断于 0，末尾补 fmax
fn mel_edges(n: usize, fmin: f64, fmax: f64) -> Vec<f64> {
    if n == 0 {
        return vec![fmin];
    }
    let mel_lo = convert::hz_to_mel(fmin, false);
    let mel_hi = convert::hz_to_mel(fmax, false);
    let step = (mel_hi - mel_lo) / n.saturating_sub(1).max(1) as f64;

    let mut edges: Vec<f64> = convert::mel_frequencies(n, fmin, fmax, false)
        .iter()
        .map(|&c| convert::mel_to_hz(convert::hz_to_mel(c, false) - 0.5 * step, false).max(0.0))
        .collect();
    edges.push(fmax);
    edges
}

fn in_range(v: f64, lo: f64, hi: f64) -> bool {
    let eps = 1e-9 * (hi - lo).abs().max(1.0);
    v >= lo - eps && v <= hi + eps
}

/// 不小于 `raw` 的 1/2/2.5/5 × 10^k 步长
pub fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let exponent = raw.log10().floor();
    let base = 10f64.powi(exponent as i32);
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * base)
        .find(|&step| step >= raw * (1.0 - 1e-12))
        .unwrap_or(10.0 * base)
}

/// 区间内的整齐刻度值，最多约 `max_ticks` + 1 个
pub fn nice_ticks(lo: f64, hi: f64, max_ticks: usize, min_step: f64) -> Vec<f64> {
    if !(hi > lo) || max_ticks == 0 {
        return Vec::new();
    }
    let step = nice_step((hi - lo) / max_ticks as f64).max(min_step);
    multiples(lo, hi, step)
}

fn multiples(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

// 超过一分钟时按整秒/分钟取步长
const TIME_STEPS: [f64; 14] = [
    1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 30.0, 60.0, 120.0, 300.0, 600.0, 900.0, 1800.0, 3600.0,
];

fn time_step(raw: f64, span: f64) -> f64 {
    if span <= 60.0 {
        return nice_step(raw);
    }
    TIME_STEPS
        .iter()
        .copied()
        .find(|&s| s >= raw)
        .unwrap_or_else(|| (raw / 3600.0).ceil() * 3600.0)
}

/// 滞后轴刻度：前半段为正滞后，后半段标注为负滞后
fn lag_ticks(t_max: f64, n_ticks: usize) -> Vec<(f64, String)> {
    let half = t_max / 2.0;
    let per_side = (n_ticks / 2).max(1);
    let step = time_step(half / per_side as f64, half);

    let mut ticks: Vec<(f64, String)> = multiples(0.0, half, step)
        .into_iter()
        .filter(|&v| v < half)
        .map(|v| (v, format_time(v, half)))
        .collect();

    let mut k = 1.0;
    while t_max - k * step >= half - 1e-9 * t_max.max(1.0) {
        let lag = k * step;
        ticks.push((t_max - lag, format!("-{}", format_time(lag, half))));
        k += 1.0;
    }

    ticks.sort_by(|a, b| a.0.total_cmp(&b.0));
    ticks
}

/// 按显示距离稀疏化候选刻度，保证相邻刻度不过密
fn thin(candidates: &[f64], lo: f64, hi: f64, scale: Scale, max_ticks: usize) -> Vec<f64> {
    let span = scale.forward(hi) - scale.forward(lo);
    let min_gap = span / (2 * max_ticks.max(1)) as f64;

    let mut kept: Vec<f64> = Vec::new();
    for &v in candidates.iter().filter(|&&v| in_range(v, lo, hi)) {
        let pos = scale.forward(v);
        match kept.last() {
            Some(&prev) if pos - scale.forward(prev) < min_gap => {}
            _ => kept.push(v),
        }
    }
    kept
}

/// 去掉多余的小数位，如 1.50 → "1.5"，2.00 → "2"
pub fn trim_float(v: f64, decimals: usize) -> String {
    let s = format!("{v:.decimals$}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

/// 频率标签
pub fn format_hz(hz: f64) -> String {
    if hz.abs() < 100.0 {
        trim_float(hz, 1)
    } else {
        format!("{hz:.0}")
    }
}

/// 时间标签，格式由整个坐标轴的跨度决定
pub fn format_time(seconds: f64, span: f64) -> String {
    let total = seconds.abs().round() as u64;
    let sign = if seconds < 0.0 { "-" } else { "" };
    if span > 3600.0 {
        format!(
            "{sign}{}:{:02}:{:02}",
            total / 3600,
            (total / 60) % 60,
            total % 60
        )
    } else if span > 60.0 {
        format!("{sign}{}:{:02}", total / 60, total % 60)
    } else {
        trim_float(seconds, 2)
    }
}
