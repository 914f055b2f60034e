//! # 颜色映射模块
//!
//! 提供分段线性颜色映射，以及根据数据分布自动选择颜色映射。

use crate::error::{DisplayError, Result};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

type Stop = (f32, [u8; 3]);

const MAGMA: &[Stop] = &[
    (0.0, [0, 0, 4]),
    (0.125, [28, 16, 68]),
    (0.25, [79, 18, 123]),
    (0.375, [129, 37, 129]),
    (0.5, [181, 54, 122]),
    (0.625, [229, 80, 100]),
    (0.75, [251, 135, 97]),
    (0.875, [254, 194, 135]),
    (1.0, [252, 253, 191]),
];

const COOLWARM: &[Stop] = &[
    (0.0, [59, 76, 192]),
    (0.25, [124, 159, 249]),
    (0.5, [221, 221, 221]),
    (0.75, [246, 154, 123]),
    (1.0, [180, 4, 38]),
];

const VIRIDIS: &[Stop] = &[
    (0.0, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.5, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.0, [253, 231, 37]),
];

const GRAY_R: &[Stop] = &[(0.0, [255, 255, 255]), (1.0, [0, 0, 0])];

/// 颜色映射
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colormap {
    /// 顺序型，用于非负数据
    Magma,
    /// 发散型，用于有正有负的数据
    Coolwarm,
    /// 反转灰度，用于布尔数据
    GrayR,
    /// 顺序型
    Viridis,
}

impl Colormap {
    fn stops(self) -> &'static [Stop] {
        match self {
            Colormap::Magma => MAGMA,
            Colormap::Coolwarm => COOLWARM,
            Colormap::GrayR => GRAY_R,
            Colormap::Viridis => VIRIDIS,
        }
    }

    /// 颜色映射名称
    pub fn name(self) -> &'static str {
        match self {
            Colormap::Magma => "magma",
            Colormap::Coolwarm => "coolwarm",
            Colormap::GrayR => "gray_r",
            Colormap::Viridis => "viridis",
        }
    }

    /// 将 [0, 1] 内的值映射为颜色，超出范围时截断
    pub fn rgb(self, t: f32) -> [u8; 3] {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let upper = stops
            .iter()
            .position(|(pos, _)| *pos >= t)
            .unwrap_or(stops.len() - 1);
        if upper == 0 {
            return stops[0].1;
        }

        let (p0, c0) = stops[upper - 1];
        let (p1, c1) = stops[upper];
        let w = (t - p0) / (p1 - p0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * w).round() as u8;
        [mix(c0[0], c1[0]), mix(c0[1], c1[1]), mix(c0[2], c1[2])]
    }

    /// 将数据值按 [vmin, vmax] 归一化后映射为 plotters 颜色
    pub fn color(self, value: f32, vmin: f32, vmax: f32) -> RGBColor {
        let span = vmax - vmin;
        let t = if span > 0.0 { (value - vmin) / span } else { 0.5 };
        let [r, g, b] = self.rgb(t);
        RGBColor(r, g, b)
    }

    /// 根据数据自动选择颜色映射
    ///
    /// 布尔数据使用 `gray_r`；否则取有限值的第 2/98 百分位（`robust` 为假时取最小/最大值），
    /// 同号时使用 `magma`，跨越零点时使用 `coolwarm`。
    pub fn auto(values: &[f32], is_mask: bool, robust: bool) -> Colormap {
        if is_mask {
            return Colormap::GrayR;
        }

        let mut finite: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Colormap::Magma;
        }
        finite.sort_by(f32::total_cmp);

        let (min_p, max_p) = if robust { (2.0, 98.0) } else { (0.0, 100.0) };
        let min_val = percentile_sorted(&finite, min_p);
        let max_val = percentile_sorted(&finite, max_p);

        if min_val >= 0.0 || max_val <= 0.0 {
            Colormap::Magma
        } else {
            Colormap::Coolwarm
        }
    }
}

/// 已排序数据的线性插值百分位数
pub fn percentile_sorted(sorted: &[f32], p: f64) -> f32 {
    if sorted.is_empty() {
        return f32::NAN;
    }
    let pos = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = (pos - lo as f64) as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// 有限值的最小值与最大值
pub fn finite_range(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

impl FromStr for Colormap {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "magma" => Ok(Colormap::Magma),
            "coolwarm" => Ok(Colormap::Coolwarm),
            "gray_r" => Ok(Colormap::GrayR),
            "viridis" => Ok(Colormap::Viridis),
            other => Err(DisplayError::InvalidArgument(format!(
                "未知的颜色映射: {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
