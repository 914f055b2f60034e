//! # 图像比较模块
//!
//! 以逐通道均方根差异比较渲染结果与基准图，并管理基准图目录。
//!
//! 比较流程：
//! - 渲染结果写入结果目录 `<name>.png`
//! - 基准图存在时计算 RMS，超过容差则额外写出 `<name>-expected.png`
//!   与 `<name>-failed-diff.png`
//! - 基准图不存在时按设置生成，或返回 `BaselineMissing`

use crate::config::CompareConfig;
use crate::error::{DisplayError, Result};
use crate::figure::Figure;
use crate::utils::fs_utils;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 默认比较容差
pub const DEFAULT_TOLERANCE: f64 = 13.0;

/// 差异图的放大倍数
const DIFF_GAIN: u16 = 10;

/// 计算两幅图像的均方根差异，取值范围 [0, 255]
pub fn rms_difference(actual: &Figure, expected: &Figure) -> Result<f64> {
    if actual.size() != expected.size() {
        return Err(DisplayError::ImageSizeMismatch {
            actual: actual.size(),
            expected: expected.size(),
        });
    }

    let n = actual.pixels().len();
    let sum_sq: f64 = actual
        .pixels()
        .iter()
        .zip(expected.pixels())
        .map(|(&a, &b)| {
            let d = f64::from(a) - f64::from(b);
            d * d
        })
        .sum();

    Ok((sum_sq / n as f64).sqrt())
}

/// 生成放大后的差异图
pub fn diff_image(actual: &Figure, expected: &Figure) -> Result<Figure> {
    if actual.size() != expected.size() {
        return Err(DisplayError::ImageSizeMismatch {
            actual: actual.size(),
            expected: expected.size(),
        });
    }

    let pixels = actual
        .pixels()
        .iter()
        .zip(expected.pixels())
        .map(|(&a, &b)| (u16::from(a.abs_diff(b)) * DIFF_GAIN).min(255) as u8)
        .collect();

    let (width, height) = actual.size();
    Figure::from_rgb(width, height, pixels)
}

/// 单次比较结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// 均方根差异
    pub rms: f64,
    /// 容差
    pub tol: f64,
    /// 是否在容差之内
    pub passed: bool,
}

/// 比较两幅图像
pub fn compare_images(actual: &Figure, expected: &Figure, tol: f64) -> Result<Comparison> {
    let rms = rms_difference(actual, expected)?;
    Ok(Comparison {
        rms,
        tol,
        passed: rms <= tol,
    })
}

/// 基准图检查结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BaselineStatus {
    /// 在容差之内
    Passed {
        /// 均方根差异
        rms: f64,
    },
    /// 超出容差
    Failed {
        /// 均方根差异
        rms: f64,
        /// 容差
        tol: f64,
    },
    /// 基准图不存在，已生成
    Created,
}

/// 基准图目录设置
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineSettings {
    /// 基准图目录
    pub baseline_dir: PathBuf,
    /// 结果目录，为空时不写出结果图
    pub result_dir: Option<PathBuf>,
    /// 比较容差
    pub tolerance: f64,
    /// 基准图不存在时是否生成
    pub generate_missing: bool,
}

impl BaselineSettings {
    /// 使用默认容差创建
    pub fn new<P: Into<PathBuf>>(baseline_dir: P) -> Self {
        Self {
            baseline_dir: baseline_dir.into(),
            result_dir: None,
            tolerance: DEFAULT_TOLERANCE,
            generate_missing: true,
        }
    }

    /// 从配置创建，未设置基准图目录时返回 `None`
    pub fn from_config(config: &CompareConfig) -> Option<Self> {
        config.baseline_dir.as_ref().map(|dir| Self {
            baseline_dir: dir.clone(),
            result_dir: config.result_dir.clone(),
            tolerance: config.tolerance,
            generate_missing: config.generate_missing,
        })
    }

    pub fn with_result_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.result_dir = Some(dir.into());
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_generate_missing(mut self, generate: bool) -> Self {
        self.generate_missing = generate;
        self
    }

    /// 基准图路径
    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.baseline_dir.join(format!("{name}.png"))
    }
}

fn check_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != "..";
    if valid {
        Ok(())
    } else {
        Err(DisplayError::InvalidArgument(format!(
            "基准图名称无效: {name:?}"
        )))
    }
}

fn write_artifact(dir: &Path, file_name: String, figure: &Figure) -> Result<()> {
    fs_utils::ensure_dir_exists(dir)?;
    figure.save_png(dir.join(file_name))
}

/// 将图像与同名基准图比较
pub fn check_baseline(
    figure: &Figure,
    settings: &BaselineSettings,
    name: &str,
) -> Result<BaselineStatus> {
    check_name(name)?;

    if let Some(dir) = &settings.result_dir {
        write_artifact(dir, format!("{name}.png"), figure)?;
    }

    let baseline_path = settings.baseline_path(name);
    if !baseline_path.exists() {
        if !settings.generate_missing {
            return Err(DisplayError::BaselineMissing(
                baseline_path.display().to_string(),
            ));
        }
        write_artifact(&settings.baseline_dir, format!("{name}.png"), figure)?;
        tracing::info!("已生成基准图: {}", baseline_path.display());
        return Ok(BaselineStatus::Created);
    }

    let expected = Figure::load_png(&baseline_path)?;
    let comparison = compare_images(figure, &expected, settings.tolerance)?;
    if comparison.passed {
        tracing::debug!("基准图 {name} 比较通过: RMS {:.3}", comparison.rms);
        return Ok(BaselineStatus::Passed {
            rms: comparison.rms,
        });
    }

    tracing::warn!(
        "基准图 {name} 比较失败: RMS {:.3} > 容差 {}",
        comparison.rms,
        comparison.tol
    );
    if let Some(dir) = &settings.result_dir {
        write_artifact(dir, format!("{name}-expected.png"), &expected)?;
        write_artifact(
            dir,
            format!("{name}-failed-diff.png"),
            &diff_image(figure, &expected)?,
        )?;
    }

    Ok(BaselineStatus::Failed {
        rms: comparison.rms,
        tol: comparison.tol,
    })
}

/// 与基准图比较，超出容差时返回 `ImageMismatch`
pub fn assert_baseline(
    figure: &Figure,
    settings: &BaselineSettings,
    name: &str,
) -> Result<BaselineStatus> {
    match check_baseline(figure, settings, name)? {
        BaselineStatus::Failed { rms, tol } => Err(DisplayError::ImageMismatch {
            name: name.to_string(),
            rms,
            tol,
        }),
        status => Ok(status),
    }
}
