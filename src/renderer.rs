//! # 批量渲染模块
//!
//! 读取矩阵 JSON 文件，按配置渲染为 PNG，可选地与基准图比较。
//! 多个文件通过 rayon 线程池并行处理。

use crate::compare::{check_baseline, BaselineSettings};
use crate::config::DisplayConfig;
use crate::display::{colorbar, specshow, SpecImage, SpecShowOptions};
use crate::error::{DisplayError, Result};
use crate::figure::Figure;
use crate::types::{AxisKind, AxisSide, Matrix, MatrixFile, RenderReport};
use crate::utils::{fs_utils, Timer};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// 颜色条所占的宽度比例
const COLORBAR_FRACTION: f64 = 0.12;

/// 频谱图渲染器
pub struct SpecRenderer {
    /// 配置信息
    config: DisplayConfig,
}

impl SpecRenderer {
    /// 创建新的渲染器实例
    pub fn new(config: DisplayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 使用默认配置创建渲染器
    pub fn with_default_config() -> Result<Self> {
        Self::new(DisplayConfig::default())
    }

    /// 获取配置的引用
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// 合并配置与矩阵文件中的参数
    pub fn options_for(&self, file: &MatrixFile) -> Result<SpecShowOptions> {
        let mut options = SpecShowOptions::from_config(&self.config);

        if let Some(name) = file.x_axis.as_deref() {
            options.x_axis = AxisKind::parse_for(name, AxisSide::X)?;
        }
        if let Some(name) = file.y_axis.as_deref() {
            options.y_axis = AxisKind::parse_for(name, AxisSide::Y)?;
        }
        if let Some(sr) = file.sr {
            options = options.with_sr(sr);
        }
        if let Some(hop_length) = file.hop_length {
            options = options.with_hop_length(hop_length);
        }
        if let Some(bins_per_octave) = file.bins_per_octave {
            options = options.with_bins_per_octave(bins_per_octave);
        }

        Ok(options)
    }

    /// 将矩阵渲染为新图像
    pub fn render_matrix(
        &self,
        matrix: &Matrix,
        options: &SpecShowOptions,
    ) -> Result<(Figure, SpecImage)> {
        let figure_config = &self.config.figure;
        let mut figure = Figure::new(figure_config.width, figure_config.height)?;

        let image = figure.draw(|root| {
            if !figure_config.show_colorbar {
                return specshow(root, matrix.view(), options);
            }
            let split = (f64::from(figure_config.width) * (1.0 - COLORBAR_FRACTION)) as i32;
            let (left, right) = root.split_horizontally(split);
            let image = specshow(&left, matrix.view(), options)?;
            colorbar(&right, &image)?;
            Ok(image)
        })?;

        Ok((figure, image))
    }

    /// 渲染单个矩阵文件，输出 `<文件名>.png`
    pub fn render_file(&self, file_path: &Path, out_dir: &Path) -> Result<RenderReport> {
        let timer = Timer::new("文件渲染");

        let file = MatrixFile::from_file(file_path)?;
        let matrix = file.to_matrix()?;
        let options = self
            .options_for(&file)?
            .with_caption(fs_utils::get_display_name(file_path));

        let (figure, image) = self.render_matrix(&matrix, &options)?;

        let stem = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                DisplayError::InvalidArgument(format!("无效的文件名: {}", file_path.display()))
            })?;

        fs_utils::ensure_dir_exists(out_dir)?;
        let output_path = out_dir.join(format!("{stem}.png"));
        figure.save_png(&output_path)?;

        let baseline = match BaselineSettings::from_config(&self.config.compare) {
            Some(settings) => Some(check_baseline(&figure, &settings, stem)?),
            None => None,
        };

        let (n_rows, n_cols) = image.shape;
        timer.log_elapsed();
        tracing::debug!(
            "{} 渲染完成: {n_rows}x{n_cols}, {} / {}",
            file_path.display(),
            image.x.kind,
            image.y.kind
        );

        Ok(RenderReport {
            file_path: file_path.to_string_lossy().to_string(),
            output_path: output_path.to_string_lossy().to_string(),
            n_rows,
            n_cols,
            x_axis: image.x.kind,
            y_axis: image.y.kind,
            colormap: image.cmap,
            baseline,
            processing_time_ms: timer.stop().as_millis() as u64,
        })
    }

    /// 批量渲染矩阵文件
    ///
    /// 单个文件失败时记录错误并跳过。输出文件与基准图按文件名（不含扩展名）命名，
    /// 两个输入同名时在渲染前返回错误。
    pub fn render_files(&self, file_paths: &[PathBuf], out_dir: &Path) -> Result<Vec<RenderReport>> {
        if file_paths.is_empty() {
            return Ok(Vec::new());
        }
        check_unique_stems(file_paths)?;

        let total_files = file_paths.len();
        let failed_count = AtomicUsize::new(0);
        let timer = Timer::new("批量渲染");

        tracing::info!("开始并行渲染 {total_files} 个文件...");

        let progress = if self.config.show_progress {
            let bar = ProgressBar::new(total_files as u64);
            if let Ok(style) =
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {wide_msg}")
            {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.effective_thread_count())
            .build()
            .map_err(|e| DisplayError::Other(format!("创建线程池失败: {e}")))?;

        let results: Vec<RenderReport> = pool.install(|| {
            file_paths
                .par_iter()
                .filter_map(|path| {
                    progress.set_message(fs_utils::get_display_name(path));
                    let result = self.render_file(path, out_dir);
                    progress.inc(1);

                    match result {
                        Ok(report) => Some(report),
                        Err(e) => {
                            failed_count.fetch_add(1, Ordering::SeqCst);
                            tracing::error!("渲染失败: {}\n └─> 错误详情: {e}", path.display());
                            None
                        }
                    }
                })
                .collect()
        });

        progress.finish_and_clear();
        tracing::info!(
            "成功渲染 {}/{} 个文件，失败 {} 个，耗时 {:?}",
            results.len(),
            total_files,
            failed_count.load(Ordering::SeqCst),
            timer.elapsed()
        );

        Ok(results)
    }

    /// 渲染目录中的所有矩阵文件
    pub fn render_directory<P: AsRef<Path>>(&self, dir_path: P, out_dir: &Path) -> Result<Vec<RenderReport>> {
        let files = fs_utils::scan_matrix_files(dir_path, &self.config.supported_extensions)?;

        if files.is_empty() {
            return Err(DisplayError::Other(
                "在指定目录中未找到支持的矩阵文件".to_string(),
            ));
        }

        tracing::info!("找到 {} 个矩阵文件", files.len());
        self.render_files(&files, out_dir)
    }
}

fn check_unique_stems(file_paths: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<&std::ffi::OsStr, &Path> = HashMap::new();
    for path in file_paths {
        let Some(stem) = path.file_stem() else {
            continue;
        };
        if let Some(first) = seen.insert(stem, path.as_path()) {
            return Err(DisplayError::InvalidArgument(format!(
                "输出文件名冲突: {} 与 {} 都将写入 {}.png",
                first.display(),
                path.display(),
                stem.to_string_lossy()
            )));
        }
    }
    Ok(())
}
