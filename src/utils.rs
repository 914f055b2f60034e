//! # 通用工具函数模块
//!
//! 提供文件扫描、字符串格式化和计时等通用工具函数。

use crate::error::{DisplayError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// 文件系统相关工具
pub mod fs_utils {
    use super::*;
    use walkdir::WalkDir;

    /// 递归扫描目录，查找支持的矩阵文件，结果按路径排序
    pub fn scan_matrix_files<P: AsRef<Path>>(
        dir: P,
        supported_extensions: &[String],
    ) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| DisplayError::Io(e.into()))?;

            if entry.file_type().is_file() {
                let path = entry.path();
                if is_supported_matrix_file(path, supported_extensions) {
                    files.push(path.to_path_buf());
                }
            }
        }

        Ok(files)
    }

    /// 检查文件扩展名是否在支持列表中
    pub fn is_supported_matrix_file(path: &Path, supported_extensions: &[String]) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                supported_extensions
                    .iter()
                    .any(|supported| supported.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// 确保目录存在，如果不存在则创建
    pub fn ensure_dir_exists<P: AsRef<Path>>(dir: P) -> Result<()> {
        let path = dir.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// 获取文件的显示名称（不含路径）
    pub fn get_display_name<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("未知文件")
            .to_string()
    }
}

/// 字符串处理工具
pub mod string_utils {
    /// 截断字符串到指定字符数，如果超长则添加省略号
    pub fn truncate_string(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }

    /// 格式化持续时间为人类可读的格式
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        let millis = duration.subsec_millis();

        if hours > 0 {
            format!("{hours}h {minutes}m {seconds}s")
        } else if minutes > 0 {
            format!("{minutes}m {seconds}s")
        } else if seconds > 0 {
            format!("{seconds}.{millis:03}s")
        } else {
            format!("{millis}ms")
        }
    }
}

/// 性能测量工具
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    /// 创建新的计时器
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// 获取已经过的时间
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    /// 停止计时器并返回持续时间
    pub fn stop(self) -> std::time::Duration {
        self.elapsed()
    }

    /// 以 debug 级别记录经过的时间
    pub fn log_elapsed(&self) {
        tracing::debug!(
            "{}: {}",
            self.name,
            string_utils::format_duration(self.elapsed())
        );
    }
}
