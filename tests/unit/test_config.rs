//! # 配置模块单元测试
//!
//! 测试配置管理功能的正确性

use specshow::config::{CompareConfig, DisplayConfig, FigureConfig};
use specshow::display::SpecShowOptions;
use specshow::{AxisKind, Colormap};
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_default_config_creation() {
    let config = DisplayConfig::default();

    assert_eq!(config.sample_rate, 22050);
    assert_eq!(config.hop_length, 512);
    assert_eq!(config.bins_per_octave, 12);
    assert_eq!(config.x_axis, AxisKind::Plain);
    assert_eq!(config.y_axis, AxisKind::Plain);
    assert_eq!(config.colormap, None);
    assert!(config.robust);

    assert_eq!(config.num_threads, None);
    assert!(!config.verbose);
    assert!(config.show_progress);
}

#[test]
fn test_config_validation() {
    let mut config = DisplayConfig::default();

    // 有效配置应该通过验证
    assert!(config.validate().is_ok());

    // 空的扩展名列表应该失败
    config.supported_extensions.clear();
    assert!(config.validate().is_err());
    config.supported_extensions = vec!["json".to_string()];
    assert!(config.validate().is_ok());

    // 零线程数应该失败
    config.num_threads = Some(0);
    assert!(config.validate().is_err());
    config.num_threads = Some(4);
    assert!(config.validate().is_ok());

    config.sample_rate = 0;
    assert!(config.validate().is_err());
    config.sample_rate = 44100;

    config.figure.height = 0;
    assert!(config.validate().is_err());
    config.figure.height = 100;

    config.compare.tolerance = -1.0;
    assert!(config.validate().is_err());
    config.compare.tolerance = 0.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_effective_thread_count() {
    let mut config = DisplayConfig::default();

    let default_threads = config.effective_thread_count();
    assert!(default_threads > 0);
    assert!(default_threads <= num_cpus::get());

    config.num_threads = Some(2);
    assert_eq!(config.effective_thread_count(), 2);
}

#[test]
fn test_config_serialization() {
    let mut config = DisplayConfig::default();
    config.x_axis = AxisKind::Time;
    config.y_axis = AxisKind::Chroma;
    config.fmin = Some(32.7);
    config.figure.output_dir = Some(PathBuf::from("out"));
    config.compare.generate_missing = true;
    let temp_file = NamedTempFile::new().unwrap();

    config.save_to_file(temp_file.path()).unwrap();
    let loaded_config = DisplayConfig::from_file(temp_file.path()).unwrap();

    assert_eq!(config, loaded_config);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "y_axis = \"spiral\"\n").unwrap();

    let err = DisplayConfig::from_file(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("配置"));
}

#[test]
fn test_nested_defaults() {
    let figure = FigureConfig::default();
    assert_eq!((figure.width, figure.height), (800, 400));
    assert!(figure.show_colorbar);
    assert_eq!(figure.output_dir, None);

    let compare = CompareConfig::default();
    assert_eq!(compare.tolerance, 13.0);
    assert_eq!(compare.baseline_dir, None);
    assert!(!compare.generate_missing);
}

#[test]
fn test_options_from_config() {
    let mut config = DisplayConfig::default();
    config.sample_rate = 16000;
    config.hop_length = 160;
    config.y_axis = AxisKind::Mel;
    config.colormap = Some(Colormap::Coolwarm);
    config.n_yticks = 8;

    let options = SpecShowOptions::from_config(&config);
    assert_eq!(options.params.sr, 16000.0);
    assert_eq!(options.params.hop_length, 160);
    assert_eq!(options.y_axis, AxisKind::Mel);
    assert_eq!(options.cmap, Some(Colormap::Coolwarm));
    assert_eq!(options.n_yticks, 8);
}
