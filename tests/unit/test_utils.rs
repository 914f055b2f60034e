//! # 工具函数模块单元测试
//!
//! 测试各种工具函数的正确性

use specshow::utils::{fs_utils, string_utils, Timer};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_is_supported_matrix_file() {
    let extensions = vec!["json".to_string(), "npy".to_string()];

    assert!(fs_utils::is_supported_matrix_file(
        Path::new("stft.json"),
        &extensions
    ));
    assert!(fs_utils::is_supported_matrix_file(
        Path::new("/path/to/cqt.JSON"),
        &extensions
    ));
    assert!(fs_utils::is_supported_matrix_file(
        Path::new("chroma.Npy"),
        &extensions
    ));

    assert!(!fs_utils::is_supported_matrix_file(
        Path::new("stft.png"),
        &extensions
    ));
    assert!(!fs_utils::is_supported_matrix_file(
        Path::new("stft"),
        &extensions
    ));
    assert!(!fs_utils::is_supported_matrix_file(
        Path::new("stft."),
        &extensions
    ));
}

#[test]
fn test_get_display_name() {
    let test_cases = vec![
        ("cqt.json", "cqt.json"),
        ("/path/to/cqt.json", "cqt.json"),
        ("", "未知文件"),
        ("no_extension", "no_extension"),
    ];

    for (input_path, expected_name) in test_cases {
        assert_eq!(fs_utils::get_display_name(input_path), expected_name);
    }
}

#[test]
fn test_ensure_dir_exists() {
    let temp_dir = TempDir::new().unwrap();
    let test_dir = temp_dir.path().join("a").join("b");

    assert!(!test_dir.exists());
    fs_utils::ensure_dir_exists(&test_dir).unwrap();
    assert!(test_dir.is_dir());

    // 再次调用应该成功（目录已存在）
    fs_utils::ensure_dir_exists(&test_dir).unwrap();
}

#[test]
fn test_scan_matrix_files() {
    let temp_dir = TempDir::new().unwrap();
    let sub_dir = temp_dir.path().join("chroma");
    std::fs::create_dir(&sub_dir).unwrap();

    std::fs::write(temp_dir.path().join("stft.json"), "{}").unwrap();
    std::fs::write(temp_dir.path().join("stft.png"), "").unwrap();
    std::fs::write(sub_dir.join("chroma_12.json"), "{}").unwrap();
    std::fs::write(sub_dir.join("chroma_24.JSON"), "{}").unwrap();

    let files = fs_utils::scan_matrix_files(temp_dir.path(), &["json".to_string()]).unwrap();
    assert_eq!(files.len(), 3);
    assert!(files.iter().all(|f| f.extension().is_some()));
    assert!(!files.iter().any(|f| f.ends_with("stft.png")));
}

#[test]
fn test_scan_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let result = fs_utils::scan_matrix_files(temp_dir.path().join("missing"), &["json".to_string()]);
    assert!(result.is_err());
}

#[test]
fn test_truncate_string() {
    let test_cases = vec![
        ("hello", 10, "hello"),
        ("hello world", 8, "hello..."),
        ("", 5, ""),
        ("abc", 3, "abc"),
        ("abcd", 3, "..."),
        ("色度图与梅尔谱", 5, "色度..."),
    ];

    for (input, max_len, expected) in test_cases {
        assert_eq!(string_utils::truncate_string(input, max_len), expected);
    }
}

#[test]
fn test_format_duration() {
    let test_cases = vec![
        (Duration::from_millis(500), "500ms"),
        (Duration::from_secs(1), "1.000s"),
        (Duration::from_secs(90), "1m 30s"),
        (Duration::from_secs(3661), "1h 1m 1s"),
        (Duration::from_millis(1500), "1.500s"),
    ];

    for (duration, expected) in test_cases {
        assert_eq!(string_utils::format_duration(duration), expected);
    }
}

#[test]
fn test_timer_stop() {
    let timer = Timer::new("test");
    std::thread::sleep(Duration::from_millis(10));
    assert!(timer.stop().as_millis() >= 10);
}
