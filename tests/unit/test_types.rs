//! # 数据类型模块单元测试
//!
//! 测试坐标轴类型、矩阵文件与渲染报告

use ndarray::array;
use specshow::compare::BaselineStatus;
use specshow::{AxisKind, AxisSide, Colormap, DisplayError, Matrix, MatrixFile, RenderReport};
use tempfile::NamedTempFile;

#[test]
fn test_axis_kind_names() {
    assert_eq!("none".parse::<AxisKind>().unwrap(), AxisKind::Plain);
    assert_eq!("cqt_note".parse::<AxisKind>().unwrap(), AxisKind::CqtNote);
    assert_eq!(AxisKind::CqtHz.to_string(), "cqt_hz");
}

#[test]
fn test_parse_optional_axis() {
    assert_eq!(
        AxisKind::parse_optional(None, AxisSide::X).unwrap(),
        AxisKind::Plain
    );
    assert_eq!(
        AxisKind::parse_optional(Some("lag"), AxisSide::Y).unwrap(),
        AxisKind::Lag
    );

    let err = AxisKind::parse_optional(Some("octaves"), AxisSide::Y).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("y_axis"));
}

#[test]
fn test_axis_kind_serde_names() {
    let json = serde_json::to_string(&AxisKind::Plain).unwrap();
    assert_eq!(json, "\"none\"");
    let kind: AxisKind = serde_json::from_str("\"cqt_note\"").unwrap();
    assert_eq!(kind, AxisKind::CqtNote);
}

#[test]
fn test_matrix_file_round_trip() {
    let real = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let mut file = MatrixFile::from_real(&real);
    file.y_axis = Some("chroma".to_string());
    file.sr = Some(16000);

    let temp_file = NamedTempFile::new().unwrap();
    file.save_to_file(temp_file.path()).unwrap();
    let loaded = MatrixFile::from_file(temp_file.path()).unwrap();

    assert_eq!(loaded.y_axis.as_deref(), Some("chroma"));
    assert_eq!(loaded.sr, Some(16000));
    assert_eq!(loaded.to_matrix().unwrap(), Matrix::Real(real));
}

#[test]
fn test_matrix_file_mask() {
    let file: MatrixFile =
        serde_json::from_str(r#"{"data": [[0, 1], [2, 0]], "mask": true}"#).unwrap();
    let matrix = file.to_matrix().unwrap();
    assert_eq!(matrix, Matrix::Mask(array![[false, true], [true, false]]));
    assert!(matrix.view().is_mask());
    assert_eq!(matrix.shape(), (2, 2));
}

#[test]
fn test_matrix_file_imag_shape_mismatch() {
    let file = MatrixFile {
        data: vec![vec![1.0, 2.0]],
        imag: Some(vec![vec![1.0]]),
        ..MatrixFile::default()
    };
    assert!(matches!(file.to_matrix(), Err(DisplayError::Shape(_))));
}

#[test]
fn test_invalid_json_is_parse_error() {
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "{\"data\": [[1, 2]").unwrap();
    match MatrixFile::from_file(temp_file.path()) {
        Err(DisplayError::ParseError { raw_data, .. }) => {
            assert_eq!(raw_data.as_deref(), Some("{\"data\": [[1, 2]"));
        }
        other => panic!("应该返回解析错误: {other:?}"),
    }
}

#[test]
fn test_render_report() {
    let mut report = RenderReport {
        file_path: "/data/cqt.json".to_string(),
        output_path: "/out/cqt.png".to_string(),
        n_rows: 84,
        n_cols: 100,
        x_axis: AxisKind::Time,
        y_axis: AxisKind::CqtNote,
        colormap: Colormap::Magma,
        baseline: Some(BaselineStatus::Passed { rms: 0.0 }),
        processing_time_ms: 12,
    };
    assert_eq!(report.filename(), "cqt.json");
    assert!(report.is_ok());

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"nRows\":84"));
    assert!(json.contains("\"yAxis\":\"cqt_note\""));

    report.baseline = Some(BaselineStatus::Failed { rms: 20.0, tol: 13.0 });
    assert!(!report.is_ok());
}
