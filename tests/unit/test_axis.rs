//! # 坐标轴模块单元测试
//!
//! 测试各坐标轴类型的网格、刻度与标签

use specshow::axis::{nice_ticks, AxisParams, Scale};
use specshow::convert::PITCH_CLASSES;
use specshow::AxisKind;

fn params() -> AxisParams {
    AxisParams::default()
}

#[test]
fn test_edges_have_n_plus_one_increasing_values() {
    for kind in AxisKind::ALL {
        for n in [1, 2, 12, 84, 257] {
            let layout = kind.layout(n, &params());
            assert_eq!(layout.edges.len(), n + 1, "{kind} n={n}");
            assert_eq!(layout.display_edges.len(), n + 1);
            assert!(
                layout.display_edges.windows(2).all(|w| w[1] > w[0]),
                "{kind} n={n}: {:?}",
                layout.display_edges
            );
        }
    }
}

#[test]
fn test_ticks_within_range() {
    for kind in AxisKind::ALL {
        let layout = kind.layout(100, &params());
        let (lo, hi) = layout.range();
        let eps = 1e-9 * (hi - lo).abs().max(1.0);
        for tick in &layout.ticks {
            assert!(
                tick.position >= lo - eps && tick.position <= hi + eps,
                "{kind}: {} outside {lo}..{hi}",
                tick.position
            );
        }
    }
}

#[test]
fn test_plain_axis_has_no_ticks() {
    let layout = AxisKind::Plain.layout(10, &params());
    assert!(layout.ticks.is_empty());
    assert_eq!(layout.title, "");
    assert_eq!(layout.range(), (0.0, 10.0));
}

#[test]
fn test_frames_ticks() {
    let layout = AxisKind::Frames.layout(10, &params());
    assert_eq!(layout.labels(), vec!["0", "2", "4", "6", "8", "10"]);
}

#[test]
fn test_time_edges_and_labels() {
    let p = AxisParams {
        sr: 1000.0,
        hop_length: 100,
        ..params()
    };
    let layout = AxisKind::Time.layout(20, &p);
    assert!((layout.edges[20] - 2.0).abs() < 1e-12);
    assert_eq!(layout.labels(), vec!["0", "0.5", "1", "1.5", "2"]);
}

#[test]
fn test_linear_edges_are_bin_centered() {
    let p = AxisParams {
        sr: 8000.0,
        ..params()
    };
    let layout = AxisKind::Linear.layout(5, &p);
    assert_eq!(layout.edges, vec![0.0, 500.0, 1500.0, 2500.0, 3500.0, 4000.0]);
    assert_eq!(layout.scale, Scale::Linear);
    assert_eq!(layout.labels().first(), Some(&"0"));
}

#[test]
fn test_log_axis_uses_symlog_and_powers_of_two() {
    let layout = AxisKind::Log.layout(1025, &params());
    assert!(matches!(layout.scale, Scale::SymLog { .. }));
    assert_eq!(layout.ticks[0].value, 0.0);
    for tick in &layout.ticks[1..] {
        assert!(tick.value.log2().fract().abs() < 1e-12, "{}", tick.value);
    }
}

#[test]
fn test_mel_edges_end_at_fmax() {
    let p = AxisParams {
        fmax: Some(8000.0),
        ..params()
    };
    let layout = AxisKind::Mel.layout(128, &p);
    assert_eq!(layout.edges[0], 0.0);
    assert_eq!(layout.edges[128], 8000.0);
}

#[test]
fn test_mel_edges_below_fmin() {
    let p = AxisParams {
        fmin: Some(500.0),
        fmax: Some(8000.0),
        ..params()
    };
    let layout = AxisKind::Mel.layout(8, &p);
    // 第一条边界位于 fmin 以下半个梅尔频点处
    assert!((layout.edges[0] - 320.3).abs() < 0.1, "{}", layout.edges[0]);
    assert!((layout.edges[2] - 1041.3).abs() < 0.1, "{}", layout.edges[2]);
    assert_eq!(layout.edges[8], 8000.0);
}

#[test]
fn test_cqt_edges_center_bins() {
    let layout = AxisKind::CqtHz.layout(84, &params());
    let c1 = specshow::convert::c1_hz();
    // 第一个频点的中心频率位于两条边界的几何中点
    let center = (layout.edges[0] * layout.edges[1]).sqrt();
    assert!((center - c1).abs() < 1e-9);
    assert_eq!(layout.scale, Scale::Log2);
}

#[test]
fn test_cqt_custom_fmin() {
    let p = AxisParams {
        fmin: Some(110.0),
        bins_per_octave: 24,
        ..params()
    };
    let layout = AxisKind::CqtNote.layout(48, &p);
    assert_eq!(layout.labels(), vec!["C3", "C4"]);
}

#[test]
fn test_cqt_falls_back_to_natural_notes() {
    let p = AxisParams {
        fmin: Some(220.0),
        ..params()
    };
    let layout = AxisKind::CqtNote.layout(6, &p);
    let labels = layout.labels();
    assert!(labels.contains(&"A3"));
    assert!(labels.len() >= 2);
}

#[test]
fn test_chroma_labels() {
    let layout = AxisKind::Chroma.layout(12, &params());
    assert_eq!(layout.labels(), PITCH_CLASSES.to_vec());
    assert_eq!(layout.edges[0], -0.5);
    assert_eq!(layout.edges[12], 11.5);
}

#[test]
fn test_lag_labels_negative_in_upper_half() {
    let p = AxisParams {
        sr: 1000.0,
        hop_length: 100,
        ..params()
    };
    let layout = AxisKind::Lag.layout(50, &p);
    let half = layout.edges[50] / 2.0;

    assert!(!layout.ticks.is_empty());
    for tick in &layout.ticks {
        if tick.position > half {
            assert!(tick.label.starts_with('-'), "{tick:?}");
        } else {
            assert!(!tick.label.starts_with('-'), "{tick:?}");
        }
    }
    assert_eq!(layout.labels(), vec!["0", "2", "-2"]);
}

#[test]
fn test_label_for_unknown_position_is_empty() {
    let layout = AxisKind::Chroma.layout(12, &params());
    assert_eq!(layout.label_for(4.0), "E");
    assert_eq!(layout.label_for(4.5), "");
}

#[test]
fn test_validate() {
    assert!(params().validate(AxisKind::Time).is_ok());

    let bad_sr = AxisParams {
        sr: 0.0,
        ..params()
    };
    assert!(bad_sr.validate(AxisKind::Linear).unwrap_err().is_invalid_argument());

    let bad_fmin = AxisParams {
        fmin: Some(-1.0),
        ..params()
    };
    assert!(bad_fmin.validate(AxisKind::CqtNote).is_err());

    let bad_mel = AxisParams {
        fmin: Some(9000.0),
        fmax: Some(4000.0),
        ..params()
    };
    assert!(bad_mel.validate(AxisKind::Mel).is_err());
}

#[test]
fn test_nice_ticks() {
    assert_eq!(nice_ticks(0.0, 10.0, 5, 0.0), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    assert_eq!(nice_ticks(0.0, 3.0, 5, 1.0), vec![0.0, 1.0, 2.0, 3.0]);
    assert!(nice_ticks(1.0, 1.0, 5, 0.0).is_empty());
}
