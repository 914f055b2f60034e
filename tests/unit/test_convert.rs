//! # 单位换算模块单元测试

use specshow::convert::*;

#[test]
fn test_cqt_frequencies_double_per_octave() {
    let freqs = cqt_frequencies(25, 55.0, 12);
    assert_eq!(freqs.len(), 25);
    assert!((freqs[12] - 110.0).abs() < 1e-9);
    assert!((freqs[24] - 220.0).abs() < 1e-9);
}

#[test]
fn test_mel_frequencies_endpoints() {
    let freqs = mel_frequencies(40, 0.0, 11025.0, false);
    assert_eq!(freqs.len(), 40);
    assert_eq!(freqs[0], 0.0);
    assert!((freqs[39] - 11025.0).abs() < 1e-6);
    assert!(freqs.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_frames_to_time() {
    assert_eq!(frames_to_time(0.0, 22050.0, 512), 0.0);
    assert!((frames_to_time(43.0, 22050.0, 512) - 0.998_458).abs() < 1e-5);
}

#[test]
fn test_midi_conversions() {
    assert!((hz_to_midi(440.0) - 69.0).abs() < 1e-12);
    assert!((midi_to_hz(60.0) - 261.625_565).abs() < 1e-5);
    assert_eq!(midi_to_note(69.0, true), "A4");
    assert_eq!(midi_to_note(70.0, false), "A#");
    assert_eq!(midi_to_note(-1.0, true), "B-2");
}

#[test]
fn test_note_parsing() {
    assert_eq!(note_to_midi("C-1").unwrap(), 0);
    assert_eq!(note_to_midi("Bb3").unwrap(), 58);
    assert_eq!(note_to_midi("F##2").unwrap(), 43);
    assert!((note_to_hz("A3").unwrap() - 220.0).abs() < 1e-9);
    assert!(note_to_midi("").unwrap_err().is_invalid_argument());
    assert!(note_to_midi("C4x").is_err());
}

#[test]
fn test_reference_pitches() {
    assert!((c1_hz() - 32.703_195).abs() < 1e-5);
    assert!((c2_hz() - 2.0 * c1_hz()).abs() < 1e-9);
}

#[test]
fn test_linspace() {
    assert!(linspace(0.0, 1.0, 0).is_empty());
    assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
}
