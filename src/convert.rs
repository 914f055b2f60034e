//! # 单位换算模块
//!
//! 频点与物理单位之间的换算：FFT/CQT/梅尔频率、帧与时间、Hz 与音名。

use crate::error::{DisplayError, Result};
use lazy_static::lazy_static;
use regex::Regex;

/// A4 标准音高 (Hz)
pub const A4_HZ: f64 = 440.0;

/// A4 的 MIDI 编号
pub const MIDI_A4: f64 = 69.0;

/// 升号音名表
pub const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

lazy_static! {
    /// 音名解析：字母、升降号、可选八度
    static ref NOTE_REGEX: Regex =
        Regex::new(r"^(?P<pitch>[A-Ga-g])(?P<accidental>[#♯b♭!]*)(?P<octave>[+-]?\d+)?$").unwrap();
}

/// FFT 各频点的中心频率
pub fn fft_frequencies(sr: f64, n_fft: usize) -> Vec<f64> {
    let n_bins = 1 + n_fft / 2;
    (0..n_bins)
        .map(|k| k as f64 * sr / n_fft as f64)
        .collect()
}

/// CQT 各频点的中心频率
pub fn cqt_frequencies(n_bins: usize, fmin: f64, bins_per_octave: usize) -> Vec<f64> {
    (0..n_bins)
        .map(|k| fmin * 2f64.powf(k as f64 / bins_per_octave as f64))
        .collect()
}

/// 在梅尔刻度上均匀分布的频率
pub fn mel_frequencies(n_mels: usize, fmin: f64, fmax: f64, htk: bool) -> Vec<f64> {
    let min_mel = hz_to_mel(fmin, htk);
    let max_mel = hz_to_mel(fmax, htk);
    linspace(min_mel, max_mel, n_mels)
        .into_iter()
        .map(|m| mel_to_hz(m, htk))
        .collect()
}

/// 帧索引转换为时间（秒）
pub fn frames_to_time(frame: f64, sr: f64, hop_length: usize) -> f64 {
    frame * hop_length as f64 / sr
}

// Slaney 梅尔刻度参数：1 kHz 以下线性，以上对数
const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Hz 转换为梅尔
///
/// `htk` 为真时使用 `2595 * log10(1 + f / 700)`，否则使用 Slaney 公式。
pub fn hz_to_mel(hz: f64, htk: bool) -> f64 {
    if htk {
        return 2595.0 * (1.0 + hz / 700.0).log10();
    }
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// 梅尔转换为 Hz
pub fn mel_to_hz(mel: f64, htk: bool) -> f64 {
    if htk {
        return 700.0 * (10f64.powf(mel / 2595.0) - 1.0);
    }
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Hz 转换为（可带小数的）MIDI 编号
pub fn hz_to_midi(hz: f64) -> f64 {
    MIDI_A4 + 12.0 * (hz / A4_HZ).log2()
}

/// MIDI 编号转换为 Hz
pub fn midi_to_hz(midi: f64) -> f64 {
    A4_HZ * 2f64.powf((midi - MIDI_A4) / 12.0)
}

/// MIDI 编号转换为音名，四舍五入到最近的半音
pub fn midi_to_note(midi: f64, octave: bool) -> String {
    let rounded = midi.round() as i64;
    let pitch = PITCH_CLASSES[rounded.rem_euclid(12) as usize];
    if octave {
        format!("{pitch}{}", rounded.div_euclid(12) - 1)
    } else {
        pitch.to_string()
    }
}

/// Hz 转换为音名
pub fn hz_to_note(hz: f64, octave: bool) -> String {
    midi_to_note(hz_to_midi(hz), octave)
}

/// 音名转换为 MIDI 编号，如 `C4` → 60, `A#3` → 58, `Eb-1` → 3
///
/// 省略八度时按第 0 组的 C 之上计算。
pub fn note_to_midi(note: &str) -> Result<i32> {
    let caps = NOTE_REGEX
        .captures(note.trim())
        .ok_or_else(|| DisplayError::InvalidArgument(format!("无法解析音名: {note:?}")))?;

    let pitch = match caps["pitch"].to_ascii_uppercase().as_str() {
        "C" => 0,
        "D" => 2,
        "E" => 4,
        "F" => 5,
        "G" => 7,
        "A" => 9,
        _ => 11,
    };

    let offset: i32 = caps
        .name("accidental")
        .map(|m| {
            m.as_str()
                .chars()
                .map(|c| match c {
                    '#' | '♯' => 1,
                    'b' | '♭' => -1,
                    _ => 0,
                })
                .sum()
        })
        .unwrap_or(0);

    let octave: i32 = match caps.name("octave") {
        Some(m) => m.as_str().parse().map_err(|_| {
            DisplayError::InvalidArgument(format!("无法解析八度: {:?}", m.as_str()))
        })?,
        None => 0,
    };

    Ok(12 * (octave + 1) + pitch + offset)
}

/// 音名转换为 Hz
pub fn note_to_hz(note: &str) -> Result<f64> {
    Ok(midi_to_hz(f64::from(note_to_midi(note)?)))
}

/// 解析频率参数：数值按 Hz 处理，否则按音名处理（如 `C1`）
pub fn parse_frequency(value: &str) -> Result<f64> {
    let value = value.trim();
    match value.parse::<f64>() {
        Ok(hz) if hz.is_finite() => Ok(hz),
        Ok(hz) => Err(DisplayError::InvalidArgument(format!("无效的频率: {hz}"))),
        Err(_) => note_to_hz(value),
    }
}

/// C1 的频率，CQT 默认最低频率
pub fn c1_hz() -> f64 {
    midi_to_hz(24.0)
}

/// C2 的频率，对数轴的线性区阈值
pub fn c2_hz() -> f64 {
    midi_to_hz(36.0)
}

/// 等间距采样，包含两端
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num).map(|i| start + i as f64 * step).collect()
        }
    }
}
