//! 测试用的合成时频矩阵

#![allow(dead_code)]

use ndarray::{concatenate, Array2, Axis};
use num_complex::Complex32;
use specshow::{Figure, SpecImage, SpecShowOptions};
use specshow::display::specshow;

/// 测试图像尺寸
pub const WIDTH: u32 = 400;
pub const HEIGHT: u32 = 300;

/// 合成 STFT：一条上升的谱线，带随帧变化的相位
pub fn stft(n_fft: usize, n_frames: usize) -> Array2<Complex32> {
    let n_bins = 1 + n_fft / 2;
    Array2::from_shape_fn((n_bins, n_frames), |(k, t)| {
        let center = 10.0 + (n_bins as f32 - 20.0) * t as f32 / n_frames as f32;
        let d = (k as f32 - center) / 4.0;
        let amplitude = (-0.5 * d * d).exp() + 0.01;
        let phase = 0.37 * (k * t) as f32;
        Complex32::from_polar(amplitude, phase)
    })
}

/// 复数矩阵的幅值
pub fn magnitude(a: &Array2<Complex32>) -> Array2<f32> {
    a.mapv(|z| z.norm())
}

/// 合成 CQT（dB），84 个频点从 C1 起，谐波位于第 36/48/55 个频点
pub fn cqt_db(n_frames: usize) -> Array2<f32> {
    Array2::from_shape_fn((84, n_frames), |(k, t)| {
        let mut amplitude = 1e-3f32;
        for (peak, gain) in [(36usize, 1.0f32), (48, 0.5), (55, 0.25)] {
            if k == peak {
                amplitude += gain * (1.0 - 0.5 * t as f32 / n_frames as f32);
            }
        }
        20.0 * amplitude.log10()
    })
}

/// 合成色度图，能量在音级之间轮换
pub fn chroma(n_chroma: usize, n_frames: usize) -> Array2<f32> {
    Array2::from_shape_fn((n_chroma, n_frames), |(k, t)| {
        if k == t % n_chroma {
            1.0
        } else {
            0.1 * ((k + t) % 3) as f32
        }
    })
}

/// 上下拼接两个色度图
pub fn stacked_chroma(n_chroma: usize, n_frames: usize) -> Array2<f32> {
    let a = chroma(n_chroma, n_frames);
    let b = chroma(n_chroma, n_frames).mapv(|v| 1.0 - v);
    concatenate(Axis(0), &[a.view(), b.view()]).unwrap()
}

/// 有正有负的矩阵
pub fn signed(n_rows: usize, n_cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((n_rows, n_cols), |(i, j)| {
        ((i as f32) * 0.3).sin() * ((j as f32) * 0.2).cos()
    })
}

/// 在新图像上绘制一个实数矩阵
pub fn render(data: &Array2<f32>, options: &SpecShowOptions) -> (Figure, SpecImage) {
    let mut figure = Figure::new(WIDTH, HEIGHT).unwrap();
    let image = figure.draw(|root| specshow(root, data, options)).unwrap();
    (figure, image)
}

/// 在新图像上绘制一个复数矩阵
pub fn render_complex(data: &Array2<Complex32>, options: &SpecShowOptions) -> (Figure, SpecImage) {
    let mut figure = Figure::new(WIDTH, HEIGHT).unwrap();
    let image = figure.draw(|root| specshow(root, data, options)).unwrap();
    (figure, image)
}
