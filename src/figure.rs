//! # 图像表面模块
//!
//! `Figure` 持有一块 RGB 像素缓冲区，所有绘制都通过显式传入的绘图区域完成。
//! 同时负责 PNG 的编码与解码。

use crate::error::{render_err, DisplayError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// 绘图区域类型
pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// 白色背景的 RGB 图像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl Figure {
    /// 创建白色背景的图像
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidArgument(format!(
                "图像尺寸必须为正数: {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            buffer: vec![255; width as usize * height as usize * 3],
        })
    }

    /// 从 RGB 像素数据构造
    pub fn from_rgb(width: u32, height: u32, buffer: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || buffer.len() != expected {
            return Err(DisplayError::Image(format!(
                "像素数据长度 {} 与尺寸 {width}x{height} 不符",
                buffer.len()
            )));
        }
        Ok(Self {
            width,
            height,
            buffer,
        })
    }

    /// 图像尺寸 (宽, 高)
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// RGB 像素数据，按行存储
    pub fn pixels(&self) -> &[u8] {
        &self.buffer
    }

    /// 指定位置的像素
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.buffer[i], self.buffer[i + 1], self.buffer[i + 2]])
    }

    /// 是否仍为纯白
    pub fn is_blank(&self) -> bool {
        self.buffer.iter().all(|&b| b == 255)
    }

    /// 在整幅图像上绘制
    ///
    /// 闭包返回错误时，已绘制的内容保留在图像中。
    pub fn draw<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Canvas<'_>) -> Result<T>,
    {
        let size = (self.width, self.height);
        let root = BitMapBackend::with_buffer(&mut self.buffer, size).into_drawing_area();
        let result = f(&root)?;
        root.present().map_err(render_err)?;
        Ok(result)
    }

    /// 将图像均分为 `rows` × `cols` 个子图后绘制，子图按行排列
    pub fn subplots<T, F>(&mut self, rows: usize, cols: usize, f: F) -> Result<T>
    where
        F: FnOnce(&[Canvas<'_>]) -> Result<T>,
    {
        if rows == 0 || cols == 0 {
            return Err(DisplayError::InvalidArgument(format!(
                "子图布局必须为正数: {rows}x{cols}"
            )));
        }
        self.draw(|root| {
            let panels = root.split_evenly((rows, cols));
            f(&panels)
        })
    }

    /// 编码为 PNG
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_png(&mut bytes)?;
        Ok(bytes)
    }

    fn write_png<W: Write>(&self, writer: W) -> Result<()> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.buffer)?;
        writer.finish()?;
        Ok(())
    }

    /// 保存为 PNG 文件
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_png(BufWriter::new(file))
    }

    /// 从 PNG 数据解码，灰度与透明通道转换为 RGB
    pub fn from_png(bytes: &[u8]) -> Result<Self> {
        Self::read_png(bytes)
    }

    /// 加载 PNG 文件
    pub fn load_png<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::read_png(BufReader::new(file))
    }

    fn read_png<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut raw = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut raw)?;
        let raw = &raw[..info.buffer_size()];

        let rgb: Vec<u8> = match info.color_type {
            png::ColorType::Rgb => raw.to_vec(),
            png::ColorType::Rgba => raw
                .chunks_exact(4)
                .flat_map(|p| [p[0], p[1], p[2]])
                .collect(),
            png::ColorType::Grayscale => raw.iter().flat_map(|&g| [g, g, g]).collect(),
            png::ColorType::GrayscaleAlpha => raw
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0]])
                .collect(),
            other => {
                return Err(DisplayError::Image(format!(
                    "不支持的 PNG 颜色类型: {other:?}"
                )))
            }
        };

        Self::from_rgb(info.width, info.height, rgb)
    }
}
