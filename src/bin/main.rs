//! # 频谱图渲染主程序
//!
//! 命令行入口：将矩阵 JSON 文件批量渲染为 PNG，并可与基准图比较。

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Arg, ArgMatches, Command as ClapCommand};
use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;
use specshow::{
    compare::BaselineStatus,
    config::create_default_config,
    convert,
    types::AxisSide,
    utils::{string_utils, Timer},
    AxisKind, Colormap, DisplayConfig, RenderReport, SpecRenderer,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;

lazy_static! {
    /// 图像尺寸参数，如 `800x400`
    static ref SIZE_REGEX: Regex = Regex::new(r"^(\d+)[xX](\d+)$").unwrap();
}

/// 报告文件名
const REPORT_FILENAME: &str = "render_report.json";

fn build_cli() -> ClapCommand {
    ClapCommand::new("specshow")
        .version(specshow::VERSION)
        .author("Specshow Team")
        .about("频谱图渲染工具")
        .long_about("将 STFT/CQT/色度/梅尔等时频矩阵渲染为带语义坐标轴的图像，并与基准图比较。")
        .arg(
            Arg::new("input")
                .help("矩阵 JSON 文件或目录路径")
                .value_name("PATH")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("输出目录路径")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("x_axis")
                .short('x')
                .long("x-axis")
                .help("水平轴类型")
                .value_name("KIND"),
        )
        .arg(
            Arg::new("y_axis")
                .short('y')
                .long("y-axis")
                .help("垂直轴类型")
                .value_name("KIND"),
        )
        .arg(
            Arg::new("sr")
                .long("sr")
                .help("采样率")
                .value_name("HZ")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("hop_length")
                .long("hop-length")
                .help("帧移")
                .value_name("SAMPLES")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("bins_per_octave")
                .long("bins-per-octave")
                .help("每八度频点数")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("fmin")
                .long("fmin")
                .help("最低频率，Hz 或音名（如 C1）")
                .value_name("FREQ"),
        )
        .arg(
            Arg::new("fmax")
                .long("fmax")
                .help("最高频率，Hz 或音名")
                .value_name("FREQ"),
        )
        .arg(
            Arg::new("cmap")
                .long("cmap")
                .help("颜色映射 (magma, coolwarm, gray_r, viridis)")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .help("图像尺寸")
                .value_name("WxH"),
        )
        .arg(
            Arg::new("threads")
                .short('j')
                .long("threads")
                .help("并行线程数")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("配置文件路径")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("baseline_dir")
                .long("baseline-dir")
                .help("基准图目录")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("tolerance")
                .long("tolerance")
                .help("基准图比较的 RMS 容差")
                .value_name("RMS")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(
            Arg::new("generate_baselines")
                .long("generate-baselines")
                .help("基准图不存在时自动生成")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("启用详细输出")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("静默模式，只显示错误")
                .action(clap::ArgAction::SetTrue),
        )
}

/// 主程序入口点
fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    let quiet = matches.get_flag("quiet");

    let config = create_config_from_matches(&matches)?;
    init_tracing(config.verbose, quiet);

    if !quiet {
        println!("{}", format!("🎼 频谱图渲染工具 v{}", specshow::VERSION).bold());
        println!("开始时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!();
    }

    let input = matches
        .get_one::<String>("input")
        .map(PathBuf::from)
        .context("缺少输入路径")?;
    if !input.exists() {
        bail!("指定的路径不存在: {}", input.display());
    }

    let output_dir = config
        .figure
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("specshow_output"));

    let renderer = SpecRenderer::new(config).context("配置无效")?;

    let timer = Timer::new("总体渲染");
    let reports = if input.is_dir() {
        if !quiet {
            println!("📂 正在扫描文件夹: {}", input.display());
        }
        renderer
            .render_directory(&input, &output_dir)
            .with_context(|| format!("渲染目录失败: {}", input.display()))?
    } else {
        renderer.render_files(&[input.clone()], &output_dir)?
    };

    if reports.is_empty() {
        bail!("没有成功渲染任何文件");
    }

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;
    let report_path = output_dir.join(REPORT_FILENAME);
    let json_content = serde_json::to_string_pretty(&reports)?;
    fs::write(&report_path, json_content)
        .with_context(|| format!("无法写入报告: {}", report_path.display()))?;

    if !quiet {
        print_summary(&reports);
        println!(
            "\n✅ 渲染完成，耗时 {}",
            string_utils::format_duration(timer.elapsed())
        );
        println!("📄 渲染报告: {}", report_path.display());
        println!("⏰ 结束时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        bail!("{failed} 个文件与基准图不一致");
    }

    Ok(())
}

/// 初始化日志，`RUST_LOG` 优先
fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "specshow=error"
    } else if verbose {
        "specshow=debug"
    } else {
        "specshow=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn print_summary(reports: &[RenderReport]) {
    println!("\n📊 成功渲染 {} 个文件", reports.len());
    for report in reports {
        let status = match &report.baseline {
            None => "已渲染".normal(),
            Some(BaselineStatus::Created) => "已生成基准图".yellow(),
            Some(BaselineStatus::Passed { rms }) => format!("通过 (RMS {rms:.3})").green(),
            Some(BaselineStatus::Failed { rms, tol }) => {
                format!("失败 (RMS {rms:.3} > {tol})").red()
            }
        };
        println!(
            "  {} [{}x{}, {} / {}] {}",
            string_utils::truncate_string(&report.filename(), 40),
            report.n_rows,
            report.n_cols,
            report.x_axis,
            report.y_axis,
            status
        );
    }
}

/// 解析 `WxH` 格式的图像尺寸
fn parse_size(value: &str) -> anyhow::Result<(u32, u32)> {
    let caps = SIZE_REGEX
        .captures(value.trim())
        .with_context(|| format!("图像尺寸格式应为 WxH: {value:?}"))?;
    let width: u32 = caps[1].parse().context("图像宽度无效")?;
    let height: u32 = caps[2].parse().context("图像高度无效")?;
    if width == 0 || height == 0 {
        bail!("图像尺寸必须为正数: {value}");
    }
    Ok((width, height))
}

/// 从命令行参数创建配置
fn create_config_from_matches(matches: &ArgMatches) -> anyhow::Result<DisplayConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(config_file) => DisplayConfig::from_file(config_file)
            .with_context(|| format!("无法加载配置文件: {config_file}"))?,
        None => create_default_config(),
    };

    // 坐标轴名称在渲染任何文件之前检查
    if let Some(name) = matches.get_one::<String>("x_axis") {
        config.x_axis = AxisKind::parse_for(name, AxisSide::X)?;
    }
    if let Some(name) = matches.get_one::<String>("y_axis") {
        config.y_axis = AxisKind::parse_for(name, AxisSide::Y)?;
    }

    if let Some(&sr) = matches.get_one::<u32>("sr") {
        config.sample_rate = sr;
    }
    if let Some(&hop_length) = matches.get_one::<usize>("hop_length") {
        config.hop_length = hop_length;
    }
    if let Some(&bins_per_octave) = matches.get_one::<usize>("bins_per_octave") {
        config.bins_per_octave = bins_per_octave;
    }
    if let Some(value) = matches.get_one::<String>("fmin") {
        config.fmin = Some(convert::parse_frequency(value)?);
    }
    if let Some(value) = matches.get_one::<String>("fmax") {
        config.fmax = Some(convert::parse_frequency(value)?);
    }
    if let Some(name) = matches.get_one::<String>("cmap") {
        config.colormap = Some(name.parse::<Colormap>()?);
    }
    if let Some(size) = matches.get_one::<String>("size") {
        let (width, height) = parse_size(size)?;
        config.figure.width = width;
        config.figure.height = height;
    }
    if let Some(&threads) = matches.get_one::<usize>("threads") {
        config.num_threads = Some(threads);
    }
    if let Some(output) = matches.get_one::<String>("output") {
        config.figure.output_dir = Some(PathBuf::from(output));
    }
    if let Some(dir) = matches.get_one::<String>("baseline_dir") {
        config.compare.baseline_dir = Some(PathBuf::from(dir));
    }
    if let Some(&tolerance) = matches.get_one::<f64>("tolerance") {
        config.compare.tolerance = tolerance;
    }
    if matches.get_flag("generate_baselines") {
        config.compare.generate_missing = true;
    }

    if matches.get_flag("verbose") {
        config.verbose = true;
    }
    if matches.get_flag("quiet") {
        config.verbose = false;
        config.show_progress = false;
    }

    if let Some(dir) = config.compare.baseline_dir.as_deref() {
        if config.compare.result_dir.is_none() {
            config.compare.result_dir = Some(default_result_dir(&config, dir));
        }
    }

    config.validate()?;
    Ok(config)
}

fn default_result_dir(config: &DisplayConfig, baseline_dir: &Path) -> PathBuf {
    let base = config
        .figure
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("specshow_output"));
    let name = baseline_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("baseline");
    base.join(format!("{name}-results"))
}
