//! anchor-redact CLI
//!
//! 渲染 PDF → 远程 OCR → 锚点条带涂黑 → 重组输出 PDF。

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use anchor_redact::config::{self, RedactConfig};
use anchor_redact::pipeline;

#[derive(Parser)]
#[command(name = "anchor-redact")]
#[command(version)]
#[command(about = "基于锚点文本定位的 PDF 整行脱敏工具", long_about = None)]
struct Cli {
    /// 输入 PDF 文件
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// 输出目录
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// 渲染 DPI
    #[arg(long)]
    dpi: Option<u32>,

    /// 条带规则文件（JSON），缺省使用内置规则
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// 配置文件（JSON）
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn build_config(cli: &Cli) -> anyhow::Result<RedactConfig> {
    let mut config = RedactConfig::new(cli.input.clone());

    if let Some(path) = &cli.config {
        let file = config::load_file_config(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        if let Some(out_dir) = file.out_dir {
            config.out_dir = PathBuf::from(out_dir);
        }
        if let Some(dpi) = file.dpi {
            config.dpi = dpi;
        }
        if let Some(rules) = file.rules {
            config.rules = rules;
        }
        if let Some(ocr) = file.ocr {
            config.ocr = ocr;
        }
    }

    if let Some(path) = &cli.rules {
        config.rules = config::load_rule_file(path)
            .with_context(|| format!("读取规则文件失败: {}", path.display()))?;
    }

    if let Some(out_dir) = &cli.out_dir {
        config.out_dir = out_dir.clone();
    }
    if let Some(dpi) = cli.dpi {
        config.dpi = dpi;
    }

    config.ocr.apply_env();

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    log::info!(
        "[Main] 输入: {}，输出目录: {}，DPI: {}，规则数: {}",
        config.input_path.display(),
        config.out_dir.display(),
        config.dpi,
        config.rules.rules.len()
    );

    let output_pdf = pipeline::run(&config).context("脱敏流水线失败")?;
    log::info!("[Main] 脱敏 PDF 已生成: {}", output_pdf.display());

    Ok(())
}
