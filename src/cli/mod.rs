//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `bragg`, `dspacing`: 角度与晶面间距换算
//! - `scherrer`, `extinction`, `normalize`, `texture`: 峰列表分析
//! - `refine`: 晶格参数精修（单文件或批量目录）
//! - `wavelengths`: 列出预定义辐射源
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert, analyze, refine

pub mod analyze;
pub mod convert;
pub mod refine;

use xrdkit::error::{AppResult, XrdkitError};
use xrdkit::xrd::wavelength::{find_source, known_source_names};

use clap::{Args, Parser, Subcommand};

/// xrdkit - 粉末衍射数据分析工具
#[derive(Parser)]
#[command(name = "xrdkit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Crystallographic analysis of powder diffraction peak lists", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert between diffraction angle 2θ and d-spacing (Bragg's law)
    Bragg(convert::BraggArgs),

    /// Compute the d-spacing of an (hkl) plane for a given lattice
    Dspacing(convert::DspacingArgs),

    /// Estimate crystallite size from peak broadening (Scherrer equation)
    Scherrer(analyze::ScherrerArgs),

    /// Identify lattice centerings consistent with observed reflections
    Extinction(analyze::ExtinctionArgs),

    /// Normalize peak intensities to the strongest peak
    Normalize(analyze::NormalizeArgs),

    /// Compute Harris texture coefficients against a reference pattern
    Texture(analyze::TextureArgs),

    /// Refine lattice parameters from indexed peak positions
    Refine(refine::RefineArgs),

    /// List predefined X-ray radiation sources
    Wavelengths,
}

// ─────────────────────────────────────────────────────────────
// 共享参数
// ─────────────────────────────────────────────────────────────

/// 波长参数
#[derive(Args, Debug, Clone)]
pub struct WavelengthArgs {
    /// X-ray wavelength: radiation source name (cu-ka1, mo-ka, ...) or value in Å (e.g., 1.5406)
    #[arg(
        short,
        long,
        env = "XRDKIT_WAVELENGTH",
        default_value = "cu-ka1",
        allow_hyphen_values = true
    )]
    pub wavelength: String,
}

impl WavelengthArgs {
    /// 解析为 Å
    pub fn resolve(&self) -> AppResult<f64> {
        parse_wavelength(&self.wavelength)
    }
}

/// 解析波长输入（辐射源名称或数值）
pub fn parse_wavelength(input: &str) -> AppResult<f64> {
    // 先尝试解析为预定义辐射源
    if let Some(source) = find_source(input) {
        return Ok(source.wavelength);
    }
    // 再尝试解析为数值，范围由计算层检查
    input
        .trim()
        .parse::<f64>()
        .map_err(|_| XrdkitError::InvalidWavelength {
            input: input.to_string(),
            known: known_source_names(),
        })
}
