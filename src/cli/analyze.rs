//! # 峰列表分析子命令 CLI 定义
//!
//! - `scherrer`: 晶粒尺寸估算
//! - `extinction`: 系统消光判别点阵类型
//! - `normalize`: 强度归一化
//! - `texture`: Harris 织构系数
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/` 相应模块

use super::WavelengthArgs;
use clap::Args;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Scherrer 晶粒尺寸
// ─────────────────────────────────────────────────────────────

/// scherrer 子命令参数
#[derive(Args, Debug)]
pub struct ScherrerArgs {
    /// Peak full width at half maximum in degrees 2θ (instrument broadening removed)
    #[arg(long, allow_hyphen_values = true)]
    pub fwhm: f64,

    /// Peak position 2θ in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub two_theta: f64,

    /// Scherrer shape factor K (0.89 - 1.0)
    #[arg(short = 'k', long, default_value_t = xrdkit::xrd::DEFAULT_SHAPE_FACTOR)]
    pub shape_factor: f64,

    #[command(flatten)]
    pub wavelength: WavelengthArgs,
}

// ─────────────────────────────────────────────────────────────
// 系统消光
// ─────────────────────────────────────────────────────────────

/// extinction 子命令参数
#[derive(Args, Debug)]
pub struct ExtinctionArgs {
    /// Observed reflection, e.g. "1,1,0" (repeatable)
    #[arg(long, allow_hyphen_values = true)]
    pub hkl: Vec<String>,

    /// Peak list file (CSV with h,k,l or hkl columns)
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// 强度归一化
// ─────────────────────────────────────────────────────────────

/// normalize 子命令参数
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Peak list file (CSV with hkl and intensity columns)
    pub input: PathBuf,

    /// Write the normalized table to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// 织构分析
// ─────────────────────────────────────────────────────────────

/// texture 子命令参数
#[derive(Args, Debug)]
pub struct TextureArgs {
    /// Peak list file (CSV with hkl, observed and standard columns)
    pub input: PathBuf,

    /// Write the texture coefficients to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
