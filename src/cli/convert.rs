//! # bragg / dspacing 子命令 CLI 定义
//!
//! 衍射角与晶面间距之间的换算。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/bragg.rs`、`commands/dspacing.rs`

use super::WavelengthArgs;
use clap::{ArgGroup, Args};

// ─────────────────────────────────────────────────────────────
// Bragg 换算
// ─────────────────────────────────────────────────────────────

/// bragg 子命令参数
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("direction").required(true).args(["two_theta", "d_spacing"])))]
pub struct BraggArgs {
    /// Diffraction angle 2θ in degrees (computes d)
    #[arg(long, allow_hyphen_values = true)]
    pub two_theta: Option<f64>,

    /// Interplanar spacing d in Å (computes 2θ)
    #[arg(short, long, allow_hyphen_values = true)]
    pub d_spacing: Option<f64>,

    #[command(flatten)]
    pub wavelength: WavelengthArgs,
}

// ─────────────────────────────────────────────────────────────
// d(hkl) 计算
// ─────────────────────────────────────────────────────────────

/// dspacing 子命令参数
#[derive(Args, Debug)]
pub struct DspacingArgs {
    /// Crystal system (cubic, tetragonal, orthorhombic, hexagonal, monoclinic, triclinic)
    #[arg(short, long)]
    pub system: String,

    /// Miller indices, e.g. "1,1,1", "(2 0 0)" or "110"
    #[arg(long, allow_hyphen_values = true)]
    pub hkl: String,

    /// Lattice parameter a (Å)
    #[arg(short, long, allow_hyphen_values = true)]
    pub a: f64,

    /// Lattice parameter b (Å)
    #[arg(short, long, allow_hyphen_values = true)]
    pub b: Option<f64>,

    /// Lattice parameter c (Å)
    #[arg(short, long, allow_hyphen_values = true)]
    pub c: Option<f64>,

    /// Lattice angle α (degrees, triclinic)
    #[arg(long, allow_hyphen_values = true)]
    pub alpha: Option<f64>,

    /// Lattice angle β (degrees, monoclinic and triclinic)
    #[arg(long, allow_hyphen_values = true)]
    pub beta: Option<f64>,

    /// Lattice angle γ (degrees, triclinic)
    #[arg(long, allow_hyphen_values = true)]
    pub gamma: Option<f64>,

    #[command(flatten)]
    pub wavelength: WavelengthArgs,
}
