//! # refine 子命令 CLI 定义
//!
//! 由已指标化的峰位精修晶格参数，支持单文件和批量目录。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/refine.rs`

use super::WavelengthArgs;
use clap::Args;
use std::path::PathBuf;

/// refine 子命令参数
#[derive(Args, Debug)]
pub struct RefineArgs {
    /// Input: peak list file or directory containing peak list files
    pub input: PathBuf,

    /// Crystal system (cubic, tetragonal, hexagonal, orthorhombic)
    #[arg(short, long)]
    pub system: String,

    #[command(flatten)]
    pub wavelength: WavelengthArgs,

    /// Output: residual CSV file (single mode) or directory (batch mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Parity plot of d_obs vs d_calc (.png or .svg); in batch mode only the extension is used
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 900)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot (default: input file name)
    #[arg(long)]
    pub title: Option<String>,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files (batch mode, e.g., "*.csv,*.txt")
    #[arg(long, default_value = "*.csv")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
