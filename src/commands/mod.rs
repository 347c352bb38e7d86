//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `xrd/`, `utils/`
//! - 子模块: bragg, dspacing, scherrer, extinction, normalize, texture, refine, wavelengths

pub mod bragg;
pub mod dspacing;
pub mod extinction;
pub mod normalize;
pub mod refine;
pub mod scherrer;
pub mod texture;
pub mod wavelengths;

use crate::cli::Commands;
use xrdkit::error::AppResult;

/// 执行命令
pub fn run(cmd: Commands, json: bool) -> AppResult<()> {
    match cmd {
        Commands::Bragg(args) => bragg::execute(args, json),
        Commands::Dspacing(args) => dspacing::execute(args, json),
        Commands::Scherrer(args) => scherrer::execute(args, json),
        Commands::Extinction(args) => extinction::execute(args, json),
        Commands::Normalize(args) => normalize::execute(args, json),
        Commands::Texture(args) => texture::execute(args, json),
        Commands::Refine(args) => refine::execute(args, json),
        Commands::Wavelengths => wavelengths::execute(json),
    }
}
