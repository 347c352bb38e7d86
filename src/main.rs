//! # xrdkit - 粉末衍射数据分析工具
//!
//! 从已指标化的衍射峰列表出发做晶体学计算，统一成单一可执行文件。
//!
//! ## 子命令
//! - `bragg` - 2θ ⇄ d 换算
//! - `dspacing` - 各晶系 d(hkl)
//! - `scherrer` - 晶粒尺寸
//! - `extinction` - 系统消光判别点阵类型
//! - `normalize` - 强度归一化
//! - `texture` - Harris 织构系数
//! - `refine` - 晶格参数精修（支持批量目录）
//! - `wavelengths` - 预定义辐射源
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (批量并行处理)
//!   │     └── xrdkit     (计算库: parsers, models, xrd)
//!   └── utils/      (输出与进度条)
//! ```

mod batch;
mod cli;
mod commands;
mod utils;

use clap::Parser;
use cli::Cli;
use xrdkit::XrdkitError;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = commands::run(cli.command, json) {
        if json {
            print_json_error(&e);
        } else {
            utils::output::print_error(&format!("{}", e));
        }
        std::process::exit(1);
    }
}

/// `--json` 模式下的错误输出
fn print_json_error(error: &XrdkitError) {
    let payload = match error.report() {
        Some(report) => serde_json::to_value(report),
        None => Ok(serde_json::json!({ "error": error.to_string() })),
    };
    match payload.and_then(|v| serde_json::to_string_pretty(&v)) {
        Ok(text) => println!("{}", text),
        Err(_) => utils::output::print_error(&format!("{}", error)),
    }
}
