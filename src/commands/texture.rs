//! # texture 命令实现
//!
//! 相对标准图谱计算 Harris 织构系数。
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的 TextureArgs
//! - 使用 `parsers/peaks.rs` 读取峰列表
//! - 使用 `xrd/texture.rs`、`xrd/export.rs`

use crate::cli::analyze::TextureArgs;
use crate::utils::output;
use xrdkit::error::AppResult;
use xrdkit::parsers::parse_peak_file;
use xrdkit::xrd::{self, texture_coefficients};

use tabled::{Table, Tabled};

#[derive(Tabled)]
struct TextureRow {
    #[tabled(rename = "(hkl)")]
    hkl: String,
    #[tabled(rename = "I/I₀")]
    ratio: String,
    #[tabled(rename = "TC")]
    coefficient: String,
    #[tabled(rename = "Orientation")]
    orientation: String,
}

/// 执行 texture 命令
pub fn execute(args: TextureArgs, json: bool) -> AppResult<()> {
    let table = parse_peak_file(&args.input)?;
    let peaks = table.texture_peaks()?;
    let analysis = texture_coefficients(&peaks)?;

    if let Some(ref path) = args.output {
        xrd::export::texture_to_csv(&analysis, path)?;
    }

    if json {
        return output::print_json(&analysis);
    }

    output::print_header("Harris Texture Coefficients");
    output::print_info(&format!(
        "Loaded {} peaks from '{}'",
        peaks.len(),
        args.input.display()
    ));

    let rows: Vec<TextureRow> = analysis
        .coefficients
        .iter()
        .map(|tc| TextureRow {
            hkl: tc.hkl.to_string(),
            ratio: format!("{:.4}", tc.ratio),
            coefficient: format!("{:.3}", tc.coefficient),
            orientation: tc.orientation.to_string(),
        })
        .collect();
    println!("{}", Table::new(&rows));

    output::print_success(&format!(
        "Texture index {:.4} ({}), dominant orientation {}",
        analysis.texture_index, analysis.level, analysis.dominant
    ));
    if let Some(ref path) = args.output {
        output::print_done(&format!("Texture coefficients saved to '{}'", path.display()));
    }

    Ok(())
}
