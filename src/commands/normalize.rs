//! # normalize 命令实现
//!
//! 将峰强度归一化为最强峰的百分比。
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的 NormalizeArgs
//! - 使用 `parsers/peaks.rs` 读取峰列表
//! - 使用 `xrd/intensity.rs`、`xrd/export.rs`

use crate::cli::analyze::NormalizeArgs;
use crate::utils::output;
use xrdkit::error::AppResult;
use xrdkit::parsers::parse_peak_file;
use xrdkit::xrd::{self, normalize_intensities};

use tabled::{Table, Tabled};

#[derive(Tabled)]
struct IntensityRow {
    #[tabled(rename = "(hkl)")]
    hkl: String,
    #[tabled(rename = "I")]
    intensity: String,
    #[tabled(rename = "I/I₀ (%)")]
    relative: String,
}

/// 执行 normalize 命令
pub fn execute(args: NormalizeArgs, json: bool) -> AppResult<()> {
    let table = parse_peak_file(&args.input)?;
    let peaks = table.intensities()?;
    let pattern = normalize_intensities(&peaks)?;

    if let Some(ref path) = args.output {
        xrd::export::normalized_to_csv(&pattern, path)?;
    }

    if json {
        return output::print_json(&pattern);
    }

    output::print_header("Relative Intensities");
    output::print_info(&format!(
        "Loaded {} peaks from '{}'",
        peaks.len(),
        args.input.display()
    ));

    let rows: Vec<IntensityRow> = pattern
        .peaks
        .iter()
        .map(|p| IntensityRow {
            hkl: p.hkl.to_string(),
            intensity: format!("{:.1}", p.intensity),
            relative: format!("{:.2}", p.relative_percent),
        })
        .collect();
    println!("{}", Table::new(&rows));

    output::print_success(&format!(
        "Strongest peak {} (I = {:.1}), total intensity {:.1}",
        pattern.strongest, pattern.max_intensity, pattern.total_intensity
    ));
    if let Some(ref path) = args.output {
        output::print_done(&format!("Normalized table saved to '{}'", path.display()));
    }

    Ok(())
}
