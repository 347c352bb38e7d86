//! # extinction 命令实现
//!
//! 由观测到的反射判断可能的点阵类型。
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的 ExtinctionArgs
//! - 使用 `parsers/peaks.rs` 读取峰列表
//! - 使用 `xrd/extinction.rs`

use crate::cli::analyze::ExtinctionArgs;
use crate::utils::output;
use xrdkit::error::AppResult;
use xrdkit::parsers::{parse_hkl_arg, parse_peak_file};
use xrdkit::xrd::classify_extinctions;
use xrdkit::MillerIndex;

use tabled::{Table, Tabled};

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "Symbol")]
    symbol: &'static str,
    #[tabled(rename = "Lattice")]
    name: &'static str,
    #[tabled(rename = "Reflection condition")]
    rule: &'static str,
    #[tabled(rename = "Examples")]
    examples: String,
}

/// 执行 extinction 命令
pub fn execute(args: ExtinctionArgs, json: bool) -> AppResult<()> {
    let mut reflections: Vec<MillerIndex> = args
        .hkl
        .iter()
        .map(|s| parse_hkl_arg(s))
        .collect::<AppResult<_>>()?;

    if let Some(ref path) = args.input {
        reflections.extend(parse_peak_file(path)?.miller_indices());
    }

    let verdict = classify_extinctions(&reflections)?;

    if json {
        return output::print_json(&verdict);
    }

    output::print_header("Systematic Absence Analysis");
    if reflections.is_empty() {
        output::print_warning("No reflections given; only the primitive lattice can be reported");
    } else {
        output::print_info(&format!(
            "Tested {} reflections: {}",
            verdict.reflections_tested,
            reflections
                .iter()
                .map(|hkl| hkl.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }

    let rows: Vec<CandidateRow> = verdict
        .candidates
        .iter()
        .map(|c| CandidateRow {
            symbol: c.symbol,
            name: c.name,
            rule: c.rule,
            examples: c.example_space_groups.join(", "),
        })
        .collect();
    println!("{}", Table::new(&rows));

    output::print_success(&format!(
        "Consistent lattice types: {}",
        verdict
            .candidates
            .iter()
            .map(|c| c.symbol)
            .collect::<Vec<_>>()
            .join(", ")
    ));
    output::print_warning(verdict.caveat);

    Ok(())
}
