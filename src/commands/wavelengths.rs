//! # wavelengths 命令实现
//!
//! 列出预定义辐射源。
//!
//! ## 依赖关系
//! - 使用 `xrd/wavelength.rs` 的 RADIATION_SOURCES

use crate::utils::output;
use xrdkit::error::AppResult;
use xrdkit::xrd::RADIATION_SOURCES;

use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "Source")]
    name: &'static str,
    #[tabled(rename = "λ (Å)")]
    wavelength: String,
    #[tabled(rename = "Names accepted")]
    keys: String,
}

/// 执行 wavelengths 命令
pub fn execute(json: bool) -> AppResult<()> {
    if json {
        return output::print_json(RADIATION_SOURCES);
    }

    output::print_header("Radiation Sources");
    let rows: Vec<SourceRow> = RADIATION_SOURCES
        .iter()
        .map(|s| SourceRow {
            name: s.name,
            wavelength: format!("{:.4}", s.wavelength),
            keys: s.keys.join(", "),
        })
        .collect();
    println!("{}", Table::new(&rows));
    output::print_info("Set XRDKIT_WAVELENGTH to change the default (cu-ka1)");

    Ok(())
}
