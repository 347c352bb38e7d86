//! # scherrer 命令实现
//!
//! 由峰宽估算晶粒尺寸。
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的 ScherrerArgs
//! - 使用 `xrd/scherrer.rs`

use crate::cli::analyze::ScherrerArgs;
use crate::utils::output;
use xrdkit::error::AppResult;
use xrdkit::xrd::crystallite_size;

use tabled::{Table, Tabled};

#[derive(Tabled)]
struct QuantityRow {
    #[tabled(rename = "Quantity")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// 执行 scherrer 命令
pub fn execute(args: ScherrerArgs, json: bool) -> AppResult<()> {
    let wavelength = args.wavelength.resolve()?;
    let size = crystallite_size(args.fwhm, args.two_theta, wavelength, args.shape_factor)?;

    if json {
        return output::print_json(&size);
    }

    output::print_header("Scherrer Crystallite Size");
    output::print_info(&format!("Using wavelength: {:.4} Å", wavelength));

    let rows = vec![
        QuantityRow {
            name: "FWHM β",
            value: format!("{:.4}° ({:.6} rad)", args.fwhm, size.beta_rad),
        },
        QuantityRow {
            name: "Bragg angle θ",
            value: format!("{:.4}°", size.theta),
        },
        QuantityRow {
            name: "Shape factor K",
            value: format!("{:.3}", size.shape_factor),
        },
        QuantityRow {
            name: "Size",
            value: format!("{:.2} nm ({:.1} Å)", size.size_nm, size.size_angstrom),
        },
    ];
    println!("{}", Table::new(&rows));

    output::print_success(&format!("Crystallite size: {:.2} nm", size.size_nm));
    output::print_advisories(&size.advisories);

    Ok(())
}
