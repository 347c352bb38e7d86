//! # bragg 命令实现
//!
//! 2θ ⇄ d 换算。
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的 BraggArgs
//! - 使用 `xrd/bragg.rs`

use crate::cli::convert::BraggArgs;
use crate::utils::output;
use xrdkit::error::{AppResult, XrdkitError};
use xrdkit::xrd::BraggConverter;

/// 执行 bragg 命令
pub fn execute(args: BraggArgs, json: bool) -> AppResult<()> {
    let wavelength = args.wavelength.resolve()?;
    let converter = BraggConverter::new(wavelength)?;

    let solution = match (args.two_theta, args.d_spacing) {
        (Some(two_theta), _) => converter.d_from_two_theta(two_theta)?,
        (None, Some(d)) => converter.two_theta_from_d(d)?,
        (None, None) => {
            return Err(XrdkitError::InvalidArgument(
                "one of --two-theta or --d-spacing is required".to_string(),
            ))
        }
    };

    if json {
        return output::print_json(&solution);
    }

    output::print_header("Bragg's Law");
    output::print_info(&format!("Using wavelength: {:.4} Å", solution.wavelength));
    output::print_success(&format!(
        "2θ = {:.4}°  θ = {:.4}°  d = {:.6} Å",
        solution.two_theta,
        solution.two_theta / 2.0,
        solution.d_spacing
    ));
    output::print_advisories(&solution.advisories);

    Ok(())
}
