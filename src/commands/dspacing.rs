//! # dspacing 命令实现
//!
//! 按晶系公式计算 d(hkl)，并给出当前波长下的衍射角。
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的 DspacingArgs
//! - 使用 `xrd/dspacing.rs`、`xrd/bragg.rs`

use crate::cli::convert::DspacingArgs;
use crate::utils::output;
use xrdkit::error::{AppResult, XrdkitError};
use xrdkit::parsers::parse_hkl_arg;
use xrdkit::xrd::{self, BraggConverter};
use xrdkit::{CrystalSystem, LatticeParameters, MillerIndex};

use serde::Serialize;

/// d(hkl) 计算结果
#[derive(Debug, Serialize)]
struct DspacingReport {
    system: CrystalSystem,
    hkl: MillerIndex,
    lattice: LatticeParameters,
    cell_volume: f64,
    d_spacing: f64,
    wavelength: f64,
    /// 几何上不可衍射时为空
    two_theta: Option<f64>,
}

/// 执行 dspacing 命令
pub fn execute(args: DspacingArgs, json: bool) -> AppResult<()> {
    let system: CrystalSystem = args.system.parse()?;
    let hkl = parse_hkl_arg(&args.hkl)?;
    let lattice = build_lattice(system, &args)?;
    let wavelength = args.wavelength.resolve()?;

    let d = xrd::d_spacing(system, hkl, &lattice)?;
    let bragg = BraggConverter::new(wavelength)?;
    let two_theta = bragg.two_theta_from_d(d).ok().map(|s| s.two_theta);

    let report = DspacingReport {
        system,
        hkl,
        lattice,
        cell_volume: lattice.volume(),
        d_spacing: d,
        wavelength,
        two_theta,
    };

    if json {
        return output::print_json(&report);
    }

    output::print_header(&format!("d-spacing ({} system)", system));
    output::print_info(&format!(
        "a = {:.4} Å, b = {:.4} Å, c = {:.4} Å, α = {:.2}°, β = {:.2}°, γ = {:.2}°",
        lattice.a, lattice.b, lattice.c, lattice.alpha, lattice.beta, lattice.gamma
    ));
    output::print_info(&format!("Cell volume: {:.4} Å³", report.cell_volume));
    output::print_success(&format!("d{} = {:.6} Å", hkl, d));
    match two_theta {
        Some(tt) => output::print_success(&format!(
            "2θ = {:.4}° at λ = {:.4} Å",
            tt, wavelength
        )),
        None => output::print_warning(&format!(
            "{} cannot diffract at λ = {:.4} Å (λ / 2d > 1)",
            hkl, wavelength
        )),
    }

    Ok(())
}

/// 由晶系和命令行参数组装晶格参数
fn build_lattice(system: CrystalSystem, args: &DspacingArgs) -> AppResult<LatticeParameters> {
    let need = |value: Option<f64>, flag: &str| {
        value.ok_or_else(|| {
            XrdkitError::InvalidArgument(format!(
                "--{} is required for the {} system",
                flag, system
            ))
        })
    };

    let lattice = match system {
        CrystalSystem::Cubic => LatticeParameters::cubic(args.a)?,
        CrystalSystem::Tetragonal => LatticeParameters::tetragonal(args.a, need(args.c, "c")?)?,
        CrystalSystem::Hexagonal => LatticeParameters::hexagonal(args.a, need(args.c, "c")?)?,
        CrystalSystem::Orthorhombic => LatticeParameters::orthorhombic(
            args.a,
            need(args.b, "b")?,
            need(args.c, "c")?,
        )?,
        CrystalSystem::Monoclinic => LatticeParameters::monoclinic(
            args.a,
            need(args.b, "b")?,
            need(args.c, "c")?,
            need(args.beta, "beta")?,
        )?,
        CrystalSystem::Triclinic => LatticeParameters::triclinic(
            args.a,
            need(args.b, "b")?,
            need(args.c, "c")?,
            need(args.alpha, "alpha")?,
            need(args.beta, "beta")?,
            need(args.gamma, "gamma")?,
        )?,
    };

    Ok(lattice)
}
