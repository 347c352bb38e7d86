//! # Scherrer 晶粒尺寸估算
//!
//! D = Kλ / (β cosθ)，β 为弧度制的 FWHM，结果从 Å 换算为 nm。
//!
//! 未做仪器展宽扣除，也不区分应变展宽（Williamson–Hall 分析不在此范围），
//! 这两类情况只以提示形式告知调用方。
//!
//! ## 依赖关系
//! - 被 `commands/scherrer.rs` 调用
//! - 使用 `xrd/bragg.rs` 的波长校验

use crate::error::{ensure_finite, CrystallographyError, Result};
use crate::models::Advisory;
use crate::xrd::bragg::validate_wavelength;

use serde::Serialize;

/// 默认形状因子（球形晶粒）
pub const DEFAULT_SHAPE_FACTOR: f64 = 0.9;
/// 形状因子允许范围
pub const SHAPE_FACTOR_RANGE: (f64, f64) = (0.89, 1.0);
/// FWHM 上限（度）
pub const MAX_FWHM: f64 = 10.0;
/// 超过此 FWHM（度）时提示可能存在应变展宽
pub const STRAIN_FWHM_THRESHOLD: f64 = 0.5;
/// Scherrer 方程有效尺寸范围 (nm)
pub const RELIABLE_SIZE_RANGE: (f64, f64) = (3.0, 200.0);

/// 晶粒尺寸估算结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrystalliteSize {
    /// 平均晶粒尺寸（nm）
    pub size_nm: f64,
    /// 平均晶粒尺寸（Å）
    pub size_angstrom: f64,
    /// Bragg 角 θ（度）
    pub theta: f64,
    /// FWHM（弧度）
    pub beta_rad: f64,
    /// 使用的形状因子
    pub shape_factor: f64,
    /// 非致命提示
    pub advisories: Vec<Advisory>,
}

/// 估算晶粒尺寸
///
/// `fwhm` 与 `two_theta` 单位为度，`wavelength` 单位为 Å。
pub fn crystallite_size(
    fwhm: f64,
    two_theta: f64,
    wavelength: f64,
    shape_factor: f64,
) -> Result<CrystalliteSize> {
    ensure_finite("FWHM", fwhm)?;
    ensure_finite("2θ", two_theta)?;
    ensure_finite("K", shape_factor)?;
    validate_wavelength(wavelength)?;

    if fwhm <= 0.0 || fwhm > MAX_FWHM {
        return Err(CrystallographyError::OutOfRange {
            name: "FWHM",
            value: fwhm,
            range: "(0, 10]°",
        });
    }
    if two_theta <= 0.0 || two_theta >= 180.0 {
        return Err(CrystallographyError::OutOfRange {
            name: "2θ",
            value: two_theta,
            range: "(0, 180)°",
        });
    }
    if shape_factor < SHAPE_FACTOR_RANGE.0 || shape_factor > SHAPE_FACTOR_RANGE.1 {
        return Err(CrystallographyError::OutOfRange {
            name: "K",
            value: shape_factor,
            range: "[0.89, 1.0]",
        });
    }

    let theta = two_theta / 2.0;
    let beta_rad = fwhm.to_radians();
    let size_angstrom = shape_factor * wavelength / (beta_rad * theta.to_radians().cos());
    let size_nm = size_angstrom / 10.0;

    let mut advisories = Vec::new();
    if size_nm < RELIABLE_SIZE_RANGE.0 {
        advisories.push(Advisory::SizeBelowLimit { size_nm });
    } else if size_nm > RELIABLE_SIZE_RANGE.1 {
        advisories.push(Advisory::SizeAboveLimit { size_nm });
    }
    if fwhm > STRAIN_FWHM_THRESHOLD {
        advisories.push(Advisory::StrainBroadening { fwhm });
    }

    Ok(CrystalliteSize {
        size_nm,
        size_angstrom,
        theta,
        beta_rad,
        shape_factor,
        advisories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_reference_value() {
        let result = crystallite_size(0.3, 25.0, 1.5406, DEFAULT_SHAPE_FACTOR).unwrap();
        assert!((result.size_nm - 27.12).abs() < 0.005);
        assert!((result.size_angstrom - 10.0 * result.size_nm).abs() < 1e-12);
        assert!(result.advisories.is_empty());
    }

    #[test]
    fn test_inverse_fwhm_relationship() {
        let a = crystallite_size(0.3, 25.0, 1.5406, 0.9).unwrap();
        let b = crystallite_size(0.15, 25.0, 1.5406, 0.9).unwrap();
        assert!((b.size_nm / a.size_nm - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_advisories() {
        let large = crystallite_size(0.03, 25.0, 1.5406, 0.9).unwrap();
        assert_eq!(large.advisories.len(), 1);
        assert_eq!(large.advisories[0].code(), "SIZE_ABOVE_LIMIT");

        let broad = crystallite_size(2.0, 25.0, 1.5406, 0.9).unwrap();
        let codes: Vec<&str> = broad.advisories.iter().map(|a| a.code()).collect();
        assert_eq!(codes, vec!["STRAIN_BROADENING"]);

        let tiny = crystallite_size(5.0, 25.0, 1.5406, 0.9).unwrap();
        let codes: Vec<&str> = tiny.advisories.iter().map(|a| a.code()).collect();
        assert_eq!(codes, vec!["SIZE_BELOW_LIMIT", "STRAIN_BROADENING"]);
    }

    #[test]
    fn test_bounds() {
        let cases = [
            (0.0, 25.0, 1.5406, 0.9),
            (10.5, 25.0, 1.5406, 0.9),
            (0.3, 180.0, 1.5406, 0.9),
            (0.3, 25.0, 1.5406, 0.8),
            (0.3, 25.0, 1.5406, 1.05),
            (0.3, 25.0, 0.05, 0.9),
        ];
        for (fwhm, tt, lambda, k) in cases {
            assert_eq!(
                crystallite_size(fwhm, tt, lambda, k).unwrap_err().code(),
                ErrorCode::OutOfRange,
                "fwhm={} 2θ={} λ={} K={}",
                fwhm,
                tt,
                lambda,
                k
            );
        }
        assert_eq!(
            crystallite_size(f64::NAN, 25.0, 1.5406, 0.9)
                .unwrap_err()
                .code(),
            ErrorCode::InvalidNumber
        );
    }
}
