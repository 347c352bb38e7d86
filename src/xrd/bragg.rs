//! # Bragg 定律换算
//!
//! 衍射角 2θ 与 d 间距互相换算: λ = 2d sinθ。
//!
//! ## 边界处理
//! - λ/(2d) > 1 时不存在实数解，返回 `GEOMETRICALLY_IMPOSSIBLE`，不做截断
//! - 2θ < 1° 时附加 `PRECISION_TOO_LOW` 提示
//! - d 不在 0.5–100 Å 内时照常返回，附加 `UNUSUAL_D_SPACING` 提示
//!
//! ## 依赖关系
//! - 被 `xrd/refinement.rs` 用来构造 1/d² 观测值
//! - 被 `commands/bragg.rs` 和 `commands/dspacing.rs` 调用

use crate::error::{ensure_finite, CrystallographyError, Result};
use crate::models::Advisory;

use serde::Serialize;

/// 合理的 X 射线波长范围 (Å)，下限不含
pub const WAVELENGTH_RANGE: (f64, f64) = (0.1, 10.0);
/// 常见晶面间距范围 (Å)
pub const PLAUSIBLE_D_RANGE: (f64, f64) = (0.5, 100.0);
/// 低于此角度（度）时精度不足
pub const MIN_RELIABLE_TWO_THETA: f64 = 1.0;

/// 一次换算的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BraggSolution {
    /// 衍射角 2θ（度）
    pub two_theta: f64,
    /// d 间距（Å）
    pub d_spacing: f64,
    /// 使用的波长（Å）
    pub wavelength: f64,
    /// 非致命提示
    pub advisories: Vec<Advisory>,
}

/// Bragg 换算器
#[derive(Debug, Clone, Copy)]
pub struct BraggConverter {
    /// X 射线波长（Å）
    wavelength: f64,
}

impl BraggConverter {
    /// 创建换算器，检查 0.1 < λ ≤ 10 Å
    pub fn new(wavelength: f64) -> Result<Self> {
        validate_wavelength(wavelength)?;
        Ok(Self { wavelength })
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// 2θ → d: d = λ / (2 sin(2θ/2))
    pub fn d_from_two_theta(&self, two_theta: f64) -> Result<BraggSolution> {
        ensure_finite("2θ", two_theta)?;
        if two_theta <= 0.0 || two_theta >= 180.0 {
            return Err(CrystallographyError::OutOfRange {
                name: "2θ",
                value: two_theta,
                range: "(0, 180)°",
            });
        }

        let theta = (two_theta / 2.0).to_radians();
        let d_spacing = self.wavelength / (2.0 * theta.sin());

        Ok(self.solution(two_theta, d_spacing))
    }

    /// d → 2θ: 2θ = 2 asin(λ / 2d)
    pub fn two_theta_from_d(&self, d_spacing: f64) -> Result<BraggSolution> {
        ensure_finite("d", d_spacing)?;
        if d_spacing <= 0.0 {
            return Err(CrystallographyError::OutOfRange {
                name: "d",
                value: d_spacing,
                range: "(0, ∞) Å",
            });
        }

        let ratio = self.wavelength / (2.0 * d_spacing);
        if ratio > 1.0 {
            return Err(CrystallographyError::GeometricallyImpossible {
                d_spacing,
                wavelength: self.wavelength,
                ratio,
            });
        }

        let two_theta = 2.0 * ratio.asin().to_degrees();

        Ok(self.solution(two_theta, d_spacing))
    }

    fn solution(&self, two_theta: f64, d_spacing: f64) -> BraggSolution {
        let mut advisories = Vec::new();
        if two_theta < MIN_RELIABLE_TWO_THETA {
            advisories.push(Advisory::PrecisionTooLow { two_theta });
        }
        if d_spacing < PLAUSIBLE_D_RANGE.0 || d_spacing > PLAUSIBLE_D_RANGE.1 {
            advisories.push(Advisory::UnusualDSpacing { d_spacing });
        }
        BraggSolution {
            two_theta,
            d_spacing,
            wavelength: self.wavelength,
            advisories,
        }
    }
}

/// 检查波长在 (0.1, 10] Å 内
pub fn validate_wavelength(wavelength: f64) -> Result<()> {
    ensure_finite("λ", wavelength)?;
    if wavelength <= WAVELENGTH_RANGE.0 || wavelength > WAVELENGTH_RANGE.1 {
        return Err(CrystallographyError::OutOfRange {
            name: "λ",
            value: wavelength,
            range: "(0.1, 10] Å",
        });
    }
    Ok(())
}

/// 2θ（度）→ d（Å）
pub fn d_from_two_theta(two_theta: f64, wavelength: f64) -> Result<BraggSolution> {
    BraggConverter::new(wavelength)?.d_from_two_theta(two_theta)
}

/// d（Å）→ 2θ（度）
pub fn two_theta_from_d(d_spacing: f64, wavelength: f64) -> Result<BraggSolution> {
    BraggConverter::new(wavelength)?.two_theta_from_d(d_spacing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const CU_KA1: f64 = 1.5406;

    #[test]
    fn test_d_from_two_theta_known_value() {
        // Au (111) 附近
        let sol = d_from_two_theta(38.2, CU_KA1).unwrap();
        assert!((sol.d_spacing - 2.354089).abs() < 1e-5);
        assert!(sol.advisories.is_empty());
    }

    #[test]
    fn test_round_trip() {
        for &lambda in &[0.51, 0.7107, 1.5406, 2.291, 2.99] {
            for &d in &[0.51, 1.0, 2.82, 7.5, 30.0, 99.9] {
                if lambda / (2.0 * d) > 1.0 {
                    continue;
                }
                let tt = two_theta_from_d(d, lambda).unwrap().two_theta;
                let back = d_from_two_theta(tt, lambda).unwrap().d_spacing;
                assert!((back - d).abs() < 1e-3, "d={} λ={} -> {}", d, lambda, back);
            }
        }
    }

    #[test]
    fn test_geometrically_impossible() {
        let err = two_theta_from_d(1.0, 5.0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::GeometricallyImpossible);
    }

    #[test]
    fn test_backscatter_limit_is_possible() {
        // λ = 2d 正好对应 2θ = 180°
        let sol = two_theta_from_d(1.0, 2.0).unwrap();
        assert!((sol.two_theta - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_angle_flags_precision() {
        let sol = d_from_two_theta(0.5, CU_KA1).unwrap();
        assert!(sol
            .advisories
            .iter()
            .any(|a| a.code() == "PRECISION_TOO_LOW"));
        // d ≈ 176 Å，同时超出常见范围
        assert!(sol
            .advisories
            .iter()
            .any(|a| a.code() == "UNUSUAL_D_SPACING"));
    }

    #[test]
    fn test_input_validation() {
        assert_eq!(
            d_from_two_theta(0.0, CU_KA1).unwrap_err().code(),
            ErrorCode::OutOfRange
        );
        assert_eq!(
            d_from_two_theta(30.0, 0.1).unwrap_err().code(),
            ErrorCode::OutOfRange
        );
        assert_eq!(
            d_from_two_theta(30.0, 10.5).unwrap_err().code(),
            ErrorCode::OutOfRange
        );
        assert!(d_from_two_theta(30.0, 10.0).is_ok());
        assert_eq!(
            two_theta_from_d(f64::NAN, CU_KA1).unwrap_err().code(),
            ErrorCode::InvalidNumber
        );
        assert_eq!(
            two_theta_from_d(-2.0, CU_KA1).unwrap_err().code(),
            ErrorCode::OutOfRange
        );
    }
}
