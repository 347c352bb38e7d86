//! # 晶面间距公式
//!
//! 各晶系 d(hkl) 的闭式公式:
//! - 立方: d = a / √(h²+k²+l²)
//! - 四方: 1/d² = (h²+k²)/a² + l²/c²
//! - 正交: 1/d² = h²/a² + k²/b² + l²/c²
//! - 六方: 1/d² = (4/3)(h²+hk+k²)/a² + l²/c²
//! - 单斜（b 唯一轴）: 1/d² = (h²/a² + k²sin²β/b² + l²/c² − 2hl cosβ/(ac)) / sin²β
//! - 三斜: d = 1 / |h a* + k b* + l c*|
//!
//! 只读取对应晶系需要的参数，例如立方晶系只用 `a`。
//!
//! ## 依赖关系
//! - 被 `xrd/refinement.rs` 用来计算精修后的 d 值
//! - 使用 `models/lattice.rs` 的 LatticeParameters

use crate::error::Result;
use crate::models::{CrystalSystem, LatticeParameters, MillerIndex};

/// 计算 1/d² (Å⁻²)
pub fn inverse_d_squared(
    system: CrystalSystem,
    hkl: MillerIndex,
    lattice: &LatticeParameters,
) -> Result<f64> {
    hkl.validate()?;
    lattice.validate()?;

    let (h, k, l) = hkl.as_f64();
    let LatticeParameters { a, b, c, .. } = *lattice;

    let value = match system {
        CrystalSystem::Cubic => (h * h + k * k + l * l) / (a * a),
        CrystalSystem::Tetragonal => (h * h + k * k) / (a * a) + l * l / (c * c),
        CrystalSystem::Orthorhombic => h * h / (a * a) + k * k / (b * b) + l * l / (c * c),
        CrystalSystem::Hexagonal => {
            4.0 / 3.0 * (h * h + h * k + k * k) / (a * a) + l * l / (c * c)
        }
        CrystalSystem::Monoclinic => {
            let beta = lattice.beta.to_radians();
            let sin2 = beta.sin().powi(2);
            (h * h / (a * a) + k * k * sin2 / (b * b) + l * l / (c * c)
                - 2.0 * h * l * beta.cos() / (a * c))
                / sin2
        }
        CrystalSystem::Triclinic => {
            let recip = lattice.reciprocal_matrix();
            let g: [f64; 3] =
                std::array::from_fn(|i| h * recip[0][i] + k * recip[1][i] + l * recip[2][i]);
            g.iter().map(|x| x * x).sum()
        }
    };

    Ok(value)
}

/// 计算 d(hkl) (Å)
pub fn d_spacing(
    system: CrystalSystem,
    hkl: MillerIndex,
    lattice: &LatticeParameters,
) -> Result<f64> {
    if system == CrystalSystem::Cubic {
        hkl.validate()?;
        lattice.validate()?;
        return Ok(lattice.a / (hkl.sum_of_squares() as f64).sqrt());
    }
    Ok(1.0 / inverse_d_squared(system, hkl, lattice)?.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn hkl(h: i32, k: i32, l: i32) -> MillerIndex {
        MillerIndex::new(h, k, l).unwrap()
    }

    #[test]
    fn test_cubic() {
        let lattice = LatticeParameters::cubic(5.64).unwrap();
        let d = d_spacing(CrystalSystem::Cubic, hkl(2, 0, 0), &lattice).unwrap();
        assert!((d - 2.82).abs() < 1e-12);
    }

    #[test]
    fn test_tetragonal_and_orthorhombic_agree() {
        let tet = LatticeParameters::tetragonal(4.59, 2.96).unwrap();
        let ortho = LatticeParameters::orthorhombic(4.59, 4.59, 2.96).unwrap();
        for idx in [hkl(1, 1, 0), hkl(1, 0, 1), hkl(2, 1, 1)] {
            let d1 = d_spacing(CrystalSystem::Tetragonal, idx, &tet).unwrap();
            let d2 = d_spacing(CrystalSystem::Orthorhombic, idx, &ortho).unwrap();
            assert!((d1 - d2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hexagonal() {
        // ZnO (100): d = a·√3/2
        let lattice = LatticeParameters::hexagonal(3.25, 5.21).unwrap();
        let d = d_spacing(CrystalSystem::Hexagonal, hkl(1, 0, 0), &lattice).unwrap();
        assert!((d - 3.25 * 3.0_f64.sqrt() / 2.0).abs() < 1e-12);
        let d002 = d_spacing(CrystalSystem::Hexagonal, hkl(0, 0, 2), &lattice).unwrap();
        assert!((d002 - 2.605).abs() < 1e-12);
    }

    #[test]
    fn test_monoclinic_reduces_to_orthorhombic_at_90() {
        let mono = LatticeParameters::monoclinic(5.1, 6.2, 7.3, 90.0).unwrap();
        let ortho = LatticeParameters::orthorhombic(5.1, 6.2, 7.3).unwrap();
        let idx = hkl(1, 2, 3);
        let d1 = d_spacing(CrystalSystem::Monoclinic, idx, &mono).unwrap();
        let d2 = d_spacing(CrystalSystem::Orthorhombic, idx, &ortho).unwrap();
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_triclinic_matches_specialised_formulas() {
        let mono = LatticeParameters::monoclinic(5.1, 6.2, 7.3, 103.5).unwrap();
        let hex = LatticeParameters::hexagonal(3.25, 5.21).unwrap();
        for idx in [hkl(1, 0, 1), hkl(-1, 0, 1), hkl(2, 1, -3)] {
            let d_mono = d_spacing(CrystalSystem::Monoclinic, idx, &mono).unwrap();
            let d_tri = d_spacing(CrystalSystem::Triclinic, idx, &mono).unwrap();
            assert!((d_mono - d_tri).abs() < 1e-9, "{}: {} vs {}", idx, d_mono, d_tri);

            let d_hex = d_spacing(CrystalSystem::Hexagonal, idx, &hex).unwrap();
            let d_tri = d_spacing(CrystalSystem::Triclinic, idx, &hex).unwrap();
            assert!((d_hex - d_tri).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rejects_zero_indices() {
        let lattice = LatticeParameters::cubic(4.0).unwrap();
        let zero = MillerIndex { h: 0, k: 0, l: 0 };
        assert_eq!(
            d_spacing(CrystalSystem::Cubic, zero, &lattice)
                .unwrap_err()
                .code(),
            ErrorCode::InvalidMillerIndices
        );
    }

    #[test]
    fn test_rejects_non_positive_lattice() {
        let bad = LatticeParameters {
            a: 0.0,
            b: 1.0,
            c: 1.0,
            alpha: 90.0,
            beta: 90.0,
            gamma: 90.0,
        };
        assert_eq!(
            d_spacing(CrystalSystem::Tetragonal, hkl(1, 0, 0), &bad)
                .unwrap_err()
                .code(),
            ErrorCode::OutOfRange
        );
    }
}
