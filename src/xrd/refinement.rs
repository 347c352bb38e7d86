//! # 晶格参数最小二乘精修
//!
//! 由指标化的衍射峰拟合晶格常数。
//!
//! ## 算法概述
//! 1. 用 Bragg 定律把每个 2θ 换算为 d，得到观测值 y = 1/d²；几何上无效的峰被丢弃
//! 2. 各晶系的 1/d² 对"形状变量"是线性的:
//!    - 立方: x = h²+k²+l²，y = x/a²
//!    - 四方: x₁ = h²+k², x₂ = l²
//!    - 六方: x₁ = h²+hk+k², x₂ = l²（4/3 因子并入拟合系数）
//!    - 正交: x₁ = h², x₂ = k², x₃ = l²
//! 3. 立方晶系用两点最小二乘斜率公式，其余晶系用正规方程的 Cramer 法则闭式求解
//! 4. 系数 ≤ 0 → `NEGATIVE_PARAMETER`；|det| < 1e-10 → `FIT_FAILED`
//! 5. 在同一线性化观测上计算 R²
//!
//! 单斜/三斜晶系需要非线性拟合角度参数，直接返回错误并建议使用全谱精修软件。
//!
//! ## 依赖关系
//! - 使用 `xrd/bragg.rs` 构造观测值
//! - 使用 `xrd/dspacing.rs` 计算精修后的 d 值
//! - 被 `commands/refine.rs` 调用

use crate::error::{CrystallographyError, Result, FULL_PATTERN_RECOMMENDATION};
use crate::models::{Advisory, CrystalSystem, DiffractionPeak, LatticeParameters, MillerIndex};
use crate::xrd::bragg::BraggConverter;
use crate::xrd::dspacing;

use serde::Serialize;
use std::fmt;

/// 正规方程行列式的奇异阈值
pub const SINGULAR_TOLERANCE: f64 = 1e-10;

/// 拟合质量分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitQuality {
    Excellent,
    Good,
    Fair,
}

impl FitQuality {
    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared > 0.99 {
            FitQuality::Excellent
        } else if r_squared > 0.95 {
            FitQuality::Good
        } else {
            FitQuality::Fair
        }
    }
}

impl fmt::Display for FitQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitQuality::Excellent => write!(f, "excellent"),
            FitQuality::Good => write!(f, "good"),
            FitQuality::Fair => write!(f, "fair"),
        }
    }
}

/// 精修得到的晶格参数（仅含该晶系的独立参数）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "system", rename_all = "lowercase")]
pub enum RefinedLattice {
    Cubic { a: f64 },
    Tetragonal { a: f64, c: f64 },
    Hexagonal { a: f64, c: f64 },
    Orthorhombic { a: f64, b: f64, c: f64 },
}

impl RefinedLattice {
    pub fn system(&self) -> CrystalSystem {
        match self {
            RefinedLattice::Cubic { .. } => CrystalSystem::Cubic,
            RefinedLattice::Tetragonal { .. } => CrystalSystem::Tetragonal,
            RefinedLattice::Hexagonal { .. } => CrystalSystem::Hexagonal,
            RefinedLattice::Orthorhombic { .. } => CrystalSystem::Orthorhombic,
        }
    }

    /// 转换为完整晶格参数
    pub fn to_parameters(&self) -> Result<LatticeParameters> {
        match *self {
            RefinedLattice::Cubic { a } => LatticeParameters::cubic(a),
            RefinedLattice::Tetragonal { a, c } => LatticeParameters::tetragonal(a, c),
            RefinedLattice::Hexagonal { a, c } => LatticeParameters::hexagonal(a, c),
            RefinedLattice::Orthorhombic { a, b, c } => LatticeParameters::orthorhombic(a, b, c),
        }
    }

    /// 晶胞体积 (Å³)
    pub fn volume(&self) -> f64 {
        match *self {
            RefinedLattice::Cubic { a } => a * a * a,
            RefinedLattice::Tetragonal { a, c } => a * a * c,
            RefinedLattice::Hexagonal { a, c } => 3.0_f64.sqrt() / 2.0 * a * a * c,
            RefinedLattice::Orthorhombic { a, b, c } => a * b * c,
        }
    }

    /// 参数名与数值，按 a, b, c 顺序
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        match *self {
            RefinedLattice::Cubic { a } => vec![("a", a)],
            RefinedLattice::Tetragonal { a, c } | RefinedLattice::Hexagonal { a, c } => {
                vec![("a", a), ("c", c)]
            }
            RefinedLattice::Orthorhombic { a, b, c } => vec![("a", a), ("b", b), ("c", c)],
        }
    }
}

/// 单峰残差
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakResidual {
    pub hkl: MillerIndex,
    pub two_theta_obs: f64,
    pub two_theta_calc: Option<f64>,
    pub d_obs: f64,
    pub d_calc: f64,
}

impl PeakResidual {
    /// d_obs − d_calc (Å)
    pub fn delta_d(&self) -> f64 {
        self.d_obs - self.d_calc
    }

    /// 2θ_obs − 2θ_calc（度）
    pub fn delta_two_theta(&self) -> Option<f64> {
        self.two_theta_calc.map(|calc| self.two_theta_obs - calc)
    }
}

/// 精修结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinementResult {
    pub lattice: RefinedLattice,
    pub volume: f64,
    pub r_squared: f64,
    pub quality: FitQuality,
    pub peaks_used: usize,
    pub wavelength: f64,
    pub residuals: Vec<PeakResidual>,
    pub advisories: Vec<Advisory>,
}

/// 线性化观测值
#[derive(Debug, Clone, Copy)]
struct Observation {
    hkl: MillerIndex,
    two_theta: f64,
    d_spacing: f64,
    /// 1/d²
    y: f64,
}

/// 该晶系所需的最少峰数
pub fn minimum_peaks(system: CrystalSystem) -> Result<usize> {
    match system {
        CrystalSystem::Cubic | CrystalSystem::Tetragonal | CrystalSystem::Hexagonal => Ok(3),
        CrystalSystem::Orthorhombic => Ok(4),
        CrystalSystem::Monoclinic | CrystalSystem::Triclinic => Err(complex_system_error(system)),
    }
}

/// 闭式最小二乘无法处理的晶系
fn complex_system_error(system: CrystalSystem) -> CrystallographyError {
    if system == CrystalSystem::Triclinic {
        CrystallographyError::VeryComplexSystem {
            system,
            recommendation: FULL_PATTERN_RECOMMENDATION,
        }
    } else {
        CrystallographyError::ComplexSystem {
            system,
            recommendation: FULL_PATTERN_RECOMMENDATION,
        }
    }
}

/// 晶格参数精修器
pub struct LatticeRefiner {
    bragg: BraggConverter,
}

impl LatticeRefiner {
    /// 创建精修器（波长单位 Å）
    pub fn new(wavelength: f64) -> Result<Self> {
        Ok(Self {
            bragg: BraggConverter::new(wavelength)?,
        })
    }

    pub fn wavelength(&self) -> f64 {
        self.bragg.wavelength()
    }

    /// 对指定晶系执行精修
    pub fn refine(
        &self,
        peaks: &[DiffractionPeak],
        system: CrystalSystem,
    ) -> Result<RefinementResult> {
        let required = minimum_peaks(system)?;

        let mut advisories = Vec::new();
        let observations = self.build_observations(peaks, &mut advisories);

        if observations.len() < required {
            return Err(CrystallographyError::InsufficientValidPeaks {
                system: system.to_string(),
                required,
                usable: observations.len(),
            });
        }

        let lattice = match system {
            CrystalSystem::Cubic => fit_cubic(&observations)?,
            CrystalSystem::Tetragonal => fit_tetragonal(&observations)?,
            CrystalSystem::Hexagonal => fit_hexagonal(&observations)?,
            CrystalSystem::Orthorhombic => fit_orthorhombic(&observations)?,
            CrystalSystem::Monoclinic | CrystalSystem::Triclinic => {
                return Err(complex_system_error(system))
            }
        };

        let parameters = lattice.to_parameters()?;
        let mut residuals = Vec::with_capacity(observations.len());
        let mut predicted = Vec::with_capacity(observations.len());
        for obs in &observations {
            let inv_d2 = dspacing::inverse_d_squared(system, obs.hkl, &parameters)?;
            let d_calc = 1.0 / inv_d2.sqrt();
            predicted.push(inv_d2);
            residuals.push(PeakResidual {
                hkl: obs.hkl,
                two_theta_obs: obs.two_theta,
                two_theta_calc: self.bragg.two_theta_from_d(d_calc).ok().map(|s| s.two_theta),
                d_obs: obs.d_spacing,
                d_calc,
            });
        }

        let observed: Vec<f64> = observations.iter().map(|o| o.y).collect();
        let r_squared = r_squared(&observed, &predicted);

        Ok(RefinementResult {
            lattice,
            volume: lattice.volume(),
            r_squared,
            quality: FitQuality::from_r_squared(r_squared),
            peaks_used: observations.len(),
            wavelength: self.bragg.wavelength(),
            residuals,
            advisories,
        })
    }

    /// 2θ → 1/d²，丢弃无效峰并记录原因
    fn build_observations(
        &self,
        peaks: &[DiffractionPeak],
        advisories: &mut Vec<Advisory>,
    ) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(peaks.len());
        for peak in peaks {
            if let Err(e) = peak.hkl.validate() {
                advisories.push(Advisory::PeakDiscarded {
                    hkl: peak.hkl,
                    reason: e.to_string(),
                });
                continue;
            }
            match self.bragg.d_from_two_theta(peak.two_theta) {
                Ok(solution) => {
                    advisories.extend(solution.advisories);
                    observations.push(Observation {
                        hkl: peak.hkl,
                        two_theta: peak.two_theta,
                        d_spacing: solution.d_spacing,
                        y: 1.0 / (solution.d_spacing * solution.d_spacing),
                    });
                }
                Err(e) => advisories.push(Advisory::PeakDiscarded {
                    hkl: peak.hkl,
                    reason: e.to_string(),
                }),
            }
        }
        observations
    }
}

/// 精修晶格参数
pub fn refine(
    peaks: &[DiffractionPeak],
    system: CrystalSystem,
    wavelength: f64,
) -> Result<RefinementResult> {
    // 先判断晶系，单斜/三斜不依赖波长是否有效
    minimum_peaks(system)?;
    LatticeRefiner::new(wavelength)?.refine(peaks, system)
}

// ─────────────────────────────────────────────────────────────
// 各晶系拟合
// ─────────────────────────────────────────────────────────────

fn fit_cubic(observations: &[Observation]) -> Result<RefinedLattice> {
    let n = observations.len() as f64;
    let (mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0);
    for obs in observations {
        let x = obs.hkl.sum_of_squares() as f64;
        sx += x;
        sy += obs.y;
        sxx += x * x;
        sxy += x * obs.y;
    }

    let denominator = n * sxx - sx * sx;
    if denominator.abs() < SINGULAR_TOLERANCE {
        return Err(CrystallographyError::FitFailed {
            determinant: denominator,
        });
    }

    let slope = (n * sxy - sx * sy) / denominator;
    let inv_a2 = positive("1/a²", slope)?;

    Ok(RefinedLattice::Cubic {
        a: (1.0 / inv_a2).sqrt(),
    })
}

fn fit_tetragonal(observations: &[Observation]) -> Result<RefinedLattice> {
    let [inv_a2, inv_c2] = solve_two(observations, |hkl| {
        let (h, k, l) = hkl.as_f64();
        [h * h + k * k, l * l]
    })?;
    let inv_a2 = positive("1/a²", inv_a2)?;
    let inv_c2 = positive("1/c²", inv_c2)?;

    Ok(RefinedLattice::Tetragonal {
        a: (1.0 / inv_a2).sqrt(),
        c: (1.0 / inv_c2).sqrt(),
    })
}

fn fit_hexagonal(observations: &[Observation]) -> Result<RefinedLattice> {
    // 拟合系数为 (4/3)/a²
    let [coef_a, inv_c2] = solve_two(observations, |hkl| {
        let (h, k, l) = hkl.as_f64();
        [h * h + h * k + k * k, l * l]
    })?;
    let coef_a = positive("4/(3a²)", coef_a)?;
    let inv_c2 = positive("1/c²", inv_c2)?;

    Ok(RefinedLattice::Hexagonal {
        a: (4.0 / (3.0 * coef_a)).sqrt(),
        c: (1.0 / inv_c2).sqrt(),
    })
}

fn fit_orthorhombic(observations: &[Observation]) -> Result<RefinedLattice> {
    let [inv_a2, inv_b2, inv_c2] = solve_three(observations, |hkl| {
        let (h, k, l) = hkl.as_f64();
        [h * h, k * k, l * l]
    })?;
    let inv_a2 = positive("1/a²", inv_a2)?;
    let inv_b2 = positive("1/b²", inv_b2)?;
    let inv_c2 = positive("1/c²", inv_c2)?;

    Ok(RefinedLattice::Orthorhombic {
        a: (1.0 / inv_a2).sqrt(),
        b: (1.0 / inv_b2).sqrt(),
        c: (1.0 / inv_c2).sqrt(),
    })
}

// ─────────────────────────────────────────────────────────────
// 正规方程（Cramer 法则）
// ─────────────────────────────────────────────────────────────

/// 两参数 y = p₁x₁ + p₂x₂
fn solve_two<F>(observations: &[Observation], design: F) -> Result<[f64; 2]>
where
    F: Fn(&MillerIndex) -> [f64; 2],
{
    let (mut s11, mut s12, mut s22, mut s1y, mut s2y) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for obs in observations {
        let [x1, x2] = design(&obs.hkl);
        s11 += x1 * x1;
        s12 += x1 * x2;
        s22 += x2 * x2;
        s1y += x1 * obs.y;
        s2y += x2 * obs.y;
    }

    let det = s11 * s22 - s12 * s12;
    if det.abs() < SINGULAR_TOLERANCE {
        return Err(CrystallographyError::FitFailed { determinant: det });
    }

    Ok([
        (s1y * s22 - s12 * s2y) / det,
        (s11 * s2y - s12 * s1y) / det,
    ])
}

/// 三参数 y = p₁x₁ + p₂x₂ + p₃x₃
fn solve_three<F>(observations: &[Observation], design: F) -> Result<[f64; 3]>
where
    F: Fn(&MillerIndex) -> [f64; 3],
{
    let mut m = [[0.0_f64; 3]; 3];
    let mut v = [0.0_f64; 3];
    for obs in observations {
        let x = design(&obs.hkl);
        for i in 0..3 {
            for j in 0..3 {
                m[i][j] += x[i] * x[j];
            }
            v[i] += x[i] * obs.y;
        }
    }

    let det = det3(&m);
    if det.abs() < SINGULAR_TOLERANCE {
        return Err(CrystallographyError::FitFailed { determinant: det });
    }

    // 第 i 列替换为右端向量
    let solve_for = |col: usize| {
        let mut replaced = m;
        for (row, value) in replaced.iter_mut().zip(v) {
            row[col] = value;
        }
        det3(&replaced) / det
    };

    Ok([solve_for(0), solve_for(1), solve_for(2)])
}

/// 3x3 行列式展开
fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

fn positive(parameter: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(CrystallographyError::NegativeParameter { parameter, value })
    }
}

/// R² = 1 − SS_res / SS_tot
fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
    let n = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / n;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::xrd::bragg::two_theta_from_d;

    const LAMBDA: f64 = 1.5406;

    fn synthetic(
        system: CrystalSystem,
        lattice: &LatticeParameters,
        indices: &[(i32, i32, i32)],
    ) -> Vec<DiffractionPeak> {
        indices
            .iter()
            .map(|&(h, k, l)| {
                let hkl = MillerIndex::new(h, k, l).unwrap();
                let d = dspacing::d_spacing(system, hkl, lattice).unwrap();
                let tt = two_theta_from_d(d, LAMBDA).unwrap().two_theta;
                DiffractionPeak::new(hkl, tt).unwrap()
            })
            .collect()
    }

    fn peak_from_d(h: i32, k: i32, l: i32, d: f64) -> DiffractionPeak {
        let tt = two_theta_from_d(d, LAMBDA).unwrap().two_theta;
        DiffractionPeak::new(MillerIndex::new(h, k, l).unwrap(), tt).unwrap()
    }

    #[test]
    fn test_cubic_exact_recovery() {
        let lattice = LatticeParameters::cubic(5.64).unwrap();
        let peaks = synthetic(CrystalSystem::Cubic, &lattice, &[(1, 1, 1), (2, 0, 0), (2, 2, 0)]);
        let result = refine(&peaks, CrystalSystem::Cubic, LAMBDA).unwrap();

        match result.lattice {
            RefinedLattice::Cubic { a } => assert!((a - 5.64).abs() < 1e-3),
            other => panic!("unexpected lattice {:?}", other),
        }
        assert!((result.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(result.quality, FitQuality::Excellent);
        assert_eq!(result.peaks_used, 3);
        for res in &result.residuals {
            assert!(res.delta_d().abs() < 1e-6);
            assert!(res.delta_two_theta().unwrap().abs() < 1e-6);
        }
        assert!((result.volume - 5.64_f64.powi(3)).abs() < 0.1);
    }

    #[test]
    fn test_tetragonal_recovery() {
        // 金红石 TiO2
        let lattice = LatticeParameters::tetragonal(4.594, 2.959).unwrap();
        let peaks = synthetic(
            CrystalSystem::Tetragonal,
            &lattice,
            &[(1, 1, 0), (1, 0, 1), (2, 0, 0), (1, 1, 1), (2, 1, 1)],
        );
        let result = refine(&peaks, CrystalSystem::Tetragonal, LAMBDA).unwrap();
        match result.lattice {
            RefinedLattice::Tetragonal { a, c } => {
                assert!((a - 4.594).abs() < 1e-6);
                assert!((c - 2.959).abs() < 1e-6);
            }
            other => panic!("unexpected lattice {:?}", other),
        }
        assert!(result.r_squared > 0.999_999);
    }

    #[test]
    fn test_hexagonal_recovery() {
        // ZnO
        let lattice = LatticeParameters::hexagonal(3.2498, 5.2066).unwrap();
        let peaks = synthetic(
            CrystalSystem::Hexagonal,
            &lattice,
            &[(1, 0, 0), (0, 0, 2), (1, 0, 1), (1, 0, 2), (1, 1, 0)],
        );
        let result = refine(&peaks, CrystalSystem::Hexagonal, LAMBDA).unwrap();
        match result.lattice {
            RefinedLattice::Hexagonal { a, c } => {
                assert!((a - 3.2498).abs() < 1e-6);
                assert!((c - 5.2066).abs() < 1e-6);
            }
            other => panic!("unexpected lattice {:?}", other),
        }
    }

    #[test]
    fn test_orthorhombic_recovery() {
        let lattice = LatticeParameters::orthorhombic(5.2, 6.1, 7.3).unwrap();
        let peaks = synthetic(
            CrystalSystem::Orthorhombic,
            &lattice,
            &[(1, 0, 0), (0, 1, 0), (0, 0, 1), (1, 1, 1), (2, 1, 0)],
        );
        let result = refine(&peaks, CrystalSystem::Orthorhombic, LAMBDA).unwrap();
        match result.lattice {
            RefinedLattice::Orthorhombic { a, b, c } => {
                assert!((a - 5.2).abs() < 1e-6);
                assert!((b - 6.1).abs() < 1e-6);
                assert!((c - 7.3).abs() < 1e-6);
            }
            other => panic!("unexpected lattice {:?}", other),
        }
        assert!((result.volume - 5.2 * 6.1 * 7.3).abs() < 1e-3);
    }

    #[test]
    fn test_noisy_cubic_reports_residuals() {
        let mut peaks = synthetic(
            CrystalSystem::Cubic,
            &LatticeParameters::cubic(4.0786).unwrap(),
            &[(1, 1, 1), (2, 0, 0), (2, 2, 0), (3, 1, 1)],
        );
        peaks[1].two_theta += 0.05;
        let result = refine(&peaks, CrystalSystem::Cubic, LAMBDA).unwrap();
        assert!(result.r_squared < 1.0);
        assert!(result.r_squared > 0.99);
        assert!(result.residuals.iter().any(|r| r.delta_d().abs() > 1e-4));
    }

    #[test]
    fn test_minimum_peaks() {
        let cubic = LatticeParameters::cubic(5.64).unwrap();
        let two = synthetic(CrystalSystem::Cubic, &cubic, &[(1, 1, 1), (2, 0, 0)]);
        let err = refine(&two, CrystalSystem::Cubic, LAMBDA).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InsufficientValidPeaks);

        let ortho = LatticeParameters::orthorhombic(5.2, 6.1, 7.3).unwrap();
        let three = synthetic(
            CrystalSystem::Orthorhombic,
            &ortho,
            &[(1, 0, 0), (0, 1, 0), (0, 0, 1)],
        );
        let err = refine(&three, CrystalSystem::Orthorhombic, LAMBDA).unwrap_err();
        assert_eq!(
            err,
            CrystallographyError::InsufficientValidPeaks {
                system: "orthorhombic".to_string(),
                required: 4,
                usable: 3,
            }
        );
    }

    #[test]
    fn test_invalid_peaks_are_discarded() {
        let lattice = LatticeParameters::cubic(5.64).unwrap();
        let mut peaks = synthetic(CrystalSystem::Cubic, &lattice, &[(1, 1, 1), (2, 0, 0), (2, 2, 0)]);
        peaks.push(DiffractionPeak {
            hkl: MillerIndex { h: 0, k: 0, l: 0 },
            two_theta: 40.0,
            intensity: None,
        });
        peaks.push(DiffractionPeak {
            hkl: MillerIndex::new(3, 1, 1).unwrap(),
            two_theta: 185.0,
            intensity: None,
        });
        let result = refine(&peaks, CrystalSystem::Cubic, LAMBDA).unwrap();
        assert_eq!(result.peaks_used, 3);
        let discarded = result
            .advisories
            .iter()
            .filter(|a| a.code() == "PEAK_DISCARDED")
            .count();
        assert_eq!(discarded, 2);

        // 丢弃后不足三个
        peaks.remove(0);
        let err = refine(&peaks, CrystalSystem::Cubic, LAMBDA).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InsufficientValidPeaks);
    }

    #[test]
    fn test_degenerate_cubic_fails() {
        // 三个峰的 h²+k²+l² 相同
        let peaks = vec![
            peak_from_d(1, 0, 0, 4.0),
            peak_from_d(0, 1, 0, 4.0),
            peak_from_d(0, 0, 1, 4.0),
        ];
        let err = refine(&peaks, CrystalSystem::Cubic, LAMBDA).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FitFailed);
    }

    #[test]
    fn test_degenerate_tetragonal_fails() {
        // 全部 l = 0，无法确定 c
        let peaks = vec![
            peak_from_d(1, 0, 0, 4.0),
            peak_from_d(1, 1, 0, 2.83),
            peak_from_d(2, 0, 0, 2.0),
        ];
        let err = refine(&peaks, CrystalSystem::Tetragonal, LAMBDA).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FitFailed);
    }

    #[test]
    fn test_degenerate_orthorhombic_fails() {
        // 全部 l = 0，正规矩阵第三行为零
        let peaks = vec![
            peak_from_d(1, 0, 0, 5.0),
            peak_from_d(0, 1, 0, 6.0),
            peak_from_d(1, 1, 0, 3.84),
            peak_from_d(2, 0, 0, 2.5),
        ];
        let err = refine(&peaks, CrystalSystem::Orthorhombic, LAMBDA).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FitFailed);
    }

    #[test]
    fn test_small_angle_peaks_are_kept() {
        // a = 200 Å，前四个峰 2θ < 1°
        let lattice = LatticeParameters::cubic(200.0).unwrap();
        let peaks = synthetic(
            CrystalSystem::Cubic,
            &lattice,
            &[(1, 0, 0), (1, 1, 0), (1, 1, 1), (2, 0, 0), (2, 2, 0)],
        );
        assert!(peaks[0].two_theta < 1.0);

        let result = refine(&peaks, CrystalSystem::Cubic, LAMBDA).unwrap();
        assert_eq!(result.peaks_used, 5);
        match result.lattice {
            RefinedLattice::Cubic { a } => assert!((a - 200.0).abs() < 1e-6, "a = {}", a),
            other => panic!("unexpected lattice {:?}", other),
        }

        let small_angle = result
            .advisories
            .iter()
            .filter(|a| matches!(a, Advisory::PrecisionTooLow { .. }))
            .count();
        assert_eq!(small_angle, 4);
        assert!(!result
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::PeakDiscarded { .. })));
    }

    #[test]
    fn test_negative_parameter() {
        // 1/a² = 0.2, 1/c² = −0.15 可精确满足三个观测
        let peaks = vec![
            peak_from_d(1, 0, 0, 1.0 / 0.2_f64.sqrt()),
            peak_from_d(1, 0, 1, 1.0 / 0.05_f64.sqrt()),
            peak_from_d(2, 0, 0, 1.0 / 0.8_f64.sqrt()),
        ];
        let err = refine(&peaks, CrystalSystem::Tetragonal, LAMBDA).unwrap_err();
        assert_eq!(
            err.code(),
            ErrorCode::NegativeParameter,
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_complex_systems_rejected() {
        let lattice = LatticeParameters::cubic(5.64).unwrap();
        let peaks = synthetic(
            CrystalSystem::Cubic,
            &lattice,
            &[(1, 1, 1), (2, 0, 0), (2, 2, 0), (3, 1, 1), (2, 2, 2)],
        );
        let err = refine(&peaks, CrystalSystem::Monoclinic, LAMBDA).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ComplexSystem);
        assert!(err.to_string().contains("Rietveld"));

        let err = refine(&peaks, CrystalSystem::Triclinic, LAMBDA).unwrap_err();
        assert_eq!(err.code(), ErrorCode::VeryComplexSystem);
    }

    #[test]
    fn test_invalid_wavelength() {
        let err = refine(&[], CrystalSystem::Cubic, 0.05).unwrap_err();
        assert_eq!(err.code(), ErrorCode::OutOfRange);
    }

    #[test]
    fn test_r_squared_edge_cases() {
        assert_eq!(r_squared(&[1.0, 1.0], &[1.0, 1.0]), 1.0);
        assert_eq!(r_squared(&[1.0, 1.0], &[1.0, 2.0]), 0.0);
        assert!(r_squared(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) < 0.0);
    }

    #[test]
    fn test_fit_quality_bands() {
        assert_eq!(FitQuality::from_r_squared(0.995), FitQuality::Excellent);
        assert_eq!(FitQuality::from_r_squared(0.97), FitQuality::Good);
        assert_eq!(FitQuality::from_r_squared(0.5), FitQuality::Fair);
    }
}
