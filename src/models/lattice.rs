//! # 晶系与晶格参数数据模型
//!
//! 定义晶系枚举和晶格参数 (a, b, c, α, β, γ)。
//! 各晶系的对称约束由构造函数保证（如立方晶系 a=b=c、角度全为 90°），不冗余存储。
//!
//! ## 依赖关系
//! - 被 `xrd/dspacing.rs` 和 `xrd/refinement.rs` 使用
//! - 无外部模块依赖

use crate::error::{ensure_finite, CrystallographyError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 晶系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrystalSystem {
    Cubic,
    Tetragonal,
    Orthorhombic,
    Hexagonal,
    Monoclinic,
    Triclinic,
}

impl CrystalSystem {
    pub const ALL: [CrystalSystem; 6] = [
        CrystalSystem::Cubic,
        CrystalSystem::Tetragonal,
        CrystalSystem::Orthorhombic,
        CrystalSystem::Hexagonal,
        CrystalSystem::Monoclinic,
        CrystalSystem::Triclinic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CrystalSystem::Cubic => "cubic",
            CrystalSystem::Tetragonal => "tetragonal",
            CrystalSystem::Orthorhombic => "orthorhombic",
            CrystalSystem::Hexagonal => "hexagonal",
            CrystalSystem::Monoclinic => "monoclinic",
            CrystalSystem::Triclinic => "triclinic",
        }
    }
}

impl fmt::Display for CrystalSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CrystalSystem {
    type Err = CrystallographyError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        CrystalSystem::ALL
            .into_iter()
            .find(|sys| sys.name() == key)
            .ok_or(CrystallographyError::UnsupportedSystem {
                name: s.trim().to_string(),
            })
    }
}

/// 晶格参数（长度 Å，角度度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeParameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl LatticeParameters {
    /// 立方晶系: a = b = c, α = β = γ = 90°
    pub fn cubic(a: f64) -> Result<Self> {
        Self::new(a, a, a, 90.0, 90.0, 90.0)
    }

    /// 四方晶系: a = b ≠ c
    pub fn tetragonal(a: f64, c: f64) -> Result<Self> {
        Self::new(a, a, c, 90.0, 90.0, 90.0)
    }

    /// 正交晶系
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<Self> {
        Self::new(a, b, c, 90.0, 90.0, 90.0)
    }

    /// 六方晶系: a = b, γ = 120°
    pub fn hexagonal(a: f64, c: f64) -> Result<Self> {
        Self::new(a, a, c, 90.0, 90.0, 120.0)
    }

    /// 单斜晶系（b 为唯一轴）
    pub fn monoclinic(a: f64, b: f64, c: f64, beta: f64) -> Result<Self> {
        Self::new(a, b, c, 90.0, beta, 90.0)
    }

    /// 三斜晶系
    pub fn triclinic(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        Self::new(a, b, c, alpha, beta, gamma)
    }

    /// 创建并校验晶格参数
    pub fn new(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        let params = LatticeParameters {
            a,
            b,
            c,
            alpha,
            beta,
            gamma,
        };
        params.validate()?;
        Ok(params)
    }

    /// 校验长度为正、角度在 (0, 180) 内且三个角能闭合成晶胞
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("a", self.a), ("b", self.b), ("c", self.c)] {
            ensure_finite(name, value)?;
            if value <= 0.0 {
                return Err(CrystallographyError::OutOfRange {
                    name,
                    value,
                    range: "(0, ∞) Å",
                });
            }
        }
        for (name, value) in [("α", self.alpha), ("β", self.beta), ("γ", self.gamma)] {
            ensure_finite(name, value)?;
            if value <= 0.0 || value >= 180.0 {
                return Err(CrystallographyError::OutOfRange {
                    name,
                    value,
                    range: "(0, 180)°",
                });
            }
        }
        let volume_factor = self.volume_factor();
        if volume_factor <= 0.0 {
            return Err(CrystallographyError::OutOfRange {
                name: "cell volume factor",
                value: volume_factor,
                range: "(0, 1]",
            });
        }
        Ok(())
    }

    /// 1 − cos²α − cos²β − cos²γ + 2 cosα cosβ cosγ
    fn volume_factor(&self) -> f64 {
        let (ca, cb, cg) = (
            self.alpha.to_radians().cos(),
            self.beta.to_radians().cos(),
            self.gamma.to_radians().cos(),
        );
        1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg
    }

    /// 晶胞体积 (Å³)
    pub fn volume(&self) -> f64 {
        self.a * self.b * self.c * self.volume_factor().max(0.0).sqrt()
    }

    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    pub fn matrix(&self) -> [[f64; 3]; 3] {
        let alpha_rad = self.alpha.to_radians();
        let beta_rad = self.beta.to_radians();
        let gamma_rad = self.gamma.to_radians();

        let cos_alpha = alpha_rad.cos();
        let cos_beta = beta_rad.cos();
        let cos_gamma = gamma_rad.cos();
        let sin_gamma = gamma_rad.sin();

        let a_vec = [self.a, 0.0, 0.0];
        let b_vec = [self.b * cos_gamma, self.b * sin_gamma, 0.0];

        let c1 = self.c * cos_beta;
        let c2 = self.c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (self.c * self.c - c1 * c1 - c2 * c2).max(0.0).sqrt();

        [a_vec, b_vec, [c1, c2, c3]]
    }

    /// 倒格矢矩阵（不含 2π 因子），行向量表示 a*, b*, c*
    pub fn reciprocal_matrix(&self) -> [[f64; 3]; 3] {
        let [a, b, c] = self.matrix();
        let b_cross_c = cross(&b, &c);
        let c_cross_a = cross(&c, &a);
        let a_cross_b = cross(&a, &b);
        let volume = dot(&a, &b_cross_c);

        [b_cross_c, c_cross_a, a_cross_b].map(|v| v.map(|x| x / volume))
    }
}

/// 向量叉积
fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// 向量点积
fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
