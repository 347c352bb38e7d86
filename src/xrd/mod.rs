//! # XRD 分析模块
//!
//! 衍射数据分析的计算核心。所有计算均为纯函数，无共享可变状态，可在任意线程并发调用。
//!
//! ## 子模块
//! - `bragg`: 2θ ⇄ d 换算
//! - `dspacing`: 各晶系 d(hkl) 公式
//! - `scherrer`: Scherrer 晶粒尺寸
//! - `extinction`: 系统消光判别点阵类型
//! - `intensity`: 峰强度归一化
//! - `texture`: Harris 织构系数
//! - `refinement`: 晶格参数最小二乘精修
//! - `wavelength`: 预定义辐射源波长表
//! - `export`: 结果导出 (CSV)
//! - `plot`: 精修结果图表
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/` 数据模型

pub mod bragg;
pub mod dspacing;
pub mod export;
pub mod extinction;
pub mod intensity;
pub mod plot;
pub mod refinement;
pub mod scherrer;
pub mod texture;
pub mod wavelength;

pub use bragg::{d_from_two_theta, two_theta_from_d, BraggConverter, BraggSolution};
pub use dspacing::d_spacing;
pub use extinction::{classify_extinctions, Centering, CenteringCandidate, ExtinctionVerdict};
pub use intensity::{normalize_intensities, NormalizedPattern, NormalizedPeak};
pub use refinement::{
    refine, FitQuality, LatticeRefiner, PeakResidual, RefinedLattice, RefinementResult,
};
pub use scherrer::{crystallite_size, CrystalliteSize, DEFAULT_SHAPE_FACTOR};
pub use texture::{texture_coefficients, TextureAnalysis, TextureCoefficient, TexturePeak};
pub use wavelength::{get_predefined_wavelength, RadiationSource, RADIATION_SOURCES};
