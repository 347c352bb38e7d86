//! # 非致命提示
//!
//! 计算成功但结果需谨慎解读时附加的提示信息。每种提示有稳定的提示码。

use crate::error::ErrorCode;
use crate::models::MillerIndex;

use serde::Serialize;
use std::fmt;

/// 计算提示
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Advisory {
    /// 2θ < 1°，小角度下 sin 的相对误差会被放大
    PrecisionTooLow { two_theta: f64 },
    /// d 间距在 0.5–100 Å 之外
    UnusualDSpacing { d_spacing: f64 },
    /// 晶粒尺寸 < 3 nm，接近运动学近似的下限
    SizeBelowLimit { size_nm: f64 },
    /// 晶粒尺寸 > 200 nm，仪器展宽可能占主导
    SizeAboveLimit { size_nm: f64 },
    /// FWHM > 0.5°，可能包含应变展宽
    StrainBroadening { fwhm: f64 },
    /// 精修时丢弃的衍射峰
    PeakDiscarded { hkl: MillerIndex, reason: String },
}

impl Advisory {
    pub fn code(&self) -> &'static str {
        match self {
            Advisory::PrecisionTooLow { .. } => ErrorCode::PrecisionTooLow.as_str(),
            Advisory::UnusualDSpacing { .. } => "UNUSUAL_D_SPACING",
            Advisory::SizeBelowLimit { .. } => "SIZE_BELOW_LIMIT",
            Advisory::SizeAboveLimit { .. } => "SIZE_ABOVE_LIMIT",
            Advisory::StrainBroadening { .. } => "STRAIN_BROADENING",
            Advisory::PeakDiscarded { .. } => "PEAK_DISCARDED",
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::PrecisionTooLow { two_theta } => write!(
                f,
                "2θ = {:.3}° is below 1°; the derived d-spacing has amplified relative error",
                two_theta
            ),
            Advisory::UnusualDSpacing { d_spacing } => write!(
                f,
                "d = {:.4} Å is outside the usual crystallographic range (0.5–100 Å)",
                d_spacing
            ),
            Advisory::SizeBelowLimit { size_nm } => write!(
                f,
                "Size {:.2} nm is below 3 nm where the kinematic approximation breaks down",
                size_nm
            ),
            Advisory::SizeAboveLimit { size_nm } => write!(
                f,
                "Size {:.2} nm exceeds 200 nm; instrument broadening likely dominates without deconvolution",
                size_nm
            ),
            Advisory::StrainBroadening { fwhm } => write!(
                f,
                "FWHM {:.3}° > 0.5° may include strain broadening; Scherrer cannot separate it (use Williamson–Hall analysis)",
                fwhm
            ),
            Advisory::PeakDiscarded { hkl, reason } => {
                write!(f, "Peak {} discarded: {}", hkl, reason)
            }
        }
    }
}
