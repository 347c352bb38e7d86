//! # 织构系数（Harris 方法）
//!
//! TC(hkl) = [I(hkl)/I₀(hkl)] / mean[I/I₀]，I₀ 为无规取向标准（如 PDF 卡片）强度。
//! 随机取向时所有 TC = 1。
//!
//! 织构指数 = mean(|TC − 1|)。分级阈值与分析结果的对照习惯保持一致，不要随意修改。
//!
//! ## 依赖关系
//! - 被 `commands/texture.rs` 调用

use crate::error::{ensure_finite, CrystallographyError, Result};
use crate::models::MillerIndex;

use serde::Serialize;
use std::fmt;

/// 至少需要的峰数
pub const MIN_TEXTURE_PEAKS: usize = 3;

/// 织构分析输入
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TexturePeak {
    pub hkl: MillerIndex,
    /// 样品观测强度
    pub observed: f64,
    /// 标准（无规取向）强度
    pub standard: f64,
}

/// 单峰择优取向分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    StrongPositive,
    ModeratePositive,
    SlightPositive,
    Random,
    SlightNegative,
    StrongNegative,
}

impl Orientation {
    pub fn classify(tc: f64) -> Self {
        if tc > 2.0 {
            Orientation::StrongPositive
        } else if tc > 1.5 {
            Orientation::ModeratePositive
        } else if tc > 1.2 {
            Orientation::SlightPositive
        } else if tc >= 0.8 {
            Orientation::Random
        } else if tc >= 0.5 {
            Orientation::SlightNegative
        } else {
            Orientation::StrongNegative
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Orientation::StrongPositive => "strong preferred orientation",
            Orientation::ModeratePositive => "moderate preferred orientation",
            Orientation::SlightPositive => "slight preferred orientation",
            Orientation::Random => "random orientation",
            Orientation::SlightNegative => "slightly suppressed",
            Orientation::StrongNegative => "strongly suppressed",
        };
        f.write_str(text)
    }
}

/// 整体织构程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureLevel {
    Random,
    Slight,
    Moderate,
    Strong,
}

impl TextureLevel {
    pub fn classify(index: f64) -> Self {
        if index < 0.1 {
            TextureLevel::Random
        } else if index < 0.3 {
            TextureLevel::Slight
        } else if index < 0.6 {
            TextureLevel::Moderate
        } else {
            TextureLevel::Strong
        }
    }
}

impl fmt::Display for TextureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TextureLevel::Random => "random (no significant texture)",
            TextureLevel::Slight => "slight texture",
            TextureLevel::Moderate => "moderate texture",
            TextureLevel::Strong => "strong texture",
        };
        f.write_str(text)
    }
}

/// 单峰织构系数
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextureCoefficient {
    pub hkl: MillerIndex,
    /// I / I₀
    pub ratio: f64,
    /// TC(hkl)
    pub coefficient: f64,
    pub orientation: Orientation,
}

/// 织构分析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextureAnalysis {
    pub coefficients: Vec<TextureCoefficient>,
    pub texture_index: f64,
    pub level: TextureLevel,
    /// TC 最大的晶面
    pub dominant: MillerIndex,
}

/// 计算织构系数
pub fn texture_coefficients(peaks: &[TexturePeak]) -> Result<TextureAnalysis> {
    if peaks.len() < MIN_TEXTURE_PEAKS {
        return Err(CrystallographyError::InsufficientValidPeaks {
            system: "Texture analysis".to_string(),
            required: MIN_TEXTURE_PEAKS,
            usable: peaks.len(),
        });
    }

    for peak in peaks {
        peak.hkl.validate()?;
        ensure_finite("observed intensity", peak.observed)?;
        ensure_finite("standard intensity", peak.standard)?;
        if peak.observed < 0.0 {
            return Err(CrystallographyError::OutOfRange {
                name: "observed intensity",
                value: peak.observed,
                range: "[0, ∞)",
            });
        }
        if peak.standard == 0.0 {
            return Err(CrystallographyError::ZeroIntensity {
                reason: "standard intensity must be non-zero",
            });
        }
        if peak.standard < 0.0 {
            return Err(CrystallographyError::OutOfRange {
                name: "standard intensity",
                value: peak.standard,
                range: "(0, ∞)",
            });
        }
    }

    let ratios: Vec<f64> = peaks.iter().map(|p| p.observed / p.standard).collect();
    let n = ratios.len() as f64;
    let mean_ratio = ratios.iter().sum::<f64>() / n;
    if mean_ratio <= 0.0 {
        return Err(CrystallographyError::ZeroIntensity {
            reason: "all observed intensities are zero",
        });
    }

    let coefficients: Vec<TextureCoefficient> = peaks
        .iter()
        .zip(&ratios)
        .map(|(peak, &ratio)| {
            let coefficient = ratio / mean_ratio;
            TextureCoefficient {
                hkl: peak.hkl,
                ratio,
                coefficient,
                orientation: Orientation::classify(coefficient),
            }
        })
        .collect();

    let texture_index = coefficients
        .iter()
        .map(|tc| (tc.coefficient - 1.0).abs())
        .sum::<f64>()
        / n;

    let dominant = coefficients
        .iter()
        .max_by(|a, b| a.coefficient.total_cmp(&b.coefficient))
        .map(|tc| tc.hkl)
        .unwrap_or(peaks[0].hkl);

    Ok(TextureAnalysis {
        coefficients,
        texture_index,
        level: TextureLevel::classify(texture_index),
        dominant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn peak(h: i32, k: i32, l: i32, observed: f64, standard: f64) -> TexturePeak {
        TexturePeak {
            hkl: MillerIndex::new(h, k, l).unwrap(),
            observed,
            standard,
        }
    }

    #[test]
    fn test_random_powder() {
        let peaks = [
            peak(1, 1, 1, 100.0, 100.0),
            peak(2, 0, 0, 47.0, 47.0),
            peak(2, 2, 0, 22.0, 22.0),
            peak(3, 1, 1, 24.0, 24.0),
        ];
        let result = texture_coefficients(&peaks).unwrap();
        for tc in &result.coefficients {
            assert_eq!(tc.coefficient, 1.0);
            assert_eq!(tc.orientation, Orientation::Random);
        }
        assert_eq!(result.texture_index, 0.0);
        assert_eq!(result.level, TextureLevel::Random);
    }

    #[test]
    fn test_preferred_111() {
        // ratios 3, 1, 1 -> mean 5/3 -> TC = 1.8, 0.6, 0.6
        let peaks = [
            peak(1, 1, 1, 300.0, 100.0),
            peak(2, 0, 0, 47.0, 47.0),
            peak(2, 2, 0, 22.0, 22.0),
        ];
        let result = texture_coefficients(&peaks).unwrap();
        let tcs: Vec<f64> = result.coefficients.iter().map(|c| c.coefficient).collect();
        assert!((tcs[0] - 1.8).abs() < 1e-12);
        assert!((tcs[1] - 0.6).abs() < 1e-12);
        assert_eq!(result.coefficients[0].orientation, Orientation::ModeratePositive);
        assert_eq!(result.coefficients[1].orientation, Orientation::SlightNegative);
        // (0.8 + 0.4 + 0.4) / 3
        assert!((result.texture_index - 1.6 / 3.0).abs() < 1e-12);
        assert_eq!(result.level, TextureLevel::Moderate);
        assert_eq!(result.dominant, MillerIndex::new(1, 1, 1).unwrap());
    }

    #[test]
    fn test_classification_bands() {
        assert_eq!(Orientation::classify(2.5), Orientation::StrongPositive);
        assert_eq!(Orientation::classify(1.3), Orientation::SlightPositive);
        assert_eq!(Orientation::classify(0.8), Orientation::Random);
        assert_eq!(Orientation::classify(0.3), Orientation::StrongNegative);
        assert_eq!(TextureLevel::classify(0.05), TextureLevel::Random);
        assert_eq!(TextureLevel::classify(0.2), TextureLevel::Slight);
        assert_eq!(TextureLevel::classify(0.9), TextureLevel::Strong);
    }

    #[test]
    fn test_preconditions() {
        let two = [peak(1, 1, 1, 1.0, 1.0), peak(2, 0, 0, 1.0, 1.0)];
        assert_eq!(
            texture_coefficients(&two).unwrap_err().code(),
            ErrorCode::InsufficientValidPeaks
        );

        let zero_std = [
            peak(1, 1, 1, 1.0, 1.0),
            peak(2, 0, 0, 1.0, 0.0),
            peak(2, 2, 0, 1.0, 1.0),
        ];
        assert_eq!(
            texture_coefficients(&zero_std).unwrap_err().code(),
            ErrorCode::ZeroIntensity
        );

        let all_zero = [
            peak(1, 1, 1, 0.0, 1.0),
            peak(2, 0, 0, 0.0, 1.0),
            peak(2, 2, 0, 0.0, 1.0),
        ];
        assert_eq!(
            texture_coefficients(&all_zero).unwrap_err().code(),
            ErrorCode::ZeroIntensity
        );
    }
}
