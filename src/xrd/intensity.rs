//! # 峰强度归一化
//!
//! 相对强度 = 100 · I / I_max，同时给出总强度。保持输入顺序。
//!
//! ## 依赖关系
//! - 被 `commands/normalize.rs` 调用

use crate::error::{ensure_finite, CrystallographyError, Result};
use crate::models::MillerIndex;

use serde::Serialize;

/// 归一化后的峰
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedPeak {
    pub hkl: MillerIndex,
    pub intensity: f64,
    /// 相对强度（0-100）
    pub relative_percent: f64,
}

/// 归一化结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPattern {
    pub peaks: Vec<NormalizedPeak>,
    pub max_intensity: f64,
    pub total_intensity: f64,
    /// 最强峰
    pub strongest: MillerIndex,
}

/// 归一化峰强度
pub fn normalize_intensities(peaks: &[(MillerIndex, f64)]) -> Result<NormalizedPattern> {
    for (hkl, intensity) in peaks {
        hkl.validate()?;
        ensure_finite("intensity", *intensity)?;
        if *intensity < 0.0 {
            return Err(CrystallographyError::OutOfRange {
                name: "intensity",
                value: *intensity,
                range: "[0, ∞)",
            });
        }
    }

    let (strongest, max_intensity) = peaks
        .iter()
        .copied()
        .fold(None, |best: Option<(MillerIndex, f64)>, (hkl, i)| match best {
            Some((_, max)) if max >= i => best,
            _ => Some((hkl, i)),
        })
        .ok_or(CrystallographyError::ZeroIntensity {
            reason: "no peaks supplied",
        })?;

    if max_intensity <= 0.0 || !max_intensity.is_finite() {
        return Err(CrystallographyError::ZeroIntensity {
            reason: "maximum intensity is zero",
        });
    }

    let total_intensity: f64 = peaks.iter().map(|(_, i)| i).sum();
    ensure_finite("total intensity", total_intensity)?;
    let normalized = peaks
        .iter()
        .map(|&(hkl, intensity)| NormalizedPeak {
            hkl,
            intensity,
            relative_percent: 100.0 * intensity / max_intensity,
        })
        .collect();

    Ok(NormalizedPattern {
        peaks: normalized,
        max_intensity,
        total_intensity,
        strongest,
    })
}
