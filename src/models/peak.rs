//! # 衍射峰数据模型
//!
//! 定义 Miller 指数和观测衍射峰。两者均为不可变值类型，由调用方从输入构造，
//! 计算引擎从不修改。
//!
//! ## 依赖关系
//! - 被 `xrd/` 下所有计算模块使用
//! - 被 `parsers/peaks.rs` 构造

use crate::error::{ensure_finite, CrystallographyError, Result};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Miller 指数 (hkl)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MillerIndex {
    pub h: i32,
    pub k: i32,
    pub l: i32,
}

impl MillerIndex {
    /// 创建 Miller 指数，拒绝 (0 0 0)
    pub fn new(h: i32, k: i32, l: i32) -> Result<Self> {
        let hkl = MillerIndex { h, k, l };
        hkl.validate()?;
        Ok(hkl)
    }

    /// 检查是否为 (0 0 0)
    pub fn validate(&self) -> Result<()> {
        if self.is_zero() {
            return Err(CrystallographyError::InvalidMillerIndices);
        }
        Ok(())
    }

    pub fn is_zero(&self) -> bool {
        self.h == 0 && self.k == 0 && self.l == 0
    }

    /// h² + k² + l²
    pub fn sum_of_squares(&self) -> i64 {
        let (h, k, l) = self.as_i64();
        h * h + k * k + l * l
    }

    /// h + k + l
    pub fn sum(&self) -> i64 {
        let (h, k, l) = self.as_i64();
        h + k + l
    }

    /// h、k、l 全为偶数或全为奇数
    pub fn is_unmixed(&self) -> bool {
        let parities = [
            self.h.rem_euclid(2),
            self.k.rem_euclid(2),
            self.l.rem_euclid(2),
        ];
        parities.iter().all(|&p| p == parities[0])
    }

    pub(crate) fn as_i64(&self) -> (i64, i64, i64) {
        (self.h as i64, self.k as i64, self.l as i64)
    }

    pub(crate) fn as_f64(&self) -> (f64, f64, f64) {
        (self.h as f64, self.k as f64, self.l as f64)
    }
}

impl fmt::Display for MillerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.h, self.k, self.l)
    }
}

fn hkl_separated_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\(?\s*(-?\d+)\s*[,;\s]\s*(-?\d+)\s*[,;\s]\s*(-?\d+)\s*\)?$")
            .expect("hkl pattern is a valid regex")
    })
}

fn hkl_compact_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\(?\s*(-?\d)(-?\d)(-?\d)\s*\)?$").expect("compact hkl pattern is a valid regex")
    })
}

impl FromStr for MillerIndex {
    type Err = String;

    /// 支持 "1 1 1"、"(1,-1,0)"、"1;1;0" 以及单位数紧凑写法 "111"、"1-10"
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let caps = hkl_separated_regex()
            .captures(trimmed)
            .or_else(|| hkl_compact_regex().captures(trimmed))
            .ok_or_else(|| "expected three integers, e.g. '1 1 0' or '(1,-1,0)'".to_string())?;

        let mut idx = [0i32; 3];
        for (slot, i) in idx.iter_mut().zip(1..=3) {
            *slot = caps[i]
                .parse()
                .map_err(|e| format!("index '{}' is not an integer: {}", &caps[i], e))?;
        }

        MillerIndex::new(idx[0], idx[1], idx[2]).map_err(|e| e.to_string())
    }
}

/// 观测衍射峰
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffractionPeak {
    /// Miller 指数
    pub hkl: MillerIndex,
    /// 衍射角 2θ（度）
    pub two_theta: f64,
    /// 积分强度（可选）
    pub intensity: Option<f64>,
}

impl DiffractionPeak {
    /// 创建衍射峰，检查 0 < 2θ < 180
    pub fn new(hkl: MillerIndex, two_theta: f64) -> Result<Self> {
        hkl.validate()?;
        ensure_finite("2θ", two_theta)?;
        if two_theta <= 0.0 || two_theta >= 180.0 {
            return Err(CrystallographyError::OutOfRange {
                name: "2θ",
                value: two_theta,
                range: "(0, 180)°",
            });
        }
        Ok(Self {
            hkl,
            two_theta,
            intensity: None,
        })
    }

    /// 附加强度（必须非负）
    pub fn with_intensity(mut self, intensity: f64) -> Result<Self> {
        ensure_finite("intensity", intensity)?;
        if intensity < 0.0 {
            return Err(CrystallographyError::OutOfRange {
                name: "intensity",
                value: intensity,
                range: "[0, ∞)",
            });
        }
        self.intensity = Some(intensity);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miller_rejects_zero() {
        assert_eq!(
            MillerIndex::new(0, 0, 0),
            Err(CrystallographyError::InvalidMillerIndices)
        );
        assert!(MillerIndex::new(0, 0, 1).is_ok());
    }

    #[test]
    fn test_miller_parse_formats() {
        let expected = MillerIndex { h: 1, k: -1, l: 0 };
        assert_eq!("1 -1 0".parse::<MillerIndex>().unwrap(), expected);
        assert_eq!("(1,-1,0)".parse::<MillerIndex>().unwrap(), expected);
        assert_eq!("1-10".parse::<MillerIndex>().unwrap(), expected);
        assert_eq!(
            "(10 2 0)".parse::<MillerIndex>().unwrap(),
            MillerIndex { h: 10, k: 2, l: 0 }
        );
        assert!("000".parse::<MillerIndex>().is_err());
        assert!("1 1".parse::<MillerIndex>().is_err());
    }

    #[test]
    fn test_parity_helpers() {
        let fcc = MillerIndex::new(1, 1, 1).unwrap();
        let mixed = MillerIndex::new(1, 0, 0).unwrap();
        let negative = MillerIndex::new(-1, 1, 3).unwrap();
        assert!(fcc.is_unmixed());
        assert!(!mixed.is_unmixed());
        assert!(negative.is_unmixed());
        assert_eq!(fcc.sum_of_squares(), 3);
        assert_eq!(negative.sum(), 3);
    }

    #[test]
    fn test_peak_validation() {
        let hkl = MillerIndex::new(1, 1, 1).unwrap();
        assert!(DiffractionPeak::new(hkl, 28.4).is_ok());
        assert_eq!(
            DiffractionPeak::new(hkl, 180.0).unwrap_err().code(),
            crate::error::ErrorCode::OutOfRange
        );
        assert_eq!(
            DiffractionPeak::new(hkl, f64::NAN).unwrap_err().code(),
            crate::error::ErrorCode::InvalidNumber
        );
        assert!(DiffractionPeak::new(hkl, 28.4)
            .unwrap()
            .with_intensity(-1.0)
            .is_err());
    }
}
