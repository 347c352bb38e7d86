//! # 统一错误处理模块
//!
//! 定义 xrdkit 的所有错误类型，使用 `thiserror` 派生。
//!
//! - [`CrystallographyError`]: 计算引擎错误，每个变体对应一个稳定的 [`ErrorCode`]
//! - [`XrdkitError`]: 命令行层错误（文件、CSV、绘图等），包装引擎错误
//!
//! 错误码字符串不随消息文本变化，调用方可直接按错误码分支。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 使用 `models/lattice.rs` 的 CrystalSystem 作为错误上下文

use crate::models::CrystalSystem;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 稳定错误码
///
/// `PrecisionTooLow` 只以提示（[`crate::models::Advisory`]）形式出现，不会作为错误返回。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidNumber,
    OutOfRange,
    GeometricallyImpossible,
    PrecisionTooLow,
    InvalidMillerIndices,
    InsufficientValidPeaks,
    NegativeParameter,
    FitFailed,
    UnsupportedSystem,
    ComplexSystem,
    VeryComplexSystem,
    ZeroIntensity,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidNumber => "INVALID_NUMBER",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::GeometricallyImpossible => "GEOMETRICALLY_IMPOSSIBLE",
            ErrorCode::PrecisionTooLow => "PRECISION_TOO_LOW",
            ErrorCode::InvalidMillerIndices => "INVALID_MILLER_INDICES",
            ErrorCode::InsufficientValidPeaks => "INSUFFICIENT_VALID_PEAKS",
            ErrorCode::NegativeParameter => "NEGATIVE_PARAMETER",
            ErrorCode::FitFailed => "FIT_FAILED",
            ErrorCode::UnsupportedSystem => "UNSUPPORTED_SYSTEM",
            ErrorCode::ComplexSystem => "COMPLEX_SYSTEM",
            ErrorCode::VeryComplexSystem => "VERY_COMPLEX_SYSTEM",
            ErrorCode::ZeroIntensity => "ZERO_INTENSITY",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 推荐使用全谱精修软件的提示
pub const FULL_PATTERN_RECOMMENDATION: &str =
    "Use full-pattern Rietveld refinement software (e.g. GSAS-II, FullProf, TOPAS) for this crystal system";

/// 计算引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrystallographyError {
    // ─────────────────────────────────────────────────────────────
    // 输入错误
    // ─────────────────────────────────────────────────────────────
    #[error("{name} must be a finite number, got {value}")]
    InvalidNumber { name: &'static str, value: f64 },

    #[error("{name} = {value} is outside the valid range {range}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("Miller indices (0 0 0) do not describe a lattice plane")]
    InvalidMillerIndices,

    // ─────────────────────────────────────────────────────────────
    // 物理/数值错误
    // ─────────────────────────────────────────────────────────────
    #[error("No real Bragg angle exists: λ/(2d) = {ratio:.4} > 1 (d = {d_spacing} Å, λ = {wavelength} Å)")]
    GeometricallyImpossible {
        d_spacing: f64,
        wavelength: f64,
        ratio: f64,
    },

    #[error("{system} needs at least {required} valid peaks, only {usable} usable")]
    InsufficientValidPeaks {
        system: String,
        required: usize,
        usable: usize,
    },

    #[error("Fitted {parameter} = {value:.6e} is not positive; the peak assignment is physically impossible")]
    NegativeParameter { parameter: &'static str, value: f64 },

    #[error("Least-squares fit failed: normal equations are singular (|det| = {determinant:.3e}); peaks are degenerate for this system")]
    FitFailed { determinant: f64 },

    #[error("Intensity normalisation failed: {reason}")]
    ZeroIntensity { reason: &'static str },

    // ─────────────────────────────────────────────────────────────
    // 不支持的晶系
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported crystal system: '{name}'")]
    UnsupportedSystem { name: String },

    #[error("{system} refinement needs a non-linear fit of the β angle. {recommendation}")]
    ComplexSystem {
        system: CrystalSystem,
        recommendation: &'static str,
    },

    #[error("{system} refinement needs six coupled parameters. {recommendation}")]
    VeryComplexSystem {
        system: CrystalSystem,
        recommendation: &'static str,
    },
}

impl CrystallographyError {
    /// 对应的稳定错误码
    pub fn code(&self) -> ErrorCode {
        match self {
            CrystallographyError::InvalidNumber { .. } => ErrorCode::InvalidNumber,
            CrystallographyError::OutOfRange { .. } => ErrorCode::OutOfRange,
            CrystallographyError::InvalidMillerIndices => ErrorCode::InvalidMillerIndices,
            CrystallographyError::GeometricallyImpossible { .. } => {
                ErrorCode::GeometricallyImpossible
            }
            CrystallographyError::InsufficientValidPeaks { .. } => {
                ErrorCode::InsufficientValidPeaks
            }
            CrystallographyError::NegativeParameter { .. } => ErrorCode::NegativeParameter,
            CrystallographyError::FitFailed { .. } => ErrorCode::FitFailed,
            CrystallographyError::ZeroIntensity { .. } => ErrorCode::ZeroIntensity,
            CrystallographyError::UnsupportedSystem { .. } => ErrorCode::UnsupportedSystem,
            CrystallographyError::ComplexSystem { .. } => ErrorCode::ComplexSystem,
            CrystallographyError::VeryComplexSystem { .. } => ErrorCode::VeryComplexSystem,
        }
    }

    /// 生成 `{ error, errorCode }` 结构化报告
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            error: self.to_string(),
            error_code: self.code(),
        }
    }
}

/// 结构化错误报告（JSON 输出用）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error: String,
    pub error_code: ErrorCode,
}

/// 检查数值是否有限
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CrystallographyError::InvalidNumber { name, value })
    }
}

/// 引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, CrystallographyError>;

/// xrdkit 命令行层错误类型
#[derive(Error, Debug)]
pub enum XrdkitError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse peak file: {path} (line {line})\nReason: {reason}")]
    ParseError {
        path: String,
        line: u64,
        reason: String,
    },

    #[error("Invalid Miller indices '{input}': {reason}")]
    InvalidHkl { input: String, reason: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid wavelength '{input}'. Use a number in Å (e.g. 1.5406) or a source name: {known}")]
    InvalidWavelength { input: String, known: String },

    // ─────────────────────────────────────────────────────────────
    // 计算与输出
    // ─────────────────────────────────────────────────────────────
    #[error("[{}] {}", .0.code(), .0)]
    Crystallography(#[from] CrystallographyError),

    #[error("Plot rendering failed: {0}")]
    PlotError(String),

    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },
}

impl XrdkitError {
    /// 若为引擎错误，返回其结构化报告
    pub fn report(&self) -> Option<ErrorReport> {
        match self {
            XrdkitError::Crystallography(e) => Some(e.report()),
            _ => None,
        }
    }
}

/// 命令行层 Result 类型别名
pub type AppResult<T> = std::result::Result<T, XrdkitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable_strings() {
        let err = CrystallographyError::GeometricallyImpossible {
            d_spacing: 1.0,
            wavelength: 5.0,
            ratio: 2.5,
        };
        assert_eq!(err.code().as_str(), "GEOMETRICALLY_IMPOSSIBLE");
        assert_eq!(
            CrystallographyError::ZeroIntensity { reason: "empty" }
                .code()
                .to_string(),
            "ZERO_INTENSITY"
        );
    }

    #[test]
    fn test_report_serializes_error_code() {
        let err = CrystallographyError::InsufficientValidPeaks {
            system: "cubic".to_string(),
            required: 3,
            usable: 2,
        };
        let json = serde_json::to_string(&err.report()).unwrap();
        assert!(json.contains("\"errorCode\":\"INSUFFICIENT_VALID_PEAKS\""));
        assert!(json.contains("at least 3"));
    }

    #[test]
    fn test_app_error_wraps_engine_code() {
        let app: XrdkitError = CrystallographyError::InvalidMillerIndices.into();
        assert!(app.to_string().starts_with("[INVALID_MILLER_INDICES]"));
        assert_eq!(
            app.report().map(|r| r.error_code),
            Some(ErrorCode::InvalidMillerIndices)
        );
    }
}
