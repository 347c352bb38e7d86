//! # 衍射峰列表解析器
//!
//! 读取 CSV 格式的峰列表。
//!
//! ## 格式说明
//! ```text
//! # Au, Cu Kα1
//! h,k,l,two_theta,intensity
//! 1,1,1,38.18,100
//! 2,0,0,44.39,52
//! ```
//! - 表头不区分大小写，`#` 开头为注释行
//! - Miller 指数可写成 `h,k,l` 三列，或单列 `hkl`（如 `"1 1 1"`、`"(1,-1,0)"`、`111`）
//! - 2θ 列别名: `2theta`, `twotheta`, `angle`
//! - 织构分析使用 `observed` 和 `standard` 列
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `csv`、`serde` 反序列化
//! - 使用 `models/peak.rs` 的 MillerIndex

use crate::error::{AppResult, XrdkitError};
use crate::models::{DiffractionPeak, MillerIndex};
use crate::xrd::TexturePeak;

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// CSV 原始记录
#[derive(Debug, Deserialize)]
struct PeakRecord {
    #[serde(default)]
    h: Option<i32>,
    #[serde(default)]
    k: Option<i32>,
    #[serde(default)]
    l: Option<i32>,
    #[serde(default)]
    hkl: Option<String>,
    #[serde(default, alias = "2theta", alias = "twotheta", alias = "angle")]
    two_theta: Option<f64>,
    #[serde(default, alias = "i")]
    intensity: Option<f64>,
    #[serde(default, alias = "i_obs")]
    observed: Option<f64>,
    #[serde(default, alias = "i_std", alias = "i0")]
    standard: Option<f64>,
}

/// 解析后的一行
#[derive(Debug, Clone, PartialEq)]
pub struct PeakRow {
    /// 源文件行号
    pub line: u64,
    pub hkl: MillerIndex,
    pub two_theta: Option<f64>,
    pub intensity: Option<f64>,
    pub observed: Option<f64>,
    pub standard: Option<f64>,
}

/// 峰列表
#[derive(Debug, Clone)]
pub struct PeakTable {
    /// 来源（文件路径）
    pub source: String,
    pub rows: Vec<PeakRow>,
}

impl PeakTable {
    fn missing(&self, row: &PeakRow, column: &str) -> XrdkitError {
        XrdkitError::ParseError {
            path: self.source.clone(),
            line: row.line,
            reason: format!("missing '{}' value", column),
        }
    }

    /// Miller 指数列表
    pub fn miller_indices(&self) -> Vec<MillerIndex> {
        self.rows.iter().map(|r| r.hkl).collect()
    }

    /// 衍射峰列表（需要 2θ 列）
    ///
    /// 不在此处检查 2θ 范围，交由精修器丢弃无效峰。
    pub fn diffraction_peaks(&self) -> AppResult<Vec<DiffractionPeak>> {
        self.rows
            .iter()
            .map(|row| {
                let two_theta = row.two_theta.ok_or_else(|| self.missing(row, "two_theta"))?;
                Ok(DiffractionPeak {
                    hkl: row.hkl,
                    two_theta,
                    intensity: row.intensity,
                })
            })
            .collect()
    }

    /// (hkl, 强度) 列表
    pub fn intensities(&self) -> AppResult<Vec<(MillerIndex, f64)>> {
        self.rows
            .iter()
            .map(|row| {
                let intensity = row
                    .intensity
                    .or(row.observed)
                    .ok_or_else(|| self.missing(row, "intensity"))?;
                Ok((row.hkl, intensity))
            })
            .collect()
    }

    /// 织构分析输入（需要 observed 和 standard 列）
    pub fn texture_peaks(&self) -> AppResult<Vec<TexturePeak>> {
        self.rows
            .iter()
            .map(|row| {
                let observed = row
                    .observed
                    .or(row.intensity)
                    .ok_or_else(|| self.missing(row, "observed"))?;
                let standard = row.standard.ok_or_else(|| self.missing(row, "standard"))?;
                Ok(TexturePeak {
                    hkl: row.hkl,
                    observed,
                    standard,
                })
            })
            .collect()
    }
}

/// 读取峰列表文件
pub fn parse_peak_file(path: &Path) -> AppResult<PeakTable> {
    if !path.is_file() {
        return Err(XrdkitError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file = File::open(path).map_err(|e| XrdkitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_peaks(file, &path.display().to_string())
}

/// 从任意输入读取峰列表
pub fn parse_peaks<R: Read>(reader: R, source: &str) -> AppResult<PeakTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    // 表头统一为小写
    let headers: csv::StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| h.to_lowercase().replace(['θ', 'Θ'], "theta"))
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let parsed: PeakRecord =
            record
                .deserialize(Some(&headers))
                .map_err(|e| XrdkitError::ParseError {
                    path: source.to_string(),
                    line,
                    reason: e.to_string(),
                })?;
        rows.push(to_row(parsed, source, line)?);
    }

    Ok(PeakTable {
        source: source.to_string(),
        rows,
    })
}

fn to_row(record: PeakRecord, source: &str, line: u64) -> AppResult<PeakRow> {
    let hkl = match (record.h, record.k, record.l, &record.hkl) {
        (Some(h), Some(k), Some(l), _) => MillerIndex { h, k, l },
        (_, _, _, Some(text)) => text
            .parse::<MillerIndex>()
            .map_err(|reason| XrdkitError::InvalidHkl {
                input: text.clone(),
                reason,
            })?,
        _ => {
            return Err(XrdkitError::ParseError {
                path: source.to_string(),
                line,
                reason: "Miller indices required: columns h,k,l or hkl".to_string(),
            })
        }
    };

    Ok(PeakRow {
        line,
        hkl,
        two_theta: record.two_theta,
        intensity: record.intensity,
        observed: record.observed,
        standard: record.standard,
    })
}

/// 解析命令行给出的 Miller 指数
pub fn parse_hkl_arg(input: &str) -> AppResult<MillerIndex> {
    input
        .parse::<MillerIndex>()
        .map_err(|reason| XrdkitError::InvalidHkl {
            input: input.to_string(),
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_columns() {
        let data = "# Au\nH,K,L,2Theta,Intensity\n1,1,1,38.18,100\n2,0,0,44.39,52\n";
        let table = parse_peaks(data.as_bytes(), "test").unwrap();
        assert_eq!(table.rows.len(), 2);
        let peaks = table.diffraction_peaks().unwrap();
        assert_eq!(peaks[0].hkl, MillerIndex::new(1, 1, 1).unwrap());
        assert!((peaks[1].two_theta - 44.39).abs() < 1e-12);
        assert_eq!(peaks[1].intensity, Some(52.0));
    }

    #[test]
    fn test_parse_hkl_column() {
        let data = "hkl,observed,standard\n\"(1 1 1)\",300,100\n200,47,47\n\"2,2,0\",22,22\n";
        let table = parse_peaks(data.as_bytes(), "test").unwrap();
        let texture = table.texture_peaks().unwrap();
        assert_eq!(texture.len(), 3);
        assert_eq!(texture[1].hkl, MillerIndex::new(2, 0, 0).unwrap());
        assert_eq!(texture[0].observed, 300.0);
    }

    #[test]
    fn test_missing_column_reports_line() {
        let data = "h,k,l,intensity\n1,1,1,10\n2,0,0,\n";
        let table = parse_peaks(data.as_bytes(), "peaks.csv").unwrap();
        assert!(table.intensities().is_err());
        match table.diffraction_peaks() {
            Err(XrdkitError::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_indices() {
        let data = "two_theta\n38.2\n";
        assert!(parse_peaks(data.as_bytes(), "x").is_err());
    }

    #[test]
    fn test_hkl_arg() {
        assert_eq!(
            parse_hkl_arg("1,1,0").unwrap(),
            MillerIndex::new(1, 1, 0).unwrap()
        );
        assert!(matches!(
            parse_hkl_arg("0,0,0"),
            Err(XrdkitError::InvalidHkl { .. })
        ));
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peaks.csv");
        std::fs::write(&path, "h,k,l,two_theta\n1,1,1,27.37\n").unwrap();
        let table = parse_peak_file(&path).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert!(parse_peak_file(&dir.path().join("missing.csv")).is_err());
    }
}
