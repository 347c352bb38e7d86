//! # 分析结果导出
//!
//! 将精修残差、归一化强度和织构系数写为 CSV。
//!
//! ## 依赖关系
//! - 被 `commands/refine.rs`、`commands/normalize.rs`、`commands/texture.rs` 调用
//! - 使用 `csv` crate

use crate::error::{AppResult, XrdkitError};
use crate::xrd::{NormalizedPattern, RefinementResult, TextureAnalysis};

use std::path::Path;

/// 打开 CSV 写入器并写入表头
fn open_writer(output_path: &Path, header: &[&str]) -> AppResult<csv::Writer<std::fs::File>> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record(header)?;
    Ok(wtr)
}

fn finish(mut wtr: csv::Writer<std::fs::File>, output_path: &Path) -> AppResult<()> {
    wtr.flush().map_err(|e| XrdkitError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}

/// 导出精修残差
pub fn refinement_to_csv(result: &RefinementResult, output_path: &Path) -> AppResult<()> {
    let mut wtr = open_writer(
        output_path,
        &[
            "h",
            "k",
            "l",
            "2theta_obs",
            "2theta_calc",
            "delta_2theta",
            "d_obs",
            "d_calc",
            "delta_d",
        ],
    )?;

    for res in &result.residuals {
        let fmt_opt = |v: Option<f64>| v.map(|x| format!("{:.4}", x)).unwrap_or_default();
        wtr.write_record(&[
            res.hkl.h.to_string(),
            res.hkl.k.to_string(),
            res.hkl.l.to_string(),
            format!("{:.4}", res.two_theta_obs),
            fmt_opt(res.two_theta_calc),
            fmt_opt(res.delta_two_theta()),
            format!("{:.6}", res.d_obs),
            format!("{:.6}", res.d_calc),
            format!("{:.6}", res.delta_d()),
        ])?;
    }

    finish(wtr, output_path)
}

/// 导出归一化强度
pub fn normalized_to_csv(pattern: &NormalizedPattern, output_path: &Path) -> AppResult<()> {
    let mut wtr = open_writer(output_path, &["h", "k", "l", "intensity", "relative_percent"])?;

    for peak in &pattern.peaks {
        wtr.write_record(&[
            peak.hkl.h.to_string(),
            peak.hkl.k.to_string(),
            peak.hkl.l.to_string(),
            format!("{}", peak.intensity),
            format!("{:.2}", peak.relative_percent),
        ])?;
    }

    finish(wtr, output_path)
}

/// 导出织构系数
pub fn texture_to_csv(analysis: &TextureAnalysis, output_path: &Path) -> AppResult<()> {
    let mut wtr = open_writer(
        output_path,
        &["h", "k", "l", "ratio", "texture_coefficient", "orientation"],
    )?;

    for tc in &analysis.coefficients {
        wtr.write_record(&[
            tc.hkl.h.to_string(),
            tc.hkl.k.to_string(),
            tc.hkl.l.to_string(),
            format!("{:.6}", tc.ratio),
            format!("{:.4}", tc.coefficient),
            tc.orientation.to_string(),
        ])?;
    }

    finish(wtr, output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MillerIndex;
    use crate::xrd::normalize_intensities;

    #[test]
    fn test_normalized_csv() {
        let pattern = normalize_intensities(&[
            (MillerIndex::new(1, 1, 1).unwrap(), 80.0),
            (MillerIndex::new(2, 0, 0).unwrap(), 160.0),
        ])
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("norm.csv");
        normalized_to_csv(&pattern, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "h,k,l,intensity,relative_percent");
        assert_eq!(lines[1], "1,1,1,80,50.00");
        assert_eq!(lines[2], "2,0,0,160,100.00");
    }
}
