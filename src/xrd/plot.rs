//! # 精修结果图表
//!
//! 使用 `plotters` 库绘制 d_obs 对 d_calc 的对比图，附 y = x 参考线和 (hkl) 标注。
//!
//! ## 功能
//! - 支持 PNG 和 SVG 输出
//! - 标注晶格参数与 R²
//!
//! ## 依赖关系
//! - 被 `commands/refine.rs` 调用
//! - 使用 `xrd/refinement.rs` 的 RefinementResult
//! - 使用 `plotters` 渲染图表

use crate::error::{AppResult, XrdkitError};
use crate::xrd::RefinementResult;

use plotters::prelude::*;
use std::path::Path;

/// 生成精修对比图
pub fn generate_refinement_plot(
    result: &RefinementResult,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> AppResult<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_refinement_chart(&root, result, title)?;
        root.present()
            .map_err(|e| XrdkitError::PlotError(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_refinement_chart(&root, result, title)?;
        root.present()
            .map_err(|e| XrdkitError::PlotError(e.to_string()))?;
    }
    Ok(())
}

/// 绘制图表的核心逻辑
fn draw_refinement_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    result: &RefinementResult,
    title: &str,
) -> AppResult<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| XrdkitError::PlotError(format!("{:?}", e)))?;

    let (lo, hi) = result
        .residuals
        .iter()
        .flat_map(|r| [r.d_obs, r.d_calc])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        });
    let (lo, hi) = if lo.is_finite() && hi > lo {
        let margin = (hi - lo) * 0.08;
        ((lo - margin).max(0.0), hi + margin)
    } else {
        (0.0, 10.0)
    };

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, lo..hi)
        .map_err(|e| XrdkitError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("d observed (Å)")
        .y_desc("d calculated (Å)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| XrdkitError::PlotError(format!("{:?}", e)))?;

    // y = x 参考线
    chart
        .draw_series(LineSeries::new(
            vec![(lo, lo), (hi, hi)],
            BLACK.mix(0.4).stroke_width(1),
        ))
        .map_err(|e| XrdkitError::PlotError(format!("{:?}", e)))?;

    let point_color = RGBColor(0, 102, 204);
    chart
        .draw_series(
            result
                .residuals
                .iter()
                .map(|r| Circle::new((r.d_obs, r.d_calc), 5, point_color.filled())),
        )
        .map_err(|e| XrdkitError::PlotError(format!("{:?}", e)))?;

    let offset = (hi - lo) * 0.015;
    for res in &result.residuals {
        let label = format!("({}{}{})", res.hkl.h, res.hkl.k, res.hkl.l);
        chart
            .draw_series(std::iter::once(Text::new(
                label,
                (res.d_obs + offset, res.d_calc + offset),
                ("sans-serif", 12).into_font().color(&BLACK),
            )))
            .map_err(|e| XrdkitError::PlotError(format!("{:?}", e)))?;
    }

    // 晶格参数与拟合优度
    let params = result
        .lattice
        .named_values()
        .iter()
        .map(|(name, value)| format!("{} = {:.4} Å", name, value))
        .collect::<Vec<_>>()
        .join(", ");
    let summary = format!("{}   R² = {:.5}", params, result.r_squared);
    chart
        .draw_series(std::iter::once(Text::new(
            summary,
            (lo + (hi - lo) * 0.03, hi - (hi - lo) * 0.05),
            ("sans-serif", 14).into_font().color(&BLACK),
        )))
        .map_err(|e| XrdkitError::PlotError(format!("{:?}", e)))?;

    Ok(())
}
