//! # refine 命令实现
//!
//! 由已指标化的峰位最小二乘精修晶格参数。
//!
//! ## 功能
//! - 支持单文件和批量目录处理
//! - 并行计算（rayon）
//! - 导出残差 CSV 与 d_obs/d_calc 对比图 (PNG/SVG)
//!
//! ## 依赖关系
//! - 使用 `cli/refine.rs` 定义的 RefineArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `xrd/refinement.rs` 进行计算
//! - 使用 `parsers/` 读取峰列表

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::refine::RefineArgs;
use crate::utils::output;
use xrdkit::error::{AppResult, XrdkitError};
use xrdkit::parsers::parse_peak_file;
use xrdkit::xrd::{self, LatticeRefiner, RefinementResult};
use xrdkit::CrystalSystem;

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 图像格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlotFormat {
    Png,
    Svg,
}

impl PlotFormat {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("svg") => PlotFormat::Svg,
            _ => PlotFormat::Png,
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }
}

/// 批量模式中单个文件的 JSON 记录
#[derive(Serialize)]
struct BatchEntry {
    input: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// 执行 refine 命令
pub fn execute(args: RefineArgs, json: bool) -> AppResult<()> {
    let system: CrystalSystem = args.system.parse()?;
    let wavelength = args.wavelength.resolve()?;
    let refiner = LatticeRefiner::new(wavelength)?;

    if args.input.is_file() {
        execute_single_file(&args, &refiner, system, json)
    } else if args.input.is_dir() {
        execute_batch(&args, &refiner, system, json)
    } else {
        Err(XrdkitError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 单文件模式
fn execute_single_file(
    args: &RefineArgs,
    refiner: &LatticeRefiner,
    system: CrystalSystem,
    json: bool,
) -> AppResult<()> {
    let peaks = parse_peak_file(&args.input)?.diffraction_peaks()?;
    let result = refiner.refine(&peaks, system)?;

    if let Some(ref path) = args.output {
        xrd::export::refinement_to_csv(&result, path)?;
    }
    if let Some(ref path) = args.plot {
        let title = args.title.clone().unwrap_or_else(|| file_stem(&args.input));
        xrd::plot::generate_refinement_plot(
            &result,
            path,
            &title,
            args.width,
            args.height,
            PlotFormat::from_path(path) == PlotFormat::Svg,
        )?;
    }

    if json {
        return output::print_json(&result);
    }

    output::print_header(&format!("Lattice Refinement ({} system)", system));
    output::print_info(&format!(
        "Loaded {} peaks from '{}'",
        peaks.len(),
        args.input.display()
    ));
    output::print_info(&format!("Using wavelength: {:.4} Å", result.wavelength));
    output::print_advisories(&result.advisories);

    print_residual_table(&result);
    print_summary(&result);

    if let Some(ref path) = args.output {
        output::print_done(&format!("Residuals saved to '{}'", path.display()));
    }
    if let Some(ref path) = args.plot {
        output::print_done(&format!("Plot saved to '{}'", path.display()));
    }

    Ok(())
}

/// 批量处理模式
fn execute_batch(
    args: &RefineArgs,
    refiner: &LatticeRefiner,
    system: CrystalSystem,
    json: bool,
) -> AppResult<()> {
    let files = collect_inputs(&args.input, &args.pattern, args.recursive)?;

    if files.is_empty() {
        return Err(XrdkitError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }

    let output_dir = args.output.clone().unwrap_or_else(|| args.input.clone());
    fs::create_dir_all(&output_dir).map_err(|e| XrdkitError::FileWriteError {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    if !json {
        output::print_header(&format!("Batch Lattice Refinement ({} system)", system));
        output::print_info(&format!(
            "Batch mode: directory '{}'",
            args.input.display()
        ));
        output::print_info(&format!("Found {} peak files", files.len()));
        output::print_info(&format!("Using wavelength: {:.4} Å", refiner.wavelength()));
    }

    let config = BatchRefineConfig {
        output_dir,
        system,
        plot_format: args.plot.as_deref().map(PlotFormat::from_path),
        width: args.width,
        height: args.height,
        overwrite: args.overwrite,
    };

    let runner = BatchRunner::new(args.jobs).quiet(json);
    let (results, summary) =
        runner.run(&files, |file| process_batch_file(file, refiner, &config));

    if json {
        let entries: Vec<BatchEntry> = files
            .iter()
            .zip(&results)
            .map(|(file, result)| batch_entry(file, result))
            .collect();
        return output::print_json(&entries);
    }

    for result in &results {
        match result {
            ProcessResult::Success(msg) => output::print_success(msg),
            ProcessResult::Skipped(msg) => output::print_skip(msg),
            ProcessResult::Failed(..) => {}
        }
    }

    // 打印统计
    output::print_separator();
    output::print_success(&format!(
        "Batch complete ({} files): {} success, {} skipped, {} failed",
        summary.total(),
        summary.success,
        summary.skipped,
        summary.failed
    ));

    if !summary.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in summary.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if summary.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", summary.failures.len() - 10));
        }
    }

    Ok(())
}

/// 批量输出文件名后缀
const REFINED_SUFFIX: &str = "_refined";

/// 收集批量输入，排除此前批量运行写出的结果文件
fn collect_inputs(input: &Path, pattern: &str, recursive: bool) -> AppResult<Vec<PathBuf>> {
    let files = FileCollector::new(input.to_path_buf())
        .with_pattern(pattern)
        .recursive(recursive)
        .collect()?;

    Ok(files
        .into_iter()
        .filter(|f| !file_stem(f).ends_with(REFINED_SUFFIX))
        .collect())
}

/// 批量处理配置
struct BatchRefineConfig {
    output_dir: PathBuf,
    system: CrystalSystem,
    plot_format: Option<PlotFormat>,
    width: u32,
    height: u32,
    overwrite: bool,
}

/// 处理批量模式中的单个文件
fn process_batch_file(
    input: &Path,
    refiner: &LatticeRefiner,
    config: &BatchRefineConfig,
) -> ProcessResult {
    let stem = file_stem(input);
    let output_file = config.output_dir.join(format!("{}{}.csv", stem, REFINED_SUFFIX));

    // 检查是否已存在
    if output_file.exists() && !config.overwrite {
        return ProcessResult::Skipped(format!(
            "Output exists, skipping: {}",
            output_file.display()
        ));
    }

    match refine_file(input, &output_file, &stem, refiner, config) {
        Ok(result) => ProcessResult::Success(format!(
            "{} -> {} ({}, R² = {:.5})",
            input.display(),
            output_file.display(),
            format_lattice(&result),
            result.r_squared
        )),
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

/// 精修单个文件并写出结果
fn refine_file(
    input: &Path,
    output_file: &Path,
    stem: &str,
    refiner: &LatticeRefiner,
    config: &BatchRefineConfig,
) -> AppResult<RefinementResult> {
    let peaks = parse_peak_file(input)?.diffraction_peaks()?;
    let result = refiner.refine(&peaks, config.system)?;

    xrd::export::refinement_to_csv(&result, output_file)?;

    if let Some(format) = config.plot_format {
        let plot_file = config
            .output_dir
            .join(format!("{}{}.{}", stem, REFINED_SUFFIX, format.extension()));
        xrd::plot::generate_refinement_plot(
            &result,
            &plot_file,
            stem,
            config.width,
            config.height,
            format == PlotFormat::Svg,
        )?;
    }

    Ok(result)
}

fn batch_entry(file: &Path, result: &ProcessResult) -> BatchEntry {
    let input = file.display().to_string();
    match result {
        ProcessResult::Success(msg) => BatchEntry {
            input,
            status: "success",
            message: Some(msg.clone()),
        },
        ProcessResult::Skipped(msg) => BatchEntry {
            input,
            status: "skipped",
            message: Some(msg.clone()),
        },
        ProcessResult::Failed(_, err) => BatchEntry {
            input,
            status: "failed",
            message: Some(err.clone()),
        },
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("peaks")
        .to_string()
}

/// 晶格参数的简短文本
fn format_lattice(result: &RefinementResult) -> String {
    result
        .lattice
        .named_values()
        .iter()
        .map(|(name, value)| format!("{} = {:.4} Å", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 打印残差表格
fn print_residual_table(result: &RefinementResult) {
    #[derive(Tabled)]
    struct ResidualRow {
        #[tabled(rename = "(hkl)")]
        hkl: String,
        #[tabled(rename = "2θ obs (°)")]
        two_theta_obs: String,
        #[tabled(rename = "2θ calc (°)")]
        two_theta_calc: String,
        #[tabled(rename = "d obs (Å)")]
        d_obs: String,
        #[tabled(rename = "d calc (Å)")]
        d_calc: String,
        #[tabled(rename = "Δd (Å)")]
        delta_d: String,
    }

    let rows: Vec<ResidualRow> = result
        .residuals
        .iter()
        .map(|r| ResidualRow {
            hkl: r.hkl.to_string(),
            two_theta_obs: format!("{:.3}", r.two_theta_obs),
            two_theta_calc: r
                .two_theta_calc
                .map(|v| format!("{:.3}", v))
                .unwrap_or_else(|| "-".to_string()),
            d_obs: format!("{:.5}", r.d_obs),
            d_calc: format!("{:.5}", r.d_calc),
            delta_d: format!("{:+.5}", r.delta_d()),
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }
}

/// 打印精修摘要
fn print_summary(result: &RefinementResult) {
    output::print_separator();
    output::print_success(&format!("Refined {}", format_lattice(result)));
    output::print_info(&format!("Cell volume: {:.4} Å³", result.volume));
    output::print_info(&format!(
        "R² = {:.6} ({} fit, {} peaks used)",
        result.r_squared, result.quality, result.peaks_used
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_format_from_path() {
        assert_eq!(PlotFormat::from_path(Path::new("fit.SVG")), PlotFormat::Svg);
        assert_eq!(PlotFormat::from_path(Path::new("fit.png")), PlotFormat::Png);
        assert_eq!(PlotFormat::from_path(Path::new("fit")), PlotFormat::Png);
    }

    #[test]
    fn test_batch_file_writes_residuals() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("nacl.csv");
        fs::write(
            &input,
            "h,k,l,two_theta\n1,1,1,27.367\n2,0,0,31.704\n2,2,0,45.449\n3,1,1,53.866\n",
        )
        .unwrap();

        let config = BatchRefineConfig {
            output_dir: dir.path().to_path_buf(),
            system: CrystalSystem::Cubic,
            plot_format: None,
            width: 600,
            height: 400,
            overwrite: false,
        };
        let refiner = LatticeRefiner::new(1.5406).unwrap();

        let first = process_batch_file(&input, &refiner, &config);
        assert!(matches!(first, ProcessResult::Success(_)), "{:?}", first);
        assert!(dir.path().join("nacl_refined.csv").exists());

        let second = process_batch_file(&input, &refiner, &config);
        assert!(matches!(second, ProcessResult::Skipped(_)));
    }

    #[test]
    fn test_rerun_ignores_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("nacl.csv"),
            "h,k,l,two_theta\n1,1,1,27.367\n2,0,0,31.704\n2,2,0,45.449\n3,1,1,53.866\n",
        )
        .unwrap();

        let config = BatchRefineConfig {
            output_dir: dir.path().to_path_buf(),
            system: CrystalSystem::Cubic,
            plot_format: None,
            width: 600,
            height: 400,
            overwrite: false,
        };
        let refiner = LatticeRefiner::new(1.5406).unwrap();

        let first = collect_inputs(dir.path(), "*.csv", false).unwrap();
        assert_eq!(first.len(), 1);
        for file in &first {
            assert!(matches!(
                process_batch_file(file, &refiner, &config),
                ProcessResult::Success(_)
            ));
        }

        // 第二次运行只看到原始输入，结果文件已存在而跳过
        let second = collect_inputs(dir.path(), "*.csv", false).unwrap();
        assert_eq!(second, first);
        for file in &second {
            let result = process_batch_file(file, &refiner, &config);
            assert!(matches!(result, ProcessResult::Skipped(_)), "{:?}", result);
        }
    }
}
