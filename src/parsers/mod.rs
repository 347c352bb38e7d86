//! # 解析器模块
//!
//! 读取衍射峰列表文件和命令行中的 Miller 指数。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: peaks

pub mod peaks;

pub use peaks::{parse_hkl_arg, parse_peak_file, parse_peaks, PeakRow, PeakTable};
