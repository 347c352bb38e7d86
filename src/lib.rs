//! # xrdkit - 粉末衍射数据分析库
//!
//! 从衍射峰列表出发的晶体学计算：
//! - Bragg 定律 2θ ⇄ d 换算
//! - 各晶系 d(hkl) 公式
//! - Scherrer 晶粒尺寸估算
//! - 系统消光判别点阵类型
//! - 强度归一化与 Harris 织构系数
//! - 晶格参数最小二乘精修
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── error.rs    (错误类型与错误码)
//!   ├── models/     (Miller 指数、衍射峰、晶格参数)
//!   ├── parsers/    (峰列表 CSV 解析)
//!   └── xrd/        (计算核心、导出、绘图)
//! ```

pub mod error;
pub mod models;
pub mod parsers;
pub mod xrd;

pub use error::{CrystallographyError, ErrorCode, ErrorReport, XrdkitError};
pub use models::{Advisory, CrystalSystem, DiffractionPeak, LatticeParameters, MillerIndex};
