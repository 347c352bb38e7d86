//! # 数据模型模块
//!
//! 定义衍射峰、晶系、晶格参数和计算提示等不可变值类型。
//!
//! ## 依赖关系
//! - 被 `xrd/`、`parsers/` 和 `commands/` 使用
//! - 子模块: peak, lattice, advisory

pub mod advisory;
pub mod lattice;
pub mod peak;

pub use advisory::Advisory;
pub use lattice::{CrystalSystem, LatticeParameters};
pub use peak::{DiffractionPeak, MillerIndex};
