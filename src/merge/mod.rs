//! EPUB合并模块
//!
//! 提供两个EPUB文档的合并：重新编号、引用重写、目录与脊柱合并，
//! 以及基于内容指纹的疑似重复检测。

pub mod combiner;
pub mod config;
pub mod quality;
pub mod remap;
pub mod rewrite;
pub mod signature;

pub use combiner::{Combiner, combine};
pub use config::MergeConfig;
pub use quality::{QualityIssue, scan_for_issues};
pub use remap::{Remapping, compute_remapping};
pub use signature::Signature;
