//! NCX（导航控制文件）模块
//!
//! 提供目录树的结构定义、解析与生成。

pub mod parser;
pub mod toc;
pub mod writer;

pub use parser::parse_ncx;
pub use toc::TocEntry;
pub use writer::serialize_ncx;
