//! OPF（Open Packaging Format）模块
//!
//! 提供包文档的解析与生成：元数据、清单、脊柱。

pub mod metadata;
pub mod parser;
pub mod writer;

pub use metadata::Metadata;
pub use parser::OpfPackage;
pub use writer::serialize_opf;
