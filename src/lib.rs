pub mod epub;
pub mod merge;

// === 核心API重新导出 ===

/// EPUB文档（主要接口）
pub use epub::Epub;

/// 错误处理
pub use epub::{EpubError, Result};

// === 数据结构 ===

/// 清单项
pub use epub::EpubItem;

/// 元数据
pub use epub::Metadata;

/// 目录条目
pub use epub::TocEntry;

// === 合并组件 ===

/// 合并器
pub use merge::{Combiner, combine};

/// 合并配置
pub use merge::MergeConfig;

/// 质量检查
pub use merge::{QualityIssue, scan_for_issues};

/// 重新编号
pub use merge::{Remapping, compute_remapping};

/// 内容指纹
pub use merge::Signature;

// === 底层组件（高级用法） ===

/// 容器组件
pub use epub::{Container, RootFile};

// === 库信息 ===

/// BookFuse库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// BookFuse库的描述
pub const DESCRIPTION: &str = "一个用于合并EPUB文件的Rust库";

/// 库的主页
pub const HOMEPAGE: &str = "https://github.com/FWW321/bookfuse";

// === 便捷函数 ===

/// 快速打开EPUB文件
///
/// 这是 `Epub::from_path` 的便捷包装函数。
///
/// # 参数
/// * `path` - EPUB文件路径
///
/// # 返回值
/// * `Result<Epub>` - EPUB实例
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Epub> {
    Epub::from_path(path)
}

/// 把一组EPUB文件合并成一个并写到输出路径
///
/// 第一个文件作为基础文档，其余文件按给定顺序依次追加。
/// 任何一步失败都不会产生输出文件。
///
/// # 参数
/// * `inputs` - 输入文件路径，至少一个
/// * `output` - 输出文件路径
///
/// # 返回值
/// * `Result<Epub>` - 合并后的EPUB实例
pub fn merge_files<P: AsRef<std::path::Path>>(inputs: &[P], output: P) -> Result<Epub> {
    let mut iter = inputs.iter();
    let first = iter
        .next()
        .ok_or_else(|| EpubError::ConfigError("至少需要一个输入文件".to_string()))?;

    let mut base = Epub::from_path(first)?;
    for input in iter {
        let appendage = Epub::from_path(input)?;
        combine(&mut base, &appendage)?;
    }
    base.write_to_path(output)?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        println!("BookFuse version: {}", VERSION);
    }

    #[test]
    fn test_description() {
        assert!(!DESCRIPTION.is_empty());
        println!("Description: {}", DESCRIPTION);
    }

    #[test]
    fn test_homepage() {
        assert!(!HOMEPAGE.is_empty());
        println!("Homepage: {}", HOMEPAGE);
    }
}
