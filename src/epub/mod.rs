//! EPUB文档模块
//!
//! 提供完整加载到内存中的EPUB文档模型，以及读取、写入、
//! 路径工具等子模块。

pub mod container;
pub mod error;
pub mod item;
pub mod ncx;
pub mod opf;
pub mod paths;
pub mod reader;
pub mod writer;

pub use container::{Container, RootFile};
pub use error::{EpubError, Result};
pub use item::EpubItem;
pub use ncx::TocEntry;
pub use opf::Metadata;

use std::path::Path;

/// 一个完整加载到内存中的EPUB文档
///
/// 清单按文档内顺序保存（合并时顺序有意义），脊柱是清单项ID的
/// 有序列表，目录树中的content路径均为容器内绝对路径。
#[derive(Debug, Clone)]
pub struct Epub {
    /// EPUB版本
    pub version: String,
    /// OPF文件的容器内路径
    pub opf_path: String,
    /// 元数据
    pub metadata: Metadata,
    /// 清单项（有序，ID唯一）
    pub manifest: Vec<EpubItem>,
    /// 脊柱（阅读顺序的清单项ID）
    pub spine: Vec<String>,
    /// 目录树的顶层条目
    pub toc: Vec<TocEntry>,
}

impl Epub {
    /// 创建一个空的EPUB文档
    ///
    /// # 参数
    /// * `opf_path` - OPF文件的容器内路径
    pub fn empty(opf_path: &str) -> Self {
        Self {
            version: "2.0".to_string(),
            opf_path: opf_path.to_string(),
            metadata: Metadata::new(),
            manifest: Vec::new(),
            spine: Vec::new(),
            toc: Vec::new(),
        }
    }

    /// 从文件路径加载EPUB文档
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<Epub>` - 成功返回完整加载的文档，失败返回错误
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Epub> {
        reader::read_epub(path)
    }

    /// 将EPUB文档写入文件
    ///
    /// # 参数
    /// * `path` - 输出文件路径
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        writer::write_epub(self, path)
    }

    /// 获取所有XHTML页面项
    pub fn page_items(&self) -> Vec<&EpubItem> {
        self.manifest.iter().filter(|i| i.is_page()).collect()
    }

    /// 获取所有图片项
    pub fn image_items(&self) -> Vec<&EpubItem> {
        self.manifest.iter().filter(|i| i.is_image()).collect()
    }

    /// 根据ID查找清单项
    pub fn item_by_id(&self, id: &str) -> Option<&EpubItem> {
        self.manifest.iter().find(|i| i.id == id)
    }

    /// 根据容器内绝对路径查找清单项
    pub fn item_by_path(&self, absolute_path: &str) -> Option<&EpubItem> {
        self.manifest.iter().find(|i| i.absolute_path == absolute_path)
    }

    /// 追加一个清单项，并记录其来源（如果有）
    ///
    /// # 参数
    /// * `item` - 新的清单项
    /// * `source` - 该项的来源URL
    pub fn append_item(&mut self, item: EpubItem, source: Option<String>) {
        if let Some(source) = source {
            self.metadata.add_source(item.id.clone(), source);
        }
        self.manifest.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, path: &str, media_type: &str) -> EpubItem {
        EpubItem::new(
            id.to_string(),
            path.to_string(),
            media_type.to_string(),
            Vec::new(),
        )
    }

    #[test]
    fn test_page_and_image_selection() {
        let mut epub = Epub::empty("OEBPS/content.opf");
        epub.append_item(
            item("xhtml0001", "OEBPS/Text/0001_ch1.xhtml", "application/xhtml+xml"),
            None,
        );
        epub.append_item(item("image0001", "OEBPS/Images/0001_pic.jpg", "image/jpeg"), None);
        epub.append_item(item("css", "OEBPS/Styles/stylesheet.css", "text/css"), None);

        assert_eq!(epub.page_items().len(), 1);
        assert_eq!(epub.image_items().len(), 1);
        assert!(epub.item_by_id("css").is_some());
        assert!(epub.item_by_path("OEBPS/Images/0001_pic.jpg").is_some());
    }

    #[test]
    fn test_append_item_records_source() {
        let mut epub = Epub::empty("OEBPS/content.opf");
        epub.append_item(
            item("xhtml0001", "OEBPS/Text/0001_ch1.xhtml", "application/xhtml+xml"),
            Some("https://example.com/chapter-1".to_string()),
        );

        assert_eq!(
            epub.metadata.source_for("xhtml0001"),
            Some("https://example.com/chapter-1")
        );
    }
}
