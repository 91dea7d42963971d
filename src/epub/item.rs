//! 清单项模块
//!
//! 提供EPUB清单中单个文件条目的结构定义。

use crate::epub::paths;

/// 清单项信息
///
/// 每个清单项对应容器内的一个文件，持有文件的原始字节。
/// 从源EPUB读取后不再修改；合并时以新ID和新路径整体替换。
#[derive(Debug, Clone)]
pub struct EpubItem {
    /// 项目ID（在所属文档内唯一）
    pub id: String,
    /// 容器内的绝对路径
    pub absolute_path: String,
    /// 媒体类型
    pub media_type: String,
    /// 文件的原始字节
    pub raw_bytes: Vec<u8>,
}

impl EpubItem {
    /// 创建新的清单项
    pub fn new(id: String, absolute_path: String, media_type: String, raw_bytes: Vec<u8>) -> Self {
        Self {
            id,
            absolute_path,
            media_type,
            raw_bytes,
        }
    }

    /// 检查是否为XHTML页面
    pub fn is_page(&self) -> bool {
        self.media_type == "application/xhtml+xml"
    }

    /// 检查是否为图片文件
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// 获取文件名部分（不含目录）
    pub fn file_name(&self) -> &str {
        paths::zip_file_name(&self.absolute_path)
    }

    /// 获取所在目录
    pub fn directory(&self) -> &str {
        paths::zip_directory(&self.absolute_path)
    }
}
