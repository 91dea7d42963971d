//! 元数据模块
//!
//! 提供OPF元数据的结构定义。合并时基础文档的元数据整体保留，
//! 追加文档只贡献每个清单项的来源信息（dc:source）。

use std::collections::HashMap;

/// OPF元数据信息
#[derive(Debug, Clone)]
pub struct Metadata {
    /// 书名
    pub title: Option<String>,
    /// 语言
    pub language: Option<String>,
    /// 唯一标识符
    pub identifier: Option<String>,
    /// 创建者（作者）列表
    pub creators: Vec<String>,
    /// 清单项ID到来源URL的映射（dc:source）
    pub sources: HashMap<String, String>,
    /// 其他Dublin Core元数据（原样保留）
    pub other: Vec<(String, String)>,
}

impl Metadata {
    /// 创建空的元数据
    pub fn new() -> Self {
        Self {
            title: None,
            language: None,
            identifier: None,
            creators: Vec::new(),
            sources: HashMap::new(),
            other: Vec::new(),
        }
    }

    /// 记录一个清单项的来源
    ///
    /// # 参数
    /// * `item_id` - 清单项ID
    /// * `source` - 来源URL
    pub fn add_source(&mut self, item_id: String, source: String) {
        self.sources.insert(item_id, source);
    }

    /// 查询清单项的来源
    pub fn source_for(&self, item_id: &str) -> Option<&str> {
        self.sources.get(item_id).map(|s| s.as_str())
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}
