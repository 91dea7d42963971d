//! 目录条目模块
//!
//! 提供导航树节点的结构定义。树中不存在环，深度任意。

/// 目录树中的一个条目
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// 标题
    pub title: String,
    /// 目标内容路径（容器内绝对路径，可带`#锚点`）
    pub content_src: String,
    /// 子条目（保持原有顺序）
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    /// 创建新的目录条目
    pub fn new(title: String, content_src: String) -> Self {
        Self {
            title,
            content_src,
            children: Vec::new(),
        }
    }

    /// 添加子条目
    pub fn add_child(&mut self, child: TocEntry) {
        self.children.push(child);
    }

    /// 获取条目及其所有子条目的数量
    pub fn total_entries(&self) -> usize {
        1 + self.children.iter().map(|c| c.total_entries()).sum::<usize>()
    }

    /// 获取条目的最大深度
    pub fn depth(&self) -> u32 {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }
}

/// 统计一组顶层条目的总数
pub fn count_entries(entries: &[TocEntry]) -> usize {
    entries.iter().map(|e| e.total_entries()).sum()
}
