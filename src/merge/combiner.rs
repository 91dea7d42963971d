//! 合并编排模块
//!
//! 驱动端到端的合并流程：
//! 1. 计算追加文档全部页面/图片的新路径和新ID（映射表此后只读）；
//! 2. 逐项复制：页面经引用重写后追加，图片原字节追加，
//!    其他媒体类型（样式表等）跳过；来源信息按项查找并随项记录；
//! 3. 递归复制追加文档的目录树并替换content路径，接在基础文档
//!    目录之后；
//! 4. 按原顺序把追加文档脊柱换成新ID，接在基础文档脊柱之后。
//!
//! 任何一步映射查找失败都会中止合并并返回`MappingMiss`；
//! 此时基础文档可能已被部分修改，调用方应丢弃而不是写出。

use crate::epub::error::{EpubError, Result};
use crate::epub::item::EpubItem;
use crate::epub::ncx::TocEntry;
use crate::epub::Epub;
use crate::merge::remap::{Remapping, compute_remapping};
use crate::merge::rewrite::rewrite_page;
use std::collections::HashMap;

/// EPUB合并器
///
/// 持有基础文档的可变引用；追加文档只读。可以连续追加多个文档，
/// 每次追加都基于基础文档当前的状态重新计算映射。
pub struct Combiner<'a> {
    base: &'a mut Epub,
    remapping: Remapping,
}

impl<'a> Combiner<'a> {
    /// 创建合并器
    ///
    /// # 参数
    /// * `base` - 基础文档（原地修改）
    pub fn new(base: &'a mut Epub) -> Self {
        Self {
            base,
            remapping: Remapping::default(),
        }
    }

    /// 把追加文档合并到基础文档之后
    ///
    /// # 参数
    /// * `appendage` - 追加文档（只读）
    pub fn add(&mut self, appendage: &Epub) -> Result<()> {
        self.remapping = compute_remapping(self.base, appendage);

        for item in &appendage.manifest {
            self.copy_item(appendage, item)?;
        }
        self.merge_toc(appendage)?;
        self.merge_spine(appendage)?;

        log::debug!(
            "合并完成: 基础文档现有 {} 个清单项, {} 个脊柱条目",
            self.base.manifest.len(),
            self.base.spine.len()
        );
        Ok(())
    }

    /// 复制单个清单项
    fn copy_item(&mut self, appendage: &Epub, item: &EpubItem) -> Result<()> {
        if item.is_page() {
            log::debug!("正在修复页面引用: {}", item.absolute_path);
            let content = String::from_utf8_lossy(&item.raw_bytes);
            let new_bytes = rewrite_page(&content, item.directory(), &self.remapping.paths)?;
            self.append_remapped(appendage, item, new_bytes)
        } else if item.is_image() {
            self.append_remapped(appendage, item, item.raw_bytes.clone())
        } else {
            // 其他媒体类型不复制，也不会被后续步骤引用
            Ok(())
        }
    }

    /// 以新ID和新路径把一个项追加到基础文档
    fn append_remapped(
        &mut self,
        appendage: &Epub,
        item: &EpubItem,
        raw_bytes: Vec<u8>,
    ) -> Result<()> {
        let new_id = self
            .remapping
            .ids
            .get(&item.id)
            .ok_or_else(|| EpubError::MappingMiss(item.id.clone()))?;
        let new_path = self
            .remapping
            .paths
            .get(&item.absolute_path)
            .ok_or_else(|| EpubError::MappingMiss(item.absolute_path.clone()))?;
        let source = appendage.metadata.source_for(&item.id).map(String::from);

        self.base.append_item(
            EpubItem::new(
                new_id.clone(),
                new_path.clone(),
                item.media_type.clone(),
                raw_bytes,
            ),
            source,
        );
        Ok(())
    }

    /// 合并目录树
    fn merge_toc(&mut self, appendage: &Epub) -> Result<()> {
        let new_entries = copy_toc_entries(&appendage.toc, &self.remapping.paths)?;
        self.base.toc.extend(new_entries);
        Ok(())
    }

    /// 合并脊柱
    fn merge_spine(&mut self, appendage: &Epub) -> Result<()> {
        for idref in &appendage.spine {
            let new_id = self
                .remapping
                .ids
                .get(idref)
                .ok_or_else(|| EpubError::MappingMiss(idref.clone()))?;
            self.base.spine.push(new_id.clone());
        }
        Ok(())
    }
}

/// 合并两个EPUB文档的便捷函数
///
/// # 参数
/// * `base` - 基础文档（原地修改）
/// * `appendage` - 追加文档（只读）
pub fn combine(base: &mut Epub, appendage: &Epub) -> Result<()> {
    Combiner::new(base).add(appendage)
}

/// 递归复制一组目录条目，替换每个条目的content路径
///
/// 复制产生全新的树，与追加文档的目录树不共享任何节点。
fn copy_toc_entries(
    entries: &[TocEntry],
    path_mapping: &HashMap<String, String>,
) -> Result<Vec<TocEntry>> {
    entries
        .iter()
        .map(|entry| copy_toc_entry(entry, path_mapping))
        .collect()
}

fn copy_toc_entry(entry: &TocEntry, path_mapping: &HashMap<String, String>) -> Result<TocEntry> {
    // content路径可以带锚点，锚点不参与映射查找
    let (path, fragment) = match entry.content_src.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (entry.content_src.as_str(), None),
    };
    let new_path = path_mapping
        .get(path)
        .ok_or_else(|| EpubError::MappingMiss(path.to_string()))?;

    let mut content_src = new_path.clone();
    if let Some(fragment) = fragment {
        content_src.push('#');
        content_src.push_str(fragment);
    }

    Ok(TocEntry {
        title: entry.title.clone(),
        content_src,
        children: copy_toc_entries(&entry.children, path_mapping)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: &str, path: &str, body: &str) -> EpubItem {
        EpubItem::new(
            id.to_string(),
            path.to_string(),
            "application/xhtml+xml".to_string(),
            format!(
                "<html xmlns=\"http://www.w3.org/1999/xhtml\"><body>{}</body></html>",
                body
            )
            .into_bytes(),
        )
    }

    fn image(id: &str, path: &str) -> EpubItem {
        EpubItem::new(
            id.to_string(),
            path.to_string(),
            "image/jpeg".to_string(),
            vec![0xff, 0xd8, 0xff],
        )
    }

    fn stylesheet(id: &str, path: &str) -> EpubItem {
        EpubItem::new(
            id.to_string(),
            path.to_string(),
            "text/css".to_string(),
            b"p { margin: 0; }".to_vec(),
        )
    }

    fn sample_base() -> Epub {
        let mut base = Epub::empty("OEBPS/content.opf");
        base.metadata.title = Some("Base Book".to_string());
        base.append_item(page("cover", "OEBPS/Text/0000_cover.xhtml", "<p>封面</p>"), None);
        base.append_item(page("xhtml0001", "OEBPS/Text/0001_ch1.xhtml", "<p>第一章</p>"), None);
        base.spine.push("cover".to_string());
        base.spine.push("xhtml0001".to_string());
        base.toc.push(TocEntry::new(
            "第一章".to_string(),
            "OEBPS/Text/0001_ch1.xhtml".to_string(),
        ));
        base
    }

    fn sample_appendage() -> Epub {
        let mut appendage = Epub::empty("OEBPS/content.opf");
        appendage.append_item(
            page(
                "xhtml0001",
                "OEBPS/Text/0001_ch2.xhtml",
                r#"<p>第二章</p><a href="0001_ch2.xhtml#note">注</a><img src="../Images/0001_pic.jpg"/>"#,
            ),
            Some("https://example.com/chapter-2".to_string()),
        );
        appendage.append_item(image("image0001", "OEBPS/Images/0001_pic.jpg"), None);
        appendage.append_item(stylesheet("css", "OEBPS/Styles/stylesheet.css"), None);
        appendage.spine.push("xhtml0001".to_string());
        let mut entry = TocEntry::new(
            "第二章".to_string(),
            "OEBPS/Text/0001_ch2.xhtml".to_string(),
        );
        entry.add_child(TocEntry::new(
            "注".to_string(),
            "OEBPS/Text/0001_ch2.xhtml#note".to_string(),
        ));
        appendage.toc.push(entry);
        appendage
    }

    #[test]
    fn test_combine_renumbers_and_rewrites() {
        let mut base = sample_base();
        let appendage = sample_appendage();
        combine(&mut base, &appendage).expect("合并失败");

        // 基础文档最大页面前缀1，追加页面旧前缀1: 1 + (1+1) + 1 = 4
        let new_page = base
            .item_by_path("OEBPS/Text/0004_ch2.xhtml")
            .expect("没有找到重新编号后的页面");
        assert_eq!(new_page.id, "xhtml0004");

        // 基础文档没有图片，追加图片旧前缀1: 1 + (0+1) + 1 = 3
        assert!(base.item_by_path("OEBPS/Images/0003_pic.jpg").is_some());

        // 页面内的自引用锚点和图片引用均已改写
        let content = String::from_utf8_lossy(&new_page.raw_bytes).to_string();
        assert!(content.contains(r#"<a href="0004_ch2.xhtml#note">"#));
        assert!(content.contains(r#"<img src="../Images/0003_pic.jpg"/>"#));

        // 样式表被跳过
        assert!(base.item_by_path("OEBPS/Styles/stylesheet.css").is_none());
        assert_eq!(base.manifest.len(), 4);
    }

    #[test]
    fn test_combine_merges_spine_in_order() {
        let mut base = sample_base();
        combine(&mut base, &sample_appendage()).expect("合并失败");

        assert_eq!(
            base.spine,
            vec![
                "cover".to_string(),
                "xhtml0001".to_string(),
                "xhtml0004".to_string()
            ]
        );
    }

    #[test]
    fn test_combine_merges_toc_tree() {
        let mut base = sample_base();
        combine(&mut base, &sample_appendage()).expect("合并失败");

        assert_eq!(base.toc.len(), 2);
        let appended = &base.toc[1];
        assert_eq!(appended.title, "第二章");
        assert_eq!(appended.content_src, "OEBPS/Text/0004_ch2.xhtml");
        assert_eq!(appended.children.len(), 1);
        assert_eq!(
            appended.children[0].content_src,
            "OEBPS/Text/0004_ch2.xhtml#note"
        );
    }

    #[test]
    fn test_combine_records_source_under_new_id() {
        let mut base = sample_base();
        combine(&mut base, &sample_appendage()).expect("合并失败");

        assert_eq!(
            base.metadata.source_for("xhtml0004"),
            Some("https://example.com/chapter-2")
        );
    }

    #[test]
    fn test_dangling_toc_entry_aborts() {
        let mut base = sample_base();
        let mut appendage = sample_appendage();
        appendage.toc.push(TocEntry::new(
            "悬空条目".to_string(),
            "OEBPS/Text/gone.xhtml".to_string(),
        ));

        let result = combine(&mut base, &appendage);
        assert!(matches!(result, Err(EpubError::MappingMiss(path)) if path == "OEBPS/Text/gone.xhtml"));
    }

    #[test]
    fn test_dangling_spine_entry_aborts() {
        let mut base = sample_base();
        let mut appendage = sample_appendage();
        appendage.spine.push("ghost".to_string());

        assert!(matches!(
            combine(&mut base, &appendage),
            Err(EpubError::MappingMiss(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_combine_twice_keeps_numbering_distinct() {
        let mut base = sample_base();
        let appendage = sample_appendage();
        combine(&mut base, &appendage).expect("第一次合并失败");
        combine(&mut base, &appendage).expect("第二次合并失败");

        // 第二次追加基于新的最大前缀4: 1 + (4+1) + 1 = 7
        assert!(base.item_by_path("OEBPS/Text/0007_ch2.xhtml").is_some());

        let mut paths: Vec<&String> = base.manifest.iter().map(|i| &i.absolute_path).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), base.manifest.len());
    }
}
