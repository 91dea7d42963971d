//! 内容指纹模块
//!
//! 把页面文本变成一个多重集合指纹：提取每个文本节点，去掉其中
//! 所有空白字符（同一句话在不同文件里可能换行位置不同），
//! 对剩余字符串逐个求哈希并统计出现次数。两个指纹的交集大小
//! 达到一半即视为疑似重复。
//!
//! 哈希使用crc32（稳定、非加密）；碰撞会带来少量误报，可以接受。

use std::collections::HashMap;

use scraper::Html;

/// 页面文本的多重集合指纹
///
/// 键是文本片段的crc32哈希值，值是该片段的出现次数。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    counts: HashMap<u32, u32>,
}

impl Signature {
    /// 创建空指纹
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// 记录一个文本片段
    pub fn add_fragment(&mut self, fragment: &str) {
        let hash = crc32fast::hash(fragment.as_bytes());
        *self.counts.entry(hash).or_insert(0) += 1;
    }

    /// 不同片段（哈希值）的数量
    pub fn distinct_fragments(&self) -> usize {
        self.counts.len()
    }

    /// 片段总数（含重复）
    pub fn total_fragments(&self) -> u32 {
        self.counts.values().sum()
    }

    /// 判断是否疑似与另一个指纹重复
    ///
    /// 一半以上（整数除法）的片段出现在对方指纹中即视为疑似重复。
    /// 注意该判断不保证对称：totalLines为奇数且计数不同时，
    /// `a.probable_duplicate(b)`和`b.probable_duplicate(a)`可能
    /// 给出不同结果。这一行为被有意保留。
    pub fn probable_duplicate(&self, other: &Signature) -> bool {
        let mut same_lines: u32 = 0;
        let mut total_lines: u32 = 0;

        for (hash, count) in &self.counts {
            total_lines += count;
            if let Some(other_count) = other.counts.get(hash) {
                same_lines += (*count).min(*other_count);
            }
        }

        total_lines / 2 <= same_lines
    }
}

/// 计算页面的内容指纹
///
/// 提取HTML中的每个文本节点，去掉节点内所有空白字符（不只是
/// 首尾），丢弃变成空串的节点，其余逐个计入指纹。
///
/// # 参数
/// * `html_content` - 页面的HTML/XHTML内容
///
/// # 返回值
/// * `Signature` - 页面的内容指纹
pub fn calc_signature(html_content: &str) -> Signature {
    let document = Html::parse_document(html_content);
    let mut signature = Signature::new();

    for text in document.root_element().text() {
        let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if !stripped.is_empty() {
            signature.add_fragment(&stripped);
        }
    }

    signature
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造指定(哈希片段, 次数)的指纹
    fn signature_of(fragments: &[(&str, u32)]) -> Signature {
        let mut sig = Signature::new();
        for (fragment, count) in fragments {
            for _ in 0..*count {
                sig.add_fragment(fragment);
            }
        }
        sig
    }

    #[test]
    fn test_probable_duplicate_majority_overlap() {
        // A = {h1:3, h2:2} (totalLines=5)，B = {h1:3}
        // sameLines=3，5/2=2（整数除法），3>=2 → 重复
        let a = signature_of(&[("alpha", 3), ("beta", 2)]);
        let b = signature_of(&[("alpha", 3)]);
        assert!(a.probable_duplicate(&b));
    }

    #[test]
    fn test_probable_duplicate_empty_other() {
        let a = signature_of(&[("alpha", 3), ("beta", 2)]);
        let empty = Signature::new();
        assert!(!a.probable_duplicate(&empty));
    }

    #[test]
    fn test_page_is_duplicate_of_itself() {
        let sig = calc_signature("<html><body><p>第一行</p><p>第二行</p><p>第三行</p></body></html>");
        assert!(sig.probable_duplicate(&sig));
    }

    #[test]
    fn test_asymmetry_is_preserved() {
        // a的totalLines=3，b的totalLines=1
        // a对b: sameLines=1, 3/2=1 → 重复；b对a: sameLines=1, 1/2=0 → 也重复
        // 不对称的例子: a={x:1,y:1,z:1}, b={x:1,w:1,v:1,u:1,t:1}
        // a对b: total=3, same=1, 3/2=1 → true；b对a: total=5, same=1, 5/2=2 → false
        let a = signature_of(&[("x", 1), ("y", 1), ("z", 1)]);
        let b = signature_of(&[("x", 1), ("w", 1), ("v", 1), ("u", 1), ("t", 1)]);
        assert!(a.probable_duplicate(&b));
        assert!(!b.probable_duplicate(&a));
    }

    #[test]
    fn test_calc_signature_strips_all_whitespace() {
        // 同一句话换行位置不同，去掉空白后片段一致
        let a = calc_signature("<html><body><p>春眠不觉晓 处处闻啼鸟</p></body></html>");
        let b = calc_signature("<html><body><p>春眠不觉晓\n    处处闻啼鸟</p></body></html>");
        assert!(a.probable_duplicate(&b));
        assert!(b.probable_duplicate(&a));
    }

    #[test]
    fn test_calc_signature_discards_empty_nodes() {
        let sig = calc_signature("<html><body><p>   </p><div>\n\t</div><p>正文</p></body></html>");
        assert_eq!(sig.distinct_fragments(), 1);
        assert_eq!(sig.total_fragments(), 1);
    }

    #[test]
    fn test_repeated_fragments_are_counted() {
        let sig = calc_signature(
            "<html><body><p>重复行</p><p>重复行</p><p>另一行</p></body></html>",
        );
        assert_eq!(sig.distinct_fragments(), 2);
        assert_eq!(sig.total_fragments(), 3);
    }
}
