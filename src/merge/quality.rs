//! 质量检查模块
//!
//! 合并完成后按阅读顺序扫描页面，标记疑似空页和疑似重复章节
//! （同一章被抓取两次、追加了重复的卷等）。检查结果只是诊断
//! 信息，不影响合并本身的成败，如何处置由调用方决定。

use std::fmt;

use crate::epub::Epub;
use crate::merge::config::MergeConfig;
use crate::merge::signature::calc_signature;

/// 一条质量检查发现
#[derive(Debug, Clone, PartialEq)]
pub enum QualityIssue {
    /// 页面文本片段过少，可能是空页
    PossiblyEmpty {
        /// 页面的容器内绝对路径
        path: String,
    },
    /// 页面与前一个页面疑似重复
    ProbableDuplicate {
        /// 页面的容器内绝对路径
        path: String,
    },
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityIssue::PossiblyEmpty { path } => {
                write!(f, "{} 可能是空页", path)
            }
            QualityIssue::ProbableDuplicate { path } => {
                write!(f, "{} 疑似重复章节", path)
            }
        }
    }
}

/// 按阅读顺序扫描文档，收集质量检查发现
///
/// 每个页面的指纹与前一个页面比较；免检列表中的文件名
/// （封面、版权页）不参与检查，但其指纹仍作为下一页的比较基准。
///
/// # 参数
/// * `epub` - 合并后的文档
/// * `config` - 质量检查配置
///
/// # 返回值
/// * `Vec<QualityIssue>` - 发现列表（可能为空）
pub fn scan_for_issues(epub: &Epub, config: &MergeConfig) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    let mut previous_signature = None;

    for idref in &epub.spine {
        let Some(item) = epub.item_by_id(idref) else {
            continue;
        };
        if !item.is_page() {
            continue;
        }

        let content = String::from_utf8_lossy(&item.raw_bytes);
        let signature = calc_signature(&content);

        if config.is_exempt(item.file_name()) {
            previous_signature = Some(signature);
            continue;
        }

        if signature.distinct_fragments() < config.min_fragments {
            issues.push(QualityIssue::PossiblyEmpty {
                path: item.absolute_path.clone(),
            });
        } else if let Some(previous) = &previous_signature {
            if signature.probable_duplicate(previous) {
                issues.push(QualityIssue::ProbableDuplicate {
                    path: item.absolute_path.clone(),
                });
            }
        }

        previous_signature = Some(signature);
    }

    issues
}
