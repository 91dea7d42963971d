//! 重新编号模块
//!
//! 为追加文档中的每个页面和图片计算新的容器内路径和新ID，
//! 保证不与基础文档已有的路径/ID冲突。
//!
//! 文件名约定为`<目录>/<4位数字前缀>_<名称>`；没有可识别前缀的
//! 文件按前缀0处理。页面和图片使用各自独立的编号空间。

use std::collections::HashMap;

use crate::epub::Epub;
use crate::epub::item::EpubItem;
use crate::epub::paths;

/// 合并用的映射表
///
/// 由重新编号一次性构建，之后只读。两张表覆盖追加文档的全部
/// 页面和图片；重写、目录合并、脊柱合并凡是查不到的引用都视为
/// 致命错误。
#[derive(Debug, Clone, Default)]
pub struct Remapping {
    /// 旧绝对路径到新绝对路径的映射
    pub paths: HashMap<String, String>,
    /// 旧ID到新ID的映射
    pub ids: HashMap<String, String>,
}

/// 计算追加文档所有页面和图片的新路径与新ID
///
/// 页面的新前缀 = 旧前缀 + (基础文档页面的最大前缀 + 1) + bump，
/// 其中bump在旧文件名本身带有数字前缀时为1（防止去掉前缀后与
/// `Cover.xhtml`这类无前缀特殊文件冲突），否则为0。图片使用同样的
/// 规则，但最大前缀只在图片集合内计算。
///
/// 由于追加文档内不同项的旧前缀互不相同，新前缀也互不相同，
/// 映射天然是单射。
///
/// # 参数
/// * `base` - 基础文档
/// * `appendage` - 追加文档
///
/// # 返回值
/// * `Remapping` - 路径和ID的映射表
pub fn compute_remapping(base: &Epub, appendage: &Epub) -> Remapping {
    let mut remapping = Remapping::default();

    let page_offset = max_prefix(&base.page_items()) + 1;
    for page in appendage.page_items() {
        assign_new_path_and_id(&mut remapping, page, page_offset);
    }

    let image_offset = max_prefix(&base.image_items()) + 1;
    for image in appendage.image_items() {
        assign_new_path_and_id(&mut remapping, image, image_offset);
    }

    remapping
}

/// 求一组清单项文件名数字前缀的最大值（空集合为0）
fn max_prefix(items: &[&EpubItem]) -> u32 {
    items
        .iter()
        .map(|item| paths::prefix_as_u32(item.file_name()))
        .max()
        .unwrap_or(0)
}

/// 为单个清单项计算新路径和新ID并记入映射表
fn assign_new_path_and_id(remapping: &mut Remapping, item: &EpubItem, offset: u32) {
    let old_file_name = item.file_name();
    let old_prefix = paths::prefix_as_u32(old_file_name);
    let file_name = paths::strip_prefix(old_file_name);
    let dir = item.directory();

    // 无前缀的特殊文件（如Cover.xhtml）占用前缀0的名字空间，
    // 带前缀的文件整体多让出一位
    let bump = if paths::extract_prefix(old_file_name).is_some() { 1 } else { 0 };

    let new_prefix = format!("{:04}", old_prefix + offset + bump);
    let new_path = paths::join(dir, &format!("{}_{}", new_prefix, file_name));
    remapping
        .paths
        .insert(item.absolute_path.clone(), new_path);

    let new_id = format!("{}{}", paths::strip_digits(&item.id), new_prefix);
    remapping.ids.insert(item.id.clone(), new_id);
}
