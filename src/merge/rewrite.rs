//! 引用重写模块
//!
//! 页面被重新编号后，页面内指向其他页面/图片的相对引用也要改写
//! 到新路径。重写以流式方式复制XML事件，只改动命中的属性，
//! 其余内容尽量原样保留。
//!
//! 需要重写的(元素, 属性)组合是封闭的小集合：SVG的image元素的
//! xlink:href、XHTML的img元素的src、a元素的href。link元素
//! （样式表）不重写——合并根本不复制样式表。

use std::collections::HashMap;
use std::io::Cursor;

use once_cell::sync::Lazy;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::epub::error::{EpubError, Result};
use crate::epub::paths;

/// 一个需要重写的(元素, 属性)组合
struct RewriteTarget {
    /// 元素的本地名
    element: &'static str,
    /// 属性的本地名（忽略命名空间前缀，xlink:href按href匹配）
    attribute: &'static str,
}

static REWRITE_TARGETS: Lazy<Vec<RewriteTarget>> = Lazy::new(|| {
    vec![
        RewriteTarget { element: "image", attribute: "href" },
        RewriteTarget { element: "img", attribute: "src" },
        RewriteTarget { element: "a", attribute: "href" },
    ]
});

/// 重写一个页面中的所有内部引用
///
/// # 参数
/// * `xml_content` - 页面的XHTML内容
/// * `item_dir` - 页面所在目录（重新编号只改文件名，目录不变）
/// * `path_mapping` - 旧绝对路径到新绝对路径的映射表
///
/// # 返回值
/// * `Result<Vec<u8>>` - 重写后的页面字节
///
/// # 错误处理
/// 页面内的相对引用在映射表中查不到时返回`MappingMiss`：
/// 说明追加文档本身有悬空引用，或映射覆盖不完整，合并必须中止。
pub fn rewrite_page(
    xml_content: &str,
    item_dir: &str,
    path_mapping: &HashMap<String, String>,
) -> Result<Vec<u8>> {
    let mut reader = Reader::from_str(xml_content);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => match rewrite_element(&e, item_dir, path_mapping)? {
                Some(elem) => writer.write_event(Event::Start(elem))?,
                None => writer.write_event(Event::Start(e))?,
            },
            Event::Empty(e) => match rewrite_element(&e, item_dir, path_mapping)? {
                Some(elem) => writer.write_event(Event::Empty(elem))?,
                None => writer.write_event(Event::Empty(e))?,
            },
            event => writer.write_event(event)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner().into_inner())
}

/// 重建一个命中重写表的元素；未命中时返回`None`（原样输出）
fn rewrite_element(
    e: &BytesStart,
    item_dir: &str,
    path_mapping: &HashMap<String, String>,
) -> Result<Option<BytesStart<'static>>> {
    let local_name = e.local_name();
    let Some(target) = REWRITE_TARGETS
        .iter()
        .find(|t| t.element.as_bytes() == local_name.as_ref())
    else {
        return Ok(None);
    };

    // 保留完整的限定名和属性顺序重建元素
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut elem = BytesStart::new(name);

    for attr_result in e.attributes() {
        let attr =
            attr_result.map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?;

        if attr.key.local_name().as_ref() == target.attribute.as_bytes() {
            let fixed = fixup_url(&value, item_dir, path_mapping)?;
            elem.push_attribute((key.as_str(), fixed.as_str()));
        } else {
            elem.push_attribute((key.as_str(), value.as_ref()));
        }
    }

    Ok(Some(elem))
}

/// 改写单个引用值
///
/// 规则：
/// 1. 以`#`开头的同页锚点原样返回；
/// 2. 非容器内相对引用（带scheme的绝对URL、`//`开头、`/`开头）
///    原样返回——只有内部链接才重新映射；
/// 3. 其余引用按`#`拆成路径和锚点，路径相对`item_dir`解析为
///    绝对路径，查映射表得到新绝对路径，再相对`item_dir`重新
///    表示，最后补回锚点。
pub fn fixup_url(
    uri: &str,
    item_dir: &str,
    path_mapping: &HashMap<String, String>,
) -> Result<String> {
    if uri.is_empty() || uri.starts_with('#') {
        return Ok(uri.to_string());
    }

    if !is_container_relative(uri) {
        return Ok(uri.to_string());
    }

    let (path, fragment) = match uri.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (uri, None),
    };

    let absolute = paths::relative_to_absolute(item_dir, path);
    let new_absolute = path_mapping
        .get(&absolute)
        .ok_or_else(|| EpubError::MappingMiss(absolute.clone()))?;

    let mut relative = paths::absolute_to_relative(item_dir, new_absolute);
    if let Some(fragment) = fragment {
        relative.push('#');
        relative.push_str(fragment);
    }
    Ok(relative)
}

/// 判断引用是否为容器内的相对路径
fn is_container_relative(uri: &str) -> bool {
    if uri.starts_with('/') {
        return false;
    }

    // RFC 3986: scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
    let mut chars = uri.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return true,
    }
    for (_, c) in chars {
        match c {
            ':' => return false,
            c if c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.' => {}
            _ => return true,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert(
            "OEBPS/Text/0001_ch2.xhtml".to_string(),
            "OEBPS/Text/0003_ch2.xhtml".to_string(),
        );
        m.insert(
            "OEBPS/Images/0001_pic.jpg".to_string(),
            "OEBPS/Images/0004_pic.jpg".to_string(),
        );
        m
    }

    #[test]
    fn test_fixup_same_page_anchor_unchanged() {
        assert_eq!(
            fixup_url("#top", "OEBPS/Text", &mapping()).expect("改写失败"),
            "#top"
        );
    }

    #[test]
    fn test_fixup_absolute_url_unchanged() {
        let m = mapping();
        assert_eq!(
            fixup_url("https://example.com/x", "OEBPS/Text", &m).expect("改写失败"),
            "https://example.com/x"
        );
        assert_eq!(
            fixup_url("mailto:someone@example.com", "OEBPS/Text", &m).expect("改写失败"),
            "mailto:someone@example.com"
        );
        assert_eq!(
            fixup_url("//example.com/x", "OEBPS/Text", &m).expect("改写失败"),
            "//example.com/x"
        );
    }

    #[test]
    fn test_fixup_relative_path_with_fragment() {
        assert_eq!(
            fixup_url("0001_ch2.xhtml#note", "OEBPS/Text", &mapping()).expect("改写失败"),
            "0003_ch2.xhtml#note"
        );
    }

    #[test]
    fn test_fixup_cross_directory_reference() {
        assert_eq!(
            fixup_url("../Images/0001_pic.jpg", "OEBPS/Text", &mapping()).expect("改写失败"),
            "../Images/0004_pic.jpg"
        );
    }

    #[test]
    fn test_fixup_dangling_reference_is_fatal() {
        let result = fixup_url("missing.xhtml", "OEBPS/Text", &mapping());
        assert!(matches!(result, Err(EpubError::MappingMiss(path)) if path == "OEBPS/Text/missing.xhtml"));
    }

    #[test]
    fn test_rewrite_page_updates_targets() {
        let page = concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            "\n",
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
            r#"<body>"#,
            r#"<a href="0001_ch2.xhtml#note">note</a>"#,
            r#"<img src="../Images/0001_pic.jpg" alt="pic"/>"#,
            r#"<svg:svg><svg:image xlink:href="../Images/0001_pic.jpg"/></svg:svg>"#,
            r#"<a href="https://example.com/x">external</a>"#,
            r#"<link href="../Styles/stylesheet.css" rel="stylesheet" type="text/css"/>"#,
            r#"</body></html>"#,
        );

        let output = rewrite_page(page, "OEBPS/Text", &mapping()).expect("重写页面失败");
        let output = String::from_utf8(output).expect("输出不是UTF-8");

        assert!(output.contains(r#"<a href="0003_ch2.xhtml#note">"#));
        assert!(output.contains(r#"<img src="../Images/0004_pic.jpg" alt="pic"/>"#));
        assert!(output.contains(r#"<svg:image xlink:href="../Images/0004_pic.jpg"/>"#));
        // 外部链接和link元素保持不变
        assert!(output.contains(r#"<a href="https://example.com/x">"#));
        assert!(output.contains(r#"<link href="../Styles/stylesheet.css""#));
    }

    #[test]
    fn test_rewrite_page_preserves_text_content() {
        let page = r#"<html><body><p>第一段  保留  空白</p><a href="0001_ch2.xhtml">x</a></body></html>"#;
        let output = rewrite_page(page, "OEBPS/Text", &mapping()).expect("重写页面失败");
        let output = String::from_utf8(output).expect("输出不是UTF-8");
        assert!(output.contains("<p>第一段  保留  空白</p>"));
    }

    #[test]
    fn test_rewrite_page_dangling_href_aborts() {
        let page = r#"<html><body><a href="gone.xhtml">x</a></body></html>"#;
        assert!(rewrite_page(page, "OEBPS/Text", &mapping()).is_err());
    }
}
