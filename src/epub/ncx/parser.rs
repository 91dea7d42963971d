//! NCX解析器模块
//!
//! 将NCX文件的navMap解析为目录树。navPoint可以任意嵌套，
//! 解析使用显式栈而不是递归。

use crate::epub::error::{EpubError, Result};
use crate::epub::ncx::toc::TocEntry;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// 解析NCX文件内容为目录树
///
/// 返回的content_src保持NCX中的原始写法（相对于NCX文件所在目录），
/// 由调用方解析为容器内绝对路径。
///
/// # 参数
/// * `xml_content` - NCX文件的XML内容
///
/// # 返回值
/// * `Result<Vec<TocEntry>>` - 顶层目录条目列表
pub fn parse_ncx(xml_content: &str) -> Result<Vec<TocEntry>> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);
    reader.config_mut().expand_empty_elements = true;

    let mut roots: Vec<TocEntry> = Vec::new();
    let mut stack: Vec<TocEntry> = Vec::new();
    let mut in_nav_map = false;
    let mut in_nav_label = false;
    let mut text_content = String::new();

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"navMap" => {
                    in_nav_map = true;
                }
                b"navPoint" if in_nav_map => {
                    stack.push(TocEntry::new(String::new(), String::new()));
                }
                b"navLabel" if in_nav_map => {
                    in_nav_label = true;
                    text_content.clear();
                }
                b"content" if in_nav_map => {
                    for attr_result in e.attributes() {
                        let attr = attr_result
                            .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
                        if attr.key.local_name().as_ref() == b"src" {
                            if let Some(entry) = stack.last_mut() {
                                entry.content_src = String::from_utf8_lossy(&attr.value).to_string();
                            }
                        }
                    }
                }
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"navMap" => {
                    in_nav_map = false;
                }
                b"navLabel" => {
                    if in_nav_label {
                        if let Some(entry) = stack.last_mut() {
                            entry.title = text_content.trim().to_string();
                        }
                        in_nav_label = false;
                    }
                }
                b"navPoint" if in_nav_map => {
                    let entry = stack.pop().ok_or_else(|| {
                        EpubError::NcxParseError("navPoint闭合标签不匹配".to_string())
                    })?;
                    if entry.content_src.is_empty() {
                        return Err(EpubError::NcxParseError(format!(
                            "navPoint '{}' 缺少content元素",
                            entry.title
                        )));
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.add_child(entry),
                        None => roots.push(entry),
                    }
                }
                _ => {}
            },
            Event::Text(e) => {
                if in_nav_label {
                    text_content.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="urn:uuid:1234"/>
  </head>
  <docTitle><text>Sample Book</text></docTitle>
  <navMap>
    <navPoint id="navPoint-1" playOrder="1">
      <navLabel><text>Cover</text></navLabel>
      <content src="Text/Cover.xhtml"/>
    </navPoint>
    <navPoint id="navPoint-2" playOrder="2">
      <navLabel><text>Volume 1</text></navLabel>
      <content src="Text/0001_v1.xhtml"/>
      <navPoint id="navPoint-3" playOrder="3">
        <navLabel><text>Chapter 1</text></navLabel>
        <content src="Text/0002_ch1.xhtml"/>
      </navPoint>
    </navPoint>
  </navMap>
</ncx>"#;

    #[test]
    fn test_parse_ncx_tree() {
        let toc = parse_ncx(SAMPLE_NCX).expect("解析NCX失败");

        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].title, "Cover");
        assert_eq!(toc[0].content_src, "Text/Cover.xhtml");
        assert!(toc[0].children.is_empty());

        assert_eq!(toc[1].title, "Volume 1");
        assert_eq!(toc[1].children.len(), 1);
        assert_eq!(toc[1].children[0].title, "Chapter 1");
        assert_eq!(toc[1].children[0].content_src, "Text/0002_ch1.xhtml");
    }

    #[test]
    fn test_parse_ncx_missing_content() {
        let ncx = r#"<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/">
  <navMap>
    <navPoint id="n1"><navLabel><text>孤立条目</text></navLabel></navPoint>
  </navMap>
</ncx>"#;
        assert!(parse_ncx(ncx).is_err());
    }
}
