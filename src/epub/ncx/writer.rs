//! NCX生成模块
//!
//! 将目录树序列化为toc.ncx。playOrder按文档顺序递增，
//! content src重新表示为相对于NCX文件所在目录的相对路径。

use crate::epub::Epub;
use crate::epub::error::Result;
use crate::epub::ncx::toc::TocEntry;
use crate::epub::paths;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use std::io::Cursor;

const NCX_NS: &str = "http://www.daisy.org/z3986/2005/ncx/";

/// 将EPUB文档的目录树序列化为toc.ncx的字节内容
///
/// # 参数
/// * `epub` - 内存中的EPUB文档
///
/// # 返回值
/// * `Result<Vec<u8>>` - 序列化后的XML字节
pub fn serialize_ncx(epub: &Epub) -> Result<Vec<u8>> {
    let ncx_dir = paths::zip_directory(&epub.opf_path);
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut ncx = BytesStart::new("ncx");
    ncx.push_attribute(("xmlns", NCX_NS));
    ncx.push_attribute(("version", "2005-1"));
    writer.write_event(Event::Start(ncx))?;

    // head: dtb:uid等元数据
    writer.write_event(Event::Start(BytesStart::new("head")))?;
    let uid = epub.metadata.identifier.clone().unwrap_or_default();
    let max_depth = epub.toc.iter().map(|e| e.depth()).max().unwrap_or(1);
    write_head_meta(&mut writer, "dtb:uid", &uid)?;
    write_head_meta(&mut writer, "dtb:depth", &max_depth.to_string())?;
    write_head_meta(&mut writer, "dtb:totalPageCount", "0")?;
    write_head_meta(&mut writer, "dtb:maxPageNumber", "0")?;
    writer.write_event(Event::End(BytesStart::new("head").to_end()))?;

    // docTitle
    writer.write_event(Event::Start(BytesStart::new("docTitle")))?;
    writer.write_event(Event::Start(BytesStart::new("text")))?;
    let title = epub.metadata.title.clone().unwrap_or_default();
    writer.write_event(Event::Text(BytesText::new(&title)))?;
    writer.write_event(Event::End(BytesStart::new("text").to_end()))?;
    writer.write_event(Event::End(BytesStart::new("docTitle").to_end()))?;

    // navMap
    writer.write_event(Event::Start(BytesStart::new("navMap")))?;
    let mut play_order = 1u32;
    for entry in &epub.toc {
        write_nav_point(&mut writer, entry, ncx_dir, &mut play_order)?;
    }
    writer.write_event(Event::End(BytesStart::new("navMap").to_end()))?;

    writer.write_event(Event::End(BytesStart::new("ncx").to_end()))?;

    Ok(writer.into_inner().into_inner())
}

fn write_head_meta(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, content: &str) -> Result<()> {
    let mut meta = BytesStart::new("meta");
    meta.push_attribute(("name", name));
    meta.push_attribute(("content", content));
    writer.write_event(Event::Empty(meta))?;
    Ok(())
}

fn write_nav_point(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    entry: &TocEntry,
    ncx_dir: &str,
    play_order: &mut u32,
) -> Result<()> {
    let mut nav_point = BytesStart::new("navPoint");
    nav_point.push_attribute(("id", format!("navPoint-{}", play_order).as_str()));
    nav_point.push_attribute(("playOrder", play_order.to_string().as_str()));
    writer.write_event(Event::Start(nav_point))?;
    *play_order += 1;

    writer.write_event(Event::Start(BytesStart::new("navLabel")))?;
    writer.write_event(Event::Start(BytesStart::new("text")))?;
    writer.write_event(Event::Text(BytesText::new(&entry.title)))?;
    writer.write_event(Event::End(BytesStart::new("text").to_end()))?;
    writer.write_event(Event::End(BytesStart::new("navLabel").to_end()))?;

    // content_src是绝对路径（可带锚点），锚点部分不参与路径换算
    let (path, fragment) = match entry.content_src.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (entry.content_src.as_str(), None),
    };
    let mut src = paths::absolute_to_relative(ncx_dir, path);
    if let Some(fragment) = fragment {
        src.push('#');
        src.push_str(fragment);
    }
    let mut content = BytesStart::new("content");
    content.push_attribute(("src", src.as_str()));
    writer.write_event(Event::Empty(content))?;

    for child in &entry.children {
        write_nav_point(writer, child, ncx_dir, play_order)?;
    }

    writer.write_event(Event::End(BytesStart::new("navPoint").to_end()))?;
    Ok(())
}
