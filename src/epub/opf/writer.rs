//! OPF生成模块
//!
//! 将内存中的EPUB文档序列化为content.opf。清单href重新表示为
//! 相对于OPF文件所在目录的相对路径。

use crate::epub::Epub;
use crate::epub::error::Result;
use crate::epub::paths;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use std::io::Cursor;

const OPF_NS: &str = "http://www.idpf.org/2007/opf";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// 将EPUB文档序列化为content.opf的字节内容
///
/// # 参数
/// * `epub` - 内存中的EPUB文档
///
/// # 返回值
/// * `Result<Vec<u8>>` - 序列化后的XML字节
pub fn serialize_opf(epub: &Epub) -> Result<Vec<u8>> {
    let opf_dir = paths::zip_directory(&epub.opf_path);
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut package = BytesStart::new("package");
    package.push_attribute(("xmlns", OPF_NS));
    package.push_attribute(("unique-identifier", "BookId"));
    let version = if epub.version.is_empty() { "2.0" } else { epub.version.as_str() };
    package.push_attribute(("version", version));
    writer.write_event(Event::Start(package))?;

    write_metadata(&mut writer, epub)?;
    write_manifest(&mut writer, epub, opf_dir)?;
    write_spine(&mut writer, epub)?;

    writer.write_event(Event::End(BytesStart::new("package").to_end()))?;

    Ok(writer.into_inner().into_inner())
}

fn write_metadata(writer: &mut Writer<Cursor<Vec<u8>>>, epub: &Epub) -> Result<()> {
    let mut metadata_elem = BytesStart::new("metadata");
    metadata_elem.push_attribute(("xmlns:dc", DC_NS));
    metadata_elem.push_attribute(("xmlns:opf", OPF_NS));
    writer.write_event(Event::Start(metadata_elem))?;

    let metadata = &epub.metadata;
    if let Some(title) = &metadata.title {
        write_text_element(writer, "dc:title", title, None)?;
    }
    if let Some(language) = &metadata.language {
        write_text_element(writer, "dc:language", language, None)?;
    }
    if let Some(identifier) = &metadata.identifier {
        write_text_element(writer, "dc:identifier", identifier, Some(("id", "BookId")))?;
    }
    for creator in &metadata.creators {
        write_text_element(writer, "dc:creator", creator, None)?;
    }
    for (name, value) in &metadata.other {
        write_text_element(writer, &format!("dc:{}", name), value, None)?;
    }
    // 来源信息按清单顺序输出，保证序列化结果稳定
    for item in &epub.manifest {
        if let Some(source) = metadata.source_for(&item.id) {
            write_text_element(writer, "dc:source", source, Some(("id", item.id.as_str())))?;
        }
    }

    writer.write_event(Event::End(BytesStart::new("metadata").to_end()))?;
    Ok(())
}

fn write_manifest(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    epub: &Epub,
    opf_dir: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("manifest")))?;

    let mut ncx = BytesStart::new("item");
    ncx.push_attribute(("id", "ncx"));
    ncx.push_attribute(("href", "toc.ncx"));
    ncx.push_attribute(("media-type", NCX_MEDIA_TYPE));
    writer.write_event(Event::Empty(ncx))?;

    for item in &epub.manifest {
        let href = paths::absolute_to_relative(opf_dir, &item.absolute_path);
        let mut elem = BytesStart::new("item");
        elem.push_attribute(("id", item.id.as_str()));
        elem.push_attribute(("href", href.as_str()));
        elem.push_attribute(("media-type", item.media_type.as_str()));
        writer.write_event(Event::Empty(elem))?;
    }

    writer.write_event(Event::End(BytesStart::new("manifest").to_end()))?;
    Ok(())
}

fn write_spine(writer: &mut Writer<Cursor<Vec<u8>>>, epub: &Epub) -> Result<()> {
    let mut spine = BytesStart::new("spine");
    spine.push_attribute(("toc", "ncx"));
    writer.write_event(Event::Start(spine))?;

    for idref in &epub.spine {
        let mut elem = BytesStart::new("itemref");
        elem.push_attribute(("idref", idref.as_str()));
        writer.write_event(Event::Empty(elem))?;
    }

    writer.write_event(Event::End(BytesStart::new("spine").to_end()))?;
    Ok(())
}

fn write_text_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    text: &str,
    attribute: Option<(&str, &str)>,
) -> Result<()> {
    let mut elem = BytesStart::new(name);
    if let Some((key, value)) = attribute {
        elem.push_attribute((key, value));
    }
    writer.write_event(Event::Start(elem))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesStart::new(name).to_end()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::item::EpubItem;
    use crate::epub::opf::parser::OpfPackage;

    fn sample_epub() -> Epub {
        let mut epub = Epub::empty("OEBPS/content.opf");
        epub.metadata.title = Some("Merged Book".to_string());
        epub.metadata.language = Some("en".to_string());
        epub.metadata.identifier = Some("urn:uuid:abcd".to_string());
        epub.append_item(
            EpubItem::new(
                "xhtml0001".to_string(),
                "OEBPS/Text/0001_ch1.xhtml".to_string(),
                "application/xhtml+xml".to_string(),
                b"<html/>".to_vec(),
            ),
            Some("https://example.com/chapter-1".to_string()),
        );
        epub.spine.push("xhtml0001".to_string());
        epub
    }

    #[test]
    fn test_serialize_parse_round_trip() {
        let epub = sample_epub();
        let bytes = serialize_opf(&epub).expect("序列化OPF失败");
        let xml = String::from_utf8(bytes).expect("OPF不是UTF-8");

        let parsed = OpfPackage::parse_xml(&xml).expect("解析生成的OPF失败");
        assert_eq!(parsed.metadata.title, Some("Merged Book".to_string()));
        assert_eq!(
            parsed.metadata.source_for("xhtml0001"),
            Some("https://example.com/chapter-1")
        );
        // ncx条目 + 1个清单项
        assert_eq!(parsed.manifest.len(), 2);
        assert_eq!(parsed.manifest[1].href, "Text/0001_ch1.xhtml");
        assert_eq!(parsed.spine, vec!["xhtml0001".to_string()]);
    }
}
