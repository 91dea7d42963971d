//! OPF解析器模块
//!
//! 提供OPF（Open Packaging Format）文件的XML解析功能。
//! 解析结果是清单、脊柱和元数据的中间表示，清单href尚未解析为绝对路径。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::metadata::Metadata;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// 清单中的一个条目（href相对于OPF文件所在目录）
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    /// 项目ID
    pub id: String,
    /// 文件路径（相对于OPF文件）
    pub href: String,
    /// 媒体类型
    pub media_type: String,
}

/// OPF文件解析结果
#[derive(Debug, Clone)]
pub struct OpfPackage {
    /// EPUB版本
    pub version: String,
    /// 元数据
    pub metadata: Metadata,
    /// 清单项（保留文档内顺序）
    pub manifest: Vec<ManifestEntry>,
    /// 脊柱（阅读顺序的ID列表）
    pub spine: Vec<String>,
    /// 脊柱的目录引用（toc属性）
    pub spine_toc: Option<String>,
}

impl OpfPackage {
    /// 解析OPF文件内容
    ///
    /// # 参数
    /// * `xml_content` - OPF文件的XML内容
    ///
    /// # 返回值
    /// * `Result<OpfPackage>` - 解析后的OPF信息
    pub fn parse_xml(xml_content: &str) -> Result<OpfPackage> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut version = String::new();
        let mut metadata = Metadata::new();
        let mut manifest = Vec::new();
        let mut spine = Vec::new();
        let mut spine_toc = None;

        let mut buf = Vec::new();
        let mut current_section = String::new();
        let mut text_content = String::new();
        let mut current_id: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "package" => {
                            version = Self::attribute_value(e, b"version")?.unwrap_or_default();
                        }
                        "metadata" => {
                            current_section = "metadata".to_string();
                        }
                        "manifest" => {
                            current_section = "manifest".to_string();
                        }
                        "spine" => {
                            current_section = "spine".to_string();
                            spine_toc = Self::attribute_value(e, b"toc")?;
                        }
                        "item" if current_section == "manifest" => {
                            Self::parse_manifest_item(e, &mut manifest)?;
                        }
                        "itemref" if current_section == "spine" => {
                            if let Some(idref) = Self::attribute_value(e, b"idref")? {
                                spine.push(idref);
                            }
                        }
                        _ if current_section == "metadata" => {
                            current_id = Self::attribute_value(e, b"id")?;
                            text_content.clear();
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "metadata" | "manifest" | "spine" => {
                            current_section.clear();
                        }
                        _ if current_section == "metadata" => {
                            Self::record_metadata_element(
                                &local_name,
                                &text_content,
                                current_id.take(),
                                &mut metadata,
                            );
                            text_content.clear();
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    text_content.push_str(&e.unescape()?);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(OpfPackage {
            version,
            metadata,
            manifest,
            spine,
            spine_toc,
        })
    }

    /// 读取元素的指定属性值
    fn attribute_value(
        e: &quick_xml::events::BytesStart,
        name: &[u8],
    ) -> Result<Option<String>> {
        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == name {
                return Ok(Some(String::from_utf8_lossy(&attr.value).to_string()));
            }
        }
        Ok(None)
    }

    /// 记录一个元数据元素的文本内容
    ///
    /// 注意：quick_xml解析器使用local_name()方法，会忽略XML命名空间前缀，
    /// 例如 `<dc:title>` 会被解析为 "title"。
    fn record_metadata_element(
        element_name: &str,
        text_content: &str,
        element_id: Option<String>,
        metadata: &mut Metadata,
    ) {
        let content = text_content.trim();
        if content.is_empty() {
            return;
        }

        match element_name {
            "title" if metadata.title.is_none() => {
                metadata.title = Some(content.to_string());
            }
            "language" if metadata.language.is_none() => {
                metadata.language = Some(content.to_string());
            }
            "identifier" if metadata.identifier.is_none() => {
                metadata.identifier = Some(content.to_string());
            }
            "creator" => {
                metadata.creators.push(content.to_string());
            }
            "source" => {
                // 带id属性的dc:source记录某个清单项的来源
                match element_id {
                    Some(id) => metadata.add_source(id, content.to_string()),
                    None => metadata.other.push(("source".to_string(), content.to_string())),
                }
            }
            name => {
                metadata.other.push((name.to_string(), content.to_string()));
            }
        }
    }

    /// 解析清单项
    fn parse_manifest_item(
        e: &quick_xml::events::BytesStart,
        manifest: &mut Vec<ManifestEntry>,
    ) -> Result<()> {
        let mut id = String::new();
        let mut href = String::new();
        let mut media_type = String::new();

        for attr_result in e.attributes() {
            let attr = attr_result
                .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            match attr.key.local_name().as_ref() {
                b"id" => {
                    id = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"href" => {
                    href = String::from_utf8_lossy(&attr.value).to_string();
                }
                b"media-type" => {
                    media_type = String::from_utf8_lossy(&attr.value).to_string();
                }
                _ => {}
            }
        }

        if !id.is_empty() && !href.is_empty() && !media_type.is_empty() {
            manifest.push(ManifestEntry {
                id,
                href,
                media_type,
            });
        }

        Ok(())
    }
}
