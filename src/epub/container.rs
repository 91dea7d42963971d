//! META-INF/container.xml 模块
//!
//! 提供container.xml的解析与生成。container.xml指向包文档（OPF）的位置。

use crate::epub::error::{EpubError, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::reader::Reader;
use std::io::Cursor;

const CONTAINER_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:container";
const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// container.xml中的rootfile信息
#[derive(Debug, Clone)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// container.xml的解析结果
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

impl Container {
    /// 为指定的OPF路径创建Container
    ///
    /// # 参数
    /// * `opf_path` - 包文档的容器内路径
    pub fn for_opf(opf_path: &str) -> Self {
        Self {
            rootfiles: vec![RootFile {
                full_path: opf_path.to_string(),
                media_type: OPF_MEDIA_TYPE.to_string(),
            }],
        }
    }

    /// 解析container.xml内容
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container>` - 解析后的Container信息
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);

        let mut rootfiles = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    if e.local_name().as_ref() == b"rootfile" {
                        let mut full_path = String::new();
                        let mut media_type = String::new();

                        for attr_result in e.attributes() {
                            let attr = attr_result
                                .map_err(|e| EpubError::XmlError(quick_xml::Error::InvalidAttr(e)))?;
                            match attr.key.local_name().as_ref() {
                                b"full-path" => {
                                    full_path = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                b"media-type" => {
                                    media_type = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                _ => {}
                            }
                        }

                        if !full_path.is_empty() && !media_type.is_empty() {
                            rootfiles.push(RootFile {
                                full_path,
                                media_type,
                            });
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if rootfiles.is_empty() {
            return Err(EpubError::ContainerParseError(
                "没有找到任何rootfile条目".to_string(),
            ));
        }

        Ok(Container { rootfiles })
    }

    /// 获取主要的OPF文件路径
    ///
    /// # 返回值
    /// * `Option<String>` - OPF文件的完整路径
    pub fn get_opf_path(&self) -> Option<String> {
        self.rootfiles
            .iter()
            .find(|rf| rf.media_type == OPF_MEDIA_TYPE)
            .or_else(|| self.rootfiles.first())
            .map(|rf| rf.full_path.clone())
    }

    /// 生成container.xml的字节内容
    ///
    /// # 返回值
    /// * `Result<Vec<u8>>` - 序列化后的XML字节
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut container = BytesStart::new("container");
        container.push_attribute(("version", "1.0"));
        container.push_attribute(("xmlns", CONTAINER_NS));
        writer.write_event(Event::Start(container))?;
        writer.write_event(Event::Start(BytesStart::new("rootfiles")))?;

        for rootfile in &self.rootfiles {
            let mut elem = BytesStart::new("rootfile");
            elem.push_attribute(("full-path", rootfile.full_path.as_str()));
            elem.push_attribute(("media-type", rootfile.media_type.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        writer.write_event(Event::End(BytesStart::new("rootfiles").to_end()))?;
        writer.write_event(Event::End(BytesStart::new("container").to_end()))?;

        Ok(writer.into_inner().into_inner())
    }
}
