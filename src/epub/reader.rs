//! EPUB读取模块
//!
//! 将一个epub文件完整加载到内存中：校验mimetype，解析container.xml
//! 和OPF，读取每个清单项的字节，解析NCX目录树。所有路径在加载时
//! 统一解析为容器内绝对路径，后续合并不再接触zip。

use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use crate::epub::Epub;
use crate::epub::container::Container;
use crate::epub::error::{EpubError, Result};
use crate::epub::item::EpubItem;
use crate::epub::ncx::parse_ncx;
use crate::epub::opf::parser::OpfPackage;
use crate::epub::paths;

const EPUB_MIMETYPE: &str = "application/epub+zip";
const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// 从文件路径加载EPUB文档
///
/// # 参数
/// * `path` - epub文件的路径
///
/// # 返回值
/// * `Result<Epub>` - 完整加载的文档
pub fn read_epub<P: AsRef<Path>>(path: P) -> Result<Epub> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    validate_mimetype(&mut archive)?;

    let container_content = extract_text(&mut archive, "META-INF/container.xml")?;
    let container = Container::parse_xml(&container_content)?;
    let opf_path = container.get_opf_path().ok_or_else(|| {
        EpubError::ContainerParseError("container.xml中没有找到有效的rootfile".to_string())
    })?;
    let opf_dir = paths::zip_directory(&opf_path).to_string();

    let opf_content = extract_text(&mut archive, &opf_path)?;
    let package = OpfPackage::parse_xml(&opf_content)?;

    let mut epub = Epub::empty(&opf_path);
    epub.version = package.version;
    epub.metadata = package.metadata;
    epub.spine = package.spine;

    // NCX由写入时重新生成，不作为清单项保留
    let mut ncx_href: Option<String> = None;
    for entry in &package.manifest {
        if entry.media_type == NCX_MEDIA_TYPE {
            ncx_href = Some(entry.href.clone());
            continue;
        }

        let absolute_path = paths::relative_to_absolute(&opf_dir, &entry.href);
        let raw_bytes = extract_bytes(&mut archive, &absolute_path)?;
        epub.manifest.push(EpubItem::new(
            entry.id.clone(),
            absolute_path,
            entry.media_type.clone(),
            raw_bytes,
        ));
    }

    if let Some(href) = ncx_href {
        let ncx_path = paths::relative_to_absolute(&opf_dir, &href);
        let ncx_dir = paths::zip_directory(&ncx_path).to_string();
        let ncx_content = extract_text(&mut archive, &ncx_path)?;
        epub.toc = parse_ncx(&ncx_content)?;
        // 目录中的content路径统一换算为容器内绝对路径
        for entry in &mut epub.toc {
            resolve_toc_paths(entry, &ncx_dir);
        }
    } else {
        log::warn!("清单中没有NCX条目，目录为空: {}", opf_path);
    }

    log::debug!(
        "已加载EPUB: {} 个清单项, {} 个脊柱条目",
        epub.manifest.len(),
        epub.spine.len()
    );

    Ok(epub)
}

/// 校验mimetype文件的存在及内容
fn validate_mimetype(archive: &mut ZipArchive<File>) -> Result<()> {
    let mut file = archive
        .by_name("mimetype")
        .map_err(|_| EpubError::MissingMimetype)?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;

    let content = content.trim();
    if content != EPUB_MIMETYPE {
        return Err(EpubError::InvalidMimetype {
            expected: EPUB_MIMETYPE.to_string(),
            found: content.to_string(),
        });
    }

    Ok(())
}

/// 提取指定文件的文本内容
fn extract_text(archive: &mut ZipArchive<File>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// 提取指定文件的二进制内容
fn extract_bytes(archive: &mut ZipArchive<File>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive.by_name(name)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// 递归地将目录条目的content路径换算为绝对路径
fn resolve_toc_paths(entry: &mut crate::epub::TocEntry, ncx_dir: &str) {
    let (path, fragment) = match entry.content_src.split_once('#') {
        Some((path, fragment)) => (path.to_string(), Some(fragment.to_string())),
        None => (entry.content_src.clone(), None),
    };

    let mut absolute = paths::relative_to_absolute(ncx_dir, &path);
    if let Some(fragment) = fragment {
        absolute.push('#');
        absolute.push_str(&fragment);
    }
    entry.content_src = absolute;

    for child in &mut entry.children {
        resolve_toc_paths(child, ncx_dir);
    }
}
