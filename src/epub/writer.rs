//! EPUB写入模块
//!
//! 将内存中的EPUB文档写回zip容器：mimetype必须是第一个条目且
//! 不压缩，其余文件使用Deflate压缩。container.xml、content.opf
//! 和toc.ncx由文档模型重新生成。

use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::epub::Epub;
use crate::epub::container::Container;
use crate::epub::error::Result;
use crate::epub::ncx::serialize_ncx;
use crate::epub::opf::serialize_opf;
use crate::epub::paths;

/// 将EPUB文档写入文件
///
/// # 参数
/// * `epub` - 内存中的EPUB文档
/// * `path` - 输出文件路径
pub fn write_epub<P: AsRef<Path>>(epub: &Epub, path: P) -> Result<()> {
    // 先完成所有序列化，任何一步失败都不会产生输出文件
    let container_xml = Container::for_opf(&epub.opf_path).to_xml()?;
    let opf_bytes = serialize_opf(epub)?;
    let ncx_bytes = serialize_ncx(epub)?;
    let ncx_path = paths::join(paths::zip_directory(&epub.opf_path), "toc.ncx");

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("mimetype", stored)?;
    zip.write_all(b"application/epub+zip")?;

    zip.start_file("META-INF/container.xml", deflated)?;
    zip.write_all(&container_xml)?;

    zip.start_file(&epub.opf_path, deflated)?;
    zip.write_all(&opf_bytes)?;

    zip.start_file(&ncx_path, deflated)?;
    zip.write_all(&ncx_bytes)?;

    for item in &epub.manifest {
        zip.start_file(&item.absolute_path, deflated)?;
        zip.write_all(&item.raw_bytes)?;
    }

    zip.finish()?;

    log::debug!("已写入EPUB: {} 个清单项", epub.manifest.len());
    Ok(())
}
