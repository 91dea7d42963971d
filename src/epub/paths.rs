//! 容器内路径工具模块
//!
//! 提供EPUB容器内部路径（POSIX风格，以`/`分隔）的拆分、拼接、
//! 相对路径与绝对路径的互相转换，以及文件名4位数字前缀的处理。

/// 获取容器路径中的文件名部分
///
/// # 参数
/// * `path` - 容器内的绝对路径
///
/// # 返回值
/// * `&str` - 最后一个`/`之后的文件名，没有`/`时返回整个路径
pub fn zip_file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// 获取容器路径中的目录部分
///
/// # 参数
/// * `path` - 容器内的绝对路径
///
/// # 返回值
/// * `&str` - 最后一个`/`之前的目录，没有目录时返回空字符串
pub fn zip_directory(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// 拼接目录和文件名
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// 将相对路径解析为容器内的绝对路径
///
/// 以`item_dir`为基准目录，处理`.`和`..`组件。
///
/// # 参数
/// * `item_dir` - 引用该相对路径的文件所在目录
/// * `relative` - 相对路径
///
/// # 返回值
/// * `String` - 规范化后的绝对路径
pub fn relative_to_absolute(item_dir: &str, relative: &str) -> String {
    let mut components: Vec<&str> = item_dir.split('/').filter(|c| !c.is_empty()).collect();

    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    components.join("/")
}

/// 将容器内的绝对路径重新表示为相对于指定目录的相对路径
///
/// # 参数
/// * `item_dir` - 引用方文件所在目录
/// * `absolute` - 目标文件的绝对路径
///
/// # 返回值
/// * `String` - 从`item_dir`出发的相对路径
pub fn absolute_to_relative(item_dir: &str, absolute: &str) -> String {
    let dir_components: Vec<&str> = item_dir.split('/').filter(|c| !c.is_empty()).collect();
    let target_components: Vec<&str> = absolute.split('/').filter(|c| !c.is_empty()).collect();

    // 目标路径的最后一段是文件名，不参与公共目录比较
    let target_dirs = &target_components[..target_components.len().saturating_sub(1)];

    let mut common = 0;
    while common < dir_components.len()
        && common < target_dirs.len()
        && dir_components[common] == target_dirs[common]
    {
        common += 1;
    }

    let mut parts: Vec<&str> = Vec::new();
    for _ in common..dir_components.len() {
        parts.push("..");
    }
    parts.extend_from_slice(&target_components[common..]);

    parts.join("/")
}

/// 从文件名中提取4位数字前缀
///
/// 文件名约定为`<4位数字>_<名称>`；不符合该约定时返回`None`
/// （按照前缀为0处理，不视为错误）。
///
/// # 参数
/// * `file_name` - 文件名（不含目录）
///
/// # 返回值
/// * `Option<&str>` - 4位数字前缀
pub fn extract_prefix(file_name: &str) -> Option<&str> {
    let bytes = file_name.as_bytes();
    if bytes.len() > 5 && bytes[4] == b'_' && bytes[..4].iter().all(|b| b.is_ascii_digit()) {
        Some(&file_name[..4])
    } else {
        None
    }
}

/// 获取文件名的数字前缀值
///
/// 没有可识别前缀的文件名按前缀0处理。
pub fn prefix_as_u32(file_name: &str) -> u32 {
    extract_prefix(file_name)
        .and_then(|p| p.parse().ok())
        .unwrap_or(0)
}

/// 去掉文件名的数字前缀和下划线
///
/// 没有可识别前缀时原样返回。
pub fn strip_prefix(file_name: &str) -> &str {
    if extract_prefix(file_name).is_some() {
        &file_name[5..]
    } else {
        file_name
    }
}

/// 去掉字符串中的所有数字字符
///
/// 用于从旧ID生成新ID：去掉所有数字后再追加新的4位前缀。
pub fn strip_digits(id: &str) -> String {
    id.chars().filter(|c| !c.is_ascii_digit()).collect()
}
