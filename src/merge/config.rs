//! 合并配置模块
//!
//! 提供质量检查相关的配置管理，支持从YAML文件加载配置。

use crate::epub::error::{EpubError, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// 默认配置文件路径
const DEFAULT_CONFIG_PATH: &str = "merge.yaml";

fn default_exempt_files() -> Vec<String> {
    vec!["Cover.xhtml".to_string(), "0000_Information.xhtml".to_string()]
}

fn default_min_fragments() -> usize {
    3
}

/// 合并质量检查配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// 免检文件名列表（只匹配文件名部分，区分大小写）
    ///
    /// 封面、版权页等文本很少的页面不参与空页/重复检查。
    #[serde(default = "default_exempt_files")]
    pub exempt_files: Vec<String>,

    /// 少于该数量的不同文本片段视为疑似空页
    #[serde(default = "default_min_fragments")]
    pub min_fragments: usize,
}

impl MergeConfig {
    /// 从默认配置文件中加载合并配置
    ///
    /// 配置文件默认为当前目录下的 `merge.yaml`
    ///
    /// # 返回值
    /// * `Result<Self>` - 加载成功返回配置实例，失败返回错误
    pub fn from_file() -> Result<Self> {
        Self::from_path(DEFAULT_CONFIG_PATH)
    }

    /// 从指定路径加载合并配置
    ///
    /// # 参数
    /// * `path` - YAML配置文件路径
    ///
    /// # 返回值
    /// * `Result<Self>` - 加载成功返回配置实例，失败返回错误
    pub fn from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| EpubError::ConfigError(format!("无法读取配置文件: {}", e)))?;

        serde_yml::from_str(&content)
            .map_err(|e| EpubError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 生成默认配置文件到当前目录
    ///
    /// # 返回值
    /// * `Result<()>` - 生成成功返回Ok，失败返回错误
    pub fn generate_default_config() -> Result<()> {
        let yaml_content = serde_yml::to_string(&Self::default_config())
            .map_err(|e| EpubError::ConfigError(format!("序列化配置失败: {}", e)))?;

        let content_with_header = format!(
            "# 合并质量检查配置文件\n# exempt_files: 免检的文件名\n# min_fragments: 疑似空页的片段数阈值\n\n{}",
            yaml_content
        );

        fs::write(DEFAULT_CONFIG_PATH, content_with_header)
            .map_err(|e| EpubError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }

    /// 获取默认配置
    pub fn default_config() -> Self {
        Self {
            exempt_files: default_exempt_files(),
            min_fragments: default_min_fragments(),
        }
    }

    /// 尝试从默认配置文件加载，失败则使用默认配置
    pub fn new() -> Self {
        Self::from_file().unwrap_or_else(|_| Self::default_config())
    }

    /// 检查指定文件名是否免检
    ///
    /// # 参数
    /// * `file_name` - 文件名部分（不含目录），精确匹配
    pub fn is_exempt(&self, file_name: &str) -> bool {
        self.exempt_files.iter().any(|f| f == file_name)
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exempt_files() {
        let config = MergeConfig::default_config();
        assert!(config.is_exempt("Cover.xhtml"));
        assert!(config.is_exempt("0000_Information.xhtml"));
        assert!(!config.is_exempt("0001_ch1.xhtml"));
        // 精确匹配，区分大小写
        assert!(!config.is_exempt("cover.xhtml"));
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = "exempt_files:\n  - Titlepage.xhtml\nmin_fragments: 5\n";
        let config: MergeConfig = serde_yml::from_str(yaml).expect("解析配置失败");
        assert!(config.is_exempt("Titlepage.xhtml"));
        assert!(!config.is_exempt("Cover.xhtml"));
        assert_eq!(config.min_fragments, 5);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: MergeConfig = serde_yml::from_str("min_fragments: 2\n").expect("解析配置失败");
        assert_eq!(config.min_fragments, 2);
        assert!(config.is_exempt("Cover.xhtml"));
    }
}
