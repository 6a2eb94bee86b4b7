//! 目录输出配置模块
//!
//! 提供章节树构建与渲染的配置，支持从YAML文件加载。

use crate::epub::error::{EpubError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 空标题的默认占位文本
pub const DEFAULT_PLACEHOLDER_TITLE: &str = "Untitled";

/// 目录显示样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TocStyle {
    /// 按深度缩进的列表（• ）
    #[default]
    Indented,
    /// 使用树状符号（├── └──）
    Tree,
    /// Markdown标题，顶层章节为 `##`
    Markdown,
    /// 结构化JSON
    Json,
}

/// 目录配置
///
/// 所有字段都有默认值，YAML文件中只需写出需要覆盖的项。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    /// 空标题的占位文本
    pub placeholder_title: String,
    /// 没有任何顶层章节时是否输出空目录（否则报错）
    pub allow_empty: bool,
    /// 显示样式
    pub style: TocStyle,
    /// 是否显示章节对应的文件路径
    pub show_paths: bool,
    /// 最大显示深度（None表示显示所有）
    pub max_depth: Option<u32>,
    /// 是否输出书名标题
    pub include_title: bool,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            placeholder_title: DEFAULT_PLACEHOLDER_TITLE.to_string(),
            allow_empty: false,
            style: TocStyle::Indented,
            show_paths: false,
            max_depth: None,
            include_title: true,
        }
    }
}

impl TocConfig {
    /// 从YAML配置文件加载
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use epub_toc::TocConfig;
    /// let config = TocConfig::from_file("toc.yaml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EpubError::ConfigError(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;

        Self::from_yaml_str(&content)
    }

    /// 从YAML字符串解析
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // 空文件视为全部使用默认值
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yml::from_str(content)
            .map_err(|e| EpubError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 序列化为YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self)
            .map_err(|e| EpubError::ConfigError(format!("序列化配置失败: {}", e)))
    }
}
