//! 元数据处理模块
//!
//! 只保留目录输出需要的Dublin Core字段（标题、作者、语言）。

use std::collections::HashMap;

/// OPF文件中的元数据信息
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Dublin Core元数据：key为去掉命名空间前缀的标签名（如"title"），value按文档顺序保存
    dublin_core: HashMap<String, Vec<String>>,
}

impl Metadata {
    /// 创建新的元数据实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加Dublin Core元数据
    pub fn add_dublin_core(&mut self, tag: String, value: String) {
        self.dublin_core.entry(tag).or_default().push(value);
    }

    fn first(&self, tag: &str) -> Option<String> {
        self.dublin_core
            .get(tag)
            .and_then(|values| values.first())
            .cloned()
    }

    /// 书籍标题（第一个 dc:title）
    pub fn title(&self) -> Option<String> {
        self.first("title")
    }

    /// 书籍语言
    pub fn language(&self) -> Option<String> {
        self.first("language")
    }

    /// 所有作者，按出现顺序
    pub fn creators(&self) -> Vec<String> {
        self.dublin_core.get("creator").cloned().unwrap_or_default()
    }
}
