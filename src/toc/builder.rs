//! 章节树构建器
//!
//! 把导航树（`NavNode`）转换为规范化的章节树（`ChapterNode`）：
//! 保持文档顺序与嵌套层级，不增删任何节点，空标题替换为占位文本。

use crate::epub::error::{EpubError, Result};
use crate::epub::nav::{self, NavNode};
use crate::toc::config::{DEFAULT_PLACEHOLDER_TITLE, TocConfig};
use crate::toc::tree::ChapterTree;
use serde::Serialize;
use tracing::debug;

pub use crate::epub::nav::MAX_NAV_DEPTH;

/// 章节树节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterNode {
    /// 标题，永远不为空
    pub title: String,
    /// 节点深度，顶层章节为0
    pub depth: u32,
    /// 源文件路径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// 子节点
    pub children: Vec<ChapterNode>,
}

impl ChapterNode {
    /// 创建新的章节节点
    pub fn new(title: String, depth: u32, href: Option<String>) -> Self {
        Self {
            title,
            depth,
            href,
            children: Vec::new(),
        }
    }

    /// 添加子节点
    pub fn add_child(&mut self, child: ChapterNode) {
        self.children.push(child);
    }

    /// 获取节点的最大深度
    pub fn get_max_depth(&self) -> u32 {
        self.children
            .iter()
            .map(ChapterNode::get_max_depth)
            .fold(self.depth, u32::max)
    }

    /// 获取节点及其所有子节点的数量
    pub fn get_total_nodes(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ChapterNode::get_total_nodes)
            .sum::<usize>()
    }

    /// 叶子节点（没有子节点的节点）数量
    pub fn get_leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(ChapterNode::get_leaf_count).sum()
        }
    }

    /// 先序遍历，把标题追加到列表
    pub(crate) fn collect_titles<'a>(&'a self, titles: &mut Vec<&'a str>) {
        titles.push(&self.title);
        for child in &self.children {
            child.collect_titles(titles);
        }
    }
}

/// 规范化标题：去掉首尾空白并把连续空白折叠为一个空格
pub(crate) fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 章节树构建器
#[derive(Debug, Clone)]
pub struct ChapterTreeBuilder {
    placeholder_title: String,
    allow_empty: bool,
}

impl Default for ChapterTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChapterTreeBuilder {
    /// 使用默认策略创建构建器：占位文本为"Untitled"，没有顶层章节时报错
    pub fn new() -> Self {
        Self {
            placeholder_title: DEFAULT_PLACEHOLDER_TITLE.to_string(),
            allow_empty: false,
        }
    }

    /// 按配置创建构建器
    pub fn from_config(config: &TocConfig) -> Self {
        Self {
            placeholder_title: config.placeholder_title.clone(),
            allow_empty: config.allow_empty,
        }
    }

    /// 设置空标题的占位文本
    pub fn with_placeholder(mut self, placeholder_title: impl Into<String>) -> Self {
        self.placeholder_title = placeholder_title.into();
        self
    }

    /// 设置没有顶层章节时是否返回空目录
    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// 从导航树的根节点构建章节树
    ///
    /// 根节点本身不产生章节，它的子节点是深度为0的顶层章节。
    ///
    /// # 错误
    /// * `ConfigError` - 占位文本为空白
    /// * `MalformedInput` - 嵌套超过 [`MAX_NAV_DEPTH`] 层
    /// * `EmptyDocument` - 没有顶层章节且未允许空目录
    pub fn build(&self, nav_root: &NavNode) -> Result<ChapterTree> {
        if self.placeholder_title.trim().is_empty() {
            return Err(EpubError::ConfigError("占位标题不能为空".to_string()));
        }

        if nav_root.children.is_empty() && !self.allow_empty {
            return Err(EpubError::EmptyDocument);
        }

        let roots = nav_root
            .children
            .iter()
            .map(|child| self.convert(child, 0))
            .collect::<Result<Vec<_>>>()?;

        let tree = ChapterTree::from_roots(roots);
        debug!(
            chapters = tree.get_statistics().total_nodes,
            roots = tree.roots.len(),
            "章节树构建完成"
        );
        Ok(tree)
    }

    /// 递归转换导航节点为章节节点
    fn convert(&self, nav_node: &NavNode, depth: u32) -> Result<ChapterNode> {
        if depth >= MAX_NAV_DEPTH {
            return Err(nav::too_deep());
        }

        let title = match normalize_title(&nav_node.title) {
            title if title.is_empty() => self.placeholder_title.clone(),
            title => title,
        };

        let mut chapter = ChapterNode::new(title, depth, nav_node.href.clone());
        for child in &nav_node.children {
            chapter.add_child(self.convert(child, depth + 1)?);
        }

        Ok(chapter)
    }
}

/// 使用默认策略构建章节树
pub fn build(nav_root: &NavNode) -> Result<ChapterTree> {
    ChapterTreeBuilder::new().build(nav_root)
}
