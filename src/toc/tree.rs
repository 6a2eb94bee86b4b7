//! 章节树（Chapter Tree）模块
//!
//! 提供构建完成的章节树及其文本渲染：缩进列表、树状符号、Markdown与JSON。

use crate::epub::error::Result;
use crate::toc::builder::ChapterNode;
use crate::toc::config::{TocConfig, TocStyle};
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// 章节树结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterTree {
    /// 书名
    pub title: Option<String>,
    /// 顶层章节，深度均为0
    pub roots: Vec<ChapterNode>,
    /// 显示样式
    pub style: TocStyle,
    /// 是否显示文件路径
    pub show_paths: bool,
    /// 最大显示深度（None表示显示所有）
    pub max_depth: Option<u32>,
    /// 是否输出书名标题
    pub include_title: bool,
}

/// JSON输出的顶层结构
#[derive(Serialize)]
struct JsonToc<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    chapters: Vec<ChapterNode>,
}

impl ChapterTree {
    /// 用顶层章节创建章节树，渲染设置为默认值
    pub fn from_roots(roots: Vec<ChapterNode>) -> Self {
        Self {
            title: None,
            roots,
            style: TocStyle::default(),
            show_paths: false,
            max_depth: None,
            include_title: true,
        }
    }

    /// 设置书名
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// 设置显示样式
    pub fn with_style(mut self, style: TocStyle) -> Self {
        self.style = style;
        self
    }

    /// 设置是否显示文件路径
    pub fn with_show_paths(mut self, show_paths: bool) -> Self {
        self.show_paths = show_paths;
        self
    }

    /// 设置最大显示深度
    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 设置是否输出书名标题
    pub fn with_include_title(mut self, include_title: bool) -> Self {
        self.include_title = include_title;
        self
    }

    /// 应用配置中的渲染设置
    pub fn with_config(self, config: &TocConfig) -> Self {
        self.with_style(config.style)
            .with_show_paths(config.show_paths)
            .with_max_depth(config.max_depth)
            .with_include_title(config.include_title)
    }

    /// 是否没有任何章节
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// 获取章节树的统计信息
    pub fn get_statistics(&self) -> TocStatistics {
        TocStatistics {
            total_nodes: self.roots.iter().map(ChapterNode::get_total_nodes).sum(),
            max_depth: self
                .roots
                .iter()
                .map(ChapterNode::get_max_depth)
                .max()
                .unwrap_or(0),
            leaf_count: self.roots.iter().map(ChapterNode::get_leaf_count).sum(),
            root_count: self.roots.len(),
        }
    }

    /// 按先序遍历获取所有章节标题
    pub fn get_all_titles(&self) -> Vec<String> {
        let mut titles = Vec::new();
        for root in &self.roots {
            root.collect_titles(&mut titles);
        }
        titles.into_iter().map(str::to_string).collect()
    }

    /// 渲染章节树
    ///
    /// 同一棵树多次渲染得到完全相同的结果。只有JSON序列化可能失败。
    pub fn render(&self) -> Result<String> {
        let mut result = String::new();

        match self.style {
            TocStyle::Indented => {
                self.render_header(&mut result);
                for root in &self.roots {
                    self.render_indent_style(root, &mut result);
                }
            }
            TocStyle::Tree => {
                self.render_header(&mut result);
                for (index, root) in self.roots.iter().enumerate() {
                    let is_last = index == self.roots.len() - 1;
                    self.render_tree_style(root, is_last, "", &mut result);
                }
            }
            TocStyle::Markdown => {
                if let Some(title) = self.visible_title() {
                    result.push_str(&format!("# {}\n\n", title));
                }
                for root in &self.roots {
                    self.render_markdown_style(root, &mut result);
                }
            }
            TocStyle::Json => {
                result = self.render_json()?;
            }
        }

        Ok(result)
    }

    /// 需要输出的书名
    fn visible_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|_| self.include_title)
    }

    /// 节点是否在显示深度以内
    fn is_visible(&self, node: &ChapterNode) -> bool {
        self.max_depth.is_none_or(|max_depth| node.depth < max_depth)
    }

    /// 文本样式的标题头
    fn render_header(&self, result: &mut String) {
        if let Some(title) = self.visible_title() {
            let depth_info = match self.max_depth {
                Some(max_depth) => format!(" (深度限制: {})", max_depth),
                None => String::new(),
            };
            result.push_str(&format!("📖 {}{}\n", title, depth_info));
            result.push_str("═══════════════════════════════════════\n\n");
        }
    }

    /// 章节的显示文本
    fn node_label(&self, node: &ChapterNode) -> String {
        match (&node.href, self.show_paths) {
            (Some(href), true) => format!("{} → {}", node.title, href),
            _ => node.title.clone(),
        }
    }

    /// 渲染缩进风格
    fn render_indent_style(&self, node: &ChapterNode, result: &mut String) {
        if !self.is_visible(node) {
            return;
        }

        let indent = "  ".repeat(node.depth as usize);
        result.push_str(&format!("{}• {}\n", indent, self.node_label(node)));

        for child in &node.children {
            self.render_indent_style(child, result);
        }
    }

    /// 渲染树状符号风格
    fn render_tree_style(&self, node: &ChapterNode, is_last: bool, prefix: &str, result: &mut String) {
        if !self.is_visible(node) {
            return;
        }

        let current_prefix = if is_last { "└── " } else { "├── " };
        result.push_str(&format!("{}{}{}\n", prefix, current_prefix, self.node_label(node)));

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        for (index, child) in node.children.iter().enumerate() {
            let is_child_last = index == node.children.len() - 1;
            self.render_tree_style(child, is_child_last, &child_prefix, result);
        }
    }

    /// 渲染Markdown标题，顶层章节为二级标题
    fn render_markdown_style(&self, node: &ChapterNode, result: &mut String) {
        if !self.is_visible(node) {
            return;
        }

        let hashes = "#".repeat(node.depth as usize + 2);
        result.push_str(&format!("{} {}\n", hashes, self.node_label(node)));

        for child in &node.children {
            self.render_markdown_style(child, result);
        }
    }

    /// 渲染JSON，超出显示深度的子树被裁剪
    fn render_json(&self) -> Result<String> {
        let chapters = self
            .roots
            .iter()
            .filter_map(|root| self.prune(root))
            .collect();

        let json = JsonToc {
            title: self.visible_title(),
            chapters,
        };

        let mut output = serde_json::to_string_pretty(&json)?;
        output.push('\n');
        Ok(output)
    }

    /// 复制节点并去掉超出显示深度的子节点
    fn prune(&self, node: &ChapterNode) -> Option<ChapterNode> {
        if !self.is_visible(node) {
            return None;
        }

        let mut pruned = ChapterNode::new(node.title.clone(), node.depth, node.href.clone());
        pruned.children = node
            .children
            .iter()
            .filter_map(|child| self.prune(child))
            .collect();
        Some(pruned)
    }
}

impl Display for ChapterTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let rendered = self.render().map_err(|_| std::fmt::Error)?;
        write!(f, "{}", rendered)
    }
}

/// 章节树统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocStatistics {
    /// 总节点数
    pub total_nodes: usize,
    /// 最大深度
    pub max_depth: u32,
    /// 叶子节点数
    pub leaf_count: usize,
    /// 根节点数
    pub root_count: usize,
}

impl Display for TocStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "目录统计: {} 个章节, {} 个根节点, {} 个叶子节点, 最大深度: {}",
            self.total_nodes, self.root_count, self.leaf_count, self.max_depth
        )
    }
}
