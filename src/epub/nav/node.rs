//! 导航树的原始节点定义
//!
//! `NavNode` 是EPUB导航信息（NCX或导航文档）解析后的统一形态，
//! 章节树构建器只依赖这里的结构。

use std::fmt::{Display, Formatter, Result as FmtResult};

/// 导航节点
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavNode {
    /// 原始标题，可能为空
    pub title: String,
    /// 指向的资源（已相对归档根目录解析），对章节树而言是不透明字符串
    pub href: Option<String>,
    /// 子节点，保持文档顺序
    pub children: Vec<NavNode>,
}

impl NavNode {
    /// 创建新的导航节点
    pub fn new(title: impl Into<String>, href: Option<String>) -> Self {
        Self {
            title: title.into(),
            href,
            children: Vec::new(),
        }
    }

    /// 创建合成根节点，其子节点即为顶层目录项
    pub fn root(children: Vec<NavNode>) -> Self {
        Self {
            title: String::new(),
            href: None,
            children,
        }
    }

    /// 设置子节点
    pub fn with_children(mut self, children: Vec<NavNode>) -> Self {
        self.children = children;
        self
    }

    /// 添加子节点
    pub fn add_child(&mut self, child: NavNode) {
        self.children.push(child);
    }

    /// 子孙节点总数（不含自身）
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// 递归改写所有href
    pub(crate) fn map_hrefs<F>(&mut self, f: &F)
    where
        F: Fn(&str) -> String,
    {
        if let Some(href) = self.href.as_mut() {
            *href = f(href);
        }
        for child in &mut self.children {
            child.map_hrefs(f);
        }
    }
}

/// 导航信息的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavSource {
    /// EPUB 3 导航文档（`<nav epub:type="toc">`）
    NavDocument,
    /// EPUB 2 NCX文件
    Ncx,
}

impl Display for NavSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NavSource::NavDocument => write!(f, "导航文档"),
            NavSource::Ncx => write!(f, "NCX"),
        }
    }
}

/// 从EPUB中读取到的完整导航信息
#[derive(Debug, Clone)]
pub struct Navigation {
    /// 来源
    pub source: NavSource,
    /// 书名（OPF的dc:title，缺失时使用NCX的docTitle）
    pub doc_title: Option<String>,
    /// 合成根节点
    pub root: NavNode,
}
