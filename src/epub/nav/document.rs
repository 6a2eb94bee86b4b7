//! EPUB 3 导航文档解析
//!
//! 导航文档是XHTML，目录位于 `<nav epub:type="toc">` 下的 `<ol>` 中：
//! 每个 `<li>` 以 `<a>`（或不可跳转的 `<span>`）作为标题，嵌套的 `<ol>` 为子目录。

use crate::epub::error::{EpubError, Result};
use crate::epub::nav::{self, MAX_NAV_DEPTH, NavNode};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static NAV_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("nav").expect("nav选择器无效"));
static OL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("ol").expect("ol选择器无效"));

/// 导航文档解析结果
#[derive(Debug, Clone)]
pub struct NavDocument {
    /// toc导航下的顶层目录项
    pub entries: Vec<NavNode>,
}

impl NavDocument {
    /// 解析导航文档
    ///
    /// 优先使用 `epub:type` 含 `toc`（或 `role="doc-toc"`）的nav元素，
    /// 没有时退回第一个nav元素。文档中没有nav元素时返回`NavDocumentParseError`。
    pub fn parse_html(content: &str) -> Result<NavDocument> {
        let document = Html::parse_document(content);
        let navs: Vec<ElementRef> = document.select(&NAV_SELECTOR).collect();

        let toc_nav = navs
            .iter()
            .find(|nav| Self::is_toc_nav(nav))
            .or_else(|| navs.first())
            .ok_or_else(|| EpubError::NavDocumentParseError("没有找到nav元素".to_string()))?;

        let entries = match Self::find_list(*toc_nav) {
            Some(list) => Self::parse_list(list, 0)?,
            None => Vec::new(),
        };

        Ok(NavDocument { entries })
    }

    /// 判断nav元素是否为目录导航
    fn is_toc_nav(nav: &ElementRef) -> bool {
        nav.value().attrs().any(|(name, value)| {
            let is_type_attr = name == "epub:type" || name.ends_with(":type");
            (is_type_attr && value.split_whitespace().any(|v| v == "toc"))
                || (name == "role" && value == "doc-toc")
        })
    }

    /// 查找nav的目录列表：优先直接子元素中的ol
    fn find_list(nav: ElementRef) -> Option<ElementRef> {
        nav.children()
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name() == "ol")
            .or_else(|| nav.select(&OL_SELECTOR).next())
    }

    /// 递归解析ol列表，`depth`为列表中条目的嵌套层级
    fn parse_list(list: ElementRef, depth: u32) -> Result<Vec<NavNode>> {
        if depth >= MAX_NAV_DEPTH {
            return Err(nav::too_deep());
        }

        list.children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .map(|item| Self::parse_item(item, depth))
            .collect()
    }

    /// 解析单个li条目
    fn parse_item(item: ElementRef, depth: u32) -> Result<NavNode> {
        let mut node = NavNode::default();
        let mut has_label = false;

        for child in item.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "a" | "span" if !has_label => {
                    node.title = child.text().collect::<String>().trim().to_string();
                    node.href = child
                        .value()
                        .attr("href")
                        .map(str::trim)
                        .filter(|href| !href.is_empty())
                        .map(str::to_string);
                    has_label = true;
                }
                "ol" => {
                    node.children.extend(Self::parse_list(child, depth + 1)?);
                }
                _ => {}
            }
        }

        Ok(node)
    }
}
