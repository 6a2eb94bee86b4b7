//! 导航信息模块
//!
//! 此模块把EPUB中两种目录来源统一为 `NavNode` 树：
//! EPUB 3 的导航文档（XHTML `<nav>`）和 EPUB 2 的NCX文件。

pub mod document;
pub mod ncx;
pub mod node;

pub use document::NavDocument;
pub use ncx::Ncx;
pub use node::{NavNode, NavSource, Navigation};

use crate::epub::error::EpubError;
use percent_encoding::percent_decode_str;

/// 允许的最大嵌套层数，解析导航和构建章节树时都会检查
pub const MAX_NAV_DEPTH: u32 = 64;

/// 嵌套超过 [`MAX_NAV_DEPTH`] 时的错误
pub(crate) fn too_deep() -> EpubError {
    EpubError::MalformedInput(format!("目录嵌套超过 {} 层", MAX_NAV_DEPTH))
}

/// 取归档内路径的目录部分（不含结尾的`/`），位于根目录时返回空字符串
pub(crate) fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |pos| &path[..pos])
}

/// 将导航文件中的相对href解析为归档内的完整路径
///
/// 路径部分按段做百分号解码以对应归档内的条目名，片段（`#id`）原样保留；
/// 纯片段与带协议的外部链接不做处理；`..`与`.`会被折叠。
pub(crate) fn resolve_href(base_dir: &str, href: &str) -> String {
    if href.starts_with('#') || href.contains("://") || href.starts_with("mailto:") {
        return href.to_string();
    }

    let (path, fragment) = match href.find('#') {
        Some(pos) => href.split_at(pos),
        None => (href, ""),
    };

    let mut segments: Vec<String> = if path.starts_with('/') {
        Vec::new()
    } else {
        base_dir
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(percent_decode_str(other).decode_utf8_lossy().into_owned()),
        }
    }

    format!("{}{}", segments.join("/"), fragment)
}
