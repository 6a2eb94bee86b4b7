//! 章节树模块
//!
//! 由导航树构建规范化的章节树，并按配置渲染为文本。

pub mod builder;
pub mod config;
pub mod tree;

pub use builder::{ChapterNode, ChapterTreeBuilder, MAX_NAV_DEPTH, build};
pub use config::{DEFAULT_PLACEHOLDER_TITLE, TocConfig, TocStyle};
pub use tree::{ChapterTree, TocStatistics};
