pub mod epub;
pub mod toc;

// === 核心API重新导出 ===

/// EPUB文件读取器（主要接口）
pub use epub::Epub;

/// 错误处理
pub use epub::{EpubError, Result};

// === 章节树 ===

/// 章节树构建与渲染
pub use toc::{
    ChapterNode,
    ChapterTree,
    ChapterTreeBuilder,
    TocStatistics,
    build,
};

/// 配置
pub use toc::{DEFAULT_PLACEHOLDER_TITLE, TocConfig, TocStyle};

// === 底层组件（高级用法） ===

/// 容器组件
pub use epub::{Container, RootFile};

/// OPF组件
pub use epub::{ManifestItem, Metadata, Opf};

/// 导航组件
pub use epub::{NavDocument, NavNode, NavSource, Navigation, Ncx};

// === 库信息 ===

/// 库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库的描述
pub const DESCRIPTION: &str = "从EPUB导航信息中提取层级目录";

// === 便捷函数 ===

/// 快速打开EPUB文件
///
/// 这是 `Epub::new` 的便捷包装函数。
///
/// # 示例
///
/// ```no_run
/// let mut epub = epub_toc::open("book.epub")?;
/// let navigation = epub.navigation()?;
/// let tree = epub_toc::build(&navigation.root)?.with_title(navigation.doc_title);
/// println!("{}", tree.render()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Epub> {
    Epub::new(path)
}
