pub mod error;
pub mod container;
pub mod reader;
pub mod opf;
pub mod nav;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出容器相关
pub use container::{Container, RootFile};

// 重新导出EPUB读取器
pub use reader::Epub;

// 重新导出OPF相关
pub use opf::{ManifestItem, Metadata, Opf};

// 重新导出导航相关
pub use nav::{NavDocument, NavNode, NavSource, Navigation, Ncx};
