//! OPF（Open Packaging Format）文件解析模块
//!
//! 此模块只提取定位目录所需的信息：元数据标题、清单以及spine的toc引用。

mod manifest;
mod metadata;
mod parser;

pub use manifest::{ManifestItem, NCX_MEDIA_TYPE};
pub use metadata::Metadata;
pub use parser::Opf;
