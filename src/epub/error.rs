use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// Epub相关的错误类型
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("文件不存在: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("文件不是有效的EPUB/ZIP容器: {0}")]
    InvalidArchive(#[source] zip::result::ZipError),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("缺少mimetype文件")]
    MissingMimetype,

    #[error("无效的mimetype: {expected}, 找到: {found}")]
    InvalidMimetype { expected: String, found: String },

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("container.xml解析错误: {0}")]
    ContainerParseError(String),

    #[error("OPF文件解析错误: {0}")]
    OpfParseError(String),

    #[error("NCX文件解析错误: {0}")]
    NcxParseError(String),

    #[error("导航文档解析错误: {0}")]
    NavDocumentParseError(String),

    #[error("EPUB中没有找到目录导航信息（导航文档或NCX）")]
    MissingNavigation,

    #[error("导航结构无效: {0}")]
    MalformedInput(String),

    #[error("目录中没有任何顶层章节")]
    EmptyDocument,

    #[error("配置文件错误: {0}")]
    ConfigError(String),

    #[error("JSON序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}
