use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::epub::container::Container;
use crate::epub::error::{EpubError, Result};
use crate::epub::nav::{self, NavDocument, NavNode, NavSource, Navigation, Ncx};
use crate::epub::opf::Opf;

/// EPUB的标准mimetype
const EPUB_MIMETYPE: &str = "application/epub+zip";

/// 表示一个已打开并通过mimetype校验的EPUB文件
///
/// 归档的文件句柄由实例持有，实例销毁时随之释放。
pub struct Epub {
    archive: ZipArchive<File>,
    path: PathBuf,
}

impl Epub {
    /// 从文件路径创建Epub实例
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<Epub, EpubError>` - 路径不存在时为`FileNotFound`，
    ///   不是ZIP归档时为`InvalidArchive`，mimetype不正确时为`MissingMimetype`/`InvalidMimetype`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Epub> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => EpubError::FileNotFound(path.to_path_buf()),
            _ => EpubError::Io(e),
        })?;
        let archive = ZipArchive::new(file).map_err(EpubError::InvalidArchive)?;

        let mut epub = Epub {
            archive,
            path: path.to_path_buf(),
        };
        epub.validate()?;

        Ok(epub)
    }

    /// 打开时使用的文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 验证mimetype文件的内容是否为"application/epub+zip"
    fn validate(&mut self) -> Result<()> {
        let mut file = match self.archive.by_name("mimetype") {
            Ok(file) => file,
            Err(_) => return Err(EpubError::MissingMimetype),
        };

        let mut content = String::new();
        file.read_to_string(&mut content)?;

        let content = content.trim();
        if content != EPUB_MIMETYPE {
            return Err(EpubError::InvalidMimetype {
                expected: EPUB_MIMETYPE.to_string(),
                found: content.to_string(),
            });
        }

        debug!(path = %self.path.display(), "EPUB验证成功: mimetype文件正确");
        Ok(())
    }

    /// 检查归档中是否存在指定条目
    pub fn has_file(&self, filename: &str) -> bool {
        self.archive.file_names().any(|name| name == filename)
    }

    /// 提取指定文件的文本内容
    ///
    /// 非UTF-8字节会被替换，开头的BOM会被去掉。
    pub fn extract_file(&mut self, filename: &str) -> Result<String> {
        let mut file = self.archive.by_name(filename)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;

        let content = String::from_utf8_lossy(&buffer);
        Ok(content.trim_start_matches('\u{feff}').to_string())
    }

    /// 解析container.xml文件
    pub fn parse_container(&mut self) -> Result<Container> {
        let container_content = self.extract_file("META-INF/container.xml")?;
        Container::parse_xml(&container_content)
    }

    /// 获取主要的OPF文件路径
    pub fn get_opf_path(&mut self) -> Result<String> {
        let container = self.parse_container()?;

        container.opf_path().map(str::to_string).ok_or_else(|| {
            EpubError::ContainerParseError("container.xml中没有找到有效的rootfile".to_string())
        })
    }

    /// 解析OPF文件
    pub fn parse_opf(&mut self) -> Result<Opf> {
        let opf_path = self.get_opf_path()?;
        self.parse_opf_at(&opf_path)
    }

    /// 解析已知路径的OPF文件
    fn parse_opf_at(&mut self, opf_path: &str) -> Result<Opf> {
        let opf_content = self.extract_file(opf_path)?;

        Opf::parse_xml(&opf_content).map_err(|e| match e {
            EpubError::XmlError(xml_err) => EpubError::OpfParseError(format!("XML解析错误: {}", xml_err)),
            other => other,
        })
    }

    /// 书籍标题（OPF中的dc:title）
    pub fn book_title(&mut self) -> Result<Option<String>> {
        Ok(self.parse_opf()?.metadata.title())
    }

    /// 读取EPUB的目录导航
    ///
    /// 查找顺序：
    /// 1. OPF清单中带`nav`属性的导航文档，解析出至少一个条目时使用
    /// 2. spine@toc引用或清单中的NCX文件
    /// 3. 归档中任意`.ncx`文件
    ///
    /// OPF中声明但归档里不存在的文件视为没有声明。
    /// 两种来源都不存在时返回`MissingNavigation`。
    /// 来源存在但没有条目时返回空的根节点，是否视为错误由章节树构建器决定。
    pub fn navigation(&mut self) -> Result<Navigation> {
        let opf_path = self.get_opf_path()?;
        let opf_dir = nav::parent_dir(&opf_path).to_string();
        let opf = self.parse_opf_at(&opf_path)?;
        let book_title = opf.metadata.title();
        debug!(
            version = %opf.version,
            title = ?book_title,
            language = ?opf.metadata.language(),
            creators = ?opf.metadata.creators(),
            "OPF解析完成"
        );

        let mut empty_nav_document = None;
        let mut nav_document_error = None;

        let nav_path = opf
            .get_nav_path()
            .map(|href| nav::resolve_href(&opf_dir, href))
            .filter(|path| self.declared_file_exists(path, "导航文档"));

        if let Some(nav_path) = nav_path {
            debug!(path = %nav_path, "找到EPUB 3导航文档");

            match self.read_nav_document(&nav_path) {
                Ok(root) if !root.children.is_empty() => {
                    return Ok(Navigation {
                        source: NavSource::NavDocument,
                        doc_title: book_title,
                        root,
                    });
                }
                Ok(root) => {
                    debug!(path = %nav_path, "导航文档中没有目录条目，尝试NCX");
                    empty_nav_document = Some(root);
                }
                Err(e) => {
                    warn!(path = %nav_path, error = %e, "无法读取导航文档，尝试NCX");
                    nav_document_error = Some(e);
                }
            }
        }

        let ncx_path = opf
            .get_ncx_path()
            .map(|href| nav::resolve_href(&opf_dir, href))
            .filter(|path| self.declared_file_exists(path, "NCX"))
            .or_else(|| self.find_ncx_file());

        if let Some(ncx_path) = ncx_path {
            debug!(path = %ncx_path, "使用NCX目录");
            let (ncx_title, root) = self.read_ncx(&ncx_path)?;
            return Ok(Navigation {
                source: NavSource::Ncx,
                doc_title: book_title.or(ncx_title),
                root,
            });
        }

        if let Some(root) = empty_nav_document {
            return Ok(Navigation {
                source: NavSource::NavDocument,
                doc_title: book_title,
                root,
            });
        }

        Err(nav_document_error.unwrap_or(EpubError::MissingNavigation))
    }

    /// 读取并解析导航文档，href解析为归档内路径
    fn read_nav_document(&mut self, nav_path: &str) -> Result<NavNode> {
        let content = self.extract_file(nav_path)?;
        let document = NavDocument::parse_html(&content)?;

        let base_dir = nav::parent_dir(nav_path);
        let mut root = NavNode::root(document.entries);
        root.map_hrefs(&|href| nav::resolve_href(base_dir, href));
        Ok(root)
    }

    /// 读取并解析NCX文件，返回(docTitle, 根节点)
    fn read_ncx(&mut self, ncx_path: &str) -> Result<(Option<String>, NavNode)> {
        let content = self.extract_file(ncx_path)?;
        let ncx = Ncx::parse_xml(&content).map_err(|e| match e {
            EpubError::XmlError(xml_err) => EpubError::NcxParseError(format!("XML解析错误: {}", xml_err)),
            other => other,
        })?;

        let base_dir = nav::parent_dir(ncx_path);
        let doc_title = ncx.doc_title.clone();
        let mut root = ncx.into_root();
        root.map_hrefs(&|href| nav::resolve_href(base_dir, href));
        Ok((doc_title, root))
    }

    /// OPF中声明的文件是否确实在归档中
    fn declared_file_exists(&self, path: &str, kind: &str) -> bool {
        let exists = self.has_file(path);
        if !exists {
            warn!(path = %path, "OPF中声明的{}不在归档中", kind);
        }
        exists
    }

    /// OPF中没有声明（或声明的文件不存在）NCX时，在归档中查找任意.ncx文件
    fn find_ncx_file(&self) -> Option<String> {
        self.archive
            .file_names()
            .find(|name| name.to_ascii_lowercase().ends_with(".ncx"))
            .map(str::to_string)
    }
}
