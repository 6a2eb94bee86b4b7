use crate::epub::error::{EpubError, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// OPF包文件的标准媒体类型
pub const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Container.xml中的rootfile信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFile {
    pub full_path: String,
    pub media_type: String,
}

/// META-INF/container.xml 的解析结果
#[derive(Debug, Clone)]
pub struct Container {
    pub rootfiles: Vec<RootFile>,
}

impl Container {
    /// 解析container.xml内容
    ///
    /// 没有任何带 `full-path` 的 rootfile 时返回 `ContainerParseError`。
    pub fn parse_xml(xml_content: &str) -> Result<Container> {
        let mut reader = Reader::from_str(xml_content.trim_start_matches('\u{feff}'));
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut rootfiles = Vec::new();
        let mut buf = Vec::new();
        let mut in_rootfiles = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"rootfiles" => in_rootfiles = true,
                    b"rootfile" if in_rootfiles => {
                        let mut full_path = String::new();
                        let mut media_type = String::new();

                        for attr_result in e.attributes() {
                            let attr = attr_result
                                .map_err(|e| EpubError::XmlError(quick_xml::Error::InvalidAttr(e)))?;
                            match attr.key.local_name().as_ref() {
                                b"full-path" => {
                                    full_path = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                b"media-type" => {
                                    media_type = String::from_utf8_lossy(&attr.value).to_string();
                                }
                                _ => {}
                            }
                        }

                        // 部分EPUB省略media-type，只要路径存在就保留
                        if !full_path.is_empty() {
                            rootfiles.push(RootFile { full_path, media_type });
                        }
                    }
                    _ => {}
                },
                Event::End(ref e) => {
                    if e.local_name().as_ref() == b"rootfiles" {
                        in_rootfiles = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if rootfiles.is_empty() {
            return Err(EpubError::ContainerParseError(
                "没有找到任何rootfile条目".to_string(),
            ));
        }

        Ok(Container { rootfiles })
    }

    /// 主要的OPF文件路径
    ///
    /// 优先选择媒体类型为 `application/oebps-package+xml` 的rootfile，否则退回第一个。
    pub fn opf_path(&self) -> Option<&str> {
        self.rootfiles
            .iter()
            .find(|rootfile| rootfile.media_type == OPF_MEDIA_TYPE)
            .or_else(|| self.rootfiles.first())
            .map(|rootfile| rootfile.full_path.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_container_xml() {
        let container_xml = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OEBPS/toc.ncx" media-type="application/x-dtbncx+xml"/>
        <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#;

        let container = Container::parse_xml(container_xml).unwrap();
        assert_eq!(container.rootfiles.len(), 2);
        assert_eq!(container.rootfiles[0].full_path, "OEBPS/toc.ncx");
        assert_eq!(container.opf_path(), Some("OEBPS/content.opf"));
    }

    #[test]
    fn test_opf_path_falls_back_to_first_rootfile() {
        let container = Container {
            rootfiles: vec![RootFile {
                full_path: "book/package.opf".to_string(),
                media_type: String::new(),
            }],
        };

        assert_eq!(container.opf_path(), Some("book/package.opf"));
    }

    #[test]
    fn test_parse_container_with_bom() {
        let container_xml = "\u{feff}<?xml version=\"1.0\"?><container><rootfiles>\
            <rootfile full-path=\"content.opf\" media-type=\"application/oebps-package+xml\"/>\
            </rootfiles></container>";

        let container = Container::parse_xml(container_xml).unwrap();
        assert_eq!(container.opf_path(), Some("content.opf"));
    }

    #[test]
    fn test_parse_container_without_rootfiles() {
        let result = Container::parse_xml("<container><rootfiles/></container>");
        assert!(matches!(result, Err(EpubError::ContainerParseError(_))));
    }
}
