//! OPF解析器模块
//!
//! 提供OPF（Open Packaging Format）文件的XML解析功能。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::{manifest::ManifestItem, metadata::Metadata};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// 需要收集的Dublin Core标签
const DUBLIN_CORE_TAGS: [&str; 3] = ["title", "creator", "language"];

/// OPF文件解析结果
#[derive(Debug, Clone)]
pub struct Opf {
    /// EPUB版本
    pub version: String,
    /// 元数据
    pub metadata: Metadata,
    /// 清单项，保持文档顺序
    pub manifest: Vec<ManifestItem>,
    /// 脊柱的目录引用（spine@toc，指向NCX的清单ID）
    pub spine_toc: Option<String>,
}

impl Opf {
    /// 解析OPF文件内容
    ///
    /// # 参数
    /// * `xml_content` - OPF文件的XML内容
    ///
    /// # 返回值
    /// * `Result<Opf, EpubError>` - 解析后的OPF信息
    pub fn parse_xml(xml_content: &str) -> Result<Opf> {
        let mut reader = Reader::from_str(xml_content.trim_start_matches('\u{feff}'));
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut version = String::new();
        let mut metadata = Metadata::new();
        let mut manifest = Vec::new();
        let mut spine_toc = None;

        let mut buf = Vec::new();
        let mut current_section = String::new();
        let mut current_element: Option<String> = None;
        let mut text_content = String::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "package" => {
                            version = Self::attribute(e, b"version")?.unwrap_or_default();
                        }
                        "metadata" | "manifest" => {
                            current_section = local_name.to_string();
                        }
                        "spine" => {
                            current_section = "spine".to_string();
                            spine_toc = Self::attribute(e, b"toc")?;
                        }
                        "item" if current_section == "manifest" => {
                            if let Some(item) = Self::parse_manifest_item(e)? {
                                manifest.push(item);
                            }
                        }
                        tag if current_section == "metadata" && DUBLIN_CORE_TAGS.contains(&tag) => {
                            current_element = Some(tag.to_string());
                        }
                        _ => {}
                    }
                    text_content.clear();
                }
                Event::End(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "metadata" | "manifest" | "spine" => {
                            current_section.clear();
                        }
                        tag if current_element.as_deref() == Some(tag) => {
                            let content = text_content.trim();
                            if !content.is_empty() {
                                metadata.add_dublin_core(tag.to_string(), content.to_string());
                            }
                            current_element = None;
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    text_content.push_str(&e.unescape()?);
                }
                Event::CData(e) => {
                    text_content.push_str(&String::from_utf8_lossy(&e));
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if version.is_empty() && manifest.is_empty() {
            return Err(EpubError::OpfParseError(
                "缺少package元素或manifest为空".to_string(),
            ));
        }

        Ok(Opf {
            version,
            metadata,
            manifest,
            spine_toc,
        })
    }

    /// 读取单个属性值
    fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == name {
                return Ok(Some(attr.unescape_value()?.to_string()));
            }
        }
        Ok(None)
    }

    /// 解析清单项，缺少id/href/media-type的条目会被忽略
    fn parse_manifest_item(e: &BytesStart) -> Result<Option<ManifestItem>> {
        let mut item = ManifestItem::new(String::new(), String::new(), String::new());

        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| EpubError::XmlError(quick_xml::Error::InvalidAttr(e)))?;
            let value = attr.unescape_value()?.to_string();
            match attr.key.local_name().as_ref() {
                b"id" => item.id = value,
                b"href" => item.href = value,
                b"media-type" => item.media_type = value,
                b"properties" => item.properties = Some(value),
                _ => {}
            }
        }

        if item.id.is_empty() || item.href.is_empty() || item.media_type.is_empty() {
            return Ok(None);
        }
        Ok(Some(item))
    }

    /// 根据ID获取清单项
    pub fn get_manifest_item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    /// EPUB 3导航文档的路径（相对于OPF目录）
    pub fn get_nav_path(&self) -> Option<&str> {
        self.manifest
            .iter()
            .find(|item| item.is_nav())
            .map(|item| item.href.as_str())
    }

    /// NCX文件的路径（相对于OPF目录）
    ///
    /// 优先使用spine@toc引用的清单项，其次是第一个NCX媒体类型的清单项。
    pub fn get_ncx_path(&self) -> Option<&str> {
        self.spine_toc
            .as_deref()
            .and_then(|toc_id| self.get_manifest_item(toc_id))
            .or_else(|| self.manifest.iter().find(|item| item.is_ncx()))
            .map(|item| item.href.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPUB3_OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="3.0" xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId">
    <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
        <dc:title>Accessible EPUB 3</dc:title>
        <dc:creator id="author">Matt Garrish</dc:creator>
        <dc:language>en</dc:language>
        <meta property="dcterms:modified">2012-10-24T15:30:00Z</meta>
    </metadata>
    <manifest>
        <item id="htmltoc" href="bk01-toc.xhtml" media-type="application/xhtml+xml" properties="nav"/>
        <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
        <item id="ch1" href="ch01.xhtml" media-type="application/xhtml+xml"/>
        <item id="broken" href="" media-type="application/xhtml+xml"/>
    </manifest>
    <spine toc="ncx">
        <itemref idref="ch1"/>
    </spine>
</package>"#;

    #[test]
    fn test_parse_epub3_opf() {
        let opf = Opf::parse_xml(EPUB3_OPF).expect("解析OPF失败");

        assert_eq!(opf.version, "3.0");
        assert_eq!(opf.metadata.title(), Some("Accessible EPUB 3".to_string()));
        assert_eq!(opf.metadata.creators(), vec!["Matt Garrish".to_string()]);
        assert_eq!(opf.metadata.language(), Some("en".to_string()));
        assert_eq!(opf.manifest.len(), 3);
        assert_eq!(opf.spine_toc.as_deref(), Some("ncx"));
        assert_eq!(opf.get_nav_path(), Some("bk01-toc.xhtml"));
        assert_eq!(opf.get_ncx_path(), Some("toc.ncx"));
    }

    #[test]
    fn test_ncx_path_without_spine_toc() {
        let opf_xml = r#"<package version="2.0" xmlns="http://www.idpf.org/2007/opf">
<metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Old Book</dc:title></metadata>
<manifest>
<item id="c1" href="c1.html" media-type="application/xhtml+xml"/>
<item id="toc" href="nav/toc.ncx" media-type="application/x-dtbncx+xml"/>
</manifest>
<spine><itemref idref="c1"/></spine>
</package>"#;

        let opf = Opf::parse_xml(opf_xml).unwrap();
        assert_eq!(opf.get_nav_path(), None);
        assert_eq!(opf.get_ncx_path(), Some("nav/toc.ncx"));
    }

    #[test]
    fn test_title_with_entities() {
        let opf_xml = r#"<package version="3.0"><metadata>
<dc:title xmlns:dc="http://purl.org/dc/elements/1.1/">Pride &amp; Prejudice</dc:title>
</metadata><manifest/></package>"#;

        let opf = Opf::parse_xml(opf_xml).unwrap();
        assert_eq!(opf.metadata.title(), Some("Pride & Prejudice".to_string()));
    }

    #[test]
    fn test_not_an_opf() {
        let result = Opf::parse_xml("<html><body>hello</body></html>");
        assert!(matches!(result, Err(EpubError::OpfParseError(_))));
    }
}
