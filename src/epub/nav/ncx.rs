//! NCX解析器模块
//!
//! 解析EPUB 2的NCX（Navigation Control file for XML）文件，
//! 只读取docTitle与navMap，navPoint按文档顺序保存，不按playOrder重排。

use crate::epub::error::{EpubError, Result};
use crate::epub::nav::{self, MAX_NAV_DEPTH, NavNode};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// NCX文件解析结果
#[derive(Debug, Clone)]
pub struct Ncx {
    /// 文档标题（docTitle/text）
    pub doc_title: Option<String>,
    /// navMap下的顶层导航点
    pub nav_points: Vec<NavNode>,
}

impl Ncx {
    /// 解析NCX文件内容
    ///
    /// # 参数
    /// * `xml_content` - NCX文件的XML内容
    ///
    /// # 返回值
    /// * `Result<Ncx, EpubError>` - 解析后的NCX信息；缺少navMap时返回`NcxParseError`
    pub fn parse_xml(xml_content: &str) -> Result<Ncx> {
        let mut reader = Reader::from_str(xml_content.trim_start_matches('\u{feff}'));
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut doc_title = None;
        let mut nav_points = Vec::new();
        let mut has_nav_map = false;

        let mut buf = Vec::new();
        let mut current_section = String::new();
        let mut text_content = String::new();
        let mut in_nav_label = false;

        // 尚未闭合的navPoint，栈顶是当前节点
        let mut nav_point_stack: Vec<NavNode> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "docTitle" => {
                            current_section = "docTitle".to_string();
                        }
                        "navMap" => {
                            current_section = "navMap".to_string();
                            has_nav_map = true;
                        }
                        "pageList" | "navList" => {
                            current_section = local_name.to_string();
                        }
                        "navPoint" if current_section == "navMap" => {
                            if nav_point_stack.len() >= MAX_NAV_DEPTH as usize {
                                return Err(nav::too_deep());
                            }
                            nav_point_stack.push(NavNode::default());
                        }
                        "navLabel" if current_section == "navMap" => {
                            in_nav_label = true;
                        }
                        "content" if current_section == "navMap" => {
                            if let Some(nav_point) = nav_point_stack.last_mut() {
                                nav_point.href = Self::parse_content_src(e)?;
                            }
                        }
                        _ => {}
                    }
                    text_content.clear();
                }
                Event::End(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "navMap" | "pageList" | "navList" => {
                            current_section.clear();
                        }
                        "docTitle" => {
                            let title = text_content.trim();
                            if !title.is_empty() {
                                doc_title = Some(title.to_string());
                            }
                            current_section.clear();
                        }
                        "navLabel" if current_section == "navMap" => {
                            in_nav_label = false;
                        }
                        "text" if current_section == "navMap" && in_nav_label => {
                            // 只取第一个navLabel的文本，多语言标签时忽略后续的
                            if let Some(nav_point) = nav_point_stack.last_mut() {
                                if nav_point.title.is_empty() {
                                    nav_point.title = text_content.trim().to_string();
                                }
                            }
                        }
                        "navPoint" if current_section == "navMap" => {
                            let nav_point = nav_point_stack.pop().ok_or_else(|| {
                                EpubError::NcxParseError("navPoint结束标签没有对应的开始标签".to_string())
                            })?;
                            match nav_point_stack.last_mut() {
                                Some(parent) => parent.add_child(nav_point),
                                None => nav_points.push(nav_point),
                            }
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

        if !nav_point_stack.is_empty() {
            return Err(EpubError::NcxParseError(format!(
                "有 {} 个navPoint没有闭合",
                nav_point_stack.len()
            )));
        }

        if !has_nav_map {
            return Err(EpubError::NcxParseError("缺少navMap元素".to_string()));
        }

        Ok(Ncx {
            doc_title,
            nav_points,
        })
    }

    /// 解析content元素的src属性
    fn parse_content_src(e: &BytesStart) -> Result<Option<String>> {
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
            if attr.key.local_name().as_ref() == b"src" {
                let src = attr.unescape_value()?.trim().to_string();
                return Ok((!src.is_empty()).then_some(src));
            }
        }
        Ok(None)
    }

    /// 转换为以合成根节点表示的导航树
    pub fn into_root(self) -> NavNode {
        NavNode::root(self.nav_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ncx_flat() {
        let ncx_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
    <head><meta name="dtb:uid" content="urn:uuid:1234"/></head>
    <docTitle><text>测试书籍</text></docTitle>
    <navMap>
        <navPoint id="p1" playOrder="1">
            <navLabel><text>第一章</text></navLabel>
            <content src="text/chapter1.xhtml"/>
        </navPoint>
        <navPoint id="p2" playOrder="2">
            <navLabel><text>第二章</text></navLabel>
            <content src="text/chapter2.xhtml"/>
        </navPoint>
    </navMap>
</ncx>"#;

        let ncx = Ncx::parse_xml(ncx_xml).unwrap();
        assert_eq!(ncx.doc_title.as_deref(), Some("测试书籍"));
        assert_eq!(ncx.nav_points.len(), 2);
        assert_eq!(ncx.nav_points[0].title, "第一章");
        assert_eq!(ncx.nav_points[0].href.as_deref(), Some("text/chapter1.xhtml"));
        assert_eq!(ncx.nav_points[1].title, "第二章");
    }

    #[test]
    fn test_parse_ncx_nested_keeps_document_order() {
        // playOrder与文档顺序不一致时仍按文档顺序输出
        let ncx_xml = r#"<ncx><navMap>
<navPoint id="a" playOrder="3"><navLabel><text>Part One</text></navLabel><content src="p1.xhtml"/>
  <navPoint id="a1" playOrder="5"><navLabel><text>Chapter 1</text></navLabel><content src="c1.xhtml"/>
    <navPoint id="a1x" playOrder="6"><navLabel><text>Section 1.1</text></navLabel><content src="c1.xhtml#s1"/></navPoint>
  </navPoint>
  <navPoint id="a2" playOrder="4"><navLabel><text>Chapter 2</text></navLabel><content src="c2.xhtml"/></navPoint>
</navPoint>
<navPoint id="b" playOrder="1"><navLabel><text>Appendix</text></navLabel><content src="app.xhtml"/></navPoint>
</navMap></ncx>"#;

        let ncx = Ncx::parse_xml(ncx_xml).unwrap();
        assert_eq!(ncx.doc_title, None);

        let root = ncx.into_root();
        let titles: Vec<&str> = root.children.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Part One", "Appendix"]);

        let part = &root.children[0];
        assert_eq!(part.children.len(), 2);
        assert_eq!(part.children[0].title, "Chapter 1");
        assert_eq!(part.children[1].title, "Chapter 2");
        assert_eq!(part.children[0].children[0].title, "Section 1.1");
        assert_eq!(part.children[0].children[0].href.as_deref(), Some("c1.xhtml#s1"));
        assert_eq!(root.descendant_count(), 5);
    }

    #[test]
    fn test_parse_ncx_missing_label_and_entities() {
        let ncx_xml = r#"<ncx><navMap>
<navPoint id="x"><content src="cover.xhtml"/></navPoint>
<navPoint id="y"><navLabel><text>  Q &amp; A  </text></navLabel><content src="qa.xhtml"/></navPoint>
</navMap></ncx>"#;

        let ncx = Ncx::parse_xml(ncx_xml).unwrap();
        assert_eq!(ncx.nav_points[0].title, "");
        assert_eq!(ncx.nav_points[1].title, "Q & A");
    }

    #[test]
    fn test_page_list_is_ignored() {
        let ncx_xml = r#"<ncx><navMap>
<navPoint id="x"><navLabel><text>Only</text></navLabel><content src="a.xhtml"/></navPoint>
</navMap>
<pageList><pageTarget id="p1" type="normal" value="1"><navLabel><text>1</text></navLabel><content src="a.xhtml#p1"/></pageTarget></pageList>
</ncx>"#;

        let ncx = Ncx::parse_xml(ncx_xml).unwrap();
        assert_eq!(ncx.nav_points.len(), 1);
    }

    #[test]
    fn test_empty_nav_map() {
        let ncx = Ncx::parse_xml("<ncx><navMap></navMap></ncx>").unwrap();
        assert!(ncx.nav_points.is_empty());
    }

    #[test]
    fn test_missing_nav_map() {
        let result = Ncx::parse_xml("<ncx><head/></ncx>");
        assert!(matches!(result, Err(EpubError::NcxParseError(_))));
    }

    #[test]
    fn test_too_deep_nav_points() {
        let depth = MAX_NAV_DEPTH as usize + 1;
        let ncx_xml = format!(
            "<ncx><navMap>{}{}</navMap></ncx>",
            "<navPoint><navLabel><text>x</text></navLabel>".repeat(depth),
            "</navPoint>".repeat(depth)
        );

        let result = Ncx::parse_xml(&ncx_xml);
        assert!(matches!(result, Err(EpubError::MalformedInput(_))));
    }

    #[test]
    fn test_max_depth_nav_points() {
        let depth = MAX_NAV_DEPTH as usize;
        let ncx_xml = format!(
            "<ncx><navMap>{}{}</navMap></ncx>",
            "<navPoint><navLabel><text>x</text></navLabel>".repeat(depth),
            "</navPoint>".repeat(depth)
        );

        let root = Ncx::parse_xml(&ncx_xml).unwrap().into_root();
        assert_eq!(root.descendant_count(), depth);
    }
}
