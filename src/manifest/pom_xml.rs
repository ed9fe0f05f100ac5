//! Minimal XML tree for pom.xml files that remembers byte offsets
//!
//! Each element keeps the span of its inner content so updates can replace
//! exactly the text between `<version>` and `</version>` and leave the rest
//! of the document untouched.

use crate::error::EngineError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::ops::Range;

/// An element with its children and direct text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    children: Vec<XmlElement>,
    text: String,
    inner: Range<usize>,
    /// Byte ranges of the non-blank text and CDATA nodes
    text_nodes: Vec<Range<usize>>,
}

impl XmlElement {
    fn new(name: String, inner_start: usize) -> Self {
        Self {
            name,
            children: Vec::new(),
            text: String::new(),
            inner: inner_start..inner_start,
            text_nodes: Vec::new(),
        }
    }

    /// Local name (namespace prefix removed)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed, unescaped direct text content
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child with the given name, if non-empty
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text()).filter(|t| !t.is_empty())
    }

    /// Descends through `path`, taking the first match at each level
    pub fn descend(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |node, segment| node.child(segment))
    }

    /// Every element reached by following `path`, fanning out at each level
    pub fn select(&self, path: &[&str]) -> Vec<&XmlElement> {
        let mut current = vec![self];
        for segment in path {
            current = current
                .into_iter()
                .flat_map(|node| node.children.iter().filter(|c| c.name == *segment))
                .collect();
        }
        current
    }

    /// Byte span of the trimmed text inside this element in `content`
    ///
    /// Comments before or after the text are outside the span.
    pub fn text_span(&self, content: &str) -> Range<usize> {
        let outer = match (self.text_nodes.first(), self.text_nodes.last()) {
            (Some(first), Some(last)) => first.start..last.end,
            _ => self.inner.clone(),
        };
        let raw = &content[outer.clone()];
        let leading = raw.len() - raw.trim_start().len();
        let trailing = raw.len() - raw.trim_end().len();
        (outer.start + leading)..(outer.end - trailing)
    }
}

/// Parses `content` into an element tree
///
/// `path` is only used for error messages.
pub fn parse_document(path: &str, content: &str) -> Result<XmlElement, EngineError> {
    let mut reader = Reader::from_str(content);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| {
            EngineError::not_parseable(
                path,
                format!("XML error at byte {}: {}", reader.error_position(), e),
            )
        })?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                stack.push(XmlElement::new(name, after));
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                let element = XmlElement::new(name, after);
                attach(&mut stack, &mut root, element, path)?;
            }
            Event::End(_) => {
                let mut element = stack.pop().ok_or_else(|| {
                    EngineError::not_parseable(path, format!("unexpected end tag at byte {}", before))
                })?;
                element.inner.end = before;
                element.text = unescape_text(&element.text, path)?;
                attach(&mut stack, &mut root, element, path)?;
            }
            Event::CData(_) => {
                let raw = &content[before..after];
                let inner = raw
                    .strip_prefix("<![CDATA[")
                    .and_then(|r| r.strip_suffix("]]>"))
                    .unwrap_or(raw);
                // CDATA is literal, escape it so the final unescape is a no-op
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&quick_xml::escape::escape(inner));
                    current.text_nodes.push(before..after);
                }
            }
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
            _ => {
                // Text and entity references; raw slice, unescaped on close
                if let Some(current) = stack.last_mut() {
                    let raw = &content[before..after];
                    current.text.push_str(raw);
                    if !raw.trim().is_empty() {
                        current.text_nodes.push(before..after);
                    }
                } else if !content[before..after].trim().is_empty() {
                    return Err(EngineError::not_parseable(
                        path,
                        format!("text outside the root element at byte {}", before),
                    ));
                }
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(EngineError::not_parseable(
            path,
            format!("element <{}> is never closed", open.name),
        ));
    }

    root.ok_or_else(|| EngineError::not_parseable(path, "document has no root element"))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    path: &str,
) -> Result<(), EngineError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(EngineError::not_parseable(
                path,
                "document has more than one root element",
            ))
        }
    }
    Ok(())
}

fn unescape_text(raw: &str, path: &str) -> Result<String, EngineError> {
    quick_xml::escape::unescape(raw)
        .map(|text| text.into_owned())
        .map_err(|e| EngineError::not_parseable(path, format!("invalid character reference: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <!-- comment -->
  <properties>
    <spring.version> 4.3.12.RELEASE </spring.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>org.springframework</groupId>
      <artifactId>spring-core</artifactId>
      <version>${spring.version}</version>
    </dependency>
    <dependency>
      <groupId>a&amp;b</groupId>
      <artifactId>c</artifactId>
      <optional/>
    </dependency>
  </dependencies>
</project>
"#;

    #[test]
    fn test_parse_tree() {
        let root = parse_document("pom.xml", POM).unwrap();
        assert_eq!(root.name(), "project");
        let deps = root.select(&["dependencies", "dependency"]);
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].child_text("artifactId"), Some("spring-core"));
        assert_eq!(deps[1].child_text("groupId"), Some("a&b"));
        assert!(deps[1].child("optional").is_some());
        assert_eq!(deps[1].child_text("optional"), None);
    }

    #[test]
    fn test_text_span_excludes_whitespace() {
        let root = parse_document("pom.xml", POM).unwrap();
        let property = root.descend(&["properties", "spring.version"]).unwrap();
        assert_eq!(property.text(), "4.3.12.RELEASE");
        let span = property.text_span(POM);
        assert_eq!(&POM[span], "4.3.12.RELEASE");
    }

    #[test]
    fn test_text_span_leaves_comments() {
        let content = "<project><version>1.0<!-- pinned --></version><name><!-- a --> x </name></project>";
        let root = parse_document("pom.xml", content).unwrap();

        let version = root.child("version").unwrap();
        assert_eq!(version.text(), "1.0");
        let span = version.text_span(content);
        assert_eq!(&content[span.clone()], "1.0");
        let updated = format!("{}2.0{}", &content[..span.start], &content[span.end..]);
        assert!(updated.contains("<version>2.0<!-- pinned --></version>"));

        let name = root.child("name").unwrap();
        assert_eq!(&content[name.text_span(content)], "x");
    }

    #[test]
    fn test_descend_missing() {
        let root = parse_document("pom.xml", POM).unwrap();
        assert!(root.descend(&["build", "plugins"]).is_none());
        assert!(root.select(&["build", "plugins", "plugin"]).is_empty());
    }

    #[test]
    fn test_garbage_is_not_parseable() {
        let err = parse_document("app/pom.xml", "this is not xml at all").unwrap_err();
        assert!(matches!(err, EngineError::DependencyFileNotParseable { ref path, .. } if path == "app/pom.xml"));
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse_document("pom.xml", "<project><dependencies></project>").unwrap_err();
        assert!(matches!(err, EngineError::DependencyFileNotParseable { .. }));

        let err = parse_document("pom.xml", "<project><dependencies>").unwrap_err();
        assert!(matches!(err, EngineError::DependencyFileNotParseable { .. }));
    }

    #[test]
    fn test_cdata_text() {
        let root = parse_document("pom.xml", "<project><name><![CDATA[a<b]]></name></project>").unwrap();
        assert_eq!(root.child_text("name"), Some("a<b"));
    }
}
