//! Minimal element tree used for every document exchanged with the gateway.
//!
//! Parsing strips namespace prefixes from element and attribute names
//! (`soap:Envelope` becomes `Envelope`), so callers navigate responses by local
//! names only. Rendering writes an XML declaration, two-space indentation, and
//! wraps text containing `&`, `<` or `>` in CDATA sections.

use quick_xml::{
    Reader, Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::errors::{Error, Result};

/// An XML element with its attributes, child elements and text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: Option<String>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Element with text content only.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        XmlElement::new(name).with_text(text)
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a leaf child only when `text` is present.
    pub fn with_optional_leaf(self, name: &str, text: Option<impl Into<String>>) -> Self {
        match text {
            Some(text) => self.with_child(XmlElement::leaf(name, text)),
            None => self,
        }
    }

    /// First child named `name`.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All children named `name`, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Follow a path of child names from this element.
    pub fn path(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |element, name| element.find(name))
    }

    /// Like [`XmlElement::path`], failing with [`Error::UnexpectedXml`] naming the path.
    pub fn require(&self, path: &[&str]) -> Result<&XmlElement> {
        self.path(path)
            .ok_or_else(|| Error::UnexpectedXml(format!("{}/{}", self.name, path.join("/"))))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content, empty when the element has none.
    pub fn text_content(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Text content of the first child named `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.find(name).map(XmlElement::text_content)
    }

    /// Render as a standalone document with an XML declaration.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(|e| Error::XmlWrite(e.to_string()))?;
        self.write(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        let text = self.text.as_deref().filter(|text| !text.is_empty());
        if self.children.is_empty() && text.is_none() {
            return write_event(writer, Event::Empty(start));
        }

        write_event(writer, Event::Start(start))?;
        if let Some(text) = text {
            write_text(writer, text)?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlWrite(e.to_string()))
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<()> {
    if !text.contains(['&', '<', '>']) {
        return write_event(writer, Event::Text(BytesText::new(text)));
    }

    // A CDATA section cannot contain `]]>`, so split it across sections.
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        write_event(writer, Event::CData(BytesCData::new(&rest[..pos + 2])))?;
        rest = &rest[pos + 2..];
    }
    write_event(writer, Event::CData(BytesCData::new(rest)))
}

/// Parse a document into its root element, stripping namespace prefixes.
pub fn parse(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::XmlParse("unbalanced end tag".to_owned()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    push_text(current, &text.unescape()?);
                }
            }
            Event::CData(cdata) => {
                if let Some(current) = stack.last_mut() {
                    push_text(current, &String::from_utf8(cdata.into_inner().into_owned())?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::XmlParse("unexpected end of document".to_owned()));
    }
    root.ok_or_else(|| Error::XmlParse("document has no root element".to_owned()))
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8(start.local_name().as_ref().to_vec())?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| Error::XmlParse(e.to_string()))?;
        let key = String::from_utf8(attribute.key.local_name().as_ref().to_vec())?;
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::XmlParse("multiple root elements".to_owned())),
    }
    Ok(())
}

fn push_text(element: &mut XmlElement, text: &str) {
    if text.is_empty() {
        return;
    }
    match element.text.as_mut() {
        Some(existing) => existing.push_str(text),
        None => element.text = Some(text.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_prefixes() {
        let document = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns1="urn:test">
  <SOAP-ENV:Body>
    <ns1:logInResponse>
      <logInResult><id>abc123</id></logInResult>
    </ns1:logInResponse>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
        )
        .unwrap();

        assert_eq!(document.name, "Envelope");
        assert_eq!(
            document.attribute("SOAP-ENV"),
            Some("http://schemas.xmlsoap.org/soap/envelope/")
        );
        assert_eq!(
            document
                .path(&["Body", "logInResponse", "logInResult", "id"])
                .map(XmlElement::text_content),
            Some("abc123")
        );
    }

    #[test]
    fn test_parse_text_entities_and_cdata() {
        let document =
            parse(r#"<order><a>Tom &amp; Jerry</a><b><![CDATA[<b>bold</b>]]></b><c/></order>"#)
                .unwrap();

        assert_eq!(document.child_text("a"), Some("Tom & Jerry"));
        assert_eq!(document.child_text("b"), Some("<b>bold</b>"));
        assert_eq!(document.child_text("c"), Some(""));
        assert!(document.child_text("d").is_none());
    }

    #[test]
    fn test_parse_repeated_children() {
        let document = parse(
            "<params><param><name>a</name></param><param><name>b</name></param></params>",
        )
        .unwrap();

        let names: Vec<_> = document
            .find_all("param")
            .filter_map(|param| param.child_text("name"))
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse("<a><b></a>"), Err(Error::XmlParse(_))));
        assert!(matches!(parse("<a>"), Err(Error::XmlParse(_))));
        assert!(matches!(parse(""), Err(Error::XmlParse(_))));
        assert!(matches!(parse("<a/><b/>"), Err(Error::XmlParse(_))));
    }

    #[test]
    fn test_require_reports_path() {
        let document = parse("<Envelope><Body/></Envelope>").unwrap();

        match document.require(&["Body", "Fault"]) {
            Err(Error::UnexpectedXml(path)) => assert_eq!(path, "Envelope/Body/Fault"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_render_document() {
        let document = XmlElement::new("order")
            .with_attr("id", "abc")
            .with_child(XmlElement::leaf("signature", "SAC001"))
            .with_child(XmlElement::new("empty"))
            .with_optional_leaf("missing", None::<String>);

        let xml = document.to_xml().unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
        assert!(xml.contains(r#"<order id="abc">"#));
        assert!(xml.contains("<signature>SAC001</signature>"));
        assert!(xml.contains("<empty/>"));
        assert!(!xml.contains("missing"));
    }

    #[test]
    fn test_render_cdata_when_needed() {
        let xml = XmlElement::new("params")
            .with_child(XmlElement::leaf("plain", "a b"))
            .with_child(XmlElement::leaf("special", "a & <b>"))
            .with_child(XmlElement::leaf("tricky", "x]]>y"))
            .to_xml()
            .unwrap();

        assert!(xml.contains("<plain>a b</plain>"));
        assert!(xml.contains("<![CDATA[a & <b>]]>"));
        assert!(xml.contains("<![CDATA[x]]]]><![CDATA[>y]]>"));

        let parsed = parse(&xml).unwrap();
        assert_eq!(parsed.child_text("special"), Some("a & <b>"));
        assert_eq!(parsed.child_text("tricky"), Some("x]]>y"));
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let xml = XmlElement::new("a")
            .with_attr("q", "\"quoted\" & <more>")
            .to_xml()
            .unwrap();

        let parsed = parse(&xml).unwrap();
        assert_eq!(parsed.attribute("q"), Some("\"quoted\" & <more>"));
    }
}
