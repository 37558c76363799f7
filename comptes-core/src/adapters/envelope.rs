//! SOAP 1.1 envelope encoding and decoding
//!
//! Requests are written in the plain (non-.NET) SOAP 1.1 shape with typed,
//! unqualified arguments. Replies are read into a small element tree with
//! namespace prefixes dropped, then turned into [`SoapValue`]s.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_ENC_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

// =============================================================================
// Requests
// =============================================================================

/// Typed argument of a remote call
#[derive(Debug, Clone, PartialEq)]
pub enum SoapArg {
    Long(i64),
    Decimal(Decimal),
    Text(String),
}

impl SoapArg {
    fn xsd_type(&self) -> &'static str {
        match self {
            SoapArg::Long(_) => "d:long",
            SoapArg::Decimal(_) => "d:double",
            SoapArg::Text(_) => "d:string",
        }
    }

    fn lexical(&self) -> String {
        match self {
            SoapArg::Long(v) => v.to_string(),
            SoapArg::Decimal(v) => v.to_string(),
            SoapArg::Text(v) => v.clone(),
        }
    }
}

/// A named remote call with its named arguments, in order
#[derive(Debug, Clone)]
pub struct SoapCall {
    method: String,
    args: Vec<(String, SoapArg)>,
}

impl SoapCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: SoapArg) -> Self {
        self.args.push((name.into(), value));
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[(String, SoapArg)] {
        &self.args
    }

    /// Serialize the call into a request envelope for `namespace`
    pub fn to_envelope(&self, namespace: &str) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        let method_tag = format!("n0:{}", self.method);

        let events = [
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
            Event::Start(BytesStart::new("v:Envelope").with_attributes([
                ("xmlns:i", XSI_NS),
                ("xmlns:d", XSD_NS),
                ("xmlns:c", SOAP_ENC_NS),
                ("xmlns:v", SOAP_ENV_NS),
            ])),
            Event::Empty(BytesStart::new("v:Header")),
            Event::Start(BytesStart::new("v:Body")),
            Event::Start(
                BytesStart::new(method_tag.as_str()).with_attributes([("xmlns:n0", namespace)]),
            ),
        ];
        for event in events {
            writer.write_event(event).map_err(write_error)?;
        }

        for (name, value) in &self.args {
            let lexical = value.lexical();
            writer
                .write_event(Event::Start(
                    BytesStart::new(name.as_str()).with_attributes([("i:type", value.xsd_type())]),
                ))
                .map_err(write_error)?;
            writer
                .write_event(Event::Text(BytesText::new(&lexical)))
                .map_err(write_error)?;
            writer
                .write_event(Event::End(BytesEnd::new(name.as_str())))
                .map_err(write_error)?;
        }

        for tag in [method_tag.as_str(), "v:Body", "v:Envelope"] {
            writer
                .write_event(Event::End(BytesEnd::new(tag)))
                .map_err(write_error)?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::protocol("envelope", format!("request is not UTF-8: {}", e)))
    }
}

fn write_error(e: impl std::fmt::Display) -> Error {
    Error::protocol("envelope", format!("failed to write request: {}", e))
}

// =============================================================================
// Replies
// =============================================================================

/// One value carried by a reply
#[derive(Debug, Clone, PartialEq)]
pub enum SoapValue {
    /// Element marked `xsi:nil="true"`
    Nil,
    Text(String),
    /// Element with child elements, as (local name, value) pairs in document order
    Struct(Vec<(String, SoapValue)>),
}

impl SoapValue {
    /// First member named `name`, if this is a structure
    pub fn field(&self, name: &str) -> Option<&SoapValue> {
        match self {
            SoapValue::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SoapValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, SoapValue::Struct(_))
    }

    fn from_node(node: XmlNode) -> Self {
        if node.nil {
            SoapValue::Nil
        } else if node.children.is_empty() {
            SoapValue::Text(node.text)
        } else {
            SoapValue::Struct(
                node.children
                    .into_iter()
                    .map(|child| (child.name.clone(), SoapValue::from_node(child)))
                    .collect(),
            )
        }
    }
}

/// Decode a reply envelope
///
/// Returns the children of the response element. A `Fault` in the body is
/// turned into [`Error::Domain`].
pub fn parse_response(xml: &str) -> Result<Vec<SoapValue>> {
    let root = parse_tree(xml)?;
    if root.name != "Envelope" {
        return Err(Error::protocol(
            "Envelope",
            format!("root element is '{}', expected Envelope", root.name),
        ));
    }

    let mut body = root
        .into_child("Body")
        .ok_or_else(|| Error::protocol("Body", "reply has no SOAP Body"))?;
    if body.children.is_empty() {
        return Err(Error::protocol("Body", "SOAP Body is empty"));
    }
    let response = body.children.swap_remove(0);

    if response.name == "Fault" {
        return Err(fault_error(&response));
    }

    Ok(response.children.into_iter().map(SoapValue::from_node).collect())
}

fn fault_error(fault: &XmlNode) -> Error {
    let text_of = |name: &str| {
        fault
            .child(name)
            .map(|n| n.text.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let message = text_of("faultstring")
        .or_else(|| text_of("faultcode"))
        .unwrap_or_else(|| "unspecified SOAP fault".to_string());
    Error::domain(message)
}

#[derive(Debug, Default)]
struct XmlNode {
    name: String,
    nil: bool,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut nil = false;
        for attr in start.attributes() {
            let attr = attr
                .map_err(|e| Error::protocol(name.as_str(), format!("bad attribute: {}", e)))?;
            if attr.key.local_name().as_ref() == b"nil" {
                nil = matches!(attr.value.as_ref(), b"true" | b"1");
            }
        }
        Ok(Self {
            name,
            nil,
            ..Default::default()
        })
    }

    fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    fn into_child(self, name: &str) -> Option<XmlNode> {
        self.children.into_iter().find(|c| c.name == name)
    }
}

fn parse_tree(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::protocol(
                "envelope",
                format!("malformed XML near byte {}: {}", reader.buffer_position(), e),
            )
        })?;

        match event {
            Event::Start(start) => stack.push(XmlNode::open(&start)?),
            Event::Empty(start) => {
                let node = XmlNode::open(&start)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| Error::protocol("envelope", "unbalanced closing tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| Error::protocol("envelope", format!("bad text content: {}", e)))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::protocol(
            open.name.as_str(),
            "reply ended before the element was closed",
        ));
    }
    root.ok_or_else(|| Error::protocol("envelope", "reply is empty"))
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_none() {
        *root = Some(node);
        Ok(())
    } else {
        Err(Error::protocol("envelope", "reply has more than one root element"))
    }
}
