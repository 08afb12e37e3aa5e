//! Vector map access.
//!
//! The renderer only needs to find a country's region by id and swap one color token in
//! its `style` attribute; [`MapDocument`] is that capability. [`SvgDocument`] provides it
//! for an SVG file while leaving every byte it doesn't touch as it was.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use std::io::Write;
use std::path::Path;

use crate::error::RenderFault;

pub trait MapDocument {
    type Element: Copy;

    /// The single element whose `id` attribute equals `id`.
    fn locate_by_id(&self, id: &str) -> Result<Self::Element, RenderFault>;

    /// Replaces `old` with `new` in the element's style. Returns whether `old` was present.
    fn set_style_token(
        &mut self,
        element: Self::Element,
        old: &str,
        new: &str,
    ) -> Result<bool, RenderFault>;
}

/// Position of an element's start tag in the document's event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgElement(usize);

pub struct SvgDocument {
    events: Vec<Event<'static>>,
}

fn attribute(start: &BytesStart, name: &[u8]) -> Option<Vec<u8>> {
    start
        .attributes()
        .with_checks(false)
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| a.value.into_owned())
}

impl SvgDocument {
    pub fn parse(text: &str) -> Result<SvgDocument> {
        let mut reader = Reader::from_str(text);
        let mut events = Vec::new();
        loop {
            match reader
                .read_event()
                .with_context(|| format!("parsing map at byte {}", reader.buffer_position()))?
            {
                Event::Eof => break,
                ev => events.push(ev.into_owned()),
            }
        }
        Ok(SvgDocument { events })
    }

    pub fn load(path: &Path) -> Result<SvgDocument> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading map {}", path.display()))?;
        SvgDocument::parse(&text)
    }

    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = Writer::new(out);
        for ev in &self.events {
            writer.write_event(ev.borrow())?;
        }
        Ok(())
    }

    pub fn to_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    fn start(&self, element: SvgElement) -> Option<&BytesStart<'static>> {
        match self.events.get(element.0) {
            Some(Event::Start(s)) | Some(Event::Empty(s)) => Some(s),
            _ => None,
        }
    }

    /// Style attribute of an element, if it has one.
    pub fn style(&self, element: SvgElement) -> Option<String> {
        self.start(element)
            .and_then(|s| attribute(s, b"style"))
            .map(|v| String::from_utf8_lossy(&v).into_owned())
    }
}

impl MapDocument for SvgDocument {
    type Element = SvgElement;

    fn locate_by_id(&self, id: &str) -> Result<SvgElement, RenderFault> {
        let matches: Vec<usize> = self
            .events
            .iter()
            .enumerate()
            .filter_map(|(i, ev)| match ev {
                Event::Start(s) | Event::Empty(s) => {
                    attribute(s, b"id").filter(|v| v == id.as_bytes()).map(|_| i)
                }
                _ => None,
            })
            .collect();
        match matches.as_slice() {
            [i] => Ok(SvgElement(*i)),
            [] => Err(RenderFault::ElementNotFound { id: id.to_string() }),
            _ => Err(RenderFault::AmbiguousElement {
                id: id.to_string(),
                count: matches.len(),
            }),
        }
    }

    fn set_style_token(
        &mut self,
        element: SvgElement,
        old: &str,
        new: &str,
    ) -> Result<bool, RenderFault> {
        let (start, is_empty) = match self.events.get(element.0) {
            Some(Event::Start(s)) => (s, false),
            Some(Event::Empty(s)) => (s, true),
            _ => return Err(RenderFault::ElementNotFound { id: format!("#{}", element.0) }),
        };
        let id = attribute(start, b"id")
            .map(|v| String::from_utf8_lossy(&v).into_owned())
            .unwrap_or_default();
        let style = match attribute(start, b"style") {
            Some(v) => String::from_utf8_lossy(&v).into_owned(),
            None => return Err(RenderFault::MissingStyle { id }),
        };
        if !style.contains(old) {
            return Ok(false);
        }
        let restyled = style.replace(old, new);

        let attrs: Vec<(Vec<u8>, Vec<u8>)> = start
            .attributes()
            .with_checks(false)
            .flatten()
            .map(|a| {
                let value = if a.key.as_ref() == b"style" {
                    restyled.as_bytes().to_vec()
                } else {
                    a.value.into_owned()
                };
                (a.key.as_ref().to_vec(), value)
            })
            .collect();
        let mut updated = start.clone();
        updated.clear_attributes();
        for (key, value) in &attrs {
            updated.push_attribute((key.as_slice(), value.as_slice()));
        }
        let updated = updated.into_owned();
        self.events[element.0] = if is_empty {
            Event::Empty(updated)
        } else {
            Event::Start(updated)
        };
        Ok(true)
    }
}
