//! Parsing of generated package documents (container.xml, OPF, markup checks).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// Manifest entry as read back from a package document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
}

/// Parsed OPF package data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDocument {
    /// `package@unique-identifier`.
    pub unique_identifier: String,
    /// `dc:identifier@id` and its text, in document order.
    pub identifiers: Vec<(Option<String>, String)>,
    pub manifest: Vec<ParsedItem>,
    /// Spine idrefs in reading order.
    pub spine: Vec<String>,
    /// `spine@page-progression-direction`.
    pub direction: Option<String>,
    /// `spine@toc`.
    pub toc: Option<String>,
}

impl PackageDocument {
    pub fn item(&self, id: &str) -> Option<&ParsedItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    /// The item carrying the `nav` property.
    pub fn nav_item(&self) -> Option<&ParsedItem> {
        self.manifest.iter().find(|item| {
            item.properties
                .as_deref()
                .is_some_and(|p| p.split_whitespace().any(|p| p == "nav"))
        })
    }
}

/// Check that `doc` is a single well-formed XML element tree.
///
/// Mismatched end tags, stray end tags, unclosed elements, malformed
/// attributes, unescaped `&` in attribute values, and text or
/// elements after the root all fail with [`Error::InvalidMarkup`].
pub fn check_well_formed(doc: &str) -> Result<()> {
    let mut reader = Reader::from_str(doc);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::InvalidMarkup(format!("{e} at byte {}", reader.error_position()))
        })?;
        match event {
            Event::Start(e) => {
                check_attributes(&e, &reader)?;
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                check_attributes(&e, &reader)?;
                if depth == 0 {
                    roots += 1;
                }
            }
            Event::End(e) => {
                if depth == 0 {
                    return Err(Error::InvalidMarkup(format!(
                        "unexpected </{}> at byte {}",
                        String::from_utf8_lossy(e.name().as_ref()),
                        reader.buffer_position()
                    )));
                }
                depth -= 1;
            }
            Event::Text(t) if depth == 0 && !t.iter().all(u8::is_ascii_whitespace) => {
                return Err(Error::InvalidMarkup(format!(
                    "text outside the root element at byte {}",
                    reader.buffer_position()
                )));
            }
            Event::Eof => break,
            _ => {}
        }
        if roots > 1 {
            return Err(Error::InvalidMarkup("more than one root element".to_string()));
        }
    }

    if depth != 0 {
        return Err(Error::InvalidMarkup(format!(
            "{depth} element(s) left unclosed"
        )));
    }
    if roots == 0 {
        return Err(Error::InvalidMarkup("no root element".to_string()));
    }
    Ok(())
}

fn check_attributes(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<()> {
    let element = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| {
            Error::InvalidMarkup(format!(
                "<{element}>: {err} near byte {}",
                reader.buffer_position()
            ))
        })?;
        attr.unescape_value().map_err(|err| {
            Error::InvalidMarkup(format!(
                "<{element}> attribute {}: {err} near byte {}",
                String::from_utf8_lossy(attr.key.as_ref()),
                reader.buffer_position()
            ))
        })?;
    }
    Ok(())
}

/// Whether a well-formed document contains an element with the given local name.
pub fn has_element(doc: &str, local: &[u8]) -> Result<bool> {
    let mut reader = Reader::from_str(doc);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if local_name(e.name().as_ref()) == local => {
                return Ok(true);
            }
            Event::Eof => return Ok(false),
            _ => {}
        }
    }
}

/// Parse META-INF/container.xml to find the OPF path.
pub fn parse_container_xml(content: &str) -> Result<String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if local_name(e.name().as_ref()) == b"rootfile" => {
                if let Some(path) = attribute(&e, b"full-path")? {
                    return Ok(path);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Err(Error::InvalidEpub(
        "No rootfile found in container.xml".to_string(),
    ))
}

/// Parse an OPF package document.
pub fn parse_package_document(content: &str) -> Result<PackageDocument> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut doc = PackageDocument::default();
    let mut identifier: Option<(Option<String>, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match local_name(e.name().as_ref()) {
                b"package" => {
                    doc.unique_identifier =
                        attribute(&e, b"unique-identifier")?.unwrap_or_default();
                }
                b"identifier" => identifier = Some((attribute(&e, b"id")?, String::new())),
                b"spine" => read_spine_attributes(&e, &mut doc)?,
                b"item" => doc.manifest.push(read_item(&e)?),
                b"itemref" => doc.spine.extend(attribute(&e, b"idref")?),
                _ => {}
            },
            Event::Empty(e) => match local_name(e.name().as_ref()) {
                b"spine" => read_spine_attributes(&e, &mut doc)?,
                b"item" => doc.manifest.push(read_item(&e)?),
                b"itemref" => doc.spine.extend(attribute(&e, b"idref")?),
                _ => {}
            },
            Event::Text(t) => {
                if let Some((_, text)) = identifier.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::GeneralRef(r) => {
                // Keep references in their escaped form
                if let Some((_, text)) = identifier.as_mut() {
                    text.push('&');
                    text.push_str(&String::from_utf8_lossy(&r));
                    text.push(';');
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == b"identifier" => {
                doc.identifiers.extend(identifier.take());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(doc)
}

fn read_spine_attributes(e: &BytesStart<'_>, doc: &mut PackageDocument) -> Result<()> {
    doc.direction = attribute(e, b"page-progression-direction")?;
    doc.toc = attribute(e, b"toc")?;
    Ok(())
}

fn read_item(e: &BytesStart<'_>) -> Result<ParsedItem> {
    Ok(ParsedItem {
        id: attribute(e, b"id")?.unwrap_or_default(),
        href: attribute(e, b"href")?.unwrap_or_default(),
        media_type: attribute(e, b"media-type")?.unwrap_or_default(),
        properties: attribute(e, b"properties")?,
    })
}

/// Unescaped value of an attribute.
fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Strip a namespace prefix (`dc:identifier` -> `identifier`).
fn local_name(name: &[u8]) -> &[u8] {
    match memchr::memrchr(b':', name) {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}
