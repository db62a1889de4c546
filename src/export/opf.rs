//! Package description document (`content.opf`) rendering.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::model::{GuideReference, ManifestItem, PackageMetadata, SpineEntry};

use crate::util::sanitize_path;

use super::template::{PackageTemplates, fill, fill_into};

/// Characters that cannot appear raw in a manifest href, either as URL
/// syntax or as XML attribute content.
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'?')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Id of the always-present navigation document item.
pub const NAV_ID: &str = "nav";

/// Id of the always-present legacy table of contents item.
pub const NCX_ID: &str = "ncx";

/// Render `content.opf`.
///
/// The template declares the `nav` and `ncx` items itself; `manifest` holds
/// only the caller's files. Their hrefs are written in the same sanitized
/// form the assembler uses for archive entry names, then percent-encoded. When `nav_in_spine` is set the nav document is
/// the first itemref.
pub fn render_package_document(
    metadata: &PackageMetadata,
    manifest: &[ManifestItem],
    spine: &[SpineEntry],
    guide: &[GuideReference],
    nav_in_spine: bool,
    templates: &PackageTemplates,
) -> String {
    let mut files = String::new();
    for item in manifest {
        let href = utf8_percent_encode(&sanitize_path(&item.href), HREF).to_string();
        let properties = item
            .properties
            .as_deref()
            .map(|p| format!(" properties=\"{p}\""))
            .unwrap_or_default();
        fill_into(
            &mut files,
            &templates.item,
            &[
                ("id", item.id.as_str()),
                ("href", href.as_str()),
                ("media_type", item.media_type.as_str()),
                ("properties", properties.as_str()),
            ],
        );
    }

    let mut itemrefs = String::new();
    if nav_in_spine {
        fill_into(
            &mut itemrefs,
            &templates.itemref,
            &[("idref", NAV_ID), ("linear", "")],
        );
    }
    for entry in spine {
        let linear = if entry.linear { "" } else { " linear=\"no\"" };
        fill_into(
            &mut itemrefs,
            &templates.itemref,
            &[("idref", entry.idref.as_str()), ("linear", linear)],
        );
    }

    let mut references = String::new();
    for reference in guide {
        fill_into(
            &mut references,
            &templates.reference,
            &[
                ("type", reference.kind.as_str()),
                ("title", reference.title.as_str()),
                ("href", reference.href.as_str()),
            ],
        );
    }

    fill(
        &templates.document,
        &[
            ("lang", metadata.language.as_str()),
            ("uid", metadata.identifier_id.as_str()),
            ("title", metadata.title.as_str()),
            ("creator", metadata.creator.as_str()),
            ("publisher", metadata.publisher.as_str()),
            ("rights", metadata.rights.as_str()),
            ("identifier", metadata.identifier.as_str()),
            ("date", metadata.date.as_str()),
            ("modified", metadata.modified.as_str()),
            ("direction", metadata.direction.as_str()),
            ("files", files.as_str()),
            ("spine", itemrefs.as_str()),
            ("guide", references.as_str()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::{check_well_formed, parse_package_document};
    use crate::model::ReadingDirection;

    fn metadata() -> PackageMetadata {
        PackageMetadata::new("A &amp; B")
            .with_language("en")
            .with_creator("Author")
            .with_publisher("Press")
            .with_rights("CC0")
            .with_identifier("urn:uuid:42")
            .with_identifier_id("PrimaryId")
            .with_date("2024-05-01")
            .with_modified("2024-05-01T12:00:00Z")
            .with_direction(ReadingDirection::Rtl)
    }

    #[test]
    fn renders_all_blocks() {
        let manifest = vec![
            ManifestItem::new("c1", "chapter one.xhtml", "application/xhtml+xml"),
            ManifestItem::new("cover", "cover.png", "image/png").with_properties("cover-image"),
        ];
        let spine = vec![SpineEntry::new("c1")];
        let guide = vec![GuideReference::new("toc", "Contents", "nav.xhtml")];
        let opf = render_package_document(
            &metadata(),
            &manifest,
            &spine,
            &guide,
            true,
            &PackageTemplates::default(),
        );

        check_well_formed(&opf).unwrap();
        assert!(opf.contains("<dc:title>A &amp; B</dc:title>"));
        assert!(opf.contains(r#"href="chapter%20one.xhtml""#));
        assert!(opf.contains(r#"properties="cover-image""#));
        assert!(opf.contains(r#"page-progression-direction="rtl""#));
        assert!(opf.contains(r#"<reference type="toc" title="Contents" href="nav.xhtml" />"#));

        let doc = parse_package_document(&opf).unwrap();
        assert_eq!(doc.spine, vec!["nav", "c1"]);
        assert_eq!(doc.manifest.len(), 4);
    }

    #[test]
    fn identifier_binding_comes_from_one_field() {
        let opf = render_package_document(
            &metadata(),
            &[],
            &[],
            &[],
            false,
            &PackageTemplates::default(),
        );
        let doc = parse_package_document(&opf).unwrap();
        assert_eq!(doc.unique_identifier, "PrimaryId");
        assert_eq!(
            doc.identifiers,
            vec![(Some("PrimaryId".to_string()), "urn:uuid:42".to_string())]
        );
        assert!(doc.spine.is_empty());
    }

    #[test]
    fn hrefs_are_encoded_and_sanitized() {
        let manifest = vec![
            ManifestItem::new("qa", "Q&A.xhtml", "application/xhtml+xml"),
            ManifestItem::new("quote", "it's.css", "text/css"),
            ManifestItem::new("pct", "100%.png", "image/png"),
            ManifestItem::new("css", "sub\\a.css", "text/css"),
            ManifestItem::new("img", "/b.png", "image/png"),
        ];
        let opf = render_package_document(
            &metadata(),
            &manifest,
            &[SpineEntry::new("qa")],
            &[],
            false,
            &PackageTemplates::default(),
        );

        check_well_formed(&opf).unwrap();
        let doc = parse_package_document(&opf).unwrap();
        let href = |id: &str| doc.item(id).map(|item| item.href.clone());
        assert_eq!(href("qa").as_deref(), Some("Q%26A.xhtml"));
        assert_eq!(href("quote").as_deref(), Some("it%27s.css"));
        assert_eq!(href("pct").as_deref(), Some("100%25.png"));
        assert_eq!(href("css").as_deref(), Some("sub/a.css"));
        assert_eq!(href("img").as_deref(), Some("b.png"));
    }

    #[test]
    fn non_linear_itemrefs_are_marked() {
        let opf = render_package_document(
            &metadata(),
            &[ManifestItem::new("x", "x.xhtml", "application/xhtml+xml")],
            &[SpineEntry::non_linear("x")],
            &[],
            false,
            &PackageTemplates::default(),
        );
        assert!(opf.contains(r#"<itemref idref="x" linear="no" />"#));
    }
}
