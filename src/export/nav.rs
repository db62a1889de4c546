//! Navigation document (`nav.xhtml`) rendering.
//!
//! The outline arrives flat, so nesting is rebuilt on the fly: one pass over
//! the entries with a one-entry lookahead and a stack of the depths of items
//! still open around a nested list.

use crate::epub::check_well_formed;
use crate::error::Result;
use crate::model::Outline;

use super::template::{NavTemplates, fill_into};

/// Render the nested `<li>`/`<ol>` fragment for a normalized outline.
///
/// Item indentation is `depth` repetitions of the template indent unit, which
/// keeps the output byte-identical to the classic previous-entry renderer.
pub fn render_nav_list(outline: &Outline, templates: &NavTemplates) -> String {
    let entries = outline.entries();
    let mut out = String::new();
    let mut open: Vec<usize> = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        let next = entries.get(i + 1).map(|e| e.depth);
        let indent = templates.indent.repeat(entry.depth);
        let vars = [
            ("indent", indent.as_str()),
            ("href", entry.target.as_str()),
            ("title", entry.title.as_str()),
        ];

        if next.is_some_and(|n| n > entry.depth) {
            fill_into(&mut out, &templates.parent, &vars);
            open.push(entry.depth);
            continue;
        }

        fill_into(&mut out, &templates.single, &vars);

        // Close every parent at or below the next entry's level; all of them at the end.
        let floor = next.unwrap_or(0);
        while open.last().is_some_and(|&d| d >= floor) {
            let Some(depth) = open.pop() else { break };
            let indent = templates.indent.repeat(depth);
            fill_into(&mut out, &templates.leave, &[("indent", indent.as_str())]);
        }
    }

    out
}

/// Render the complete navigation document.
pub fn render_nav_document(
    outline: &Outline,
    lang: &str,
    toc_title: &str,
    templates: &NavTemplates,
) -> String {
    let shell = [("lang", lang), ("toc_title", toc_title)];
    let mut doc = String::new();
    fill_into(&mut doc, &templates.header, &shell);
    doc.push_str(&render_nav_list(outline, templates));
    fill_into(&mut doc, &templates.footer, &shell);
    doc
}

/// Render the navigation document and check that it parses as XML.
pub fn build_nav_document(
    outline: &Outline,
    lang: &str,
    toc_title: &str,
    templates: &NavTemplates,
) -> Result<String> {
    let doc = render_nav_document(outline, lang, toc_title, templates);
    check_well_formed(&doc)?;
    tracing::debug!(entries = outline.len(), bytes = doc.len(), "rendered nav document");
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DepthPolicy, OutlineEntry};
    use proptest::prelude::*;
    use quick_xml::Reader;
    use quick_xml::events::Event;

    fn outline(depths: &[usize]) -> Outline {
        depths
            .iter()
            .enumerate()
            .map(|(i, &d)| OutlineEntry::new(d, format!("E{i}"), format!("f.xhtml#e{i}")))
            .collect()
    }

    fn valid_depths() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(0usize..5, 0..30).prop_map(|raw| {
            let mut out = Vec::with_capacity(raw.len());
            let mut prev = 0;
            for r in raw {
                let d = if r == 0 { prev + 1 } else { r.min(prev).max(1) };
                out.push(d);
                prev = d;
            }
            out
        })
    }

    /// Depth of each link, measured as the number of enclosing `<ol>` elements.
    fn link_depths(doc: &str) -> Vec<usize> {
        let mut reader = Reader::from_str(doc);
        let mut ol = 0;
        let mut found = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.name().as_ref() == b"ol" => ol += 1,
                Event::End(e) if e.name().as_ref() == b"ol" => ol -= 1,
                Event::Start(e) if e.name().as_ref() == b"a" => found.push(ol),
                Event::Eof => break,
                _ => {}
            }
        }
        found
    }

    #[test]
    fn renders_nested_example_byte_for_byte() {
        let o: Outline = vec![
            OutlineEntry::new(1, "A", "a.xhtml"),
            OutlineEntry::new(2, "A.1", "a.xhtml#s1"),
            OutlineEntry::new(2, "A.2", "a.xhtml#s2"),
            OutlineEntry::new(1, "B", "b.xhtml"),
        ]
        .into();
        let expected = concat!(
            "    <li>\n",
            "      <a href=\"a.xhtml\">A</a>\n",
            "      <ol>\n",
            "          <li>\n",
            "            <a href=\"a.xhtml#s1\">A.1</a>\n",
            "          </li>\n",
            "          <li>\n",
            "            <a href=\"a.xhtml#s2\">A.2</a>\n",
            "          </li>\n",
            "      </ol>\n",
            "    </li>\n",
            "      <li>\n",
            "        <a href=\"b.xhtml\">B</a>\n",
            "      </li>\n",
        );
        let fragment = render_nav_list(&o, &NavTemplates::default());
        assert_eq!(fragment, expected);
        assert_eq!(fragment.matches("<li>").count(), 4);
        assert_eq!(fragment.matches("<ol>").count(), 1);
    }

    #[test]
    fn drains_open_lists_at_end() {
        let fragment = render_nav_list(&outline(&[1, 2, 3]), &NavTemplates::default());
        assert_eq!(fragment.matches("<ol>").count(), 2);
        assert_eq!(fragment.matches("</ol>").count(), 2);
        assert!(fragment.ends_with("    </li>\n"));
    }

    #[test]
    fn multi_level_close() {
        let fragment = render_nav_list(&outline(&[1, 2, 3, 1]), &NavTemplates::default());
        let closes: Vec<_> = fragment
            .lines()
            .filter(|l| l.trim() == "</ol>")
            .collect();
        // Closed innermost first, one indent unit per level.
        assert_eq!(closes, vec!["          </ol>", "      </ol>"]);
    }

    #[test]
    fn empty_outline_renders_shell_only() {
        let t = NavTemplates::default();
        let doc = render_nav_document(&Outline::new(), "en", "Contents", &t);
        assert!(doc.contains("<h1>Contents</h1>"));
        assert!(doc.contains("      <ol>\n      </ol>\n"));
        assert!(check_well_formed(&doc).is_ok());
    }

    #[test]
    fn header_carries_language_and_title() {
        let doc = render_nav_document(&outline(&[1]), "de", "Inhalt", &NavTemplates::default());
        assert!(doc.contains(r#"lang="de" xml:lang="de""#));
        assert!(doc.contains("<title>Inhalt</title>"));
        assert!(doc.contains(r#"<nav epub:type="toc" id="toc">"#));
    }

    #[test]
    fn custom_templates_are_used() {
        let templates = NavTemplates {
            header: "<ol>".into(),
            footer: "</ol>".into(),
            single: "<li>{title}</li>".into(),
            parent: "<li>{title}<ol>".into(),
            leave: "</ol></li>".into(),
            indent: String::new(),
        };
        let doc = render_nav_document(&outline(&[1, 2, 1]), "en", "T", &templates);
        assert_eq!(doc, "<ol><li>E0<ol><li>E1</li></ol></li><li>E2</li></ol>");
    }

    #[test]
    fn broken_template_is_rejected() {
        let templates = NavTemplates {
            footer: "</ol>".into(),
            ..NavTemplates::default()
        };
        let err = build_nav_document(&outline(&[1]), "en", "T", &templates).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidMarkup(_)));
    }

    #[test]
    fn clamped_skip_renders_as_single_level() {
        let o = outline(&[1, 3]).normalize(DepthPolicy::Clamp).unwrap();
        let doc = render_nav_document(&o, "en", "T", &NavTemplates::default());
        assert_eq!(link_depths(&doc), vec![1, 2]);
    }

    proptest! {
        #[test]
        fn prop_flat_outline_has_no_nested_lists(n in 0usize..40) {
            let fragment = render_nav_list(&outline(&vec![1; n]), &NavTemplates::default());
            prop_assert_eq!(fragment.matches("<li>").count(), n);
            prop_assert_eq!(fragment.matches("<ol>").count(), 0);
        }

        #[test]
        fn prop_nested_lists_are_balanced(d in valid_depths()) {
            let fragment = render_nav_list(&outline(&d), &NavTemplates::default());
            prop_assert_eq!(fragment.matches("<ol>").count(), fragment.matches("</ol>").count());
            prop_assert_eq!(fragment.matches("<li>").count(), fragment.matches("</li>").count());
        }

        #[test]
        fn prop_depths_round_trip(d in valid_depths()) {
            let doc = render_nav_document(&outline(&d), "en", "T", &NavTemplates::default());
            prop_assert!(check_well_formed(&doc).is_ok());
            prop_assert_eq!(link_depths(&doc), d);
        }
    }
}
