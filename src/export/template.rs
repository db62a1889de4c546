//! Document templates and placeholder substitution.
//!
//! Templates are plain strings with `{name}` placeholders. They live in
//! config structs handed to the renderers, so a caller can swap in an
//! alternate shell without touching shared state.

/// Substitute `{name}` placeholders in `template`, appending to `out`.
///
/// Scans left to right once; substituted values are never rescanned, so a
/// title containing `{lang}` is emitted verbatim. Unknown placeholders and
/// lone braces are copied through unchanged.
pub fn fill_into(out: &mut String, template: &str, vars: &[(&str, &str)]) {
    let bytes = template.as_bytes();
    let mut pos = 0;

    while let Some(offset) = memchr::memchr(b'{', &bytes[pos..]) {
        let open = pos + offset;
        out.push_str(&template[pos..open]);

        let rest = &template[open + 1..];
        let replaced = memchr::memchr(b'}', rest.as_bytes()).and_then(|close| {
            let name = &rest[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                pos = open + 1 + close + 1;
            }
            None => {
                out.push('{');
                pos = open + 1;
            }
        }
    }
    out.push_str(&template[pos..]);
}

/// Substitute placeholders into a fresh string.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    fill_into(&mut out, template, vars);
    out
}

const NAV_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{lang}" xml:lang="{lang}">
  <head>
    <title>{toc_title}</title>
  </head>
  <body>
    <nav epub:type="toc" id="toc">
      <h1>{toc_title}</h1>
      <ol>
"#;

const NAV_FOOTER: &str = r#"      </ol>
    </nav>
  </body>
</html>
"#;

const NAV_SINGLE: &str = r#"{indent}  <li>
{indent}    <a href="{href}">{title}</a>
{indent}  </li>
"#;

const NAV_PARENT: &str = r#"{indent}<li>
{indent}  <a href="{href}">{title}</a>
{indent}  <ol>
"#;

const NAV_LEAVE: &str = r#"{indent}  </ol>
{indent}</li>
"#;

/// Templates for the navigation document.
///
/// `header`/`footer` see `{lang}` and `{toc_title}`; the item templates see
/// `{indent}`, `{href}`, and `{title}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTemplates {
    pub header: String,
    pub footer: String,
    /// A leaf item, opened and closed in one unit.
    pub single: String,
    /// An item that stays open around a nested list.
    pub parent: String,
    /// Closes a nested list and its parent item.
    pub leave: String,
    /// Indentation unit, repeated once per depth level.
    pub indent: String,
}

impl Default for NavTemplates {
    fn default() -> Self {
        Self {
            header: NAV_HEADER.to_string(),
            footer: NAV_FOOTER.to_string(),
            single: NAV_SINGLE.to_string(),
            parent: NAV_PARENT.to_string(),
            leave: NAV_LEAVE.to_string(),
            indent: "    ".to_string(),
        }
    }
}

const PACKAGE_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" xml:lang="{lang}"
      unique-identifier="{uid}">
  <metadata xmlns:opf="http://www.idpf.org/2007/opf"
        xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:language>{lang}</dc:language>
    <dc:title>{title}</dc:title>
    <dc:creator>{creator}</dc:creator>
    <dc:publisher>{publisher}</dc:publisher>
    <dc:rights>{rights}</dc:rights>
    <dc:identifier id="{uid}">{identifier}</dc:identifier>
    <dc:date>{date}</dc:date>
    <meta property="dcterms:modified">{modified}</meta>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml" />
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
{files}  </manifest>
  <spine toc="ncx" page-progression-direction="{direction}">
{spine}  </spine>
  <guide>
{guide}  </guide>
</package>
"#;

const PACKAGE_ITEM: &str =
    "    <item id=\"{id}\" href=\"{href}\" media-type=\"{media_type}\"{properties} />\n";

const PACKAGE_ITEMREF: &str = "    <itemref idref=\"{idref}\"{linear} />\n";

const PACKAGE_REFERENCE: &str =
    "    <reference type=\"{type}\" title=\"{title}\" href=\"{href}\" />\n";

/// Templates for the package description document (`content.opf`).
///
/// `document` sees the metadata placeholders plus the pre-rendered
/// `{files}`, `{spine}`, and `{guide}` blocks. The identifier binding
/// placeholder `{uid}` is filled from a single metadata field wherever it
/// appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTemplates {
    pub document: String,
    /// One manifest line: `{id}`, `{href}`, `{media_type}`, `{properties}`.
    pub item: String,
    /// One spine line: `{idref}`, `{linear}`.
    pub itemref: String,
    /// One guide line: `{type}`, `{title}`, `{href}`.
    pub reference: String,
}

impl Default for PackageTemplates {
    fn default() -> Self {
        Self {
            document: PACKAGE_DOCUMENT.to_string(),
            item: PACKAGE_ITEM.to_string(),
            itemref: PACKAGE_ITEMREF.to_string(),
            reference: PACKAGE_REFERENCE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_known_placeholders() {
        assert_eq!(fill("<{a}>{b}</{a}>", &[("a", "x"), ("b", "y")]), "<x>y</x>");
    }

    #[test]
    fn leaves_unknown_placeholders_and_braces() {
        assert_eq!(fill("{nope} { } {", &[("a", "x")]), "{nope} { } {");
        assert_eq!(fill("{{a}}", &[("a", "x")]), "{x}");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        assert_eq!(
            fill("{title}", &[("title", "{lang}"), ("lang", "en")]),
            "{lang}"
        );
    }

    #[test]
    fn default_nav_templates_use_four_space_indent() {
        let t = NavTemplates::default();
        assert_eq!(t.indent, "    ");
        assert!(t.header.ends_with("      <ol>\n"));
        assert!(t.footer.starts_with("      </ol>\n"));
    }
}
