//! Legacy table of contents (`toc.ncx`) rendering.

use crate::model::{NavPoint, Outline, PackageMetadata};

/// Generate toc.ncx from the outline.
///
/// Titles and targets are written as given (they arrive escaped). Play order
/// follows document order, and `dtb:depth` is the deepest outline level.
pub fn render_ncx(metadata: &PackageMetadata, outline: &Outline) -> String {
    let mut ncx = String::new();

    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content=""#,
    );
    ncx.push_str(&metadata.identifier);
    ncx.push_str(
        r#""/>
    <meta name="dtb:depth" content=""#,
    );
    ncx.push_str(&outline.max_depth().max(1).to_string());
    ncx.push_str(
        r#""/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>"#,
    );
    ncx.push_str(&metadata.title);
    ncx.push_str(
        r#"</text>
  </docTitle>
  <navMap>
"#,
    );

    let mut play_order = 1;
    write_nav_points(&mut ncx, &outline.to_nested(), &mut play_order, 2);

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

/// Recursively write navPoint elements.
fn write_nav_points(ncx: &mut String, points: &[NavPoint], play_order: &mut usize, indent: usize) {
    let indent_str = "  ".repeat(indent);

    for point in points {
        ncx.push_str(&format!(
            "{}<navPoint id=\"navPoint{}\" playOrder=\"{}\">\n",
            indent_str, play_order, play_order
        ));
        ncx.push_str(&format!(
            "{}  <navLabel>\n{}    <text>{}</text>\n{}  </navLabel>\n",
            indent_str, indent_str, point.title, indent_str
        ));
        ncx.push_str(&format!(
            "{}  <content src=\"{}\" />\n",
            indent_str, point.target
        ));

        *play_order += 1;

        if !point.children.is_empty() {
            write_nav_points(ncx, &point.children, play_order, indent + 1);
        }

        ncx.push_str(&format!("{}</navPoint>\n", indent_str));
    }
}
