//! `META-INF/container.xml` rendering.

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{path}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Render the container descriptor pointing at the package document.
pub fn render_container_xml(package_path: &str) -> String {
    super::template::fill(CONTAINER_XML, &[("path", package_path)])
}
