//! AIPS monograph corpus loader.
//!
//! Builds the ordered [`Medicine`] list that drives the whole pipeline — the
//! iteration order of this list is the iteration order of the final database.

use std::path::Path;

use roxmltree::Document;
use tracing::warn;

use crate::entities::Medicine;
use crate::error::PipelineError;

const SOURCE: &str = "aips";

/// `type="fi"` (Fachinformation) or `type="pi"` (patient information) — see
/// the `--pinfo` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonographType {
    Fi,
    Pi,
}

impl MonographType {
    fn attr_value(self) -> &'static str {
        match self {
            MonographType::Fi => "fi",
            MonographType::Pi => "pi",
        }
    }
}

/// Parses the AIPS XML file, keeping only records whose `type` attribute
/// matches `wanted` (default `fi`), in document order.
pub fn load(path: &Path, wanted: MonographType) -> Result<Vec<Medicine>, PipelineError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| PipelineError::input_missing(path, e))?;

    let doc = Document::parse(&raw)
        .map_err(|e| PipelineError::parse_fatal(SOURCE, e.to_string()))?;

    let mut out = Vec::new();
    for node in doc.descendants().filter(|n| n.has_tag_name("Article")) {
        let ty = node.attribute("type").unwrap_or("fi");
        if ty != wanted.attr_value() {
            continue;
        }

        let title = child_text(node, "Title");
        let auth = child_text(node, "AuthHolder");
        let atc = child_text(node, "AtcCode");
        let substance = child_text(node, "Substance");
        let regnrs = child_text(node, "RegNrs");

        if regnrs.is_empty() {
            warn!(target: "aips", title = %title, "monograph with no registration numbers");
        }

        let content_xml = match node.children().find(|n| n.has_tag_name("Content")) {
            Some(content) => serialize_children(content),
            None => {
                warn!(target: "aips", title = %title, "monograph with no <Content> element");
                String::from("<div></div>")
            }
        };

        out.push(Medicine::new(title, auth, atc, substance, regnrs, content_xml));
    }

    Ok(out)
}

fn child_text(node: roxmltree::Node, tag: &str) -> String {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Re-serialises a `Content` element's children back into an XML fragment
/// rooted at `<div>`, since the rewriter expects a raw XML string to
/// re-parse rather than a live node tree (see `rewriter::rewrite`).
fn serialize_children(content: roxmltree::Node) -> String {
    let mut out = String::from("<div>");
    for child in content.children() {
        write_node(child, &mut out);
    }
    out.push_str("</div>");
    out
}

fn write_node(node: roxmltree::Node, out: &mut String) {
    if node.is_text() {
        if let Some(t) = node.text() {
            out.push_str(t);
        }
        return;
    }
    if !node.is_element() {
        return;
    }

    out.push('<');
    out.push_str(node.tag_name().name());
    for attr in node.attributes() {
        out.push(' ');
        out.push_str(attr.name());
        out.push_str("=\"");
        out.push_str(attr.value());
        out.push('"');
    }
    if node.children().next().is_none() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in node.children() {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(node.tag_name().name());
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(xml: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(xml.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_only_requested_monograph_type_in_document_order() {
        let f = write_fixture(
            r#"<Articles>
                <Article type="fi">
                    <Title>Alpha</Title>
                    <AuthHolder>ACME</AuthHolder>
                    <AtcCode>J01</AtcCode>
                    <Substance>alphamycin</Substance>
                    <RegNrs>12345</RegNrs>
                    <Content><div><p id="section1">Hi</p></div></Content>
                </Article>
                <Article type="pi">
                    <Title>Beta</Title>
                    <AuthHolder>ACME</AuthHolder>
                    <AtcCode>J02</AtcCode>
                    <Substance>betamycin</Substance>
                    <RegNrs>67890</RegNrs>
                    <Content><div></div></Content>
                </Article>
            </Articles>"#,
        );

        let meds = load(f.path(), MonographType::Fi).unwrap();
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].title, "Alpha");
        assert_eq!(meds[0].regnr_list, vec!["12345".to_string()]);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load(Path::new("/no/such/file.xml"), MonographType::Fi);
        assert!(matches!(err, Err(PipelineError::InputMissing { .. })));
    }
}
