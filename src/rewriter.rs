//! Monograph XML → normalised HTML rewriter.
//!
//! Mirrors the upstream two-phase approach: a string-level sanitation pass
//! (tag stripping, entity substitution) followed by a tree walk that is
//! section-aware. Any parse failure after sanitation falls back to emitting
//! the cleaned XML unchanged (§7, `RewriterParse`).

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use roxmltree::{Document, Node};
use tracing::warn;

use crate::barcode;

const FIXED_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&micro;", "µ"),
    ("&auml;", "ä"),
    ("&ouml;", "ö"),
    ("&uuml;", "ü"),
    ("&Uuml;", "Ü"),
    ("&ge;", "≥"),
    ("&le;", "≤"),
    ("&agrave;", "à"),
    ("&middot;", "–"),
    ("&bdquo;", "„"),
    ("&ldquo;", "“"),
    ("&rsquo;", "’"),
    ("&beta;", "β"),
    ("&gamma;", "γ"),
    ("&frac12;", "½"),
    ("&ndash;", "–"),
];

fn span_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<span[^>]*>").unwrap())
}
fn sub_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<sub[^>]*>").unwrap())
}
fn sup_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<sup[^>]*>").unwrap())
}
fn section_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^section(\d+)$").unwrap())
}
fn width_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d*\.\d*").unwrap())
}

/// Phase 1: string-level entity/tag sanitation, run before the XML parse.
fn sanitize(xml: &str) -> String {
    let mut s = xml.to_string();
    s = span_open_re().replace_all(&s, "").into_owned();
    s = s.replace("</span>", "");
    s = sub_open_re().replace_all(&s, "").into_owned();
    s = s.replace("</sub>", "");
    s = sup_open_re().replace_all(&s, "").into_owned();
    s = s.replace("</sup>", "");
    s = s.replace('\'', "&apos;");
    for (from, to) in FIXED_ENTITIES {
        s = s.replace(from, to);
    }
    s
}

/// Rewrites a monograph's raw content XML into the stable HTML document
/// contract. Never fails: a parse error after sanitation degrades to the
/// cleaned XML string.
pub fn rewrite(xml: &str, regnrs: &str, auth: &str, used_gtins: &HashSet<String>) -> String {
    let cleaned = sanitize(xml);

    let doc = match Document::parse(&cleaned) {
        Ok(d) => d,
        Err(e) => {
            let err = crate::error::PipelineError::RewriterParse { message: e.to_string() };
            warn!(target: "rewriter", regnrs, error = %err, "falling back to raw content");
            return cleaned;
        }
    };

    let root = doc.root_element();

    let mut html = String::new();
    html.push_str("<html>\n <head></head>\n <body>\n");
    html.push_str(&format!("  <div id=\"monographie\" name=\"{regnrs}\">\n\n"));

    let mut section1_done = false;
    let mut section18_done = false;
    let mut section_open = false;
    let mut current_section = 0u32;

    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "p" => {
                if let Some(section_number) = section_number_of(child) {
                    current_section = section_number;
                    if section_number > 1 && section_open {
                        html.push_str("   </div>\n");
                    }

                    let (div_class, body) = if section_number == 1 {
                        (
                            "MonTitle",
                            escape_paragraph_text(child),
                        )
                    } else {
                        (
                            "paragraph",
                            format!(" <div class=\"absTitle\">\n {}\n </div>\n", escape_paragraph_text(child)),
                        )
                    };

                    html.push_str(&format!(
                        "   <div class=\"{div_class}\" id=\"section{section_number}\">\n"
                    ));
                    html.push_str(&body);
                    html.push('\n');
                    section_open = true;

                    if section_number == 1 {
                        html.push_str("   </div>\n");
                        html.push_str("   <div class=\"ownerCompany\">\n");
                        html.push_str("    <div style=\"text-align: right;\">\n   ");
                        html.push_str(auth);
                        html.push('\n');
                        html.push_str("    </div>\n");
                        section1_done = true;
                        section_open = true; // ownerCompany div still open, closed by next section or tail
                    }

                    if section_number == 18 {
                        for gtin in used_gtins {
                            match barcode::create_svg(gtin) {
                                Ok(svg) => html.push_str(&format!("<p class=\"barcode\">{svg}</p>\n")),
                                Err(e) => warn!(target: "rewriter", gtin, error = %e, "could not render barcode"),
                            }
                        }
                        section18_done = true;
                    }

                    continue;
                }

                if !section1_done || current_section < 2 {
                    continue;
                }

                // section13 images
                let images: Vec<Node> = if current_section == 13 {
                    child.children().filter(|n| n.has_tag_name("img")).collect()
                } else {
                    Vec::new()
                };
                if !images.is_empty() {
                    for img in images {
                        match img.attribute("src") {
                            Some(src) => {
                                let mut tag = format!("<img Src=\"{src}\"");
                                if let Some(style) = img.attribute("style") {
                                    if !style.is_empty() {
                                        tag.push_str(&format!(" Style=\"{style}\""));
                                    }
                                }
                                match img.attribute("alt") {
                                    Some(alt) if !alt.is_empty() => tag.push_str(&format!(" Alt=\"{alt}\"")),
                                    Some(_) => {}
                                    None => warn!(target: "rewriter", regnrs, "<img> missing alt attribute"),
                                }
                                tag.push_str(" />");
                                html.push_str(&format!("  <ppp class=\"spacing1\">{tag}</ppp>\n"));
                            }
                            None => warn!(target: "rewriter", regnrs, "<img> missing src attribute, skipping"),
                        }
                    }
                    continue;
                }

                if section18_done {
                    continue;
                }

                let mut content = escape_paragraph_text(child);
                content = content.trim().to_string();
                if content.is_empty() {
                    continue;
                }

                let mut need_italic = !(content.ends_with('.')
                    || content.ends_with(',')
                    || content.ends_with(':')
                    || content.contains("ATC-Code")
                    || content.contains("Code ATC"));

                for bullet in ['–', '·', '-', '•'] {
                    if let Some(rest) = content.strip_prefix(bullet) {
                        content = format!("– {rest}");
                        need_italic = false;
                        break;
                    }
                }

                if need_italic {
                    content = format!("<span style=\"font-style:italic;\">{content}</span>");
                }

                html.push_str(&format!("  <p class=\"spacing1\">{content}</p>\n"));
            }
            "table" => {
                html.push_str(&rewrite_table(child));
                html.push('\n');
            }
            _ => {}
        }
    }

    html.push_str("\n  </div>\n </body>\n</html>");
    html
}

fn section_number_of(p: Node) -> Option<u32> {
    let id = p.attribute("id")?;
    let caps = section_id_re().captures(id)?;
    caps[1].parse().ok()
}

/// Re-escapes `<`, `>`, `'` the XML parser decoded back to entity form,
/// since a paragraph body is HTML-in-XML.
fn escape_paragraph_text(node: Node) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out.replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
}

fn collect_text(node: Node, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            if let Some(t) = child.text() {
                out.push_str(t);
            }
        } else if child.is_element() {
            collect_text(child, out);
        }
    }
}

fn rewrite_table(table: Node) -> String {
    let widths = match table.children().find(|n| n.has_tag_name("colgroup")) {
        Some(colgroup) => compute_widths(colgroup),
        None => Vec::new(),
    };

    let mut out = String::new();
    let mut counter = 0usize;
    write_table_node(table, &widths, &mut counter, &mut out);
    out
}

fn compute_widths(colgroup: Node) -> Vec<String> {
    let cols: Vec<Node> = colgroup.children().filter(|n| n.has_tag_name("col")).collect();
    let mut raw = Vec::with_capacity(cols.len());
    let mut sum = 0f64;
    for col in &cols {
        let style = col.attribute("style").unwrap_or("");
        let val: f64 = width_re()
            .find(style)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0.0);
        raw.push(val);
        sum += val;
    }

    raw.iter()
        .map(|v| {
            let pct = if sum > 0.0 { 100.0 * v / sum } else { 0.0 };
            format!(
                "width:{pct:.6}%25;background-color: #EEEEEE; padding-right: 5px; padding-left: 5px"
            )
        })
        .collect()
}

fn write_table_node(node: Node, widths: &[String], col_counter: &mut usize, out: &mut String) {
    if node.is_text() {
        if let Some(t) = node.text() {
            out.push_str(t);
        }
        return;
    }
    if !node.is_element() {
        return;
    }

    let name = node.tag_name().name();
    out.push('<');
    out.push_str(name);

    if name == "col" {
        if let Some(style) = widths.get(*col_counter) {
            out.push_str(&format!(" style=\"{style}\""));
        }
        for attr in node.attributes().filter(|a| a.name() != "style") {
            out.push(' ');
            out.push_str(attr.name());
            out.push_str("=\"");
            out.push_str(attr.value());
            out.push('"');
        }
        *col_counter += 1;
    } else {
        for attr in node.attributes() {
            out.push(' ');
            out.push_str(attr.name());
            out.push_str("=\"");
            out.push_str(attr.value());
            out.push('"');
        }
    }

    if node.children().next().is_none() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in node.children() {
        write_table_node(child, widths, col_counter, out);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colgroup_widths_are_renormalized_to_100_percent() {
        let xml = r#"<div><table><colgroup>
            <col style="width:1.0in;"/>
            <col style="width:2.0in;"/>
            <col style="width:2.0in;"/>
        </colgroup><tr><td>a</td></tr></table></div>"#;
        let used = HashSet::new();
        let html = rewrite(xml, "12345", "ACME", &used);
        assert!(html.contains("width:20.000000%25"));
        assert!(html.contains("width:40.000000%25"));
    }

    #[test]
    fn bullet_normalisation_disables_italic() {
        let xml = r#"<div><p id="section1">Title</p><p>–Patienten sollten</p></div>"#;
        let used = HashSet::new();
        let html = rewrite(xml, "12345", "ACME", &used);
        assert!(html.contains("– Patienten"));
        assert!(!html.contains("font-style:italic;\">– Patienten"));
    }

    #[test]
    fn atc_code_marker_suppresses_italic() {
        let xml = r#"<div><p id="section1">Title</p><p>ATC-Code: J01</p></div>"#;
        let used = HashSet::new();
        let html = rewrite(xml, "12345", "ACME", &used);
        assert!(html.contains(">ATC-Code: J01<"));
        assert!(!html.contains("font-style:italic;\">ATC-Code"));
    }

    #[test]
    fn plain_text_defaults_to_italic() {
        let xml = r#"<div><p id="section1">Title</p><p>Kurzbeschreibung</p></div>"#;
        let used = HashSet::new();
        let html = rewrite(xml, "12345", "ACME", &used);
        assert!(html.contains("font-style:italic;\">Kurzbeschreibung</span>"));
    }

    #[test]
    fn section_18_emits_one_barcode_per_used_gtin() {
        let xml = r#"<div><p id="section1">Title</p><p id="section18">Packungen</p></div>"#;
        let mut used = HashSet::new();
        used.insert("7680123450005".to_string());
        let html = rewrite(xml, "12345", "ACME", &used);
        assert_eq!(html.matches("class=\"barcode\"").count(), 1);
    }

    #[test]
    fn unparsable_xml_falls_back_to_cleaned_raw() {
        let xml = "<div><p>unterminated";
        let used = HashSet::new();
        let html = rewrite(xml, "12345", "ACME", &used);
        assert!(html.contains("unterminated"));
    }
}
