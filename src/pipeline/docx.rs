//! DOCX paragraph extraction.
//!
//! The package is parsed by `docx-rs`. Only the body's top-level paragraphs
//! are read: a paragraph's text is its runs (hyperlinked runs included) in
//! order, with run-level tabs and breaks mapped to `\t` and `\n`. Tables,
//! text boxes and paragraph properties such as tab stops carry no paragraph
//! text.

use crate::error::ExtractError;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use quick_xml::escape::unescape;
use tracing::debug;

/// Extract the paragraphs of a DOCX body, in document order.
///
/// Empty paragraphs are kept as empty strings.
pub fn extract_paragraphs(bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ExtractError::Docx(format!("Failed to read DOCX: {}", e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => {
                let mut text = String::new();
                push_runs(&mut text, &paragraph.children);
                Some(text)
            }
            _ => None,
        })
        .collect();

    debug!("DOCX body: {} paragraphs", paragraphs.len());
    Ok(paragraphs)
}

fn push_runs(buf: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for child in &run.children {
                    match child {
                        RunChild::Text(text) => push_text(buf, &text.text),
                        RunChild::Tab(_) => buf.push('\t'),
                        RunChild::Break(_) => buf.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_runs(buf, &link.children),
            _ => {}
        }
    }
}

// Run text may still hold entity references; a bare `&` is kept as written.
fn push_text(buf: &mut String, text: &str) {
    if text.contains('&') {
        match unescape(text) {
            Ok(plain) => buf.push_str(&plain),
            Err(_) => buf.push_str(text),
        }
    } else {
        buf.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

    const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"><w:body>{body}</w:body></w:document>"#
        );
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", PACKAGE_RELS),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS),
            ("word/document.xml", xml.as_str()),
        ] {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn joined(bytes: &[u8]) -> String {
        extract_paragraphs(bytes).unwrap().join("\n")
    }

    #[test]
    fn runs_concatenate_within_a_paragraph() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t xml:space=\"preserve\">Part Name: </w:t></w:r><w:r><w:t>Rotor</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Serial Number: 12AB</w:t></w:r></w:p>",
        );
        assert_eq!(joined(&bytes), "Part Name: Rotor\nSerial Number: 12AB");
    }

    #[test]
    fn keeps_empty_paragraphs_and_maps_tabs_and_breaks() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>\
             <w:p/>\
             <w:p><w:r><w:t>d</w:t></w:r></w:p>",
        );
        let paras = extract_paragraphs(&bytes).unwrap();
        assert_eq!(paras, vec!["a\tb\nc", "", "d"]);
    }

    #[test]
    fn tab_stops_are_layout_not_text() {
        let bytes = docx_with_body(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"2880\"/><w:tab w:val=\"left\" w:pos=\"5760\"/></w:tabs></w:pPr>\
             <w:r><w:t>Serial Number: 12AB</w:t></w:r></w:p>",
        );
        assert_eq!(extract_paragraphs(&bytes).unwrap(), vec!["Serial Number: 12AB"]);
    }

    #[test]
    fn text_box_does_not_replace_its_paragraph() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t xml:space=\"preserve\">Part Name: Rotor </w:t></w:r>\
             <w:r><w:drawing><wp:anchor distT=\"0\" distB=\"0\" distL=\"0\" distR=\"0\" simplePos=\"0\" relativeHeight=\"1\" behindDoc=\"0\" locked=\"0\" layoutInCell=\"1\" allowOverlap=\"1\">\
             <wp:simplePos x=\"0\" y=\"0\"/><wp:positionH relativeFrom=\"column\"><wp:posOffset>0</wp:posOffset></wp:positionH>\
             <wp:positionV relativeFrom=\"paragraph\"><wp:posOffset>0</wp:posOffset></wp:positionV>\
             <wp:extent cx=\"914400\" cy=\"457200\"/><wp:wrapNone/><wp:docPr id=\"1\" name=\"Text Box 1\"/>\
             <a:graphic><a:graphicData uri=\"http://schemas.microsoft.com/office/word/2010/wordprocessingShape\">\
             <wps:wsp><wps:txbx><w:txbxContent><w:p><w:r><w:t>box</w:t></w:r></w:p></w:txbxContent></wps:txbx><wps:bodyPr/></wps:wsp>\
             </a:graphicData></a:graphic></wp:anchor></w:drawing></w:r>\
             <w:r><w:t>tail</w:t></w:r></w:p>",
        );
        assert_eq!(extract_paragraphs(&bytes).unwrap(), vec!["Part Name: Rotor tail"]);
    }

    #[test]
    fn hyperlinked_runs_are_text() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t xml:space=\"preserve\">Vendor No: </w:t></w:r>\
             <w:hyperlink w:anchor=\"v\"><w:r><w:t>V-778</w:t></w:r></w:hyperlink></w:p>",
        );
        assert_eq!(joined(&bytes), "Vendor No: V-778");
    }

    #[test]
    fn table_cells_are_not_body_paragraphs() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>before</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>after</w:t></w:r></w:p>",
        );
        assert_eq!(extract_paragraphs(&bytes).unwrap(), vec!["before", "after"]);
    }

    #[test]
    fn unescapes_entities() {
        let bytes = docx_with_body("<w:p><w:r><w:t>Nuts &amp; Bolts &lt;M8&gt;</w:t></w:r></w:p>");
        assert_eq!(joined(&bytes), "Nuts & Bolts <M8>");
    }

    #[test]
    fn rejects_non_zip() {
        let err = extract_paragraphs(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }
}
