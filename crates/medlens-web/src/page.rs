//! Standalone HTML page around a rendered view.

use std::fmt::Write;

use html_escape::encode_text;

use crate::view::RenderedView;

const STYLE: &str = "\
body { font-family: system-ui, sans-serif; margin: 2rem; color: #1f2933; }
section { margin-bottom: 1.5rem; }
h2 { border-bottom: 1px solid #d9e2ec; padding-bottom: .25rem; }
.small { color: #627d98; font-size: .9em; }
.plain-text { white-space: pre-wrap; }
pre.plain-text { font-family: inherit; margin: 0; }
.highlight-output { white-space: pre-wrap; line-height: 1.6; }
.highlight-disease { background: #ffe3e3; border-bottom: 2px solid #e12d39; }
.highlight-lab { background: #e3f8ff; border-bottom: 2px solid #2186eb; }
.entity-table { border-collapse: collapse; margin-bottom: 1rem; }
.entity-table th, .entity-table td { border: 1px solid #d9e2ec; padding: .25rem .5rem; }
.summary-content { white-space: pre-wrap; }
details { margin: .5rem 0; }
";

/// Wrap `view` into a complete HTML document titled `title`.
pub fn render_page(title: &str, view: &RenderedView) -> String {
    let title = encode_text(title);
    let mut out = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n<h1>{title}</h1>\n"
    );
    for (heading, body) in view.panels() {
        // Multi-document results leave some panels empty.
        if body.is_empty() {
            continue;
        }
        let class = if heading == "Highlighted Text" {
            " class=\"highlight-output\""
        } else {
            ""
        };
        let _ = write!(out, "<section>\n<h2>{heading}</h2>\n<div{class}>{body}</div>\n</section>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}
