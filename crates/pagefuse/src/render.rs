//! HTML rendering: turn a page's ordered segments into the final markup
//! stored alongside the page record.

use base64::Engine;

use crate::types::{Cell, Label, Segment};

/// Render a page's segments to HTML, in the order given (already sorted by
/// `y0` by [`crate::assign::assign_and_realign`]).
///
/// `tables` maps a segment's `prediction_index` to its reconstructed grid,
/// and `illustrations` maps it to either the cropped image's JPEG bytes or
/// an extraction failure.
pub fn render_page(
    segments: &[Segment],
    tables: &std::collections::HashMap<usize, Vec<Vec<Cell>>>,
    illustrations: &std::collections::HashMap<usize, crate::error::Result<Vec<u8>>>,
) -> String {
    let mut html = String::new();
    for segment in segments {
        match segment.label {
            Label::Paragraph => {
                html.push_str("<p>");
                html.push_str(&escape(&segment.content));
                html.push_str("</p>\n");
            }
            Label::Header => {
                html.push_str("<h5>");
                html.push_str(&escape(&segment.content));
                html.push_str("</h5>\n");
            }
            Label::Table => {
                if let Some(rows) = tables.get(&segment.prediction_index) {
                    html.push_str(&render_table(rows));
                }
            }
            Label::Illustration => {
                html.push_str(&render_illustration(illustrations.get(&segment.prediction_index)));
            }
            Label::Other => {
                html.push_str("<span>");
                html.push_str(&escape(&segment.content));
                html.push_str("</span>\n");
            }
        }
    }
    html
}

fn render_table(rows: &[Vec<Cell>]) -> String {
    let mut html = String::from("<table>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str("<td");
            if cell.colspan > 1 {
                html.push_str(&format!(" colspan=\"{}\"", cell.colspan));
            }
            if cell.rowspan > 1 {
                html.push_str(&format!(" rowspan=\"{}\"", cell.rowspan));
            }
            html.push('>');
            html.push_str(&escape(&cell.content));
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
    html
}

/// Inline the cropped illustration as a base64 data URI, or fall back to a
/// visible failure marker rather than silently dropping the segment.
fn render_illustration(bytes: Option<&crate::error::Result<Vec<u8>>>) -> String {
    match bytes {
        Some(Ok(jpeg)) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg);
            format!("<img src=\"data:image/jpeg;base64,{encoded}\">\n")
        }
        _ => "<pre>Failed to extract illustration</pre>\n".to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
