//! Output for a projected [`Report`]: a single self-contained HTML page, or
//! the raw view list as JSON.
//!
//! Writers stream into any `std::io::Write`. Escaping lives in its own pure
//! functions and never touches the traversal.

use std::borrow::Cow;
use std::io::Write;

use chrono::{DateTime, Utc};

use crate::annotate::LineAnnotation;
use crate::error::Result;
use crate::project::{ListItem, Report, View, ViewBody};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    /// Shown in the footer when set.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Coverage Report".to_string(),
            generated_at: None,
        }
    }
}

/// Escape text for HTML element content and attribute values.
#[must_use]
pub fn escape_html(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

/// Escape a line of source code and expand tabs to four spaces.
#[must_use]
pub fn escape_code(line: &str) -> Cow<'_, str> {
    let escaped = escape_html(line);
    if escaped.contains('\t') {
        Cow::Owned(escaped.replace('\t', "    "))
    } else {
        escaped
    }
}

/// Encode a string as a JavaScript literal safe to embed in a `<script>`.
fn js_string(raw: &str) -> Result<String> {
    Ok(serde_json::to_string(raw)?.replace("</", "<\\/"))
}

fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Write the report as one HTML document.
pub fn write_html<W: Write>(report: &Report, options: &RenderOptions, out: &mut W) -> Result<()> {
    let title = escape_html(&options.title);
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(
        out,
        "<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\">"
    )?;
    writeln!(out, "<title>{title}</title>")?;
    writeln!(out, "<style>{STYLE}</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;

    for view in &report.views {
        write_view(out, view)?;
    }

    if let Some(at) = options.generated_at {
        writeln!(
            out,
            "<footer>Generated {}</footer>",
            at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
    }
    writeln!(out, "</body>")?;
    writeln!(
        out,
        "<script>const initialID = {};{SCRIPT}</script>",
        js_string(&report.initial_id)?
    )?;
    writeln!(out, "</html>")?;
    Ok(())
}

fn write_view<W: Write>(out: &mut W, view: &View) -> Result<()> {
    writeln!(
        out,
        "<div id=\"{}\" class=\"view\" style=\"display:none\">",
        escape_html(&view.id)
    )?;

    write!(out, "<div class=\"links\">")?;
    for link in &view.links {
        write!(
            out,
            "<a href=\"#{}\">{}</a>",
            escape_html(&link.id),
            escape_html(&link.title)
        )?;
    }
    writeln!(out, "</div>")?;

    writeln!(
        out,
        "<div class=\"summary\"><div class=\"percent\">{}</div>\
         <div class=\"label\">Statements</div>\
         <div class=\"stmts\">{}/{}</div></div>",
        percent(view.percentage),
        view.counts.covered,
        view.counts.statements
    )?;

    match &view.body {
        ViewBody::Directory { items } => {
            writeln!(out, "<div class=\"items\">")?;
            for item in items {
                write_item(out, item)?;
            }
            writeln!(out, "</div>")?;
        }
        ViewBody::File { lines } => {
            writeln!(out, "<div class=\"lines\">")?;
            for line in lines {
                write_line(out, line.number, line.annotation, &line.text)?;
            }
            writeln!(out, "</div>")?;
        }
    }

    writeln!(out, "</div>")?;
    Ok(())
}

fn write_item<W: Write>(out: &mut W, item: &ListItem) -> Result<()> {
    let class = item.classification.map(|c| c.as_str()).unwrap_or_default();
    writeln!(
        out,
        "<a class=\"wrapper {class}\" href=\"#{id}\">\
         <div class=\"subpath\">{title}</div>\
         <div class=\"progress\"><progress value=\"{progress:.1}\" max=\"100\"></progress></div>\
         <div class=\"percent\">{pct}</div>\
         <div class=\"statements\">{covered}/{total}</div></a>",
        id = escape_html(&item.id),
        title = escape_html(&item.title),
        progress = item.percentage,
        pct = percent(item.percentage),
        covered = item.counts.covered,
        total = item.counts.statements,
    )?;
    Ok(())
}

fn write_line<W: Write>(
    out: &mut W,
    number: usize,
    annotation: LineAnnotation,
    text: &str,
) -> Result<()> {
    let class = annotation.css_class();
    let count = match annotation {
        LineAnnotation::Covered(count) => format!("{count}x"),
        _ => String::new(),
    };
    writeln!(
        out,
        "<div class=\"line-number\">{number}</div>\
         <div class=\"covered-count {class}\">{count}</div>\
         <pre class=\"line {class}\">{}</pre>",
        escape_code(text)
    )?;
    Ok(())
}

/// Write the projected views as pretty-printed JSON.
pub fn write_json<W: Write>(report: &Report, out: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

const STYLE: &str = r#"
body { font-family: Menlo, monospace; background-color: #1e1e1e; color: #cfcfcf; }
a { text-decoration: none; color: #4d9fff; }
footer { padding: 1rem; opacity: 0.6; font-size: 0.8em; }
.view .links { font-size: 0.8em; padding: 1rem; display: flex; flex-wrap: wrap; align-items: center; }
.view .links a:not(:last-child)::after { content: "/"; color: #888; padding: 0 2px; }
.view .links a:last-child { color: #cfcfcf; font-weight: bold; }
.view .summary { padding: 0 1rem 2rem 1rem; display: flex; align-items: center; gap: 1rem; }
.view .summary .label { opacity: 0.8; }
.view .summary .stmts { border: 1px solid #555; border-radius: 4px; background-color: #3a3a3a; padding: 2px 4px; }
.lines { display: grid; grid-template-columns: 3em 3em auto; margin-bottom: 3rem; }
.lines .line-number, .lines .covered-count { font-size: 0.5em; display: flex; justify-content: flex-end; align-items: center; margin-right: 4px; padding-right: 4px; }
.lines .line-number { opacity: 0.6; }
.lines .covered-count { background-color: #3a3a3a; }
.lines pre { margin: 0; line-height: 1.5em; height: 1.5em; }
.lines .uncovered { background-color: rgba(255, 0, 0, 0.4); }
.lines .covered-count.covered { background-color: rgba(0, 255, 0, 0.4); color: #00ff00; }
.items { margin: 0 1rem 3rem 1rem; display: grid; grid-template-columns: auto max-content max-content max-content; gap: 1px; }
.items .wrapper { display: contents; text-align: right; }
.items .wrapper > * { padding: 8px 1rem; color: #cfcfcf; }
.items .wrapper .subpath { text-align: left; }
.items .wrapper.danger > * { background-color: rgba(255, 0, 0, 0.4); --accent-color: red; }
.items .wrapper.warning > * { background-color: rgba(255, 255, 0, 0.2); --accent-color: orange; }
.items .wrapper.safe > * { background-color: rgba(0, 255, 0, 0.4); --accent-color: green; }
progress { appearance: none; border: 1px solid #888; }
progress::-webkit-progress-bar { background-color: #333; }
progress::-webkit-progress-value { background-color: var(--accent-color, #888); }
progress::-moz-progress-bar { background-color: var(--accent-color, #888); }
"#;

const SCRIPT: &str = r#"
const hashID = () => {
  const raw = window.location.hash.substring(1);
  try {
    return decodeURIComponent(raw);
  } catch (e) {
    return raw;
  }
};
const renderView = () => {
  for (const view of document.getElementsByClassName('view')) {
    view.style.display = 'none';
  }
  const id = window.location.hash ? hashID() : initialID;
  const target = document.getElementById(id) || document.getElementById(initialID);
  if (target) {
    target.style.display = 'block';
  }
};
window.addEventListener('hashchange', renderView);
renderView();
"#;
