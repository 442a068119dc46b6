//! Markup rendering: document model → text
//!
//! Rendering is rule-per-element with an exhaustive match, so adding an
//! element kind forces a decision here. Output is clean, deterministic
//! markup; the `strip_formatting` option flattens inline styling for
//! token-economical downstream consumption.

use crate::document::*;
use crate::markup::frontmatter;

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Emit the metadata block when any field is populated.
    pub include_frontmatter: bool,
    /// Flatten all runs to plain text.
    pub strip_formatting: bool,
    /// Prepended to path-based image references when non-empty.
    pub image_path_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            include_frontmatter: true,
            strip_formatting: false,
            image_path_prefix: String::new(),
        }
    }
}

/// Render a document model to markup text.
pub fn render_markup(model: &DocumentModel, config: &RenderConfig) -> String {
    let mut parts = Vec::new();

    if config.include_frontmatter {
        if let Some(block) = frontmatter::render(&model.metadata) {
            parts.push(block);
        }
    }

    for element in &model.elements {
        let rendered = render_element(element, config);
        if !rendered.is_empty() {
            parts.push(rendered);
        }
    }

    parts.join("\n")
}

fn render_element(element: &Element, config: &RenderConfig) -> String {
    match &element.kind {
        ElementKind::Heading(heading) => {
            let level = heading.level.clamp(1, 4) as usize;
            format!("{} {}\n", "#".repeat(level), heading.text.trim())
        }
        ElementKind::Paragraph(para) => format!("{}\n", render_runs(&para.runs, config)),
        ElementKind::BulletItem(item) => {
            let indent = "  ".repeat(item.indent as usize);
            format!("{indent}- {}\n", render_runs(&item.runs, config))
        }
        ElementKind::NumberedItem(numbered) => {
            let indent = "  ".repeat(numbered.item.indent as usize);
            format!(
                "{indent}{}. {}\n",
                numbered.number,
                render_runs(&numbered.item.runs, config)
            )
        }
        ElementKind::Table(table) => render_table(table),
        ElementKind::Callout(callout) => render_callout(callout),
        ElementKind::Image(image) => render_image(image, config),
        ElementKind::Latex(latex) => {
            if latex.display {
                format!("$$\n{}\n$$\n", latex.source)
            } else {
                format!("${}$\n", latex.source)
            }
        }
        ElementKind::Separator => "---\n".to_string(),
    }
}

fn render_runs(runs: &[TextRun], config: &RenderConfig) -> String {
    if config.strip_formatting {
        return TextRun::plain_text(runs);
    }

    let mut out = String::new();
    for run in runs {
        let mut text = run.text.clone();
        if run.bold {
            text = format!("**{text}**");
        }
        if run.italic {
            text = format!("*{text}*");
        }
        if run.superscript {
            text = format!("^{text}^");
        }
        out.push_str(&text);
    }
    out
}

fn render_table(table: &Table) -> String {
    if table.rows.is_empty() {
        return String::new();
    }

    let mut lines = Vec::new();

    let header = &table.rows[0];
    let header_cells: Vec<String> = header.cells.iter().map(|c| escape_cell(&c.content)).collect();
    lines.push(format!("| {} |", header_cells.join(" | ")));

    let mut separators: Vec<&str> = table
        .alignments
        .iter()
        .map(|alignment| match alignment {
            Alignment::Left => "---",
            Alignment::Center => ":---:",
            Alignment::Right => "---:",
        })
        .collect();
    while separators.len() < header_cells.len() {
        separators.push("---");
    }
    separators.truncate(header_cells.len().max(1));
    lines.push(format!("| {} |", separators.join(" | ")));

    for row in &table.rows[1..] {
        let cells: Vec<String> = row.cells.iter().map(|c| escape_cell(&c.content)).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Escape literal pipes and flatten embedded newlines in a cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ").trim().to_string()
}

fn render_callout(callout: &Callout) -> String {
    let mut lines = vec![format!("> **[{}]**", callout.label.display())];
    for line in callout.text.split('\n') {
        if line.trim().is_empty() {
            lines.push(">".to_string());
        } else {
            lines.push(format!("> {line}"));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

fn render_image(image: &ImageRef, config: &RenderConfig) -> String {
    let alt = if image.alt.is_empty() { "Image" } else { &image.alt };
    match &image.source {
        ImageSource::Path(path) => {
            let path = if config.image_path_prefix.is_empty() {
                path.clone()
            } else {
                format!("{}/{path}", config.image_path_prefix.trim_end_matches('/'))
            };
            format!("![{alt}]({path})\n")
        }
        ImageSource::Base64 { mime, data } => {
            format!("![{alt}](data:{mime};base64,{data})\n")
        }
    }
}
