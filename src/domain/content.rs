//! Structured section content.
//!
//! Generators return sections as small HTML fragments. html5ever (through
//! `scraper`) repairs the markup and decodes entities; the resulting node
//! tree is folded into heading/paragraph/list/table blocks so every output
//! format comes from one mapper. Only the report tag whitelist is
//! understood; any other element is dropped while its text is kept.

use scraper::{ElementRef, Html, Node};

/// Priority marker carried by `<span class="priority-*">`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    fn from_class(class: &str) -> Option<Self> {
        class.split_whitespace().find_map(|c| match c {
            "priority-high" => Some(PriorityLevel::High),
            "priority-medium" => Some(PriorityLevel::Medium),
            "priority-low" => Some(PriorityLevel::Low),
            _ => None,
        })
    }

    pub fn class(&self) -> &'static str {
        match self {
            PriorityLevel::High => "priority-high",
            PriorityLevel::Medium => "priority-medium",
            PriorityLevel::Low => "priority-low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Priority { level: PriorityLevel, content: Vec<Inline> },
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub header: bool,
    pub cells: Vec<Vec<Inline>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(Vec<Inline>),
    Paragraph(Vec<Inline>),
    List(Vec<Vec<Inline>>),
    Ordered(Vec<Vec<Inline>>),
    Table(Vec<TableRow>),
}

// ---------------------------------------------------------------------------
// Tree builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Strong,
    Emphasis,
    Priority(PriorityLevel),
    Transparent,
}

impl FrameKind {
    fn closes_with(&self, tag: &str) -> bool {
        match self {
            FrameKind::Strong => matches!(tag, "strong" | "b"),
            FrameKind::Emphasis => matches!(tag, "em" | "i"),
            FrameKind::Priority(_) | FrameKind::Transparent => tag == "span",
            FrameKind::Root => false,
        }
    }
}

/// Nested inline formatting currently open.
struct InlineStack {
    frames: Vec<(FrameKind, Vec<Inline>)>,
}

impl InlineStack {
    fn new() -> Self {
        Self { frames: vec![(FrameKind::Root, Vec::new())] }
    }

    fn push_inline(&mut self, inline: Inline) {
        if let Some((_, children)) = self.frames.last_mut() {
            children.push(inline);
        }
    }

    fn open(&mut self, kind: FrameKind) {
        self.frames.push((kind, Vec::new()));
    }

    fn close(&mut self, tag: &str) {
        let Some(position) = self.frames.iter().rposition(|(kind, _)| kind.closes_with(tag)) else {
            return;
        };
        while self.frames.len() > position {
            self.fold_top();
        }
    }

    fn fold_top(&mut self) {
        if self.frames.len() <= 1 {
            return;
        }
        let Some((kind, children)) = self.frames.pop() else {
            return;
        };
        let folded = match kind {
            FrameKind::Strong => vec![Inline::Strong(children)],
            FrameKind::Emphasis => vec![Inline::Emphasis(children)],
            FrameKind::Priority(level) => vec![Inline::Priority { level, content: children }],
            FrameKind::Transparent | FrameKind::Root => children,
        };
        if let Some((_, parent)) = self.frames.last_mut() {
            parent.extend(folded);
        }
    }

    fn has_content(&self) -> bool {
        self.frames.iter().any(|(_, children)| !children.is_empty())
    }

    /// Close every open frame and return normalized inline content.
    fn take(&mut self) -> Vec<Inline> {
        while self.frames.len() > 1 {
            self.fold_top();
        }
        let children = std::mem::take(&mut self.frames[0].1);
        trim_edges(normalize(children))
    }
}

enum Container {
    None,
    Heading,
    Paragraph,
    List { ordered: bool, items: Vec<Vec<Inline>>, in_item: bool },
    Table { rows: Vec<TableRow>, row: Option<TableRow>, cell_header: Option<bool> },
}

struct Builder {
    blocks: Vec<Block>,
    container: Container,
    inline: InlineStack,
}

impl Builder {
    fn new() -> Self {
        Self { blocks: Vec::new(), container: Container::None, inline: InlineStack::new() }
    }

    fn finish_container(&mut self) {
        match std::mem::replace(&mut self.container, Container::None) {
            Container::None => {
                if self.inline.has_content() {
                    let content = self.inline.take();
                    if !content.is_empty() {
                        self.blocks.push(Block::Paragraph(content));
                    }
                }
            }
            Container::Heading => {
                let content = self.inline.take();
                if !content.is_empty() {
                    self.blocks.push(Block::Heading(content));
                }
            }
            Container::Paragraph => {
                let content = self.inline.take();
                if !content.is_empty() {
                    self.blocks.push(Block::Paragraph(content));
                }
            }
            Container::List { ordered, mut items, in_item } => {
                if in_item {
                    let content = self.inline.take();
                    if !content.is_empty() {
                        items.push(content);
                    }
                }
                self.inline = InlineStack::new();
                if !items.is_empty() {
                    self.blocks.push(if ordered { Block::Ordered(items) } else { Block::List(items) });
                }
            }
            Container::Table { mut rows, mut row, cell_header } => {
                if let Some(header) = cell_header {
                    let content = self.inline.take();
                    row.get_or_insert_with(|| TableRow { header, cells: Vec::new() })
                        .cells
                        .push(content);
                }
                if let Some(row) = row.filter(|r| !r.cells.is_empty()) {
                    rows.push(row);
                }
                self.inline = InlineStack::new();
                if !rows.is_empty() {
                    self.blocks.push(Block::Table(rows));
                }
            }
        }
    }

    /// Make sure inline content has somewhere to go; returns false when it must be dropped.
    fn ensure_inline_target(&mut self) -> bool {
        if matches!(self.container, Container::None) {
            self.container = Container::Paragraph;
            return true;
        }
        match &mut self.container {
            Container::None | Container::Heading | Container::Paragraph => true,
            Container::List { in_item, .. } => {
                *in_item = true;
                true
            }
            Container::Table { cell_header, .. } => cell_header.is_some(),
        }
    }

    fn text(&mut self, text: String) {
        let inside = match &self.container {
            Container::None => false,
            Container::List { in_item, .. } => *in_item,
            Container::Table { cell_header, .. } => cell_header.is_some(),
            Container::Heading | Container::Paragraph => true,
        };
        if !inside && text.trim().is_empty() {
            return;
        }
        if self.ensure_inline_target() {
            self.inline.push_inline(Inline::Text(text));
        }
    }

    fn open_inline(&mut self, kind: FrameKind) {
        if self.ensure_inline_target() {
            self.inline.open(kind);
        }
    }

    fn open(&mut self, name: &str, class: Option<&str>) {
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.finish_container();
                self.container = Container::Heading;
            }
            "p" => {
                // paragraphs inside an item or cell only contribute their text
                if matches!(
                    self.container,
                    Container::List { in_item: true, .. }
                        | Container::Table { cell_header: Some(_), .. }
                ) {
                    return;
                }
                self.finish_container();
                self.container = Container::Paragraph;
            }
            "ul" | "ol" => {
                self.finish_container();
                self.container =
                    Container::List { ordered: name == "ol", items: Vec::new(), in_item: false };
            }
            "li" => {
                if !matches!(self.container, Container::List { .. }) {
                    self.finish_container();
                    self.container =
                        Container::List { ordered: false, items: Vec::new(), in_item: false };
                }
                self.close_list_item();
                if let Container::List { in_item, .. } = &mut self.container {
                    *in_item = true;
                }
            }
            "table" => {
                self.finish_container();
                self.container = Container::Table { rows: Vec::new(), row: None, cell_header: None };
            }
            "tr" => {
                if !matches!(self.container, Container::Table { .. }) {
                    return;
                }
                self.close_table_row();
            }
            "th" | "td" => {
                if !matches!(self.container, Container::Table { .. }) {
                    return;
                }
                self.close_table_cell();
                if let Container::Table { cell_header, .. } = &mut self.container {
                    *cell_header = Some(name == "th");
                }
            }
            "strong" | "b" => self.open_inline(FrameKind::Strong),
            "em" | "i" => self.open_inline(FrameKind::Emphasis),
            "span" => {
                let kind = class
                    .and_then(PriorityLevel::from_class)
                    .map(FrameKind::Priority)
                    .unwrap_or(FrameKind::Transparent);
                self.open_inline(kind);
            }
            "br" => {
                if self.ensure_inline_target() {
                    self.inline.push_inline(Inline::LineBreak);
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if matches!(self.container, Container::Heading) {
                    self.finish_container();
                }
            }
            "p" => {
                if matches!(self.container, Container::Paragraph) {
                    self.finish_container();
                }
            }
            "ul" | "ol" => {
                if matches!(self.container, Container::List { .. }) {
                    self.finish_container();
                }
            }
            "li" => self.close_list_item(),
            "table" => {
                if matches!(self.container, Container::Table { .. }) {
                    self.finish_container();
                }
            }
            "tr" => self.close_table_row(),
            "th" | "td" => self.close_table_cell(),
            "strong" | "b" | "em" | "i" | "span" => self.inline.close(name),
            _ => {}
        }
    }

    fn close_list_item(&mut self) {
        let Container::List { items, in_item, .. } = &mut self.container else {
            return;
        };
        if *in_item {
            let content = self.inline.take();
            if !content.is_empty() {
                items.push(content);
            }
            *in_item = false;
        }
    }

    fn close_table_cell(&mut self) {
        let Container::Table { row, cell_header, .. } = &mut self.container else {
            return;
        };
        if let Some(header) = cell_header.take() {
            let content = self.inline.take();
            let row = row.get_or_insert_with(|| TableRow { header, cells: Vec::new() });
            row.header &= header;
            row.cells.push(content);
        }
    }

    fn close_table_row(&mut self) {
        self.close_table_cell();
        let Container::Table { rows, row, .. } = &mut self.container else {
            return;
        };
        if let Some(finished) = row.take().filter(|r| !r.cells.is_empty()) {
            rows.push(finished);
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.finish_container();
        self.blocks
    }
}

/// Collapse whitespace runs and merge adjacent text.
///
/// Edge whitespace is kept inside nested formatting so that spacing between
/// words survives; `trim_edges` removes it once at block level.
fn normalize(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => {
                let collapsed = collapse_whitespace(&text);
                if collapsed.is_empty() {
                    continue;
                }
                if let Some(Inline::Text(prev)) = out.last_mut() {
                    if prev.ends_with(' ') && collapsed.starts_with(' ') {
                        prev.push_str(&collapsed[1..]);
                    } else {
                        prev.push_str(&collapsed);
                    }
                } else {
                    out.push(Inline::Text(collapsed));
                }
            }
            Inline::Strong(children) => push_nonempty(&mut out, normalize(children), Inline::Strong),
            Inline::Emphasis(children) => {
                push_nonempty(&mut out, normalize(children), Inline::Emphasis)
            }
            Inline::Priority { level, content } => {
                push_nonempty(&mut out, normalize(content), |content| Inline::Priority {
                    level,
                    content,
                })
            }
            Inline::LineBreak => out.push(Inline::LineBreak),
        }
    }
    out
}

/// Wrap formatted children; whitespace-only formatting collapses to one space.
fn push_nonempty(
    out: &mut Vec<Inline>,
    children: Vec<Inline>,
    wrap: impl FnOnce(Vec<Inline>) -> Inline,
) {
    let blank = children
        .iter()
        .all(|child| matches!(child, Inline::Text(text) if text.trim().is_empty()));
    if !blank {
        out.push(wrap(children));
        return;
    }
    let after_space = matches!(out.last(), Some(Inline::Text(prev)) if prev.ends_with(' '));
    if !children.is_empty() && !after_space {
        out.push(Inline::Text(" ".to_string()));
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn trim_start(inlines: &mut Vec<Inline>) {
    while matches!(inlines.first(), Some(Inline::LineBreak)) {
        inlines.remove(0);
    }
    let emptied = match inlines.first_mut() {
        Some(Inline::Text(text)) => {
            *text = text.trim_start().to_string();
            text.is_empty()
        }
        Some(
            Inline::Strong(children)
            | Inline::Emphasis(children)
            | Inline::Priority { content: children, .. },
        ) => {
            trim_start(children);
            children.is_empty()
        }
        _ => false,
    };
    if emptied {
        inlines.remove(0);
        trim_start(inlines);
    }
}

fn trim_end(inlines: &mut Vec<Inline>) {
    while matches!(inlines.last(), Some(Inline::LineBreak)) {
        inlines.pop();
    }
    let emptied = match inlines.last_mut() {
        Some(Inline::Text(text)) => {
            *text = text.trim_end().to_string();
            text.is_empty()
        }
        Some(
            Inline::Strong(children)
            | Inline::Emphasis(children)
            | Inline::Priority { content: children, .. },
        ) => {
            trim_end(children);
            children.is_empty()
        }
        _ => false,
    };
    if emptied {
        inlines.pop();
        trim_end(inlines);
    }
}

fn trim_edges(mut inlines: Vec<Inline>) -> Vec<Inline> {
    trim_start(&mut inlines);
    trim_end(&mut inlines);
    inlines
}

fn walk(element: ElementRef<'_>, builder: &mut Builder) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => builder.text(String::from(&**text)),
            Node::Element(node) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    let name = node.name();
                    builder.open(name, node.attr("class"));
                    walk(child_element, builder);
                    builder.close(name);
                }
            }
            _ => {}
        }
    }
}

/// Parse a whitelisted HTML fragment into blocks.
pub fn parse_fragment(html: &str) -> Vec<Block> {
    let fragment = Html::parse_fragment(html);
    let mut builder = Builder::new();
    walk(fragment.root_element(), &mut builder);
    builder.finish()
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

fn inline_markdown(inlines: &[Inline], in_table: bool) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => {
                if in_table {
                    out.push_str(&text.replace('|', "\\|"));
                } else {
                    out.push_str(text);
                }
            }
            Inline::Strong(children) => {
                push_delimited(&mut out, &inline_markdown(children, in_table), "**")
            }
            Inline::Emphasis(children) => {
                push_delimited(&mut out, &inline_markdown(children, in_table), "*")
            }
            Inline::Priority { content, .. } => out.push_str(&inline_markdown(content, in_table)),
            Inline::LineBreak => out.push_str(if in_table { " " } else { "\n" }),
        }
    }
    out
}

/// Wrap `inner` in `marker`, keeping edge whitespace outside the delimiters.
fn push_delimited(out: &mut String, inner: &str, marker: &str) {
    let core = inner.trim();
    if core.is_empty() {
        out.push_str(inner);
        return;
    }
    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];
    out.push_str(leading);
    out.push_str(marker);
    out.push_str(core);
    out.push_str(marker);
    out.push_str(trailing);
}

fn table_markdown(rows: &[TableRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (index, row) in rows.iter().enumerate() {
        let cells: Vec<String> =
            row.cells.iter().map(|cell| inline_markdown(cell, true).trim().to_string()).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
        if index == 0 {
            let separator = vec!["---"; cells.len()];
            lines.push(format!("| {} |", separator.join(" | ")));
        }
    }
    lines.join("\n")
}

/// Render blocks as Markdown.
pub fn to_markdown(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|block| match block {
            Block::Heading(content) => format!("### {}", inline_markdown(content, false)),
            Block::Paragraph(content) => inline_markdown(content, false),
            Block::List(items) => items
                .iter()
                .map(|item| format!("- {}", inline_markdown(item, false)))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Ordered(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, inline_markdown(item, false)))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Table(rows) => table_markdown(rows),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Convert an HTML section fragment straight to Markdown.
pub fn fragment_to_markdown(html: &str) -> String {
    to_markdown(&parse_fragment(html))
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn inline_html(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&escape_html(text)),
            Inline::Strong(children) => {
                out.push_str(&format!("<strong>{}</strong>", inline_html(children)))
            }
            Inline::Emphasis(children) => out.push_str(&format!("<em>{}</em>", inline_html(children))),
            Inline::Priority { level, content } => out.push_str(&format!(
                "<span class=\"{}\">{}</span>",
                level.class(),
                inline_html(content)
            )),
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
    out
}

/// Render blocks as sanitized, whitelisted HTML.
pub fn to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Heading(content) => out.push_str(&format!("<h4>{}</h4>\n", inline_html(content))),
            Block::Paragraph(content) => out.push_str(&format!("<p>{}</p>\n", inline_html(content))),
            Block::List(items) | Block::Ordered(items) => {
                let tag = if matches!(block, Block::Ordered(_)) { "ol" } else { "ul" };
                out.push_str(&format!("<{}>\n", tag));
                for item in items {
                    out.push_str(&format!("<li>{}</li>\n", inline_html(item)));
                }
                out.push_str(&format!("</{}>\n", tag));
            }
            Block::Table(rows) => {
                out.push_str("<table>\n");
                for row in rows {
                    let tag = if row.header { "th" } else { "td" };
                    out.push_str("<tr>");
                    for cell in &row.cells {
                        out.push_str(&format!("<{tag}>{}</{tag}>", inline_html(cell)));
                    }
                    out.push_str("</tr>\n");
                }
                out.push_str("</table>\n");
            }
        }
    }
    out
}

/// Plain text of inline content, formatting dropped.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(children) | Inline::Emphasis(children) => {
                out.push_str(&plain_text(children))
            }
            Inline::Priority { content, .. } => out.push_str(&plain_text(content)),
            Inline::LineBreak => out.push(' '),
        }
    }
    out
}
