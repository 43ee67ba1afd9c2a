use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::colors::{CSS_COLORS, ColorLookup};
use crate::config::ExportConfig;
use crate::enhance::{AuthorColors, TextEnhancer, escape_html};
use crate::error::Result;
use crate::model::{Author, ColorToken, Document, LogLine, Role, Slice, Theme};

/// Author cell content for a line repeating the previous line's author.
pub const CONTINUATION_MARK: &str = "&#8627;";

struct Palette {
    background: &'static str,
    foreground: &'static str,
    muted: &'static str,
    link: &'static str,
}

impl Palette {
    fn of(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: "#1b1d1e",
                foreground: "Beige",
                muted: "DimGrey",
                link: "LightSkyBlue",
            },
            Theme::Light => Self {
                background: "White",
                foreground: "DarkSlateGrey",
                muted: "LightSlateGrey",
                link: "RoyalBlue",
            },
        }
    }
}

/// State of one render call.
pub struct RenderContext<'a> {
    lookup: &'a dyn ColorLookup,
    authors: AuthorColors,
    last_prefix: Option<String>,
    current_day: Option<NaiveDate>,
}

impl<'a> RenderContext<'a> {
    pub fn new(lookup: &'a dyn ColorLookup) -> Self {
        Self {
            lookup,
            authors: AuthorColors::new(),
            last_prefix: None,
            current_day: None,
        }
    }

    /// Color of an author, looked up at most once per render call.
    pub fn author_color(&mut self, name: &str) -> ColorToken {
        if let Some(color) = self.authors.get(name) {
            return color.clone();
        }
        let color = self.lookup.color_of(name);
        self.authors.insert(name.to_string(), color.clone());
        color
    }

    pub fn authors(&self) -> &AuthorColors {
        &self.authors
    }

    fn learn_authors(&mut self, slice: &Slice) {
        for line in slice {
            if let Author::Human { name, .. } = Author::classify(&line.prefix) {
                self.author_color(name);
            }
        }
    }

    /// Records `prefix` and tells whether it repeats the previous line's.
    fn is_continuation(&mut self, prefix: &str, author: &Author<'_>) -> bool {
        let repeated = self.last_prefix.as_deref() == Some(prefix);
        self.last_prefix = Some(prefix.to_string());
        repeated && !author.is_event()
    }

    /// Records `day` and tells whether a new day section starts with it.
    fn enter_day(&mut self, day: NaiveDate) -> bool {
        let changed = self.current_day != Some(day);
        self.current_day = Some(day);
        changed
    }
}

/// Renders the body: one heading and table per calendar day in `tz`.
pub fn render_body<Tz: TimeZone>(slice: &Slice, lookup: &dyn ColorLookup, tz: &Tz) -> String {
    let mut ctx = RenderContext::new(lookup);
    // Every author has to be known before any body is highlighted.
    ctx.learn_authors(slice);
    let enhancer = TextEnhancer::new(ctx.authors());

    let mut output = String::new();
    for line in slice {
        let local = local_time(line.timestamp, tz);
        let day = local.date_naive();
        if ctx.enter_day(day) {
            if !output.is_empty() {
                output.push_str("</table>\n");
            }
            let _ = writeln!(output, "<h2 class=\"day\">{}</h2>", day.format("%Y-%m-%d"));
            output.push_str("<table class=\"backlog\">\n");
        }

        let time = local.naive_local().format("%H:%M:%S").to_string();
        render_row(&mut output, &mut ctx, &enhancer, line, &time);
    }

    if !output.is_empty() {
        output.push_str("</table>\n");
    }
    output
}

fn render_row(
    output: &mut String,
    ctx: &mut RenderContext<'_>,
    enhancer: &TextEnhancer,
    line: &LogLine,
    time: &str,
) {
    let author = Author::classify(&line.prefix);
    let continuation = ctx.is_continuation(&line.prefix, &author);
    let message = enhancer.enhance(&escape_html(&line.text));

    let (row_class, author_cell) = match &author {
        Author::Event => (
            "event",
            format!(
                "<td class=\"author {}\">{}</td>",
                ColorToken::default_color().css_class(),
                escape_html(&line.prefix)
            ),
        ),
        Author::Human { .. } if continuation => {
            let color = author_name(&author).map(|name| ctx.author_color(name));
            (
                "message",
                format!(
                    "<td class=\"author continuation {}\">{CONTINUATION_MARK}</td>",
                    color.unwrap_or_else(ColorToken::default_color).css_class()
                ),
            )
        }
        Author::Human { role, marker, name } => {
            let color = ctx.author_color(name);
            let role_span = match (role, marker) {
                (Role::None, _) | (_, None) => String::new(),
                (role, Some(marker)) => format!(
                    "<span class=\"role role-{role}\">{}</span>",
                    escape_html(&marker.to_string())
                ),
            };
            (
                "message",
                format!(
                    "<td class=\"author {}\">{role_span}{}</td>",
                    color.css_class(),
                    escape_html(name)
                ),
            )
        }
    };

    let _ = writeln!(
        output,
        "<tr class=\"{row_class}\"><td class=\"time\">{time}</td>{author_cell}<td class=\"body\">{message}</td></tr>"
    );
}

fn author_name<'a>(author: &Author<'a>) -> Option<&'a str> {
    match author {
        Author::Human { name, .. } => Some(name),
        Author::Event => None,
    }
}

fn local_time<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> DateTime<Tz> {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .with_timezone(tz)
}

fn stylesheet(theme: Theme) -> String {
    let palette = Palette::of(theme);
    let mut css = String::new();

    let _ = write!(
        css,
        "body {{\n\tbackground-color: {bg};\n\tcolor: {fg};\n\tfont-family: monospace;\n}}\n\
         a {{\n\tcolor: {link};\n}}\n\
         h2.day {{\n\tfont-size: 1em;\n\tcolor: {muted};\n\tborder-bottom: 1px solid {muted};\n}}\n\
         table.backlog {{\n\tborder-collapse: collapse;\n}}\n\
         td {{\n\tvertical-align: top;\n\tpadding: 0 0.5em;\n}}\n\
         td.time {{\n\tcolor: {muted};\n}}\n\
         td.author {{\n\ttext-align: right;\n\twhite-space: nowrap;\n\tborder-right: 1px solid {muted};\n}}\n\
         td.body {{\n\twhite-space: pre-wrap;\n}}\n\
         tr.event td.body {{\n\tfont-style: italic;\n\tcolor: {muted};\n}}\n\
         .role {{\n\tcolor: {muted};\n}}\n",
        bg = palette.background,
        fg = palette.foreground,
        muted = palette.muted,
        link = palette.link,
    );

    let _ = write!(
        css,
        ".color-{} {{\n\tcolor: {};\n}}\n",
        ColorToken::DEFAULT,
        palette.foreground
    );
    for (name, color) in CSS_COLORS {
        let _ = write!(css, ".color-{name} {{\n\tcolor: {color};\n}}\n");
    }
    css
}

/// Puts a rendered body into a complete themed HTML page.
pub fn wrap_document(body: &str, theme: Theme) -> Document {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Log export</title>\n<style>\n");
    html.push_str(&stylesheet(theme));
    html.push_str("</style>\n</head>\n");
    let _ = writeln!(html, "<body class=\"theme-{theme}\">");
    html.push_str(body);
    html.push_str("</body>\n</html>\n");
    Document::new(html)
}

/// Renders `slice` into a themed document.
pub fn render<Tz: TimeZone>(
    slice: &Slice,
    lookup: &dyn ColorLookup,
    config: &ExportConfig,
    tz: &Tz,
) -> Result<Document> {
    let theme = config.theme()?;
    let body = render_body(slice, lookup, tz);
    Ok(wrap_document(&body, theme))
}
