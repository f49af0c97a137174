//! Syntax highlighting into ratatui `Text`.
//!
//! HTTP messages are split at the first blank line: the start line and
//! headers get fixed styles, the body goes through syntect with a syntax
//! guessed from its first character. Scripts are highlighted as JavaScript.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const FALLBACK_THEME: &str = "base16-ocean.dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Http,
    JavaScript,
}

/// True when syntect ships a theme with this name.
pub fn theme_exists(name: &str) -> bool {
    THEME_SET.themes.contains_key(name)
}

fn theme(name: &str) -> Option<&'static Theme> {
    THEME_SET
        .themes
        .get(name)
        .or_else(|| THEME_SET.themes.get(FALLBACK_THEME))
}

pub fn highlight(text: &str, lang: Lang, theme_name: &str) -> Text<'static> {
    match lang {
        Lang::Http => highlight_http(text, theme_name),
        Lang::JavaScript => {
            let syntax = SYNTAX_SET.find_syntax_by_extension("js");
            Text::from(highlight_lines(text, syntax, theme_name))
        }
    }
}

fn highlight_http(text: &str, theme_name: &str) -> Text<'static> {
    let (head, body) = match text.split_once("\n\n") {
        Some((head, body)) => (head, Some(body)),
        None => (text, None),
    };

    let mut lines = Vec::new();
    for (i, line) in head.lines().enumerate() {
        if i == 0 {
            lines.push(start_line(line));
        } else {
            lines.push(header_line(line));
        }
    }

    if let Some(body) = body {
        lines.push(Line::default());
        let syntax = guess_body_syntax(body);
        lines.extend(highlight_lines(body, syntax, theme_name));
    }
    Text::from(lines)
}

fn start_line(line: &str) -> Line<'static> {
    let (first, rest) = line.split_once(' ').unwrap_or((line, ""));
    Line::from(vec![
        Span::styled(
            first.to_string(),
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            rest.to_string(),
            Style::default().fg(Color::LightCyan),
        ),
    ])
}

fn header_line(line: &str) -> Line<'static> {
    match line.split_once(':') {
        Some((name, value)) => Line::from(vec![
            Span::styled(name.to_string(), Style::default().fg(Color::LightBlue)),
            Span::styled(":", Style::default().fg(Color::DarkGray)),
            Span::raw(value.to_string()),
        ]),
        None => Line::raw(line.to_string()),
    }
}

fn guess_body_syntax(body: &str) -> Option<&'static SyntaxReference> {
    let ext = match body.trim_start().chars().next() {
        Some('{') | Some('[') => "json",
        Some('<') => "xml",
        _ => return None,
    };
    SYNTAX_SET.find_syntax_by_extension(ext)
}

fn highlight_lines(
    text: &str,
    syntax: Option<&'static SyntaxReference>,
    theme_name: &str,
) -> Vec<Line<'static>> {
    let (Some(syntax), Some(theme)) = (syntax, theme(theme_name)) else {
        return text.lines().map(|l| Line::raw(l.to_string())).collect();
    };

    let mut h = HighlightLines::new(syntax, theme);
    LinesWithEndings::from(text)
        .map(|line| {
            let ranges = h.highlight_line(line, &SYNTAX_SET).unwrap_or_default();
            if ranges.is_empty() {
                return Line::raw(line.trim_end_matches(['\r', '\n']).to_string());
            }
            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .map(|(style, content)| {
                    let fg = style.foreground;
                    Span::styled(
                        content.trim_end_matches(['\r', '\n']).to_string(),
                        Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Flatten styled text back to the plain string it displays.
pub fn plain_text(text: &Text<'_>) -> String {
    text.lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|s| s.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_highlight_preserves_text() {
        let src = "GET https://api.test/users\nAccept: application/json\n\n{\"a\": [1, 2]}";
        let text = highlight(src, Lang::Http, "base16-ocean.dark");
        assert_eq!(plain_text(&text), src);
    }

    #[test]
    fn test_http_highlight_without_body() {
        let src = "HTTP/1.1 204 No Content\nServer: test";
        let text = highlight(src, Lang::Http, "base16-ocean.dark");
        assert_eq!(text.lines.len(), 2);
        assert_eq!(plain_text(&text), src);
    }

    #[test]
    fn test_script_highlight_preserves_text() {
        let src = "client.log(\"hi\");\nconst x = 1;";
        let text = highlight(src, Lang::JavaScript, "base16-eighties.dark");
        assert_eq!(plain_text(&text), src);
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        assert!(!theme_exists("no-such-theme"));
        assert!(theme_exists("base16-ocean.dark"));
        let text = highlight("{\"a\": 1}", Lang::JavaScript, "no-such-theme");
        assert_eq!(plain_text(&text), "{\"a\": 1}");
    }

    #[test]
    fn test_start_line_spacing() {
        let line = start_line("GET");
        let content: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(content, "GET ");
    }
}
