//! Label text: graphviz escape expansion, and conversion to TeX per text mode.

use crate::options::TexMode;
use crate::state::GraphicsState;
use crate::transform::fmt_num;
use crate::xdot::FontFlags;

/// Names substituted for the graphviz label escapes.
#[derive(Debug, Clone, Default)]
pub struct EscapeNames<'a> {
    /// `\N`
    pub node: Option<&'a str>,
    /// `\G`
    pub graph: Option<&'a str>,
    /// `\T` and `\H`
    pub tail: Option<&'a str>,
    pub head: Option<&'a str>,
    /// "->" or "--", for `\E`
    pub edge_op: &'a str,
}

/// Expand `\N`, `\G`, `\E`, `\T` and `\H`, and turn the `\n`, `\l` and `\r` line breaks
/// into newlines.
pub fn expand_escapes(label: &str, names: &EscapeNames<'_>) -> String {
    let mut text = String::with_capacity(label.len());
    let mut chars = label.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('N') => text.push_str(names.node.unwrap_or("")),
            Some('G') => text.push_str(names.graph.unwrap_or("")),
            Some('T') => text.push_str(names.tail.unwrap_or("")),
            Some('H') => text.push_str(names.head.unwrap_or("")),
            Some('E') => {
                if let (Some(tail), Some(head)) = (names.tail, names.head) {
                    text.push_str(&format!("{tail}{}{head}", names.edge_op));
                }
            }
            Some('n') | Some('l') | Some('r') => text.push('\n'),
            Some(other) => {
                text.push('\\');
                text.push(other);
            }
            None => {
                text.push('\\');
                continue;
            }
        }
        chars.next();
    }

    // A trailing line break only terminates the last line.
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Escape characters that are special to TeX.
pub fn escape_tex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\textbackslash{}"),
            '{' | '}' | '$' | '&' | '#' | '_' | '%' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '^' => escaped.push_str("\\^{}"),
            '~' => escaped.push_str("\\~{}"),
            '<' | '>' | '|' => {
                escaped.push('$');
                escaped.push(c);
                escaped.push('$');
            }
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Convert label text to TeX.  Newlines become stacked lines.
pub fn format_label(text: &str, mode: TexMode) -> String {
    let lines = text
        .split('\n')
        .map(|line| match mode {
            TexMode::Verbatim => escape_tex(line),
            TexMode::Math => {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("${line}$")
                }
            }
            TexMode::Raw => line.to_string(),
        })
        .collect::<Vec<_>>();

    if lines.len() > 1 {
        format!("\\shortstack{{{}}}", lines.join("\\\\"))
    } else {
        lines.concat()
    }
}

/// Wrap text in the font size and font characteristics of the graphics state.
pub fn styled_text(text: &str, state: &GraphicsState) -> String {
    let flags = state.font_flags;
    let mut styled = text.to_string();

    if flags.contains(FontFlags::UNDERLINE) {
        styled = format!("\\underline{{{styled}}}");
    }
    if flags.contains(FontFlags::SUPERSCRIPT) {
        styled = format!("\\textsuperscript{{{styled}}}");
    }
    if flags.contains(FontFlags::SUBSCRIPT) {
        styled = format!("\\textsubscript{{{styled}}}");
    }
    let mut switches = String::new();
    if flags.contains(FontFlags::BOLD) {
        switches.push_str("\\bfseries");
    }
    if flags.contains(FontFlags::ITALIC) {
        switches.push_str("\\itshape");
    }
    let size = state.font_size;

    format!(
        "{{\\fontsize{{{}bp}}{{{}bp}}\\selectfont{switches} {styled}}}",
        fmt_num(size),
        fmt_num(size * 1.2)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_escapes() {
        let names = EscapeNames {
            node: Some("a"),
            graph: Some("G"),
            tail: Some("a"),
            head: Some("b"),
            edge_op: "->",
        };

        assert_eq!(expand_escapes("\\N", &names), "a");
        assert_eq!(expand_escapes("\\E in \\G", &names), "a->b in G");
        assert_eq!(expand_escapes("one\\ltwo\\n", &names), "one\ntwo");
        assert_eq!(expand_escapes("\\x\\", &names), "\\x\\");
    }

    #[test]
    fn test_escape_tex() {
        assert_eq!(escape_tex("a_1 & 50%"), "a\\_1 \\& 50\\%");
        assert_eq!(escape_tex("{x}"), "\\{x\\}");
        assert_eq!(escape_tex("a\\b"), "a\\textbackslash{}b");
        assert_eq!(escape_tex("x<y"), "x$<$y");
        assert_eq!(escape_tex("~^"), "\\~{}\\^{}");
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label("a_1", TexMode::Verbatim), "a\\_1");
        assert_eq!(format_label("a_1", TexMode::Math), "$a_1$");
        assert_eq!(format_label("\\alpha", TexMode::Raw), "\\alpha");
        assert_eq!(
            format_label("one\ntwo", TexMode::Verbatim),
            "\\shortstack{one\\\\two}"
        );
    }

    #[test]
    fn test_styled_text() {
        let mut state = GraphicsState::default();
        assert_eq!(styled_text("a", &state), "{\\fontsize{14bp}{16.8bp}\\selectfont a}");

        state.font_flags = FontFlags(FontFlags::BOLD | FontFlags::UNDERLINE);
        assert_eq!(
            styled_text("a", &state),
            "{\\fontsize{14bp}{16.8bp}\\selectfont\\bfseries \\underline{a}}"
        );
    }
}
