//! File and patch pane rendering
//!
//! Emitted files get light C highlighting; patches colour added and removed
//! lines. Both use a character scanner rather than the real lexer, so
//! partial or odd text never fails to render.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// What the pane is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceView {
    File,
    Patch,
}

/// Simple syntax highlighting for one line of emitted C
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    // Whole-line constructs
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") || trimmed.starts_with('#') {
        return Line::from(Span::styled(line, Style::default().fg(DEFAULT_THEME.comment)));
    }

    while i < chars.len() {
        let c = chars[i];

        if c == '"' || c == '\'' {
            if !current_word.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_word)));
            }
            let mut end = i + 1;
            while end < chars.len() && chars[end] != c {
                end += if chars[end] == '\\' { 2 } else { 1 };
            }
            end = (end + 1).min(chars.len());
            spans.push(Span::styled(
                chars[i..end].iter().collect::<String>(),
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        if !c.is_alphanumeric() && c != '_' {
            if !current_word.is_empty() {
                let style = word_style(&current_word, c == '(');
                spans.push(Span::styled(std::mem::take(&mut current_word), style));
            }
            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    if !current_word.is_empty() {
        let style = word_style(&current_word, false);
        spans.push(Span::styled(current_word, style));
    }

    Line::from(spans)
}

fn word_style(word: &str, is_function: bool) -> Style {
    match word {
        "int" | "char" | "void" | "float" | "double" | "long" | "short" | "unsigned" | "signed"
        | "uchar" | "ushort" | "uint" | "ulong" | "vlong" | "uvlong" => {
            Style::default().fg(DEFAULT_THEME.type_name)
        }
        "static" | "extern" | "register" | "const" | "struct" | "union" | "enum" | "typedef"
        | "return" | "if" | "else" | "while" | "for" | "do" | "switch" | "case" | "default"
        | "break" | "continue" | "goto" | "sizeof" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "nil" => Style::default().fg(DEFAULT_THEME.number),
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_function => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Colour a unified diff line by its prefix
fn highlight_patch_line(line: &str) -> Line<'_> {
    let style = if line.starts_with("+++") || line.starts_with("---") || line.starts_with("diff ")
    {
        Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::BOLD)
    } else if line.starts_with("@@") {
        Style::default().fg(DEFAULT_THEME.secondary)
    } else if line.starts_with('+') {
        Style::default().fg(DEFAULT_THEME.added)
    } else if line.starts_with('-') {
        Style::default().fg(DEFAULT_THEME.removed)
    } else if line.starts_with("Only in") {
        Style::default().fg(DEFAULT_THEME.primary)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    };
    Line::from(Span::styled(line, style))
}

/// Render `text` with line numbers, starting at `*scroll` (clamped here)
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    text: &str,
    view: SourceView,
    is_focused: bool,
    scroll: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style);

    if text.is_empty() {
        let empty = match view {
            SourceView::File => "(empty file)",
            SourceView::Patch => "(no changes)",
        };
        let paragraph = Paragraph::new(empty)
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<&str> = text.lines().collect();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders
    let max_scroll = lines.len().saturating_sub(visible_height);
    *scroll = (*scroll).min(max_scroll);

    let visible: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(idx, line)| {
            let content = match view {
                SourceView::File => highlight_source_code(line),
                SourceView::Patch => highlight_patch_line(line),
            };
            let mut spans = vec![Span::styled(
                format!("{:4} ", idx + 1),
                Style::default().fg(DEFAULT_THEME.comment),
            )];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlighting_keeps_text_intact() {
        let line = "\tif(p == nil) return \"a\\\"b\";";
        assert_eq!(text_of(&highlight_source_code(line)), line);
    }

    #[test]
    fn test_patch_lines_coloured_by_prefix() {
        assert_eq!(
            highlight_patch_line("+int x;").spans[0].style.fg,
            Some(DEFAULT_THEME.added)
        );
        assert_eq!(
            highlight_patch_line("-int x;").spans[0].style.fg,
            Some(DEFAULT_THEME.removed)
        );
        assert_eq!(
            highlight_patch_line("+++ l.1/a.c").spans[0].style.fg,
            Some(DEFAULT_THEME.comment)
        );
    }
}
