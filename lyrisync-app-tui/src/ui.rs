//! Terminal rendering with `ratatui`.
//!
//! The lyrics pane shows the window computed by the sync engine; an optional
//! status line sits below it. The window is counted in timeline entries. With
//! wrapping on, an entry wider than the pane takes several rows and the rows
//! are then cropped around the highlighted entry.

use lyrisync_core::{
    format_clock, Alignment, LyricsOrigin, LyricsStatus, LyrisyncConfig, PlaybackStatus,
    RenderFrame, Session, TimelineEntry, UiConfig,
};
use std::borrow::Cow;

use ratatui::{
    layout::{Alignment as TextAlignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Colors and alignment for the lyrics pane
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub alignment: Alignment,
    pub active: Color,
    pub inactive: Color,
    pub show_status: bool,
    pub wrap: bool,
}

impl View {
    #[must_use]
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            alignment: ui.alignment,
            active: hex_color(&ui.active_color, Color::Green),
            inactive: hex_color(&ui.inactive_color, Color::Gray),
            show_status: ui.show_status,
            wrap: ui.wrap,
        }
    }

    pub fn cycle_alignment(&mut self) {
        self.alignment = self.alignment.next();
    }

    const fn text_alignment(&self) -> TextAlignment {
        match self.alignment {
            Alignment::Left => TextAlignment::Left,
            Alignment::Center => TextAlignment::Center,
            Alignment::Right => TextAlignment::Right,
        }
    }
}

fn hex_color(hex: &str, fallback: Color) -> Color {
    LyrisyncConfig::parse_color(hex).map_or(fallback, |(r, g, b)| Color::Rgb(r, g, b))
}

/// Split the screen into the lyrics pane and the status line
#[must_use]
pub fn layout(area: Rect, show_status: bool) -> (Rect, Option<Rect>) {
    if show_status && area.height > 1 {
        let [lyrics, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        (lyrics, Some(status))
    } else {
        (area, None)
    }
}

pub fn draw(frame: &mut Frame, session: &Session, render: &RenderFrame, view: &View) {
    let (lyrics_area, status_area) = layout(frame.area(), view.show_status);

    let lines = match render.status {
        LyricsStatus::Ready => {
            let (rows, highlight_row) = lyric_rows(session, render, view, lyrics_area.width);
            visible_rows(rows, highlight_row, lyrics_area.height)
        }
        status => message_lines(status, lyrics_area.height, view),
    };
    frame.render_widget(
        Paragraph::new(lines).alignment(view.text_alignment()),
        lyrics_area,
    );

    if let Some(area) = status_area {
        let status = Paragraph::new(status_text(session, render))
            .style(Style::default().fg(view.inactive).add_modifier(Modifier::DIM));
        frame.render_widget(status, area);
    }
}

/// Rows for the entries in the render window, plus the first row of the
/// highlighted entry.
///
/// Without wrapping every entry is exactly one row.
#[must_use]
pub fn lyric_rows<'a>(
    session: &'a Session,
    render: &RenderFrame,
    view: &View,
    width: u16,
) -> (Vec<Line<'a>>, Option<usize>) {
    let normal = Style::default().fg(view.inactive);
    let highlighted = Style::default().fg(view.active).add_modifier(Modifier::BOLD);

    let mut rows = Vec::new();
    let mut highlight_row = None;
    for i in render.window.indices() {
        let Some(entry) = session.timeline.get(i) else {
            continue;
        };
        let spans = if !render.window.is_highlighted(i) {
            vec![Span::styled(entry.text.as_str(), normal)]
        } else if entry.words.is_empty() {
            vec![Span::styled(entry.text.as_str(), highlighted)]
        } else {
            word_spans(entry, render.active_word, highlighted, normal)
        };

        if render.window.is_highlighted(i) {
            highlight_row = Some(rows.len());
        }
        if view.wrap {
            rows.extend(wrap_spans(spans, usize::from(width)));
        } else {
            rows.push(Line::from(spans));
        }
    }
    (rows, highlight_row)
}

/// Keep at most `height` rows, centred on `highlight_row` when they overflow
#[must_use]
pub fn visible_rows(
    mut rows: Vec<Line<'_>>,
    highlight_row: Option<usize>,
    height: u16,
) -> Vec<Line<'_>> {
    let height = usize::from(height);
    if rows.len() <= height {
        return rows;
    }
    let start = highlight_row
        .map_or(0, |row| row.saturating_sub(height / 2))
        .min(rows.len() - height);
    rows.drain(..start);
    rows.truncate(height);
    rows
}

/// Break styled text into rows at most `width` display columns wide.
///
/// Breaks fall after whitespace. A word wider than the row is split between
/// characters. Widths come from `Span::width`, so wide CJK characters count
/// as two columns.
fn wrap_spans(spans: Vec<Span<'_>>, width: usize) -> Vec<Line<'_>> {
    if width == 0 {
        return vec![Line::from(spans)];
    }

    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut used = 0;

    for piece in spans.into_iter().flat_map(|span| split_span(span, word_pieces)) {
        let piece_width = piece.width();
        // Trailing whitespace may hang past the edge
        let needed = Span::raw(piece.content.trim_end()).width();
        if used > 0 && used + needed > width {
            finish_row(&mut rows, &mut row);
            used = 0;
        }
        if needed <= width {
            row.push(piece);
            used += piece_width;
            continue;
        }

        for ch in split_span(piece, char_pieces) {
            let ch_width = ch.width();
            if used > 0 && used + ch_width > width {
                finish_row(&mut rows, &mut row);
                used = 0;
            }
            row.push(ch);
            used += ch_width;
        }
    }

    if !row.is_empty() || rows.is_empty() {
        finish_row(&mut rows, &mut row);
    }
    rows
}

fn finish_row<'a>(rows: &mut Vec<Line<'a>>, row: &mut Vec<Span<'a>>) {
    while row.len() > 1 && row.last().is_some_and(|s| s.content.trim().is_empty()) {
        row.pop();
    }
    if let Some(last) = row.last_mut() {
        let kept = last.content.trim_end().len();
        match &mut last.content {
            Cow::Borrowed(text) => {
                let full: &'a str = *text;
                *text = &full[..kept];
            }
            Cow::Owned(text) => text.truncate(kept),
        }
    }
    rows.push(Line::from(std::mem::take(row)));
}

/// Split a span into pieces that keep its style
fn split_span<'a>(span: Span<'a>, pieces: fn(&str) -> Vec<&str>) -> Vec<Span<'a>> {
    let style = span.style;
    match span.content {
        Cow::Borrowed(text) => pieces(text)
            .into_iter()
            .map(|piece| Span::styled(piece, style))
            .collect(),
        Cow::Owned(text) => pieces(&text)
            .into_iter()
            .map(|piece| Span::styled(piece.to_string(), style))
            .collect(),
    }
}

/// Words with their trailing whitespace
fn word_pieces(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut after_space = false;
    for (i, c) in text.char_indices() {
        if after_space && !c.is_whitespace() {
            pieces.push(&text[start..i]);
            start = i;
        }
        after_space = c.is_whitespace();
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn char_pieces(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(i, c)| &text[i..i + c.len_utf8()])
        .collect()
}

/// Sung words in the highlight style, the rest of the line in the normal one
fn word_spans<'a>(
    entry: &'a TimelineEntry,
    active_word: Option<usize>,
    sung: Style,
    unsung: Style,
) -> Vec<Span<'a>> {
    let mut spans = Vec::with_capacity(entry.words.len() * 2 + 1);
    let mut consumed = 0;

    for (i, word) in entry.words.iter().enumerate() {
        let style = if active_word.is_some_and(|w| i <= w) {
            sung
        } else {
            unsung
        };
        if i > 0 {
            spans.push(Span::styled(" ", style));
            consumed += 1;
        }
        spans.push(Span::styled(word.text.as_str(), style));
        consumed += word.text.len();
    }

    // Trailing text without word timing
    if let Some(rest) = entry.text.get(consumed..).filter(|r| !r.is_empty()) {
        spans.push(Span::styled(rest, unsung));
    }

    spans
}

fn message_lines(status: LyricsStatus, height: u16, view: &View) -> Vec<Line<'static>> {
    let message = match status {
        LyricsStatus::Idle => "Waiting for the player...",
        LyricsStatus::Loading => "Looking for lyrics...",
        LyricsStatus::NoLyrics | LyricsStatus::Ready => "No lyrics found",
    };

    let mut lines = vec![Line::default(); usize::from(height / 2)];
    lines.push(Line::styled(message, Style::default().fg(view.inactive)));
    lines
}

/// `▶ Artist - Title  01:02 / 04:05  [lrc, cache]  offset +200ms  scroll`
#[must_use]
pub fn status_text(session: &Session, render: &RenderFrame) -> String {
    let track = &session.track;
    if track.is_empty() {
        return "■ no player".to_string();
    }

    let icon = match track.status {
        PlaybackStatus::Playing => '▶',
        PlaybackStatus::Paused => '⏸',
        PlaybackStatus::Stopped => '■',
    };

    let mut text = format!(
        "{icon} {}  {} / {}",
        track.display_name(),
        format_clock(track.position_seconds.max(0.0)),
        format_clock(track.duration_seconds)
    );

    let origin = match &session.origin {
        LyricsOrigin::Embedded(_) => Some("embedded"),
        LyricsOrigin::Sibling(_) => Some("local"),
        LyricsOrigin::Cache(_) => Some("cache"),
        LyricsOrigin::Remote { provider } => Some(*provider),
        LyricsOrigin::None => None,
    };
    if let Some(origin) = origin {
        text.push_str(&format!("  [{}, {origin}]", session.timeline.dialect()));
    }
    if render.offset_ms != 0 {
        text.push_str(&format!("  offset {:+}ms", render.offset_ms));
    }
    if render.manual_scroll {
        text.push_str("  scroll");
    }
    text
}
