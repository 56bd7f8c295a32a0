use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, Modal};
use crate::markup;
use crate::session::Origin;
use crate::theme::{palette, Palette};

const ABOUT_TEXT: &str = "MindMate is an emotional support companion for your terminal.\n\n\
It offers:\n\
 • Empathetic conversations\n\
 • Active listening\n\
 • Positive reinforcement\n\
 • Helpful suggestions\n\n\
Powered by Google's Gemini models, MindMate aims to make mental health support \
more accessible. It is not a replacement for professional help.";

const PRIVACY_TEXT: &str = "Your privacy matters.\n\n\
 • Messages are sent to the Gemini API to generate replies\n\
 • Conversations are never written to disk\n\
 • Only your theme preference is persisted locally\n\
 • No data is shared with anyone else";

const TERMS_TEXT: &str = "By using MindMate, you agree to:\n\n\
 • Use the companion for personal support only\n\
 • Not share harmful or inappropriate content\n\
 • Understand that this is not a replacement for professional help\n\
 • Respect the companion's responses and limitations";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let colors = palette(app.theme);

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, &colors);
    render_chat(app, frame, chat_area, &colors);
    render_input(app, frame, input_area, &colors);
    render_footer(app, frame, footer_area, &colors);

    if let Some(modal) = app.active_modal {
        render_modal(modal, frame, area, &colors);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let model = app
        .client
        .as_ref()
        .map(|client| client.model().to_string())
        .unwrap_or_else(|| "no API key".to_string());

    let title = Line::from(vec![
        Span::styled(
            " MindMate ",
            Style::default().fg(colors.header_fg).bold(),
        ),
        Span::styled(
            "Your Emotional Support Companion ",
            Style::default().fg(colors.muted),
        ),
        Span::styled(
            format!("[{model}] "),
            Style::default().fg(colors.muted),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(colors.muted),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(colors.header_bg));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    // Store inner dimensions for scroll calculations (minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border))
        .title(" Chat ");

    let mut lines: Vec<Line> = Vec::new();
    for message in app.session.messages() {
        match message.origin {
            Origin::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default()
                        .fg(colors.user_label)
                        .add_modifier(Modifier::BOLD),
                )));
                // User text is rendered as plain text, never as markup
                for line in message.text.lines() {
                    lines.push(Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(colors.user_text),
                    )));
                }
            }
            Origin::Assistant => {
                lines.push(Line::from(Span::styled(
                    "MindMate:",
                    Style::default()
                        .fg(colors.assistant_label)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.extend(markup::render_lines(
                    &message.text,
                    Style::default().fg(colors.assistant_text),
                ));
            }
        }
        lines.push(Line::from(Span::styled(
            message.created_at.format("%H:%M").to_string(),
            Style::default().fg(colors.timestamp),
        )));
        lines.push(Line::default());
    }

    if app.session.is_pending() {
        lines.push(Line::from(Span::styled(
            "MindMate:",
            Style::default()
                .fg(colors.assistant_label)
                .add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{dots}"),
            Style::default()
                .fg(colors.muted)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let border_color = if app.input_mode == InputMode::Editing {
        colors.border_focused
    } else {
        colors.border
    };

    let title = if app.listening {
        " Listening... "
    } else {
        " Share your thoughts (i to type, Enter to send) "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scroll keeps the cursor visible in a narrow input
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(colors.input_text))
        .block(input_block);

    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, colors: &Palette) {
    let content = match &app.status {
        Some(status) => Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(colors.header_fg).bold(),
        )),
        None => Line::from(Span::styled(
            " q quit | i type | t theme | s speak | v voice | a about | p privacy | T terms",
            Style::default().fg(colors.muted),
        )),
    };

    let footer = Paragraph::new(content).style(Style::default().bg(colors.footer_bg));
    frame.render_widget(footer, area);
}

fn render_modal(modal: Modal, frame: &mut Frame, area: Rect, colors: &Palette) {
    let (title, text) = match modal {
        Modal::About => (" About MindMate ", ABOUT_TEXT),
        Modal::Privacy => (" Privacy ", PRIVACY_TEXT),
        Modal::Terms => (" Terms ", TERMS_TEXT),
    };

    // Centered popup
    let popup_width = 62.min(area.width.saturating_sub(4));
    let popup_height = 16.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border_focused))
        .title(title);

    let body = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(colors.assistant_text));

    frame.render_widget(body, popup_area);
}
