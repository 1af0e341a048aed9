use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{DefaultTerminal, Frame};
use wello_shared::{ChatResponse, Role};

use crate::client::{ApiClient, ClientError};
use crate::controller::Controller;
use crate::RUNTIME;

const TICK: Duration = Duration::from_millis(100);
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const PAGE_STEP: usize = 10;

type Outcome = Result<ChatResponse, ClientError>;

/// Transient view state that lives outside the controller.
struct View {
    input: String,
    tick: usize,
    // Lines scrolled up from the bottom of the log; 0 means following
    scrollback: usize,
}

pub fn run(client: ApiClient, mut controller: Controller) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, client, &mut controller);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    client: ApiClient,
    controller: &mut Controller,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Outcome>();
    let mut view = View {
        input: String::new(),
        tick: 0,
        scrollback: 0,
    };

    loop {
        // Fold in any finished request before drawing
        while let Ok(outcome) = rx.try_recv() {
            controller.resolve(outcome);
            view.scrollback = 0;
        }

        terminal.draw(|frame| draw(frame, controller, &view))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && handle_key(key, &client, controller, &mut view, &tx)
                {
                    break;
                }
            }
        }
        view.tick = view.tick.wrapping_add(1);
    }

    Ok(())
}

/// Returns true when the user asked to quit.
fn handle_key(
    key: KeyEvent,
    client: &ApiClient,
    controller: &mut Controller,
    view: &mut View,
    tx: &mpsc::Sender<Outcome>,
) -> bool {
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Enter => {
            // Rejected submissions (blank input, request in flight) leave
            // the input box untouched
            if let Some(request) = controller.submit(&view.input) {
                view.input.clear();
                view.scrollback = 0;

                let client = client.clone();
                let tx = tx.clone();
                RUNTIME.spawn(async move {
                    let outcome = client.invoke(&request).await;
                    let _ = tx.send(outcome);
                });
            }
        }
        KeyCode::Backspace => {
            view.input.pop();
        }
        KeyCode::PageUp => view.scrollback = view.scrollback.saturating_add(PAGE_STEP),
        KeyCode::PageDown => view.scrollback = view.scrollback.saturating_sub(PAGE_STEP),
        KeyCode::Char(c) => view.input.push(c),
        _ => {}
    }
    false
}

fn draw(frame: &mut Frame, controller: &Controller, view: &View) {
    let [log_area, status_area, input_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    draw_log(frame, log_area, controller, view);
    draw_status(frame, status_area, controller, view);
    draw_input(frame, input_area, controller, view);
}

fn draw_log(frame: &mut Frame, area: Rect, controller: &Controller, view: &View) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let lines = transcript_lines(controller, area.width as usize);
    let offset = scroll_offset(lines.len(), area.height as usize, view.scrollback);

    let log = Paragraph::new(Text::from(lines)).scroll((offset, 0));
    frame.render_widget(log, area);
}

fn draw_status(frame: &mut Frame, area: Rect, controller: &Controller, view: &View) {
    let line = if controller.thinking() {
        Line::from(vec![
            Span::raw(SPINNER_FRAMES[view.tick % SPINNER_FRAMES.len()]),
            Span::styled(
                " Wello is thinking...",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ])
    } else {
        Line::from(Span::styled(
            "Enter to send, PgUp/PgDn to scroll, Esc to quit",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_input(frame: &mut Frame, area: Rect, controller: &Controller, view: &View) {
    let style = if controller.thinking() {
        // Submission is disabled until the outstanding request settles
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let content = Line::from(vec![
        Span::raw(view.input.clone()),
        Span::styled("█", Style::default().fg(Color::DarkGray)),
    ]);

    let input = Paragraph::new(content)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(" Message "));
    frame.render_widget(input, area);
}

fn transcript_lines(controller: &Controller, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in controller.transcript().entries() {
        let (label, style) = match entry.sender {
            Role::User => (
                "You",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Role::Assistant => (
                "Wello",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        };
        lines.extend(entry_lines(label, style, &entry.text, width));
    }
    lines
}

/// Render one entry as "Label: text" with a hanging indent. The text goes
/// in verbatim; there is no markup to interpret.
fn entry_lines(label: &str, style: Style, text: &str, width: usize) -> Vec<Line<'static>> {
    let prefix = format!("{}: ", label);
    let indent = " ".repeat(prefix.chars().count());
    let body_width = width.saturating_sub(prefix.chars().count()).max(1);

    let mut lines = Vec::new();
    for (i, chunk) in wrap_text(text, body_width).into_iter().enumerate() {
        if i == 0 {
            lines.push(Line::from(vec![
                Span::styled(prefix.clone(), style),
                Span::raw(chunk),
            ]));
        } else {
            lines.push(Line::from(vec![Span::raw(indent.clone()), Span::raw(chunk)]));
        }
    }
    lines
}

/// First visible line for a log of `total` lines in a viewport `height`
/// tall, scrolled `scrollback` lines up from the bottom. Saturates at
/// `u16::MAX`, the most the paragraph widget can scroll.
fn scroll_offset(total: usize, height: usize, scrollback: usize) -> u16 {
    let max_scroll = total.saturating_sub(height);
    let offset = max_scroll.saturating_sub(scrollback.min(max_scroll));
    u16::try_from(offset).unwrap_or(u16::MAX)
}

/// Greedy word wrap by character count. Newlines in the input are kept,
/// words longer than the width are hard-split, and the result always has
/// at least one line.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if word_len > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let mut piece = String::new();
                let mut piece_len = 0;
                for c in word.chars() {
                    if piece_len == width {
                        lines.push(std::mem::take(&mut piece));
                        piece_len = 0;
                    }
                    piece.push(c);
                    piece_len += 1;
                }
                current = piece;
                current_len = piece_len;
                continue;
            }

            let needed = if current_len == 0 { word_len } else { word_len + 1 };
            if current_len + needed > width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            } else {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(word);
                current_len += word_len;
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
