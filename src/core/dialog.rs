use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Style, Stylize, palette::tailwind::{AMBER, BLUE, SLATE}},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Warning,
}

/// Modal message box drawn over the main window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: &'static str,
    pub message: &'static str,
}

impl Dialog {
    pub fn info(message: &'static str) -> Self {
        Self {
            kind: DialogKind::Info,
            title: "Success",
            message,
        }
    }

    pub fn warning(message: &'static str) -> Self {
        Self {
            kind: DialogKind::Warning,
            title: "Error",
            message,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let accent = match self.kind {
            DialogKind::Info => BLUE.c400,
            DialogKind::Warning => AMBER.c400,
        };

        let width = (self.message.chars().count() as u16 + 6).max(24);
        let area = popup_area(frame.area(), width, 5);

        let text = Text::from(vec![
            Line::from(self.message),
            Line::from(""),
            Line::from("[Enter] OK").fg(SLATE.c400),
        ]);
        let dialog = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .title(self.title)
                    .border_style(Style::new().fg(accent))
                    .bg(SLATE.c900),
            );

        frame.render_widget(Clear, area);
        frame.render_widget(dialog, area);
    }
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
