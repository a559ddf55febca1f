use std::time::Duration;

use ratatui::{
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    layout::{Alignment, Constraint, Layout},
    style::{
        Style, Stylize, Color, Modifier,
        palette::tailwind::{BLUE, GREEN, RED, SLATE},
    },
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph},
    DefaultTerminal, Frame,
};
use size::{Size, Base};
use tracing::{debug, warn};

use crate::core::dialog::Dialog;
use crate::core::error::{AppError, StoreResult};
use crate::core::input::Input;
use crate::core::note::Note;
use crate::core::store::NoteStore;

const PLACEHOLDER: &str = "Enter a note...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    AddButton,
    List,
    DeleteButton,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Input => Focus::AddButton,
            Focus::AddButton => Focus::List,
            Focus::List => Focus::DeleteButton,
            Focus::DeleteButton => Focus::Input,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Input => Focus::DeleteButton,
            Focus::AddButton => Focus::Input,
            Focus::List => Focus::AddButton,
            Focus::DeleteButton => Focus::List,
        }
    }
}

pub struct App {
    store: NoteStore,
    notes: Vec<Note>,
    store_size: u64,
    input: Input,
    list_state: ListState,
    focus: Focus,
    dialog: Option<Dialog>,
    should_exit: bool,
}

impl App {
    pub fn new(store: NoteStore) -> StoreResult<Self> {
        let mut app = Self {
            store,
            notes: Vec::new(),
            store_size: 0,
            input: Input::default(),
            list_state: ListState::default(),
            focus: Focus::Input,
            dialog: None,
            should_exit: false,
        };
        app.load_notes()?;
        Ok(app)
    }

    pub fn run(&mut self, mut terminal: DefaultTerminal) -> Result<(), AppError> {
        terminal.draw(|frame| self.render(frame))?;

        while !self.should_exit {
            if self.handle_events()? {
                terminal.draw(|frame| self.render(frame))?;
            }
        }
        Ok(())
    }

    /// Returns whether anything happened that needs a redraw.
    fn handle_events(&mut self) -> Result<bool, AppError> {
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => self.handle_key(key)?,
                Event::Resize(..) => (),
                _ => return Ok(false),
            }
            return Ok(true);
        }
        Ok(false)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> StoreResult<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return Ok(());
        }

        // Modal: only dismissal keys get through.
        if self.dialog.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.dialog = None;
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Esc => self.should_exit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            code => match self.focus {
                Focus::Input => match code {
                    KeyCode::Enter => self.add_note()?,
                    KeyCode::Char(c) if !ctrl => self.input.insert(c),
                    KeyCode::Backspace => self.input.backspace(),
                    KeyCode::Delete => self.input.delete(),
                    KeyCode::Left => self.input.move_left(),
                    KeyCode::Right => self.input.move_right(),
                    KeyCode::Home => self.input.home(),
                    KeyCode::End => self.input.end(),
                    _ => ()
                },
                Focus::AddButton => {
                    if matches!(code, KeyCode::Enter | KeyCode::Char(' ')) {
                        self.add_note()?;
                    }
                }
                Focus::List => match code {
                    KeyCode::Up | KeyCode::Char('k') => self.list_state_previous(),
                    KeyCode::Down | KeyCode::Char('j') => self.list_state_next(),
                    KeyCode::Enter | KeyCode::Delete | KeyCode::Char('d') => self.delete_note()?,
                    _ => ()
                },
                Focus::DeleteButton => {
                    if matches!(code, KeyCode::Enter | KeyCode::Char(' ')) {
                        self.delete_note()?;
                    }
                }
            },
        }
        Ok(())
    }

    fn add_note(&mut self) -> StoreResult<()> {
        if self.input.is_empty() {
            warn!("add rejected: empty input");
            self.dialog = Some(Dialog::warning("Enter note text!"));
            return Ok(());
        }

        self.store.add(self.input.value())?;
        self.input.clear();
        self.load_notes()?;
        self.dialog = Some(Dialog::info("Note added!"));
        Ok(())
    }

    fn delete_note(&mut self) -> StoreResult<()> {
        let selected = self
            .list_state
            .selected()
            .and_then(|i| self.notes.get(i))
            .map(|note| note.id);

        let Some(id) = selected else {
            warn!("delete rejected: nothing selected");
            self.dialog = Some(Dialog::warning("Select a note to delete!"));
            return Ok(());
        };

        self.store.delete(id)?;
        self.load_notes()?;
        self.dialog = Some(Dialog::info("Note deleted!"));
        Ok(())
    }

    /// Re-reads the whole store and rebuilds the list from scratch.
    /// The selection is dropped, so Delete always needs a fresh pick.
    fn load_notes(&mut self) -> StoreResult<()> {
        self.notes = self.store.read_notes()?;
        self.store_size = self.store.size_on_disk()?;
        self.list_state.select(None);

        debug!(count = self.notes.len(), "reloaded list");
        Ok(())
    }

    fn list_state_next(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= self.notes.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0
        };
        self.list_state.select(Some(i));
    }

    fn list_state_previous(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.notes.len() - 1
                } else {
                    i - 1
                }
            }
            None => self.notes.len() - 1
        };
        self.list_state.select(Some(i));
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let window = Block::bordered()
            .title(Line::from(" Notes Manager ").bold().centered())
            .bg(SLATE.c700)
            .fg(SLATE.c100);
        let inner = window.inner(frame.area());
        frame.render_widget(window, frame.area());

        let vertical = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ]);
        let [input_area, add_area, list_area, delete_area, status_area] = vertical.areas(inner);

        // Keep the cursor inside the field by scrolling long input left.
        let visible = input_area.width.saturating_sub(2);
        let cursor_col = Line::from(self.input.before_cursor()).width() as u16;
        let scroll = cursor_col.saturating_sub(visible.saturating_sub(1));
        frame.render_widget(self.input_field(scroll), input_area);
        frame.render_widget(self.button("Add", GREEN.c600, Focus::AddButton), add_area);

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(self.note_list(), list_area, &mut state);

        frame.render_widget(self.button("Delete", RED.c600, Focus::DeleteButton), delete_area);
        frame.render_widget(self.status_bar(), status_area);

        match &self.dialog {
            Some(dialog) => dialog.render(frame),
            None if self.focus == Focus::Input => {
                let x = input_area.x + 1 + cursor_col - scroll;
                frame.set_cursor_position((x, input_area.y + 1));
            }
            None => (),
        }
    }

    fn focus_style(&self, target: Focus) -> Style {
        if self.focus == target {
            Style::new().fg(BLUE.c400).add_modifier(Modifier::BOLD)
        } else {
            Style::new().fg(SLATE.c400)
        }
    }

    fn input_field(&self, scroll: u16) -> Paragraph {
        let line = if self.input.is_empty() {
            Line::from(Span::from(PLACEHOLDER).fg(SLATE.c400).italic())
        } else {
            Line::from(self.input.value())
        };

        Paragraph::new(line)
            .scroll((0, scroll))
            .style(Style::new().bg(SLATE.c300).fg(SLATE.c900))
            .block(
                Block::bordered()
                    .title("Note")
                    .border_style(self.focus_style(Focus::Input)),
            )
    }

    fn button(&self, label: &str, color: Color, target: Focus) -> Paragraph {
        let style = if self.focus == target {
            Style::new().bg(color).fg(Color::White).add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::new().bg(color).fg(Color::White)
        };

        Paragraph::new(label.to_string())
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::bordered().border_style(self.focus_style(target)))
    }

    fn note_list(&self) -> List {
        let list_items: Vec<ListItem> = self
            .notes
            .iter()
            .map(|note| ListItem::from(note.to_string()))
            .collect();

        let style: Style = Style::new().bg(BLUE.c600).fg(Color::White).add_modifier(Modifier::BOLD);
        List::new(list_items)
            .block(
                Block::bordered()
                    .title("Notes")
                    .border_style(self.focus_style(Focus::List)),
            )
            .style(Style::new().bg(SLATE.c800).fg(SLATE.c300))
            .highlight_style(style)
            .highlight_symbol(">> ")
            .highlight_spacing(ratatui::widgets::HighlightSpacing::Always)
    }

    fn status_bar(&self) -> Paragraph {
        let size = Size::from_bytes(self.store_size)
            .format()
            .with_base(Base::Base10)
            .to_string();
        let status = format!(
            " {} · {} notes · {} ",
            self.store.path().display(),
            self.notes.len(),
            size
        );

        Paragraph::new(Line::from(vec![
            Span::from(status).fg(SLATE.c200),
            Span::from("Tab focus · Enter act · Esc quit").fg(SLATE.c400),
        ]))
    }
}
