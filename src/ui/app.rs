//! Stage viewer state and event loop

use super::panes::{self, files::FileEntry, SourceView};
use crate::emit::diff::Patch;
use crate::emit::stage::Snapshot;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Files,
    Source,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Files => FocusedPane::Source,
            FocusedPane::Source => FocusedPane::Files,
        }
    }
}

pub struct App {
    pub stages: Vec<Snapshot>,
    pub patches: Vec<Patch>,

    /// Index into `stages`
    pub stage: usize,
    /// Index into the current stage's file list
    pub file: usize,

    pub focused_pane: FocusedPane,
    pub view: SourceView,
    pub source_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,
}

impl App {
    pub fn new(stages: Vec<Snapshot>, patches: Vec<Patch>) -> Self {
        App {
            stages,
            patches,
            stage: 0,
            file: 0,
            focused_pane: FocusedPane::Files,
            view: SourceView::File,
            source_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }
        Ok(())
    }

    fn current(&self) -> Option<&Snapshot> {
        self.stages.get(self.stage)
    }

    /// Name and contents of the selected file
    fn selected_file(&self) -> Option<(&str, &str)> {
        self.current()?
            .files
            .iter()
            .nth(self.file)
            .map(|(name, text)| (name.as_str(), text.as_str()))
    }

    /// The patch leading into the current stage
    fn current_patch(&self) -> Option<&Patch> {
        let stage = self.stage;
        self.patches
            .iter()
            .find(|p| p.to == stage && p.from + 1 == stage)
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
            .split(main_chunks[0]);

        let previous = self.stage.checked_sub(1).and_then(|i| self.stages.get(i));
        let entries: Vec<FileEntry> = self
            .current()
            .map(|snapshot| {
                snapshot
                    .files
                    .iter()
                    .map(|(name, text)| FileEntry {
                        name,
                        bytes: text.len(),
                        changed: previous.is_some_and(|prev| prev.files.get(name) != Some(text)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        panes::render_file_list(
            frame,
            columns[0],
            &entries,
            self.file,
            self.focused_pane == FocusedPane::Files,
        );

        let (title, text) = match self.view {
            SourceView::File => match self.selected_file() {
                Some((name, text)) => (name.to_string(), text.to_string()),
                None => ("(no files)".to_string(), String::new()),
            },
            SourceView::Patch => match self.current_patch() {
                Some(patch) => (patch.name.clone(), patch.text.clone()),
                None => ("(no patch)".to_string(), String::new()),
            },
        };
        panes::render_source_pane(
            frame,
            columns[1],
            &title,
            &text,
            self.view,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let label = self.current().map(|s| s.label.as_str()).unwrap_or("");
        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.stage,
            self.stages.len(),
            label,
            self.view == SourceView::Patch,
        );
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => self.goto_stage(self.stage.saturating_sub(1)),
            KeyCode::Right => self.goto_stage(self.stage + 1),
            KeyCode::Backspace => self.goto_stage(0),
            KeyCode::Enter => self.goto_stage(self.stages.len().saturating_sub(1)),
            KeyCode::Char('d') => {
                self.view = match self.view {
                    SourceView::File => SourceView::Patch,
                    SourceView::Patch => SourceView::File,
                };
                self.source_scroll = 0;
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Files => {
                    if self.file > 0 {
                        self.file -= 1;
                        self.source_scroll = 0;
                    }
                }
                FocusedPane::Source => {
                    self.source_scroll = self.source_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Files => {
                    let count = self.current().map_or(0, |s| s.files.len());
                    if self.file + 1 < count {
                        self.file += 1;
                        self.source_scroll = 0;
                    }
                }
                FocusedPane::Source => {
                    self.source_scroll = self.source_scroll.saturating_add(1);
                }
            },
            KeyCode::PageDown => {
                self.source_scroll = self.source_scroll.saturating_add(20);
            }
            KeyCode::PageUp => {
                self.source_scroll = self.source_scroll.saturating_sub(20);
            }
            _ => {}
        }
    }

    fn goto_stage(&mut self, stage: usize) {
        if stage >= self.stages.len() {
            self.status_message = "Already at the last stage".to_string();
            return;
        }
        self.stage = stage;
        let count = self.stages[stage].files.len();
        self.file = self.file.min(count.saturating_sub(1));
        self.source_scroll = 0;
        self.status_message = format!("Showing {}", self.stages[stage].dir_name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use std::collections::BTreeMap;

    fn snapshot(index: usize, label: &str, files: &[(&str, &str)]) -> Snapshot {
        Snapshot {
            index,
            label: label.to_string(),
            files: files
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn app() -> App {
        let stages = vec![
            snapshot(0, "extract", &[("asm7.c", "void\nspan(void)\n{\n}\n"), ("l.h", "")]),
            snapshot(1, "rename", &[("asm7.c", "void\nspan7(void)\n{\n}\n"), ("l.h", "")]),
        ];
        let patches = vec![Patch {
            name: "d01.patch".to_string(),
            from: 0,
            to: 1,
            text: "-span(void)\n+span7(void)\n".to_string(),
        }];
        App::new(stages, patches)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_stepping_through_stages() {
        let mut app = app();
        assert!(screen(&mut app).contains("span(void)"));
        assert!(screen(&mut app).contains("Stage 1/2"));

        press(&mut app, KeyCode::Right);
        assert_eq!(app.stage, 1);
        let text = screen(&mut app);
        assert!(text.contains("span7(void)"));
        assert!(text.contains("rename"));

        press(&mut app, KeyCode::Right);
        assert_eq!(app.stage, 1);
        assert_eq!(app.status_message, "Already at the last stage");

        press(&mut app, KeyCode::Left);
        assert_eq!(app.stage, 0);
    }

    #[test]
    fn test_patch_view_and_file_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char('d'));
        let text = screen(&mut app);
        assert!(text.contains("d01.patch"));
        assert!(text.contains("+span7(void)"));

        press(&mut app, KeyCode::Left);
        assert!(screen(&mut app).contains("(no patch)"));

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.file, 1);
        assert!(screen(&mut app).contains("(empty file)"));

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
