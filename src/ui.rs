use crate::board::Board;
use crate::model::{ColumnSet, Status, Task, TaskDraft};
use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::Duration;

pub fn run(board: Board) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(board);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    board: Board,
    columns: ColumnSet,
    selected_column: usize,
    selected_task: usize,
    scroll_offsets: [usize; 3],
    status: String,
    saved_at: Option<String>,
    mode: Mode,
}

enum Mode {
    Normal,
    Creating(TaskForm),
    Editing { task_id: u64, form: TaskForm },
}

struct TaskForm {
    title: FieldValue,
    description: FieldValue,
    status: Status,
    field: FormField,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FormField {
    Title,
    Description,
    Status,
}

enum FormAction {
    Create,
    Edit(u64),
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char_boundary(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char_boundary(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl App {
    fn new(board: Board) -> Self {
        let status = format!("Loaded board from {}", board.location().path.display());
        let columns = ColumnSet::project(board.tasks());
        App {
            board,
            columns,
            selected_column: 0,
            selected_task: 0,
            scroll_offsets: [0; 3],
            status,
            saved_at: None,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Creating(_) | Mode::Editing { .. } => self.handle_form_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('n') => {
                let status = self.selected_status();
                self.mode = Mode::Creating(TaskForm::new(status));
                self.status =
                    "Adding task (Tab moves, Ctrl+Enter saves, Esc cancels)".into();
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(task) = self.current_task() {
                    let task_id = task.id;
                    let form = TaskForm::from_task(task);
                    self.mode = Mode::Editing { task_id, form };
                    self.status = format!("Viewing task #{}", task_id);
                } else {
                    self.status = "No task selected".into();
                }
            }
            KeyCode::Left | KeyCode::Char('h') => self.prev_column(),
            KeyCode::Right | KeyCode::Char('l') => self.next_column(),
            KeyCode::Up | KeyCode::Char('k') => self.prev_task(),
            KeyCode::Down | KeyCode::Char('j') => self.next_task(),
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut close_form = false;
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        match &mut mode {
            Mode::Creating(form) => {
                close_form = self.process_form_key(FormAction::Create, form, key)?;
            }
            Mode::Editing { task_id, form } => {
                let id = *task_id;
                close_form = self.process_form_key(FormAction::Edit(id), form, key)?;
            }
            Mode::Normal => {}
        }
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn process_form_key(
        &mut self,
        action: FormAction,
        form: &mut TaskForm,
        key: KeyEvent,
    ) -> Result<bool> {
        let mut close_form = false;
        match key.code {
            KeyCode::Esc => {
                close_form = true;
                self.status = match action {
                    FormAction::Create => "Canceled, nothing added".into(),
                    FormAction::Edit(id) => format!("Closed task #{} without saving", id),
                };
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Left => match form.field {
                FormField::Status => form.status = form.status.prev(),
                _ => form.active_field_mut().move_left(),
            },
            KeyCode::Right => match form.field {
                FormField::Status => form.status = form.status.next(),
                _ => form.active_field_mut().move_right(),
            },
            KeyCode::Enter => {
                let control = key.modifiers.contains(KeyModifiers::CONTROL);
                if form.field == FormField::Description && !control {
                    form.active_field_mut().insert_char('\n');
                } else {
                    close_form = self.try_submit(action, form)?;
                }
            }
            KeyCode::Backspace => {
                if form.field != FormField::Status {
                    form.active_field_mut().backspace();
                }
            }
            KeyCode::Char(' ') if form.field == FormField::Status => {
                form.status = form.status.next();
            }
            KeyCode::Char(c) => {
                if form.field != FormField::Status
                    && !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    form.active_field_mut().insert_char(c);
                }
            }
            _ => {}
        }
        Ok(close_form)
    }

    fn try_submit(&mut self, action: FormAction, form: &TaskForm) -> Result<bool> {
        let draft = TaskDraft {
            title: form.title.value.clone(),
            description: form.description.value.clone(),
            status: form.status.clone(),
        };
        match action {
            FormAction::Create => match self.board.submit(&draft) {
                Ok(id) => {
                    self.refresh(format!("Added task #{}", id));
                    self.select_task(id);
                    Ok(true)
                }
                Err(err) => {
                    self.status = format!("Could not add: {}", err);
                    Ok(false)
                }
            },
            FormAction::Edit(task_id) => match self.board.apply_edit(task_id, &draft) {
                Ok(()) => {
                    self.refresh(format!("Saved task #{}", task_id));
                    self.select_task(task_id);
                    Ok(true)
                }
                Err(err) => {
                    self.status = format!("Could not save: {}", err);
                    Ok(false)
                }
            },
        }
    }

    fn refresh(&mut self, message: impl Into<String>) {
        self.columns = ColumnSet::project(self.board.tasks());
        self.status = message.into();
        self.saved_at = Some(Local::now().format("%H:%M:%S").to_string());
        self.ensure_bounds();
    }

    fn ensure_bounds(&mut self) {
        let len = self.columns.columns()[self.selected_column].task_ids.len();
        if len == 0 {
            self.selected_task = 0;
        } else {
            self.selected_task = self.selected_task.min(len - 1);
        }
    }

    fn select_task(&mut self, id: u64) {
        for (idx, column) in self.columns.columns().iter().enumerate() {
            if let Some(pos) = column.task_ids.iter().position(|t| *t == id) {
                self.selected_column = idx;
                self.selected_task = pos;
                return;
            }
        }
    }

    fn selected_status(&self) -> Status {
        self.columns.columns()[self.selected_column].status.clone()
    }

    fn current_task(&self) -> Option<&Task> {
        let column = &self.columns.columns()[self.selected_column];
        let id = column.task_ids.get(self.selected_task)?;
        self.board.tasks().get(*id)
    }

    fn prev_column(&mut self) {
        if self.selected_column > 0 {
            self.selected_column -= 1;
            self.selected_task = 0;
        }
    }

    fn next_column(&mut self) {
        if self.selected_column + 1 < self.columns.columns().len() {
            self.selected_column += 1;
            self.selected_task = 0;
        }
    }

    fn prev_task(&mut self) {
        if self.selected_task > 0 {
            self.selected_task -= 1;
        }
    }

    fn next_task(&mut self) {
        let len = self.columns.columns()[self.selected_column].task_ids.len();
        if self.selected_task + 1 < len {
            self.selected_task += 1;
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        self.draw_board(f, layout[1]);
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Creating(form) => self.draw_form(f, "Add Task", form),
            Mode::Editing { task_id, form } => {
                let title = format!("Task #{}", task_id);
                self.draw_form(f, &title, form);
            }
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let mut spans = vec![
            Span::styled(
                "taskdeck ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.board.location().path.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{} tasks", self.board.tasks().len()),
                Style::default().fg(Color::Green),
            ),
        ];
        if let Some(saved_at) = &self.saved_at {
            spans.push(Span::raw("  •  "));
            spans.push(Span::styled(
                format!("saved {}", saved_at),
                Style::default().fg(Color::Gray),
            ));
        }

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_board(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ])
            .split(area);

        for (idx, column) in self.columns.columns().iter().enumerate() {
            let accent = status_color(&column.status);
            let item_width = chunks[idx].width.saturating_sub(2);
            let items = column
                .task_ids
                .iter()
                .filter_map(|id| self.board.tasks().get(*id))
                .enumerate()
                .map(|(t_idx, task)| {
                    task_item(
                        task,
                        item_width,
                        idx == self.selected_column && t_idx == self.selected_task,
                    )
                })
                .collect::<Vec<_>>();

            let mut state = ListState::default();
            let mut offset = self.scroll_offsets[idx];
            let viewport = chunks[idx].height.saturating_sub(2) as usize;
            if idx == self.selected_column && !items.is_empty() {
                offset = adjust_offset(self.selected_task, offset, viewport, items.len());
                self.scroll_offsets[idx] = offset;
                state.select(Some(self.selected_task.min(items.len() - 1)));
            }
            *state.offset_mut() = offset.min(items.len().saturating_sub(1));

            let title = format!(
                "{} [{}] ({})",
                column.status.label(),
                column.status.id(),
                column.task_ids.len()
            );
            let block = Block::default()
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(accent)
                        .add_modifier(if idx == self.selected_column {
                            Modifier::BOLD | Modifier::UNDERLINED
                        } else {
                            Modifier::BOLD
                        }),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent));

            let list = List::new(items).block(block);
            f.render_stateful_widget(list, chunks[idx], &mut state);
        }
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let hints = match self.mode {
            Mode::Normal => Line::from(vec![
                Span::styled("←↑↓→", Style::default().fg(Color::LightCyan)),
                Span::raw(" navigate  "),
                Span::styled("n", Style::default().fg(Color::LightGreen)),
                Span::raw(" add  "),
                Span::styled("enter", Style::default().fg(Color::LightYellow)),
                Span::raw(" open  "),
                Span::styled("q", Style::default().fg(Color::LightRed)),
                Span::raw(" quit"),
            ]),
            _ => Line::from(vec![
                Span::styled("tab", Style::default().fg(Color::LightCyan)),
                Span::raw(" next field  "),
                Span::styled("ctrl+enter", Style::default().fg(Color::LightGreen)),
                Span::raw(" save  "),
                Span::styled("esc", Style::default().fg(Color::LightRed)),
                Span::raw(" close"),
            ]),
        };
        let lines = vec![
            Line::from(Span::styled(
                self.status.clone(),
                Style::default().fg(Color::Gray),
            )),
            hints,
        ];
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray));
        f.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_form(&self, f: &mut ratatui::Frame<'_>, title: &str, form: &TaskForm) {
        let area = centered_rect(70, 60, f.size());
        let mut fields = Vec::new();
        fields.extend(field_lines(
            "Title",
            &form.title,
            form.field == FormField::Title,
        ));
        fields.extend(field_lines(
            "Description",
            &form.description,
            form.field == FormField::Description,
        ));
        fields.push(status_line(&form.status, form.field == FormField::Status));
        fields.push(Line::from(""));
        fields.push(Line::from(Span::styled(
            "Ctrl+Enter to save • Esc to close • Tab/Shift-Tab to move • ←/→ cycles Status",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(fields)
            .block(
                Block::default()
                    .title(Span::styled(
                        title.to_string(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

impl TaskForm {
    fn new(status: Status) -> Self {
        TaskForm {
            title: FieldValue::new(""),
            description: FieldValue::new(""),
            status,
            field: FormField::Title,
        }
    }

    fn from_task(task: &Task) -> Self {
        TaskForm {
            title: FieldValue::new(&task.title),
            description: FieldValue::new(&task.description),
            status: task.status.clone(),
            field: FormField::Title,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Status,
            FormField::Status => FormField::Title,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Status,
            FormField::Description => FormField::Title,
            FormField::Status => FormField::Description,
        };
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            // The status field cycles rather than takes text; callers keep
            // text edits away from it, so fall back to the title.
            FormField::Status => &mut self.title,
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn status_color(status: &Status) -> Color {
    match status {
        Status::Todo => Color::LightBlue,
        Status::Doing => Color::LightYellow,
        Status::Done => Color::LightGreen,
        Status::Unknown(_) => Color::DarkGray,
    }
}

fn adjust_offset(selected: usize, current_offset: usize, viewport: usize, len: usize) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let mut offset = current_offset.min(max_offset);
    if selected < offset {
        offset = selected;
    } else if selected >= offset + viewport {
        offset = selected + 1 - viewport;
    }
    offset.min(max_offset)
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out.chars().take(max).collect()
}

fn task_item(task: &Task, width: u16, selected: bool) -> ListItem<'static> {
    let inner_width = width.saturating_sub(2).max(10) as usize;
    let mut spans = vec![
        Span::styled(
            format!("#{}", task.id),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(
            truncate_text(&task.title, inner_width.saturating_sub(5)),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if !task.description.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            truncate_text(task.description.lines().next().unwrap_or(""), 30),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ));
    }
    let mut item = ListItem::new(Line::from(spans));
    if selected {
        item = item.style(
            Style::default()
                .bg(Color::Rgb(252, 214, 112))
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
    }
    item
}

fn field_lines(label: &str, field: &FieldValue, active: bool) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let prefix = format!("{}: ", label);
    let spacer = " ".repeat(prefix.chars().count());
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    let segments: Vec<&str> = if text.is_empty() {
        vec![""]
    } else {
        text.split('\n').collect()
    };
    segments
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            Line::from(vec![
                Span::styled(
                    if idx == 0 {
                        prefix.clone()
                    } else {
                        spacer.clone()
                    },
                    label_style,
                ),
                Span::styled((*line).to_string(), value_style),
            ])
        })
        .collect()
}

fn status_line(status: &Status, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default()
        .fg(if active { Color::Cyan } else { Color::White })
        .add_modifier(Modifier::BOLD);
    Line::from(vec![
        Span::styled("Status: ".to_string(), label_style),
        Span::styled(
            if active {
                format!("< {} >", status.label())
            } else {
                status.label().to_string()
            },
            value_style,
        ),
    ])
}

fn prev_char_boundary(cursor: usize, text: &str) -> usize {
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_char_boundary(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_edits_around_the_cursor() {
        let mut field = FieldValue::new("tite");
        field.move_left();
        field.insert_char('l');
        assert_eq!(field.value, "title");
        field.backspace();
        field.backspace();
        assert_eq!(field.value, "tie");
    }

    #[test]
    fn field_value_cursor_respects_multibyte_chars() {
        let mut field = FieldValue::new("résumé");
        field.backspace();
        assert_eq!(field.value, "résum");
        field.move_left();
        field.backspace();
        assert_eq!(field.value, "résm");
    }

    #[test]
    fn form_field_cycle_wraps_both_ways() {
        let mut form = TaskForm::new(Status::Todo);
        form.next_field();
        form.next_field();
        assert_eq!(form.field, FormField::Status);
        form.next_field();
        assert_eq!(form.field, FormField::Title);
        form.prev_field();
        assert_eq!(form.field, FormField::Status);
    }

    #[test]
    fn truncated_text_never_exceeds_the_width_budget() {
        assert_eq!(truncate_text("abcdef", 4), "a...");
        assert_eq!(truncate_text("abc", 3), "abc");
        for max in 0..=3 {
            assert!(truncate_text("abcdef", max).chars().count() <= max);
        }
    }

    #[test]
    fn offset_follows_the_selection_through_the_viewport() {
        assert_eq!(adjust_offset(0, 0, 5, 20), 0);
        assert_eq!(adjust_offset(7, 0, 5, 20), 3);
        assert_eq!(adjust_offset(2, 10, 5, 20), 2);
        assert_eq!(adjust_offset(19, 0, 5, 20), 15);
    }
}
