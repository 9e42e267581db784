//! Kanban board view.
//!
//! Four status columns over one cache partition (optionally narrowed to a
//! folder). Key bindings: arrows/hjkl move selection, space toggles status,
//! `d` deletes, `u` undoes, `o` opens via the host bridge, `a` opens the
//! first assignee as a contact, `f` cycles the folder filter, `c` shows or
//! hides the completed column, `r` refetches, `Tab` switches to the agenda,
//! `q` quits.

use super::{undo_last, viewport, Shared, ViewAction};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use slate_core::bridge::HostBridge;
use slate_core::model::{Entity, EntityId, Status, Task};
use slate_core::mutate::{MutateError, Mutator, RemoteService};
use slate_core::nav::{self, BoardLayout, Direction as Dir};
use slate_core::notify::ToastKind;
use slate_core::TaskFilter;
use std::time::{Duration, Instant};

/// How long navigation stays locked after a column move.
const ANIMATION_LOCK: Duration = Duration::from_millis(220);

pub struct BoardView {
    selection: Option<EntityId>,
    /// Scroll offset per status column.
    offsets: [usize; Status::ALL.len()],
    folder: Option<String>,
    show_completed: bool,
    animating_until: Option<Instant>,
}

impl BoardView {
    #[must_use]
    pub fn new(show_completed: bool, folder: Option<String>) -> Self {
        Self {
            selection: None,
            offsets: [0; Status::ALL.len()],
            folder,
            show_completed,
            animating_until: None,
        }
    }

    /// The cache partition this board renders from.
    #[must_use]
    pub fn filter(&self) -> TaskFilter {
        TaskFilter {
            folder: self.folder.clone(),
            ..TaskFilter::default()
        }
    }

    #[must_use]
    pub fn selection(&self) -> Option<&EntityId> {
        self.selection.as_ref()
    }

    fn is_animating(&self) -> bool {
        self.animating_until.is_some_and(|until| Instant::now() < until)
    }

    /// Clear an elapsed animation lock.
    pub fn on_tick(&mut self, now: Instant) {
        if self.animating_until.is_some_and(|until| now >= until) {
            self.animating_until = None;
        }
    }

    fn layout(&self, shared: &Shared) -> BoardLayout {
        let filter = self.filter();
        let show_completed = self.show_completed;
        BoardLayout::from_tasks(
            shared
                .cache
                .tasks(&filter)
                .filter(|t| show_completed || !t.status.is_completed()),
        )
    }

    pub fn handle_key<R: RemoteService, B: HostBridge>(
        &mut self,
        key: KeyEvent,
        shared: &mut Shared,
        remote: &R,
        bridge: &B,
    ) -> Option<ViewAction> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(ViewAction::Quit),
            KeyCode::Tab => return Some(ViewAction::SwitchView),
            KeyCode::Char('r') => return Some(ViewAction::Refresh),
            KeyCode::Up | KeyCode::Char('k') => self.step(Dir::Up, shared),
            KeyCode::Down | KeyCode::Char('j') => self.step(Dir::Down, shared),
            KeyCode::Left | KeyCode::Char('h') => self.step(Dir::Left, shared),
            KeyCode::Right | KeyCode::Char('l') => self.step(Dir::Right, shared),
            KeyCode::Char(' ') => self.toggle_selected(shared, remote),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(shared, remote),
            KeyCode::Char('u') => {
                if !shared.undo.is_empty() {
                    undo_last(shared, remote, Utc::now());
                }
            }
            KeyCode::Char('o') => {
                if let Some(id) = &self.selection {
                    bridge.open_task(id);
                }
            }
            KeyCode::Char('a') => {
                let assignee = self
                    .selection
                    .as_ref()
                    .and_then(|id| shared.cache.find_task(id))
                    .and_then(|task| task.assignees.first().cloned());
                if let Some(assignee) = assignee {
                    bridge.open_contact(&assignee);
                }
            }
            KeyCode::Char('f') => self.cycle_folder(shared),
            KeyCode::Char('c') => {
                self.show_completed = !self.show_completed;
                self.reselect(shared);
            }
            _ => {}
        }
        None
    }

    fn step(&mut self, direction: Dir, shared: &Shared) {
        let layout = self.layout(shared);
        self.selection = nav::step(
            &layout,
            self.selection.as_ref(),
            direction,
            self.is_animating(),
        );
    }

    /// Drop a selection that no longer exists on the board.
    fn reselect(&mut self, shared: &Shared) {
        let layout = self.layout(shared);
        let still_there = self
            .selection
            .as_ref()
            .is_some_and(|id| layout.position(id).is_some());
        if !still_there {
            self.selection = layout.first().cloned();
        }
    }

    fn toggle_selected<R: RemoteService>(&mut self, shared: &mut Shared, remote: &R) {
        let Some(id) = self.selection.clone() else {
            return;
        };
        match Mutator::new(&mut shared.cache, remote).toggle_task(&id) {
            Ok(status) => {
                // The card hops columns; lock navigation while it settles.
                self.animating_until = Some(Instant::now() + ANIMATION_LOCK);
                if !self.show_completed && status.is_completed() {
                    self.selection = None;
                    self.reselect(shared);
                }
            }
            Err(err) => self.report(shared, &err),
        }
    }

    fn delete_selected<R: RemoteService>(&mut self, shared: &mut Shared, remote: &R) {
        let Some(id) = self.selection.clone() else {
            return;
        };
        let now = Utc::now();
        match Mutator::new(&mut shared.cache, remote).delete_task(&id) {
            Ok(task) => {
                let toast = shared.toasts.push(
                    ToastKind::Undo,
                    format!("Deleted '{}' — press u to undo", task.title),
                    now,
                );
                shared.undo.record(Entity::Task(task), Some(toast));
                self.selection = None;
                self.reselect(shared);
            }
            Err(err) => self.report(shared, &err),
        }
    }

    fn report(&self, shared: &mut Shared, err: &MutateError) {
        shared
            .toasts
            .push(ToastKind::Error, err.to_string(), Utc::now());
    }

    fn cycle_folder(&mut self, shared: &Shared) {
        let folders = shared.cache.folders();
        self.folder = match &self.folder {
            None => folders.first().cloned(),
            Some(current) => folders
                .iter()
                .position(|f| f == current)
                .and_then(|i| folders.get(i + 1))
                .cloned(),
        };
        self.selection = None;
        self.reselect(shared);
    }

    // -- rendering ----------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame, area: Rect, shared: &Shared) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(area);

        let statuses: Vec<Status> = Status::ALL
            .into_iter()
            .filter(|s| self.show_completed || !s.is_completed())
            .collect();
        #[allow(clippy::cast_possible_truncation)]
        let constraints: Vec<Constraint> = statuses
            .iter()
            .map(|_| Constraint::Ratio(1, statuses.len() as u32))
            .collect();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(rows[0]);

        let filter = self.filter();
        let layout = self.layout(shared);
        for (i, status) in statuses.iter().enumerate() {
            self.render_column(frame, columns[i], shared, &layout, &filter, *status);
        }

        self.render_footer(frame, rows[1], shared);
    }

    fn render_column(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        shared: &Shared,
        layout: &BoardLayout,
        filter: &TaskFilter,
        status: Status,
    ) {
        let Some(column) = layout.columns.iter().find(|c| c.status == status) else {
            return;
        };
        let col_idx = Status::ALL.iter().position(|&s| s == status).unwrap_or(0);
        let tasks: Vec<&Task> = column
            .ids
            .iter()
            .filter_map(|id| shared.cache.tasks(filter).find(|t| &t.id == id))
            .collect();

        let selected_row = self
            .selection
            .as_ref()
            .and_then(|id| layout.position(id))
            .filter(|(col, _)| *col == col_idx)
            .map(|(_, row)| row);

        let height = usize::from(area.height.saturating_sub(2));
        self.offsets[col_idx] =
            viewport::follow(self.offsets[col_idx], selected_row, height, tasks.len());
        let visible = viewport::window(self.offsets[col_idx], height, tasks.len());

        let items: Vec<ListItem> = visible
            .clone()
            .map(|row| {
                let task = tasks[row];
                let mut style = match task.status {
                    Status::Urgent => Style::default().fg(Color::Red),
                    Status::Completed => Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                    Status::New | Status::InProgress => Style::default(),
                };
                if selected_row == Some(row) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                let mut spans = vec![Span::styled(task.title.clone(), style)];
                if let Some(assignee) = task.assignees.first() {
                    spans.push(Span::styled(
                        format!(" @{assignee}"),
                        Style::default().fg(Color::Cyan),
                    ));
                }
                if task.ai.is_some() {
                    spans.push(Span::styled(" ✦", Style::default().fg(Color::Magenta)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let total = shared
            .cache
            .task_entry(filter)
            .map_or(0, |entry| {
                entry.items().filter(|t| t.status == status).count()
            });
        let title = format!(" {status} {total} ");
        let border = if selected_row.is_some() {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let list = List::new(items).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border),
        );
        frame.render_widget(list, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, shared: &Shared) {
        let folder = self.folder.as_deref().unwrap_or("all");
        let undo_hint = if shared.undo.is_empty() {
            String::new()
        } else {
            format!("  u undo ({})", shared.undo.len())
        };
        let keybar = Line::from(Span::styled(
            format!(
                " [{folder}] arrows move · space toggle · d delete · f folder · c completed · r refresh · Tab agenda · q quit{undo_hint}"
            ),
            Style::default().fg(Color::DarkGray),
        ));

        let toast_line = shared.toasts.latest().map_or_else(Line::default, |toast| {
            let style = match toast.kind {
                ToastKind::Error => Style::default().fg(Color::Red),
                ToastKind::Undo => Style::default().fg(Color::Yellow),
                ToastKind::Info => Style::default().fg(Color::Green),
            };
            Line::from(Span::styled(format!(" {}", toast.message), style))
        });

        let footer = Paragraph::new(vec![toast_line, keybar]);
        frame.render_widget(footer, area);
    }
}
