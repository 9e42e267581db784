//! Agenda view.
//!
//! Schedules in one flat, chronologically sorted list split by a "now" rule
//! into upcoming and past entries. Key bindings: arrows/jk move, `d` deletes,
//! `u` undoes, `o` opens via the host bridge, `p` cycles the phase filter,
//! `r` refetches, `Tab` switches back to the board, `q` quits.

use super::{undo_last, viewport, Shared, ViewAction};
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use slate_core::bridge::HostBridge;
use slate_core::cache::ScheduleFilter;
use slate_core::model::{Entity, EntityId, Phase, Schedule};
use slate_core::mutate::{MutateError, Mutator, RemoteService};
use slate_core::notify::ToastKind;

pub struct AgendaView {
    selection: Option<EntityId>,
    offset: usize,
    phase: Option<Phase>,
}

impl AgendaView {
    #[must_use]
    pub fn new() -> Self {
        Self {
            selection: None,
            offset: 0,
            phase: None,
        }
    }

    /// The cache partition this agenda renders from.
    #[must_use]
    pub fn filter(&self) -> ScheduleFilter {
        ScheduleFilter {
            phase: self.phase,
            ..ScheduleFilter::default()
        }
    }

    #[must_use]
    pub fn selection(&self) -> Option<&EntityId> {
        self.selection.as_ref()
    }

    /// Ids in display order: upcoming first (soonest on top), then past.
    fn ordered_ids(&self, shared: &Shared, now: DateTime<Utc>) -> Vec<EntityId> {
        let filter = self.filter();
        let mut schedules: Vec<&Schedule> = shared.cache.schedules(&filter).collect();
        schedules.sort_by_key(|s| s.time.start);
        let (future, past): (Vec<&Schedule>, Vec<&Schedule>) = schedules
            .into_iter()
            .partition(|s| s.phase(now) == Phase::Future);
        future
            .into_iter()
            .chain(past)
            .map(|s| s.id.clone())
            .collect()
    }

    fn selected_row(&self, ids: &[EntityId]) -> Option<usize> {
        self.selection
            .as_ref()
            .and_then(|id| ids.iter().position(|candidate| candidate == id))
    }

    pub fn handle_key<R: RemoteService, B: HostBridge>(
        &mut self,
        key: KeyEvent,
        shared: &mut Shared,
        remote: &R,
        bridge: &B,
        now: DateTime<Utc>,
    ) -> Option<ViewAction> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(ViewAction::Quit),
            KeyCode::Tab => return Some(ViewAction::SwitchView),
            KeyCode::Char('r') => return Some(ViewAction::Refresh),
            KeyCode::Up | KeyCode::Char('k') => self.step(-1, shared, now),
            KeyCode::Down | KeyCode::Char('j') => self.step(1, shared, now),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(shared, remote, now),
            KeyCode::Char('u') => {
                if !shared.undo.is_empty() {
                    undo_last(shared, remote, now);
                }
            }
            KeyCode::Char('o') => {
                if let Some(id) = &self.selection {
                    bridge.open_schedule(id);
                }
            }
            KeyCode::Char('p') => {
                self.phase = match self.phase {
                    None => Some(Phase::Future),
                    Some(Phase::Future) => Some(Phase::Past),
                    Some(Phase::Past) => None,
                };
                self.reselect(shared, now);
            }
            _ => {}
        }
        None
    }

    /// Move selection without wrapping at either end.
    fn step(&mut self, delta: isize, shared: &Shared, now: DateTime<Utc>) {
        let ids = self.ordered_ids(shared, now);
        if ids.is_empty() {
            self.selection = None;
            return;
        }
        let next = match self.selected_row(&ids) {
            None => 0,
            Some(row) => row
                .saturating_add_signed(delta)
                .min(ids.len() - 1),
        };
        self.selection = ids.get(next).cloned();
    }

    fn reselect(&mut self, shared: &Shared, now: DateTime<Utc>) {
        let ids = self.ordered_ids(shared, now);
        if self.selected_row(&ids).is_none() {
            self.selection = ids.first().cloned();
        }
    }

    fn delete_selected<R: RemoteService>(
        &mut self,
        shared: &mut Shared,
        remote: &R,
        now: DateTime<Utc>,
    ) {
        let Some(id) = self.selection.clone() else {
            return;
        };
        match Mutator::new(&mut shared.cache, remote).delete_schedule(&id) {
            Ok(schedule) => {
                let toast = shared.toasts.push(
                    ToastKind::Undo,
                    format!("Deleted '{}' — press u to undo", schedule.title),
                    now,
                );
                shared
                    .undo
                    .record(Entity::Schedule(schedule), Some(toast));
                self.selection = None;
                self.reselect(shared, now);
            }
            Err(err) => self.report(shared, &err, now),
        }
    }

    fn report(&self, shared: &mut Shared, err: &MutateError, now: DateTime<Utc>) {
        shared.toasts.push(ToastKind::Error, err.to_string(), now);
    }

    // -- rendering ----------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame, area: Rect, shared: &Shared, now: DateTime<Utc>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(area);

        let ids = self.ordered_ids(shared, now);
        let selected_row = self.selected_row(&ids);

        let height = usize::from(rows[0].height.saturating_sub(2));
        self.offset = viewport::follow(self.offset, selected_row, height, ids.len());
        let visible = viewport::window(self.offset, height, ids.len());

        let items: Vec<ListItem> = visible
            .filter_map(|row| {
                let schedule = shared.cache.find_schedule(&ids[row])?;
                Some(self.render_entry(schedule, selected_row == Some(row), now))
            })
            .collect();

        let phase_label = self.phase.map_or("all", |p| match p {
            Phase::Past => "past",
            Phase::Future => "upcoming",
        });
        let total = shared
            .cache
            .schedule_entry(&self.filter())
            .map_or(0, |entry| entry.total);
        let list = List::new(items).block(
            Block::default()
                .title(format!(" agenda [{phase_label}] {}/{total} ", ids.len()))
                .borders(Borders::ALL),
        );
        frame.render_widget(list, rows[0]);

        self.render_footer(frame, rows[1], shared);
    }

    fn render_entry(&self, schedule: &Schedule, selected: bool, now: DateTime<Utc>) -> ListItem {
        let past = schedule.phase(now) == Phase::Past;
        let mut style = if past {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            style = style.add_modifier(Modifier::REVERSED);
        }

        let when = schedule.time.start.format("%a %d %b %H:%M");
        let mut spans = vec![
            Span::styled(format!("{when}  "), Style::default().fg(Color::Blue)),
            Span::styled(schedule.title.clone(), style),
        ];
        if let Some(location) = &schedule.location {
            spans.push(Span::styled(
                format!(" · {location}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if !schedule.attendees.is_empty() {
            spans.push(Span::styled(
                format!(" ({})", schedule.attendees.join(", ")),
                Style::default().fg(Color::Cyan),
            ));
        }
        ListItem::new(Line::from(spans))
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, shared: &Shared) {
        let undo_hint = if shared.undo.is_empty() {
            String::new()
        } else {
            format!("  u undo ({})", shared.undo.len())
        };
        let keybar = Line::from(Span::styled(
            format!(
                " jk move · d delete · o open · p phase · r refresh · Tab board · q quit{undo_hint}"
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
        frame.render_widget(Paragraph::new(vec![toast_line, keybar]), area);
    }
}

impl Default for AgendaView {
    fn default() -> Self {
        Self::new()
    }
}
