use taskdeck_shared::{Priority, Task};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

use crate::api::TaskApi;
use crate::app::{App, DraftField, Mode};
use crate::store::PriorityFilter;

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Critical => Color::Red,
        Priority::High => Color::LightRed,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn filter_color(filter: PriorityFilter) -> Color {
    match filter {
        PriorityFilter::All => Color::White,
        PriorityFilter::Only(priority) => priority_color(priority),
    }
}

pub fn draw<B: Backend, A: TaskApi>(f: &mut Frame<B>, app: &App<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.size());

    draw_header(f, app, chunks[0]);
    draw_filters(f, app, chunks[1]);
    draw_tasks(f, app, chunks[2]);
    draw_prompt(f, app, chunks[3]);
    draw_help(f, app, chunks[4]);
}

fn draw_header<B: Backend, A: TaskApi>(f: &mut Frame<B>, app: &App<A>, area: Rect) {
    let (shown, total) = app.store().counts();
    let header = Paragraph::new(Spans::from(vec![
        Span::styled(
            "Task Manager",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{shown} / {total} tasks"),
            Style::default().fg(Color::Gray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).title("taskdeck"))
    .alignment(Alignment::Left);
    f.render_widget(header, area);
}

fn draw_filters<B: Backend, A: TaskApi>(f: &mut Frame<B>, app: &App<A>, area: Rect) {
    let titles = PriorityFilter::ALL
        .iter()
        .map(|filter| {
            Spans::from(Span::styled(
                filter.label(),
                Style::default().fg(filter_color(*filter)),
            ))
        })
        .collect();
    let selected = PriorityFilter::ALL
        .iter()
        .position(|f| *f == app.store().filter())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Filter"))
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_widget(tabs, area);
}

fn task_line(task: &Task) -> Spans<'static> {
    let checkbox = if task.completed { "[x] " } else { "[ ] " };
    let title_style = if task.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    let due = match task.due_date {
        Some(due) => format!("Due: {}", due.format("%Y-%m-%d")),
        None => "No due date".to_string(),
    };

    Spans::from(vec![
        Span::raw(checkbox),
        Span::styled(task.title.clone(), title_style),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", task.priority.label()),
            Style::default().fg(priority_color(task.priority)),
        ),
        Span::raw("  "),
        Span::styled(
            if task.completed { "completed" } else { "pending" },
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        Span::styled(due, Style::default().fg(Color::LightBlue)),
    ])
}

fn draw_tasks<B: Backend, A: TaskApi>(f: &mut Frame<B>, app: &App<A>, area: Rect) {
    let visible = app.store().visible_tasks();
    let block = Block::default().borders(Borders::ALL).title("Your agenda");

    if visible.is_empty() {
        let empty = Paragraph::new("You don't have tasks for the selected filter.")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|task| ListItem::new(task_line(task)))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected()));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_prompt<B: Backend, A: TaskApi>(f: &mut Frame<B>, app: &App<A>, area: Rect) {
    let (title, line) = match app.mode() {
        Mode::Normal => match app.store().error() {
            Some(error) => (
                "Error",
                Spans::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))),
            ),
            None => ("Status", Spans::from("Ready")),
        },
        Mode::Adding(draft) => {
            let focus = |field| {
                if draft.field == field {
                    Style::default().add_modifier(Modifier::UNDERLINED)
                } else {
                    Style::default()
                }
            };
            (
                "Add a task",
                Spans::from(vec![
                    Span::raw("Title: "),
                    Span::styled(draft.title.clone(), focus(DraftField::Title)),
                    Span::raw("  Priority: "),
                    Span::styled(
                        draft.priority.label(),
                        Style::default().fg(priority_color(draft.priority)),
                    ),
                    Span::raw("  Due (YYYY-MM-DD): "),
                    Span::styled(draft.due_date.clone(), focus(DraftField::DueDate)),
                ]),
            )
        }
        Mode::EditingTitle { buffer, .. } => ("Edit title", Spans::from(buffer.clone())),
        Mode::EditingDueDate { buffer, .. } => (
            "Due date (YYYY-MM-DD, empty to clear)",
            Spans::from(buffer.clone()),
        ),
        Mode::ConfirmDelete { .. } => (
            "Delete",
            Spans::from("Are you sure you want to delete the task? (y/n)"),
        ),
    };

    let mut lines = vec![line];
    if !matches!(app.mode(), Mode::Normal) {
        if let Some(error) = app.store().error() {
            lines.push(Spans::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            )));
        }
    }

    let prompt = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(prompt, area);
}

fn draw_help<B: Backend, A: TaskApi>(f: &mut Frame<B>, app: &App<A>, area: Rect) {
    let help = match app.mode() {
        Mode::Normal => {
            "a add  space toggle  e edit  p priority  d due  x delete  tab filter  r reload  q quit"
        }
        Mode::Adding(_) => "enter save  tab switch field  up/down priority  esc cancel",
        Mode::EditingTitle { .. } | Mode::EditingDueDate { .. } => "enter save  esc cancel",
        Mode::ConfirmDelete { .. } => "y confirm  n cancel",
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
