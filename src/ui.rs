use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap,
};

use crate::app::{App, Mode, PickTarget, View};
use crate::dates::DAY_NAMES;
use crate::hours::HourField;

struct Theme {
    background: Color,
    foreground: Color,
    muted: Color,
    accent: Color,
    error: Color,
}

impl Theme {
    fn default_dark() -> Self {
        Theme {
            background: Color::Reset,
            foreground: Color::White,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            error: Color::Red,
        }
    }

    fn panel_style(&self) -> Style {
        Style::default().bg(self.background).fg(self.foreground)
    }

    fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    fn border_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    fn accent_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();
    let theme = Theme::default_dark();

    match app.view {
        View::Timesheet => draw_timesheet(frame, app, size, &theme),
        View::Assignments => draw_assignments(frame, app, size, &theme),
    }

    match app.mode {
        Mode::Loading => draw_overlay(frame, size, "Loading...", &theme),
        Mode::Error => draw_overlay(
            frame,
            size,
            app.status.as_deref().unwrap_or("Unknown error"),
            &theme,
        ),
        Mode::Login => draw_login(frame, app, size, &theme),
        Mode::EmployeeSelect => {
            draw_picker(frame, size, "Select Employee", employee_items(app, &theme), &mut app.employee_state, &theme)
        }
        Mode::ProjectSelect(target) => {
            let title = match target {
                PickTarget::Scope => "Select Project",
                PickTarget::RowProject => "Project for Row",
            };
            draw_picker(frame, size, title, project_items(app, &theme), &mut app.project_state, &theme)
        }
        Mode::RoleSelect => {
            draw_picker(frame, size, "Add Role", role_items(app, &theme), &mut app.role_state, &theme)
        }
        Mode::WeekInput => draw_input(frame, app, size, "Go to week (YYYY-MM-DD)", &theme),
        Mode::CellInput => draw_input(frame, app, size, "Hours (blank, or 0.25–24)", &theme),
        Mode::NotesInput => draw_input(frame, app, size, "Notes", &theme),
        Mode::TicketInput => draw_input(frame, app, size, "Ticket reference", &theme),
        Mode::RateInput(_) => draw_input(frame, app, size, "Hourly rate (blank for none)", &theme),
        Mode::HoursInput => draw_input(frame, app, size, "Estimated hours", &theme),
        Mode::Browse => {}
    }

    if matches!(app.mode, Mode::Browse) && !app.show_help {
        if let Some(toast) = app.active_toast() {
            draw_toast(frame, size, &toast.message, toast.is_error, &theme);
        }
    }

    if app.show_help {
        draw_help(frame, app.view, size, &theme);
    }
}

fn draw_timesheet(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let content = area.inner(Margin {
        vertical: 1,
        horizontal: 2,
    });
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
            Constraint::Length(2),
        ])
        .split(content);

    let employee = app
        .selected_employee
        .as_ref()
        .map(|e| e.name.clone())
        .unwrap_or_else(|| "—".to_string());
    let dirty = app.sheet.as_ref().is_some_and(|s| s.is_dirty());
    let role = app
        .session
        .as_ref()
        .map(|s| format!("  ({})", s.role.label()))
        .unwrap_or_default();
    let queued = app
        .sheet
        .as_ref()
        .map(|s| s.pending_deletion_count())
        .unwrap_or(0);
    let mut header_spans = vec![
        Span::styled("Timesheet ", theme.accent_style()),
        Span::raw(format!("{employee}{role}  {}", app.week.label())),
        Span::styled(
            if dirty { "  [unsaved]" } else { "" },
            Style::default().fg(theme.error),
        ),
    ];
    if queued > 0 {
        header_spans.push(Span::styled(
            format!("  [{queued} queued for deletion]"),
            Style::default().fg(theme.error),
        ));
    }
    let header = Line::from(header_spans);
    frame.render_widget(
        Paragraph::new(header).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(theme.border_style()),
        ),
        chunks[0],
    );

    let mut rows: Vec<Row> = Vec::new();
    if let Some(sheet) = &app.sheet {
        for (row_index, sheet_row) in sheet.rows.iter().enumerate() {
            let project = sheet_row
                .project_id
                .and_then(|id| app.projects.iter().find(|p| p.id == id))
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "-".to_string());
            let billable = match sheet_row.billable {
                None => "—",
                Some(true) => "yes",
                Some(false) => "no",
            };

            let mut cells = vec![
                Cell::from(project),
                Cell::from(billable.to_string()),
            ];
            for (day, field) in sheet_row.hours.iter().enumerate() {
                let text = match field {
                    HourField::Empty => String::new(),
                    _ => field.display(),
                };
                let style = if row_index == app.cursor_row && day == app.cursor_day {
                    Style::default()
                        .bg(theme.accent)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD)
                } else {
                    theme.panel_style()
                };
                cells.push(Cell::from(text).style(style));
            }
            cells.push(Cell::from(
                sheet_row.notes.clone().unwrap_or_else(|| "-".to_string()),
            ));

            let row_style = if row_index == app.cursor_row {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                theme.panel_style()
            };
            rows.push(Row::new(cells).style(row_style));
        }
    }

    let mut header_cells = vec![Cell::from("Project"), Cell::from("Bill")];
    for label in app.week.day_labels() {
        header_cells.push(Cell::from(label));
    }
    header_cells.push(Cell::from("Notes"));

    let widths = [
        Constraint::Min(14),
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(header_cells).style(theme.accent_style()))
        .block(panel_block("Entries", theme));
    frame.render_widget(table, chunks[1]);

    let totals = app
        .sheet
        .as_ref()
        .map(|s| s.daily_totals())
        .unwrap_or([0.0; 7]);
    let week_total: f64 = totals.iter().sum();
    let mut totals_spans = vec![Span::styled("Totals  ", theme.muted_style())];
    for (name, total) in DAY_NAMES.iter().zip(totals) {
        let style = if total > 24.0 {
            Style::default().fg(theme.error)
        } else {
            theme.panel_style()
        };
        totals_spans.push(Span::styled(format!("{name} {total:.2}  "), style));
    }
    totals_spans.push(Span::styled(
        format!("Σ {week_total:.2}h"),
        theme.accent_style(),
    ));
    frame.render_widget(Paragraph::new(Line::from(totals_spans)), chunks[2]);

    let footer = match &app.status {
        Some(status) => Line::from(Span::styled(status.clone(), Style::default().fg(theme.error))),
        None => Line::from(Span::styled(
            "↑↓←→ move  e edit  n notes  t ticket  b billable  p project  a add  x remove  s save  [/] week  u employee  Tab assignments  h help  q quit",
            theme.muted_style(),
        )),
    };
    frame.render_widget(
        Paragraph::new(footer).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(theme.border_style()),
        ),
        chunks[3],
    );
}

fn draw_assignments(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let content = area.inner(Margin {
        vertical: 1,
        horizontal: 2,
    });
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0), Constraint::Length(2)])
        .split(content);

    let project = app
        .selected_project
        .as_ref()
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "—".to_string());
    let total = app
        .assign_editor
        .as_ref()
        .map(|e| e.total_estimated_hours())
        .unwrap_or(0);
    let dirty = app.assign_editor.as_ref().is_some_and(|e| e.is_dirty());
    let header = Line::from(vec![
        Span::styled("Assignments ", theme.accent_style()),
        Span::raw(format!("{project}  total {total}h")),
        Span::styled(
            if dirty { "  [unsaved]" } else { "" },
            Style::default().fg(theme.error),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(header).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(theme.border_style()),
        ),
        chunks[0],
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    let role_rows: Vec<ListItem> = app
        .assign_editor
        .as_ref()
        .map(|editor| {
            editor
                .roles
                .iter()
                .enumerate()
                .map(|(index, role)| {
                    let style = if index == app.assign_role_cursor {
                        Style::default()
                            .fg(theme.accent)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        theme.panel_style()
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(role.role_name.clone(), style),
                        Span::styled(
                            format!("  {}h  {} assigned", role.estimated_hours, role.employees.len()),
                            theme.muted_style(),
                        ),
                    ]))
                })
                .collect()
        })
        .unwrap_or_else(|| vec![ListItem::new("No roles yet — press a to add one")]);
    frame.render_widget(
        List::new(role_rows).block(panel_block("Roles", theme)),
        body[0],
    );

    let current_role = app
        .assign_editor
        .as_ref()
        .and_then(|e| e.roles.get(app.assign_role_cursor));
    let employee_rows: Vec<ListItem> = app
        .employees
        .iter()
        .enumerate()
        .map(|(index, employee)| {
            let member = current_role
                .is_some_and(|role| role.employees.contains(&employee.id));
            let rate = current_role
                .and_then(|role| role.rate_of(employee.id))
                .map(|rate| format!("  @{rate:.2}/h"))
                .unwrap_or_default();
            let marker = if member { "[x] " } else { "[ ] " };
            let style = if index == app.assign_emp_cursor {
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
            } else if member {
                theme.panel_style()
            } else {
                theme.muted_style()
            };
            ListItem::new(Line::from(Span::styled(
                format!("{marker}{}{rate}", employee.name),
                style,
            )))
        })
        .collect();
    frame.render_widget(
        List::new(employee_rows).block(panel_block("Employees", theme)),
        body[1],
    );

    let footer = match &app.status {
        Some(status) => Line::from(Span::styled(status.clone(), Style::default().fg(theme.error))),
        None => Line::from(Span::styled(
            "↑↓ role  ←→ employee  Space assign  t rate  a add role  e hours  x remove  s save  p project  Tab timesheet  h help  q quit",
            theme.muted_style(),
        )),
    };
    frame.render_widget(
        Paragraph::new(footer).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(theme.border_style()),
        ),
        chunks[2],
    );
}

fn draw_login(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let block = centered_rect(60, 30, area);
    frame.render_widget(Clear, block);

    let masked = "•".repeat(app.input.chars().count());
    let mut lines = vec![
        Line::from(Span::styled("Sign in", theme.accent_style())),
        Line::from(""),
        Line::from("Paste your access token and press Enter."),
        Line::from(""),
        Line::from(Span::raw(format!("Token: {masked}"))),
    ];
    if let Some(status) = &app.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(theme.error),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(panel_block("Login", theme))
            .wrap(Wrap { trim: true }),
        block,
    );
}

fn employee_items(app: &App, theme: &Theme) -> Vec<ListItem<'static>> {
    app.employees
        .iter()
        .map(|employee| {
            let role = employee
                .role
                .clone()
                .map(|role| format!("  ({role})"))
                .unwrap_or_default();
            ListItem::new(Line::from(format!("{}{role}", employee.name)))
                .style(theme.panel_style())
        })
        .collect()
}

fn project_items(app: &App, theme: &Theme) -> Vec<ListItem<'static>> {
    app.projects
        .iter()
        .map(|project| {
            let company = project
                .company_name
                .clone()
                .map(|name| format!("  ({name})"))
                .unwrap_or_default();
            ListItem::new(Line::from(format!("{}{company}", project.name)))
                .style(theme.panel_style())
        })
        .collect()
}

fn role_items(app: &App, theme: &Theme) -> Vec<ListItem<'static>> {
    app.role_catalog
        .iter()
        .map(|role| ListItem::new(Line::from(role.name.clone())).style(theme.panel_style()))
        .collect()
}

fn draw_picker(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: Vec<ListItem>,
    state: &mut ratatui::widgets::ListState,
    theme: &Theme,
) {
    let block = centered_rect(50, 60, area);
    frame.render_widget(Clear, block);
    let list = List::new(items)
        .block(panel_block(title, theme))
        .highlight_style(
            Style::default()
                .bg(theme.accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▍ ");
    frame.render_stateful_widget(list, block, state);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect, title: &str, theme: &Theme) {
    let block = centered_rect(50, 20, area);
    frame.render_widget(Clear, block);
    let mut lines = vec![Line::from(Span::raw(format!("> {}", app.input)))];
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(theme.error),
        )));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(panel_block(title, theme))
            .wrap(Wrap { trim: true }),
        block,
    );
}

fn draw_overlay(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let block = centered_rect(50, 20, area);
    frame.render_widget(Clear, block);
    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(panel_block("", theme))
            .wrap(Wrap { trim: true }),
        block,
    );
}

fn draw_toast(frame: &mut Frame, area: Rect, message: &str, is_error: bool, theme: &Theme) {
    let width = (message.chars().count() as u16 + 4).min(area.width);
    let rect = Rect {
        x: area.width.saturating_sub(width + 2),
        y: area.height.saturating_sub(4),
        width,
        height: 3,
    };
    frame.render_widget(Clear, rect);
    let style = if is_error {
        Style::default().fg(theme.error)
    } else {
        Style::default().fg(theme.accent)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(message.to_string(), style))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(theme.border_style()),
            ),
        rect,
    );
}

fn draw_help(frame: &mut Frame, view: View, area: Rect, theme: &Theme) {
    let block = centered_rect(70, 70, area);
    frame.render_widget(Clear, block);

    let keys: &[(&str, &str)] = match view {
        View::Timesheet => &[
            ("↑ ↓ ← →", "move between rows and day columns"),
            ("e / Enter", "edit the selected hour cell"),
            ("n", "edit the row's notes"),
            ("t", "edit the row's ticket reference"),
            ("b", "cycle billable: unset → yes → no"),
            ("p", "set the row's project"),
            ("a / x", "add a row / queue a row for deletion"),
            ("s", "save (deletes, then creates, then updates)"),
            ("[ ]", "previous / next week"),
            ("w", "jump to a week by date"),
            ("u", "switch employee (managers)"),
            ("c", "copy week summary to clipboard"),
            ("Tab", "switch to project assignments"),
        ],
        View::Assignments => &[
            ("↑ ↓", "select role"),
            ("← →", "select employee"),
            ("Space", "assign / unassign employee"),
            ("t", "set the employee's hourly rate"),
            ("a", "add a role from the catalog"),
            ("e", "edit the role's estimated hours"),
            ("x", "remove the role"),
            ("s", "save (sequential, role by role)"),
            ("p", "switch project"),
            ("Tab", "switch to timesheet"),
        ],
    };

    let mut lines = vec![
        Line::from(Span::styled("Keys", theme.accent_style())),
        Line::from(""),
    ];
    for (key, description) in keys {
        lines.push(Line::from(vec![
            Span::styled(format!("{key:<10}"), theme.accent_style()),
            Span::raw(description.to_string()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "h or Esc to close",
        theme.muted_style(),
    )));

    frame.render_widget(
        Paragraph::new(lines)
            .block(panel_block("Help", theme))
            .wrap(Wrap { trim: true }),
        block,
    );
}

fn panel_block(title: &str, theme: &Theme) -> Block<'static> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style())
        .style(theme.panel_style());
    if !title.is_empty() {
        block = block.title(title.to_string());
    }
    block
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
