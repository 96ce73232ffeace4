use crate::ui::app::{App, ExportProgress, VisibleNode};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Table,
    },
    Frame,
};

const BRAND_DARK: Color = Color::Rgb(0x1F, 0x2F, 0x3C);
const BRAND_SELECT_BG: Color = Color::Rgb(0xC3, 0xD3, 0xE0);
const BRAND_GREEN: Color = Color::Rgb(0x82, 0x9A, 0x68);
const BRAND_ORANGE: Color = Color::Rgb(0x9E, 0x68, 0x3C);
const BRAND_MUTED: Color = Color::Rgb(0x71, 0x65, 0x65);

const HEADER_STYLE: Style = Style::new().fg(BRAND_DARK).add_modifier(Modifier::BOLD);
const SELECTED_STYLE: Style = Style::new()
    .bg(BRAND_SELECT_BG)
    .fg(BRAND_DARK)
    .add_modifier(Modifier::BOLD);
const MARK_COLOR: Color = BRAND_ORANGE;
const CLASS_COLOR: Color = BRAND_GREEN;

pub fn draw_browser(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(10),   // Tree and properties
        Constraint::Length(3), // Status
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    draw_header(frame, chunks[0], app);

    let main = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);
    draw_tree(frame, main[0], app);
    draw_properties(frame, main[1], app);

    draw_status(frame, chunks[2], app);

    draw_footer(
        frame,
        chunks[3],
        " ↑↓ Move | ←→ Collapse/Expand | Space Mark | c Clear | e Export | q Quit ",
    );
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let mut block = Block::default().title(" Status ").borders(Borders::ALL);
    if let Some(summary) = &app.last_export {
        let mut last = format!(
            " Last export: {} rows, {} columns",
            summary.elements, summary.columns
        );
        if summary.error_rows > 0 {
            last.push_str(&format!(", {} failed", summary.error_rows));
        }
        last.push(' ');
        block = block.title(
            Line::from(last)
                .right_aligned()
                .style(Style::new().fg(BRAND_MUTED)),
        );
    }

    let status = Paragraph::new(format!(" {}", app.status)).block(block);
    frame.render_widget(status, area);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let selection = if app.marked.is_empty() {
        "whole model".to_string()
    } else {
        format!("{} roots marked", app.marked.len())
    };
    let title = format!(
        " BIM Tabulator | {} | {} | {} → {} ",
        app.model.name,
        app.model.schema,
        selection,
        app.config.output.display()
    );

    let header = Paragraph::new(title)
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_tree(frame: &mut Frame, area: Rect, app: &App) {
    let nodes = app.visible_nodes();
    let visible_rows = (area.height as usize).saturating_sub(2);

    let scroll_offset = if app.cursor >= visible_rows {
        app.cursor - visible_rows + 1
    } else {
        0
    };

    let items: Vec<ListItem> = nodes
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_rows)
        .map(|(i, node)| tree_item(node, i == app.cursor))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!(" Model ({} elements) ", app.model.total_elements()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BRAND_ORANGE)),
    );
    frame.render_widget(list, area);

    if nodes.len() > visible_rows {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(nodes.len()).position(app.cursor);

        let scrollbar_area = Rect {
            x: area.x + area.width - 1,
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}

fn tree_item(node: &VisibleNode, is_selected: bool) -> ListItem<'static> {
    let indent = "  ".repeat(node.depth);
    let twisty = match (node.has_children, node.expanded) {
        (false, _) => "  ",
        (true, false) => "▸ ",
        (true, true) => "▾ ",
    };
    let style = if is_selected {
        SELECTED_STYLE
    } else {
        Style::default()
    };
    let mark = if node.marked { "● " } else { "" };

    ListItem::new(Line::from(vec![
        Span::raw(format!("{indent}{twisty}")),
        Span::styled(mark, Style::default().fg(MARK_COLOR)),
        Span::styled(node.label.clone(), style),
        Span::styled(format!("  {}", node.class_name), Style::default().fg(CLASS_COLOR)),
    ]))
}

fn draw_properties(frame: &mut Frame, area: Rect, app: &App) {
    let entries = app.highlighted_row();
    let visible_rows = (area.height as usize).saturating_sub(3);

    let rows: Vec<Row> = entries
        .iter()
        .take(visible_rows)
        .map(|(column, value)| Row::new(vec![column.clone(), value.clone()]))
        .collect();

    let widths = [Constraint::Percentage(45), Constraint::Percentage(55)];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Column", "Value"]).style(HEADER_STYLE))
        .block(
            Block::default()
                .title(format!(" Row preview ({} columns) ", entries.len()))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, help: &str) {
    let footer = Paragraph::new(help)
        .style(Style::default().fg(BRAND_MUTED))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

/// Centered gauge drawn over whatever is on screen.
pub fn draw_progress(frame: &mut Frame, progress: &ExportProgress) {
    let [area] = Layout::vertical([Constraint::Length(3)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(area);

    let ratio = if progress.total == 0 {
        0.0
    } else {
        (progress.current as f64 / progress.total as f64).clamp(0.0, 1.0)
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(format!(" {} ", progress.status))
                .borders(Borders::ALL),
        )
        .gauge_style(Style::default().fg(BRAND_GREEN))
        .ratio(ratio)
        .label(format!("{} / {}", progress.current, progress.total));

    frame.render_widget(Clear, area);
    frame.render_widget(gauge, area);
}
