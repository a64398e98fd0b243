use ratatui::{prelude::*, widgets::*};
use trap_world_core::{
    Position,
    element::{Color as CellColor, Element},
    state::Snapshot,
};

const HELP: &str = "Move: w a s d / arrows   Interact: e   Quit: q / Esc";

/// Renders one snapshot of the game.
pub fn draw(frame: &mut Frame, snapshot: &Snapshot) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Area for the map
            Constraint::Length(3), // Status bar
            Constraint::Length(2), // Key help
        ])
        .split(frame.area());

    let map = Paragraph::new(map_lines(snapshot))
        .block(Block::default().title("Trap World").borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(map, main_layout[0]);

    let status = Paragraph::new(snapshot.status.as_str())
        .block(Block::default().title("Status").borders(Borders::ALL));
    frame.render_widget(status, main_layout[1]);

    let help_text = Paragraph::new(HELP)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// One line per map row, with the player drawn over its cell.
fn map_lines(snapshot: &Snapshot) -> Vec<Line<'static>> {
    snapshot
        .grid
        .rows()
        .enumerate()
        .map(|(y, row)| {
            let spans: Vec<Span> = row
                .iter()
                .enumerate()
                .map(|(x, cell)| {
                    let element = if snapshot.player == Position::new(x, y) {
                        &Element::CHARACTER
                    } else {
                        cell
                    };
                    Span::styled(element.symbol().to_string(), element_style(element))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn element_style(element: &Element) -> Style {
    Style::default()
        .fg(color(element.foreground()))
        .bg(color(element.background()))
}

fn color(color: CellColor) -> Color {
    match color {
        CellColor::Default => Color::Reset,
        CellColor::Black => Color::Black,
        CellColor::DarkGray => Color::DarkGray,
        CellColor::Red => Color::Red,
        CellColor::Green => Color::Green,
    }
}
