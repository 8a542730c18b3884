use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::bootstrap::PanelState;
use crate::tui::view::BootstrapView;

use super::header::{panel_block, state_color};

const ONION: [&str; 7] = [
    "    )    ",
    "   ( )   ",
    "  /   \\  ",
    " / ( ) \\ ",
    "| ( ( ) )|",
    " \\ (   )/ ",
    "  '---'  ",
];

/// Purple scaled by pulse intensity, never fully dark.
fn onion_color(intensity: f64) -> Color {
    let level = 0.3 + 0.7 * intensity.clamp(0.0, 1.0);
    let scale = |channel: f64| (channel * level).round() as u8;
    Color::Rgb(scale(125.0), scale(70.0), scale(152.0))
}

pub(super) fn render_bootstrap_pane(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &BootstrapView,
    state: PanelState,
    last_exit: Option<&str>,
) {
    let glyph = Style::default()
        .fg(onion_color(view.intensity()))
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from("")];
    lines.extend(ONION.iter().map(|row| Line::from(Span::styled(*row, glyph))));
    lines.push(Line::from(""));

    if view.bootstrapping() {
        let text_style = if view.error_visible() {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(view.text().to_string(), text_style)));
        if view.error_visible() {
            if let Some(exit) = last_exit {
                lines.push(Line::from(Span::styled(
                    format!("tor: {exit}"),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::from(Span::styled(
                "press c to try again or s to stop",
                Style::default().fg(Color::DarkGray),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "Connect to Tor",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            "press c to connect",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let pane = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel_block(None, state_color(state)));
    frame.render_widget(pane, area);
}

#[cfg(test)]
mod tests {
    use super::onion_color;
    use ratatui::style::Color;

    #[test]
    fn onion_dims_with_intensity_but_stays_visible() {
        assert_eq!(onion_color(1.0), Color::Rgb(125, 70, 152));
        assert!(matches!(
            onion_color(0.0),
            Color::Rgb(r, g, b) if (30..45).contains(&r) && g > 0 && b > r
        ));
    }
}
