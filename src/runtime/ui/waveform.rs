//! Waveform oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Reduce `buffer` to at most `points` chart points, keeping the larger
/// excursion of each stride so peaks survive.
pub fn scope_points(buffer: &[f32], points: usize) -> Vec<(f64, f64)> {
    if buffer.is_empty() || points == 0 {
        return Vec::new();
    }
    let stride = buffer.len().div_ceil(points);
    let len = buffer.len() as f64;

    buffer
        .chunks(stride)
        .enumerate()
        .map(|(i, chunk)| {
            let y = chunk
                .iter()
                .copied()
                .fold(0.0f32, |acc, x| if x.abs() > acc.abs() { x } else { acc });
            ((i * stride) as f64 / len, y as f64)
        })
        .collect()
}

/// Render the output scope. Drawn red while the monitor reports near-clipping.
pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32], near_clip: bool) {
    let block = Block::default().title(" Output ").borders(Borders::ALL);

    // Braille packs two dots per cell horizontally
    let data = scope_points(audio_buffer, area.width.saturating_sub(2) as usize * 2);
    let color = if near_clip { Color::Red } else { Color::Cyan };

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .labels(vec!["-1", "0", "1"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsampling_keeps_peaks() {
        let mut buffer = vec![0.1f32; 1000];
        buffer[503] = -0.9;
        let points = scope_points(&buffer, 100);
        assert_eq!(points.len(), 100);
        assert!(points.iter().any(|&(_, y)| (y + 0.9).abs() < 1e-6));
        assert_eq!(points[0].0, 0.0);
    }

    #[test]
    fn short_buffers_are_not_stretched() {
        let points = scope_points(&[0.5, -0.5], 100);
        assert_eq!(points.len(), 2);
        assert!(scope_points(&[], 100).is_empty());
    }
}
