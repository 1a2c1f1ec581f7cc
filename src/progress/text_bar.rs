//! Terminal rendering of a progress frame

use super::frame::ProgressFrame;

const FILLED: char = '█';
const EMPTY: char = '░';
const DIVIDER: char = '|';

/// Render `frame` as a single line `columns` cells wide, followed by the
/// percentage. Dividers are drawn only when enabled in the appearance.
pub fn render_text_bar(frame: &ProgressFrame, columns: usize) -> String {
    let fraction = frame.percent_complete.clamp(0.0, 1.0);
    let percent = (fraction * 100.0).round() as u32;
    if columns == 0 {
        return format!("{:>3}%", percent);
    }

    let filled = ((fraction * columns as f32).round() as usize).min(columns);
    let mut cells: Vec<char> = (0..columns)
        .map(|i| if i < filled { FILLED } else { EMPTY })
        .collect();

    for position in frame.visible_dividers() {
        let column = ((position.clamp(0.0, 1.0) * columns as f32) as usize).min(columns - 1);
        cells[column] = DIVIDER;
    }

    format!("[{}] {:>3}%", cells.into_iter().collect::<String>(), percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(percent: f32, dividers: &[f32], enabled: bool) -> ProgressFrame {
        let mut frame = ProgressFrame::new();
        frame.percent_complete = percent;
        frame.dividers = dividers.to_vec();
        frame.appearance.dividers_enabled = enabled;
        frame
    }

    #[test]
    fn renders_fill_and_percent() {
        assert_eq!(render_text_bar(&frame(0.0, &[], false), 4), "[░░░░]   0%");
        assert_eq!(render_text_bar(&frame(0.5, &[], false), 4), "[██░░]  50%");
        assert_eq!(render_text_bar(&frame(1.0, &[], false), 4), "[████] 100%");
    }

    #[test]
    fn draws_dividers_only_when_enabled() {
        assert_eq!(render_text_bar(&frame(0.5, &[0.25], false), 8), "[████░░░░]  50%");
        assert_eq!(render_text_bar(&frame(0.5, &[0.25], true), 8), "[██|█░░░░]  50%");
        assert_eq!(render_text_bar(&frame(1.0, &[1.0], true), 4), "[███|] 100%");
    }

    #[test]
    fn zero_columns_prints_percent_only() {
        assert_eq!(render_text_bar(&frame(0.42, &[], false), 0), " 42%");
    }
}
