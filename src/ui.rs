use image::imageops::FilterType;
use ratatui::{prelude::*, widgets::*};

use crate::constants::{EMPTY_PREDICTIONS, PLACEHOLDER_FRAME};
use crate::models::{Frame, PredictionRecord, SessionState};

/// Downscale a JPEG into half-block cells: each cell shows two pixels
/// stacked, the upper one as foreground and the lower one as background.
pub fn frame_to_lines(jpeg: &[u8], width: u16, height: u16) -> Option<Vec<Line<'static>>> {
    if width == 0 || height == 0 {
        return None;
    }
    let img = match image::load_from_memory(jpeg) {
        Ok(img) => img,
        Err(e) => {
            tracing::debug!(error = %e, bytes = jpeg.len(), "Frame could not be decoded");
            return None;
        }
    };
    let thumb = img
        .resize(width as u32, height as u32 * 2, FilterType::Triangle)
        .to_rgb8();
    let (w, h) = thumb.dimensions();

    let lines = (0..h)
        .step_by(2)
        .map(|y| {
            let spans: Vec<Span<'static>> = (0..w)
                .map(|x| {
                    let top = thumb.get_pixel(x, y);
                    let bottom = if y + 1 < h { thumb.get_pixel(x, y + 1) } else { top };
                    Span::styled(
                        "▀",
                        Style::default()
                            .fg(Color::Rgb(top[0], top[1], top[2]))
                            .bg(Color::Rgb(bottom[0], bottom[1], bottom[2])),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect();
    Some(lines)
}

/// Placeholder shown instead of a frame
pub fn placeholder_lines() -> Vec<Line<'static>> {
    PLACEHOLDER_FRAME
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::DarkGray))))
        .collect()
}

/// Keeps the decoded preview of the last frame, decoding is too slow to
/// repeat on every draw
#[derive(Default)]
pub struct FramePreview {
    key: Option<(u64, u16, u16)>,
    lines: Vec<Line<'static>>,
}

impl FramePreview {
    pub fn lines(&mut self, frame: Option<&Frame>, width: u16, height: u16) -> Vec<Line<'static>> {
        let Some(frame) = frame else {
            self.key = None;
            self.lines.clear();
            return placeholder_lines();
        };

        let key = (frame.seq, width, height);
        if self.key != Some(key) {
            // An undecodable frame keeps the previous picture
            if let Some(lines) = frame_to_lines(&frame.jpeg, width, height) {
                self.lines = lines;
            }
            self.key = Some(key);
        }

        if self.lines.is_empty() {
            placeholder_lines()
        } else {
            self.lines.clone()
        }
    }
}

/// Numbered prediction rows, or the empty-state message
pub fn prediction_lines(predictions: &[PredictionRecord]) -> Vec<Line<'static>> {
    if predictions.is_empty() {
        return vec![Line::from(Span::styled(
            EMPTY_PREDICTIONS,
            Style::default().fg(Color::DarkGray),
        ))];
    }

    predictions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>2}. {:<12}", i + 1, p.gesture),
                    Style::default().fg(Color::Cyan).bold(),
                ),
                Span::styled(p.local_time_label(), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect()
}

/// Renders a control button
pub fn render_control<'a>(label: &'a str, key: char, enabled: bool, color: Color) -> Paragraph<'a> {
    let style = if enabled {
        Style::default().fg(Color::Black).bg(color).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Paragraph::new(format!(" [{}] {} ", key, label))
        .style(style)
        .alignment(Alignment::Center)
}

/// Renders a statistic card
pub fn render_stat<'a>(title: &'a str, value: String) -> Paragraph<'a> {
    Paragraph::new(Line::from(Span::styled(value, Style::default().fg(Color::Yellow).bold())))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title))
}

/// Session state color
pub fn session_color(state: SessionState) -> Color {
    match state {
        SessionState::Running => Color::Green,
        SessionState::Starting => Color::Yellow,
        SessionState::Stopped => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;

    fn red_png(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([255, 0, 0])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_frame_to_half_blocks() {
        let lines = frame_to_lines(&red_png(4, 4), 4, 2).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 4);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Rgb(255, 0, 0)));
    }

    #[test]
    fn test_garbage_frame_keeps_placeholder() {
        assert!(frame_to_lines(b"not an image", 10, 10).is_none());
        let mut preview = FramePreview::default();
        let frame = Frame {
            seq: 1,
            jpeg: Arc::from(&b"not an image"[..]),
        };
        assert_eq!(preview.lines(Some(&frame), 10, 10), placeholder_lines());
    }

    #[test]
    fn test_preview_reverts_to_placeholder() {
        let mut preview = FramePreview::default();
        let frame = Frame {
            seq: 1,
            jpeg: Arc::from(red_png(2, 2)),
        };
        assert_eq!(preview.lines(Some(&frame), 2, 1).len(), 1);
        assert_eq!(preview.lines(None, 2, 1), placeholder_lines());
    }

    #[test]
    fn test_empty_predictions_message() {
        let lines = prediction_lines(&[]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans[0].content, EMPTY_PREDICTIONS);
    }

    #[test]
    fn test_predictions_are_numbered() {
        let records = vec![
            PredictionRecord {
                id: Some(2),
                gesture: String::from("NO"),
                timestamp: None,
                confidence: None,
            },
            PredictionRecord {
                id: Some(1),
                gesture: String::from("YES"),
                timestamp: None,
                confidence: None,
            },
        ];
        let lines = prediction_lines(&records);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].spans[0].content.starts_with(" 2. YES"));
    }
}
