use crate::config::LayoutConfig;
use crate::text_metrics;
use crate::theme::Theme;

/// A node label broken into the lines it is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

/// Wraps `text` so every line fits inside a node of `node_width` (minus the
/// horizontal padding) and reports the resulting block size.
pub fn measure_label(text: &str, node_width: f64, theme: &Theme, config: &LayoutConfig) -> TextBlock {
    let font_size = theme.font_size;
    let font_family = theme.font_family.as_str();
    let fast_metrics = config.fast_text_metrics;
    let max_width_px = (node_width as f32 - 2.0 * config.node_padding_x).max(font_size);

    let mut lines = Vec::new();
    for line in split_lines(text) {
        lines.extend(wrap_line(&line, max_width_px, font_size, font_family, fast_metrics));
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    let width = lines
        .iter()
        .map(|line| text_width(line, font_size, font_family, fast_metrics))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * config.label_line_height;

    TextBlock { lines, width, height }
}

/// Advance widths relative to the font size for a common sans-serif stack.
const UPPER: [f32; 26] = [
    0.652, 0.648, 0.734, 0.723, 0.594, 0.575, 0.742, 0.742, 0.272, 0.557, 0.648, 0.559, 0.903,
    0.763, 0.754, 0.623, 0.755, 0.637, 0.633, 0.599, 0.746, 0.661, 0.958, 0.655, 0.646, 0.621,
];
const LOWER: [f32; 26] = [
    0.550, 0.603, 0.547, 0.609, 0.570, 0.340, 0.600, 0.600, 0.235, 0.227, 0.522, 0.239, 0.867,
    0.585, 0.574, 0.595, 0.585, 0.364, 0.523, 0.305, 0.585, 0.545, 0.811, 0.538, 0.556, 0.550,
];
const DIGITS: [f32; 10] = [0.613, 0.396, 0.609, 0.597, 0.614, 0.586, 0.608, 0.559, 0.611, 0.595];

pub(super) fn char_width_factor(ch: char) -> f32 {
    match ch {
        'A'..='Z' => UPPER[(ch as u8 - b'A') as usize],
        'a'..='z' => LOWER[(ch as u8 - b'a') as usize],
        '0'..='9' => DIGITS[(ch as u8 - b'0') as usize],
        ' ' => 0.306,
        '-' => 0.375,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' | '\'' => 0.321,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}

/// Names may carry explicit breaks as `<br>` or a literal `\n`.
pub(super) fn split_lines(text: &str) -> Vec<String> {
    let normalized = text
        .replace("<br/>", "\n")
        .replace("<br>", "\n")
        .replace("\\n", "\n");
    normalized.split('\n').map(|line| line.trim().to_string()).collect()
}

pub(super) fn wrap_line(
    line: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
    fast_metrics: bool,
) -> Vec<String> {
    if text_width(line, font_size, font_family, fast_metrics) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, font_size, font_family, fast_metrics) > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub(super) fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics && text.is_ascii() {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}
