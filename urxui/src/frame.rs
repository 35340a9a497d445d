use urx::Vector6;

use crate::error::PanelError;
use crate::telemetry::format_vector;

/// Parses a coordinate frame typed as six numbers, e.g. `[0.1, 0, 0.2, 0, 0, 1.57]`.
/// Brackets or parentheses around the list are optional.
pub fn parse_transform(text: &str) -> Result<Vector6, PanelError> {
    let invalid = || PanelError::InvalidTransform(text.to_string());
    let trimmed = text.trim();
    let inner = strip_delimiters(trimmed, '[', ']')
        .or_else(|| strip_delimiters(trimmed, '(', ')'))
        .unwrap_or(trimmed);

    let values = inner
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(invalid)?;
    <Vector6>::try_from(values.as_slice()).map_err(|_| invalid())
}

/// Text shown in the csys field for a frame read from the controller.
pub fn format_transform(transform: &Vector6) -> String {
    format_vector(transform)
}

fn strip_delimiters(text: &str, open: char, close: char) -> Option<&str> {
    text.strip_prefix(open)?.strip_suffix(close)
}
