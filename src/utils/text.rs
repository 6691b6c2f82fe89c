// Text helpers for terminal output

/// Width of the attached terminal, with a sensible fallback for pipes
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(width), _)| width as usize)
        .unwrap_or(80)
}

/// Fill text to an explicit width
pub fn wrap_to(text: &str, width: usize) -> String {
    textwrap::fill(text, width)
}

/// Fill text to an explicit width with every line indented
pub fn wrap_indented_to(text: &str, indent: &str, width: usize) -> String {
    let options = textwrap::Options::new(width)
        .initial_indent(indent)
        .subsequent_indent(indent);
    textwrap::fill(text, options)
}

/// Fill text to the terminal width with every line indented, clamped to
/// stay readable on very narrow or very wide terminals
pub fn wrap_indented(text: &str, indent: &str) -> String {
    wrap_indented_to(text, indent, terminal_width().clamp(40, 100))
}
