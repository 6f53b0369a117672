/// Nord, https://www.nordtheme.com/
pub const NORD: [&str; 16] = [
    "#2E3440", "#3B4252", "#434C5E", "#4C566A", "#D8DEE9", "#E5E9F0", "#ECEFF4", "#8FBCBB",
    "#88C0D0", "#81A1C1", "#5E81AC", "#BF616A", "#D08770", "#EBCB8B", "#A3BE8C", "#B48EAD",
];

pub const DEFAULT_SCHEME: &str = "nord";

/// Looks up a scheme shipped with the binary. Names are case-insensitive.
pub fn builtin(name: &str) -> Option<&'static [&'static str]> {
    match name.to_ascii_lowercase().as_str() {
        "nord" => Some(&NORD),
        _ => None,
    }
}
