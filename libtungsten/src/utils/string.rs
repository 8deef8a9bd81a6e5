/// Renders a float the way a user wrote it: integral values drop the trailing ".0", other values
/// drop trailing zeros only.
pub fn display_float(f: f64) -> String {
    if !f.is_finite() {
        return f.to_string();
    }
    let s = f.to_string();
    match s.find('.') {
        None => s,
        Some(_) => {
            let trimmed = s.trim_end_matches('0').trim_end_matches('.');
            trimmed.to_string()
        }
    }
}
