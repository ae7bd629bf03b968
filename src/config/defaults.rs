pub(super) const MIN_RECENT_FILES: usize = 1;
pub(super) const MAX_RECENT_FILES: usize = 500;
pub(super) const MIN_WINDOW_WIDTH: f64 = 320.0;
pub(super) const MIN_WINDOW_HEIGHT: f64 = 240.0;

pub(super) fn clamp_max_recent_files(value: usize) -> usize {
    value.clamp(MIN_RECENT_FILES, MAX_RECENT_FILES)
}

pub(super) fn clamp_window_extent(value: f64, min: f64) -> f64 {
    if value.is_finite() { value.max(min) } else { min }
}

pub(super) fn default_true() -> bool {
    true
}

pub(super) fn default_max_recent_files() -> usize {
    15
}

pub(super) fn default_window_width() -> f64 {
    1000.0
}

pub(super) fn default_window_height() -> f64 {
    700.0
}
