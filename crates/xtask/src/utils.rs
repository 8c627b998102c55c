//! Formatting helpers shared by xtask commands

use std::time::Duration;

use game_content::kinds::components;
use game_core::ComponentKind;

/// Format bytes as a human-readable size
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a duration in seconds with millisecond precision
pub fn format_duration(duration: Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}

/// Readable component name, falling back to the raw id
pub fn component_name(kind: ComponentKind) -> String {
    components::name(kind)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{:08x}", kind.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_component_name_falls_back_to_id() {
        assert_eq!(component_name(components::ACTOR), "actor");
        assert!(component_name(ComponentKind(7)).starts_with('#'));
    }
}
