/// Console colors.
///
/// Directories print green, files white, deletion labels red. With color
/// disabled every helper returns the text unchanged, so output captured
/// in a buffer or a pipe stays plain. stdout and stderr decide separately.
use colored::{Color, Colorize};
use std::io::{self, IsTerminal};

/// One [`Theme`] per output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub out: Theme,
    pub err: Theme,
}

impl Palette {
    pub fn plain() -> Self {
        Self {
            out: Theme::plain(),
            err: Theme::plain(),
        }
    }

    /// Check stdout and stderr individually.
    pub fn detect(no_color: bool) -> Self {
        let palette = Self {
            out: Theme::detect(no_color, &io::stdout()),
            err: Theme::detect(no_color, &io::stderr()),
        };
        if palette.out.is_enabled() || palette.err.is_enabled() {
            // `colored` would otherwise look at stdout alone.
            colored::control::set_override(true);
        }
        palette
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    enabled: bool,
}

impl Theme {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// No colors at all.
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Color only when `stream` is a terminal, `--no-color` was not given
    /// and `NO_COLOR` is unset or empty.
    pub fn detect(no_color: bool, stream: &impl IsTerminal) -> Self {
        let env_off = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::new(!no_color && !env_off && stream.is_terminal())
    }

    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    pub fn directory(self, text: &str) -> String {
        self.paint(text, Color::Green)
    }

    pub fn file(self, text: &str) -> String {
        self.paint(text, Color::White)
    }

    pub fn delete_label(self, text: &str) -> String {
        self.paint(text, Color::Red)
    }

    pub fn error(self, text: &str) -> String {
        if self.enabled {
            text.red().bold().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn success(self, text: &str) -> String {
        self.paint(text, Color::BrightGreen)
    }

    pub fn muted(self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_owned()
        }
    }

    fn paint(self, text: &str, color: Color) -> String {
        if self.enabled {
            text.color(color).to_string()
        } else {
            text.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_leaves_text_alone() {
        let theme = Theme::plain();
        assert_eq!(theme.directory("bin"), "bin");
        assert_eq!(theme.delete_label("Deleting File:"), "Deleting File:");
        assert_eq!(theme.error("boom"), "boom");
    }

    #[test]
    fn no_color_flag_wins() {
        assert!(!Theme::detect(true, &io::stdout()).is_enabled());
        assert!(!Palette::detect(true).out.is_enabled());
        assert!(!Palette::detect(true).err.is_enabled());
    }

    #[test]
    fn redirected_stream_is_plain() {
        let file = tempfile::tempfile().unwrap();
        assert!(!Theme::detect(false, &file).is_enabled());
    }
}
