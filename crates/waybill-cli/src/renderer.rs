//! Terminal rendering for the markdown the core's display wrappers produce.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    /// Create a new terminal renderer
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Cyan);
        skin.bold.set_fg(Color::Yellow);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to the terminal, or pass it through untouched
    /// in plain mode.
    pub fn render(&self, markdown: &str) -> Result<()> {
        if self.rich_enabled {
            for line in markdown.lines() {
                self.skin.print_inline(line);
                println!();
            }
        } else {
            print!("{markdown}");
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
