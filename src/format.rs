#![cfg_attr(not(feature = "colored"), allow(unused_variables))]

#[cfg(feature = "colored")]
use colored::{Color, Colorize};
use core::fmt::{self, Write};

#[derive(Copy, Clone, Debug)]
pub(crate) struct Format {
    #[cfg(feature = "colored")]
    pub colored: bool,
    pub head: bool,
    pub clean: bool,
}

impl Default for Format {
    fn default() -> Self {
        Format {
            #[cfg(feature = "colored")]
            colored: true,
            head: true,
            clean: true,
        }
    }
}

impl Format {
    pub fn mark(self, f: &mut fmt::Formatter, level: usize) -> fmt::Result {
        #[cfg(feature = "colored")]
        if self.colored {
            return write!(f, "{} ", "*".color(color_of_level(level)));
        }
        f.write_str("* ")
    }

    pub fn edge(self, f: &mut fmt::Formatter, level: usize) -> fmt::Result {
        #[cfg(feature = "colored")]
        if self.colored {
            return write!(f, "{}", "|".color(color_of_level(level)));
        }
        f.write_char('|')
    }

    pub fn position(self, f: &mut fmt::Formatter, id: usize) -> fmt::Result {
        #[cfg(feature = "colored")]
        if self.colored {
            return write!(f, "{}", id.to_string().yellow().bold());
        }
        write!(f, "{id}")
    }

    pub fn caption(self, f: &mut fmt::Formatter, caption: &str) -> fmt::Result {
        if caption.is_empty() {
            return Ok(());
        }
        write!(f, " {caption}")
    }

    pub fn labels(self, f: &mut fmt::Formatter, is_head: bool, is_clean: bool) -> fmt::Result {
        match (self.head && is_head, self.clean && is_clean) {
            (true, true) => {
                #[cfg(feature = "colored")]
                if self.colored {
                    return write!(
                        f,
                        " {}{}{} {}{}",
                        "[".yellow(),
                        "HEAD".cyan().bold(),
                        ",".yellow(),
                        "CLEAN".green().bold(),
                        "]".yellow()
                    );
                }
                f.write_str(" [HEAD, CLEAN]")
            }
            (true, false) => {
                #[cfg(feature = "colored")]
                if self.colored {
                    return write!(
                        f,
                        " {}{}{}",
                        "[".yellow(),
                        "HEAD".cyan().bold(),
                        "]".yellow()
                    );
                }
                f.write_str(" [HEAD]")
            }
            (false, true) => {
                #[cfg(feature = "colored")]
                if self.colored {
                    return write!(
                        f,
                        " {}{}{}",
                        "[".yellow(),
                        "CLEAN".green().bold(),
                        "]".yellow()
                    );
                }
                f.write_str(" [CLEAN]")
            }
            (false, false) => Ok(()),
        }
    }
}

#[cfg(feature = "colored")]
fn color_of_level(level: usize) -> Color {
    match level % 6 {
        0 => Color::Cyan,
        1 => Color::Red,
        2 => Color::Magenta,
        3 => Color::Yellow,
        4 => Color::Green,
        5 => Color::Blue,
        _ => unreachable!(),
    }
}
