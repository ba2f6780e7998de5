use std::env;

use color_eyre::owo_colors::OwoColorize;
use uda_core::CommandStatus;

pub struct Style {
    enabled: bool,
}

impl Style {
    pub fn new(force_no_color: bool, is_tty: bool) -> Self {
        let env_no_color = env::var_os("NO_COLOR").is_some();
        Self {
            enabled: !(force_no_color || env_no_color) && is_tty,
        }
    }

    pub fn status(&self, status: &CommandStatus, text: &str) -> String {
        let (symbol, tone) = match status {
            CommandStatus::Ok => ("✔", Tone::Green),
            CommandStatus::UserError => ("✗", Tone::Yellow),
            CommandStatus::Failure => ("✖", Tone::Red),
        };
        self.paint(&format!("{symbol} {text}"), tone)
    }

    pub fn info(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        text.cyan().to_string()
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.enabled {
            return text.to_string();
        }
        match tone {
            Tone::Green => text.green().bold().to_string(),
            Tone::Yellow => text.yellow().bold().to_string(),
            Tone::Red => text.red().bold().to_string(),
        }
    }
}

enum Tone {
    Green,
    Yellow,
    Red,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_when_not_a_tty() {
        let style = Style::new(false, false);
        assert_eq!(
            style.status(&CommandStatus::UserError, "uda remove: environment ml does not exist"),
            "✗ uda remove: environment ml does not exist"
        );
        assert_eq!(style.info("Tip: x"), "Tip: x");
    }

    #[test]
    fn no_color_flag_wins_over_tty() {
        let style = Style::new(true, true);
        assert_eq!(style.status(&CommandStatus::Ok, "done"), "✔ done");
    }
}
