//! Console progress for a booking run.

use console::style;

/// Prints stage headers, steps and passed checks to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct Report;

impl Report {
    pub fn new() -> Self {
        Self
    }

    pub fn begin(&self) {
        println!("{}", style("-----START-----").bold());
    }

    pub fn end(&self) {
        println!("\n{}", style("-----END-----").bold());
    }

    pub fn stage(&self, number: u8, title: &str) {
        println!("\n{}", style(stage_line(number, title)).cyan().bold());
    }

    pub fn step(&self, message: &str) {
        println!("{}", step_line(message));
    }

    pub fn assertions(&self) {
        println!("\n{}", style("Assertions").underlined());
    }

    pub fn passed(&self, message: &str) {
        println!("    {} - {}", style("Passed").green(), message);
    }
}

fn stage_line(number: u8, title: &str) -> String {
    format!("Stage {} - {}", number, title)
}

fn step_line(message: &str) -> String {
    format!(" -> {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_line() {
        assert_eq!(
            stage_line(6, "Choose any available seats and click [Next]"),
            "Stage 6 - Choose any available seats and click [Next]"
        );
    }

    #[test]
    fn test_step_line() {
        assert_eq!(step_line("Close browser"), " -> Close browser");
    }
}
