use std::io::IsTerminal;
use std::time::{Duration, Instant};

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    output_style_for(
        std::io::stderr().is_terminal(),
        std::env::var_os("NO_COLOR").is_some(),
    )
}

fn output_style_for(is_terminal: bool, no_color: bool) -> OutputStyle {
    if is_terminal && !no_color {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

pub(crate) struct DownloadProgress {
    style: OutputStyle,
    current: u64,
    progress_bar: Option<ProgressBar>,
    started_at: Instant,
}

impl TerminalRenderer {
    pub(crate) fn from_style(style: OutputStyle) -> Self {
        Self { style }
    }

    pub(crate) fn style(self) -> OutputStyle {
        self.style
    }

    pub(crate) fn print_status(self, status: &str, message: &str) {
        eprintln!("{}", render_status_line(self.style, status, message));
    }

    pub(crate) fn print_section(self, title: &str) {
        if let Some(line) = render_section_header(self.style, title) {
            eprintln!();
            eprintln!("{}", colorize(section_style(), &line));
        }
    }

    pub(crate) fn start_download(self, total: Option<u64>) -> DownloadProgress {
        let progress_bar = if self.style == OutputStyle::Rich {
            let progress_bar = match total {
                Some(total) => ProgressBar::new(total.max(1)),
                None => ProgressBar::new_spinner(),
            };
            let template = match total {
                Some(_) => "{spinner:.cyan.bold} {msg:<10} [{bar:24.cyan/blue}] {bytes:>10}/{total_bytes:10} {bytes_per_sec} {eta}",
                None => "{spinner:.cyan.bold} {msg:<10} {bytes:>10} {bytes_per_sec}",
            };
            if let Ok(style) = ProgressStyle::with_template(template) {
                progress_bar.set_style(style.tick_chars(".oO@* ").progress_chars("=>-"));
            }
            progress_bar.set_message("download");
            progress_bar.enable_steady_tick(Duration::from_millis(80));
            Some(progress_bar)
        } else {
            None
        };

        DownloadProgress {
            style: self.style,
            current: 0,
            progress_bar,
            started_at: Instant::now(),
        }
    }
}

impl DownloadProgress {
    pub(crate) fn set(&mut self, current: u64) {
        self.current = current;
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.set_position(current);
        }
    }

    pub(crate) fn finish_success(mut self) {
        let Some(progress_bar) = self.progress_bar.take() else {
            return;
        };

        progress_bar.finish_and_clear();
        if let Some(line) =
            render_download_line(self.style, self.current, Some(self.started_at.elapsed()))
        {
            eprintln!("{line}");
        }
    }

    pub(crate) fn finish_abandon(mut self) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.abandon();
        }
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    format!("{secs}.{millis:03}s")
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn download_label_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightCyan.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => {
            let badge = match status {
                "ok" => "[OK]",
                "warn" => "[WARN]",
                "err" => "[ERR]",
                _ => "[..]",
            };
            format!("{badge} {message}")
        }
    }
}

fn render_section_header(style: OutputStyle, title: &str) -> Option<String> {
    match style {
        OutputStyle::Plain => None,
        OutputStyle::Rich => Some(format!("== {title} ==")),
    }
}

fn render_download_line(
    style: OutputStyle,
    bytes: u64,
    elapsed: Option<Duration>,
) -> Option<String> {
    if style == OutputStyle::Plain {
        return None;
    }

    let suffix = elapsed
        .map(|value| format!(" complete in {}", format_elapsed(value)))
        .unwrap_or_default();
    Some(format!(
        "{} {}{}",
        colorize(download_label_style(), "download"),
        HumanBytes(bytes),
        suffix
    ))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn output_style_requires_terminal_and_colors() {
        assert_eq!(output_style_for(true, false), OutputStyle::Rich);
        assert_eq!(output_style_for(true, true), OutputStyle::Plain);
        assert_eq!(output_style_for(false, false), OutputStyle::Plain);
    }

    #[test]
    fn status_line_plain_is_unadorned() {
        assert_eq!(
            render_status_line(OutputStyle::Plain, "ok", "installed go1.21.0"),
            "installed go1.21.0"
        );
    }

    #[test]
    fn status_line_rich_includes_badges() {
        assert_eq!(
            render_status_line(OutputStyle::Rich, "ok", "installed go1.21.0"),
            "[OK] installed go1.21.0"
        );
        assert_eq!(
            render_status_line(OutputStyle::Rich, "err", "rolled back"),
            "[ERR] rolled back"
        );
        assert_eq!(
            render_status_line(OutputStyle::Rich, "info", "cache hit"),
            "[..] cache hit"
        );
    }

    #[test]
    fn section_header_only_in_rich_mode() {
        assert_eq!(render_section_header(OutputStyle::Plain, "Install"), None);
        assert_eq!(
            render_section_header(OutputStyle::Rich, "Install").as_deref(),
            Some("== Install ==")
        );
    }

    #[test]
    fn download_line_reports_size_and_elapsed() {
        assert_eq!(render_download_line(OutputStyle::Plain, 10, None), None);
        let line = render_download_line(
            OutputStyle::Rich,
            2048,
            Some(Duration::from_millis(1_250)),
        )
        .expect("rich mode renders a line");
        assert!(line.contains("2.00 KiB"));
        assert!(line.ends_with(" complete in 1.250s"));
    }

    #[test]
    fn plain_progress_has_no_bar() {
        let mut progress = TerminalRenderer::from_style(OutputStyle::Plain).start_download(Some(10));
        progress.set(5);
        assert_eq!(progress.current, 5);
        assert!(progress.progress_bar.is_none());
        progress.finish_success();
    }
}
