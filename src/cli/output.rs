//! Output formatting and progress display

use crate::cli::args::VerbosityLevel;
use crate::core::events::ClientEvent;
use crate::core::video_info::{Format, VideoInfo};
use crate::utils::humanize::{format_clock, format_elapsed, format_file_size};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Renders client events on the terminal
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    show_progress: bool,
    spinner: Option<ProgressBar>,
    progress_bar: Option<ProgressBar>,
    /// Ranked formats waiting for the preselection before they are listed
    pending_formats: Option<Vec<Format>>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_progress: true,
            spinner: None,
            progress_bar: None,
            pending_formats: None,
        }
    }

    /// Enable or disable spinner and progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn animated(&self) -> bool {
        self.show_progress && self.verbosity != VerbosityLevel::Quiet
    }

    /// Render one event
    pub fn handle_event(&mut self, event: &ClientEvent) {
        match event {
            ClientEvent::Busy(true) => self.start_spinner(),
            ClientEvent::Busy(false) => self.stop_spinner(),
            ClientEvent::VideoInfoReady { info, formats } => {
                self.print_video_info(info);
                if formats.is_empty() {
                    self.print_formats(formats, None);
                    self.pending_formats = None;
                } else {
                    self.pending_formats = Some(formats.clone());
                }
            }
            ClientEvent::FormatSelected { format_id } => match self.pending_formats.take() {
                Some(formats) => self.print_formats(&formats, Some(format_id)),
                None => self.info(&format!("Selected format {}", format_id)),
            },
            ClientEvent::JobStarted { job_id } => {
                self.info("Download started on the backend");
                self.debug(&format!("Job ID: {}", job_id));
            }
            ClientEvent::PollingStarted { job_id } => {
                self.debug(&format!("Checking progress of job {}", job_id));
            }
            ClientEvent::PollingStopped { job_id } => {
                self.debug(&format!("Stopped checking progress of job {}", job_id));
            }
            ClientEvent::Progress { percent, message } => {
                self.update_progress(*percent, message.as_deref());
            }
            ClientEvent::ProgressHidden => self.clear_progress(),
            ClientEvent::ArtifactSaved { path, size } => {
                self.finish_progress();
                self.print_saved(path, *size);
            }
            ClientEvent::SessionReset => self.debug("Session reset"),
            ClientEvent::Message(message) => self.info(message),
            ClientEvent::Error { message, .. } => {
                self.stop_spinner();
                self.clear_progress();
                self.error(message);
            }
        }
    }

    fn start_spinner(&mut self) {
        if !self.animated() || self.spinner.is_some() {
            return;
        }

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message("Contacting backend...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Create the progress bar if needed
    pub fn create_progress_bar(&mut self) -> Option<ProgressBar> {
        if !self.animated() {
            return None;
        }

        if let Some(bar) = &self.progress_bar {
            return Some(bar.clone());
        }

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let progress_bar = ProgressBar::new(100);
        progress_bar.set_style(style);
        progress_bar.set_message("Processing...");

        self.progress_bar = Some(progress_bar.clone());
        Some(progress_bar)
    }

    /// Update progress bar
    pub fn update_progress(&mut self, percent: f64, message: Option<&str>) {
        if let Some(bar) = self.create_progress_bar() {
            bar.set_position(percent.round() as u64);
            if let Some(message) = message {
                bar.set_message(message.to_string());
            }
        } else if let Some(message) = message {
            self.debug(&format!("{:.0}% {}", percent, message));
        }
    }

    /// Freeze the progress bar in its final state
    pub fn finish_progress(&mut self) {
        if let Some(bar) = self.progress_bar.take() {
            bar.finish();
        }
    }

    /// Remove the progress bar from the screen
    pub fn clear_progress(&mut self) {
        if let Some(bar) = self.progress_bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("ℹ️  {}", message);
        }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("{}", format!("✅ {}", message).green());
        }
    }

    /// Print warning message
    pub fn warning(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            eprintln!("{}", format!("⚠️  {}", message).yellow());
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("{}", format!("❌ Error: {}", message).red().bold());
    }

    /// Print debug message
    pub fn debug(&self, message: &str) {
        if self.verbosity == VerbosityLevel::Verbose {
            println!("🐛 {}", message);
        }
    }

    /// Print video information
    pub fn print_video_info(&self, info: &VideoInfo) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        println!("📹 {}", info.display_title().bold());
        println!("👤 {}", info.display_uploader());
        println!("⏱️  {}", format_clock(info.duration));
        if let Some(thumbnail) = info.thumbnail_url() {
            println!("🖼️  {}", thumbnail);
        }
        println!();
    }

    /// Print the selectable formats, marking the selected one
    pub fn print_formats(&self, formats: &[Format], selected: Option<&str>) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        for line in render_formats(formats, selected) {
            println!("{}", line);
        }
        println!();
    }

    /// Print where the artifact went
    pub fn print_saved(&self, path: &Path, size: u64) {
        self.success(&format!(
            "Saved to: {} ({})",
            path.display(),
            format_file_size(size)
        ));
    }

    /// Print the total run time
    pub fn print_elapsed(&self, elapsed: Duration) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }
        println!("⏱️  Time: {}", format_elapsed(elapsed));
    }

}

/// Lines of the format table, the selected row marked with ▶
pub fn render_formats(formats: &[Format], selected: Option<&str>) -> Vec<String> {
    if formats.is_empty() {
        return vec!["📊 No formats with both video and audio".to_string()];
    }

    let mut lines = vec![format!("📊 {} formats available", formats.len())];
    lines.extend(formats.iter().map(|format| {
        let marker = if selected == Some(format.format_id.as_str()) {
            "▶"
        } else {
            " "
        };
        format!(
            "  {} {:<8} | {:<10} | {:<5} | {}",
            marker,
            format.format_id,
            format.quality_label(),
            format.extension(),
            format.size_label()
        )
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::PathBuf;

    fn info() -> VideoInfo {
        VideoInfo {
            title: Some("Test Video".to_string()),
            uploader: Some("Test Author".to_string()),
            duration: Some(3725),
            thumbnail: None,
            formats: vec![Format::new("22", "720p").with_codecs("avc1", "mp4a")],
        }
    }

    #[test]
    fn test_output_formatter_creation() {
        let formatter = OutputFormatter::new(VerbosityLevel::Normal);
        assert_eq!(formatter.verbosity, VerbosityLevel::Normal);
        assert!(formatter.show_progress);
        assert!(formatter.progress_bar.is_none());
        assert!(formatter.spinner.is_none());
    }

    #[test]
    fn test_verbosity_levels() {
        let formatter = OutputFormatter::new(VerbosityLevel::Quiet);
        // These should not print anything in quiet mode
        formatter.info("test");
        formatter.success("test");
        formatter.warning("test");
        formatter.debug("test");

        // Error should always print
        formatter.error("test");
    }

    #[test]
    fn test_create_progress_bar_quiet_mode() {
        let mut formatter = OutputFormatter::new(VerbosityLevel::Quiet);
        assert!(formatter.create_progress_bar().is_none());
    }

    #[test]
    fn test_create_progress_bar_disabled() {
        let mut formatter = OutputFormatter::new(VerbosityLevel::Normal).with_progress(false);
        assert!(formatter.create_progress_bar().is_none());
        formatter.update_progress(50.0, Some("Downloading..."));
        assert!(formatter.progress_bar.is_none());
    }

    #[test]
    fn test_progress_bar_reused() {
        let mut formatter = OutputFormatter::new(VerbosityLevel::Normal);
        formatter.update_progress(10.0, None);
        formatter.update_progress(55.4, Some("Downloading..."));

        let bar = formatter.progress_bar.clone().unwrap();
        assert_eq!(bar.position(), 55);
        assert_eq!(bar.length(), Some(100));
    }

    #[test]
    fn test_progress_hidden_clears_bar() {
        let mut formatter = OutputFormatter::new(VerbosityLevel::Normal);
        formatter.handle_event(&ClientEvent::Progress {
            percent: 20.0,
            message: None,
        });
        assert!(formatter.progress_bar.is_some());

        formatter.handle_event(&ClientEvent::ProgressHidden);
        assert!(formatter.progress_bar.is_none());
    }

    #[test]
    fn test_busy_toggles_spinner() {
        let mut formatter = OutputFormatter::new(VerbosityLevel::Normal);
        formatter.handle_event(&ClientEvent::Busy(true));
        assert!(formatter.spinner.is_some());
        formatter.handle_event(&ClientEvent::Busy(false));
        assert!(formatter.spinner.is_none());

        let mut formatter = OutputFormatter::new(VerbosityLevel::Quiet);
        formatter.handle_event(&ClientEvent::Busy(true));
        assert!(formatter.spinner.is_none());
    }

    #[test]
    fn test_error_clears_progress() {
        let mut formatter = OutputFormatter::new(VerbosityLevel::Normal);
        formatter.handle_event(&ClientEvent::Busy(true));
        formatter.handle_event(&ClientEvent::Progress {
            percent: 30.0,
            message: None,
        });

        formatter.handle_event(&ClientEvent::Error {
            kind: ErrorKind::Backend,
            message: "Server error: 500".to_string(),
        });
        assert!(formatter.spinner.is_none());
        assert!(formatter.progress_bar.is_none());
    }

    #[test]
    fn test_handle_every_event() {
        let mut formatter = OutputFormatter::new(VerbosityLevel::Verbose);
        let events = vec![
            ClientEvent::Busy(true),
            ClientEvent::Busy(false),
            ClientEvent::VideoInfoReady {
                info: info(),
                formats: info().formats,
            },
            ClientEvent::FormatSelected {
                format_id: "22".to_string(),
            },
            ClientEvent::JobStarted {
                job_id: "job-1".to_string(),
            },
            ClientEvent::PollingStarted {
                job_id: "job-1".to_string(),
            },
            ClientEvent::Progress {
                percent: 100.0,
                message: Some("Done".to_string()),
            },
            ClientEvent::PollingStopped {
                job_id: "job-1".to_string(),
            },
            ClientEvent::ArtifactSaved {
                path: PathBuf::from("/tmp/Test Video.mp4"),
                size: 1536,
            },
            ClientEvent::SessionReset,
            ClientEvent::Message("hello".to_string()),
        ];

        // Should not panic
        for event in &events {
            formatter.handle_event(event);
        }
        assert!(formatter.progress_bar.is_none());
    }

    #[test]
    fn test_print_formats() {
        let formatter = OutputFormatter::new(VerbosityLevel::Normal);
        // Should not panic
        formatter.print_formats(&info().formats, Some("22"));
        formatter.print_formats(&[], None);
        formatter.print_video_info(&VideoInfo::default());
        formatter.print_elapsed(Duration::from_secs(90));
    }

    #[test]
    fn test_preselection_marks_listed_format() {
        let formats = vec![
            Format::new("22", "720p").with_codecs("avc1", "mp4a"),
            Format::new("18", "360p").with_codecs("avc1", "mp4a"),
        ];
        let mut formatter = OutputFormatter::new(VerbosityLevel::Normal);

        formatter.handle_event(&ClientEvent::VideoInfoReady {
            info: info(),
            formats: formats.clone(),
        });
        // The list waits for the preselection so it can mark it
        assert_eq!(formatter.pending_formats.as_deref(), Some(formats.as_slice()));

        formatter.handle_event(&ClientEvent::FormatSelected {
            format_id: "22".to_string(),
        });
        assert!(formatter.pending_formats.is_none());

        let lines = render_formats(&formats, Some("22"));
        let marked: Vec<&String> = lines.iter().filter(|l| l.contains('▶')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("22") && marked[0].contains("720p"));
        assert!(!render_formats(&formats, None).iter().any(|l| l.contains('▶')));
    }

    #[test]
    fn test_render_formats_without_candidates() {
        assert_eq!(
            render_formats(&[], None),
            vec!["📊 No formats with both video and audio".to_string()]
        );

        let mut formatter = OutputFormatter::new(VerbosityLevel::Normal);
        formatter.handle_event(&ClientEvent::VideoInfoReady {
            info: info(),
            formats: Vec::new(),
        });
        assert!(formatter.pending_formats.is_none());
    }
}
