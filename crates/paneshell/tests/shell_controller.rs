//! End-to-end behavior of the UI-thread controller.

use std::io::Write;

use paneshell::prelude::*;
use web_time::{Duration, Instant};

fn shell_config(status_manager: bool) -> ShellConfig {
    let mut config = ShellConfig::with_sections(SectionName::ALL);
    config.enable_status_bar_manager = status_manager;
    config.pool.max_workers = 1;
    config
}

#[derive(Debug, Default)]
struct Panel {
    size: Size,
    font_size: u32,
}

impl SectionHandle for Panel {
    fn size(&self) -> Size {
        self.size
    }

    fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    fn font_size(&self) -> u32 {
        self.font_size
    }

    fn set_font_size(&mut self, font_size_px: u32) {
        self.font_size = font_size_px;
    }

    fn text(&self) -> Option<String> {
        None
    }
}

#[test]
fn status_text_reaches_bottom_composite() {
    let mut shell = ShellController::new(shell_config(true), MonospaceMeasurer::default()).unwrap();
    let bottom = shell.layout().section(SectionName::Bottom).unwrap();
    assert!(bottom.is_composite());
    assert_eq!(bottom.label().text, "Ready");

    shell.update_status("  Indexing  ").unwrap();
    assert!(
        shell
            .status()
            .pool()
            .await_tag_timeout("status", Duration::from_secs(5))
    );
    let outcome = shell.tick(Instant::now());
    assert_eq!(outcome.status_events, 1);
    assert_eq!(shell.status_bar().text, "Indexing");
    assert_eq!(shell.status_bar().tooltip, "Indexing");
    assert_eq!(
        shell.layout().section(SectionName::Bottom).unwrap().label().text,
        "Indexing"
    );
}

#[test]
fn plain_bottom_label_ignores_status() {
    let mut shell =
        ShellController::new(shell_config(false), MonospaceMeasurer::default()).unwrap();
    shell.set_busy(true);
    shell.tick(Instant::now());
    assert!(shell.status_bar().busy);
    assert_eq!(
        shell.layout().section(SectionName::Bottom).unwrap().label().text,
        "Status Bar"
    );
}

#[test]
fn apply_config_drops_sections_and_keeps_replacements() {
    let mut shell = ShellController::new(shell_config(false), MonospaceMeasurer::default()).unwrap();
    assert!(shell.set_replacement(SectionName::Left, Box::new(Panel::default())));
    let generation = shell.layout().generation();

    let mut next = shell_config(false);
    next.sections.remove(&SectionName::Top);
    let font = shell.apply_config(next).unwrap();

    assert!(font.is_some());
    assert!(shell.layout().generation() > generation);
    assert!(!shell.layout().contains(SectionName::Top));
    assert!(shell.layout().splitter(SectionName::Top).is_none());
    let left = shell.layout().section(SectionName::Left).unwrap();
    assert!(left.has_replacement());
    assert_eq!(Some(left.font_size()), font);
}

#[test]
fn rejected_config_leaves_shell_untouched() {
    let mut shell = ShellController::new(shell_config(false), MonospaceMeasurer::default()).unwrap();
    let mut bad = shell_config(false);
    bad.sections.clear();
    let err = shell.apply_config(bad).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(shell.layout().contains(SectionName::Top));
}

#[test]
fn apply_config_supersedes_pending_resize() {
    let mut shell = ShellController::new(shell_config(false), MonospaceMeasurer::default()).unwrap();
    let start = Instant::now();
    shell.on_resize(Size::new(900, 700), start);
    shell.apply_config(shell_config(false)).unwrap();
    assert!(!shell.resize_pending());
    assert_eq!(shell.layout().window_size(), Size::new(900, 700));
    assert!(!shell.tick(start + Duration::from_secs(1)).resized);
}

#[test]
fn narrower_window_never_grows_the_font() {
    let mut shell = ShellController::new(shell_config(false), MonospaceMeasurer::default()).unwrap();
    let initial = shell.font_size().unwrap();
    let start = Instant::now();
    shell.on_resize(Size::new(200, 480), start);
    let outcome = shell.tick(start + Duration::from_millis(50));
    assert!(outcome.resized);
    assert!(outcome.font_size.unwrap() <= initial);
}

#[test]
fn shutdown_rejects_status_updates() {
    let shell = ShellController::new(shell_config(true), MonospaceMeasurer::default()).unwrap();
    shell.shutdown();
    assert!(shell.update_status("late").is_none());
}

#[test]
fn controller_from_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(
        br#"
        font_size = 14
        enable_status_bar_manager = true
        window_size = { width = 1024, height = 768 }
        resize_debounce_ms = 20

        [pool]
        max_workers = 2

        [sections.bottom]
        text = "ignored"
        "#,
    )
    .unwrap();

    let config = ShellConfig::from_file(file.path()).unwrap();
    let mut shell = ShellController::new(config, MonospaceMeasurer::default()).unwrap();
    assert_eq!(shell.layout().baseline_width(), 1024);
    assert_eq!(shell.status().pool().worker_count(), 2);

    let start = Instant::now();
    shell.on_resize(Size::new(1000, 768), start);
    assert!(shell.tick(start + Duration::from_millis(20)).resized);
}
