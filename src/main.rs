mod app;
mod core;
mod models;
mod system;
mod ui;
mod utils;

use app::App;
use clap::{Arg, ArgAction, ArgMatches, Command};
use core::actions::{find_action, generate_command_bar_items};
use core::session::{Operation, Phase};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use models::Settings;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use system::{HostShell, ThreadedBackend};
use tracing::{info, warn};
use ui::{
    ArchiveTree, CommandBar, Dialog, LayoutMode, Placeholder, PlaceholderState, StatusBar,
    WarningScreen,
};
use utils::{error::Result, formatter::format_file_size, logging};

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let paths = string_values(&matches, "paths");
    let urls = string_values(&matches, "url");

    let settings_path = Settings::store_path();
    let settings = Settings::load_from(settings_path.as_deref());
    if let Err(err) = logging::init(&settings.log_level) {
        eprintln!("arcpeek: logging disabled: {}", err);
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting arcpeek");

    let archive_backend = ThreadedBackend::new(Duration::from_millis(settings.extract_delay_ms));
    let mut app = App::new(
        settings,
        settings_path,
        HostShell::new(paths, urls),
        Box::new(archive_backend),
    );
    if let Some(name) = matches.get_one::<String>("theme") {
        if let Err(err) = app.theme_manager.switch_theme(name) {
            warn!(
                theme = %name,
                error = %err,
                available = ?app.theme_manager.available_themes(),
                "theme override ignored"
            );
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 입력 구독(raw mode, bracketed paste)이 붙은 뒤에 준비 신호
    app.host.signal_ready();
    app.ingest_startup_sources();

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    info!("arcpeek shutting down");

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn cli() -> Command {
    Command::new("arcpeek")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Browse and extract archives in the terminal")
        .args([
            Arg::new("paths")
                .value_name("PATH")
                .num_args(0..)
                .action(ArgAction::Append)
                .help("archive to open on startup (only the first is used)"),
            Arg::new("url")
                .long("url")
                .value_name("URI")
                .action(ArgAction::Append)
                .help("file:// URI passed by the desktop (repeatable, first wins)"),
            Arg::new("theme")
                .long("theme")
                .value_name("NAME")
                .action(ArgAction::Set)
                .help("theme for this run: dark, light, high_contrast or a custom theme"),
        ])
}

fn string_values(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        // 백엔드 작업 중에는 짧은 타임아웃으로 결과를 빨리 반영
        let poll_timeout = if app.is_busy() || app.session.has_pending_work() {
            Duration::from_millis(30)
        } else {
            Duration::from_millis(100)
        };

        if event::poll(poll_timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        app.tick(&mut io::stdout());

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// 다이얼로그가 열려 있으면 다이얼로그로, 아니면 액션 레지스트리로
fn handle_key(app: &mut App, key: KeyEvent) {
    if app.is_dialog_active() {
        app.handle_dialog_key(key);
        return;
    }
    if let Some(action) = find_action(key.modifiers, key.code) {
        app.execute_action(action);
    }
}

fn placeholder_state(phase: Phase) -> PlaceholderState {
    match phase {
        Phase::Listing => PlaceholderState::Loading,
        Phase::AwaitingPassword(Operation::List) => PlaceholderState::Locked,
        _ => PlaceholderState::Empty,
    }
}

/// 상태바 데이터 수집 + 렌더링
fn render_status_bar(f: &mut ratatui::Frame<'_>, app: &App, theme: &ui::Theme, area: ratatui::layout::Rect) {
    let total_size = format_file_size(app.tree_view.total_size());
    let progress = app.last_progress.as_deref().unwrap_or("");
    let mut status_bar = StatusBar::new()
        .counts(app.tree_view.dir_count(), app.tree_view.file_count())
        .total_size(&total_size)
        .toast(app.toast_display())
        .theme_name(app.theme_manager.current_name())
        .theme(theme);
    if app.is_busy() {
        status_bar = status_bar.busy(progress, app.spinner_tick);
    }
    f.render_widget(status_bar, area);
}

/// 메인 UI 렌더링
fn render_ui(f: &mut ratatui::Frame<'_>, app: &mut App) {
    let size = f.area();
    app.layout.update(size);

    if app.layout.mode() == LayoutMode::TooSmall {
        let (width, height) = app.layout.terminal_size();
        let warning = WarningScreen::new()
            .current_size(width, height)
            .theme(app.theme_manager.current());
        f.render_widget(warning, app.layout.areas().warning);
        return;
    }

    app.adjust_scroll_offset();
    let app = &*app;
    let areas = app.layout.areas();
    let theme = app.theme_manager.current();
    let path = app
        .current_archive()
        .map(|p| p.to_string_lossy().to_string());

    if app.has_tree() {
        let tree = ArchiveTree::new()
            .title(path.as_deref().unwrap_or(""))
            .rows(app.tree_view.rows())
            .selected_index(app.tree_view.selected_index)
            .scroll_offset(app.tree_view.scroll_offset)
            .show_modified(app.layout.show_modified_column())
            .theme(theme);
        f.render_widget(tree, areas.tree);
    } else {
        let placeholder = Placeholder::new(placeholder_state(app.session.phase()))
            .path(path.as_deref())
            .theme(theme);
        f.render_widget(placeholder, areas.tree);
    }

    render_status_bar(f, app, theme, areas.status_bar);

    let command_bar = CommandBar::new()
        .commands(generate_command_bar_items(|action| app.action_available(action)))
        .theme(theme);
    f.render_widget(command_bar, areas.command_bar);

    if let Some(ref dialog_kind) = app.dialog {
        let dialog = Dialog::new(dialog_kind).theme(theme);
        f.render_widget(dialog, f.area());
    }
}
