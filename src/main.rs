//! signdash - Actor-based terminal dashboard for the gesture backend
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine and session pollers
//! - Network Layer (Tokio) - async HTTP execution

use std::io;
use std::time::Duration;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use tokio::sync::mpsc;

use signdash::constants::{APP_NAME, APP_VERSION, CLEAR_CONFIRM_PROMPT};
use signdash::messages::ui_events::{key_to_ui_event, Overlay};
use signdash::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use signdash::models::CameraStatus;
use signdash::ui::{self, FramePreview};
use signdash::{AppActor, BackendClient, ClientConfig, NetworkActor};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, config_error) = ClientConfig::load(std::env::args().nth(1));

    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", &config.log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(config.log_level())
        .init();
    tracing::info!(version = APP_VERSION, backend = %config.backend_url, "Starting {}", APP_NAME);
    if let Some(e) = config_error {
        tracing::warn!(path = %ClientConfig::config_path().display(), error = %format!("{:#}", e), "Config unusable, running with defaults");
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let client = BackendClient::new(config.backend_url.clone(), config.request_timeout());
    let network_actor = NetworkActor::new(client, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(&config, net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    // Run UI loop (synchronous with async polling)
    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();
    let mut preview = FramePreview::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state, &mut preview))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(key, current_state.overlay) {
                    let quit = event == UiEvent::Quit;
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState, preview: &mut FramePreview) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Title bar
            Constraint::Length(1),  // Controls
            Constraint::Min(8),     // Frame + side panel
            Constraint::Length(3),  // Statistics
            Constraint::Length(1),  // Status bar
        ])
        .split(area);

    draw_title_bar(f, state, main_chunks[0]);
    draw_controls(f, state, main_chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[2]);
    draw_frame(f, state, preview, body[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(body[1]);
    draw_gesture(f, state, side[0]);
    draw_predictions(f, state, side[1]);

    draw_statistics(f, state, main_chunks[3]);
    draw_status_bar(f, state, main_chunks[4]);

    // Popups
    match state.overlay {
        Overlay::Notice => draw_notice_popup(f, state, area),
        Overlay::ConfirmClear => draw_confirm_popup(f, area),
        Overlay::Diagnostics => draw_diagnostics_popup(f, state, area),
        Overlay::Help => draw_help_popup(f, area),
        Overlay::None => {}
    }
}

fn draw_title_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let spans = vec![
        Span::styled(format!(" {} ", APP_NAME), Style::default().fg(Color::Black).bg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(state.backend_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", state.session.as_str()),
            Style::default().fg(ui::session_color(state.session)).bold(),
        ),
    ];
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_controls(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    f.render_widget(
        ui::render_control(state.start_label, 's', state.start_enabled, Color::Green),
        chunks[0],
    );
    f.render_widget(
        ui::render_control(state.stop_label, 'x', state.stop_enabled, Color::Red),
        chunks[1],
    );
}

fn draw_frame(f: &mut Frame, state: &RenderState, preview: &mut FramePreview, area: Rect) {
    let title = match &state.frame {
        Some(frame) => format!(" Camera #{} ({:.1} KiB) ", frame.seq, frame.len() as f64 / 1024.0),
        None => String::from(" Camera "),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ui::session_color(state.session)))
        .title(title);

    let inner = block.inner(area);
    let lines = preview.lines(state.frame.as_ref(), inner.width, inner.height);
    let frame_view = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(frame_view, area);
}

fn draw_gesture(f: &mut Frame, state: &RenderState, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            state.gesture_label.clone(),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(Span::styled(
            format!("Confidence: {}%", state.confidence),
            Style::default().fg(Color::Gray),
        )),
    ];
    let gesture = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Detected Gesture "));
    f.render_widget(gesture, area);
}

fn draw_predictions(f: &mut Frame, state: &RenderState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Recent Predictions ({}) ", state.predictions.len()));

    let predictions = Paragraph::new(ui::prediction_lines(&state.predictions))
        .block(block)
        .scroll((state.predictions_scroll, 0));
    f.render_widget(predictions, area);
}

fn draw_statistics(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    let stats = &state.statistics;
    f.render_widget(ui::render_stat(" Total Predictions ", stats.total().to_string()), chunks[0]);
    f.render_widget(ui::render_stat(" Unique Gestures ", stats.unique().to_string()), chunks[1]);
    f.render_widget(
        ui::render_stat(" Most Detected ", stats.most_detected_label().to_string()),
        chunks[2],
    );
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let spans = vec![
        Span::styled(format!(" {} ", state.status_text), Style::default().fg(Color::White)),
        Span::styled(
            "| s:start x:stop c:clear p/t:refresh d:diag ?:help q:quit ",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_notice_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(notice) = &state.notice else {
        return;
    };
    let popup_area = centered_rect(60, 30, area);

    let mut text = vec![Line::from(""), Line::from(format!(" {}", notice.message))];
    if let Some(hint) = &notice.hint {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(format!(" {}", hint), Style::default().fg(Color::Yellow))));
    }
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(" Press any key to continue...", Style::default().fg(Color::DarkGray))));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", notice.title))
        .style(Style::default().bg(Color::Black));

    let popup = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(popup, popup_area);
}

fn draw_confirm_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 20, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Clear History (y/n) ")
        .style(Style::default().bg(Color::Black));

    let prompt = Paragraph::new(format!("\n {}", CLEAR_CONFIRM_PROMPT))
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(prompt, popup_area);
}

fn draw_diagnostics_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(50, 40, area);

    let flag = |name: &str, value: bool| {
        Line::from(vec![
            Span::raw(format!(" {:<22}", name)),
            Span::styled(
                if value { "yes" } else { "no" },
                Style::default().fg(if value { Color::Green } else { Color::Red }),
            ),
        ])
    };

    let text = match &state.diagnostics {
        None => vec![Line::from(" Loading...")],
        Some(Err(e)) => vec![Line::from(Span::styled(format!(" {}", e), Style::default().fg(Color::Red)))],
        Some(Ok(CameraStatus {
            camera_active,
            camera_object_exists,
            camera_is_running,
            is_opened,
            camera_index,
        })) => vec![
            flag("camera active", *camera_active),
            flag("camera object exists", *camera_object_exists),
            flag("camera running", *camera_is_running),
            flag("device opened", *is_opened),
            Line::from(format!(
                " {:<22}{}",
                "camera index",
                camera_index.map(|i| i.to_string()).unwrap_or_else(|| String::from("-"))
            )),
        ],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Camera Diagnostics (d:reload, any key:close) ")
        .style(Style::default().bg(Color::Black));

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(text).block(block), popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);

    let help_text = r#"
 SIGNDASH - Keyboard Shortcuts

 CAMERA
   s                  Start camera
   x                  Stop camera

 DATA
   p                  Refresh predictions
   t                  Refresh statistics
   c                  Clear all predictions
   ↑ / ↓              Scroll predictions

 GENERAL
   d                  Camera diagnostics
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
