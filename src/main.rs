use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use dosfronteras::cart::format_price;
use dosfronteras::config::Config;
use dosfronteras::embed;
use dosfronteras::headlines::now_millis;
use dosfronteras::http_client;
use dosfronteras::persist;
use dosfronteras::provider;
use dosfronteras::state::{
    AppState, DeleteKind, Delta, PendingDelete, ProviderCommand, Screen, apply_delta,
};
use dosfronteras::storage::LocalStore;

const TICKER_STEP: Duration = Duration::from_secs(4);

struct App {
    state: AppState,
    store: LocalStore,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    ticker_idx: usize,
    last_ticker: Instant,
}

impl App {
    fn new(state: AppState, store: LocalStore, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            store,
            should_quit: false,
            cmd_tx,
            ticker_idx: 0,
            last_ticker: Instant::now(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        self.state.notice = None;
        if self.state.confirm.is_some() {
            self.finish_delete(key.code == KeyCode::Char('y'));
            persist::save_if_dirty(&mut self.state, &mut self.store);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.set_screen(Screen::Home),
            KeyCode::Char('2') => self.state.set_screen(Screen::Shop),
            KeyCode::Char('3') => self.state.set_screen(Screen::Events),
            KeyCode::Char('4') => self.state.set_screen(Screen::Fighters),
            KeyCode::Char('5') => self.state.set_screen(Screen::Videos),
            KeyCode::Tab => self.state.cycle_screen(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('r') => self.request(ProviderCommand::RefreshHeadlines),
            KeyCode::Char('A') => {
                let on = self.state.toggle_admin();
                self.state
                    .push_log(format!("[INFO] Admin mode {}", if on { "on" } else { "off" }));
            }
            KeyCode::Char('s') => self.state.cycle_size(),
            KeyCode::Char('a') | KeyCode::Enter => self.add_selected_to_cart(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_selected_line(1),
            KeyCode::Char('-') => self.adjust_selected_line(-1),
            KeyCode::Char('c') => {
                self.state.clear_cart();
                self.state.notice = Some("Cart cleared".to_string());
            }
            KeyCode::Char('x') => {
                self.state.notice = Some("Checkout is coming soon".to_string());
            }
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
        persist::save_if_dirty(&mut self.state, &mut self.store);
    }

    fn request(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Headline refresh unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Headline provider stopped");
        }
    }

    fn add_selected_to_cart(&mut self) {
        let Some(product) = self.state.selected_product() else {
            return;
        };
        let id = product.id.clone();
        let size = self.state.selected_size();
        match self.state.add_to_cart(&id, size.as_deref()) {
            Ok(line) => {
                self.state.notice = Some(format!("Added {} (x{})", line.name, line.quantity));
            }
            Err(err) => self.state.notice = Some(err.to_string()),
        }
    }

    fn adjust_selected_line(&mut self, delta: i64) {
        let Some(product) = self.state.selected_product() else {
            return;
        };
        let id = product.id.clone();
        let size = self.state.selected_size();
        match self.state.change_quantity(&id, size.as_deref(), delta) {
            Ok(Some(qty)) => self.state.notice = Some(format!("Quantity {qty}")),
            Ok(None) => self.state.notice = Some("Removed from cart".to_string()),
            Err(err) => self.state.notice = Some(err.to_string()),
        }
    }

    fn delete_selected(&mut self) {
        if let Err(err) = self.state.request_delete_selected() {
            self.state.notice = Some(err.to_string());
        }
    }

    fn finish_delete(&mut self, confirmed: bool) {
        if !confirmed {
            self.state.cancel_delete();
            self.state.notice = Some("Delete cancelled".to_string());
            return;
        }
        match self.state.confirm_delete() {
            Ok(Some(label)) => self.state.push_log(format!("[INFO] Deleted {label}")),
            Ok(None) => {}
            Err(err) => self.state.notice = Some(err.to_string()),
        }
    }

    fn tick(&mut self) {
        if self.last_ticker.elapsed() >= TICKER_STEP {
            self.ticker_idx = self.ticker_idx.wrapping_add(1);
            self.last_ticker = Instant::now();
        }
    }
}

fn main() -> io::Result<()> {
    let config = Config::from_env();
    if let Err(err) = http_client::init_http_client(config.feed_timeout) {
        eprintln!("warning: {err:#}");
    }

    let store = LocalStore::open_or_memory(config.data_dir.as_deref());
    let mut state = AppState::new();
    persist::load_into_state(&mut state, &store);

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    provider::spawn_provider(&config, tx, cmd_rx);

    let startup = provider::startup_commands(&state, now_millis(), config.stale_after);
    if !startup.contains(&ProviderCommand::RefreshHeadlines) {
        state.push_log("[INFO] Using cached headlines");
    }
    for cmd in startup {
        let _ = cmd_tx.send(cmd);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(state, store, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        let mut applied = false;
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
            applied = true;
        }
        if applied {
            persist::save_if_dirty(&mut app.state, &mut app.store);
        }

        app.tick();
        let today = Local::now().date_naive();
        terminal.draw(|f| ui(f, app, today))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App, today: NaiveDate) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_ticker(frame, chunks[1], app);

    match app.state.screen {
        Screen::Home => render_home(frame, chunks[2], &app.state, today),
        Screen::Shop => render_shop(frame, chunks[2], &app.state),
        Screen::Events => render_events(frame, chunks[2], &app.state, today),
        Screen::Fighters => render_fighters(frame, chunks[2], &app.state),
        Screen::Videos => render_videos(frame, chunks[2], &app.state),
    }

    render_console(frame, chunks[3], &app.state);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    if let Some(pending) = app.state.confirm.as_ref() {
        render_confirm_overlay(frame, frame.size(), pending);
    }
}

fn header_text(state: &AppState) -> String {
    let tabs = Screen::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if *s == state.screen {
                format!("[{} {}]", i + 1, s.label())
            } else {
                format!(" {} {} ", i + 1, s.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let admin = if state.admin { " | ADMIN" } else { "" };
    let line1 = format!(
        "DOS FRONTERAS | Cart: {} ({}){}",
        state.cart.count(),
        format_price(state.cart.total_cents()),
        admin
    );
    format!("{line1}\n{tabs}")
}

fn footer_text(state: &AppState) -> String {
    let base = match state.screen {
        Screen::Shop => "j/k Move | s Size | a Add | +/- Qty | c Clear | x Checkout",
        Screen::Home | Screen::Events if state.admin => "j/k Move | d Delete",
        _ => "j/k Move",
    };
    match state.notice.as_deref() {
        Some(notice) if state.screen != Screen::Shop => {
            format!("{notice} | {base} | ? Help | q Quit")
        }
        _ => format!("{base} | r Refresh | A Admin | Tab Next | ? Help | q Quit"),
    }
}

fn render_ticker(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let mut title = match (state.headlines_loading, state.headlines_updated_label()) {
        (true, _) => "Breaking News (refreshing...)".to_string(),
        (false, Some(updated)) => format!("Breaking News (updated {updated})"),
        (false, None) => "Breaking News".to_string(),
    };
    if let Some(fallback) = state.headlines_fallback_label() {
        title.push_str(&format!(" [{fallback}]"));
    }
    let line = if state.headlines.is_empty() {
        Line::from(Span::styled(
            "No headlines available",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let h = &state.headlines[app.ticker_idx % state.headlines.len()];
        Line::from(vec![
            Span::styled(
                format!("{} ", h.source),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(h.text.clone()),
        ])
    };
    let ticker = Paragraph::new(line).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(ticker, area);
}

fn render_home(frame: &mut Frame, area: Rect, state: &AppState, today: NaiveDate) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(28)])
        .split(area);

    let mut lines = Vec::new();
    if state.news.is_empty() {
        lines.push(Line::from(Span::styled(
            "Loading news...",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (idx, item) in state.news.iter().enumerate() {
        let style = row_style(idx == state.selected);
        lines.push(Line::from(Span::styled(
            format!("{}  {}", item.date, item.title),
            style.add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(format!("  {}", item.summary), style)));
        if !item.tags.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  #{}", item.tags.join(" #")),
                style.fg(Color::Cyan),
            )));
        }
        lines.push(Line::raw(""));
    }
    let news = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Latest News").borders(Borders::ALL));
    frame.render_widget(news, cols[0]);

    let stats = state.quick_stats(today);
    let text = [
        format!("News            {}", stats.news),
        format!("Upcoming events {}", stats.upcoming_events),
        format!("Fighters        {}", stats.fighters),
        format!("Combined wins   {}", stats.fighter_wins),
        format!("In cart         {}", stats.cart_count),
    ]
    .join("\n");
    let quick = Paragraph::new(text).block(Block::default().title("Quick Stats").borders(Borders::ALL));
    frame.render_widget(quick, cols[1]);
}

fn render_shop(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(40)])
        .split(area);

    let mut lines = Vec::new();
    for (idx, p) in state.products.iter().enumerate() {
        let selected = idx == state.selected;
        let style = row_style(selected);
        lines.push(Line::from(Span::styled(
            format!(
                "{} {:<28} {:>8}  {}",
                p.icon,
                p.name,
                format_price(u64::from(p.price_cents)),
                p.category.label()
            ),
            style,
        )));
        if selected && !p.sizes.is_empty() {
            let sizes = p
                .sizes
                .iter()
                .enumerate()
                .map(|(i, s)| if i == state.size_choice { format!("[{s}]") } else { s.clone() })
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(Line::from(Span::styled(
                format!("   Size: {sizes}"),
                Style::default().fg(Color::Yellow),
            )));
        }
    }
    if let Some(notice) = state.notice.as_deref() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }
    let products = Paragraph::new(lines).block(Block::default().title("Shop").borders(Borders::ALL));
    frame.render_widget(products, cols[0]);

    let mut cart_lines = Vec::new();
    if state.cart.is_empty() {
        cart_lines.push(Line::from(Span::styled(
            "Your cart is empty",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for item in state.cart.items() {
        let size = item.size.as_deref().map(|s| format!(" ({s})")).unwrap_or_default();
        cart_lines.push(Line::raw(format!(
            "{}{} x{}  {}",
            item.name,
            size,
            item.quantity,
            format_price(item.line_total_cents())
        )));
    }
    cart_lines.push(Line::raw(""));
    cart_lines.push(Line::from(Span::styled(
        format!("Total: {}", format_price(state.cart.total_cents())),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    let cart = Paragraph::new(cart_lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Cart").borders(Borders::ALL));
    frame.render_widget(cart, cols[1]);
}

fn render_events(frame: &mut Frame, area: Rect, state: &AppState, today: NaiveDate) {
    let mut lines = vec![Line::from(Span::styled(
        format!("{:<12} {}", "Date", "Match"),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (idx, e) in state.events.iter().enumerate() {
        let past = NaiveDate::parse_from_str(&e.date, "%Y-%m-%d")
            .map(|d| d < today)
            .unwrap_or(false);
        let mut style = row_style(idx == state.selected);
        if past {
            style = style.fg(Color::DarkGray);
        }
        lines.push(Line::from(Span::styled(
            format!("{:<12} {}", e.date, e.matchup),
            style,
        )));
    }
    let events = Paragraph::new(lines).block(Block::default().title("Events").borders(Borders::ALL));
    frame.render_widget(events, area);
}

fn render_fighters(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{:<22} {:<20} {:<18} {:>8} {:>4} {:>4}",
            "Fighter", "Nickname", "Division", "Record", "KO", "SUB"
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (idx, f) in state.fighters.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!(
                "{:<22} {:<20} {:<18} {:>8} {:>4} {:>4}",
                f.name,
                f.nickname,
                f.division,
                f.record.to_string(),
                f.ko_wins,
                f.sub_wins
            ),
            row_style(idx == state.selected),
        )));
    }
    let fighters = Paragraph::new(lines).block(Block::default().title("Fighter Stats").borders(Borders::ALL));
    frame.render_widget(fighters, area);
}

fn render_videos(frame: &mut Frame, area: Rect, state: &AppState) {
    let slots = [
        ("Featured video", state.featured_video.as_deref()),
        ("Latest episode", state.latest_episode.as_deref()),
    ];
    let mut lines = Vec::new();
    for (idx, (label, url)) in slots.iter().enumerate() {
        let style = row_style(idx == state.selected);
        lines.push(Line::from(Span::styled(
            label.to_string(),
            style.add_modifier(Modifier::BOLD),
        )));
        match url {
            None => lines.push(Line::raw("  No video has been set yet")),
            Some(url) => {
                lines.push(Line::raw(format!("  {url}")));
                match embed::resolve(url) {
                    Some(video) => lines.push(Line::from(Span::styled(
                        format!("  {} embed: {}", video.provider.label(), video.locator),
                        Style::default().fg(Color::Green),
                    ))),
                    None => lines.push(Line::from(Span::styled(
                        "  Cannot parse the provided URL",
                        Style::default().fg(Color::Red),
                    ))),
                }
            }
        }
        lines.push(Line::raw(""));
    }
    let videos = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Videos").borders(Borders::ALL));
    frame.render_widget(videos, area);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = area.height.saturating_sub(2) as usize;
    let start = state.logs.len().saturating_sub(visible);
    let lines: Vec<Line> = state
        .logs
        .iter()
        .skip(start)
        .map(|msg| {
            let color = if msg.starts_with("[WARN]") {
                Color::Yellow
            } else {
                Color::Gray
            };
            Line::from(Span::styled(msg.clone(), Style::default().fg(color)))
        })
        .collect();
    let console = Paragraph::new(lines).block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn row_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Dos Fronteras - Help",
        "",
        "Global:",
        "  1-5 / Tab    Switch section",
        "  j/k or ↑/↓   Move",
        "  r            Refresh headlines",
        "  A            Toggle admin mode",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Shop:",
        "  s            Cycle size",
        "  a / Enter    Add to cart",
        "  + / -        Change quantity",
        "  c            Clear cart",
        "",
        "Admin (Home / Events):",
        "  d            Delete selected item (y to confirm)",
        "  Use the `admin` binary to add news, events and videos.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn render_confirm_overlay(frame: &mut Frame, area: Rect, pending: &PendingDelete) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let what = match pending.kind {
        DeleteKind::News => "news item",
        DeleteKind::Event => "event",
    };
    let text = format!("Delete {what}?\n\n  {}\n\ny Confirm | any other key Cancel", pending.label);
    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Confirm").borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(popup, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
