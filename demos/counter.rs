//! Counter - two components, a click event and a load event.
//!
//! `main` embeds `myComp` through a `#{myComp}` token. Clicking (Enter or
//! Space) publishes `BUTTON_CLICKED`; a listener bumps the counter shown in
//! `main`'s header. `q` or Esc quits.
//!
//! Run with: `cargo run --example counter` (set `RUST_LOG=debug` to see the
//! composition trace on stderr).

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{self, Clear, ClearType};
use spark_compose::{Composer, CompositionNode, DomId, Event, EventBus, Listener};
use tracing_subscriber::EnvFilter;

const MY_COMP: &str = r#"
<div id="myComp">
    <p>Hi from myComp!</p>
</div>"#;

const MAIN: &str = r#"
<div id="main">
    <style>
        #main { background-color: black; color: white; }
    </style>
    <h1 id="header">0</h1>
    #{myComp}
</div>"#;

enum AppEvent {
    ButtonClicked,
    MainLoaded,
}

impl Event for AppEvent {
    fn name(&self) -> &str {
        match self {
            AppEvent::ButtonClicked => "BUTTON_CLICKED",
            AppEvent::MainLoaded => "MAIN_LOADED",
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let bus: Rc<EventBus<AppEvent>> = Rc::new(EventBus::new());
    bus.register_event("BUTTON_CLICKED");
    bus.register_event("MAIN_LOADED");
    bus.add_listener("MAIN_LOADED", &Listener::new(|_| tracing::info!("hi from main!")))?;

    // Components
    let bus_for_child = bus.clone();
    let my_comp = CompositionNode::new("myComp", MY_COMP).on_ready(move |_| {
        if let Err(err) = bus_for_child.subscribe("BUTTON_CLICKED", |_| tracing::info!("clicked also!")) {
            tracing::warn!(error = %err, "myComp could not subscribe");
        }
    });

    let header: Rc<Cell<Option<DomId>>> = Rc::new(Cell::new(None));
    let header_slot = header.clone();
    let main_node = CompositionNode::new("main", MAIN).on_ready(move |ctx| {
        if let Some(root) = ctx.root {
            header_slot.set(ctx.document.element_by_id(root, "header"));
        }
    });

    let composer = Rc::new(RefCell::new(Composer::new()));
    let body = {
        let mut composer = composer.borrow_mut();
        composer.register(my_comp);
        composer.register(main_node);
        let body = composer.document_mut().create_element("body");
        composer.mount("main", body)?;
        body
    };

    // Counter state lives in the header text
    let count = Rc::new(Cell::new(0u32));
    let composer_weak = Rc::downgrade(&composer);
    let header_id = header.get();
    bus.add_listener(
        "BUTTON_CLICKED",
        &Listener::new(move |_| {
            count.set(count.get() + 1);
            if let (Some(composer), Some(header)) = (composer_weak.upgrade(), header_id) {
                composer
                    .borrow_mut()
                    .document_mut()
                    .set_text_content(header, count.get().to_string());
            }
        }),
    )?;
    bus.emit(&AppEvent::MainLoaded);

    terminal::enable_raw_mode()?;
    let result = run(&composer, body, &bus);
    terminal::disable_raw_mode()?;
    result
}

fn run(composer: &RefCell<Composer>, body: DomId, bus: &EventBus<AppEvent>) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    loop {
        let markup = composer.borrow().document().to_markup(body);
        execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        write!(stdout, "{}\r\n", "spark-compose counter".bold())?;
        for line in markup.lines().filter(|line| !line.trim().is_empty()) {
            write!(stdout, "{line}\r\n")?;
        }
        write!(stdout, "\r\n{}\r\n", "enter/space: click   q: quit".dim())?;
        stdout.flush()?;

        if let TermEvent::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    bus.emit(&AppEvent::ButtonClicked);
                }
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                _ => {}
            }
        }
    }
}
