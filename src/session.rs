//! Interactive terminal session driving the page.
//!
//! The page is printed as an outline with element ids; commands address those
//! ids. Tasks started by interactions (fetching children, loading the catalog)
//! run on the local task set while the session keeps reading input, and the
//! page is printed again whenever one of them completes.

use crate::dom::render::render_text;
use crate::dom::{ElementId, Event, Interaction, RenderTarget, Task};
use crate::page::PageController;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Interact(Event),
    Go(String),
    Show,
    Help,
    Quit,
}

pub struct CommandParser {
    interaction: Regex,
    go: Regex,
}

impl CommandParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            interaction: Regex::new(r"^(click|enter|leave)\s+(\d+)$")?,
            go: Regex::new(r"^go(?:\s+(\S+))?$")?,
        })
    }

    pub fn parse(&self, line: &str) -> Result<Command, String> {
        let line = line.trim();

        if let Some(cap) = self.interaction.captures(line) {
            let kind = match &cap[1] {
                "click" => Interaction::Click,
                "enter" => Interaction::PointerEnter,
                _ => Interaction::PointerLeave,
            };
            let id = cap[2]
                .parse::<usize>()
                .map_err(|_| format!("Invalid element id: {}", &cap[2]))?;
            return Ok(Command::Interact(Event::new(kind, ElementId::from_raw(id))));
        }

        if let Some(cap) = self.go.captures(line) {
            let fragment = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            return Ok(Command::Go(fragment.to_string()));
        }

        match line {
            "show" | "" => Ok(Command::Show),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

/// Runs the session until `quit` or end of input.
///
/// Must be polled inside a `tokio::task::LocalSet`, since tasks are spawned
/// with `spawn_local`.
pub async fn run_session(
    controller: Rc<PageController>,
    target: RenderTarget,
    start_fragment: &str,
    max_label_width: usize,
) -> anyhow::Result<()> {
    let parser = CommandParser::new()?;
    let (done_tx, mut done_rx) = unbounded_channel::<()>();

    if let Some(task) = controller.navigate(start_fragment) {
        let spinner = loading_spinner();
        spawn(task, &done_tx);
        done_rx.recv().await;
        spinner.finish_and_clear();
    }

    print_help();
    print_page(&target, max_label_width);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parser.parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => print_help(),
                    Ok(Command::Show) => print_page(&target, max_label_width),
                    Ok(Command::Go(fragment)) => {
                        if let Some(task) = controller.navigate(&fragment) {
                            spawn(task, &done_tx);
                        }
                        print_page(&target, max_label_width);
                    }
                    Ok(Command::Interact(event)) => {
                        if !target.is_attached(event.target) {
                            eprintln!("\x1b[31mNo element [{}] on this page\x1b[0m", event.target);
                            continue;
                        }
                        for task in target.dispatch(event) {
                            spawn(task, &done_tx);
                        }
                        print_page(&target, max_label_width);
                    }
                    Err(message) => eprintln!("\x1b[31m{}\x1b[0m (type 'help')", message),
                }
            }
            Some(()) = done_rx.recv() => print_page(&target, max_label_width),
        }
    }

    Ok(())
}

fn spawn(task: Task, done: &UnboundedSender<()>) {
    let done = done.clone();
    tokio::task::spawn_local(async move {
        task.await;
        let _ = done.send(());
    });
}

fn loading_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Loading...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_page(target: &RenderTarget, max_label_width: usize) {
    println!("\n{}", render_text(target, max_label_width));
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn print_help() {
    println!("📖 Available Commands:");
    println!("  \x1b[1m\x1b[32mclick <id>\x1b[0m   - Click an element (headers expand, images enlarge, ☆ favourites)");
    println!("  \x1b[1m\x1b[32menter <id>\x1b[0m   - Move the pointer onto an image to see its caption");
    println!("  \x1b[1m\x1b[32mleave <id>\x1b[0m   - Move the pointer off an image");
    println!("  \x1b[1m\x1b[32mgo <page>\x1b[0m    - Open catalog, favourites or anything else for home");
    println!("  \x1b[1m\x1b[32mshow\x1b[0m         - Print the page again");
    println!("  \x1b[1m\x1b[32mquit\x1b[0m         - Leave albumtree");
}
