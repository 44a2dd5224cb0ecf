//! CLI Session Command
//!
//! Interactive loop over one `IdeaSession`: plain lines set the topic and
//! generate, slash commands switch mode/category and browse the history.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use ideaforge_client::{IdeaSession, IdeaStreamClient};
use ideaforge_core::{Category, HistoryEntry, Mode};

use crate::terminal_output::{
    heading, note_error, note_info, note_success, note_warn, render_table, stream_write, Column,
};

const HELP: &str = "\
  <тема>             сгенерировать по теме
  /mode list|single|random
  /category <name>|none   tech, business, creative, science, lifestyle
  /random            сгенерировать в режиме random
  /history           последние генерации
  /show <n>          открыть запись истории
  /clear             очистить историю
  /quit";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Topic(String),
    Mode(Mode),
    Category(Option<Category>),
    Random,
    History,
    Show(usize),
    Clear,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Topic(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name {
        "mode" => arg
            .parse()
            .map(Input::Mode)
            .unwrap_or_else(|e: ideaforge_core::IdeaError| Input::Invalid(e.to_string())),
        "category" if arg.is_empty() || arg == "none" => Input::Category(None),
        "category" => arg
            .parse()
            .map(|c| Input::Category(Some(c)))
            .unwrap_or_else(|e: ideaforge_core::IdeaError| Input::Invalid(e.to_string())),
        "random" => Input::Random,
        "history" => Input::History,
        "show" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => Input::Show(n - 1),
            _ => Input::Invalid(format!("expected a history number, got '{arg}'")),
        },
        "clear" => Input::Clear,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => Input::Invalid(format!("unknown command /{other}")),
    }
}

fn history_table(entries: &[&HistoryEntry]) -> String {
    let columns = [
        Column::right("#"),
        Column::left("Режим"),
        Column::left("Тема").max(32),
        Column::left("Результат").max(48),
    ];
    let rows: Vec<Vec<String>> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            vec![
                (i + 1).to_string(),
                entry.mode.to_string(),
                entry.topic.clone(),
                entry.result.clone(),
            ]
        })
        .collect();
    render_table(&columns, &rows)
}

async fn generate(session: &mut IdeaSession) {
    println!("\n{}\n", heading(session.mode.result_title()));
    let outcome = session
        .generate(|delta| {
            if let Err(e) = stream_write(&mut std::io::stdout(), delta) {
                tracing::debug!(error = %e, "stdout write failed");
            }
        })
        .await;
    println!();
    match outcome {
        Ok("") => note_warn("Пустой ответ"),
        Ok(_) => {}
        Err(message) => note_error(&message),
    }
}

pub async fn run(client: IdeaStreamClient) -> Result<()> {
    let mut session = IdeaSession::new(client);
    note_info(&format!("IdeaForge · {}", session_status(&session)));
    println!("{HELP}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Input::Empty => {}
            Input::Topic(topic) => {
                session.topic = topic;
                if !session.can_generate() {
                    note_warn("Введите тему");
                    continue;
                }
                generate(&mut session).await;
            }
            Input::Mode(mode) => {
                session.mode = mode;
                note_info(&session_status(&session));
            }
            Input::Category(category) => {
                session.category = category;
                note_info(&session_status(&session));
            }
            Input::Random => {
                session.mode = Mode::Random;
                generate(&mut session).await;
            }
            Input::History => {
                let entries: Vec<&HistoryEntry> = session.history().iter().collect();
                if entries.is_empty() {
                    note_info("История пуста");
                } else {
                    print!("{}", history_table(&entries));
                }
            }
            Input::Show(index) => match session.restore(index) {
                Some(entry) => {
                    let text = entry.result.clone();
                    println!("\n{}\n\n{text}\n", heading(session.result_title()));
                    note_info(&session_status(&session));
                }
                None => note_warn("Нет такой записи"),
            },
            Input::Clear => {
                session.clear_history();
                note_success("История очищена");
            }
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Invalid(message) => note_warn(&message),
        }
    }

    Ok(())
}

fn session_status(session: &IdeaSession) -> String {
    let category = session
        .category
        .map(|c| c.label().to_string())
        .unwrap_or_else(|| "любая".to_string());
    match session.mode {
        Mode::Random => format!("режим: random, категория: {category}"),
        mode => format!("режим: {mode}"),
    }
}
