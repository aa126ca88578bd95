mod api;
mod app;
mod collection;
mod config;
mod events;
mod models;
mod preview;
mod tags;

use std::io::Write as _;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::api::HttpFileApi;
use crate::app::Gallery;
use crate::config::Config;
use crate::tags::{FieldTarget, TagSort};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mediawall=info".parse()?),
        )
        .init();

    let config = Config::from_env();
    info!(server = %config.server_url, "Connecting to gallery server");

    let api = Arc::new(HttpFileApi::new(config.server_url.clone()));
    let gallery = Gallery::new(api, &config);
    gallery.start().await;
    drain_events(&gallery);

    // Line-oriented driver standing in for the UI layer: every command maps
    // onto one facade call, and rendering is a dump of plain data.
    print_help();
    let mut focused_text = String::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print!("> ");
    std::io::stdout().flush().ok();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = match line.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };
        match command {
            "" => {}
            "search" => gallery.search.set_query(arg),
            "more" => {
                let query = gallery.store.query();
                let _ = gallery.store.load_next(&query, false).await;
            }
            "scroll" => gallery.scroll.sentinel_visible(),
            "ls" => {
                for (index, item) in gallery.store.items().iter().enumerate() {
                    let marker = if item.is_video() {
                        "vid"
                    } else if item.is_image() {
                        "img"
                    } else {
                        "bin"
                    };
                    println!("{:4}  {}  {:14}  {}", index, marker, item.id, item.filename);
                }
            }
            "open" => match gallery.navigator.open(arg) {
                Some(index) => println!("previewing {} at index {}", arg, index),
                None => println!("unknown id: {}", arg),
            },
            "next" => println!("{:?}", gallery.navigator.next().await),
            "prev" => println!("{:?}", gallery.navigator.prev()),
            "close" => gallery.navigator.close(),
            "info" => {
                let info = gallery.navigator.info();
                match info.current_index {
                    Some(index) => println!(
                        "at {} of {} loaded{}{}",
                        index + 1,
                        info.total_loaded,
                        if info.at_start { " (first)" } else { "" },
                        if info.at_loaded_end { " (last loaded)" } else { "" },
                    ),
                    None => println!("no preview open ({} loaded)", info.total_loaded),
                }
            }
            "tags" => {
                for tag in gallery.tag_panel.visible() {
                    println!("{} ({})", tag.name, tag.count);
                }
            }
            "filter" => gallery.tag_panel.set_filter(arg),
            "sort" => match arg {
                "freq" | "frequency" => gallery.tag_panel.set_sort(TagSort::Frequency),
                _ => gallery.tag_panel.set_sort(TagSort::Alphabetical),
            },
            "focus" => {
                gallery.tag_panel.focus_field(FieldTarget::new(arg));
                focused_text.clear();
            }
            "insert" => {
                if let Some((field, text)) = gallery.insert_tag(arg, &focused_text) {
                    println!("{} = {:?}", field.name, text);
                    focused_text = text;
                }
            }
            "edit" => {
                if let Some((id, tags)) = arg.split_once(' ') {
                    let tags: Vec<String> = tags
                        .split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect();
                    match gallery.save_tags(id, tags).await {
                        Ok(()) => println!("updated {}", id),
                        Err(err) => println!("edit failed: {}", err),
                    }
                } else {
                    println!("usage: edit <id> <tag,tag,...>");
                }
            }
            "delete" => match gallery.delete_file(arg).await {
                Ok(()) => println!("deleted {}", arg),
                Err(err) => println!("delete failed: {}", err),
            },
            "quit" | "exit" => break,
            _ => print_help(),
        }
        // Give spawned loads and resolutions a moment before reporting.
        tokio::task::yield_now().await;
        drain_events(&gallery);
        print!("> ");
        std::io::stdout().flush().ok();
    }
    Ok(())
}

fn drain_events(gallery: &Gallery) {
    for event in gallery.events().poll() {
        println!("* {:?}", event);
    }
}

fn print_help() {
    println!(
        "commands: search <q> | more | scroll | ls | open <id> | next | prev | close | info\n          tags | filter <s> | sort <alpha|freq> | focus <field> | insert <tag>\n          edit <id> <tags> | delete <id> | quit"
    );
}
