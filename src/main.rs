use std::io::{self, IsTerminal};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use todos::config::DEFAULT_CONFIG_FILENAME;
use todos::shell::{run_shell, Piped, ShellFlags, Terminal};
use todos::{logging, parse_item_number, web, Config, TodoStore};

fn main() -> anyhow::Result<()> {
    let matches = App::new("todos")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Simon Janes <spjanes@protonmail.com>")
        .about("A to-do list kept in a plain text file")
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .help("YAML config file (default: ./todos.yaml if present)")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::with_name("file")
                .short("f")
                .long("file")
                .help("The to-do file, overriding the config")
                .takes_value(true)
                .global(true),
        )
        .subcommand(SubCommand::with_name("shell").about("Interactive prompt loop (the default)"))
        .subcommand(
            SubCommand::with_name("add").about("Append one item").arg(
                Arg::with_name("TEXT")
                    .help("Text of the new item")
                    .required(true)
                    .multiple(true),
            ),
        )
        .subcommand(SubCommand::with_name("show").about("Print the numbered list"))
        .subcommand(
            SubCommand::with_name("edit")
                .about("Replace the text of one item")
                .arg(
                    Arg::with_name("NUMBER")
                        .help("Item number, as printed by show")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("TEXT")
                        .help("New text")
                        .required(true)
                        .multiple(true)
                        .index(2),
                ),
        )
        .subcommand(
            SubCommand::with_name("complete")
                .about("Remove one item")
                .arg(
                    Arg::with_name("NUMBER")
                        .help("Item number, as printed by show")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            SubCommand::with_name("serve")
                .about("Serve the web page")
                .arg(
                    Arg::with_name("bind")
                        .long("bind")
                        .help("Address to bind to")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("port")
                        .short("p")
                        .long("port")
                        .help("Port to listen on")
                        .takes_value(true),
                ),
        )
        .get_matches();

    let config = load_config(&matches)?;
    logging::init(&config.log_level);
    let store = TodoStore::new(&config.todo_file);

    match matches.subcommand() {
        ("add", Some(args)) => run_add(&store, args),
        ("show", Some(_)) => run_show(&store),
        ("edit", Some(args)) => run_edit(&store, args),
        ("complete", Some(args)) => run_complete(&store, args),
        ("serve", Some(args)) => run_serve(store, &config, args),
        _ => run_interactive(store),
    }
}

// Subcommand flags marked global are visible on the subcommand matches too.
fn value_of<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a str> {
    matches.value_of(name).or_else(|| {
        matches
            .subcommand()
            .1
            .and_then(|sub| sub.value_of(name))
    })
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = match value_of(matches, "config") {
        Some(path) => Config::load(Path::new(path), true)?,
        None => Config::load(Path::new(DEFAULT_CONFIG_FILENAME), false)?,
    };
    if let Some(file) = value_of(matches, "file") {
        config.todo_file = PathBuf::from(file);
    }
    Ok(config)
}

fn joined_text(args: &ArgMatches) -> String {
    args.values_of("TEXT")
        .map(|words| words.collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn number_arg(args: &ArgMatches) -> anyhow::Result<usize> {
    let raw = args.value_of("NUMBER").unwrap_or_default();
    Ok(parse_item_number(raw)?)
}

fn run_add(store: &TodoStore, args: &ArgMatches) -> anyhow::Result<()> {
    let text = joined_text(args);
    let (list, item) = store.update(|list| list.add(&text).map(str::to_string))?;
    println!("{}-{}", list.len(), item);
    Ok(())
}

fn run_show(store: &TodoStore) -> anyhow::Result<()> {
    let list = store.load()?;
    if list.is_empty() {
        println!("Your list is empty.");
    } else {
        print!("{}", list);
    }
    Ok(())
}

fn run_edit(store: &TodoStore, args: &ArgMatches) -> anyhow::Result<()> {
    let number = number_arg(args)?;
    let text = joined_text(args);
    let (list, old) = store.update(|list| list.edit(number, &text))?;
    println!("{}-{} (was: {})", number, list.get(number).unwrap_or_default(), old);
    Ok(())
}

fn run_complete(store: &TodoStore, args: &ArgMatches) -> anyhow::Result<()> {
    let number = number_arg(args)?;
    let (_, item) = store.update(|list| list.complete(number))?;
    println!("Todo \"{}\" was removed from the list.", item);
    Ok(())
}

fn run_serve(store: TodoStore, config: &Config, args: &ArgMatches) -> anyhow::Result<()> {
    let bind = args.value_of("bind").unwrap_or(config.web.bind.as_str());
    let port = match args.value_of("port") {
        Some(p) => p.parse::<u16>().with_context(|| format!("invalid port `{}`", p))?,
        None => config.web.port,
    };
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("invalid bind address `{}`", bind))?;

    let state = web::AppState::new(store)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    runtime
        .block_on(web::serve(state, addr))
        .with_context(|| format!("serve on {}", addr))
}

fn run_interactive(store: TodoStore) -> anyhow::Result<()> {
    let flags = ShellFlags {
        store,
        now: Local::now(),
    };
    let mut stdout = io::stdout();
    if io::stdin().is_terminal() {
        let mut source = Terminal::new()?;
        run_shell(flags, &mut source, &mut stdout)?;
    } else {
        let mut source = Piped::new(io::stdin().lock(), io::stdout());
        run_shell(flags, &mut source, &mut stdout)?;
    }
    Ok(())
}
