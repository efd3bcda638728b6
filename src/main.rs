//! hd CLI - GitHub repository browser, offline task manager and response cache.

use clap::Parser;
use hubdeck::cli::{
    CacheCommands, Cli, Commands, ConfigCommands, RepoCommands, TaskCommands, ThemeCommands,
};
use hubdeck::commands::{self, Context, Move, Output, StdinConfirm};
use hubdeck::config::{ConfigOverrides, OutputFormat};
use hubdeck::notify::Notifier;
use hubdeck::tasks::AssumeYes;
use std::io::Write;
use std::process;

/// Environment variable holding the log filter, e.g. `HD_LOG=hubdeck=debug`.
const LOG_ENV: &str = "HD_LOG";

fn main() {
    init_logging();

    let cli = Cli::parse();

    let mut overrides = ConfigOverrides::new();
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    if let Some(base) = cli.api_base {
        overrides = overrides.with_api_base(base);
    }
    if let Some(Commands::Cache {
        origin: Some(ref origin),
        ..
    }) = cli.command
    {
        overrides = overrides.with_cache_origin(origin.clone());
    }

    let mut notes = Notifier::new();
    let (human, result) = match Context::open(&overrides) {
        Ok(mut ctx) => {
            let human = ctx.human();
            (human, run_command(cli.command, &mut ctx, &mut notes, human))
        }
        Err(e) => (cli.human_readable, Err(e)),
    };

    print_notifications(&mut notes, human);

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(
    command: Option<Commands>,
    ctx: &mut Context,
    notes: &mut Notifier,
    human: bool,
) -> Result<(), hubdeck::Error> {
    match command {
        Some(Commands::Repo { command }) => {
            let browser = ctx.browser();
            match command {
                RepoCommands::Connect { token } => {
                    let result = commands::repo_connect(ctx, &browser, notes, &token)?;
                    output(&result, human);
                }
                RepoCommands::Disconnect => {
                    let result = commands::repo_disconnect(ctx, &browser, notes)?;
                    output(&result, human);
                }
                RepoCommands::Status => {
                    let result = commands::repo_status(ctx)?;
                    output(&result, human);
                }
                RepoCommands::Search { query } => {
                    let result = commands::repo_search(ctx, &browser, notes, &query)?;
                    output(&result, human);
                }
                RepoCommands::Open { full_name } => {
                    let result = commands::repo_open(ctx, &browser, notes, &full_name)?;
                    output(&result, human);
                }
                RepoCommands::Ls => {
                    let result = commands::repo_list(ctx, &browser, notes, Move::Stay)?;
                    output(&result, human);
                }
                RepoCommands::Cd { dir } => {
                    let result = commands::repo_list(ctx, &browser, notes, Move::Into(&dir))?;
                    output(&result, human);
                }
                RepoCommands::Up => {
                    let result = commands::repo_list(ctx, &browser, notes, Move::Up)?;
                    output(&result, human);
                }
                RepoCommands::Cat { name } => {
                    let result = commands::repo_cat(ctx, &browser, notes, &name)?;
                    output(&result, human);
                }
                RepoCommands::Tab { tab } => {
                    let result = commands::repo_tab(ctx, &browser, notes, tab)?;
                    output(&result, human);
                }
                RepoCommands::Download { output: dir } => {
                    let result = commands::repo_download(ctx, &browser, notes, dir.as_deref())?;
                    output(&result, human);
                }
                RepoCommands::Refresh => {
                    let result = commands::repo_refresh(ctx, &browser, notes)?;
                    output(&result, human);
                }
            }
        }

        Some(Commands::Task { command }) => match command {
            TaskCommands::Add { text, priority } => {
                let result = commands::task_add(ctx, notes, &text, priority)?;
                output(&result, human);
            }
            TaskCommands::Toggle { id } => {
                let result = commands::task_toggle(ctx, &id)?;
                output(&result, human);
            }
            TaskCommands::Edit {
                id,
                text,
                priority,
                status,
            } => {
                let result = commands::task_edit(ctx, notes, &id, text, priority, status)?;
                output(&result, human);
            }
            TaskCommands::Rm { id, yes } => {
                let result = if yes {
                    commands::task_rm(ctx, notes, &id, &mut AssumeYes)?
                } else {
                    commands::task_rm(ctx, notes, &id, &mut StdinConfirm)?
                };
                output(&result, human);
            }
            TaskCommands::List { filter, view } => {
                let result = commands::task_list(ctx, filter, view)?;
                output(&result, human);
            }
            TaskCommands::Sync => {
                let result = commands::task_sync(ctx, notes)?;
                output(&result, human);
            }
        },

        Some(Commands::Cache { command, .. }) => match command {
            CacheCommands::Install => {
                let result = commands::cache_install(ctx)?;
                output(&result, human);
            }
            CacheCommands::Fetch {
                url,
                navigate,
                body,
            } => {
                let result = commands::cache_fetch(ctx, &url, navigate)?;
                if body {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&result.body)?;
                    stdout.flush()?;
                } else {
                    output(&result, human);
                }
            }
            CacheCommands::Activate => {
                let result = commands::cache_activate(ctx)?;
                output(&result, human);
            }
            CacheCommands::List => {
                let result = commands::cache_list(ctx)?;
                output(&result, human);
            }
            CacheCommands::SyncEvent { tag } => {
                let result = commands::cache_sync_event(ctx, &tag)?;
                output(&result, human);
            }
        },

        Some(Commands::Theme { command }) => match command {
            ThemeCommands::Get => {
                let result = commands::theme_get(ctx)?;
                output(&result, human);
            }
            ThemeCommands::Set { theme } => {
                let result = commands::theme_set(ctx, theme)?;
                output(&result, human);
            }
            ThemeCommands::Toggle => {
                let result = commands::theme_toggle(ctx)?;
                output(&result, human);
            }
        },

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(ctx)?;
                output(&result, human);
            }
            ConfigCommands::Set { key, value } => {
                let result = commands::config_set(&key, &value)?;
                output(&result, human);
            }
        },

        None => {
            let result = commands::repo_status(ctx)?;
            output(&result, human);
        }
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

/// Flush pending notifications to stderr.
fn print_notifications(notes: &mut Notifier, human: bool) {
    for note in notes.drain() {
        if human {
            eprintln!("{} {}", note.level.icon(), note.message);
        } else {
            eprintln!("{}", serde_json::json!({ "notification": note }));
        }
    }
}
