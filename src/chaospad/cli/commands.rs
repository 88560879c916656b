//! # CLI Layer
//!
//! The terminal is one host for [`PadsAdminPanel`]; it is not the application
//! itself. This is the only place in the crate that:
//! - Parses shell arguments
//! - Writes to stdout/stderr
//! - Installs the tracing subscriber
//!
//! Each invocation builds a panel over [`HttpApiClient`] and a
//! [`ConsoleNotifier`], runs one panel operation, and prints the resulting
//! state. Request failures are reported by the notifier and turn into a
//! non-zero exit status; `run()` itself only returns `Err` for problems that
//! happen before a panel exists (bad config, bad URL).

use super::console::ConsoleNotifier;
use super::render::{render_full_pad, render_pad_table};
use super::setup::{Cli, Commands, PageArgs};
use chaospad::client::http::HttpApiClient;
use chaospad::client::ApiClient;
use chaospad::config::{default_config_dir, PanelConfig, KEYS};
use chaospad::error::{ChaospadError, Result};
use chaospad::panel::{Outcome, PadsAdminPanel, PanelSettings};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

type ConsolePanel<C = HttpApiClient> = PadsAdminPanel<C, ConsoleNotifier>;

struct AppContext {
    config: PanelConfig,
    client: HttpApiClient,
}

impl AppContext {
    fn panel(self, settings: PanelSettings, assume_yes: bool) -> ConsolePanel {
        PadsAdminPanel::new(self.client, ConsoleNotifier::new(assume_yes), settings)
    }

    fn mount(self, args: &PageArgs) -> ConsolePanel {
        let mut settings = self.config.panel_settings();
        settings
            .pagination
            .apply(&args.page_request(&settings.pagination.sort));
        settings.search = args.search.clone().unwrap_or_default();
        PadsAdminPanel::mount(self.client, ConsoleNotifier::new(false), settings)
    }
}

/// Run the CLI. `Ok(false)` means an error was already reported to the user.
pub fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => default_config_dir()?,
    };
    debug!(dir = %config_dir.display(), "using config dir");

    if let Some(Commands::Config { key, value }) = &cli.command {
        return handle_config(&config_dir, key.as_deref(), value.as_deref()).map(|_| true);
    }

    let ctx = init_context(&cli, &config_dir)?;

    let ok = match cli.command {
        None => handle_list(ctx, &PageArgs::default()),
        Some(Commands::List(args)) => handle_list(ctx, &args),
        Some(Commands::Show { id }) => handle_show(ctx, &id),
        Some(Commands::Create { name, content }) => handle_create(ctx, name, content),
        Some(Commands::Edit { id, name, content }) => handle_edit(ctx, &id, name, content)?,
        Some(Commands::Delete { id, yes }) => handle_delete(ctx, &id, yes),
        Some(Commands::Export { page, dir }) => handle_export(ctx, &page, &dir)?,
        Some(Commands::Config { .. }) => true,
    };
    Ok(ok)
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "chaospad=debug"
    } else {
        // Routed failures already reach the user through the notifier.
        "chaospad=error"
    };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn init_context(cli: &Cli, config_dir: &Path) -> Result<AppContext> {
    let mut config = PanelConfig::load(config_dir)?;
    config.apply_env();
    if let Some(url) = &cli.url {
        config.server_url = url.clone();
    }
    let client = HttpApiClient::from_config(&config)?;
    debug!(server = %client.server(), api_base = %config.api_base, "client ready");
    Ok(AppContext { config, client })
}

fn handle_list(ctx: AppContext, args: &PageArgs) -> bool {
    let panel = ctx.mount(args);
    if panel.notifier().has_errors() {
        return false;
    }
    print_table(&panel);
    true
}

fn handle_show(ctx: AppContext, id: &str) -> bool {
    let settings = ctx.config.panel_settings();
    let mut panel = ctx.panel(settings, false);
    match panel.fetch_record(id) {
        Some(pad) => {
            print!("{}", render_full_pad(&pad, Utc::now()));
            true
        }
        None => false,
    }
}

fn handle_create(ctx: AppContext, name: String, content: Option<String>) -> bool {
    let settings = ctx.config.panel_settings();
    let mut panel = ctx.panel(settings, false);
    panel.open_create_dialog();
    let draft = panel.draft_mut();
    draft.name = Some(name);
    draft.content = content;

    finish_save(&mut panel, "Pad created.")
}

fn handle_edit(
    ctx: AppContext,
    id: &str,
    name: Option<String>,
    content: Option<String>,
) -> Result<bool> {
    if name.is_none() && content.is_none() {
        return Err(ChaospadError::Config(
            "Nothing to change: pass --name and/or --content".to_string(),
        ));
    }

    let settings = ctx.config.panel_settings();
    let mut panel = ctx.panel(settings, false);
    if panel.open_edit_dialog_for(id) != Outcome::Completed {
        return Ok(false);
    }
    let draft = panel.draft_mut();
    if name.is_some() {
        draft.name = name;
    }
    if content.is_some() {
        draft.content = content;
    }

    Ok(finish_save(&mut panel, "Pad updated."))
}

fn finish_save<C: ApiClient>(panel: &mut ConsolePanel<C>, message: &str) -> bool {
    match panel.save_draft() {
        Outcome::Completed => {
            print_success(message);
            // The refetch after a save can fail on its own.
            if !panel.notifier().has_errors() {
                print_table(panel);
            }
            !panel.notifier().has_errors()
        }
        _ => false,
    }
}

fn handle_delete(ctx: AppContext, id: &str, yes: bool) -> bool {
    let settings = ctx.config.panel_settings();
    let mut panel = ctx.panel(settings, yes);
    delete_pad(&mut panel, id)
}

fn delete_pad<C: ApiClient>(panel: &mut ConsolePanel<C>, id: &str) -> bool {
    match panel.delete_record(id) {
        Outcome::Completed => {
            print_success("Pad deleted.");
            // The refetch after a delete can fail on its own.
            !panel.notifier().has_errors()
        }
        Outcome::Declined => {
            print_info("Delete cancelled.");
            true
        }
        Outcome::Failed | Outcome::Unchanged => false,
    }
}

fn handle_export(ctx: AppContext, args: &PageArgs, dir: &Path) -> Result<bool> {
    let panel = ctx.mount(args);
    if panel.notifier().has_errors() {
        return Ok(false);
    }
    let export = panel.export_csv()?;
    let path: PathBuf = export.write_to_dir(dir)?;
    print_success(&format!(
        "Exported {} pads to {}",
        export.rows,
        path.display()
    ));
    Ok(true)
}

fn handle_config(config_dir: &Path, key: Option<&str>, value: Option<&str>) -> Result<()> {
    let mut config = PanelConfig::load(config_dir)?;

    match (key, value) {
        (None, _) => {
            for key in KEYS {
                println!("{} = {}", key, config.get(key).unwrap_or_default());
            }
        }
        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", value),
            None => {
                return Err(ChaospadError::Config(format!(
                    "Unknown config key: {key}"
                )))
            }
        },
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save(config_dir)?;
            let shown = config.get(key).unwrap_or_default();
            print_success(&format!("{} = {}", key, shown));
        }
    }
    Ok(())
}

fn print_table<C: ApiClient>(panel: &ConsolePanel<C>) {
    print!(
        "{}",
        render_pad_table(
            panel.items(),
            panel.pagination(),
            panel.list().search_term(),
            Utc::now()
        )
    );
}

fn print_success(message: &str) {
    println!("{}", message.green());
}

fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaospad::client::memory::InMemoryBackend;
    use chaospad::client::Method;
    use chaospad::model::Pad;

    fn console_panel(backend: InMemoryBackend) -> ConsolePanel<InMemoryBackend> {
        PadsAdminPanel::new(backend, ConsoleNotifier::new(true), PanelSettings::default())
    }

    #[test]
    fn delete_succeeds_when_refetch_succeeds() {
        let backend = InMemoryBackend::new().with_pads([Pad::new("abc", "A", "")]);
        let mut panel = console_panel(backend);
        assert!(delete_pad(&mut panel, "abc"));
    }

    #[test]
    fn delete_fails_when_refetch_fails() {
        let mut backend = InMemoryBackend::new().with_pads([Pad::new("abc", "A", "")]);
        backend.fail_next_on(Method::Get, ChaospadError::api(500, "db down"));
        let mut panel = console_panel(backend);

        assert!(!delete_pad(&mut panel, "abc"));
        assert_eq!(panel.client().count(Method::Delete), 1);
        assert!(panel.client().pads().is_empty());
    }

    #[test]
    fn save_fails_when_refetch_fails() {
        let mut backend = InMemoryBackend::new();
        backend.fail_next_on(Method::Get, ChaospadError::api(500, "db down"));
        let mut panel = console_panel(backend);
        panel.open_create_dialog();
        panel.draft_mut().name = Some("New".into());

        assert!(!finish_save(&mut panel, "Pad created."));
        assert_eq!(panel.client().pads().len(), 1);
    }
}
