// huddle entry point.
// Loads configuration, sets up logging and the cache store, then runs the TUI.
// `huddle verify <code>` checks a pass code and exits instead.

use std::sync::Arc;

use huddle::app::App;
use huddle::backend::BackendClient;
use huddle::cache::{FileStore, KeyValueStore, MemoryStore, paths};
use huddle::config::Config;
use huddle::logging;

fn main() -> huddle::Result<()> {
    let mut config = Config::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    let log_path = config.cache_dir.as_deref().map(paths::log_path);
    logging::init(log_path.as_deref())?;

    match args.as_slice() {
        [command, code] if command == "verify" => return verify(&config, code),
        [conversation, ..] => config.conversation_id = Some(conversation.clone()),
        [] => {}
    }

    let store: Arc<dyn KeyValueStore> = match &config.cache_dir {
        Some(dir) => Arc::new(FileStore::new(paths::store_dir(dir))),
        None => {
            tracing::warn!("no cache directory available, caching in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let client = Arc::new(BackendClient::from_config(&config)?);
    let mut app = App::new(&config, client, store, runtime.handle().clone());

    tracing::info!(conversation = ?config.conversation_id, "starting");
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result?;

    tracing::info!("exiting");
    Ok(())
}

fn verify(config: &Config, code: &str) -> huddle::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let client = BackendClient::from_config(config)?;
    let verification = runtime.block_on(client.verify_pass(code))?;

    tracing::info!(valid = verification.is_valid(), "pass verified");
    println!("{}", verification.summary());
    Ok(())
}
