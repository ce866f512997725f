mod analyze;
mod config_cmd;
mod history;
mod session;
mod settings;
mod sync_cmd;
mod template;

pub use analyze::AnalyzeCommand;
pub use config_cmd::ConfigCommand;
pub use history::HistoryCommand;
pub use session::SessionCommand;
pub use settings::SettingsCommand;
pub use sync_cmd::SyncCommand;
pub use template::TemplateCommand;
