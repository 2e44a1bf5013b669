use anyhow::Result;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod cmd_delete;
mod cmd_init;
mod cmd_list;
mod cmd_load;
mod cmd_rm;
mod cmd_save;
mod cmd_status;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug ./quiversnip ...
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        // Логируем ошибку и выходим с кодом 1.
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Init { path } => cmd_init::exec(path),

        cli::Cmd::Load { path, folder } => cmd_load::exec(path, folder),

        cli::Cmd::Save { path, folder } => cmd_save::exec(path, folder),

        cli::Cmd::Delete { path } => cmd_delete::exec(path),

        cli::Cmd::List { path, body, json } => cmd_list::exec(path, body, json),

        cli::Cmd::Rm { path, slot } => cmd_rm::exec(path, slot),

        cli::Cmd::Status { path, json } => cmd_status::exec(path, json),
    }
}
