//! `paraphraser` コマンド。
//!
//! ```bash
//! paraphraser rewrite "We need to finish this today." --style formal
//! paraphraser batch --file inputs.txt --style simple
//! paraphraser health
//! RUST_LOG=debug paraphraser --seed 42 rewrite "It was good." --style casual
//! ```

mod commands;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use pp_core::{ParaphraseService, ParaphraserSettings, Style};

use crate::commands::{CmdResult, CommandError};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 設定ファイル (TOML)。省略時は <config_dir>/paraphraser/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 乱数シード（設定ファイルと PARAPHRASER_SEED より優先）
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 1 件を言い換えて JSON で出力する
    Rewrite {
        text: String,
        #[arg(long, default_value = "formal")]
        style: Style,
        /// 代替表現の件数 (最大 3)
        #[arg(long)]
        count: Option<usize>,
        /// 言語タグ (例: en)
        #[arg(long)]
        lang: Option<String>,
    },
    /// ファイルまたは標準入力の各行を言い換えて JSON 配列で出力する
    Batch {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, default_value = "formal")]
        style: Style,
    },
    /// 各ストラテジーの利用可否
    Health,
    /// スタイル一覧
    Styles,
}

fn init_logging() {
    // core の log レコードも tracing-log 経由でここに流れる
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> CmdResult<ParaphraserSettings> {
    let mut settings = match &cli.config {
        Some(path) => ParaphraserSettings::load(path)?,
        None => ParaphraserSettings::load_default()?,
    };
    if cli.seed.is_some() {
        settings.cascade.seed = cli.seed;
    }
    Ok(settings)
}

fn print_json<T: Serialize>(value: &T) -> CmdResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    if let Command::Styles = cli.command {
        return print_json(&commands::styles());
    }

    let settings = load_settings(&cli)?;
    let service = ParaphraseService::from_settings(settings);

    match cli.command {
        Command::Rewrite {
            text,
            style,
            count,
            lang,
        } => print_json(&commands::rewrite(&service, text, style, count, lang).await?),
        Command::Batch { file, style } => {
            let texts = commands::read_lines(file.as_deref())?;
            print_json(&commands::batch(&service, texts, style).await?)
        }
        Command::Health => print_json(&commands::health(&service).await),
        Command::Styles => print_json(&commands::styles()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
