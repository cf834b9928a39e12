use anyhow::Context;
use chargesense::cli::{Cli, Commands};
use chargesense::config::Config;
use chargesense::error::ChargeSenseError;
use chargesense::pipeline;
use chargesense::store::{MarketingStore, MemoryMarketingStore, XlsxMarketingStore};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {:#}", err);
            // 入力起因の拒否とそれ以外の失敗で終了コードを分ける
            let rejected = err
                .downcast_ref::<ChargeSenseError>()
                .is_some_and(ChargeSenseError::is_rejection);
            ExitCode::from(if rejected { 2 } else { 1 })
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| config.resolve_store_path());

    match cli.command {
        Commands::Upload { file, output, dry_run } => {
            eprintln!("📊 chargesense - 週次アップロード\n");

            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("ファイルを読み込めません: {}", file.display()))?;
            eprintln!("[1/2] {} を解析中... ({} bytes)", filename, bytes.len());

            let store: Arc<dyn MarketingStore> = if dry_run {
                Arc::new(MemoryMarketingStore::default())
            } else {
                Arc::new(XlsxMarketingStore::new(store_path.clone()))
            };

            let response = tokio::task::spawn_blocking(move || {
                pipeline::process_upload(&filename, &bytes, store.as_ref())
            })
            .await
            .context("集計タスクが異常終了しました")??;

            eprintln!(
                "✔ 顧客 {}件 / 曜日 {}件 / マーケティング {}",
                response.customer_segments.len(),
                response.weekly_charges.len(),
                if response.marketing_analytics.is_some() { "あり" } else { "なし" }
            );

            eprintln!("[2/2] 結果を出力中...");
            let json = if config.pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    eprintln!("✔ 結果を保存: {}", path.display());
                }
                None => println!("{}", json),
            }

            if response.marketing_analytics.is_some() && !dry_run {
                eprintln!("✔ マーケティング履歴を更新: {}", store_path.display());
            }
            eprintln!("\n✅ {}", response.message);
        }

        Commands::History { limit } => {
            let store = XlsxMarketingStore::new(store_path);
            let rows = store.load()?;

            println!("マーケティング履歴: {} ({}件)", store.path().display(), rows.len());
            for row in rows.iter().rev().take(limit) {
                print!(
                    "  {}  revenue={:.1} search={:.1} social={:.1} email={:.1}",
                    row.uploaded_at,
                    row.revenue,
                    row.search_spend,
                    row.social_spend,
                    row.email_spend,
                );
                println!(
                    "  roas=({:.3}, {:.3}, {:.3})",
                    row.roas_search,
                    row.roas_social,
                    row.roas_email,
                );
            }
        }

        Commands::Config { set_store, show } => {
            if let Some(path) = set_store {
                config.set_store_path(path)?;
                println!("✔ 履歴ファイルの保存先を設定しました");
            }

            if show {
                println!("設定:");
                println!("  履歴ファイル: {}", config.resolve_store_path().display());
                println!("  JSON整形: {}", if config.pretty { "有効" } else { "無効" });
            }
        }
    }

    Ok(())
}
