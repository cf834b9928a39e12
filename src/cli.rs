use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chargesense")]
#[command(about = "週次予約シートの集計・マーケティングROAS推定ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// マーケティング履歴ファイル（設定・環境変数より優先）
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 週次ワークブック（csv/xls/xlsx）を取り込んで集計結果をJSONで出力
    Upload {
        /// アップロードするファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 履歴に書き込まずに集計だけ行う
        #[arg(long)]
        dry_run: bool,
    },

    /// マーケティング履歴を表示
    History {
        /// 表示する件数（新しい順）
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// 設定を表示/編集
    Config {
        /// 履歴ファイルの保存先を設定
        #[arg(long)]
        set_store: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
