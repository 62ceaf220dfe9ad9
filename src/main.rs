mod analysis;
mod complexity;
mod config;
mod error;
mod markdown;
mod models;
mod stats;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use complexity::{CommandAnalyzer, ComplexityAnalyzer, NoComplexityAnalyzer};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "分析遠端倉庫最新提交並產生 Markdown 報告的命令列工具")]
struct Args {
    /// 日誌級別 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
    /// 子命令
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 複製倉庫並分析最新提交
    Analyze(AnalyzeArgs),
    /// 初始化專案配置
    Init,
    /// 配置設定
    Config {
        /// 使用全局配置
        #[arg(short, long)]
        global: bool,
    },
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    /// 要分析的倉庫 URL
    repository_url: String,
    /// 輸出檔案路徑（預設：reports/latest.{md|json}）
    #[arg(long)]
    out: Option<String>,
    /// 複雜度門檻（覆寫配置文件）
    #[arg(long)]
    threshold: Option<u32>,
    /// 不在報告中加入徽章
    #[arg(long)]
    no_badge: bool,
    /// 輸出 JSON 而非 Markdown
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // 設置日誌級別
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let current_dir = std::env::current_dir().context("無法取得目前目錄")?;
    match args.command {
        Commands::Analyze(analyze) => handle_analyze(&analyze, &current_dir),
        Commands::Init => config::init_project(&current_dir),
        Commands::Config { global } => config::configure_interactive(&current_dir, global),
    }
}

fn handle_analyze(args: &AnalyzeArgs, current_dir: &Path) -> Result<()> {
    let config = config::get_effective_config(current_dir)?;
    let output_path = resolve_output_path(args, config.output.as_deref());
    let options = ReportOptions {
        threshold: args.threshold.unwrap_or(config.complexity_threshold),
        badge: config.badge && !args.no_badge,
        as_json: args.json || output_path.extension().is_some_and(|ext| ext == "json"),
        output_path,
    };

    info!("開始分析倉庫：{}", args.repository_url);
    info!("輸出檔案：{}", options.output_path.display());

    let clone = analysis::TempClone::new(analysis::clone_repository(&args.repository_url)?);
    run_pipeline(clone.path(), &args.repository_url, &config, &options)?;
    Ok(())
}

/// 報告輸出選項（命令行參數與配置合併後的結果）
struct ReportOptions {
    threshold: u32,
    badge: bool,
    as_json: bool,
    output_path: PathBuf,
}

/// 分析已複製到本地的倉庫並寫出報告
fn run_pipeline(
    repo_path: &Path,
    repo_url: &str,
    config: &config::Config,
    options: &ReportOptions,
) -> Result<models::ReportData> {
    let repo_info = analysis::analyze_latest_commit(repo_path)?;
    if !repo_info.line_totals.is_available() {
        warn!("提交行數統計不可用（淺層複製），總行數以 0 顯示");
    }
    info!(
        added = repo_info.total_lines_added(),
        deleted = repo_info.total_lines_deleted(),
        "提交行數統計"
    );

    let analyzer: Box<dyn ComplexityAnalyzer> = match &config.complexity_command {
        Some(command) => Box::new(CommandAnalyzer::new(command.as_str())),
        None => Box::new(NoComplexityAnalyzer),
    };
    let sources = complexity::collect_source_files(repo_path, &config.source_extensions);
    let complexity_report = analyzer
        .analyze(repo_path, &sources, options.threshold)
        .context("複雜度分析失敗")?;

    let overall = stats::aggregate(&repo_info, complexity_report);
    info!(
        files = repo_info.changed_files.len(),
        file_types = overall.file_stats.len(),
        functions_over_threshold = overall.functions_over_threshold,
        "統計完成"
    );

    let badge_url = options.badge.then(|| {
        markdown::generate_badge_url(
            overall.total_lines_added() + overall.total_lines_deleted(),
            overall.average_complexity,
        )
    });

    let report = models::ReportData {
        repo_url: repo_url.to_string(),
        report_date: utils::report_timestamp(),
        badge_url,
        commit: repo_info.latest_commit,
        stats: overall,
        complexity_threshold: options.threshold,
    };

    if options.as_json {
        markdown::generate_json_report(&report, &options.output_path)?;
    } else {
        markdown::generate_markdown_report(&report, &options.output_path)?;
    }
    info!("分析完成！報告已寫入 {}", options.output_path.display());

    Ok(report)
}

/// 命令行參數優先於配置文件
fn resolve_output_path(args: &AnalyzeArgs, configured: Option<&str>) -> PathBuf {
    let default = if args.json {
        config::DEFAULT_JSON_OUTPUT
    } else {
        config::DEFAULT_MARKDOWN_OUTPUT
    };
    PathBuf::from(args.out.as_deref().or(configured).unwrap_or(default))
}
