use clap::Parser;
use epub_toc::{ChapterTreeBuilder, Epub, Result, TocConfig, TocStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, debug, info};

/// 📚 epub-toc - EPUB目录提取工具
#[derive(Parser)]
#[command(name = "epub-toc")]
#[command(about = "从EPUB文件的导航信息中提取层级目录")]
#[command(version)]
struct Args {
    /// EPUB文件路径
    #[arg(help = "要处理的EPUB文件路径")]
    epub_file: PathBuf,

    /// 输出样式
    #[arg(short, long, value_enum, help = "目录的输出样式（默认使用配置文件中的样式）")]
    format: Option<OutputFormat>,

    /// 显示文件路径
    #[arg(short, long, help = "在章节标题后显示对应的文件路径")]
    paths: bool,

    /// 最大显示深度
    #[arg(short = 'd', long, help = "只显示深度小于该值的章节")]
    max_depth: Option<u32>,

    /// 空标题的占位文本
    #[arg(long, help = "没有标题的章节使用的占位文本")]
    placeholder: Option<String>,

    /// 允许空目录
    #[arg(long, help = "没有任何章节时输出空目录而不是报错")]
    allow_empty: bool,

    /// 不输出书名
    #[arg(long, help = "不输出书名标题")]
    no_title: bool,

    /// 配置文件
    #[arg(short, long, help = "YAML配置文件路径")]
    config: Option<PathBuf>,

    /// 保存为Markdown文件
    #[arg(short, long, help = "将Markdown目录保存到EPUB同目录下的\"<文件名> - ToC.md\"")]
    save: bool,

    /// 日志级别
    #[arg(short, long, value_enum, default_value = "warn", help = "日志级别（输出到stderr）")]
    log_level: LogLevel,
}

/// 目录输出样式
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// 缩进列表
    Indented,
    /// 树状符号
    Tree,
    /// Markdown标题
    Markdown,
    /// JSON
    Json,
}

impl From<OutputFormat> for TocStyle {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Indented => TocStyle::Indented,
            OutputFormat::Tree => TocStyle::Tree,
            OutputFormat::Markdown => TocStyle::Markdown,
            OutputFormat::Json => TocStyle::Json,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(args.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// 加载配置并应用命令行参数
fn load_config(args: &Args) -> Result<TocConfig> {
    let mut config = match &args.config {
        Some(path) => TocConfig::from_file(path)?,
        None => TocConfig::default(),
    };

    if let Some(format) = args.format {
        config.style = format.into();
    }
    if args.paths {
        config.show_paths = true;
    }
    if args.max_depth.is_some() {
        config.max_depth = args.max_depth;
    }
    if let Some(placeholder) = &args.placeholder {
        config.placeholder_title = placeholder.clone();
    }
    if args.allow_empty {
        config.allow_empty = true;
    }
    if args.no_title {
        config.include_title = false;
    }
    if args.save {
        config.style = TocStyle::Markdown;
    }

    debug!(?config, "生效的配置");
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;

    let mut epub = Epub::new(&args.epub_file)?;
    let navigation = epub.navigation()?;
    info!(
        source = %navigation.source,
        entries = navigation.root.descendant_count(),
        "已读取目录导航"
    );

    let title = navigation
        .doc_title
        .unwrap_or_else(|| config.placeholder_title.clone());

    let tree = ChapterTreeBuilder::from_config(&config)
        .build(&navigation.root)?
        .with_title(Some(title))
        .with_config(&config);
    debug!("{}", tree.get_statistics());

    // 先完整渲染，失败时不产生任何输出
    let output = tree.render()?;

    if args.save {
        let output_path = markdown_output_path(&args.epub_file);
        fs::write(&output_path, &output)?;
        println!("TOC saved to: {}", output_path.display());
    } else {
        print!("{}", output);
    }

    Ok(())
}

/// EPUB同目录下的"<文件名> - ToC.md"
fn markdown_output_path(epub_path: &Path) -> PathBuf {
    let stem = epub_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    epub_path.with_file_name(format!("{} - ToC.md", stem))
}
