//! mwd 命令行：下载单个文件，中断后可从 `.mwd` 工作文件继续。

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use percent_encoding::percent_decode_str;
use tracing_subscriber::EnvFilter;
use url::Url;

use mwd::session::{
    DownloadSession, SessionEvent, SessionObserver, has_work_suffix, parse_block_size,
    read_work_file_metadata,
};

const PB_STYLE: &str =
    "[{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 从 URL 开始新的下载（已有同名 .mwd 时自动续传）
    Url {
        url: String,

        /// 保存的文件名，默认取 URL 路径的最后一段
        #[arg(short, long)]
        filename: Option<PathBuf>,

        /// 分块大小，如 `512k`、`4M`、`1G`
        #[arg(short, long, value_parser = parse_size_arg)]
        block_size: Option<u64>,

        /// 目标文件已存在时先删除
        #[arg(long, default_value_t = false)]
        replace: bool,

        #[arg(long, default_value_t = false)]
        no_progress: bool,
    },
    /// 从已有的 .mwd 工作文件继续下载，URL 取自文件中记录的元数据
    File {
        path: PathBuf,

        #[arg(short, long, value_parser = parse_size_arg)]
        block_size: Option<u64>,

        #[arg(long, default_value_t = false)]
        no_progress: bool,
    },
}

fn parse_size_arg(value: &str) -> Result<u64, String> {
    parse_block_size(value).map_err(|e| e.to_string())
}

/// 把会话事件渲染到终端进度条。
struct ProgressBarObserver {
    pb: ProgressBar,
}

impl ProgressBarObserver {
    fn new(hidden: bool) -> Self {
        let pb = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        if let Ok(style) = ProgressStyle::with_template(PB_STYLE) {
            pb.set_style(style.progress_chars("█▓░"));
        }
        Self { pb }
    }
}

impl SessionObserver for ProgressBarObserver {
    fn on_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::CorruptedMetadata { reason } => {
                self.pb.println(format!("工作文件元数据不可用（{}），从头下载", reason));
            }
            SessionEvent::DownloadBegin {
                file_size,
                last_byte,
            } => {
                self.pb.set_length(*file_size);
                self.pb.set_position(*last_byte);
            }
            SessionEvent::Progress(progress) => self.pb.set_position(progress.bytes_done),
            SessionEvent::Done => self.pb.finish(),
            SessionEvent::Error { .. } => self.pb.abandon(),
            _ => {}
        }
    }
}

/// URL 路径的最后一段（百分号解码后）作为文件名
fn file_name_from_url(url: &str) -> anyhow::Result<PathBuf> {
    let parsed = Url::parse(url).with_context(|| format!("无效的 URL: {}", url))?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .filter(|name| !matches!(name.as_str(), "" | "." | "..") && !name.contains(['/', '\\']));
    match name {
        Some(name) => Ok(PathBuf::from(name)),
        None => bail!("无法从 URL 推断文件名，请使用 --filename 指定"),
    }
}

async fn run_session(
    url: String,
    destination: &Path,
    block_size: Option<u64>,
    no_progress: bool,
) -> anyhow::Result<()> {
    let mut session = DownloadSession::new(url, destination)
        .with_observer(ProgressBarObserver::new(no_progress));
    if let Some(block_size) = block_size {
        session = session.block_size(block_size);
    }

    let outcome = session.start().await?;
    println!(
        "{}（{} 字节）",
        outcome.final_path.display(),
        outcome.file_size
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Url {
            url,
            filename,
            block_size,
            replace,
            no_progress,
        } => {
            let destination = match filename {
                Some(filename) => filename,
                None => file_name_from_url(&url)?,
            };
            if tokio::fs::try_exists(&destination).await? {
                if !replace {
                    bail!(
                        "{} 已存在，使用 --replace 覆盖",
                        destination.display()
                    );
                }
                tokio::fs::remove_file(&destination)
                    .await
                    .with_context(|| format!("无法删除 {}", destination.display()))?;
            }
            run_session(url, &destination, block_size, no_progress).await
        }
        Command::File {
            path,
            block_size,
            no_progress,
        } => {
            if !has_work_suffix(&path) {
                bail!("{} 不是 .mwd 工作文件", path.display());
            }
            let metadata = read_work_file_metadata(&path)
                .await
                .with_context(|| format!("无法读取 {} 中的下载记录", path.display()))?;
            run_session(metadata.source_url, &path, block_size, no_progress).await
        }
    }
}
