use crate::error::AnalyzeError;
use crate::models::{ChangedFileStats, CommitInfo, LineTotals, RepositoryInfo};
use git2::build::RepoBuilder;
use git2::{Commit, Delta, Diff, FetchOptions, Repository, Tree};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const CLONE_DIR_PREFIX: &str = "zenwatch-clone-";
// libgit2 的 GIT_ENOTSUPPORTED；本地傳輸不支援淺層抓取時回傳
const GIT_ENOTSUPPORTED: i32 = -39;

/// 將遠端倉庫淺層複製（depth 1）到新的臨時目錄
pub fn clone_repository(url: &str) -> Result<PathBuf, AnalyzeError> {
    clone_repository_in(url, &std::env::temp_dir())
}

/// 同 [`clone_repository`]，但臨時目錄建立在 `parent` 之下
///
/// 傳輸層不支援淺層抓取（例如本地路徑）時，改為完整複製。
#[instrument(skip(parent))]
pub fn clone_repository_in(url: &str, parent: &Path) -> Result<PathBuf, AnalyzeError> {
    let path = match clone_into(url, parent, Some(1)) {
        Err(CloneAttempt::Git(e)) if e.raw_code() == GIT_ENOTSUPPORTED => {
            warn!("傳輸層不支援淺層複製，改為完整複製：{}", e.message());
            clone_into(url, parent, None)
        }
        other => other,
    }
    .map_err(|e| AnalyzeError::Clone {
        url: url.to_string(),
        source: e.into_boxed(),
    })?;

    info!(path = %path.display(), "倉庫複製完成");
    Ok(path)
}

enum CloneAttempt {
    Io(io::Error),
    Git(git2::Error),
}

impl CloneAttempt {
    fn into_boxed(self) -> Box<dyn std::error::Error + Send + Sync> {
        match self {
            CloneAttempt::Io(e) => Box::new(e),
            CloneAttempt::Git(e) => Box::new(e),
        }
    }
}

fn clone_into(url: &str, parent: &Path, depth: Option<i32>) -> Result<PathBuf, CloneAttempt> {
    // TempDir 在 drop 時自動刪除，複製失敗不會留下目錄
    let temp_dir = tempfile::Builder::new()
        .prefix(CLONE_DIR_PREFIX)
        .tempdir_in(parent)
        .map_err(CloneAttempt::Io)?;

    let mut fetch_options = FetchOptions::new();
    if let Some(depth) = depth {
        fetch_options.depth(depth);
    }

    RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(url, temp_dir.path())
        .map_err(CloneAttempt::Git)?;

    Ok(temp_dir.keep())
}

/// 移除臨時複製目錄；路徑不存在時視為成功
pub fn cleanup(path: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "已清理臨時目錄");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// 持有臨時複製目錄，離開作用域時自動清理
#[derive(Debug)]
pub struct TempClone {
    path: PathBuf,
}

impl TempClone {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempClone {
    fn drop(&mut self) {
        if let Err(e) = cleanup(&self.path) {
            warn!(path = %self.path.display(), "無法清理臨時目錄：{}", e);
        }
    }
}

/// 分析本地倉庫 HEAD 所指向的提交
///
/// 每個檔案的新增/刪除行數固定為 0；只計算整個提交的總行數，
/// 淺層複製缺少父提交時為 [`LineTotals::Unavailable`]。
#[instrument]
pub fn analyze_latest_commit(repo_path: &Path) -> Result<RepositoryInfo, AnalyzeError> {
    let repo = Repository::open(repo_path).map_err(|source| AnalyzeError::RepositoryOpen {
        path: repo_path.to_path_buf(),
        source,
    })?;

    let head = repo.head().map_err(AnalyzeError::HeadResolution)?;
    let head_id = head
        .target()
        .ok_or_else(|| AnalyzeError::HeadResolution(git2::Error::from_str("HEAD has no target")))?;
    let commit = repo.find_commit(head_id).map_err(AnalyzeError::CommitLoad)?;

    let latest_commit = commit_info(&commit);
    info!(hash = %latest_commit.hash, author = %latest_commit.author, "讀取最新提交");

    let current_tree = commit.tree().map_err(|source| AnalyzeError::TreeLoad {
        what: "commit",
        source,
    })?;

    let base = diff_base(&commit)?;
    let diff = repo
        .diff_tree_to_tree(base.tree(), Some(&current_tree), None)
        .map_err(|source| AnalyzeError::PatchConstruction {
            commit: latest_commit.hash.clone(),
            source,
        })?;

    let line_totals = line_totals(&base, &diff);
    let changed_files = changed_files(&diff);
    info!(
        files = changed_files.len(),
        added = line_totals.added(),
        deleted = line_totals.deleted(),
        "提交分析完成"
    );

    Ok(RepositoryInfo {
        latest_commit,
        changed_files,
        line_totals,
    })
}

fn commit_info(commit: &Commit) -> CommitInfo {
    let message = String::from_utf8_lossy(commit.message_bytes());
    let first_line = message
        .split('\n')
        .next()
        .unwrap_or_default()
        .trim_end_matches('\r');
    let author = commit.author();

    CommitInfo {
        hash: commit.id().to_string(),
        message: first_line.to_string(),
        author: String::from_utf8_lossy(author.name_bytes()).into_owned(),
        email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
        date: crate::utils::format_git_time(&author.when()),
    }
}

/// 比較基準
enum DiffBase<'r> {
    /// 根提交，與空樹比較
    Root,
    /// 父提交的樹
    Parent(Tree<'r>),
    /// 有父提交但無法載入（淺層複製），與空樹比較
    MissingParent,
}

impl<'r> DiffBase<'r> {
    fn tree(&self) -> Option<&Tree<'r>> {
        match self {
            DiffBase::Parent(tree) => Some(tree),
            DiffBase::Root | DiffBase::MissingParent => None,
        }
    }
}

fn diff_base<'r>(commit: &Commit<'r>) -> Result<DiffBase<'r>, AnalyzeError> {
    if commit.parent_count() == 0 {
        debug!("根提交，與空樹比較");
        return Ok(DiffBase::Root);
    }

    match commit.parent(0) {
        Ok(parent) => parent
            .tree()
            .map(DiffBase::Parent)
            .map_err(|source| AnalyzeError::TreeLoad {
                what: "parent commit",
                source,
            }),
        Err(e) => {
            debug!("無法載入父提交（淺層複製？），改與空樹比較：{}", e);
            Ok(DiffBase::MissingParent)
        }
    }
}

/// 整個提交的新增/刪除行數；缺少父提交或統計失敗時為 `Unavailable`
fn line_totals(base: &DiffBase, diff: &Diff) -> LineTotals {
    if let DiffBase::MissingParent = base {
        warn!("缺少父提交，無法取得提交統計，行數預設為 0");
        return LineTotals::Unavailable;
    }

    match diff.stats() {
        Ok(stats) => LineTotals::Computed {
            added: stats.insertions(),
            deleted: stats.deletions(),
        },
        Err(e) => {
            warn!("無法取得提交統計，行數預設為 0：{}", e);
            LineTotals::Unavailable
        }
    }
}

fn changed_files(diff: &Diff) -> Vec<ChangedFileStats> {
    diff.deltas()
        .filter_map(|delta| {
            let path = match delta.status() {
                Delta::Deleted => delta.old_file().path(),
                _ => delta.new_file().path().or_else(|| delta.old_file().path()),
            };
            let path = path?.to_string_lossy().into_owned();
            if path.is_empty() {
                return None;
            }
            Some(ChangedFileStats {
                file_type: file_extension(&path),
                path,
                lines_added: 0,
                lines_deleted: 0,
            })
        })
        .collect()
}

/// 取檔名最後一個 `.` 起的後綴並轉小寫：`.gitignore` 即為其副檔名，`README` 則為空字串
pub fn file_extension(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rfind('.')
        .map(|idx| name[idx..].to_lowercase())
        .unwrap_or_default()
}
