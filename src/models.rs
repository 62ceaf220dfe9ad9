use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]

pub struct CommitInfo {
    pub hash: String,

    /// 只保留提交訊息的第一行
    pub message: String,

    pub author: String,

    pub email: String,

    pub date: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]

pub struct ChangedFileStats {
    pub path: String,

    /// 小寫副檔名（含前導點），沒有副檔名時為空字串
    pub file_type: String,

    pub lines_added: usize,

    pub lines_deleted: usize,
}

/// 提交的總新增/刪除行數
///
/// 淺層複製通常缺少父提交而無法計算；`Unavailable` 讀取時為 0，
/// 但可與真正沒有變更的提交區分。
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineTotals {
    Computed {
        added: usize,
        deleted: usize,
    },
    #[default]
    Unavailable,
}

impl LineTotals {
    pub fn added(&self) -> usize {
        match self {
            LineTotals::Computed { added, .. } => *added,
            LineTotals::Unavailable => 0,
        }
    }

    pub fn deleted(&self) -> usize {
        match self {
            LineTotals::Computed { deleted, .. } => *deleted,
            LineTotals::Unavailable => 0,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, LineTotals::Computed { .. })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]

pub struct RepositoryInfo {
    pub latest_commit: CommitInfo,

    /// 依差異順序
    pub changed_files: Vec<ChangedFileStats>,

    pub line_totals: LineTotals,
}

impl RepositoryInfo {
    pub fn total_lines_added(&self) -> usize {
        self.line_totals.added()
    }

    pub fn total_lines_deleted(&self) -> usize {
        self.line_totals.deleted()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]

pub struct FileTypeStat {
    pub extension: String,

    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]

pub struct ComplexityStat {
    pub complexity: u32,

    pub package: String,

    pub function_name: String,

    pub file: String,

    pub line: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]

pub struct OverallStats {
    pub line_totals: LineTotals,

    /// 以副檔名為鍵，依排序迭代
    pub file_stats: BTreeMap<String, FileTypeStat>,

    /// 依偵測順序
    pub complexity_stats: Vec<ComplexityStat>,

    pub functions_over_threshold: usize,

    /// 超過門檻函數的平均複雜度，沒有時為 0.0
    pub average_complexity: f64,
}

impl OverallStats {
    pub fn total_lines_added(&self) -> usize {
        self.line_totals.added()
    }

    pub fn total_lines_deleted(&self) -> usize {
        self.line_totals.deleted()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]

pub struct ReportData {
    pub repo_url: String,

    pub report_date: String,

    #[serde(default)]
    pub badge_url: Option<String>,

    pub commit: CommitInfo,

    pub stats: OverallStats,

    pub complexity_threshold: u32,
}
