use crate::error::ComplexityError;
use crate::models::ComplexityStat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// 一次複雜度分析的結果
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ComplexityReport {
    pub functions_over_threshold: usize,
    pub average_complexity: f64,
    pub findings: Vec<ComplexityStat>,
}

impl ComplexityReport {
    pub fn from_findings(findings: Vec<ComplexityStat>) -> Self {
        let functions_over_threshold = findings.len();
        let average_complexity = if functions_over_threshold == 0 {
            0.0
        } else {
            let total: u64 = findings.iter().map(|f| u64::from(f.complexity)).sum();
            total as f64 / functions_over_threshold as f64
        };
        Self {
            functions_over_threshold,
            average_complexity,
            findings,
        }
    }
}

/// 循環複雜度分析器
///
/// 依偵測順序回傳複雜度大於 `threshold` 的函數。
pub trait ComplexityAnalyzer {
    fn analyze(
        &self,
        root: &Path,
        sources: &[PathBuf],
        threshold: u32,
    ) -> Result<ComplexityReport, ComplexityError>;
}

/// 未設定分析器時使用
pub struct NoComplexityAnalyzer;

impl ComplexityAnalyzer for NoComplexityAnalyzer {
    fn analyze(
        &self,
        _root: &Path,
        _sources: &[PathBuf],
        _threshold: u32,
    ) -> Result<ComplexityReport, ComplexityError> {
        debug!("未設定複雜度分析器，略過");
        Ok(ComplexityReport::default())
    }
}

/// 執行輸出 gocyclo 格式的外部工具：
/// `<complexity> <package> <function> <file>:<line>[:<column>]`
///
/// 參數中的 `{threshold}` 會被替換為門檻值，`{sources}` 參數展開為原始碼路徑。
pub struct CommandAnalyzer {
    command: String,
}

impl CommandAnalyzer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn build_args(&self, sources: &[PathBuf], threshold: u32) -> Vec<String> {
        let threshold = threshold.to_string();
        let mut args = Vec::new();
        for arg in self.command.split_whitespace() {
            if arg == "{sources}" {
                args.extend(sources.iter().map(|p| p.to_string_lossy().into_owned()));
            } else {
                args.push(arg.replace("{threshold}", &threshold));
            }
        }
        args
    }
}

impl ComplexityAnalyzer for CommandAnalyzer {
    fn analyze(
        &self,
        root: &Path,
        sources: &[PathBuf],
        threshold: u32,
    ) -> Result<ComplexityReport, ComplexityError> {
        let args = self.build_args(sources, threshold);
        let (program, rest) = args.split_first().ok_or(ComplexityError::EmptyCommand)?;

        info!(program = %program, "執行複雜度分析");
        let output = Command::new(program)
            .args(rest)
            .current_dir(root)
            .output()
            .map_err(|source| ComplexityError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        // gocyclo 有輸出時會以 1 結束，只有失敗且無輸出才視為錯誤
        if !output.status.success() && stdout.trim().is_empty() {
            return Err(ComplexityError::CommandFailed {
                program: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let findings = parse_findings(&stdout, threshold)?;
        Ok(ComplexityReport::from_findings(findings))
    }
}

/// 解析 gocyclo 格式輸出，只保留高於 `threshold` 的結果
pub fn parse_findings(output: &str, threshold: u32) -> Result<Vec<ComplexityStat>, ComplexityError> {
    let mut findings = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("Average:") {
            continue;
        }
        let stat = parse_line(line).ok_or_else(|| ComplexityError::Parse(line.to_string()))?;
        if stat.complexity > threshold {
            findings.push(stat);
        }
    }
    Ok(findings)
}

fn parse_line(line: &str) -> Option<ComplexityStat> {
    let mut fields = line.split_whitespace();
    let complexity = fields.next()?.parse().ok()?;
    let package = fields.next()?.to_string();
    let function_name = fields.next()?.to_string();
    // 檔名可能含空白，剩餘部分皆為位置
    let position = fields.collect::<Vec<_>>().join(" ");

    let (file, line) = split_position(&position)?;
    Some(ComplexityStat {
        complexity,
        package,
        function_name,
        file,
        line,
    })
}

/// 解析 `file:line` 或 `file:line:column`
fn split_position(position: &str) -> Option<(String, u32)> {
    let (head, last) = position.rsplit_once(':')?;
    let (file, line) = match head.rsplit_once(':') {
        Some((file, line)) if line.parse::<u32>().is_ok() && last.parse::<u32>().is_ok() => {
            (file, line.parse().ok()?)
        }
        _ => (head, last.parse().ok()?),
    };
    if file.is_empty() {
        return None;
    }
    Some((file.to_string(), line))
}

/// 遞迴收集指定副檔名的原始碼檔案（相對於 root），跳過 .git
pub fn collect_source_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("無法讀取目錄項目：{}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let extension = crate::analysis::file_extension(&relative.to_string_lossy());
        if extensions.is_empty() || extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
            files.push(relative.to_path_buf());
        }
    }
    debug!(count = files.len(), "收集原始碼檔案");
    files
}
