use crate::error::RenderError;
use crate::models::{CommitInfo, FileTypeStat, OverallStats, ReportData};
use askama::Template;
use std::path::Path;
use tracing::info;

const BADGE_LABEL: &str = "ZenWatch";
const BADGE_COLOR: &str = "blue";

/// Markdown 報告範本（templates/report.md）
#[derive(Template)]
#[template(path = "report.md", escape = "none")]
struct ReportTemplate<'a> {
    repo_url: &'a str,
    report_date: &'a str,
    /// 空字串表示不顯示徽章
    badge_url: &'a str,
    commit: &'a CommitInfo,
    stats: &'a OverallStats,
    /// 依副檔名排序
    file_types: Vec<&'a FileTypeStat>,
    complexity_threshold: u32,
}

impl<'a> From<&'a ReportData> for ReportTemplate<'a> {
    fn from(data: &'a ReportData) -> Self {
        Self {
            repo_url: &data.repo_url,
            report_date: &data.report_date,
            badge_url: data.badge_url.as_deref().unwrap_or_default(),
            commit: &data.commit,
            stats: &data.stats,
            file_types: data.stats.file_stats.values().collect(),
            complexity_threshold: data.complexity_threshold,
        }
    }
}

/// 將報告資料填入範本，回傳 Markdown 內容
pub fn render_report(data: &ReportData) -> Result<String, RenderError> {
    Ok(ReportTemplate::from(data).render()?)
}

/// 生成 Markdown 報告並寫入指定路徑（自動建立上層目錄）
pub fn generate_markdown_report(data: &ReportData, output_path: &Path) -> Result<(), RenderError> {
    let content = render_report(data)?;
    crate::utils::write_atomically(output_path, content.as_bytes())?;
    info!("Markdown 報告已生成並寫入 {}", output_path.display());
    Ok(())
}

/// 以 JSON 格式輸出完整的報告資料
pub fn generate_json_report(data: &ReportData, output_path: &Path) -> Result<(), RenderError> {
    let content = serde_json::to_string_pretty(data)?;
    crate::utils::write_atomically(output_path, content.as_bytes())?;
    info!("JSON 報告已生成並寫入 {}", output_path.display());
    Ok(())
}

/// 產生 shields.io 徽章網址，顯示總變更行數與平均複雜度
///
/// 只跳脫空白與 `|`；輸入皆為數字。
pub fn generate_badge_url(total_changed_lines: usize, average_complexity: f64) -> String {
    let message = format!(
        "changes {} | avg complx {:.1}",
        total_changed_lines, average_complexity
    );
    let message = message.replace(' ', "%20").replace('|', "%7C");
    format!(
        "https://img.shields.io/badge/{}-{}-{}",
        BADGE_LABEL, message, BADGE_COLOR
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComplexityStat, LineTotals};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn file_stats(entries: &[(&str, usize)]) -> BTreeMap<String, FileTypeStat> {
        entries
            .iter()
            .map(|(ext, count)| {
                (
                    ext.to_string(),
                    FileTypeStat {
                        extension: ext.to_string(),
                        count: *count,
                    },
                )
            })
            .collect()
    }

    fn sample_data() -> ReportData {
        ReportData {
            repo_url: "https://github.com/user/testrepo".to_string(),
            report_date: "2024-05-01 10:00:00 +00:00".to_string(),
            badge_url: None,
            commit: CommitInfo {
                hash: "a1b2c3d4e5f6".to_string(),
                message: "feat: implement amazing new features".to_string(),
                author: "Jules Verne".to_string(),
                email: "jules@example.com".to_string(),
                date: "2024-05-01 09:30:00 +0000".to_string(),
            },
            stats: OverallStats {
                line_totals: LineTotals::Computed {
                    added: 150,
                    deleted: 30,
                },
                // 故意以非排序順序插入
                file_stats: file_stats(&[(".md", 2), (".go", 5)]),
                complexity_stats: vec![
                    ComplexityStat {
                        complexity: 20,
                        package: "main".to_string(),
                        function_name: "complexFunc".to_string(),
                        file: "main.go".to_string(),
                        line: 42,
                    },
                    ComplexityStat {
                        complexity: 16,
                        package: "helper".to_string(),
                        function_name: "anotherComplex".to_string(),
                        file: "utils/helper.go".to_string(),
                        line: 101,
                    },
                ],
                functions_over_threshold: 2,
                average_complexity: 18.0,
            },
            complexity_threshold: 15,
        }
    }

    #[test]
    fn badge_url_message_segment() {
        let url = generate_badge_url(150, 18.0);
        assert_eq!(
            url,
            "https://img.shields.io/badge/ZenWatch-changes%20150%20%7C%20avg%20complx%2018.0-blue"
        );
        assert!(url.contains("changes%20150%20%7C%20avg%20complx%2018.0"));
    }

    #[test]
    fn badge_url_rounds_to_one_decimal() {
        assert!(generate_badge_url(0, 8.46).contains("avg%20complx%208.5"));
    }

    #[test]
    fn full_report_matches_layout() {
        let mut data = sample_data();
        let total = data.stats.total_lines_added() + data.stats.total_lines_deleted();
        data.badge_url = Some(generate_badge_url(total, data.stats.average_complexity));

        let expected = concat!(
            "# ZenWatch Analysis Report\n",
            "\n",
            "**Repository:** https://github.com/user/testrepo\n",
            "**Analyzed At:** 2024-05-01 10:00:00 +00:00\n",
            "\n",
            "![ZenWatch Stats](https://img.shields.io/badge/ZenWatch-changes%20180%20%7C%20avg%20complx%2018.0-blue)\n",
            "\n",
            "## Latest Commit Analyzed\n",
            "- **Hash:** a1b2c3d4e5f6\n",
            "- **Author:** Jules Verne <jules@example.com>\n",
            "- **Date:** 2024-05-01 09:30:00 +0000\n",
            "- **Message:** feat: implement amazing new features\n",
            "\n",
            "## Code Statistics\n",
            "- **Total Lines Added:** 150\n",
            "- **Total Lines Deleted:** 30\n",
            "  *Note: Line counts are overall for the commit. Per-file line counts were not available with current git analysis settings.*\n",
            "\n",
            "### File Type Distribution\n",
            "| Extension | Count |\n",
            "|-----------|-------|\n",
            "| .go | 5 |\n",
            "| .md | 2 |\n",
            "\n",
            "## Cyclomatic Complexity Analysis (Threshold > 15)\n",
            "- **Average Complexity (of functions over threshold):** 18.00\n",
            "- **Functions Over Threshold:** 2\n",
            "\n",
            "### Functions Over Complexity Threshold\n",
            "| Complexity | Function | File:Line | Package |\n",
            "|------------|----------|-----------|---------|\n",
            "| 20 | complexFunc | main.go:42 | main |\n",
            "| 16 | anotherComplex | utils/helper.go:101 | helper |\n",
        );

        assert_eq!(render_report(&data).unwrap(), expected);
    }

    #[test]
    fn no_functions_sentence_replaces_table() {
        let mut data = sample_data();
        data.stats.functions_over_threshold = 0;
        data.stats.average_complexity = 0.0;
        data.stats.complexity_stats.clear();

        let report = render_report(&data).unwrap();

        assert!(report.contains("No functions found with cyclomatic complexity greater than 15.\n"));
        assert!(!report.contains("### Functions Over Complexity Threshold"));
        assert!(!report.contains("| Complexity |"));
        assert!(report.contains("- **Average Complexity (of functions over threshold):** 0.00\n"));
    }

    #[test]
    fn badge_line_only_when_url_present() {
        let mut data = sample_data();
        let without = render_report(&data).unwrap();
        assert!(!without.contains("![ZenWatch Stats]"));
        assert!(without.contains("**Analyzed At:** 2024-05-01 10:00:00 +00:00\n\n## Latest Commit Analyzed"));

        data.badge_url = Some(String::new());
        assert!(!render_report(&data).unwrap().contains("![ZenWatch Stats]"));

        data.badge_url = Some("https://example.com/badge.svg".to_string());
        assert!(render_report(&data)
            .unwrap()
            .contains("\n![ZenWatch Stats](https://example.com/badge.svg)\n"));
    }

    #[test]
    fn unavailable_totals_render_as_zero() {
        let mut data = sample_data();
        data.stats.line_totals = LineTotals::Unavailable;
        let report = render_report(&data).unwrap();
        assert!(report.contains("- **Total Lines Added:** 0\n"));
        assert!(report.contains("- **Total Lines Deleted:** 0\n"));
    }

    #[test]
    fn placeholder_like_values_are_not_expanded() {
        let mut data = sample_data();
        data.commit.message = "chore: bump {{threshold}}".to_string();
        let report = render_report(&data).unwrap();
        assert!(report.contains("- **Message:** chore: bump {{threshold}}\n"));
    }

    #[test]
    fn writes_report_into_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/latest.md");
        let data = sample_data();

        generate_markdown_report(&data, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_report(&data).unwrap());
    }

    #[test]
    fn json_report_keeps_totals_status() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.json");
        let mut data = sample_data();
        data.stats.line_totals = LineTotals::Unavailable;

        generate_json_report(&data, &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["stats"]["line_totals"]["status"], "unavailable");
        assert_eq!(json["commit"]["hash"], "a1b2c3d4e5f6");
        assert_eq!(json["stats"]["file_stats"][".go"]["count"], 5);
    }
}
