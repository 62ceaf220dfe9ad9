use crate::complexity::ComplexityReport;
use crate::models::{ChangedFileStats, FileTypeStat, OverallStats, RepositoryInfo};
use std::collections::BTreeMap;

/// 統計每種副檔名的變更檔案數
pub fn file_type_histogram(files: &[ChangedFileStats]) -> BTreeMap<String, FileTypeStat> {
    let mut histogram: BTreeMap<String, FileTypeStat> = BTreeMap::new();
    for file in files {
        histogram
            .entry(file.file_type.clone())
            .or_insert_with(|| FileTypeStat {
                extension: file.file_type.clone(),
                count: 0,
            })
            .count += 1;
    }
    histogram
}

/// 合併提交分析與外部複雜度結果；複雜度數據原樣沿用，不重新計算
pub fn aggregate(info: &RepositoryInfo, complexity: ComplexityReport) -> OverallStats {
    OverallStats {
        line_totals: info.line_totals,
        file_stats: file_type_histogram(&info.changed_files),
        complexity_stats: complexity.findings,
        functions_over_threshold: complexity.functions_over_threshold,
        average_complexity: complexity.average_complexity,
    }
}
