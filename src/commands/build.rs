// ============================================================================
// 构建相关 Commands
// 负责：分析 + 构建一站式入口
// ============================================================================

use std::path::Path;

use crate::config::PipelineSettings;
use crate::models::dtos::{Analysis, BuildResult};
use crate::services::pipeline::{run_build, NoopProgress, ProgressObserver};

use super::analysis::analyze_project_with;

/// 用已有的分析结果构建 APK
pub fn build_with_analysis(
    project_path: &str,
    analysis: &Analysis,
    settings: Option<&PipelineSettings>,
    observer: Option<&dyn ProgressObserver>,
) -> BuildResult {
    let default_settings = PipelineSettings::default();
    let settings = settings.unwrap_or(&default_settings);
    let observer = observer.unwrap_or(&NoopProgress);
    run_build(Path::new(project_path), analysis, settings, observer)
}

/// 分析项目并构建 APK
///
/// 分析阶段的软诊断不会中止构建，只追加到构建日志；
/// 失败原因统一放在 `BuildResult.errors`，不会返回 Err。
pub fn build_project(
    project_path: &str,
    settings: Option<&PipelineSettings>,
    observer: Option<&dyn ProgressObserver>,
) -> BuildResult {
    let default_settings = PipelineSettings::default();
    let settings = settings.unwrap_or(&default_settings);
    let analysis = analyze_project_with(project_path, settings);

    let mut result = build_with_analysis(project_path, &analysis, Some(settings), observer);
    if !analysis.errors.is_empty() {
        let mut logs: Vec<String> = analysis
            .errors
            .iter()
            .map(|e| format!("分析诊断：{}", e))
            .collect();
        logs.append(&mut result.logs);
        result.logs = logs;
    }
    result
}
