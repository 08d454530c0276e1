// ============================================================================
// 项目分析服务：遍历 → 分类 → 配置提取，生成 Analysis 快照
// ✅ 只能做：组合 scanner / classifier / extract_strategy
// ⛔ 禁止：写入项目目录
// ============================================================================

use std::path::Path;

use crate::config::PipelineSettings;
use crate::models::dtos::{Analysis, ProjectStats};
use crate::services::classifier::classify;
use crate::services::extract_strategy::get_extractor;
use crate::services::scanner::list_project_files;
use crate::utils::error::AppResult;

/// 分析项目目录，生成一次新的 Analysis
///
/// 每次调用都重新遍历和提取，不缓存上次结果。
/// 分类结果为 unknown 时归一化为 generic-mobile（必需文件为空）。
///
/// # 返回
/// - `Ok(Analysis)`: 分析快照，提取中的软错误记录在 `errors` 中
/// - `Err(AppError::ScanError)`: 项目根目录不存在
pub fn analyze_project(project_path: &Path, settings: &PipelineSettings) -> AppResult<Analysis> {
    let files = list_project_files(project_path, settings.max_depth)?;
    Ok(analyze_files(project_path, &files))
}

/// 基于已扫描的文件列表执行分类和提取
pub fn analyze_files(project_path: &Path, files: &[String]) -> Analysis {
    let classification = classify(files);
    let framework = classification.framework.normalized();

    let extractor = get_extractor(framework);
    let extraction = extractor.extract(project_path, files);

    log::info!(
        "项目分析完成：{} → {}（{} 个文件，缺失 {} 个，诊断 {} 条）",
        project_path.display(),
        framework,
        files.len(),
        extraction.missing_files.len(),
        extraction.diagnostics.len()
    );

    Analysis {
        framework,
        language: classification.language,
        project_type: classification.project_type,
        missing_files: extraction.missing_files,
        project_stats: ProjectStats {
            total_files: files.len(),
            source_files: extraction.source_files,
            dependencies: extraction.dependencies.len(),
            target_sdk: extraction.target_sdk,
            min_sdk: extraction.min_sdk,
        },
        dependencies: extraction.dependencies,
        build_config: extraction.build_config,
        errors: extraction.diagnostics,
    }
}

// ============================================================================
// 单元测试
// ============================================================================
