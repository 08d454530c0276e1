// ============================================================================
// 项目分析相关 Commands
// 负责：加载流水线配置、分析项目
// ============================================================================

use std::path::Path;

use crate::config::PipelineSettings;
use crate::models::dtos::Analysis;
use crate::services::analyzer;

/// 从 JSON 文件加载流水线配置
pub fn load_settings(settings_path: &str) -> Result<PipelineSettings, String> {
    Ok(PipelineSettings::load(Path::new(settings_path))?)
}

/// 使用默认配置分析项目
pub fn analyze_project(project_path: &str) -> Analysis {
    analyze_project_with(project_path, &PipelineSettings::default())
}

/// 分析项目：任何错误都折叠进 `Analysis.errors`
///
/// 根目录不存在或无法遍历时返回降级结果（generic-mobile，空清单）。
pub fn analyze_project_with(project_path: &str, settings: &PipelineSettings) -> Analysis {
    match analyzer::analyze_project(Path::new(project_path), settings) {
        Ok(analysis) => analysis,
        Err(e) => {
            log::warn!("项目分析失败：{}", e);
            Analysis::failed(e.into_messages())
        }
    }
}
