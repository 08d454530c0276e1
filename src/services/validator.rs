// ============================================================================
// 校验服务：脚手架生成前的必需文件校验 + 生成后的结构校验
// ============================================================================

use std::path::Path;

use crate::models::dtos::{BuildConfig, Framework};
use crate::services::build_strategy::get_builder;
use crate::utils::error::{AppError, AppResult};

/// 前置校验：只看分析阶段记录的存在性标记，不重新检查磁盘
///
/// 校验失败时流水线立即中止，不写入任何文件。
pub fn validate_requirements(config: &BuildConfig) -> AppResult<()> {
    let mut problems = Vec::new();

    match config {
        BuildConfig::ReactNative(c) => {
            if !c.has_package_json {
                problems.push("React Native 项目缺少 package.json".to_string());
            }
        }
        BuildConfig::Flutter(c) => {
            if !c.has_pubspec {
                problems.push("Flutter 项目缺少 pubspec.yaml".to_string());
            }
        }
        BuildConfig::Android(c) => {
            if !(c.has_build_gradle || c.has_app_build_gradle || c.has_manifest) {
                problems.push(
                    "Android 项目缺少 build.gradle、app/build.gradle 或 AndroidManifest.xml"
                        .to_string(),
                );
            }
        }
        BuildConfig::Cordova(c) => {
            if !c.has_config_xml {
                problems.push("Cordova 项目缺少 config.xml".to_string());
            }
        }
        BuildConfig::GenericMobile(_) => {}
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(problems))
    }
}

/// 结构校验：脚手架生成后重新检查磁盘上的关键文件（关键文件由打包策略声明）
pub fn validate_structure(project_path: &Path, framework: Framework) -> AppResult<()> {
    let builder = get_builder(framework);
    let problems: Vec<String> = builder
        .core_files()
        .iter()
        .filter(|r| !r.exists_in(project_path))
        .map(|r| format!("项目结构不完整：缺少 {}", r.path))
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(problems))
    }
}

// ============================================================================
// 单元测试
// ============================================================================
