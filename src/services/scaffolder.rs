// ============================================================================
// 脚手架服务：为缺失的必需文件写入框架对应的模板
// ✅ 只能做：在项目目录内创建父目录并写入模板文件
// ⛔ 禁止：覆盖清单之外的文件
// ============================================================================

use std::path::{Component, Path};

use crate::models::dtos::Analysis;
use crate::services::templates::{render_for_path, TemplateValues};
use crate::utils::error::{AppError, AppResult};

/// 为 `analysis.missing_files` 中的每个路径写入模板
///
/// 相同的分析结果重复执行会写出完全相同的内容（幂等）。
///
/// # 返回
/// - `Ok(Vec<String>)`: 实际写入的相对路径
/// - `Err(AppError::ScaffoldError)`: 路径非法或写入失败
pub fn synthesize_missing(project_path: &Path, analysis: &Analysis) -> AppResult<Vec<String>> {
    let values = TemplateValues::from_config(&analysis.build_config);
    let mut written = Vec::with_capacity(analysis.missing_files.len());

    for rel_path in &analysis.missing_files {
        ensure_inside_project(rel_path)?;

        let target = project_path.join(rel_path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::ScaffoldError(format!("无法创建目录 {}: {}", parent.display(), e))
            })?;
        }

        let content = render_for_path(rel_path, &values);
        std::fs::write(&target, content).map_err(|e| {
            AppError::ScaffoldError(format!("无法写入 {}: {}", target.display(), e))
        })?;

        log::info!("已生成脚手架文件：{}", rel_path);
        written.push(rel_path.clone());
    }

    Ok(written)
}

/// 拒绝绝对路径和跳出项目根目录的路径
fn ensure_inside_project(rel_path: &str) -> AppResult<()> {
    let path = Path::new(rel_path);
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if rel_path.trim().is_empty() || escapes {
        return Err(AppError::ScaffoldError(format!(
            "非法的脚手架路径：{}",
            rel_path
        )));
    }
    Ok(())
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineSettings;
    use crate::services::analyzer::analyze_project;
    use std::fs;
    use tempfile::TempDir;

    fn create_android_project(dir: &TempDir) {
        fs::write(dir.path().join("build.gradle"), "// root").unwrap();
        fs::create_dir_all(dir.path().join("app/src/main/java")).unwrap();
        fs::write(
            dir.path().join("app/src/main/java/Main.kt"),
            "fun main() {}",
        )
        .unwrap();
    }

    #[test]
    fn test_synthesize_then_reanalyze_has_no_missing_files() {
        let dir = TempDir::new().unwrap();
        create_android_project(&dir);
        let settings = PipelineSettings::default();

        let analysis = analyze_project(dir.path(), &settings).unwrap();
        assert_eq!(
            analysis.missing_files,
            vec![
                "settings.gradle".to_string(),
                "app/build.gradle".to_string(),
                "app/src/main/AndroidManifest.xml".to_string(),
            ]
        );

        let written = synthesize_missing(dir.path(), &analysis).unwrap();
        assert_eq!(written, analysis.missing_files);

        let again = analyze_project(dir.path(), &settings).unwrap();
        assert!(again.missing_files.is_empty());
        // 生成的模板可被提取器重新读取
        assert_eq!(again.project_stats.min_sdk, Some(21));
        assert_eq!(again.project_stats.target_sdk, Some(33));
    }

    #[test]
    fn test_synthesize_is_idempotent() {
        let dir = TempDir::new().unwrap();
        create_android_project(&dir);
        let analysis = analyze_project(dir.path(), &PipelineSettings::default()).unwrap();

        synthesize_missing(dir.path(), &analysis).unwrap();
        let first = fs::read_to_string(dir.path().join("app/build.gradle")).unwrap();
        synthesize_missing(dir.path(), &analysis).unwrap();
        let second = fs::read_to_string(dir.path().join("app/build.gradle")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_app_name_with_ampersand_survives_reanalysis() {
        let dir = TempDir::new().unwrap();
        create_android_project(&dir);
        fs::write(
            dir.path().join("settings.gradle"),
            "rootProject.name = \"R&D\"\n",
        )
        .unwrap();
        let settings = PipelineSettings::default();

        let analysis = analyze_project(dir.path(), &settings).unwrap();
        assert_eq!(analysis.build_config.meta().app_name, "R&D");

        synthesize_missing(dir.path(), &analysis).unwrap();
        let manifest =
            fs::read_to_string(dir.path().join("app/src/main/AndroidManifest.xml")).unwrap();
        assert!(manifest.contains(r#"android:label="R&amp;D""#));

        let again = analyze_project(dir.path(), &settings).unwrap();
        assert_eq!(again.build_config.meta().app_name, "R&D");
    }

    #[test]
    fn test_escaping_paths_rejected() {
        let dir = TempDir::new().unwrap();
        let mut analysis = crate::models::dtos::Analysis::failed(Vec::new());
        analysis.missing_files = vec!["../outside.txt".to_string()];

        let result = synthesize_missing(dir.path(), &analysis);
        assert!(matches!(result, Err(AppError::ScaffoldError(_))));
        assert!(!dir.path().parent().unwrap().join("outside.txt").exists());
    }
}
