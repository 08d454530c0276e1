// ============================================================================
// 扫描服务：递归列出项目文件
// 纯 Rust 函数，方便单元测试
// ============================================================================

use std::path::Path;

use walkdir::WalkDir;

use crate::services::{IGNORED_DIRS, ROOT_IGNORED_DIRS};
use crate::utils::error::{AppError, AppResult};

/// 递归列出项目根目录下的所有文件（相对路径，统一正斜杠，按字典序排列）
///
/// 跳过 `IGNORED_DIRS` 中的目录和根目录下的 `ROOT_IGNORED_DIRS`，最多下钻 `max_depth` 层。
/// 单个条目读取失败（如权限不足）只记录警告，不中断遍历。
pub fn list_project_files(project_path: &Path, max_depth: usize) -> AppResult<Vec<String>> {
    if !project_path.is_dir() {
        return Err(AppError::ScanError(format!(
            "项目路径不存在或不是目录：{}",
            project_path.display()
        )));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(project_path)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| {
            // 只对目录做排除判断，文件始终保留
            if e.file_type().is_dir() {
                if let Some(name) = e.file_name().to_str() {
                    let root_only = e.depth() == 1 && ROOT_IGNORED_DIRS.contains(&name);
                    return !(root_only || IGNORED_DIRS.contains(&name));
                }
            }
            true
        })
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("遍历项目时跳过无法读取的条目：{}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(project_path)
            .map_err(|e| AppError::ScanError(format!("路径处理失败: {}", e)))?;

        files.push(relative.to_string_lossy().replace('\\', "/"));
    }

    files.sort();
    log::debug!("扫描到 {} 个文件：{}", files.len(), project_path.display());
    Ok(files)
}

/// 取路径的文件名部分
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// 路径中是否包含指定的目录段
pub fn has_segment(path: &str, segment: &str) -> bool {
    let mut parts: Vec<&str> = path.split('/').collect();
    // 最后一段是文件名，不算目录段
    parts.pop();
    parts.contains(&segment)
}

/// 按扩展名统计文件数
pub fn count_by_extension(files: &[String], extensions: &[&str]) -> usize {
    files
        .iter()
        .filter(|f| {
            let name = file_name(f).to_lowercase();
            extensions.iter().any(|ext| name.ends_with(ext))
        })
        .count()
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_project_files_relative_and_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        fs::create_dir_all(dir.path().join("src").join("screens")).unwrap();
        fs::write(dir.path().join("src").join("screens").join("Home.js"), "").unwrap();
        fs::write(dir.path().join("App.js"), "").unwrap();

        let files = list_project_files(dir.path(), 10).unwrap();
        assert_eq!(
            files,
            vec![
                "App.js".to_string(),
                "package.json".to_string(),
                "src/screens/Home.js".to_string(),
            ]
        );
    }

    #[test]
    fn test_list_project_files_skips_ignored_dirs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();
        for ignored in [".git", "node_modules", ".dart_tool", "build"] {
            fs::create_dir_all(dir.path().join(ignored)).unwrap();
            fs::write(dir.path().join(ignored).join("junk.js"), "").unwrap();
        }

        let files = list_project_files(dir.path(), 10).unwrap();
        assert_eq!(files, vec!["index.html".to_string()]);
    }

    #[test]
    fn test_nested_build_package_is_scanned() {
        let dir = TempDir::new().unwrap();
        let package = dir.path().join("app/src/main/java/com/x/build");
        fs::create_dir_all(&package).unwrap();
        fs::write(package.join("Builder.kt"), "class Builder").unwrap();
        fs::create_dir_all(dir.path().join("build/outputs")).unwrap();
        fs::write(dir.path().join("build/outputs/app.apk"), "").unwrap();

        let files = list_project_files(dir.path(), 10).unwrap();
        assert_eq!(
            files,
            vec!["app/src/main/java/com/x/build/Builder.kt".to_string()]
        );
    }

    #[test]
    fn test_list_project_files_respects_max_depth() {
        let dir = TempDir::new().unwrap();
        let deep = dir.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("deep.txt"), "").unwrap();
        fs::write(dir.path().join("a").join("shallow.txt"), "").unwrap();

        let files = list_project_files(dir.path(), 2).unwrap();
        assert_eq!(files, vec!["a/shallow.txt".to_string()]);
    }

    #[test]
    fn test_list_project_files_missing_root() {
        let dir = TempDir::new().unwrap();
        let result = list_project_files(&dir.path().join("nope"), 10);
        assert!(matches!(result, Err(AppError::ScanError(_))));
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(file_name("android/app/build.gradle"), "build.gradle");
        assert_eq!(file_name("pubspec.yaml"), "pubspec.yaml");
        assert!(has_segment("www/index.html", "www"));
        assert!(!has_segment("www", "www"));
        assert!(!has_segment("mywww/index.html", "www"));
        assert_eq!(
            count_by_extension(
                &["a.js".to_string(), "b.TSX".to_string(), "c.css".to_string()],
                &[".js", ".tsx"]
            ),
            2
        );
    }
}
