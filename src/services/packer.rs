// ============================================================================
// 打包服务：在内存中收集 APK 条目，最后一次性写出 ZIP
// 纯 Rust 函数，只接收显式参数，方便单元测试
// ============================================================================
//
// 条目顺序：清单 → classes.dex → resources.arsc → 资源 → 图标 → 签名元数据。
// 可选步骤（资源、图标）失败只记录说明并跳过；写盘失败时删除残留文件，
// 改为写出只包含根目录候选文件的回退包。

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::PipelineSettings;
use crate::models::dtos::Analysis;
use crate::services::build_strategy::get_builder;
use crate::services::segments::{
    arsc_segment, dex_segment, signature_blob, signature_file, signing_manifest, solid_png,
};
use crate::services::templates::{android_manifest, TemplateValues};
use crate::services::FALLBACK_FILES;
use crate::utils::error::{AppError, AppResult};

/// 图标写入的密度目录
const ICON_PATHS: &[&str] = &[
    "res/mipmap-mdpi/ic_launcher.png",
    "res/mipmap-hdpi/ic_launcher.png",
    "res/mipmap-xhdpi/ic_launcher.png",
];

/// 打包结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedApk {
    /// 输出文件完整路径
    pub path: PathBuf,
    /// 输出文件字节数
    pub size: u64,
    /// 写入的条目名，按写入顺序
    pub entries: Vec<String>,
    /// 是否为回退包
    pub fallback: bool,
    /// 被跳过的可选步骤说明
    pub notes: Vec<String>,
}

/// 内存中的 APK 条目
pub type Entry = (String, Vec<u8>);

/// 组装 APK 并写到 `<project>/<output_dir>/<apk_file_name>`
///
/// # 返回
/// - `Ok(PackagedApk)`: 正常包或回退包
/// - `Err(AppError)`: 回退包也无法写出
pub fn assemble(
    project_path: &Path,
    analysis: &Analysis,
    settings: &PipelineSettings,
) -> AppResult<PackagedApk> {
    let output = project_path.join(settings.relative_output_path());
    let (entries, mut notes) = collect_entries(project_path, analysis, settings);

    match write_archive(&output, &entries) {
        Ok(size) => {
            log::info!("APK 已写出：{}（{} 字节）", output.display(), size);
            Ok(PackagedApk {
                path: output,
                size,
                entries: entries.into_iter().map(|(name, _)| name).collect(),
                fallback: false,
                notes,
            })
        }
        Err(e) => {
            log::warn!("APK 写出失败，改为写出回退包：{}", e);
            notes.push(format!("APK 写出失败：{}", e));
            let fallback = fallback_entries(project_path, settings, &mut notes);
            let size = write_archive(&output, &fallback)?;
            Ok(PackagedApk {
                path: output,
                size,
                entries: fallback.into_iter().map(|(name, _)| name).collect(),
                fallback: true,
                notes,
            })
        }
    }
}

/// 按固定顺序收集所有条目，返回 (条目, 跳过说明)
pub fn collect_entries(
    project_path: &Path,
    analysis: &Analysis,
    settings: &PipelineSettings,
) -> (Vec<Entry>, Vec<String>) {
    let values = TemplateValues::from_config(&analysis.build_config);
    let mut entries: Vec<Entry> = vec![
        (
            "AndroidManifest.xml".to_string(),
            android_manifest(&values).into_bytes(),
        ),
        ("classes.dex".to_string(), dex_segment(settings.dex_size)),
        ("resources.arsc".to_string(), arsc_segment(settings.arsc_size)),
    ];

    let collected = get_builder(analysis.framework).collect_assets(project_path, settings);
    let mut notes = collected.notes;
    entries.extend(collected.entries.into_iter().map(|a| (a.name, a.data)));

    match solid_png(settings.icon_size) {
        Ok(icon) => {
            for path in ICON_PATHS {
                entries.push((path.to_string(), icon.clone()));
            }
        }
        Err(e) => notes.push(format!("跳过图标：{}", e)),
    }

    // 签名元数据覆盖以上全部条目，必须最后计算
    let manifest_mf = signing_manifest(entries.iter().map(|(n, d)| (n.as_str(), d.as_slice())));
    let cert_sf = signature_file(&manifest_mf);
    entries.push(("META-INF/MANIFEST.MF".to_string(), manifest_mf.into_bytes()));
    entries.push(("META-INF/CERT.SF".to_string(), cert_sf.into_bytes()));
    entries.push((
        "META-INF/CERT.RSA".to_string(),
        signature_blob(settings.signature_size),
    ));

    for note in &notes {
        log::warn!("{}", note);
    }
    (entries, notes)
}

/// 回退包条目：根目录下存在的候选文件
fn fallback_entries(
    project_path: &Path,
    settings: &PipelineSettings,
    notes: &mut Vec<String>,
) -> Vec<Entry> {
    FALLBACK_FILES
        .iter()
        .filter(|name| project_path.join(name).is_file())
        .filter_map(|name| {
            match crate::services::build_strategy::read_truncated(
                &project_path.join(name),
                settings.max_asset_bytes,
            ) {
                Ok((data, _)) => Some((name.to_string(), data)),
                Err(e) => {
                    notes.push(format!("回退包跳过 {}：{}", name, e));
                    None
                }
            }
        })
        .collect()
}

/// 将条目写成 ZIP（Deflated），返回文件大小
///
/// 写入中途失败时删除残留的半成品文件。
pub fn write_archive(path: &Path, entries: &[Entry]) -> AppResult<u64> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::PackageError(format!("无法创建输出目录 {}: {}", parent.display(), e))
        })?;
    }

    let file = std::fs::File::create(path).map_err(|e| {
        AppError::PackageError(format!("无法创建 APK 文件 {}: {}", path.display(), e))
    })?;

    // 成功后解除，失败时清理半成品
    let guard = scopeguard::guard(path.to_path_buf(), |p| {
        let _ = std::fs::remove_file(&p);
    });

    let mut zip_writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, data) in entries {
        zip_writer.start_file(name.as_str(), options)?;
        zip_writer.write_all(data)?;
    }
    zip_writer.finish()?;

    let path = scopeguard::ScopeGuard::into_inner(guard);
    Ok(std::fs::metadata(&path)?.len())
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analyzer::analyze_project;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    fn read_entry(path: &Path, name: &str) -> Vec<u8> {
        let file = fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).unwrap();
        buf
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let file = fs::File::open(path).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        archive.file_names().map(String::from).collect()
    }

    #[test]
    fn test_assemble_generic_project() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let settings = PipelineSettings::default();
        let analysis = analyze_project(dir.path(), &settings).unwrap();

        let apk = assemble(dir.path(), &analysis, &settings).unwrap();
        assert!(!apk.fallback);
        assert!(apk.size > 0);
        assert_eq!(
            apk.path,
            dir.path().join("build/outputs/apk/release/app-release.apk")
        );
        assert_eq!(
            apk.entries.first().map(String::as_str),
            Some("AndroidManifest.xml")
        );
        assert_eq!(
            apk.entries.last().map(String::as_str),
            Some("META-INF/CERT.RSA")
        );

        let names = entry_names(&apk.path);
        for expected in [
            "classes.dex",
            "resources.arsc",
            "assets/index.html",
            "res/mipmap-hdpi/ic_launcher.png",
            "META-INF/MANIFEST.MF",
            "META-INF/CERT.SF",
        ] {
            assert!(names.iter().any(|n| n == expected), "缺少条目 {}", expected);
        }

        let manifest = String::from_utf8(read_entry(&apk.path, "AndroidManifest.xml")).unwrap();
        assert!(manifest.contains("android:label=\"Mobile App\""));
        assert!(manifest.contains("package=\"com.genericmobile.mobileapp\""));
    }

    #[test]
    fn test_signing_manifest_covers_payload_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.js"), "console.log('hi')").unwrap();
        let settings = PipelineSettings::default();
        let analysis = analyze_project(dir.path(), &settings).unwrap();

        let apk = assemble(dir.path(), &analysis, &settings).unwrap();
        let mf = String::from_utf8(read_entry(&apk.path, "META-INF/MANIFEST.MF")).unwrap();
        let dex = read_entry(&apk.path, "classes.dex");
        assert!(mf.contains("Name: classes.dex"));
        assert!(mf.contains(&crate::services::segments::sha256_hex(&dex)));
        assert!(!mf.contains("Name: META-INF/CERT.RSA"));

        let rsa = read_entry(&apk.path, "META-INF/CERT.RSA");
        assert_eq!(&rsa[..2], &[0x30, 0x82]);
    }

    #[test]
    fn test_missing_asset_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("www")).unwrap();
        fs::write(
            dir.path().join("config.xml"),
            "<widget id=\"com.x.y\"></widget>",
        )
        .unwrap();
        fs::write(dir.path().join("www/index.html"), "<html/>").unwrap();
        let settings = PipelineSettings::default();
        let analysis = analyze_project(dir.path(), &settings).unwrap();

        fs::remove_file(dir.path().join("www/index.html")).unwrap();
        let apk = assemble(dir.path(), &analysis, &settings).unwrap();
        assert!(!apk.fallback);
        assert!(!apk.entries.iter().any(|n| n == "assets/www/index.html"));
        assert!(apk.notes.iter().any(|n| n.contains("www/index.html")));
    }

    #[test]
    fn test_write_failure_removes_partial_output() {
        let dir = TempDir::new().unwrap();
        // 输出路径被目录占用，创建文件失败
        let target = dir.path().join("out.apk");
        fs::create_dir_all(&target).unwrap();
        let entries = vec![("a.txt".to_string(), b"a".to_vec())];

        assert!(write_archive(&target, &entries).is_err());
        assert!(target.is_dir());
    }

    #[test]
    fn test_duplicate_entry_triggers_fallback_archive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        fs::write(dir.path().join("build.gradle"), "// root").unwrap();
        let settings = PipelineSettings::default();

        // 两个同名条目会让 ZipWriter 拒绝写入
        let duplicated = vec![
            ("dup.txt".to_string(), b"1".to_vec()),
            ("dup.txt".to_string(), b"2".to_vec()),
        ];
        let output = dir.path().join(settings.relative_output_path());
        assert!(write_archive(&output, &duplicated).is_err());
        assert!(!output.exists());

        let mut notes = Vec::new();
        let fallback = fallback_entries(dir.path(), &settings, &mut notes);
        let names: Vec<&str> = fallback.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["package.json", "build.gradle"]);
        assert!(write_archive(&output, &fallback).unwrap() > 0);
    }
}
