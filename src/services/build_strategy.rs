// ============================================================================
// 多框架打包策略
// ============================================================================
//
// 使用策略模式（Strategy Pattern）实现可扩展的多框架打包。
// 每种框架实现 BuildStrategy trait，通过 get_builder 工厂函数获取对应策略。
// 策略负责两件事：声明打包前必须存在的关键文件，以及挑选要放进 APK 的项目资源。

use std::io::Read;
use std::path::Path;

use walkdir::WalkDir;

use crate::config::PipelineSettings;
use crate::models::dtos::Framework;
use crate::services::{RequiredFile, GENERIC_ASSET_CANDIDATES};
use crate::utils::error::AppResult;

// ============================================================================
// 打包策略 Trait 定义
// ============================================================================

/// 放入 APK 的单个资源条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// APK 内路径
    pub name: String,
    pub data: Vec<u8>,
    /// 源文件超出读取上限被截断
    pub truncated: bool,
}

/// 资源收集结果：成功的条目 + 被跳过的条目说明
#[derive(Debug, Default)]
pub struct CollectedAssets {
    pub entries: Vec<AssetEntry>,
    pub notes: Vec<String>,
}

impl CollectedAssets {
    /// 读取一个资源；失败只记录说明，不中断
    fn add(&mut self, project_path: &Path, rel_path: &str, name: String, max_bytes: u64) {
        match read_truncated(&project_path.join(rel_path), max_bytes) {
            Ok((data, truncated)) => {
                if truncated {
                    self.notes
                        .push(format!("资源 {} 超过 {} 字节，已截断", rel_path, max_bytes));
                }
                self.entries.push(AssetEntry {
                    name,
                    data,
                    truncated,
                });
            }
            Err(e) => self.notes.push(format!("跳过资源 {}：{}", rel_path, e)),
        }
    }
}

/// 框架打包策略 trait
pub trait BuildStrategy {
    /// 打包前必须存在的关键文件（结构校验使用）
    fn core_files(&self) -> &[RequiredFile];

    /// 挑选要放进 APK 的项目资源
    fn collect_assets(&self, project_path: &Path, settings: &PipelineSettings) -> CollectedAssets;
}

/// 读取文件前 `max_bytes` 字节，返回 (内容, 是否截断)
pub fn read_truncated(path: &Path, max_bytes: u64) -> AppResult<(Vec<u8>, bool)> {
    let file = std::fs::File::open(path)?;
    let total = file.metadata()?.len();
    let mut data = Vec::with_capacity(total.min(max_bytes) as usize);
    file.take(max_bytes).read_to_end(&mut data)?;
    Ok((data, total > max_bytes))
}

/// 取第一个存在于磁盘上的候选路径
fn first_existing<'a>(project_path: &Path, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|c| project_path.join(c).is_file())
}

// ============================================================================
// React Native 打包策略
// ============================================================================

const REACT_NATIVE_CORE_FILES: &[RequiredFile] = &[
    RequiredFile::new("package.json"),
    RequiredFile::with_alternates("index.js", &["index.ts", "index.tsx", "index.jsx"]),
];

/// React Native 打包策略：入口脚本作为 JS bundle
pub struct ReactNativeBuildStrategy;

impl BuildStrategy for ReactNativeBuildStrategy {
    fn core_files(&self) -> &[RequiredFile] {
        REACT_NATIVE_CORE_FILES
    }

    fn collect_assets(&self, project_path: &Path, settings: &PipelineSettings) -> CollectedAssets {
        let mut assets = CollectedAssets::default();
        let candidates: Vec<&str> = REACT_NATIVE_CORE_FILES[1].candidates().collect();
        match first_existing(project_path, &candidates) {
            Some(entry) => assets.add(
                project_path,
                entry,
                "assets/index.android.bundle".to_string(),
                settings.max_asset_bytes,
            ),
            None => assets.notes.push("未找到入口脚本，跳过 JS bundle".to_string()),
        }
        assets
    }
}

// ============================================================================
// Flutter 打包策略
// ============================================================================

const FLUTTER_CORE_FILES: &[RequiredFile] = &[
    RequiredFile::new("pubspec.yaml"),
    RequiredFile::new("lib/main.dart"),
];

/// Flutter 打包策略：assets/ 目录下按文件名排序的前 N 个文件
pub struct FlutterBuildStrategy;

impl BuildStrategy for FlutterBuildStrategy {
    fn core_files(&self) -> &[RequiredFile] {
        FLUTTER_CORE_FILES
    }

    fn collect_assets(&self, project_path: &Path, settings: &PipelineSettings) -> CollectedAssets {
        let mut assets = CollectedAssets::default();
        let assets_dir = project_path.join("assets");
        if !assets_dir.is_dir() {
            assets.notes.push("项目没有 assets 目录，跳过 Flutter 资源".to_string());
            return assets;
        }

        let files = WalkDir::new(&assets_dir)
            .max_depth(settings.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .take(settings.max_flutter_assets);

        for entry in files {
            let Ok(relative) = entry.path().strip_prefix(project_path) else {
                continue;
            };
            let rel = relative.to_string_lossy().replace('\\', "/");
            assets.add(
                project_path,
                &rel,
                format!("assets/flutter_assets/{}", rel),
                settings.max_asset_bytes,
            );
        }
        assets
    }
}

// ============================================================================
// Cordova 打包策略
// ============================================================================

const CORDOVA_CORE_FILES: &[RequiredFile] = &[
    RequiredFile::new("config.xml"),
    RequiredFile::new("www/index.html"),
];

/// Cordova 打包策略：www/index.html
pub struct CordovaBuildStrategy;

impl BuildStrategy for CordovaBuildStrategy {
    fn core_files(&self) -> &[RequiredFile] {
        CORDOVA_CORE_FILES
    }

    fn collect_assets(&self, project_path: &Path, settings: &PipelineSettings) -> CollectedAssets {
        let mut assets = CollectedAssets::default();
        assets.add(
            project_path,
            "www/index.html",
            "assets/www/index.html".to_string(),
            settings.max_asset_bytes,
        );
        assets
    }
}

// ============================================================================
// 原生 Android / 通用项目打包策略
// ============================================================================

const ANDROID_CORE_FILES: &[RequiredFile] = &[
    RequiredFile::with_alternates("app/build.gradle", &["app/build.gradle.kts"]),
    RequiredFile::new("app/src/main/AndroidManifest.xml"),
];

/// 从固定候选列表中取第一个存在的根目录文件
fn collect_first_candidate(project_path: &Path, settings: &PipelineSettings) -> CollectedAssets {
    let mut assets = CollectedAssets::default();
    match first_existing(project_path, GENERIC_ASSET_CANDIDATES) {
        Some(name) => assets.add(
            project_path,
            name,
            format!("assets/{}", name),
            settings.max_asset_bytes,
        ),
        None => assets.notes.push("根目录没有可打包的资源候选文件".to_string()),
    }
    assets
}

/// 原生 Android 打包策略
pub struct AndroidBuildStrategy;

impl BuildStrategy for AndroidBuildStrategy {
    fn core_files(&self) -> &[RequiredFile] {
        ANDROID_CORE_FILES
    }

    fn collect_assets(&self, project_path: &Path, settings: &PipelineSettings) -> CollectedAssets {
        collect_first_candidate(project_path, settings)
    }
}

/// 通用移动项目打包策略：没有关键文件要求
pub struct GenericBuildStrategy;

impl BuildStrategy for GenericBuildStrategy {
    fn core_files(&self) -> &[RequiredFile] {
        &[]
    }

    fn collect_assets(&self, project_path: &Path, settings: &PipelineSettings) -> CollectedAssets {
        collect_first_candidate(project_path, settings)
    }
}

// ============================================================================
// 工厂函数
// ============================================================================

/// 根据框架标签获取对应的打包策略（unknown 按 generic-mobile 处理）
pub fn get_builder(framework: Framework) -> Box<dyn BuildStrategy> {
    match framework.normalized() {
        Framework::ReactNative => Box::new(ReactNativeBuildStrategy),
        Framework::Flutter => Box::new(FlutterBuildStrategy),
        Framework::Android => Box::new(AndroidBuildStrategy),
        Framework::Cordova => Box::new(CordovaBuildStrategy),
        Framework::GenericMobile | Framework::Unknown => Box::new(GenericBuildStrategy),
    }
}

// ============================================================================
// 单元测试
// ============================================================================
