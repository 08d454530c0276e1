// ============================================================================
// 多框架配置提取策略
// ============================================================================
//
// 使用策略模式（Strategy Pattern）实现可扩展的多框架配置提取。
// 每种框架实现 ConfigExtractor trait，通过 get_extractor 工厂函数获取对应策略。
// 提取只做文本模式匹配：任何字段提取失败都回退到默认值并记录诊断，绝不中断分析。

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;

use crate::models::dtos::{
    AndroidConfig, AppMeta, BuildConfig, CordovaConfig, FlutterConfig, Framework, GenericConfig,
    ReactNativeConfig, DEFAULT_APP_NAME, DEFAULT_MIN_SDK, DEFAULT_TARGET_SDK, DEFAULT_VERSION,
    DEFAULT_VERSION_CODE,
};
use crate::services::scanner::{count_by_extension, file_name};
use crate::services::templates::xml_unescape;
use crate::services::RequiredFile;
use crate::utils::error::Recoverable;

// ============================================================================
// 提取结果与策略 Trait
// ============================================================================

/// 单个框架策略的提取结果
#[derive(Debug, Clone)]
pub struct Extraction {
    pub build_config: BuildConfig,
    pub missing_files: Vec<String>,
    pub dependencies: BTreeSet<String>,
    pub source_files: usize,
    /// 真实提取到的 SDK 版本（默认值不计入）
    pub target_sdk: Option<u32>,
    pub min_sdk: Option<u32>,
    pub diagnostics: Vec<String>,
}

/// 框架配置提取策略 trait
pub trait ConfigExtractor {
    /// 该框架的必需文件清单
    fn required_files(&self) -> &[RequiredFile];

    /// 计入源码统计的扩展名
    fn source_extensions(&self) -> &[&str];

    /// 读取配置文件并提取结构化字段
    ///
    /// # 参数
    /// - `project_path`: 项目根目录
    /// - `files`: 扫描得到的相对路径列表
    fn extract(&self, project_path: &Path, files: &[String]) -> Extraction;
}

/// 计算清单中缺失的文件（保持清单顺序）
pub fn missing_files(required: &[RequiredFile], files: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|r| !r.is_listed(files))
        .map(|r| r.path.to_string())
        .collect()
}

// ============================================================================
// 文本提取工具
// ============================================================================

/// 已读取的配置文件
#[derive(Debug, Clone)]
struct ConfigSource {
    path: String,
    content: String,
}

/// 读取候选列表中出现在文件列表里的配置文件，读取失败记录诊断
fn load_sources(
    project_path: &Path,
    files: &[String],
    candidates: &[&str],
    diagnostics: &mut Vec<String>,
) -> Vec<ConfigSource> {
    candidates
        .iter()
        .filter(|c| files.iter().any(|f| f == *c))
        .filter_map(|c| match std::fs::read_to_string(project_path.join(c)) {
            Ok(content) => Some(ConfigSource {
                path: c.to_string(),
                content,
            }),
            Err(e) => {
                diagnostics.push(format!("读取 {} 失败：{}", c, e));
                None
            }
        })
        .collect()
}

/// 按顺序在多个来源中查找第一个匹配的捕获组
fn capture_first(sources: &[ConfigSource], pattern: &str) -> Option<String> {
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            log::warn!("正则编译失败 {}: {}", pattern, e);
            return None;
        }
    };
    sources.iter().find_map(|s| {
        re.captures(&s.content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// 从 XML 属性或文本节点中取值，并还原实体
fn capture_xml(sources: &[ConfigSource], pattern: &str) -> Option<String> {
    capture_first(sources, pattern).map(|v| xml_unescape(&v))
}

/// 收集所有匹配的捕获组
fn capture_all(sources: &[ConfigSource], pattern: &str) -> Vec<String> {
    let Ok(re) = Regex::new(pattern) else {
        log::warn!("正则编译失败 {}", pattern);
        return Vec::new();
    };
    sources
        .iter()
        .flat_map(|s| {
            re.captures_iter(&s.content)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn source_names(sources: &[ConfigSource]) -> String {
    sources
        .iter()
        .map(|s| s.path.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 提取字符串字段；来源为空时返回 None（文件缺失不算错误）
fn text_field(
    sources: &[ConfigSource],
    pattern: &str,
    label: &str,
    default: &str,
) -> Option<Recoverable<String>> {
    if sources.is_empty() {
        return None;
    }
    Some(match capture_first(sources, pattern) {
        Some(v) => Recoverable::Value(v),
        None => Recoverable::fallback(
            default.to_string(),
            format!(
                "{} 中未找到 {}，使用默认值 {}",
                source_names(sources),
                label,
                default
            ),
        ),
    })
}

/// 提取整数字段；捕获到但无法解析为整数同样回退
fn number_field(
    sources: &[ConfigSource],
    pattern: &str,
    label: &str,
    default: u32,
) -> Option<Recoverable<u32>> {
    if sources.is_empty() {
        return None;
    }
    let parsed = capture_first(sources, pattern).and_then(|v| v.parse::<u32>().ok());
    Some(match parsed {
        Some(v) => Recoverable::Value(v),
        None => Recoverable::fallback(
            default,
            format!(
                "{} 中未找到 {}，使用默认值 {}",
                source_names(sources),
                label,
                default
            ),
        ),
    })
}

/// 结算一个可选字段：返回 (最终值, 真实提取值)
fn settle<T: Clone>(
    field: Option<Recoverable<T>>,
    default: T,
    diagnostics: &mut Vec<String>,
) -> (T, Option<T>) {
    match field {
        None => (default, None),
        Some(r) => {
            let found = r.found().cloned();
            (r.resolve(diagnostics), found)
        }
    }
}

/// 取文件列表中第一个存在的候选路径
fn first_listed(files: &[String], candidates: &[&'static str]) -> Option<&'static str> {
    candidates
        .iter()
        .copied()
        .find(|c| files.iter().any(|f| f == c))
}

// Gradle 模式：同时兼容 Groovy (`minSdkVersion 21`) 与 Kotlin DSL (`minSdk = 24`)
const GRADLE_MIN_SDK: &str = r"\bminSdk(?:Version)?\s*[=(]?\s*(\d+)";
const GRADLE_TARGET_SDK: &str = r"\btargetSdk(?:Version)?\s*[=(]?\s*(\d+)";
const GRADLE_COMPILE_SDK: &str = r"\bcompileSdk(?:Version)?\s*[=(]?\s*(\d+)";
const GRADLE_APPLICATION_ID: &str = r#"\bapplicationId\s*[=(]?\s*["']([^"']+)["']"#;
const GRADLE_NAMESPACE: &str = r#"\bnamespace\s*[=(]?\s*["']([^"']+)["']"#;
const GRADLE_VERSION_NAME: &str = r#"\bversionName\s*[=(]?\s*["']([^"']+)["']"#;
const GRADLE_VERSION_CODE: &str = r"\bversionCode\s*[=(]?\s*(\d+)";
const GRADLE_DEPENDENCY: &str = r#"(?m)^\s*(?:implementation|api|compileOnly|runtimeOnly|kapt|annotationProcessor)\s*\(?\s*["']([^"':\s]+:[^"':\s]+)"#;
const SETTINGS_ROOT_NAME: &str = r#"rootProject\.name\s*=\s*["']([^"']+)["']"#;

// AndroidManifest.xml 模式
const MANIFEST_PACKAGE: &str = r#"<manifest[^>]*\spackage\s*=\s*"([^"]+)""#;
const MANIFEST_LABEL: &str = r#"<application[^>]*\sandroid:label\s*=\s*"([^"]+)""#;
const MANIFEST_VERSION_NAME: &str = r#"android:versionName\s*=\s*"([^"]+)""#;
const MANIFEST_MIN_SDK: &str = r#"android:minSdkVersion\s*=\s*"(\d+)""#;
const MANIFEST_TARGET_SDK: &str = r#"android:targetSdkVersion\s*=\s*"(\d+)""#;

// config.xml 模式
const WIDGET_ID: &str = r#"<widget[^>]*\sid\s*=\s*"([^"]+)""#;
const WIDGET_VERSION: &str = r#"<widget[^>]*\sversion\s*=\s*"([^"]+)""#;
const WIDGET_VERSION_CODE: &str = r#"<widget[^>]*\sandroid-versionCode\s*=\s*"(\d+)""#;
const WIDGET_NAME: &str = r"<name[^>]*>\s*([^<]+?)\s*</name>";
const WIDGET_MIN_SDK: &str =
    r#"<preference\s+name\s*=\s*"android-minSdkVersion"\s+value\s*=\s*"(\d+)""#;
const WIDGET_TARGET_SDK: &str =
    r#"<preference\s+name\s*=\s*"android-targetSdkVersion"\s+value\s*=\s*"(\d+)""#;
const WIDGET_PLUGIN: &str = r#"<plugin\s+name\s*=\s*"([^"]+)""#;

// pubspec.yaml 模式
const PUBSPEC_NAME: &str = r#"(?m)^name:\s*["']?([^\s"'#]+)"#;
const PUBSPEC_VERSION: &str = r#"(?m)^version:\s*["']?([^\s"'#]+)"#;

// package.json 无法按 JSON 解析时的文本回退模式
const JSON_NAME: &str = r#""name"\s*:\s*"([^"]+)""#;
const JSON_VERSION: &str = r#""version"\s*:\s*"([^"]+)""#;

// ============================================================================
// package.json / app.json
// ============================================================================

/// package.json 中关心的字段
#[derive(Debug, Default)]
struct PackageJsonFacts {
    name: Option<Recoverable<String>>,
    version: Option<Recoverable<String>>,
    dependencies: BTreeSet<String>,
}

/// 解析 package.json：优先 serde_json，格式损坏时退化为文本匹配
fn read_package_json(
    project_path: &Path,
    files: &[String],
    rel_path: &str,
    diagnostics: &mut Vec<String>,
) -> PackageJsonFacts {
    let sources = load_sources(project_path, files, &[rel_path], diagnostics);
    let Some(source) = sources.first() else {
        return PackageJsonFacts::default();
    };

    match serde_json::from_str::<serde_json::Value>(&source.content) {
        Ok(json) => {
            let string_field = |key: &str, default: &str| {
                match json.get(key).and_then(|v| v.as_str()).filter(|s| !s.trim().is_empty()) {
                    Some(v) => Recoverable::Value(v.trim().to_string()),
                    None => Recoverable::fallback(
                        default.to_string(),
                        format!("{} 中未找到 {}，使用默认值 {}", rel_path, key, default),
                    ),
                }
            };

            let mut dependencies = BTreeSet::new();
            for section in ["dependencies", "devDependencies"] {
                if let Some(obj) = json.get(section).and_then(|v| v.as_object()) {
                    dependencies.extend(obj.keys().cloned());
                }
            }

            PackageJsonFacts {
                name: Some(string_field("name", DEFAULT_APP_NAME)),
                version: Some(string_field("version", DEFAULT_VERSION)),
                dependencies,
            }
        }
        Err(e) => {
            diagnostics.push(format!("{} 解析失败，改用文本匹配：{}", rel_path, e));
            PackageJsonFacts {
                name: text_field(&sources, JSON_NAME, "name", DEFAULT_APP_NAME),
                version: text_field(&sources, JSON_VERSION, "version", DEFAULT_VERSION),
                dependencies: BTreeSet::new(),
            }
        }
    }
}

/// 读取 React Native 的 app.json 中的展示名称（displayName 优先于 name）
fn read_app_json_display_name(
    project_path: &Path,
    files: &[String],
    diagnostics: &mut Vec<String>,
) -> Option<String> {
    let sources = load_sources(project_path, files, &["app.json"], diagnostics);
    let source = sources.first()?;
    match serde_json::from_str::<serde_json::Value>(&source.content) {
        Ok(json) => ["displayName", "name"]
            .iter()
            .find_map(|k| json.get(*k).and_then(|v| v.as_str()))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        Err(e) => {
            diagnostics.push(format!("app.json 解析失败：{}", e));
            None
        }
    }
}

// ============================================================================
// Gradle 公共提取
// ============================================================================

/// 从一组 Gradle 脚本中提取的字段
struct GradleFacts {
    min_sdk: (u32, Option<u32>),
    target_sdk: (u32, Option<u32>),
    compile_sdk: Option<u32>,
    application_id: Option<String>,
    version_name: Option<String>,
    version_code: Option<u32>,
    dependencies: Vec<String>,
}

/// 提取 Gradle 字段；`sources` 顺序即优先级（模块级脚本在前，项目级在后）
fn read_gradle(sources: &[ConfigSource], diagnostics: &mut Vec<String>) -> GradleFacts {
    let min_sdk = settle(
        number_field(sources, GRADLE_MIN_SDK, "minSdk", DEFAULT_MIN_SDK),
        DEFAULT_MIN_SDK,
        diagnostics,
    );
    let target_sdk = settle(
        number_field(sources, GRADLE_TARGET_SDK, "targetSdk", DEFAULT_TARGET_SDK),
        DEFAULT_TARGET_SDK,
        diagnostics,
    );

    GradleFacts {
        min_sdk,
        target_sdk,
        compile_sdk: capture_first(sources, GRADLE_COMPILE_SDK).and_then(|v| v.parse().ok()),
        application_id: capture_first(sources, GRADLE_APPLICATION_ID)
            .or_else(|| capture_first(sources, GRADLE_NAMESPACE)),
        version_name: capture_first(sources, GRADLE_VERSION_NAME),
        version_code: capture_first(sources, GRADLE_VERSION_CODE).and_then(|v| v.parse().ok()),
        dependencies: capture_all(sources, GRADLE_DEPENDENCY),
    }
}

/// 解析 `@string/xxx` 形式的标签
fn resolve_string_resource(
    project_path: &Path,
    files: &[String],
    label: &str,
    strings_path: &str,
    diagnostics: &mut Vec<String>,
) -> Option<String> {
    let Some(key) = label.strip_prefix("@string/") else {
        return Some(label.to_string());
    };
    let sources = load_sources(project_path, files, &[strings_path], diagnostics);
    let pattern = format!(
        r#"<string\s+name\s*=\s*"{}"\s*>([^<]+)</string>"#,
        regex::escape(key)
    );
    let resolved = capture_xml(&sources, &pattern);
    if resolved.is_none() {
        diagnostics.push(format!("无法解析应用名称资源 {}", label));
    }
    resolved
}

/// 拆分 `1.2.3+45` 形式的版本号
fn split_build_number(version: &str) -> (String, Option<u32>) {
    match version.split_once('+') {
        Some((name, code)) => (name.to_string(), code.parse().ok()),
        None => (version.to_string(), None),
    }
}

// ============================================================================
// React Native 提取策略
// ============================================================================

const REACT_NATIVE_REQUIRED: &[RequiredFile] = &[
    RequiredFile::new("package.json"),
    RequiredFile::with_alternates("index.js", &["index.ts", "index.tsx", "index.jsx"]),
    RequiredFile::with_alternates("android/build.gradle", &["android/build.gradle.kts"]),
    RequiredFile::with_alternates(
        "android/app/build.gradle",
        &["android/app/build.gradle.kts"],
    ),
    RequiredFile::new("android/app/src/main/AndroidManifest.xml"),
];

/// React Native 提取策略：package.json + app.json + android/app/build.gradle
pub struct ReactNativeExtractor;

impl ConfigExtractor for ReactNativeExtractor {
    fn required_files(&self) -> &[RequiredFile] {
        REACT_NATIVE_REQUIRED
    }

    fn source_extensions(&self) -> &[&str] {
        &[".js", ".jsx", ".ts", ".tsx"]
    }

    fn extract(&self, project_path: &Path, files: &[String]) -> Extraction {
        let mut diagnostics = Vec::new();

        let pkg = read_package_json(project_path, files, "package.json", &mut diagnostics);
        let display_name = read_app_json_display_name(project_path, files, &mut diagnostics);
        let gradle_sources = load_sources(
            project_path,
            files,
            &[
                "android/app/build.gradle",
                "android/app/build.gradle.kts",
                "android/build.gradle",
                "android/build.gradle.kts",
            ],
            &mut diagnostics,
        );
        let gradle = read_gradle(&gradle_sources, &mut diagnostics);

        let (package_app_name, _) =
            settle(pkg.name, DEFAULT_APP_NAME.to_string(), &mut diagnostics);
        let (version, _) = settle(pkg.version, DEFAULT_VERSION.to_string(), &mut diagnostics);

        let mut dependencies = pkg.dependencies;
        dependencies.extend(gradle.dependencies);

        let config = ReactNativeConfig {
            has_package_json: REACT_NATIVE_REQUIRED[0].is_listed(files),
            has_entry_file: REACT_NATIVE_REQUIRED[1].is_listed(files),
            has_metro_config: files
                .iter()
                .any(|f| !f.contains('/') && file_name(f).starts_with("metro.config.")),
            has_android_dir: files.iter().any(|f| f.starts_with("android/")),
            meta: AppMeta {
                app_name: display_name.unwrap_or(package_app_name),
                version,
                version_code: gradle.version_code.unwrap_or(DEFAULT_VERSION_CODE),
                package_name: gradle.application_id,
                target_sdk: gradle.target_sdk.0,
                min_sdk: gradle.min_sdk.0,
            },
        };

        Extraction {
            build_config: BuildConfig::ReactNative(config),
            missing_files: missing_files(self.required_files(), files),
            dependencies,
            source_files: count_by_extension(files, self.source_extensions()),
            target_sdk: gradle.target_sdk.1,
            min_sdk: gradle.min_sdk.1,
            diagnostics,
        }
    }
}

// ============================================================================
// Flutter 提取策略
// ============================================================================

const FLUTTER_REQUIRED: &[RequiredFile] = &[
    RequiredFile::new("pubspec.yaml"),
    RequiredFile::new("lib/main.dart"),
    RequiredFile::with_alternates("android/build.gradle", &["android/build.gradle.kts"]),
    RequiredFile::with_alternates(
        "android/app/build.gradle",
        &["android/app/build.gradle.kts"],
    ),
    RequiredFile::new("android/app/src/main/AndroidManifest.xml"),
];

/// 提取 pubspec.yaml 中 dependencies / dev_dependencies 块下的包名
fn pubspec_dependencies(content: &str) -> BTreeSet<String> {
    let mut deps = BTreeSet::new();
    let mut in_deps = false;
    for line in content.lines() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        // 顶层键（无缩进）切换当前块
        if !line.starts_with(' ') && !line.starts_with('\t') {
            let key = line.split(':').next().unwrap_or("").trim();
            in_deps = matches!(key, "dependencies" | "dev_dependencies");
            continue;
        }
        if !in_deps {
            continue;
        }
        // 只取恰好两个空格缩进的包名行，更深的缩进是包的子配置
        if let Some(rest) = line.strip_prefix("  ") {
            if rest.starts_with(' ') {
                continue;
            }
            if let Some((name, _)) = rest.split_once(':') {
                let name = name.trim();
                if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    deps.insert(name.to_string());
                }
            }
        }
    }
    deps
}

/// Flutter 提取策略：pubspec.yaml + android/app/build.gradle
pub struct FlutterExtractor;

impl ConfigExtractor for FlutterExtractor {
    fn required_files(&self) -> &[RequiredFile] {
        FLUTTER_REQUIRED
    }

    fn source_extensions(&self) -> &[&str] {
        &[".dart"]
    }

    fn extract(&self, project_path: &Path, files: &[String]) -> Extraction {
        let mut diagnostics = Vec::new();

        let pubspec = load_sources(project_path, files, &["pubspec.yaml"], &mut diagnostics);
        let (app_name, _) = settle(
            text_field(&pubspec, PUBSPEC_NAME, "name", DEFAULT_APP_NAME),
            DEFAULT_APP_NAME.to_string(),
            &mut diagnostics,
        );
        let (raw_version, _) = settle(
            text_field(&pubspec, PUBSPEC_VERSION, "version", DEFAULT_VERSION),
            DEFAULT_VERSION.to_string(),
            &mut diagnostics,
        );
        let (version, build_number) = split_build_number(&raw_version);

        let gradle_sources = load_sources(
            project_path,
            files,
            &[
                "android/app/build.gradle",
                "android/app/build.gradle.kts",
                "android/build.gradle",
                "android/build.gradle.kts",
            ],
            &mut diagnostics,
        );
        let gradle = read_gradle(&gradle_sources, &mut diagnostics);

        let mut dependencies = pubspec
            .first()
            .map(|s| pubspec_dependencies(&s.content))
            .unwrap_or_default();
        dependencies.extend(gradle.dependencies);

        let config = FlutterConfig {
            has_pubspec: FLUTTER_REQUIRED[0].is_listed(files),
            has_main_dart: FLUTTER_REQUIRED[1].is_listed(files),
            has_android_dir: files.iter().any(|f| f.starts_with("android/")),
            meta: AppMeta {
                app_name,
                version,
                version_code: build_number
                    .or(gradle.version_code)
                    .unwrap_or(DEFAULT_VERSION_CODE),
                package_name: gradle.application_id,
                target_sdk: gradle.target_sdk.0,
                min_sdk: gradle.min_sdk.0,
            },
        };

        Extraction {
            build_config: BuildConfig::Flutter(config),
            missing_files: missing_files(self.required_files(), files),
            dependencies,
            source_files: count_by_extension(files, self.source_extensions()),
            target_sdk: gradle.target_sdk.1,
            min_sdk: gradle.min_sdk.1,
            diagnostics,
        }
    }
}

// ============================================================================
// 原生 Android 提取策略
// ============================================================================

const ANDROID_REQUIRED: &[RequiredFile] = &[
    RequiredFile::with_alternates("build.gradle", &["build.gradle.kts"]),
    RequiredFile::with_alternates("settings.gradle", &["settings.gradle.kts"]),
    RequiredFile::with_alternates("app/build.gradle", &["app/build.gradle.kts"]),
    RequiredFile::new("app/src/main/AndroidManifest.xml"),
];

/// 原生 Android 提取策略：app/build.gradle + AndroidManifest.xml (+ strings.xml)
pub struct AndroidExtractor;

impl ConfigExtractor for AndroidExtractor {
    fn required_files(&self) -> &[RequiredFile] {
        ANDROID_REQUIRED
    }

    fn source_extensions(&self) -> &[&str] {
        &[".java", ".kt"]
    }

    fn extract(&self, project_path: &Path, files: &[String]) -> Extraction {
        let mut diagnostics = Vec::new();

        let gradle_sources = load_sources(
            project_path,
            files,
            &[
                "app/build.gradle",
                "app/build.gradle.kts",
                "build.gradle",
                "build.gradle.kts",
            ],
            &mut diagnostics,
        );
        let gradle = read_gradle(&gradle_sources, &mut diagnostics);

        // 标准位置优先，其次取文件树中第一个清单文件
        let manifest_path = first_listed(files, &["app/src/main/AndroidManifest.xml"])
            .map(str::to_string)
            .or_else(|| {
                files
                    .iter()
                    .find(|f| file_name(f) == "AndroidManifest.xml")
                    .cloned()
            });
        let manifest = match &manifest_path {
            Some(p) => load_sources(project_path, files, &[p.as_str()], &mut diagnostics),
            None => Vec::new(),
        };
        let settings = load_sources(
            project_path,
            files,
            &["settings.gradle", "settings.gradle.kts"],
            &mut diagnostics,
        );

        // 应用名称：清单 label（可能是字符串资源引用）→ settings.gradle 根项目名 → 默认值
        let label = capture_xml(&manifest, MANIFEST_LABEL).and_then(|label| {
            resolve_string_resource(
                project_path,
                files,
                &label,
                "app/src/main/res/values/strings.xml",
                &mut diagnostics,
            )
        });
        let app_name = match label.or_else(|| capture_first(&settings, SETTINGS_ROOT_NAME)) {
            Some(name) => name,
            None => {
                if !manifest.is_empty() || !settings.is_empty() {
                    diagnostics.push(format!(
                        "未找到应用名称，使用默认值 {}",
                        DEFAULT_APP_NAME
                    ));
                }
                DEFAULT_APP_NAME.to_string()
            }
        };

        let package_name = gradle
            .application_id
            .clone()
            .or_else(|| capture_xml(&manifest, MANIFEST_PACKAGE));
        if package_name.is_none() && !(gradle_sources.is_empty() && manifest.is_empty()) {
            diagnostics.push("未找到 applicationId / package，打包时使用合成包名".to_string());
        }

        let version = match gradle
            .version_name
            .clone()
            .or_else(|| capture_xml(&manifest, MANIFEST_VERSION_NAME))
        {
            Some(v) => v,
            None => {
                if !gradle_sources.is_empty() || !manifest.is_empty() {
                    diagnostics.push(format!(
                        "未找到 versionName，使用默认值 {}",
                        DEFAULT_VERSION
                    ));
                }
                DEFAULT_VERSION.to_string()
            }
        };

        // Gradle 未声明时退回清单中的 uses-sdk
        let min_sdk = match gradle.min_sdk.1 {
            Some(v) => Some(v),
            None => capture_first(&manifest, MANIFEST_MIN_SDK).and_then(|v| v.parse().ok()),
        };
        let target_sdk = match gradle.target_sdk.1 {
            Some(v) => Some(v),
            None => capture_first(&manifest, MANIFEST_TARGET_SDK).and_then(|v| v.parse().ok()),
        };
        let target = target_sdk.unwrap_or(gradle.target_sdk.0);

        let config = AndroidConfig {
            has_build_gradle: ANDROID_REQUIRED[0].is_listed(files),
            has_settings_gradle: ANDROID_REQUIRED[1].is_listed(files),
            has_app_build_gradle: ANDROID_REQUIRED[2].is_listed(files),
            has_manifest: files.iter().any(|f| file_name(f) == "AndroidManifest.xml"),
            compile_sdk: gradle.compile_sdk.unwrap_or(target),
            meta: AppMeta {
                app_name,
                version,
                version_code: gradle.version_code.unwrap_or(DEFAULT_VERSION_CODE),
                package_name,
                target_sdk: target,
                min_sdk: min_sdk.unwrap_or(gradle.min_sdk.0),
            },
        };

        Extraction {
            build_config: BuildConfig::Android(config),
            missing_files: missing_files(self.required_files(), files),
            dependencies: gradle.dependencies.into_iter().collect(),
            source_files: count_by_extension(files, self.source_extensions()),
            target_sdk,
            min_sdk,
            diagnostics,
        }
    }
}

// ============================================================================
// Cordova 提取策略
// ============================================================================

const CORDOVA_REQUIRED: &[RequiredFile] = &[
    RequiredFile::new("config.xml"),
    RequiredFile::new("www/index.html"),
    RequiredFile::new("package.json"),
];

/// Cordova 提取策略：config.xml + package.json
pub struct CordovaExtractor;

impl ConfigExtractor for CordovaExtractor {
    fn required_files(&self) -> &[RequiredFile] {
        CORDOVA_REQUIRED
    }

    fn source_extensions(&self) -> &[&str] {
        &[".js", ".html", ".css"]
    }

    fn extract(&self, project_path: &Path, files: &[String]) -> Extraction {
        let mut diagnostics = Vec::new();

        let widget = load_sources(project_path, files, &["config.xml"], &mut diagnostics);
        let (app_name, _) = settle(
            text_field(&widget, WIDGET_NAME, "<name>", DEFAULT_APP_NAME)
                .map(|r| r.map(|v| xml_unescape(&v))),
            DEFAULT_APP_NAME.to_string(),
            &mut diagnostics,
        );
        let (version, _) = settle(
            text_field(&widget, WIDGET_VERSION, "widget version", DEFAULT_VERSION)
                .map(|r| r.map(|v| xml_unescape(&v))),
            DEFAULT_VERSION.to_string(),
            &mut diagnostics,
        );
        let min_sdk = settle(
            number_field(
                &widget,
                WIDGET_MIN_SDK,
                "android-minSdkVersion",
                DEFAULT_MIN_SDK,
            ),
            DEFAULT_MIN_SDK,
            &mut diagnostics,
        );
        let target_sdk = settle(
            number_field(
                &widget,
                WIDGET_TARGET_SDK,
                "android-targetSdkVersion",
                DEFAULT_TARGET_SDK,
            ),
            DEFAULT_TARGET_SDK,
            &mut diagnostics,
        );

        let pkg = read_package_json(project_path, files, "package.json", &mut diagnostics);
        let mut dependencies = pkg.dependencies;
        dependencies.extend(capture_all(&widget, WIDGET_PLUGIN));

        let config = CordovaConfig {
            has_config_xml: CORDOVA_REQUIRED[0].is_listed(files),
            has_www_index: CORDOVA_REQUIRED[1].is_listed(files),
            has_package_json: CORDOVA_REQUIRED[2].is_listed(files),
            meta: AppMeta {
                app_name,
                version,
                version_code: capture_first(&widget, WIDGET_VERSION_CODE)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_VERSION_CODE),
                package_name: capture_xml(&widget, WIDGET_ID),
                target_sdk: target_sdk.0,
                min_sdk: min_sdk.0,
            },
        };

        Extraction {
            build_config: BuildConfig::Cordova(config),
            missing_files: missing_files(self.required_files(), files),
            dependencies,
            source_files: count_by_extension(files, self.source_extensions()),
            target_sdk: target_sdk.1,
            min_sdk: min_sdk.1,
            diagnostics,
        }
    }
}

// ============================================================================
// 通用移动项目提取策略
// ============================================================================

/// 通用移动项目策略：没有必需文件，只在 package.json 存在时读取名称和版本
pub struct GenericExtractor;

impl ConfigExtractor for GenericExtractor {
    fn required_files(&self) -> &[RequiredFile] {
        &[]
    }

    fn source_extensions(&self) -> &[&str] {
        &[".js", ".ts", ".html", ".css"]
    }

    fn extract(&self, project_path: &Path, files: &[String]) -> Extraction {
        let mut diagnostics = Vec::new();

        let pkg = read_package_json(project_path, files, "package.json", &mut diagnostics);
        let (app_name, _) = settle(pkg.name, DEFAULT_APP_NAME.to_string(), &mut diagnostics);
        let (version, _) = settle(pkg.version, DEFAULT_VERSION.to_string(), &mut diagnostics);

        let config = GenericConfig {
            has_index_html: files.iter().any(|f| f == "index.html"),
            has_package_json: files.iter().any(|f| f == "package.json"),
            meta: AppMeta {
                app_name,
                version,
                ..AppMeta::default()
            },
        };

        Extraction {
            build_config: BuildConfig::GenericMobile(config),
            missing_files: Vec::new(),
            dependencies: pkg.dependencies,
            source_files: count_by_extension(files, self.source_extensions()),
            target_sdk: None,
            min_sdk: None,
            diagnostics,
        }
    }
}

// ============================================================================
// 工厂函数
// ============================================================================

/// 根据框架标签获取对应的提取策略（unknown 按 generic-mobile 处理）
pub fn get_extractor(framework: Framework) -> Box<dyn ConfigExtractor> {
    match framework.normalized() {
        Framework::ReactNative => Box::new(ReactNativeExtractor),
        Framework::Flutter => Box::new(FlutterExtractor),
        Framework::Android => Box::new(AndroidExtractor),
        Framework::Cordova => Box::new(CordovaExtractor),
        Framework::GenericMobile | Framework::Unknown => Box::new(GenericExtractor),
    }
}

// ============================================================================
// 单元测试
// ============================================================================
