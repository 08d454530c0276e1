// ============================================================================
// 数据传输对象（DTO）定义
// 分析结果、构建结果等对外数据结构，仅包含字段定义、默认值和简单访问器
// ⛔ 禁止：包含复杂的业务逻辑方法
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 默认 targetSdk
pub const DEFAULT_TARGET_SDK: u32 = 33;
/// 默认 minSdk
pub const DEFAULT_MIN_SDK: u32 = 21;
/// 默认应用名称
pub const DEFAULT_APP_NAME: &str = "Mobile App";
/// 默认版本号
pub const DEFAULT_VERSION: &str = "1.0.0";
/// 默认 versionCode
pub const DEFAULT_VERSION_CODE: u32 = 1;

// ============================================================================
// 分类标签
// ============================================================================

/// 移动框架标签
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    ReactNative,
    Flutter,
    Android,
    Cordova,
    GenericMobile,
    Unknown,
}

impl Framework {
    /// 全部标签，按分类优先级排列
    pub const ALL: [Framework; 6] = [
        Framework::ReactNative,
        Framework::Flutter,
        Framework::Android,
        Framework::Cordova,
        Framework::GenericMobile,
        Framework::Unknown,
    ];

    /// 标签字符串（与序列化结果一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::ReactNative => "react-native",
            Framework::Flutter => "flutter",
            Framework::Android => "android",
            Framework::Cordova => "cordova",
            Framework::GenericMobile => "generic-mobile",
            Framework::Unknown => "unknown",
        }
    }

    /// 归一化：unknown 降级为 generic-mobile，下游只处理五种标签
    pub fn normalized(self) -> Framework {
        match self {
            Framework::Unknown => Framework::GenericMobile,
            other => other,
        }
    }

    /// 用于合成包名的命名空间片段（如 `reactnative`）
    pub fn slug(&self) -> String {
        self.as_str().replace('-', "")
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 推断出的源码语言
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Dart,
    Kotlin,
    Java,
    Unknown,
}

/// 项目类型
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Hybrid,
    Native,
    Unknown,
}

/// 分类器输出
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub framework: Framework,
    pub language: Language,
    pub project_type: ProjectType,
}

// ============================================================================
// 构建配置（按框架区分的标签联合）
// ============================================================================

/// 各框架共享的应用元信息，每个字段都有默认值
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppMeta {
    pub app_name: String,
    pub version: String,
    pub version_code: u32,
    /// 包名；未提取到时为 None，打包时使用框架命名空间下的合成包名
    pub package_name: Option<String>,
    pub target_sdk: u32,
    pub min_sdk: u32,
}

impl Default for AppMeta {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            version: DEFAULT_VERSION.to_string(),
            version_code: DEFAULT_VERSION_CODE,
            package_name: None,
            target_sdk: DEFAULT_TARGET_SDK,
            min_sdk: DEFAULT_MIN_SDK,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReactNativeConfig {
    pub has_package_json: bool,
    pub has_entry_file: bool,
    pub has_metro_config: bool,
    pub has_android_dir: bool,
    pub meta: AppMeta,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlutterConfig {
    pub has_pubspec: bool,
    pub has_main_dart: bool,
    pub has_android_dir: bool,
    pub meta: AppMeta,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AndroidConfig {
    pub has_build_gradle: bool,
    pub has_app_build_gradle: bool,
    pub has_settings_gradle: bool,
    pub has_manifest: bool,
    pub compile_sdk: u32,
    pub meta: AppMeta,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            has_build_gradle: false,
            has_app_build_gradle: false,
            has_settings_gradle: false,
            has_manifest: false,
            compile_sdk: DEFAULT_TARGET_SDK,
            meta: AppMeta::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CordovaConfig {
    pub has_config_xml: bool,
    pub has_www_index: bool,
    pub has_package_json: bool,
    pub meta: AppMeta,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenericConfig {
    pub has_index_html: bool,
    pub has_package_json: bool,
    pub meta: AppMeta,
}

/// 构建配置：按框架区分的标签联合，调用方穷尽匹配而非探测可选键
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "framework", rename_all = "kebab-case")]
pub enum BuildConfig {
    ReactNative(ReactNativeConfig),
    Flutter(FlutterConfig),
    Android(AndroidConfig),
    Cordova(CordovaConfig),
    GenericMobile(GenericConfig),
}

impl BuildConfig {
    /// 指定框架的全默认配置（提取完全失败时使用）
    pub fn default_for(framework: Framework) -> Self {
        match framework.normalized() {
            Framework::ReactNative => BuildConfig::ReactNative(ReactNativeConfig::default()),
            Framework::Flutter => BuildConfig::Flutter(FlutterConfig::default()),
            Framework::Android => BuildConfig::Android(AndroidConfig::default()),
            Framework::Cordova => BuildConfig::Cordova(CordovaConfig::default()),
            Framework::GenericMobile | Framework::Unknown => {
                BuildConfig::GenericMobile(GenericConfig::default())
            }
        }
    }

    /// 配置对应的框架标签
    pub fn framework(&self) -> Framework {
        match self {
            BuildConfig::ReactNative(_) => Framework::ReactNative,
            BuildConfig::Flutter(_) => Framework::Flutter,
            BuildConfig::Android(_) => Framework::Android,
            BuildConfig::Cordova(_) => Framework::Cordova,
            BuildConfig::GenericMobile(_) => Framework::GenericMobile,
        }
    }

    /// 共享元信息
    pub fn meta(&self) -> &AppMeta {
        match self {
            BuildConfig::ReactNative(c) => &c.meta,
            BuildConfig::Flutter(c) => &c.meta,
            BuildConfig::Android(c) => &c.meta,
            BuildConfig::Cordova(c) => &c.meta,
            BuildConfig::GenericMobile(c) => &c.meta,
        }
    }
}

// ============================================================================
// 分析结果
// ============================================================================

/// 项目统计
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total_files: usize,
    pub source_files: usize,
    pub dependencies: usize,
    /// 仅当真实从文件中提取到时才有值
    pub target_sdk: Option<u32>,
    pub min_sdk: Option<u32>,
}

/// 一次分析的不可变快照，每次分析重新生成，不与上次结果合并
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// 已归一化的框架标签，永远不是 unknown
    pub framework: Framework,
    pub language: Language,
    pub project_type: ProjectType,
    /// 当前框架必需但缺失的相对路径，按清单顺序
    pub missing_files: Vec<String>,
    /// 依赖名称（仅展示，不解析不安装）
    pub dependencies: BTreeSet<String>,
    pub build_config: BuildConfig,
    pub project_stats: ProjectStats,
    /// 软诊断信息，非空不代表流程中止
    pub errors: Vec<String>,
}

impl Analysis {
    /// 分析本身无法进行时（如根目录不存在）返回的降级结果
    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            framework: Framework::GenericMobile,
            language: Language::Unknown,
            project_type: ProjectType::Unknown,
            missing_files: Vec::new(),
            dependencies: BTreeSet::new(),
            build_config: BuildConfig::default_for(Framework::GenericMobile),
            project_stats: ProjectStats::default(),
            errors,
        }
    }
}

// ============================================================================
// 构建结果
// ============================================================================

/// 构建结果：每次构建一个实例，持久化由调用方负责
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub success: bool,
    /// 生成的 APK 完整路径（仅成功时存在）
    pub apk_path: Option<String>,
    /// APK 字节大小（仅成功时存在）
    pub apk_size: Option<u64>,
    /// 按发生顺序追加的错误信息
    pub errors: Vec<String>,
    /// 按发生顺序追加的构建日志
    pub logs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_normalizes_to_generic() {
        assert_eq!(Framework::Unknown.normalized(), Framework::GenericMobile);
        assert_eq!(Framework::Flutter.normalized(), Framework::Flutter);
    }

    #[test]
    fn test_framework_serializes_kebab_case() {
        let json = serde_json::to_string(&Framework::ReactNative).unwrap();
        assert_eq!(json, "\"react-native\"");
        for fw in Framework::ALL {
            let json = serde_json::to_string(&fw).unwrap();
            assert_eq!(json, format!("\"{}\"", fw.as_str()));
        }
    }

    #[test]
    fn test_default_config_matches_framework() {
        for fw in Framework::ALL {
            let cfg = BuildConfig::default_for(fw);
            assert_eq!(cfg.framework(), fw.normalized());
            assert_eq!(cfg.meta().target_sdk, DEFAULT_TARGET_SDK);
            assert_eq!(cfg.meta().min_sdk, DEFAULT_MIN_SDK);
            assert_eq!(cfg.meta().app_name, DEFAULT_APP_NAME);
        }
    }

    #[test]
    fn test_build_config_is_tagged_by_framework() {
        let cfg = BuildConfig::default_for(Framework::Flutter);
        let value = serde_json::to_value(&cfg).unwrap();
        assert_eq!(value["framework"], "flutter");
        assert_eq!(value["hasPubspec"], false);
        assert_eq!(value["meta"]["targetSdk"], 33);
    }

    #[test]
    fn test_failed_analysis_is_generic() {
        let analysis = Analysis::failed(vec!["坏了".to_string()]);
        assert_eq!(analysis.framework, Framework::GenericMobile);
        assert!(analysis.missing_files.is_empty());
        assert_eq!(analysis.errors.len(), 1);
    }
}
