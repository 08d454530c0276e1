// ============================================================================
// 框架分类器：根据文件树特征推断移动框架、语言和项目类型
// 纯函数，不做任何 IO
// ============================================================================
//
// 判定顺序即优先级，第一条命中即返回：
// 一个 React Native 项目同时带有 android/build.gradle，一个 Cordova 项目同时
// 带有 package.json，因此弱信号必须排在强信号之后。

use crate::models::dtos::{Classification, Framework, Language, ProjectType};
use crate::services::scanner::{file_name, has_segment};

/// 打包器配置文件（React Native 的第二个佐证信号）
const RN_MARKER_FILES: &[&str] = &[
    "metro.config.js",
    "metro.config.cjs",
    "metro.config.mjs",
    "metro.config.ts",
    "react-native.config.js",
];

/// Android 构建描述/清单文件
const ANDROID_MARKER_FILES: &[&str] = &["build.gradle", "build.gradle.kts", "AndroidManifest.xml"];

/// 根据文件列表分类项目
///
/// 对任意输入都返回六种标签之一，不会 panic。
pub fn classify(files: &[String]) -> Classification {
    let any_named = |names: &[&str]| files.iter().any(|f| names.contains(&file_name(f)));
    let any_segment = |segment: &str| files.iter().any(|f| has_segment(f, segment));
    let any_ext = |ext: &str| files.iter().any(|f| file_name(f).ends_with(ext));

    // 1. package.json 本身不够，普通 Node/Web 项目也有，需要第二个信号
    if any_named(&["package.json"]) && (any_segment("react-native") || any_named(RN_MARKER_FILES)) {
        return Classification {
            framework: Framework::ReactNative,
            language: Language::JavaScript,
            project_type: ProjectType::Hybrid,
        };
    }

    // 2. Dart 包清单
    if any_named(&["pubspec.yaml"]) {
        return Classification {
            framework: Framework::Flutter,
            language: Language::Dart,
            project_type: ProjectType::Hybrid,
        };
    }

    // 3. Gradle 构建描述或 Android 清单
    if any_named(ANDROID_MARKER_FILES) {
        let language = if any_ext(".kt") {
            Language::Kotlin
        } else if any_ext(".java") {
            Language::Java
        } else {
            Language::Unknown
        };
        return Classification {
            framework: Framework::Android,
            language,
            project_type: ProjectType::Native,
        };
    }

    // 4. config.xml + www 目录
    if any_named(&["config.xml"]) && any_segment("www") {
        return Classification {
            framework: Framework::Cordova,
            language: Language::JavaScript,
            project_type: ProjectType::Hybrid,
        };
    }

    Classification {
        framework: Framework::Unknown,
        language: Language::Unknown,
        project_type: ProjectType::Unknown,
    }
}

// ============================================================================
// 单元测试
// ============================================================================
