// ============================================================================
// 模板服务：脚手架文件与 APK 清单的文本模板
// 同一组模板既用于补全缺失文件，也用于打包时生成 AndroidManifest.xml
// ============================================================================

use serde_json::json;

use crate::models::dtos::{BuildConfig, Framework};
use crate::services::scanner::{file_name, has_segment};

/// 模板替换值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValues {
    pub framework: Framework,
    pub app_name: String,
    pub package_name: String,
    pub version: String,
    pub version_code: u32,
    pub min_sdk: u32,
    pub target_sdk: u32,
    pub compile_sdk: u32,
}

impl TemplateValues {
    /// 从构建配置生成替换值，包名缺失时使用合成包名
    pub fn from_config(config: &BuildConfig) -> Self {
        let framework = config.framework();
        let meta = config.meta();
        let compile_sdk = match config {
            BuildConfig::Android(c) => c.compile_sdk,
            _ => meta.target_sdk,
        };
        Self {
            framework,
            app_name: meta.app_name.clone(),
            package_name: meta
                .package_name
                .clone()
                .unwrap_or_else(|| synthetic_package_name(framework, &meta.app_name)),
            version: meta.version.clone(),
            version_code: meta.version_code,
            min_sdk: meta.min_sdk,
            target_sdk: meta.target_sdk,
            compile_sdk,
        }
    }
}

/// 框架命名空间下的合成包名，如 `com.reactnative.mobileapp`
pub fn synthetic_package_name(framework: Framework, app_name: &str) -> String {
    let mut slug: String = app_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if slug.is_empty() || slug.starts_with(|c: char| c.is_ascii_digit()) {
        slug = format!("app{}", slug);
    }
    format!("com.{}.{}", framework.slug(), slug)
}

/// 按目标路径选择模板并渲染
///
/// Gradle 脚本按所在目录区分：`app/` 下为模块级脚本，其余为项目级脚本。
pub fn render_for_path(rel_path: &str, values: &TemplateValues) -> String {
    match file_name(rel_path) {
        "AndroidManifest.xml" => android_manifest(values),
        "build.gradle" | "build.gradle.kts" => {
            if has_segment(rel_path, "app") {
                app_build_gradle(values)
            } else {
                project_build_gradle()
            }
        }
        "settings.gradle" | "settings.gradle.kts" => settings_gradle(values),
        "package.json" => package_json(values),
        "pubspec.yaml" => pubspec_yaml(values),
        "config.xml" => config_xml(values),
        "index.js" | "index.ts" | "index.tsx" | "index.jsx" => react_native_entry(values),
        "main.dart" => flutter_main(values),
        "index.html" => index_html(values),
        _ => placeholder(rel_path),
    }
}

/// XML 属性/文本转义
fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// xml_escape 的逆操作；`&amp;` 最后替换，避免 `&amp;lt;` 被解码两次
pub fn xml_unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// 转为 npm / Dart 包名可接受的形式
fn package_slug(app_name: &str, separator: char) -> String {
    let mut slug = String::new();
    for c in app_name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with(separator) {
            slug.push(separator);
        }
    }
    let slug = slug.trim_end_matches(separator).to_string();
    if slug.is_empty() {
        "mobile_app".replace('_', &separator.to_string())
    } else {
        slug
    }
}

pub fn android_manifest(values: &TemplateValues) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="{package}"
    android:versionCode="{version_code}"
    android:versionName="{version}">

    <uses-sdk
        android:minSdkVersion="{min_sdk}"
        android:targetSdkVersion="{target_sdk}" />

    <uses-permission android:name="android.permission.INTERNET" />

    <application
        android:allowBackup="true"
        android:icon="@mipmap/ic_launcher"
        android:label="{app_name}">
        <activity
            android:name=".MainActivity"
            android:exported="true">
            <intent-filter>
                <action android:name="android.intent.action.MAIN" />
                <category android:name="android.intent.category.LAUNCHER" />
            </intent-filter>
        </activity>
    </application>
</manifest>
"#,
        package = xml_escape(&values.package_name),
        version_code = values.version_code,
        version = xml_escape(&values.version),
        min_sdk = values.min_sdk,
        target_sdk = values.target_sdk,
        app_name = xml_escape(&values.app_name),
    )
}

pub fn app_build_gradle(values: &TemplateValues) -> String {
    format!(
        r#"plugins {{
    id 'com.android.application'
}}

android {{
    namespace '{package}'
    compileSdkVersion {compile_sdk}

    defaultConfig {{
        applicationId "{package}"
        minSdkVersion {min_sdk}
        targetSdkVersion {target_sdk}
        versionCode {version_code}
        versionName "{version}"
    }}

    buildTypes {{
        release {{
            minifyEnabled false
        }}
    }}
}}

dependencies {{
}}
"#,
        package = values.package_name,
        compile_sdk = values.compile_sdk,
        min_sdk = values.min_sdk,
        target_sdk = values.target_sdk,
        version_code = values.version_code,
        version = values.version,
    )
}

pub fn project_build_gradle() -> String {
    r#"buildscript {
    repositories {
        google()
        mavenCentral()
    }
    dependencies {
        classpath 'com.android.tools.build:gradle:8.1.0'
    }
}

allprojects {
    repositories {
        google()
        mavenCentral()
    }
}
"#
    .to_string()
}

pub fn settings_gradle(values: &TemplateValues) -> String {
    format!(
        "rootProject.name = \"{}\"\ninclude ':app'\n",
        values.app_name.replace('"', "'")
    )
}

pub fn package_json(values: &TemplateValues) -> String {
    let main = match values.framework {
        Framework::ReactNative => "index.js",
        Framework::Cordova => "www/index.html",
        _ => "index.html",
    };
    let value = json!({
        "name": package_slug(&values.app_name, '-'),
        "displayName": values.app_name,
        "version": values.version,
        "private": true,
        "main": main,
    });
    format!("{:#}\n", value)
}

pub fn pubspec_yaml(values: &TemplateValues) -> String {
    format!(
        r#"name: {name}
description: "{description}"
version: {version}+{version_code}
publish_to: 'none'

environment:
  sdk: '>=2.17.0 <4.0.0'

dependencies:
  flutter:
    sdk: flutter

flutter:
  uses-material-design: true
"#,
        name = package_slug(&values.app_name, '_'),
        description = values.app_name.replace('"', "'"),
        version = values.version,
        version_code = values.version_code,
    )
}

pub fn config_xml(values: &TemplateValues) -> String {
    format!(
        r#"<?xml version='1.0' encoding='utf-8'?>
<widget id="{package}" version="{version}" xmlns="http://www.w3.org/ns/widgets" xmlns:cdv="http://cordova.apache.org/ns/1.0">
    <name>{app_name}</name>
    <description>{app_name}</description>
    <content src="index.html" />
    <access origin="*" />
    <preference name="android-minSdkVersion" value="{min_sdk}" />
    <preference name="android-targetSdkVersion" value="{target_sdk}" />
</widget>
"#,
        package = xml_escape(&values.package_name),
        version = xml_escape(&values.version),
        app_name = xml_escape(&values.app_name),
        min_sdk = values.min_sdk,
        target_sdk = values.target_sdk,
    )
}

pub fn react_native_entry(values: &TemplateValues) -> String {
    let title = serde_json::Value::String(values.app_name.clone());
    let component = package_slug(&values.app_name, '_');
    format!(
        r#"import React from 'react';
import {{ AppRegistry, Text, View }} from 'react-native';

const App = () => (
  <View>
    <Text>{{{title}}}</Text>
  </View>
);

AppRegistry.registerComponent('{component}', () => App);
"#
    )
}

pub fn flutter_main(values: &TemplateValues) -> String {
    format!(
        r#"import 'package:flutter/material.dart';

void main() => runApp(const App());

class App extends StatelessWidget {{
  const App({{super.key}});

  @override
  Widget build(BuildContext context) {{
    return const MaterialApp(
      home: Scaffold(body: Center(child: Text('{title}'))),
    );
  }}
}}
"#,
        title = values.app_name.replace('\\', "\\\\").replace('\'', "\\'"),
    )
}

pub fn index_html(values: &TemplateValues) -> String {
    let cordova_script = if values.framework == Framework::Cordova {
        "\n    <script src=\"cordova.js\"></script>"
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{app_name}</title>
</head>
<body>
    <h1>{app_name}</h1>{cordova_script}
</body>
</html>
"#,
        app_name = xml_escape(&values.app_name),
    )
}

pub fn placeholder(rel_path: &str) -> String {
    format!("# 自动生成的占位文件：{}\n", rel_path)
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dtos::{AndroidConfig, AppMeta, GenericConfig};

    fn values(framework: Framework) -> TemplateValues {
        TemplateValues::from_config(&BuildConfig::default_for(framework))
    }

    #[test]
    fn test_synthetic_package_name() {
        assert_eq!(
            synthetic_package_name(Framework::ReactNative, "Mobile App"),
            "com.reactnative.mobileapp"
        );
        assert_eq!(
            synthetic_package_name(Framework::Flutter, "123"),
            "com.flutter.app123"
        );
        assert_eq!(
            synthetic_package_name(Framework::Cordova, "界面"),
            "com.cordova.app"
        );
    }

    #[test]
    fn test_extracted_package_name_wins() {
        let config = BuildConfig::Android(AndroidConfig {
            compile_sdk: 34,
            meta: AppMeta {
                package_name: Some("com.example.real".to_string()),
                ..AppMeta::default()
            },
            ..AndroidConfig::default()
        });
        let v = TemplateValues::from_config(&config);
        assert_eq!(v.package_name, "com.example.real");
        assert_eq!(v.compile_sdk, 34);
    }

    #[test]
    fn test_manifest_substitutes_values() {
        let config = BuildConfig::GenericMobile(GenericConfig {
            meta: AppMeta {
                app_name: "Tom & Jerry".to_string(),
                min_sdk: 23,
                ..AppMeta::default()
            },
            ..GenericConfig::default()
        });
        let manifest = android_manifest(&TemplateValues::from_config(&config));
        assert!(manifest.contains("android:label=\"Tom &amp; Jerry\""));
        assert!(manifest.contains("android:minSdkVersion=\"23\""));
        assert!(manifest.contains("android:targetSdkVersion=\"33\""));
        assert!(manifest.contains("package=\"com.genericmobile.tomjerry\""));
    }

    #[test]
    fn test_gradle_template_branches_on_app_segment() {
        let v = values(Framework::Android);
        let app = render_for_path("app/build.gradle", &v);
        let rn_app = render_for_path("android/app/build.gradle", &v);
        let project = render_for_path("android/build.gradle", &v);
        assert!(app.contains("applicationId"));
        assert_eq!(app, rn_app);
        assert!(project.contains("buildscript"));
        assert!(!project.contains("applicationId"));
    }

    #[test]
    fn test_package_json_template_is_valid_json() {
        let v = values(Framework::Cordova);
        let content = render_for_path("package.json", &v);
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["name"], "mobile-app");
        assert_eq!(parsed["version"], "1.0.0");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let v = values(Framework::Flutter);
        for path in [
            "pubspec.yaml",
            "lib/main.dart",
            "config.xml",
            "settings.gradle",
            "notes.txt",
        ] {
            assert_eq!(render_for_path(path, &v), render_for_path(path, &v));
        }
        assert!(render_for_path("pubspec.yaml", &v).starts_with("name: mobile_app"));
    }
}
