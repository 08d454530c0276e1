// ============================================================================
// 流水线配置：遍历深度、输出路径、合成段大小等
// 全部字段带默认值，可从 JSON 文件加载并覆盖部分字段
// ============================================================================

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// dex 头部长度（0x70），合成 dex 段不得小于该值
pub const DEX_HEADER_SIZE: usize = 0x70;
/// 资源表头部长度
pub const ARSC_HEADER_SIZE: usize = 12;

/// 流水线配置
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineSettings {
    /// 目录遍历的最大递归深度
    pub max_depth: usize,
    /// 输出目录（相对项目根目录）
    pub output_dir: String,
    /// 输出文件名
    pub apk_file_name: String,
    /// flutter 项目最多打包的 assets 文件数
    pub max_flutter_assets: usize,
    /// 单个资源文件最多读取的字节数，超出部分截断
    pub max_asset_bytes: u64,
    /// 合成 classes.dex 大小
    pub dex_size: usize,
    /// 合成 resources.arsc 大小
    pub arsc_size: usize,
    /// 合成签名块大小
    pub signature_size: usize,
    /// 图标边长（像素）
    pub icon_size: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_depth: 10,
            output_dir: "build/outputs/apk/release".to_string(),
            apk_file_name: "app-release.apk".to_string(),
            max_flutter_assets: 10,
            max_asset_bytes: 1024 * 1024,
            dex_size: 1024,
            arsc_size: 512,
            signature_size: 256,
            icon_size: 48,
        }
    }
}

impl PipelineSettings {
    /// 从 JSON 文件加载配置，缺省字段使用默认值
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        let settings = Self::from_json(&content)?;
        log::info!("已加载流水线配置：{}", path.display());
        Ok(settings)
    }

    /// 从 JSON 字符串解析配置
    pub fn from_json(content: &str) -> AppResult<Self> {
        let settings: PipelineSettings = serde_json::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("配置 JSON 解析失败: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// 校验配置取值范围
    pub fn validate(&self) -> AppResult<()> {
        let mut problems = Vec::new();
        if self.max_depth == 0 {
            problems.push("maxDepth 必须大于 0".to_string());
        }
        if self.output_dir.trim().is_empty() || Path::new(&self.output_dir).is_absolute() {
            problems.push("outputDir 必须是非空的相对路径".to_string());
        }
        if self.output_dir.split(['/', '\\']).any(|seg| seg == "..") {
            problems.push("outputDir 不能跳出项目根目录".to_string());
        }
        if self.apk_file_name.trim().is_empty() || self.apk_file_name.contains(['/', '\\']) {
            problems.push("apkFileName 必须是单个文件名".to_string());
        }
        if self.dex_size < DEX_HEADER_SIZE {
            problems.push(format!("dexSize 不能小于 {} 字节", DEX_HEADER_SIZE));
        }
        if self.arsc_size < ARSC_HEADER_SIZE {
            problems.push(format!("arscSize 不能小于 {} 字节", ARSC_HEADER_SIZE));
        }
        if self.signature_size < 4 {
            problems.push("signatureSize 不能小于 4 字节".to_string());
        }
        if self.icon_size == 0 {
            problems.push("iconSize 必须大于 0".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::ConfigError(problems.join("；")))
        }
    }

    /// 输出文件相对项目根目录的路径
    pub fn relative_output_path(&self) -> String {
        format!(
            "{}/{}",
            self.output_dir.trim_end_matches('/'),
            self.apk_file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = PipelineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.relative_output_path(),
            "build/outputs/apk/release/app-release.apk"
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = PipelineSettings::from_json(r#"{"maxDepth": 4}"#).unwrap();
        assert_eq!(settings.max_depth, 4);
        assert_eq!(settings.dex_size, 1024);
        assert_eq!(settings.apk_file_name, "app-release.apk");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = PipelineSettings::from_json(r#"{"maxDepth": 0, "dexSize": 16}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("maxDepth"));
        assert!(err.contains("dexSize"));
    }

    #[test]
    fn test_escaping_output_dir_rejected() {
        let result = PipelineSettings::from_json(r#"{"outputDir": "../elsewhere"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{"maxFlutterAssets": 3}"#).unwrap();

        let settings = PipelineSettings::load(&path).unwrap();
        assert_eq!(settings.max_flutter_assets, 3);

        let missing = PipelineSettings::load(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(AppError::ConfigError(_))));
    }
}
