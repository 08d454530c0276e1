// ============================================================================
// [总线] 程序的组装车间
// ✅ 只能做：pub mod 暴露子模块、重新导出对外类型
// ⛔ 禁止：直接实现业务逻辑
// ============================================================================
//
// 移动项目分析与合成 APK 打包：识别框架、提取构建配置、补全脚手架、
// 校验结构，最后输出结构上类似已签名 Android 包的 ZIP 归档。

pub mod commands;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

// ============================================================================
// 对外入口
// ============================================================================

pub use commands::analysis::{analyze_project, analyze_project_with, load_settings};
pub use commands::build::{build_project, build_with_analysis};
pub use config::PipelineSettings;
pub use models::dtos::{Analysis, BuildConfig, BuildResult, Framework};
pub use services::pipeline::{BuildStage, NoopProgress, ProgressObserver};
pub use utils::error::{AppError, AppResult};
