// ============================================================================
// 业务层：纯 Rust 核心逻辑
// ✅ 特点：只接收显式参数（项目路径、分析结果、配置），不持有全局状态，方便写 #[test]
// ⛔ 禁止：直接返回调用方专用的错误格式
// ============================================================================

pub mod analyzer;
pub mod build_strategy;
pub mod classifier;
pub mod extract_strategy;
pub mod packer;
pub mod pipeline;
pub mod scaffolder;
pub mod scanner;
pub mod segments;
pub mod templates;
pub mod validator;

// ============================================================================
// 常量定义
// ============================================================================

/// 遍历项目时跳过的目录名：版本控制、依赖缓存、生成产物
pub const IGNORED_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "bower_components",
    ".dart_tool",
    ".pub-cache",
    ".gradle",
    ".idea",
    "Pods",
];

/// 只在项目根目录跳过的目录名：打包产物输出目录，源码包中的同名目录照常遍历
pub const ROOT_IGNORED_DIRS: &[&str] = &["build"];

/// 打包整体失败时，回退包从项目根目录收集的候选文件
pub const FALLBACK_FILES: &[&str] = &[
    "package.json",
    "index.html",
    "index.js",
    "pubspec.yaml",
    "config.xml",
    "build.gradle",
];

/// 通用框架打包时依次尝试的资源候选文件，取第一个存在的
pub const GENERIC_ASSET_CANDIDATES: &[&str] = &["index.html", "index.js", "package.json"];

/// 必需文件清单条目：主路径 + 可替代路径（如 Kotlin DSL 的 `.kts`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredFile {
    /// 缺失时需要生成的相对路径
    pub path: &'static str,
    /// 任一存在即视为满足
    pub alternates: &'static [&'static str],
}

impl RequiredFile {
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            alternates: &[],
        }
    }

    pub const fn with_alternates(path: &'static str, alternates: &'static [&'static str]) -> Self {
        Self { path, alternates }
    }

    /// 所有可满足该条目的路径
    pub fn candidates(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.path).chain(self.alternates.iter().copied())
    }

    /// 在文件列表中是否满足
    pub fn is_listed(&self, files: &[String]) -> bool {
        self.candidates().any(|c| files.iter().any(|f| f == c))
    }

    /// 在磁盘上是否满足
    pub fn exists_in(&self, project_path: &std::path::Path) -> bool {
        self.candidates().any(|c| project_path.join(c).is_file())
    }
}
