// ============================================================================
// 统一错误类型定义
// 使用 thiserror 派生宏，遵循 Rust 错误处理最佳实践
// ============================================================================

use thiserror::Error;

/// 应用统一错误枚举
///
/// 覆盖分析、脚手架生成、打包各阶段的错误类型，每个变体对应一类错误。
/// 通过 `impl From<AppError> for String` 保持与上层调用方的兼容性。
#[derive(Debug, Error)]
pub enum AppError {
    /// 前置/结构校验失败，携带逐条的用户可读错误
    #[error("验证失败：{}", .0.join("；"))]
    ValidationError(Vec<String>),

    /// 项目目录遍历失败
    #[error("项目扫描失败：{0}")]
    ScanError(String),

    /// 脚手架文件生成失败
    #[error("脚手架生成失败：{0}")]
    ScaffoldError(String),

    /// 打包过程中的错误（如 ZIP 写入失败、回退包也无法生成）
    #[error("打包失败：{0}")]
    PackageError(String),

    /// 配置文件加载或校验失败
    #[error("配置错误：{0}")]
    ConfigError(String),

    /// 文件系统 IO 错误
    #[error("IO 错误：{0}")]
    IoError(#[from] std::io::Error),

    /// ZIP 容器写入错误
    #[error("ZIP 错误：{0}")]
    ZipError(#[from] zip::result::ZipError),
}

impl AppError {
    /// 拆分为逐条错误信息（校验错误保持条目，其余错误为单条）
    pub fn into_messages(self) -> Vec<String> {
        match self {
            AppError::ValidationError(items) => items,
            other => vec![other.to_string()],
        }
    }
}

/// 便捷类型别名，统一项目内的 Result 签名
pub type AppResult<T> = Result<T, AppError>;

/// 将 AppError 转换为 String，保持与上层调用方返回类型的兼容性
impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}

// ============================================================================
// 可恢复结果：软失败时携带默认值和诊断信息
// ============================================================================

/// 单个步骤的可恢复结果
///
/// 提取或打包中的可选步骤失败时不中断流程，而是回退到默认值并记录诊断。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recoverable<T> {
    /// 成功得到的真实值
    Value(T),
    /// 回退值 + 诊断信息
    Fallback { value: T, diagnostic: String },
}

impl<T> Recoverable<T> {
    /// 构造回退结果
    pub fn fallback(value: T, diagnostic: impl Into<String>) -> Self {
        Recoverable::Fallback {
            value,
            diagnostic: diagnostic.into(),
        }
    }

    /// 是否为回退结果
    pub fn is_fallback(&self) -> bool {
        matches!(self, Recoverable::Fallback { .. })
    }

    /// 借用内部值
    pub fn value(&self) -> &T {
        match self {
            Recoverable::Value(v) => v,
            Recoverable::Fallback { value, .. } => value,
        }
    }

    /// 取出值，回退时把诊断追加到 `diagnostics`
    pub fn resolve(self, diagnostics: &mut Vec<String>) -> T {
        match self {
            Recoverable::Value(v) => v,
            Recoverable::Fallback { value, diagnostic } => {
                log::debug!("{}", diagnostic);
                diagnostics.push(diagnostic);
                value
            }
        }
    }

    /// 转换内部值，保留诊断信息
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Recoverable<U> {
        match self {
            Recoverable::Value(v) => Recoverable::Value(f(v)),
            Recoverable::Fallback { value, diagnostic } => Recoverable::Fallback {
                value: f(value),
                diagnostic,
            },
        }
    }

    /// 仅在真实提取成功时返回 Some
    pub fn found(&self) -> Option<&T> {
        match self {
            Recoverable::Value(v) => Some(v),
            Recoverable::Fallback { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_joins_items() {
        let err = AppError::ValidationError(vec!["缺少 a".to_string(), "缺少 b".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("缺少 a"));
        assert!(msg.contains("缺少 b"));
    }

    #[test]
    fn test_into_messages_keeps_validation_items() {
        let err = AppError::ValidationError(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(err.into_messages(), vec!["x".to_string(), "y".to_string()]);

        let err = AppError::PackageError("坏了".to_string());
        assert_eq!(err.into_messages().len(), 1);
    }

    #[test]
    fn test_recoverable_resolve_records_diagnostic() {
        let mut diags = Vec::new();
        let v = Recoverable::fallback(33u32, "未找到 targetSdk").resolve(&mut diags);
        assert_eq!(v, 33);
        assert_eq!(diags, vec!["未找到 targetSdk".to_string()]);

        let v = Recoverable::Value(30u32).resolve(&mut diags);
        assert_eq!(v, 30);
        assert_eq!(diags.len(), 1);
    }
}
