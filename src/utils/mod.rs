// ============================================================================
// 通用工具：错误类型、可恢复结果
// ============================================================================

pub mod error;
