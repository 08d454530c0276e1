// ============================================================================
// 数据模型层
// ============================================================================

pub mod dtos;
