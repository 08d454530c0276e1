// ============================================================================
// 对外入口：供宿主程序调用的薄封装
// ✅ 只能做：接收参数、调用 services 层、把错误折叠进返回结构
// ⛔ 禁止：实现业务逻辑、向调用方返回 Err
// ============================================================================

pub mod analysis;
pub mod build;
