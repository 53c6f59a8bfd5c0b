// ==========================================
// 高校选课注册系统 - 业务引擎层
// ==========================================
// 职责: 纯计算与判定逻辑（时段重叠、资源可用性、
//       选课资格、成绩档位），不直接持有数据库连接
//       （availability 例外: 在调用方事务作用域内读候选集）
// 红线: 引擎不产生副作用，写入一律由 API 层编排
// ==========================================

pub mod availability;
pub mod eligibility;
pub mod grading;
pub mod time_slot;
