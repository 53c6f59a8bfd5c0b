// ==========================================
// 高校选课注册系统 - 时段重叠判定
// ==========================================
// 语义: [start, end) 半开墙钟区间，不同星期永不重叠，
//       end == start 的衔接时段不算冲突
// ==========================================

use crate::domain::offering::ClassScheduleSlot;

/// 判定两个周循环时段是否重叠
///
/// 标准区间相交: a.start < b.end && b.start < a.end，
/// 星期不同直接判为不重叠。
pub fn slots_overlap(a: &ClassScheduleSlot, b: &ClassScheduleSlot) -> bool {
    if a.day_of_week != b.day_of_week {
        return false;
    }
    a.start_time < b.end_time && b.start_time < a.end_time
}
