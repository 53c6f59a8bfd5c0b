// ==========================================
// 高校选课注册系统 - 开课实体
// ==========================================
// 不变量:
// - (course, department, registration) 三元组唯一，重复创建静默跳过
// - (title, offered_course) 不重复
// - 0 <= currently_enrolled <= max_capacity 任何时刻成立
// - 同教室同星期、同教师同星期的时段不得重叠（半开区间）
// ==========================================

use crate::domain::types::WeekDay;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// 开设课程（一个注册周期内对一个院系开放的课程）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferedCourse {
    pub id: String,
    pub course_id: String,
    pub academic_department_id: String,
    pub semester_registration_id: String,
}

/// 开设课程的教学班（容量受限）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferedCourseSection {
    pub id: String,
    pub title: String,
    pub max_capacity: i32,
    /// 当前已选人数计数器，选课/退课原子维护
    pub currently_enrolled: i32,
    pub offered_course_id: String,
    /// 自父 offered_course 冗余下沉，便于按周期查询
    pub semester_registration_id: String,
}

/// 教学班的周循环课表条目（绑定教室与教师）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferedCourseClassSchedule {
    pub id: String,
    pub day_of_week: WeekDay,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: String,
    pub faculty_id: String,
    pub offered_course_section_id: String,
    pub semester_registration_id: String,
}

impl OfferedCourseClassSchedule {
    pub fn slot(&self) -> ClassScheduleSlot {
        ClassScheduleSlot {
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// 周循环时段（星期 + [start, end) 半开墙钟区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassScheduleSlot {
    pub day_of_week: WeekDay,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
