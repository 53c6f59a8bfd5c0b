// ==========================================
// 高校选课注册系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 注册周期状态 (Semester Registration Status)
// ==========================================
// 状态机: UPCOMING → ONGOING → ENDED
// 红线: ENDED 为终态，任何继续转换都必须被显式拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemesterRegistrationStatus {
    Upcoming, // 未开始
    Ongoing,  // 进行中
    Ended,    // 已结束（终态）
}

impl SemesterRegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemesterRegistrationStatus::Upcoming => "UPCOMING",
            SemesterRegistrationStatus::Ongoing => "ONGOING",
            SemesterRegistrationStatus::Ended => "ENDED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "UPCOMING" => Some(SemesterRegistrationStatus::Upcoming),
            "ONGOING" => Some(SemesterRegistrationStatus::Ongoing),
            "ENDED" => Some(SemesterRegistrationStatus::Ended),
            _ => None,
        }
    }

    /// 当前状态是否允许转换到 next
    ///
    /// 仅允许 UPCOMING→ONGOING 和 ONGOING→ENDED，单调推进
    pub fn can_transition_to(&self, next: SemesterRegistrationStatus) -> bool {
        matches!(
            (self, next),
            (
                SemesterRegistrationStatus::Upcoming,
                SemesterRegistrationStatus::Ongoing
            ) | (
                SemesterRegistrationStatus::Ongoing,
                SemesterRegistrationStatus::Ended
            )
        )
    }
}

impl fmt::Display for SemesterRegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 修读状态 (Student Enrolled Course Status)
// ==========================================
// 显式建模: 结转创建时即为 ONGOING，成绩定档后为 COMPLETED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentEnrolledCourseStatus {
    Ongoing,   // 修读中（初始状态）
    Completed, // 已完成
}

impl StudentEnrolledCourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentEnrolledCourseStatus::Ongoing => "ONGOING",
            StudentEnrolledCourseStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ONGOING" => Some(StudentEnrolledCourseStatus::Ongoing),
            "COMPLETED" => Some(StudentEnrolledCourseStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for StudentEnrolledCourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 考试类型 (Exam Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamType {
    Midterm, // 期中
    Final,   // 期末
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Midterm => "MIDTERM",
            ExamType::Final => "FINAL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "MIDTERM" => Some(ExamType::Midterm),
            "FINAL" => Some(ExamType::Final),
            _ => None,
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 星期 (Week Day)
// ==========================================
// 课表以周为单位循环，SATURDAY 为一周起始（沿用校历习惯）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekDay {
    Saturday,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WeekDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekDay::Saturday => "SATURDAY",
            WeekDay::Sunday => "SUNDAY",
            WeekDay::Monday => "MONDAY",
            WeekDay::Tuesday => "TUESDAY",
            WeekDay::Wednesday => "WEDNESDAY",
            WeekDay::Thursday => "THURSDAY",
            WeekDay::Friday => "FRIDAY",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SATURDAY" => Some(WeekDay::Saturday),
            "SUNDAY" => Some(WeekDay::Sunday),
            "MONDAY" => Some(WeekDay::Monday),
            "TUESDAY" => Some(WeekDay::Tuesday),
            "WEDNESDAY" => Some(WeekDay::Wednesday),
            "THURSDAY" => Some(WeekDay::Thursday),
            "FRIDAY" => Some(WeekDay::Friday),
            _ => None,
        }
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
