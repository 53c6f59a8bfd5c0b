// ==========================================
// 高校选课注册系统 - 领域层
// ==========================================
// 职责: 实体定义与领域类型
// 红线: 领域层不含数据访问逻辑
// ==========================================

pub mod academic;
pub mod enrollment;
pub mod offering;
pub mod registration;
pub mod types;

pub use academic::{AcademicSemester, Course, Faculty, Room, Student};
pub use enrollment::{
    StudentAcademicInfo, StudentEnrolledCourse, StudentEnrolledCourseMark, StudentSemesterPayment,
};
pub use offering::{
    ClassScheduleSlot, OfferedCourse, OfferedCourseClassSchedule, OfferedCourseSection,
};
pub use registration::{
    SemesterRegistration, StudentSemesterRegistration, StudentSemesterRegistrationCourse,
};
