// ==========================================
// 高校选课注册系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 学期注册与选课编排核心 (HTTP 层外置)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则 (纯逻辑)
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/事务原语）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ExamType, SemesterRegistrationStatus, StudentEnrolledCourseStatus, WeekDay,
};

// 领域实体
pub use domain::{
    AcademicSemester, ClassScheduleSlot, Course, Faculty, OfferedCourse,
    OfferedCourseClassSchedule, OfferedCourseSection, Room, SemesterRegistration, Student,
    StudentAcademicInfo, StudentEnrolledCourse, StudentEnrolledCourseMark,
    StudentSemesterPayment, StudentSemesterRegistration, StudentSemesterRegistrationCourse,
};

// 引擎
pub use engine::{
    availability::AvailabilityChecker,
    eligibility::{available_courses, AvailableCourse, AvailableSection},
    grading::grade_from_marks,
    time_slot::slots_overlap,
};

// API
pub use api::{
    EnrollmentApi, MarksApi, OfferedCourseApi, SectionApi, SemesterRegistrationApi,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "高校选课注册系统";
