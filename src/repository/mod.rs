// ==========================================
// 高校选课注册系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约定: *_tx 关联函数接收事务作用域内的 &Connection，
//       供 API 层在 db::with_transaction 中组合多表变更
// ==========================================

pub mod academic_repo;
pub mod class_schedule_repo;
pub mod enrolled_course_repo;
pub mod error;
pub mod offered_course_repo;
pub mod payment_repo;
pub mod semester_registration_repo;
pub mod student_registration_repo;

// 重导出核心仓储
pub use academic_repo::{AcademicSemesterRepository, CourseRepository, StudentRepository};
pub use class_schedule_repo::ClassScheduleRepository;
pub use enrolled_course_repo::{
    CompletedCourse, StudentEnrolledCourseMarkRepository, StudentEnrolledCourseRepository,
};
pub use error::{RepositoryError, RepositoryResult};
pub use offered_course_repo::{OfferedCourseRepository, SectionRepository};
pub use payment_repo::{StudentAcademicInfoRepository, StudentSemesterPaymentRepository};
pub use semester_registration_repo::SemesterRegistrationRepository;
pub use student_registration_repo::{
    StudentSemesterRegistrationCourseRepository, StudentSemesterRegistrationRepository,
};
