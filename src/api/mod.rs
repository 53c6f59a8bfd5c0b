// ==========================================
// 高校选课注册系统 - API 层
// ==========================================
// 职责: 面向传输层的业务编排（传输协议外置）
// 红线: 多表变更一律经 db::with_transaction，
//       仓储 *_tx 关联函数在事务作用域内组合
// ==========================================

pub mod enrollment_api;
pub mod error;
pub mod marks_api;
pub mod offered_course_api;
pub mod section_api;
pub mod semester_registration_api;

pub use enrollment_api::{EnrollmentApi, MyRegistration};
pub use error::{ApiError, ApiResult};
pub use marks_api::MarksApi;
pub use offered_course_api::OfferedCourseApi;
pub use section_api::{ClassScheduleInput, SectionApi};
pub use semester_registration_api::{
    CreateSemesterRegistrationInput, SemesterRegistrationApi, UpdateSemesterRegistrationInput,
};
