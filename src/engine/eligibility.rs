// ==========================================
// 高校选课注册系统 - 选课资格判定
// ==========================================
// 职责: 从本周期开设课程中过滤出学生可选集合
// 规则:
// - 已完成的课程不再出现
// - 先修课程未全部完成的课程不出现
// - 本周期已选的课程保留，带 is_course_taken/is_taken 标记
//   供前端展示与退课入口使用
// ==========================================

use crate::domain::academic::Course;
use crate::domain::offering::{OfferedCourse, OfferedCourseSection};
use crate::domain::registration::StudentSemesterRegistrationCourse;
use std::collections::HashSet;

/// 可选课程视图中的教学班条目
#[derive(Debug, Clone)]
pub struct AvailableSection {
    pub section: OfferedCourseSection,
    /// 学生本周期已选中该教学班
    pub is_taken: bool,
}

/// 可选课程视图条目
#[derive(Debug, Clone)]
pub struct AvailableCourse {
    pub course: Course,
    pub offered_course_id: String,
    /// 学生本周期已选该课程（任一教学班）
    pub is_course_taken: bool,
    pub sections: Vec<AvailableSection>,
}

/// 计算学生的可选课程集合（纯函数）
///
/// `offered` 为本周期对学生院系开设的 (开设课程, 课程, 教学班) 目录，
/// `completed_course_ids` 为学生历史上已完成 (COMPLETED) 的课程集合，
/// `taken` 为学生本周期已有的选课记录。
pub fn available_courses(
    offered: &[(OfferedCourse, Course, Vec<OfferedCourseSection>)],
    completed_course_ids: &HashSet<String>,
    taken: &[StudentSemesterRegistrationCourse],
) -> Vec<AvailableCourse> {
    let taken_sections: HashSet<(&str, &str)> = taken
        .iter()
        .map(|t| {
            (
                t.offered_course_id.as_str(),
                t.offered_course_section_id.as_str(),
            )
        })
        .collect();
    let taken_courses: HashSet<&str> = taken
        .iter()
        .map(|t| t.offered_course_id.as_str())
        .collect();

    offered
        .iter()
        .filter(|(_, course, _)| !completed_course_ids.contains(&course.id))
        .filter(|(_, course, _)| {
            course
                .prerequisite_ids
                .iter()
                .all(|p| completed_course_ids.contains(p))
        })
        .map(|(offered_course, course, sections)| {
            let is_course_taken = taken_courses.contains(offered_course.id.as_str());
            let sections = sections
                .iter()
                .map(|section| AvailableSection {
                    is_taken: taken_sections
                        .contains(&(offered_course.id.as_str(), section.id.as_str())),
                    section: section.clone(),
                })
                .collect();

            AvailableCourse {
                course: course.clone(),
                offered_course_id: offered_course.id.clone(),
                is_course_taken,
                sections,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, prerequisites: &[&str]) -> Course {
        Course {
            id: id.to_string(),
            title: format!("Course {id}"),
            code: format!("CS-{id}"),
            credits: 3,
            prerequisite_ids: prerequisites.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn offered(id: &str, course_id: &str) -> OfferedCourse {
        OfferedCourse {
            id: id.to_string(),
            course_id: course_id.to_string(),
            academic_department_id: "D1".to_string(),
            semester_registration_id: "R1".to_string(),
        }
    }

    fn section(id: &str, offered_course_id: &str) -> OfferedCourseSection {
        OfferedCourseSection {
            id: id.to_string(),
            title: format!("Section {id}"),
            max_capacity: 30,
            currently_enrolled: 0,
            offered_course_id: offered_course_id.to_string(),
            semester_registration_id: "R1".to_string(),
        }
    }

    #[test]
    fn test_prerequisite_filtering() {
        // 已完成 C1；C2 先修 C1 可选，C3 先修 C4 不可选，C1 本身已完成不再出现
        let completed: HashSet<String> = ["C1".to_string()].into_iter().collect();
        let catalog = vec![
            (offered("OC1", "C1"), course("C1", &[]), vec![section("S1", "OC1")]),
            (offered("OC2", "C2"), course("C2", &["C1"]), vec![section("S2", "OC2")]),
            (offered("OC3", "C3"), course("C3", &["C4"]), vec![section("S3", "OC3")]),
        ];

        let available = available_courses(&catalog, &completed, &[]);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].course.id, "C2");
        assert!(!available[0].is_course_taken);
    }

    #[test]
    fn test_no_prerequisites_always_eligible() {
        let completed = HashSet::new();
        let catalog = vec![(
            offered("OC1", "C1"),
            course("C1", &[]),
            vec![section("S1", "OC1")],
        )];

        let available = available_courses(&catalog, &completed, &[]);
        assert_eq!(available.len(), 1);
    }

    #[test]
    fn test_taken_flags() {
        let completed = HashSet::new();
        let catalog = vec![(
            offered("OC1", "C1"),
            course("C1", &[]),
            vec![section("S1", "OC1"), section("S2", "OC1")],
        )];
        let taken = vec![StudentSemesterRegistrationCourse {
            semester_registration_id: "R1".to_string(),
            student_id: "ST1".to_string(),
            offered_course_id: "OC1".to_string(),
            offered_course_section_id: "S2".to_string(),
        }];

        let available = available_courses(&catalog, &completed, &taken);
        assert_eq!(available.len(), 1);
        assert!(available[0].is_course_taken);
        assert!(!available[0].sections[0].is_taken);
        assert!(available[0].sections[1].is_taken);
    }
}
