// ==========================================
// 高校选课注册系统 - 成绩档位与绩点计算
// ==========================================
// 档位表 (百分制):
//   [0, 40)   F   0.0
//   [40, 50)  D   2.0
//   [50, 60)  C   2.5
//   [60, 70)  B   3.0
//   [70, 80)  A   3.5
//   [80, 100] A+  4.0
// 总分 = 期中 * midterm_weight + 期末 * final_weight
// CGPA = Σ(学分 * 绩点) / Σ学分（学分加权）
// ==========================================

use crate::repository::enrolled_course_repo::CompletedCourse;

/// 百分制分数换算出的档位
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeResult {
    pub grade: &'static str,
    pub point: f64,
}

/// 百分制分数 → 档位与绩点
///
/// 超出 [0, 100] 的输入夹紧到边界档位
pub fn grade_from_marks(marks: f64) -> GradeResult {
    if marks >= 80.0 {
        GradeResult { grade: "A+", point: 4.0 }
    } else if marks >= 70.0 {
        GradeResult { grade: "A", point: 3.5 }
    } else if marks >= 60.0 {
        GradeResult { grade: "B", point: 3.0 }
    } else if marks >= 50.0 {
        GradeResult { grade: "C", point: 2.5 }
    } else if marks >= 40.0 {
        GradeResult { grade: "D", point: 2.0 }
    } else {
        GradeResult { grade: "F", point: 0.0 }
    }
}

/// 期中/期末加权总分
pub fn weighted_total(midterm: i32, final_marks: i32, midterm_weight: f64, final_weight: f64) -> f64 {
    f64::from(midterm) * midterm_weight + f64::from(final_marks) * final_weight
}

/// 学分加权 CGPA
///
/// 无已完成课程（或总学分为 0）时返回 0.0
pub fn cumulative_gpa(completed: &[CompletedCourse]) -> f64 {
    let total_credits: i32 = completed.iter().map(|c| c.credits).sum();
    if total_credits == 0 {
        return 0.0;
    }

    let weighted: f64 = completed
        .iter()
        .map(|c| f64::from(c.credits) * c.point)
        .sum();

    weighted / f64::from(total_credits)
}

/// 已完成课程的学分合计
pub fn total_completed_credits(completed: &[CompletedCourse]) -> i32 {
    completed.iter().map(|c| c.credits).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bands() {
        assert_eq!(grade_from_marks(0.0).grade, "F");
        assert_eq!(grade_from_marks(39.9).grade, "F");
        assert_eq!(grade_from_marks(40.0).grade, "D");
        assert_eq!(grade_from_marks(50.0).grade, "C");
        assert_eq!(grade_from_marks(60.0).grade, "B");
        assert_eq!(grade_from_marks(70.0).grade, "A");
        assert_eq!(grade_from_marks(79.9).grade, "A");
        assert_eq!(grade_from_marks(80.0).grade, "A+");
        assert_eq!(grade_from_marks(100.0).grade, "A+");
        assert_eq!(grade_from_marks(80.0).point, 4.0);
    }

    #[test]
    fn test_weighted_total() {
        // 期中 80 * 0.4 + 期末 70 * 0.6 = 74 → A / 3.5
        let total = weighted_total(80, 70, 0.4, 0.6);
        assert!((total - 74.0).abs() < f64::EPSILON);

        let result = grade_from_marks(total);
        assert_eq!(result.grade, "A");
        assert_eq!(result.point, 3.5);
    }

    #[test]
    fn test_cgpa_is_credit_weighted() {
        let completed = vec![
            CompletedCourse { credits: 4, point: 4.0 },
            CompletedCourse { credits: 2, point: 2.0 },
        ];
        // (4*4.0 + 2*2.0) / 6 = 20/6
        let cgpa = cumulative_gpa(&completed);
        assert!((cgpa - 20.0 / 6.0).abs() < 1e-9);
        assert_eq!(total_completed_credits(&completed), 6);
    }

    #[test]
    fn test_cgpa_empty_is_zero() {
        assert_eq!(cumulative_gpa(&[]), 0.0);
    }
}
