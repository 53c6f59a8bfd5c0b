// ==========================================
// 可选课程视图集成测试
// ==========================================
// 测试目标: 已完成课程剔除、先修过滤、已选标记
// ==========================================


use course_registration::api::{EnrollmentApi, SemesterRegistrationApi};
use course_registration::logging;

#[test]
fn test_available_courses_view() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S0", "Fall 2025", 2025);
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
        test_helpers::seed_registration(&guard, "R1", "S1", "ONGOING", 3, 9);
        test_helpers::seed_student(&guard, "ST1", "2026-0001", "D1");
        // C1 已完成；C2 先修 C1；C3 先修 C4（未完成）；C5 无先修
        test_helpers::seed_course(&guard, "C1", "Intro", "CS101", 3);
        test_helpers::seed_course(&guard, "C2", "Algorithms", "CS201", 3);
        test_helpers::seed_course(&guard, "C3", "Compilers", "CS401", 3);
        test_helpers::seed_course(&guard, "C4", "Automata", "CS202", 3);
        test_helpers::seed_course(&guard, "C5", "Ethics", "GE100", 2);
        test_helpers::seed_prerequisite(&guard, "C2", "C1");
        test_helpers::seed_prerequisite(&guard, "C3", "C4");
        for (oc, c) in [("OC1", "C1"), ("OC2", "C2"), ("OC3", "C3"), ("OC5", "C5")] {
            test_helpers::seed_offered_course(&guard, oc, c, "D1", "R1");
        }
        // 其他院系的开课不可见
        test_helpers::seed_offered_course(&guard, "OC-OTHER", "C5", "D2", "R1");
        test_helpers::seed_section(&guard, "SEC2A", "Section A", 30, "OC2", "R1");
        test_helpers::seed_section(&guard, "SEC2B", "Section B", 30, "OC2", "R1");
        test_helpers::seed_section(&guard, "SEC5", "Section A", 30, "OC5", "R1");
        // C1 在旧学期已完成
        guard
            .execute(
                "INSERT INTO student_enrolled_course
                 (id, student_id, course_id, academic_semester_id, status, grade, point, total_marks)
                 VALUES ('E1', 'ST1', 'C1', 'S0', 'COMPLETED', 'A', 3.5, 74.0)",
                [],
            )
            .unwrap();
    }

    let conn = test_helpers::open_shared_connection(&db_path);
    let enrollment = EnrollmentApi::new(conn.clone());
    enrollment
        .start_my_registration("2026-0001")
        .expect("启动注册失败");
    enrollment
        .enroll_into_course("2026-0001", "OC2", "SEC2B")
        .expect("选课失败");

    let api = SemesterRegistrationApi::new(conn).expect("创建 API 失败");
    let available = api
        .get_my_semester_reg_courses("2026-0001")
        .expect("查询可选课程失败");

    // C1 已完成剔除，C3 先修未满足剔除，剩 C2 与 C5
    let ids: Vec<&str> = available.iter().map(|a| a.course.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"C2"));
    assert!(ids.contains(&"C5"));

    let c2 = available.iter().find(|a| a.course.id == "C2").unwrap();
    assert!(c2.is_course_taken);
    let sec_a = c2.sections.iter().find(|s| s.section.id == "SEC2A").unwrap();
    let sec_b = c2.sections.iter().find(|s| s.section.id == "SEC2B").unwrap();
    assert!(!sec_a.is_taken);
    assert!(sec_b.is_taken);

    let c5 = available.iter().find(|a| a.course.id == "C5").unwrap();
    assert!(!c5.is_course_taken);
}
