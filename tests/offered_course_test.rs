// ==========================================
// 批量开课集成测试
// ==========================================
// 测试目标: 三元组幂等、未知课程/周期拒绝
// ==========================================


use course_registration::api::{ApiError, OfferedCourseApi};
use course_registration::logging;

#[test]
fn test_create_offered_courses_idempotent() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
        test_helpers::seed_registration(&guard, "R1", "S1", "UPCOMING", 3, 9);
        test_helpers::seed_course(&guard, "C1", "Algorithms", "CS201", 3);
        test_helpers::seed_course(&guard, "C2", "Databases", "CS301", 3);
    }

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = OfferedCourseApi::new(conn);

    let created = api
        .create_offered_courses(&["C1".to_string(), "C2".to_string()], "D1", "R1")
        .expect("批量开课应成功");
    assert_eq!(created.len(), 2);

    // 重复开课静默跳过，只补新增的
    let rerun = api
        .create_offered_courses(&["C1".to_string()], "D1", "R1")
        .expect("重复开课应幂等");
    assert!(rerun.is_empty());

    // 同课程对另一院系是新三元组
    let other_dept = api
        .create_offered_courses(&["C1".to_string()], "D2", "R1")
        .expect("其他院系开课应成功");
    assert_eq!(other_dept.len(), 1);

    let listed = api.list_offered_courses("R1", "D1").expect("查询失败");
    assert_eq!(listed.len(), 2);
}

#[test]
fn test_create_offered_courses_validation() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
        test_helpers::seed_registration(&guard, "R1", "S1", "UPCOMING", 3, 9);
        test_helpers::seed_course(&guard, "C1", "Algorithms", "CS201", 3);
    }

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = OfferedCourseApi::new(conn.clone());

    let empty = api.create_offered_courses(&[], "D1", "R1");
    assert!(matches!(empty, Err(ApiError::Validation(_))));

    let bad_reg = api.create_offered_courses(&["C1".to_string()], "D1", "R-MISSING");
    assert!(matches!(bad_reg, Err(ApiError::NotFound { .. })));

    // 未知课程整体失败，不留半成品
    let bad_course = api.create_offered_courses(
        &["C1".to_string(), "C-MISSING".to_string()],
        "D1",
        "R1",
    );
    assert!(matches!(bad_course, Err(ApiError::NotFound { .. })));

    let guard = conn.lock().unwrap();
    let count = test_helpers::query_i64(&guard, "SELECT COUNT(*) FROM offered_course", &[]);
    assert_eq!(count, 0, "失败的批量开课必须整体回滚");
}
