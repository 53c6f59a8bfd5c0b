// ==========================================
// 学生选课集成测试
// ==========================================
// 测试目标: 选课三写原子性、容量不变量、重复选课拒绝、
//           退课对称回滚、确认注册的学分区间
// ==========================================


use course_registration::api::{ApiError, EnrollmentApi};
use course_registration::logging;

/// 一个 ONGOING 周期 + 一名学生 + 一门 3 学分课程（容量 2）
fn setup() -> (tempfile::NamedTempFile, String) {
    let (temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
        test_helpers::seed_registration(&guard, "R1", "S1", "ONGOING", 3, 9);
        test_helpers::seed_student(&guard, "ST1", "2026-0001", "D1");
        test_helpers::seed_student(&guard, "ST2", "2026-0002", "D1");
        test_helpers::seed_student(&guard, "ST3", "2026-0003", "D1");
        test_helpers::seed_course(&guard, "C1", "Algorithms", "CS201", 3);
        test_helpers::seed_course(&guard, "C2", "Databases", "CS301", 3);
        test_helpers::seed_offered_course(&guard, "OC1", "C1", "D1", "R1");
        test_helpers::seed_offered_course(&guard, "OC2", "C2", "D1", "R1");
        test_helpers::seed_section(&guard, "SEC1", "Section A", 2, "OC1", "R1");
        test_helpers::seed_section(&guard, "SEC2", "Section A", 30, "OC2", "R1");
    }
    (temp_file, db_path)
}

#[test]
fn test_enroll_updates_capacity_and_credits() {
    logging::init_test();
    let (_temp_file, db_path) = setup();

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = EnrollmentApi::new(conn.clone());

    api.start_my_registration("2026-0001")
        .expect("启动注册应成功");
    api.enroll_into_course("2026-0001", "OC1", "SEC1")
        .expect("选课应成功");

    let guard = conn.lock().unwrap();
    let enrolled = test_helpers::query_i64(
        &guard,
        "SELECT currently_enrolled FROM offered_course_section WHERE id = 'SEC1'",
        &[],
    );
    assert_eq!(enrolled, 1);
    let credits = test_helpers::query_i64(
        &guard,
        "SELECT total_credits_taken FROM student_semester_registration WHERE student_id = 'ST1'",
        &[],
    );
    assert_eq!(credits, 3);
}

#[test]
fn test_duplicate_enrollment_rejected() {
    logging::init_test();
    let (_temp_file, db_path) = setup();

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = EnrollmentApi::new(conn.clone());

    api.start_my_registration("2026-0001")
        .expect("启动注册应成功");
    api.enroll_into_course("2026-0001", "OC1", "SEC1")
        .expect("首次选课应成功");

    let duplicate = api.enroll_into_course("2026-0001", "OC1", "SEC1");
    assert!(matches!(duplicate, Err(ApiError::Conflict(_))));

    // 重复选课失败后容量与学分不变
    let guard = conn.lock().unwrap();
    let enrolled = test_helpers::query_i64(
        &guard,
        "SELECT currently_enrolled FROM offered_course_section WHERE id = 'SEC1'",
        &[],
    );
    assert_eq!(enrolled, 1);
    let credits = test_helpers::query_i64(
        &guard,
        "SELECT total_credits_taken FROM student_semester_registration WHERE student_id = 'ST1'",
        &[],
    );
    assert_eq!(credits, 3);
}

#[test]
fn test_capacity_never_exceeded() {
    logging::init_test();
    let (_temp_file, db_path) = setup();

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = EnrollmentApi::new(conn.clone());

    for code in ["2026-0001", "2026-0002", "2026-0003"] {
        api.start_my_registration(code).expect("启动注册应成功");
    }

    api.enroll_into_course("2026-0001", "OC1", "SEC1")
        .expect("第 1 人选课应成功");
    api.enroll_into_course("2026-0002", "OC1", "SEC1")
        .expect("第 2 人选课应成功");

    // 容量 2，满班后拒绝
    let full = api.enroll_into_course("2026-0003", "OC1", "SEC1");
    assert!(matches!(full, Err(ApiError::CapacityExceeded(_))));

    let guard = conn.lock().unwrap();
    let enrolled = test_helpers::query_i64(
        &guard,
        "SELECT currently_enrolled FROM offered_course_section WHERE id = 'SEC1'",
        &[],
    );
    assert_eq!(enrolled, 2);
    // 满班拒绝不留下选课记录
    let records = test_helpers::query_i64(
        &guard,
        "SELECT COUNT(*) FROM student_semester_registration_course WHERE student_id = 'ST3'",
        &[],
    );
    assert_eq!(records, 0);
}

#[test]
fn test_withdraw_round_trip() {
    logging::init_test();
    let (_temp_file, db_path) = setup();

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = EnrollmentApi::new(conn.clone());

    api.start_my_registration("2026-0001")
        .expect("启动注册应成功");
    api.enroll_into_course("2026-0001", "OC1", "SEC1")
        .expect("选课应成功");
    api.withdraw_from_course("2026-0001", "OC1")
        .expect("退课应成功");

    // 选课 + 退课后一切回到原点，可再次选课
    let guard = conn.lock().unwrap();
    let enrolled = test_helpers::query_i64(
        &guard,
        "SELECT currently_enrolled FROM offered_course_section WHERE id = 'SEC1'",
        &[],
    );
    assert_eq!(enrolled, 0);
    let credits = test_helpers::query_i64(
        &guard,
        "SELECT total_credits_taken FROM student_semester_registration WHERE student_id = 'ST1'",
        &[],
    );
    assert_eq!(credits, 0);
    drop(guard);

    api.enroll_into_course("2026-0001", "OC1", "SEC1")
        .expect("退课后可再次选课");

    // 未选过的课程退课 → NotFound
    let missing = api.withdraw_from_course("2026-0002", "OC1");
    assert!(matches!(missing, Err(ApiError::NotFound { .. })));
}

#[test]
fn test_confirm_registration_credit_bounds() {
    logging::init_test();
    let (_temp_file, db_path) = setup();

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = EnrollmentApi::new(conn.clone());

    api.start_my_registration("2026-0001")
        .expect("启动注册应成功");

    // 0 学分不得确认
    let empty = api.confirm_my_registration("2026-0001");
    assert!(matches!(empty, Err(ApiError::InvalidState(_))));

    // 3 学分在 [3, 9] 内，可确认
    api.enroll_into_course("2026-0001", "OC1", "SEC1")
        .expect("选课应成功");
    api.confirm_my_registration("2026-0001")
        .expect("学分达标应可确认");

    let my_reg = api.get_my_registration("2026-0001").expect("查询注册失败");
    assert!(my_reg.student_registration.unwrap().is_confirmed);
}

#[test]
fn test_confirm_rejected_above_max_credit() {
    logging::init_test();
    let (temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
        // 上限 5 学分
        test_helpers::seed_registration(&guard, "R1", "S1", "ONGOING", 3, 5);
        test_helpers::seed_student(&guard, "ST1", "2026-0001", "D1");
        test_helpers::seed_course(&guard, "C1", "Algorithms", "CS201", 3);
        test_helpers::seed_course(&guard, "C2", "Databases", "CS301", 3);
        test_helpers::seed_offered_course(&guard, "OC1", "C1", "D1", "R1");
        test_helpers::seed_offered_course(&guard, "OC2", "C2", "D1", "R1");
        test_helpers::seed_section(&guard, "SEC1", "Section A", 30, "OC1", "R1");
        test_helpers::seed_section(&guard, "SEC2", "Section A", 30, "OC2", "R1");
    }
    let _keep_alive = temp_file;

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = EnrollmentApi::new(conn);

    api.start_my_registration("2026-0001")
        .expect("启动注册应成功");
    api.enroll_into_course("2026-0001", "OC1", "SEC1")
        .expect("选课应成功");
    api.enroll_into_course("2026-0001", "OC2", "SEC2")
        .expect("选课应成功");

    // 6 学分超出上限 5
    let over = api.confirm_my_registration("2026-0001");
    assert!(matches!(over, Err(ApiError::InvalidState(_))));
}

#[test]
fn test_upcoming_cycle_blocks_enrollment_flow() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
        test_helpers::seed_registration(&guard, "R1", "S1", "UPCOMING", 3, 9);
        test_helpers::seed_student(&guard, "ST1", "2026-0001", "D1");
    }

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = EnrollmentApi::new(conn);

    let blocked = api.start_my_registration("2026-0001");
    assert!(matches!(blocked, Err(ApiError::InvalidState(_))));
}
