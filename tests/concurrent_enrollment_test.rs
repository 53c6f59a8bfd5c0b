// ==========================================
// 并发选课集成测试
// ==========================================
// 测试目标: 多连接并发抢同一教学班时容量绝不超额，
//           成功数恰好等于容量
// ==========================================


use course_registration::api::EnrollmentApi;
use course_registration::logging;
use std::thread;

const CAPACITY: i32 = 3;
const STUDENTS: usize = 8;

#[test]
fn test_concurrent_enrollment_respects_capacity() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
        test_helpers::seed_registration(&guard, "R1", "S1", "ONGOING", 3, 9);
        test_helpers::seed_course(&guard, "C1", "Algorithms", "CS201", 3);
        test_helpers::seed_offered_course(&guard, "OC1", "C1", "D1", "R1");
        test_helpers::seed_section(&guard, "SEC1", "Section A", CAPACITY, "OC1", "R1");
        for i in 0..STUDENTS {
            test_helpers::seed_student(
                &guard,
                &format!("ST{i}"),
                &format!("2026-{i:04}"),
                "D1",
            );
        }
    }

    // 先在各自连接上启动注册，避免与抢名额的写混在一起
    for i in 0..STUDENTS {
        let conn = test_helpers::open_shared_connection(&db_path);
        let api = EnrollmentApi::new(conn);
        api.start_my_registration(&format!("2026-{i:04}"))
            .expect("启动注册失败");
    }

    // 每个线程独立连接，同时抢同一教学班
    let handles: Vec<_> = (0..STUDENTS)
        .map(|i| {
            let db_path = db_path.clone();
            thread::spawn(move || {
                let conn = test_helpers::open_shared_connection(&db_path);
                let api = EnrollmentApi::new(conn);
                api.enroll_into_course(&format!("2026-{i:04}"), "OC1", "SEC1")
                    .is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().expect("线程 panic"))
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, CAPACITY as usize, "成功数必须等于容量");

    let conn = test_helpers::open_shared_connection(&db_path);
    let guard = conn.lock().unwrap();
    let enrolled = test_helpers::query_i64(
        &guard,
        "SELECT currently_enrolled FROM offered_course_section WHERE id = 'SEC1'",
        &[],
    );
    assert_eq!(enrolled, i64::from(CAPACITY), "容量计数不得超额");

    let records = test_helpers::query_i64(
        &guard,
        "SELECT COUNT(*) FROM student_semester_registration_course
         WHERE offered_course_section_id = 'SEC1'",
        &[],
    );
    assert_eq!(records, i64::from(CAPACITY), "选课记录数与计数一致");
}
