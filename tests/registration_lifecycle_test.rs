// ==========================================
// 注册周期生命周期集成测试
// ==========================================
// 测试目标: 活跃周期唯一性、状态单调推进、终态拒绝
// ==========================================


use chrono::NaiveDate;
use course_registration::api::{
    ApiError, CreateSemesterRegistrationInput, SemesterRegistrationApi,
    UpdateSemesterRegistrationInput,
};
use course_registration::domain::types::SemesterRegistrationStatus;
use course_registration::logging;

fn create_input(semester_id: &str) -> CreateSemesterRegistrationInput {
    CreateSemesterRegistrationInput {
        academic_semester_id: semester_id.to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        min_credit: 6,
        max_credit: 18,
    }
}

#[test]
fn test_single_active_registration() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
        test_helpers::seed_semester(&guard, "S2", "Fall 2026", 2026);
    }

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = SemesterRegistrationApi::new(conn).expect("创建 API 失败");

    let first = api
        .create_semester_registration(&create_input("S1"))
        .expect("首个注册周期应创建成功");
    assert_eq!(first.status, SemesterRegistrationStatus::Upcoming);

    // 已有活跃周期时必须拒绝
    let second = api.create_semester_registration(&create_input("S2"));
    assert!(matches!(second, Err(ApiError::Conflict(_))));
}

#[test]
fn test_status_monotonic_progression() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
    }

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = SemesterRegistrationApi::new(conn).expect("创建 API 失败");

    let reg = api
        .create_semester_registration(&create_input("S1"))
        .expect("创建注册周期失败");

    // UPCOMING → ENDED 跳级被拒
    let skip = api.update_semester_registration(
        &reg.id,
        &UpdateSemesterRegistrationInput {
            status: Some(SemesterRegistrationStatus::Ended),
            ..Default::default()
        },
    );
    assert!(matches!(skip, Err(ApiError::InvalidState(_))));

    // UPCOMING → ONGOING → ENDED 逐级推进
    let ongoing = api
        .update_semester_registration(
            &reg.id,
            &UpdateSemesterRegistrationInput {
                status: Some(SemesterRegistrationStatus::Ongoing),
                ..Default::default()
            },
        )
        .expect("UPCOMING → ONGOING 应成功");
    assert_eq!(ongoing.status, SemesterRegistrationStatus::Ongoing);

    let ended = api
        .update_semester_registration(
            &reg.id,
            &UpdateSemesterRegistrationInput {
                status: Some(SemesterRegistrationStatus::Ongoing),
                start_date: Some(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()),
                ..Default::default()
            },
        )
        .expect("同状态 + 日期调整应成功");
    assert_eq!(ended.start_date, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());

    let ended = api
        .update_semester_registration(
            &reg.id,
            &UpdateSemesterRegistrationInput {
                status: Some(SemesterRegistrationStatus::Ended),
                ..Default::default()
            },
        )
        .expect("ONGOING → ENDED 应成功");
    assert_eq!(ended.status, SemesterRegistrationStatus::Ended);

    // ENDED 为终态
    let revive = api.update_semester_registration(
        &reg.id,
        &UpdateSemesterRegistrationInput {
            status: Some(SemesterRegistrationStatus::Ongoing),
            ..Default::default()
        },
    );
    assert!(matches!(revive, Err(ApiError::InvalidState(_))));
}

#[test]
fn test_ended_cycle_frees_active_slot() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
        test_helpers::seed_semester(&guard, "S2", "Fall 2026", 2026);
        test_helpers::seed_registration(&guard, "R1", "S1", "ENDED", 6, 18);
    }

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = SemesterRegistrationApi::new(conn).expect("创建 API 失败");

    // 历史周期已 ENDED，新周期可创建
    let reg = api
        .create_semester_registration(&create_input("S2"))
        .expect("ENDED 周期不占用活跃名额");
    assert_eq!(reg.academic_semester_id, "S2");
}

#[test]
fn test_delete_registration() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    {
        let conn = test_helpers::open_shared_connection(&db_path);
        let guard = conn.lock().unwrap();
        test_helpers::seed_semester(&guard, "S1", "Spring 2026", 2026);
    }

    let conn = test_helpers::open_shared_connection(&db_path);
    let api = SemesterRegistrationApi::new(conn).expect("创建 API 失败");

    let reg = api
        .create_semester_registration(&create_input("S1"))
        .expect("创建注册周期失败");

    api.delete_semester_registration(&reg.id)
        .expect("删除应成功");
    assert!(api.get_semester_registration(&reg.id).unwrap().is_none());

    let missing = api.delete_semester_registration(&reg.id);
    assert!(matches!(missing, Err(ApiError::NotFound { .. })));
}
