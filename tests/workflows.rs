use chrono::{NaiveDate, NaiveTime};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use school_portal::database::{self, activities_repo, payments_repo, registrations_repo};
use school_portal::models::{ActivityKind, Role};
use school_portal::services::error::{codes, EnrollmentError};
use school_portal::services::{
    activity_service, cart_service, interaction_service, registration_service,
};

async fn test_pool() -> SqlitePool {
    // Single connection so every task sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    database::apply_schema(&pool).await.unwrap();
    pool
}

async fn seed_user(pool: &SqlitePool, user_id: &str, role: Role, parent_id: Option<&str>) {
    sqlx::query("INSERT INTO users (user_id, full_name, role, parent_id) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(format!("User {}", user_id))
        .bind(role.as_str())
        .bind(parent_id)
        .execute(pool)
        .await
        .unwrap();
}

#[allow(clippy::too_many_arguments)]
async fn seed_activity(
    pool: &SqlitePool,
    activity_id: &str,
    kind: ActivityKind,
    price: i64,
    max_participants: i64,
    dates: (&str, &str),
    times: (&str, &str),
) {
    activities_repo::insert_activity(
        pool,
        activities_repo::NewActivity {
            activity_id,
            title: &format!("Activity {}", activity_id),
            description: "",
            activity_type: kind.as_str(),
            price,
            max_participants,
            location: "gym",
            start_date: d(dates.0),
            end_date: d(dates.1),
            start_time: t(times.0),
            end_time: t(times.1),
            status: "Published",
            created_by: "admin",
        },
    )
    .await
    .unwrap();
}

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn t(s: &str) -> NaiveTime {
    s.parse().unwrap()
}

fn precondition_code(err: &EnrollmentError) -> &'static str {
    match err {
        EnrollmentError::Precondition { code, .. } => *code,
        other => panic!("expected precondition error, got {:?}", other),
    }
}

#[tokio::test]
async fn free_registration_is_approved_without_cart_item() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_activity(
        &pool,
        "chess",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-14"),
        ("09:00:00", "10:00:00"),
    )
    .await;

    let outcome = registration_service::register(&pool, "student1", Role::Student, "chess")
        .await
        .unwrap();

    assert_eq!(outcome.status.as_str(), "Approved");
    assert!(outcome.cart_item_id.is_none());

    let reg = registrations_repo::load_by_id(&pool, &outcome.registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reg.status, "Approved");
    assert_eq!(reg.payment_status, "N/A");

    let cart = cart_service::list_cart(&pool, "student1").await.unwrap();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn paid_registration_is_pending_and_lands_in_cart() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "parent1", Role::Parent, None).await;
    seed_user(&pool, "student1", Role::Student, Some("parent1")).await;
    seed_activity(
        &pool,
        "robotics",
        ActivityKind::Paid,
        500_000,
        20,
        ("2999-07-01", "2999-07-10"),
        ("14:00:00", "16:00:00"),
    )
    .await;

    let outcome = registration_service::register(&pool, "student1", Role::Student, "robotics")
        .await
        .unwrap();

    assert_eq!(outcome.status.as_str(), "Pending");
    assert!(outcome.cart_item_id.is_some());

    let reg = registrations_repo::load_by_id(&pool, &outcome.registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reg.status, "Pending");
    assert_eq!(reg.payment_status, "Unpaid");
    assert_eq!(reg.parent_id.as_deref(), Some("parent1"));

    let cart = cart_service::list_cart(&pool, "student1").await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].activity_id, "robotics");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_activity(
        &pool,
        "chess",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-14"),
        ("09:00:00", "10:00:00"),
    )
    .await;

    registration_service::register(&pool, "student1", Role::Student, "chess")
        .await
        .unwrap();
    let err = registration_service::register(&pool, "student1", Role::Student, "chess")
        .await
        .unwrap_err();
    assert_eq!(precondition_code(&err), codes::DUPLICATE);
}

#[tokio::test]
async fn only_students_may_register() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "parent1", Role::Parent, None).await;
    seed_activity(
        &pool,
        "chess",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-14"),
        ("09:00:00", "10:00:00"),
    )
    .await;

    let err = registration_service::register(&pool, "parent1", Role::Parent, "chess")
        .await
        .unwrap_err();
    assert!(matches!(err, EnrollmentError::Forbidden));
}

#[tokio::test]
async fn registering_for_unknown_activity_fails() {
    let pool = test_pool().await;
    seed_user(&pool, "student1", Role::Student, None).await;

    let err = registration_service::register(&pool, "student1", Role::Student, "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, EnrollmentError::NotFound("activity")));
}

#[tokio::test]
async fn overlapping_approved_registration_blocks_register() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_activity(
        &pool,
        "x",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-10"),
        ("09:00:00", "11:00:00"),
    )
    .await;
    seed_activity(
        &pool,
        "y",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-10"),
        ("10:00:00", "12:00:00"),
    )
    .await;

    registration_service::register(&pool, "student1", Role::Student, "x")
        .await
        .unwrap();
    let err = registration_service::register(&pool, "student1", Role::Student, "y")
        .await
        .unwrap_err();
    assert_eq!(precondition_code(&err), codes::CONFLICT);
}

#[tokio::test]
async fn back_to_back_activities_do_not_conflict() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_activity(
        &pool,
        "morning",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-10"),
        ("09:00:00", "11:00:00"),
    )
    .await;
    seed_activity(
        &pool,
        "noon",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-10"),
        ("11:00:00", "13:00:00"),
    )
    .await;

    registration_service::register(&pool, "student1", Role::Student, "morning")
        .await
        .unwrap();
    registration_service::register(&pool, "student1", Role::Student, "noon")
        .await
        .unwrap();
}

#[tokio::test]
async fn capacity_holds_under_concurrent_registration_attempts() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    for i in 0..5 {
        seed_user(&pool, &format!("s{}", i), Role::Student, None).await;
    }
    seed_activity(
        &pool,
        "limited",
        ActivityKind::Free,
        0,
        2,
        ("2999-06-10", "2999-06-14"),
        ("09:00:00", "10:00:00"),
    )
    .await;

    let mut handles = Vec::new();
    for i in 0..5 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            let student = format!("s{}", i);
            registration_service::register(&pool, &student, Role::Student, "limited").await
        }));
    }

    let mut successes = 0;
    let mut full_failures = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => {
                assert_eq!(precondition_code(&err), codes::FULL);
                full_failures += 1;
            }
        }
    }
    assert_eq!(successes, 2);
    assert_eq!(full_failures, 3);

    let approved = activities_repo::approved_count(&pool, "limited").await.unwrap();
    assert_eq!(approved, 2);
}

#[tokio::test]
async fn cancel_keeps_row_and_parks_refund() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "parent1", Role::Parent, None).await;
    seed_activity(
        &pool,
        "swim",
        ActivityKind::Paid,
        300_000,
        20,
        ("2999-08-01", "2999-08-05"),
        ("08:00:00", "09:00:00"),
    )
    .await;

    let cart_item_id = cart_service::add_to_cart(&pool, "parent1", "swim").await.unwrap();
    let outcome = cart_service::checkout(&pool, "parent1", Role::Parent, &cart_item_id)
        .await
        .unwrap();

    registration_service::cancel(&pool, &outcome.registration_id, "parent1", Role::Parent)
        .await
        .unwrap();

    let reg = registrations_repo::load_by_id(&pool, &outcome.registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reg.status, "Cancelled");
    assert_eq!(reg.payment_status, "RefundPending");
}

#[tokio::test]
async fn cannot_cancel_once_activity_started() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_activity(
        &pool,
        "old",
        ActivityKind::Free,
        0,
        20,
        ("2020-01-01", "2020-01-05"),
        ("09:00:00", "10:00:00"),
    )
    .await;

    let outcome = registration_service::register(&pool, "student1", Role::Student, "old")
        .await
        .unwrap();
    let err = registration_service::cancel(&pool, &outcome.registration_id, "student1", Role::Student)
        .await
        .unwrap_err();
    assert_eq!(precondition_code(&err), codes::ALREADY_STARTED);
}

#[tokio::test]
async fn cancel_requires_a_tie_to_the_registration() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_user(&pool, "stranger", Role::Student, None).await;
    seed_activity(
        &pool,
        "chess",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-14"),
        ("09:00:00", "10:00:00"),
    )
    .await;

    let outcome = registration_service::register(&pool, "student1", Role::Student, "chess")
        .await
        .unwrap();
    let err = registration_service::cancel(&pool, &outcome.registration_id, "stranger", Role::Student)
        .await
        .unwrap_err();
    assert!(matches!(err, EnrollmentError::Forbidden));

    // Admins can always cancel.
    registration_service::cancel(&pool, &outcome.registration_id, "admin", Role::Admin)
        .await
        .unwrap();
}

#[tokio::test]
async fn approve_and_decline_only_work_from_pending() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_user(&pool, "student2", Role::Student, None).await;
    seed_activity(
        &pool,
        "robotics",
        ActivityKind::Paid,
        500_000,
        20,
        ("2999-07-01", "2999-07-10"),
        ("14:00:00", "16:00:00"),
    )
    .await;

    let first = registration_service::register(&pool, "student1", Role::Student, "robotics")
        .await
        .unwrap();
    let second = registration_service::register(&pool, "student2", Role::Student, "robotics")
        .await
        .unwrap();

    registration_service::approve(&pool, &first.registration_id, Role::Admin)
        .await
        .unwrap();
    let err = registration_service::approve(&pool, &first.registration_id, Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(precondition_code(&err), codes::ALREADY_PROCESSED);

    // Decline soft-transitions to Rejected; the row survives.
    registration_service::decline(&pool, &second.registration_id, Role::Admin)
        .await
        .unwrap();
    let declined = registrations_repo::load_by_id(&pool, &second.registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(declined.status, "Rejected");

    let err = registration_service::decline(&pool, &second.registration_id, Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(precondition_code(&err), codes::ALREADY_PROCESSED);
}

#[tokio::test]
async fn approve_requires_admin() {
    let pool = test_pool().await;
    seed_user(&pool, "student1", Role::Student, None).await;
    let err = registration_service::approve(&pool, "whatever", Role::Student)
        .await
        .unwrap_err();
    assert!(matches!(err, EnrollmentError::Forbidden));
}

#[tokio::test]
async fn free_activities_are_not_cart_eligible() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "parent1", Role::Parent, None).await;
    seed_activity(
        &pool,
        "chess",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-14"),
        ("09:00:00", "10:00:00"),
    )
    .await;

    let err = cart_service::add_to_cart(&pool, "parent1", "chess").await.unwrap_err();
    assert_eq!(precondition_code(&err), codes::NOT_CART_ELIGIBLE);
}

#[tokio::test]
async fn cart_rejects_duplicates_and_conflicts() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "parent1", Role::Parent, None).await;
    seed_activity(
        &pool,
        "swim",
        ActivityKind::Paid,
        300_000,
        20,
        ("2999-08-01", "2999-08-05"),
        ("08:00:00", "09:30:00"),
    )
    .await;
    seed_activity(
        &pool,
        "diving",
        ActivityKind::Paid,
        400_000,
        20,
        ("2999-08-03", "2999-08-07"),
        ("09:00:00", "10:00:00"),
    )
    .await;

    cart_service::add_to_cart(&pool, "parent1", "swim").await.unwrap();

    let err = cart_service::add_to_cart(&pool, "parent1", "swim").await.unwrap_err();
    assert_eq!(precondition_code(&err), codes::DUPLICATE);

    // diving overlaps swim on 08-03..08-05 between 09:00 and 09:30
    let err = cart_service::add_to_cart(&pool, "parent1", "diving").await.unwrap_err();
    assert_eq!(precondition_code(&err), codes::CONFLICT);
}

#[tokio::test]
async fn cart_removal_is_owner_scoped() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "parent1", Role::Parent, None).await;
    seed_user(&pool, "parent2", Role::Parent, None).await;
    seed_activity(
        &pool,
        "swim",
        ActivityKind::Paid,
        300_000,
        20,
        ("2999-08-01", "2999-08-05"),
        ("08:00:00", "09:00:00"),
    )
    .await;

    let item = cart_service::add_to_cart(&pool, "parent1", "swim").await.unwrap();

    let err = cart_service::remove_from_cart(&pool, "parent2", &item).await.unwrap_err();
    assert!(matches!(err, EnrollmentError::NotFound("cart item")));

    cart_service::remove_from_cart(&pool, "parent1", &item).await.unwrap();
    assert!(cart_service::list_cart(&pool, "parent1").await.unwrap().is_empty());
}

#[tokio::test]
async fn checkout_creates_paid_registration_payment_and_full_status() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "parent1", Role::Parent, None).await;
    seed_activity(
        &pool,
        "violin",
        ActivityKind::Paid,
        750_000,
        1,
        ("2999-09-01", "2999-09-30"),
        ("17:00:00", "18:00:00"),
    )
    .await;

    let item = cart_service::add_to_cart(&pool, "parent1", "violin").await.unwrap();
    let outcome = cart_service::checkout(&pool, "parent1", Role::Parent, &item)
        .await
        .unwrap();

    assert_eq!(outcome.amount, 750_000);
    assert!(outcome.transaction_id.starts_with("SIM-"));

    let reg = registrations_repo::load_by_id(&pool, &outcome.registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reg.status, "Approved");
    assert_eq!(reg.payment_status, "Paid");

    let payments = payments_repo::count_for_registration(&pool, &outcome.registration_id)
        .await
        .unwrap();
    assert_eq!(payments, 1);

    // Capacity 1 is now consumed: the activity flips to Full.
    let activity = activities_repo::load_activity_by_id(&pool, "violin")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(activity.status, "Full");

    assert!(cart_service::list_cart(&pool, "parent1").await.unwrap().is_empty());
}

#[tokio::test]
async fn checkout_is_idempotent() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "parent1", Role::Parent, None).await;
    seed_activity(
        &pool,
        "violin",
        ActivityKind::Paid,
        750_000,
        5,
        ("2999-09-01", "2999-09-30"),
        ("17:00:00", "18:00:00"),
    )
    .await;

    let item = cart_service::add_to_cart(&pool, "parent1", "violin").await.unwrap();
    let outcome = cart_service::checkout(&pool, "parent1", Role::Parent, &item)
        .await
        .unwrap();

    // The consumed cart item reads as gone; no second payment appears.
    let err = cart_service::checkout(&pool, "parent1", Role::Parent, &item)
        .await
        .unwrap_err();
    assert!(matches!(err, EnrollmentError::NotFound("cart item")));

    let payments = payments_repo::count_for_registration(&pool, &outcome.registration_id)
        .await
        .unwrap();
    assert_eq!(payments, 1);
}

#[tokio::test]
async fn checkout_fails_on_full_activity_without_payment() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "parent1", Role::Parent, None).await;
    seed_user(&pool, "parent2", Role::Parent, None).await;
    seed_activity(
        &pool,
        "violin",
        ActivityKind::Paid,
        750_000,
        1,
        ("2999-09-01", "2999-09-30"),
        ("17:00:00", "18:00:00"),
    )
    .await;

    // Both carts fill while the slot is still open.
    let item1 = cart_service::add_to_cart(&pool, "parent1", "violin").await.unwrap();
    let item2 = cart_service::add_to_cart(&pool, "parent2", "violin").await.unwrap();

    cart_service::checkout(&pool, "parent1", Role::Parent, &item1)
        .await
        .unwrap();

    let err = cart_service::checkout(&pool, "parent2", Role::Parent, &item2)
        .await
        .unwrap_err();
    assert_eq!(precondition_code(&err), codes::FULL);

    let total_payments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total_payments, 1);

    // The stale item was dropped from the losing cart.
    assert!(cart_service::list_cart(&pool, "parent2").await.unwrap().is_empty());
}

#[tokio::test]
async fn students_cannot_checkout() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_activity(
        &pool,
        "robotics",
        ActivityKind::Paid,
        500_000,
        20,
        ("2999-07-01", "2999-07-10"),
        ("14:00:00", "16:00:00"),
    )
    .await;

    let outcome = registration_service::register(&pool, "student1", Role::Student, "robotics")
        .await
        .unwrap();
    let item = outcome.cart_item_id.unwrap();

    let err = cart_service::checkout(&pool, "student1", Role::Student, &item)
        .await
        .unwrap_err();
    assert!(matches!(err, EnrollmentError::Forbidden));
}

#[tokio::test]
async fn activity_creation_enforces_role_validation_and_schedule() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "teacher1", Role::Teacher, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;

    let input = |title: &str, times: (&str, &str)| activity_service::NewActivityInput {
        title: title.to_string(),
        description: String::new(),
        activity_type: ActivityKind::Free,
        price: 0,
        max_participants: 10,
        location: "field".to_string(),
        start_date: d("2999-05-01"),
        end_date: d("2999-05-10"),
        start_time: t(times.0),
        end_time: t(times.1),
    };

    let err = activity_service::create_activity(
        &pool,
        "student1",
        Role::Student,
        input("Football", ("09:00:00", "10:00:00")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EnrollmentError::Forbidden));

    let err = activity_service::create_activity(
        &pool,
        "teacher1",
        Role::Teacher,
        input("Football", ("10:00:00", "09:00:00")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EnrollmentError::Validation(_)));

    activity_service::create_activity(
        &pool,
        "teacher1",
        Role::Teacher,
        input("Football", ("09:00:00", "10:00:00")),
    )
    .await
    .unwrap();

    // Second published activity in the same slot is refused.
    let err = activity_service::create_activity(
        &pool,
        "admin",
        Role::Admin,
        input("Hockey", ("09:30:00", "10:30:00")),
    )
    .await
    .unwrap_err();
    assert_eq!(precondition_code(&err), codes::CONFLICT);
}

#[tokio::test]
async fn declined_student_can_register_again() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_activity(
        &pool,
        "robotics",
        ActivityKind::Paid,
        500_000,
        20,
        ("2999-07-01", "2999-07-10"),
        ("14:00:00", "16:00:00"),
    )
    .await;

    let first = registration_service::register(&pool, "student1", Role::Student, "robotics")
        .await
        .unwrap();
    registration_service::decline(&pool, &first.registration_id, Role::Admin)
        .await
        .unwrap();

    // The Rejected row is history and does not hold the slot.
    let second = registration_service::register(&pool, "student1", Role::Student, "robotics")
        .await
        .unwrap();
    assert_ne!(first.registration_id, second.registration_id);
    assert_eq!(second.status.as_str(), "Pending");

    // The unpaid cart item from the first attempt is reused, not duplicated.
    assert_eq!(second.cart_item_id, first.cart_item_id);
    let cart = cart_service::list_cart(&pool, "student1").await.unwrap();
    assert_eq!(cart.len(), 1);

    let declined = registrations_repo::load_by_id(&pool, &first.registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(declined.status, "Rejected");
}

#[tokio::test]
async fn rejected_registration_cannot_be_cancelled() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_activity(
        &pool,
        "robotics",
        ActivityKind::Paid,
        500_000,
        20,
        ("2999-07-01", "2999-07-10"),
        ("14:00:00", "16:00:00"),
    )
    .await;

    let outcome = registration_service::register(&pool, "student1", Role::Student, "robotics")
        .await
        .unwrap();
    registration_service::decline(&pool, &outcome.registration_id, Role::Admin)
        .await
        .unwrap();

    let err = registration_service::cancel(&pool, &outcome.registration_id, "admin", Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(precondition_code(&err), codes::ALREADY_PROCESSED);

    let reg = registrations_repo::load_by_id(&pool, &outcome.registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reg.status, "Rejected");
}

#[tokio::test]
async fn approve_on_consumed_capacity_reports_full_not_processed() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_user(&pool, "student2", Role::Student, None).await;
    seed_activity(
        &pool,
        "violin",
        ActivityKind::Paid,
        750_000,
        1,
        ("2999-09-01", "2999-09-30"),
        ("17:00:00", "18:00:00"),
    )
    .await;

    let first = registration_service::register(&pool, "student1", Role::Student, "violin")
        .await
        .unwrap();
    let second = registration_service::register(&pool, "student2", Role::Student, "violin")
        .await
        .unwrap();

    registration_service::approve(&pool, &first.registration_id, Role::Admin)
        .await
        .unwrap();

    // The second row is still Pending, so the refusal is about capacity.
    let err = registration_service::approve(&pool, &second.registration_id, Role::Admin)
        .await
        .unwrap_err();
    assert_eq!(precondition_code(&err), codes::FULL);

    let reg = registrations_repo::load_by_id(&pool, &second.registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reg.status, "Pending");
}

#[tokio::test]
async fn my_registrations_scope_and_order() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "parent1", Role::Parent, None).await;
    seed_user(&pool, "student1", Role::Student, Some("parent1")).await;
    seed_user(&pool, "stranger", Role::Student, None).await;
    seed_activity(
        &pool,
        "chess",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-14"),
        ("09:00:00", "10:00:00"),
    )
    .await;
    seed_activity(
        &pool,
        "robotics",
        ActivityKind::Paid,
        500_000,
        20,
        ("2999-07-01", "2999-07-10"),
        ("14:00:00", "16:00:00"),
    )
    .await;

    let older = registration_service::register(&pool, "student1", Role::Student, "chess")
        .await
        .unwrap();
    let newer = registration_service::register(&pool, "student1", Role::Student, "robotics")
        .await
        .unwrap();

    // Pin the timestamps so the ordering assertion cannot tie.
    for (id, at) in [
        (&older.registration_id, "2999-01-01 08:00:00"),
        (&newer.registration_id, "2999-01-02 08:00:00"),
    ] {
        sqlx::query("UPDATE registrations SET registered_at = ? WHERE registration_id = ?")
            .bind(at)
            .bind(id)
            .execute(&pool)
            .await
            .unwrap();
    }

    let mine = registration_service::my_registrations(&pool, "student1").await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].activity_id, "robotics");
    assert_eq!(mine[1].activity_id, "chess");

    // The parent sees the same rows through the parent link.
    let parents = registration_service::my_registrations(&pool, "parent1").await.unwrap();
    assert_eq!(parents.len(), 2);

    let strangers = registration_service::my_registrations(&pool, "stranger").await.unwrap();
    assert!(strangers.is_empty());
}

#[tokio::test]
async fn cancellation_notes_record_who_cancelled() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_user(&pool, "student2", Role::Student, None).await;
    seed_activity(
        &pool,
        "chess",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-14"),
        ("09:00:00", "10:00:00"),
    )
    .await;

    let own = registration_service::register(&pool, "student1", Role::Student, "chess")
        .await
        .unwrap();
    let other = registration_service::register(&pool, "student2", Role::Student, "chess")
        .await
        .unwrap();

    registration_service::cancel(&pool, &own.registration_id, "student1", Role::Student)
        .await
        .unwrap();
    registration_service::cancel(&pool, &other.registration_id, "admin", Role::Admin)
        .await
        .unwrap();

    let by_user = registrations_repo::load_by_id(&pool, &own.registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_user.notes.as_deref(), Some("Cancelled by user"));

    let by_admin = registrations_repo::load_by_id(&pool, &other.registration_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_admin.notes.as_deref(), Some("Cancelled by administrator"));
}

#[tokio::test]
async fn like_toggles_and_comments_insert() {
    let pool = test_pool().await;
    seed_user(&pool, "admin", Role::Admin, None).await;
    seed_user(&pool, "student1", Role::Student, None).await;
    seed_activity(
        &pool,
        "chess",
        ActivityKind::Free,
        0,
        20,
        ("2999-06-10", "2999-06-14"),
        ("09:00:00", "10:00:00"),
    )
    .await;

    let first = interaction_service::toggle_like(&pool, "student1", "chess").await.unwrap();
    assert!(first.liked);
    assert_eq!(first.likes_count, 1);

    let second = interaction_service::toggle_like(&pool, "student1", "chess").await.unwrap();
    assert!(!second.liked);
    assert_eq!(second.likes_count, 0);

    let err = interaction_service::add_comment(&pool, "student1", "chess", "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, EnrollmentError::Validation(_)));

    let comment = interaction_service::add_comment(&pool, "student1", "chess", "great club")
        .await
        .unwrap();
    assert_eq!(comment.content, "great club");
    assert_eq!(comment.user_name, "User student1");
}
