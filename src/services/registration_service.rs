use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::{activities_repo, cart_items_repo, registrations_repo, users_repo};
use crate::models::{
    ActivitiesRow, RegistrationPaymentStatus, RegistrationStatus, RegistrationWithActivityRow,
    Role,
};
use crate::services::capacity;
use crate::services::error::{
    codes, duplicate_on_unique_violation, EnrollmentError, EnrollmentResult,
};
use crate::services::schedule;

#[derive(Debug)]
pub struct RegisterOutcome {
    pub registration_id: String,
    pub status: RegistrationStatus,
    /// Set when the activity is paid and a cart item was auto-created.
    pub cart_item_id: Option<String>,
}

/// Enrolls a student in an activity. Free activities are approved on the
/// spot; paid ones land as Pending/Unpaid with an auto-created cart item,
/// both written in one transaction.
pub async fn register(
    pool: &SqlitePool,
    student_user_id: &str,
    role: Role,
    activity_id: &str,
) -> EnrollmentResult<RegisterOutcome> {
    let activity = activities_repo::load_activity_by_id(pool, activity_id)
        .await?
        .ok_or(EnrollmentError::NotFound("activity"))?;

    if !activity.is_active() {
        return Err(EnrollmentError::precondition(
            codes::INACTIVE,
            "this activity is no longer open for registration",
        ));
    }
    let approved = activities_repo::approved_count(pool, activity_id).await?;
    if capacity::is_full(approved, activity.max_participants) {
        return Err(EnrollmentError::precondition(
            codes::FULL,
            "this activity is full",
        ));
    }
    if role != Role::Student {
        return Err(EnrollmentError::Forbidden);
    }
    if registrations_repo::find_live_by_student_activity(pool, student_user_id, activity_id)
        .await?
        .is_some()
    {
        return Err(EnrollmentError::precondition(
            codes::DUPLICATE,
            "you are already registered for this activity",
        ));
    }

    let approved_schedules =
        registrations_repo::list_approved_schedules_for_student(pool, student_user_id).await?;
    for existing in &approved_schedules {
        if schedule::overlaps(&activity.window(), &existing.window()) {
            return Err(EnrollmentError::precondition(
                codes::CONFLICT,
                format!("this activity clashes with '{}'", existing.title),
            ));
        }
    }

    let student = users_repo::load_user(pool, student_user_id)
        .await?
        .ok_or(EnrollmentError::NotFound("user"))?;

    let registration_id = Uuid::new_v4().to_string();
    let mut tx = pool.begin().await?;

    let (status, cart_item_id) = if activity.is_paid() {
        registrations_repo::insert_registration(
            &mut *tx,
            registrations_repo::NewRegistration {
                registration_id: &registration_id,
                user_id: student_user_id,
                student_id: student_user_id,
                parent_id: student.parent_id.as_deref(),
                activity_id,
                status: RegistrationStatus::Pending.as_str(),
                payment_status: RegistrationPaymentStatus::Unpaid.as_str(),
                notes: None,
            },
        )
        .await
        .map_err(|e| {
            duplicate_on_unique_violation(e, "you are already registered for this activity")
        })?;

        // An unpaid cart item may already exist, e.g. when re-registering
        // after a decline; reuse it rather than violating the one-per-pair
        // index.
        let cart_item_id = match cart_items_repo::find_unpaid_by_user_activity(
            &mut *tx,
            student_user_id,
            activity_id,
        )
        .await?
        {
            Some(existing) => existing.cart_item_id,
            None => {
                let cart_item_id = Uuid::new_v4().to_string();
                cart_items_repo::insert_cart_item(
                    &mut *tx,
                    &cart_item_id,
                    student_user_id,
                    activity_id,
                )
                .await
                .map_err(|e| {
                    duplicate_on_unique_violation(e, "this activity is already in your cart")
                })?;
                cart_item_id
            }
        };
        (RegistrationStatus::Pending, Some(cart_item_id))
    } else {
        let inserted = registrations_repo::insert_approved_if_capacity(
            &mut *tx,
            registrations_repo::NewRegistration {
                registration_id: &registration_id,
                user_id: student_user_id,
                student_id: student_user_id,
                parent_id: student.parent_id.as_deref(),
                activity_id,
                status: RegistrationStatus::Approved.as_str(),
                payment_status: RegistrationPaymentStatus::NotApplicable.as_str(),
                notes: None,
            },
        )
        .await
        .map_err(|e| {
            duplicate_on_unique_violation(e, "you are already registered for this activity")
        })?;
        if inserted == 0 {
            // Lost the last slot between the pre-check and the write.
            return Err(EnrollmentError::precondition(
                codes::FULL,
                "this activity is full",
            ));
        }
        (RegistrationStatus::Approved, None)
    };

    tx.commit().await?;

    info!(
        "student {} registered for activity {} ({})",
        student_user_id,
        activity_id,
        status.as_str()
    );
    Ok(RegisterOutcome {
        registration_id,
        status,
        cart_item_id,
    })
}

/// Cancels a registration. Allowed for the initiator, the student, the
/// parent, or an admin, and only before the activity starts. The row is kept
/// as history; a paid registration moves to RefundPending for the external
/// refund process.
pub async fn cancel(
    pool: &SqlitePool,
    registration_id: &str,
    actor_id: &str,
    actor_role: Role,
) -> EnrollmentResult<()> {
    let registration = registrations_repo::load_with_activity(pool, registration_id)
        .await?
        .ok_or(EnrollmentError::NotFound("registration"))?;

    if !may_cancel(&registration, actor_id, actor_role) {
        return Err(EnrollmentError::Forbidden);
    }
    if registration.start_date <= Utc::now().date_naive() {
        return Err(EnrollmentError::precondition(
            codes::ALREADY_STARTED,
            "cannot cancel a registration for an activity that has already started",
        ));
    }

    let notes = if actor_role == Role::Admin {
        "Cancelled by administrator"
    } else {
        "Cancelled by user"
    };
    let updated = registrations_repo::cancel(pool, registration_id, notes).await?;
    if updated == 0 {
        // Already Cancelled or Rejected; both are terminal.
        return Err(EnrollmentError::precondition(
            codes::ALREADY_PROCESSED,
            "this registration was already processed",
        ));
    }

    info!("registration {} cancelled by {}", registration_id, actor_id);
    Ok(())
}

fn may_cancel(reg: &RegistrationWithActivityRow, actor_id: &str, actor_role: Role) -> bool {
    actor_role == Role::Admin
        || reg.user_id == actor_id
        || reg.student_id == actor_id
        || reg.parent_id.as_deref() == Some(actor_id)
}

/// Admin approval of a Pending registration. Capacity is re-checked inside
/// the update, so approving cannot push an activity past its ceiling.
pub async fn approve(
    pool: &SqlitePool,
    registration_id: &str,
    actor_role: Role,
) -> EnrollmentResult<()> {
    if actor_role != Role::Admin {
        return Err(EnrollmentError::Forbidden);
    }
    let registration = registrations_repo::load_by_id(pool, registration_id)
        .await?
        .ok_or(EnrollmentError::NotFound("registration"))?;
    if registration.status != RegistrationStatus::Pending.as_str() {
        return Err(EnrollmentError::precondition(
            codes::ALREADY_PROCESSED,
            "this registration was already processed",
        ));
    }

    let updated = registrations_repo::approve_if_capacity(pool, registration_id).await?;
    if updated == 0 {
        // Zero rows means either the activity filled up or a concurrent
        // transition moved the row out of Pending; re-read to report which.
        let current = registrations_repo::load_by_id(pool, registration_id)
            .await?
            .ok_or(EnrollmentError::NotFound("registration"))?;
        if current.status != RegistrationStatus::Pending.as_str() {
            return Err(EnrollmentError::precondition(
                codes::ALREADY_PROCESSED,
                "this registration was already processed",
            ));
        }
        return Err(EnrollmentError::precondition(
            codes::FULL,
            "this activity is full",
        ));
    }

    info!("registration {} approved", registration_id);
    Ok(())
}

/// Admin decline. Soft-transitions the row to Rejected so enrollment history
/// survives, rather than deleting it.
pub async fn decline(
    pool: &SqlitePool,
    registration_id: &str,
    actor_role: Role,
) -> EnrollmentResult<()> {
    if actor_role != Role::Admin {
        return Err(EnrollmentError::Forbidden);
    }
    let registration = registrations_repo::load_by_id(pool, registration_id)
        .await?
        .ok_or(EnrollmentError::NotFound("registration"))?;
    if registration.status != RegistrationStatus::Pending.as_str() {
        return Err(EnrollmentError::precondition(
            codes::ALREADY_PROCESSED,
            "this registration was already processed",
        ));
    }

    registrations_repo::mark_rejected(pool, registration_id, Some("Declined by administrator"))
        .await?;

    info!("registration {} declined", registration_id);
    Ok(())
}

/// Everything the user initiated, attends, or parents, newest first.
pub async fn my_registrations(
    pool: &SqlitePool,
    user_id: &str,
) -> EnrollmentResult<Vec<RegistrationWithActivityRow>> {
    Ok(registrations_repo::list_for_user(pool, user_id).await?)
}

/// Derived read model for an activity's fill state.
pub struct CapacityView {
    pub approved_count: i64,
    pub max_participants: i64,
    pub available_slots: i64,
    pub is_full: bool,
}

pub async fn capacity_view(
    pool: &SqlitePool,
    activity: &ActivitiesRow,
) -> EnrollmentResult<CapacityView> {
    let approved = activities_repo::approved_count(pool, &activity.activity_id).await?;
    Ok(CapacityView {
        approved_count: approved,
        max_participants: activity.max_participants,
        available_slots: capacity::available_slots(approved, activity.max_participants),
        is_full: capacity::is_full(approved, activity.max_participants),
    })
}
