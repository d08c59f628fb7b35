use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::{activities_repo, cart_items_repo, payments_repo, registrations_repo};
use crate::models::{
    ActivityStatus, CartItemWithActivityRow, PaymentStatus, RegistrationPaymentStatus,
    RegistrationStatus, Role,
};
use crate::services::capacity;
use crate::services::error::{
    codes, duplicate_on_unique_violation, EnrollmentError, EnrollmentResult,
};
use crate::services::schedule::{self, ActivityWindow};

/// Puts a paid activity in the user's cart. Free activities never enter the
/// cart, and the candidate may not clash with anything already in the cart
/// nor with any live registration the user is tied to.
pub async fn add_to_cart(
    pool: &SqlitePool,
    user_id: &str,
    activity_id: &str,
) -> EnrollmentResult<String> {
    let activity = activities_repo::load_activity_by_id(pool, activity_id)
        .await?
        .ok_or(EnrollmentError::NotFound("activity"))?;

    if !activity.is_paid() {
        return Err(EnrollmentError::precondition(
            codes::NOT_CART_ELIGIBLE,
            "free activities do not need the cart",
        ));
    }
    let approved = activities_repo::approved_count(pool, activity_id).await?;
    if capacity::is_full(approved, activity.max_participants) {
        return Err(EnrollmentError::precondition(
            codes::FULL,
            "this activity is full",
        ));
    }
    if !activity.is_active() {
        return Err(EnrollmentError::precondition(
            codes::INACTIVE,
            "this activity is no longer open for registration",
        ));
    }
    if cart_items_repo::find_unpaid_by_user_activity(pool, user_id, activity_id)
        .await?
        .is_some()
    {
        return Err(EnrollmentError::precondition(
            codes::DUPLICATE,
            "this activity is already in your cart",
        ));
    }
    if registrations_repo::find_live_for_activity_tied_to_user(pool, user_id, activity_id)
        .await?
        .is_some()
    {
        return Err(EnrollmentError::precondition(
            codes::DUPLICATE,
            "you are already registered for this activity",
        ));
    }

    let window = activity.window();

    let cart_rows = cart_items_repo::list_unpaid_with_activity(pool, user_id).await?;
    for item in &cart_rows {
        if schedule::overlaps(&window, &cart_window(item)) {
            return Err(EnrollmentError::precondition(
                codes::CONFLICT,
                format!("this activity clashes with '{}' in your cart", item.title),
            ));
        }
    }

    let registered = registrations_repo::list_live_schedules_for_user(pool, user_id, activity_id)
        .await?;
    for existing in &registered {
        if schedule::overlaps(&window, &existing.window()) {
            return Err(EnrollmentError::precondition(
                codes::CONFLICT,
                format!(
                    "this activity clashes with '{}' you are registered for",
                    existing.title
                ),
            ));
        }
    }

    let cart_item_id = Uuid::new_v4().to_string();
    cart_items_repo::insert_cart_item(pool, &cart_item_id, user_id, activity_id)
        .await
        .map_err(|e| duplicate_on_unique_violation(e, "this activity is already in your cart"))?;

    info!("user {} added activity {} to cart", user_id, activity_id);
    Ok(cart_item_id)
}

/// Removes the caller's own unpaid cart item; paid or foreign items read as
/// not found.
pub async fn remove_from_cart(
    pool: &SqlitePool,
    user_id: &str,
    cart_item_id: &str,
) -> EnrollmentResult<()> {
    let deleted = cart_items_repo::delete_unpaid_owned(pool, cart_item_id, user_id).await?;
    if deleted == 0 {
        return Err(EnrollmentError::NotFound("cart item"));
    }
    info!("user {} removed cart item {}", user_id, cart_item_id);
    Ok(())
}

pub async fn list_cart(
    pool: &SqlitePool,
    user_id: &str,
) -> EnrollmentResult<Vec<CartItemWithActivityRow>> {
    Ok(cart_items_repo::list_unpaid_with_activity(pool, user_id).await?)
}

#[derive(Debug)]
pub struct CheckoutOutcome {
    pub registration_id: String,
    pub payment_id: String,
    pub transaction_id: String,
    pub amount: i64,
}

/// Converts an unpaid cart item into an Approved, Paid registration plus a
/// simulated payment record, as one transaction. Restricted to non-Student
/// roles: a parent or admin settles the bill.
///
/// The cart item is consumed with a conditional update before the payment is
/// written, so checking the same item out twice can never produce two
/// payments; the registration write re-checks capacity, so a full activity
/// rolls the whole unit back.
pub async fn checkout(
    pool: &SqlitePool,
    actor_id: &str,
    actor_role: Role,
    cart_item_id: &str,
) -> EnrollmentResult<CheckoutOutcome> {
    if actor_role == Role::Student {
        return Err(EnrollmentError::Forbidden);
    }

    let mut tx = pool.begin().await?;

    let item = cart_items_repo::load_unpaid_owned(&mut *tx, cart_item_id, actor_id)
        .await?
        .ok_or(EnrollmentError::NotFound("cart item"))?;

    let approved = activities_repo::approved_count(&mut *tx, &item.activity_id).await?;
    let full = capacity::is_full(approved, item.max_participants);
    if item.is_active == 0 || full {
        // Stale entry: drop it from the cart before reporting the failure.
        cart_items_repo::delete_unpaid_owned(&mut *tx, cart_item_id, actor_id).await?;
        tx.commit().await?;
        return Err(if full {
            EnrollmentError::precondition(codes::FULL, "this activity is full")
        } else {
            EnrollmentError::precondition(
                codes::INACTIVE,
                "this activity is no longer open for registration",
            )
        });
    }

    let window = cart_window(&item);
    let registered =
        registrations_repo::list_live_schedules_for_user(&mut *tx, actor_id, &item.activity_id)
            .await?;
    for existing in &registered {
        if schedule::overlaps(&window, &existing.window()) {
            return Err(EnrollmentError::precondition(
                codes::CONFLICT,
                format!(
                    "this activity clashes with '{}' you are registered for",
                    existing.title
                ),
            ));
        }
    }

    let consumed = cart_items_repo::mark_paid(&mut *tx, cart_item_id).await?;
    if consumed == 0 {
        return Err(EnrollmentError::precondition(
            codes::ALREADY_PROCESSED,
            "this cart item was already paid",
        ));
    }

    // A paid register() left a Pending row behind; flip it. Otherwise create
    // the registration fresh. Both writes carry the capacity guard.
    let existing = registrations_repo::find_live_for_activity_tied_to_user(
        &mut *tx,
        actor_id,
        &item.activity_id,
    )
    .await?;
    let registration_id = match existing {
        Some(reg) if reg.status == RegistrationStatus::Pending.as_str() => {
            let updated =
                registrations_repo::mark_paid_approved_if_capacity(&mut *tx, &reg.registration_id)
                    .await?;
            if updated == 0 {
                return Err(EnrollmentError::precondition(
                    codes::FULL,
                    "this activity is full",
                ));
            }
            reg.registration_id
        }
        Some(_) => {
            return Err(EnrollmentError::precondition(
                codes::ALREADY_PROCESSED,
                "this registration was already paid for",
            ));
        }
        None => {
            let registration_id = Uuid::new_v4().to_string();
            let inserted = registrations_repo::insert_approved_if_capacity(
                &mut *tx,
                registrations_repo::NewRegistration {
                    registration_id: &registration_id,
                    user_id: actor_id,
                    student_id: &item.user_id,
                    parent_id: None,
                    activity_id: &item.activity_id,
                    status: RegistrationStatus::Approved.as_str(),
                    payment_status: RegistrationPaymentStatus::Paid.as_str(),
                    notes: Some("Registered via cart checkout"),
                },
            )
            .await
            .map_err(|e| {
                duplicate_on_unique_violation(e, "you are already registered for this activity")
            })?;
            if inserted == 0 {
                return Err(EnrollmentError::precondition(
                    codes::FULL,
                    "this activity is full",
                ));
            }
            registration_id
        }
    };

    // Simulated gateway: the payment always completes, with a generated
    // transaction reference.
    let payment_id = Uuid::new_v4().to_string();
    let transaction_id = format!("SIM-{}", Uuid::new_v4());
    payments_repo::insert_payment(
        &mut *tx,
        payments_repo::NewPayment {
            payment_id: &payment_id,
            registration_id: &registration_id,
            amount: item.price,
            payment_status: PaymentStatus::Completed.as_str(),
            transaction_id: &transaction_id,
            payment_method: "simulated",
        },
    )
    .await?;

    let approved_now = activities_repo::approved_count(&mut *tx, &item.activity_id).await?;
    if capacity::is_full(approved_now, item.max_participants) {
        activities_repo::set_status(&mut *tx, &item.activity_id, ActivityStatus::Full.as_str())
            .await?;
    }

    tx.commit().await?;

    info!(
        "user {} checked out cart item {} for activity {} (txn {})",
        actor_id, cart_item_id, item.activity_id, transaction_id
    );
    Ok(CheckoutOutcome {
        registration_id,
        payment_id,
        transaction_id,
        amount: item.price,
    })
}

fn cart_window(item: &CartItemWithActivityRow) -> ActivityWindow {
    ActivityWindow {
        start_date: item.start_date,
        end_date: item.end_date,
        start_time: item.start_time,
        end_time: item.end_time,
    }
}
