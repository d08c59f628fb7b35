pub mod activities;
pub mod cart_items;
pub mod interactions;
pub mod payments;
pub mod registrations;
pub mod users;

pub use activities::{ActivitiesRow, ActivityKind, ActivityScheduleRow, ActivityStatus};
pub use cart_items::{CartItemWithActivityRow, CartItemsRow};
pub use interactions::{InteractionsRow, INTERACTION_COMMENT, INTERACTION_LIKE};
pub use payments::{PaymentStatus, PaymentsRow};
pub use registrations::{
    RegistrationPaymentStatus, RegistrationStatus, RegistrationWithActivityRow, RegistrationsRow,
};
pub use users::{Role, UsersRow};
